//! Extraction of typed identifiers from free-form links.
//!
//! Marketplace URL grammars live with the marketplace providers; this module only offers the
//! marketplace-neutral pieces they are built from.
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use nft_action_common::{
    errors::{IdentifierError, ResolutionError},
    serde_primitives::parse_decimal_u256,
};
use url::Url;

/// Path segment preceding the publication id in post links, e.g. `https://hey.xyz/posts/<id>`.
pub const POST_MARKER: &str = "posts";

/// Returns the path segment following the first `marker` segment.
///
/// Returns `None` if the marker does not occur or is the last segment. An empty segment after
/// the marker (e.g. `a/posts//b`) is returned as `Some("")`; callers must treat it as invalid.
pub fn segment_after<'a>(path: &'a str, marker: &str) -> Option<&'a str> {
    let mut segments = path.split('/');
    segments.find(|segment| *segment == marker)?;
    segments
        .next()
        .map(|segment| {
            segment
                .split(|c| c == '?' || c == '#')
                .next()
                .unwrap_or_default()
        })
}

/// Extracts the raw publication id from a post link.
///
/// Input without any `/` is taken as a bare publication id.
pub fn post_id_from_link(link: &str) -> Result<String, IdentifierError> {
    let link = link.trim();
    if link.is_empty() {
        return Err(IdentifierError::Absent { marker: POST_MARKER, input: link.to_string() });
    }
    if !link.contains('/') {
        return Ok(link.to_string());
    }

    match segment_after(link, POST_MARKER) {
        None => Err(IdentifierError::Absent { marker: POST_MARKER, input: link.to_string() }),
        Some("") => Err(IdentifierError::Empty { marker: POST_MARKER, input: link.to_string() }),
        Some(id) => Ok(id.to_string()),
    }
}

/// Whether `uri` is served from `domain` or its `www.` subdomain.
pub fn host_matches(uri: &Url, domain: &str) -> bool {
    uri.host_str()
        .and_then(|host| host.strip_prefix("www.").or(Some(host)))
        .is_some_and(|host| host.eq_ignore_ascii_case(domain))
}

/// Non-empty path segments of `uri`.
pub fn path_segments(uri: &Url) -> Option<Vec<&str>> {
    Some(
        uri.path_segments()?
            .filter(|segment| !segment.is_empty())
            .collect(),
    )
}

/// Parses a decimal profile or publication id. `field` names the id in the error.
pub fn parse_profile_id(field: &str, value: &str) -> Result<U256, ResolutionError> {
    parse_decimal_u256(value).ok_or_else(|| {
        ResolutionError::InvalidArgument(format!("{field} must be a decimal integer, got '{value}'"))
    })
}

/// Strict `0x` prefixed, 20 byte hex address.
pub fn parse_address(value: &str) -> Option<Address> {
    let digits = value.strip_prefix("0x")?;
    if digits.len() != 40 {
        return None;
    }
    Address::from_str(value).ok()
}

//! Decoding of composite publication ids and extraction of attached actions.
use nft_action_common::{
    errors::ResolutionError,
    models::action::{
        ActionDescriptor, PostAction, Publication, PublicationIdentifier, COMPOSITE_ID_SEPARATOR,
    },
    serde_primitives::parse_hex_u256,
};
use tracing::debug;

/// Decodes a composite `<hex profile id>-<hex post id>` into decimal ids.
///
/// Each component is converted independently. Anything but exactly two valid hexadecimal
/// components is rejected; there is no best-effort decoding. The `0x` prefix is optional and
/// leading zeros are ignored, so `ff-10`, `0xff-0x10` and `0x00ff-0x0010` decode to the same
/// identifier. [`PublicationIdentifier::to_composite`] always produces the canonical spelling.
pub fn decode_publication_id(composite: &str) -> Result<PublicationIdentifier, ResolutionError> {
    let malformed = || ResolutionError::MalformedPublicationId(composite.to_string());

    let components: Vec<&str> = composite
        .split(COMPOSITE_ID_SEPARATOR)
        .collect();
    let [profile_hex, post_hex] = components.as_slice() else {
        return Err(malformed());
    };

    let profile_id = parse_hex_u256(profile_hex).ok_or_else(malformed)?;
    let post_id = parse_hex_u256(post_hex).ok_or_else(malformed)?;

    Ok(PublicationIdentifier { profile_id: profile_id.to_string(), post_id: post_id.to_string() })
}

/// Extracts the purchase action attached to a publication.
///
/// The first attached module is taken verbatim: its stored payload is authoritative and is not
/// checked against any marketplace. A publication without modules yields `action: None`.
pub fn extract_action(publication: &Publication) -> Result<PostAction, ResolutionError> {
    let identifier = decode_publication_id(&publication.id)?;

    let action = publication
        .action_modules
        .first()
        .map(|module| {
            ActionDescriptor::new(
                module.contract_address,
                module.initialize_calldata.clone(),
                module.chain_id,
            )
        });

    if action.is_none() {
        debug!(publication = %publication.id, "Publication has no attached action module");
    } else if publication.action_modules.len() > 1 {
        debug!(
            publication = %publication.id,
            modules = publication.action_modules.len(),
            "Publication has multiple action modules, using the first one"
        );
    }

    Ok(PostAction { publication: identifier, action })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, Bytes};
    use nft_action_common::models::action::AttachedActionModule;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn publication(id: &str, modules: Vec<AttachedActionModule>) -> Publication {
        Publication { id: id.to_string(), author_profile_id: "0x01".to_string(), action_modules: modules }
    }

    fn module(byte: u8) -> AttachedActionModule {
        AttachedActionModule {
            contract_address: Address::repeat_byte(byte),
            chain_id: 137,
            initialize_calldata: Bytes::from(vec![byte; 4]),
        }
    }

    #[rstest]
    #[case::lens("0x01-0x02", "1", "2")]
    #[case::realistic("0x2a6b-0x01d8", "10859", "472")]
    #[case::unprefixed("ff-10", "255", "16")]
    #[case::upper_case("0xAB-0xCD", "171", "205")]
    fn test_decode_publication_id(
        #[case] composite: &str,
        #[case] profile_id: &str,
        #[case] post_id: &str,
    ) {
        let id = decode_publication_id(composite).unwrap();

        assert_eq!(
            id,
            PublicationIdentifier { profile_id: profile_id.to_string(), post_id: post_id.to_string() }
        );
    }

    #[rstest]
    #[case::single("0x01")]
    #[case::three_components("0x01-0x02-0x03")]
    #[case::empty("")]
    #[case::empty_component("0x01-")]
    #[case::bare_prefix("0x-0x02")]
    #[case::not_hex("0x01-0xzz")]
    #[case::decimal_sign("0x01-+2")]
    #[case::too_large("0x1-0x10000000000000000000000000000000000000000000000000000000000000000")]
    fn test_decode_publication_id_malformed(#[case] composite: &str) {
        let err = decode_publication_id(composite).unwrap_err();

        assert!(matches!(err, ResolutionError::MalformedPublicationId(id) if id == composite));
    }

    #[rstest]
    #[case("0x01-0x02")]
    #[case("0x2a6b-0x01d8")]
    #[case("0xABCD-0x0F")]
    #[case("0x0100-0xffffffff")]
    fn test_composite_id_round_trip(#[case] composite: &str) {
        let decoded = decode_publication_id(composite).unwrap();

        let encoded = decoded.to_composite().unwrap();

        assert_eq!(encoded, composite.to_lowercase());
    }

    #[rstest]
    #[case::unprefixed("ff-10", "0xff-0x10")]
    #[case::odd_length("0x1-0x2", "0x01-0x02")]
    #[case::leading_zeros("0x001-0x02", "0x01-0x02")]
    #[case::mixed("0X0AB-cd", "0xab-0xcd")]
    fn test_non_canonical_composite_id_is_normalized(#[case] composite: &str, #[case] canonical: &str) {
        let decoded = decode_publication_id(composite).unwrap();

        assert_eq!(decoded, decode_publication_id(canonical).unwrap());
        assert_eq!(decoded.to_composite().unwrap(), canonical);
    }

    #[test]
    fn test_extract_first_action() {
        let publication = publication("0x01-0x02", vec![module(0x11), module(0x22)]);

        let post_action = extract_action(&publication).unwrap();

        assert_eq!(post_action.publication.profile_id, "1");
        assert_eq!(
            post_action.action,
            Some(ActionDescriptor::new(
                Address::repeat_byte(0x11),
                Bytes::from(vec![0x11; 4]),
                137
            ))
        );
    }

    #[test]
    fn test_extract_without_modules_is_no_action() {
        let publication = publication("0x01-0x02", vec![]);

        let post_action = extract_action(&publication).unwrap();

        assert_eq!(post_action.action, None);
    }

    #[test]
    fn test_extract_with_malformed_id_fails() {
        let publication = publication("not-an-id", vec![module(0x11)]);

        let err = extract_action(&publication).unwrap_err();

        assert!(matches!(err, ResolutionError::MalformedPublicationId(_)));
    }
}

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{errors::ResolutionError, models::ChainId, serde_primitives::parse_decimal_u256};

/// Separator between the profile and post component of a composite publication id.
pub const COMPOSITE_ID_SEPARATOR: char = '-';

/// The flavour of purchase an open action module performs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModuleKind {
    FixedPrice,
    Auction,
    Mint,
}

impl ModuleKind {
    /// Discriminant stored in the module's initialization payload.
    pub fn as_u8(&self) -> u8 {
        match self {
            ModuleKind::FixedPrice => 0,
            ModuleKind::Auction => 1,
            ModuleKind::Mint => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ModuleKind::FixedPrice),
            1 => Some(ModuleKind::Auction),
            2 => Some(ModuleKind::Mint),
            _ => None,
        }
    }
}

/// The canonical purchase action: which module to call, with which stored payload, on which
/// chain.
///
/// Both freshly matched listings and actions extracted from published posts end up as this
/// type, so everything downstream is agnostic of where the action came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub action_module_address: Address,
    pub initialize_calldata: Bytes,
    pub chain_id: ChainId,
}

impl ActionDescriptor {
    pub fn new(action_module_address: Address, initialize_calldata: Bytes, chain_id: ChainId) -> Self {
        Self { action_module_address, initialize_calldata, chain_id }
    }
}

/// Profile and post id of a publication, both as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicationIdentifier {
    pub profile_id: String,
    pub post_id: String,
}

impl PublicationIdentifier {
    /// Encodes the identifier in its composite `<hex profile id>-<hex post id>` form.
    ///
    /// Components are lowercase, `0x` prefixed and padded to an even number of digits, which is
    /// how the social graph renders them. Decoding accepts more spellings than this produces, so
    /// a decode then encode round trip returns the canonical form of its input.
    pub fn to_composite(&self) -> Result<String, ResolutionError> {
        let to_hex = |value: &str| {
            let value = parse_decimal_u256(value).ok_or_else(|| {
                ResolutionError::InvalidArgument(format!("publication id component: {value}"))
            })?;
            let digits = format!("{value:x}");
            Ok::<_, ResolutionError>(if digits.len() % 2 == 1 {
                format!("0x0{digits}")
            } else {
                format!("0x{digits}")
            })
        };
        Ok(format!("{}{COMPOSITE_ID_SEPARATOR}{}", to_hex(&self.profile_id)?, to_hex(&self.post_id)?))
    }
}

/// An open action module attached to a publication, as reported by the social graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedActionModule {
    pub contract_address: Address,
    pub chain_id: ChainId,
    pub initialize_calldata: Bytes,
}

/// A publication as fetched from the social graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Composite `<hex profile id>-<hex post id>` identifier.
    pub id: String,
    pub author_profile_id: String,
    pub action_modules: Vec<AttachedActionModule>,
}

/// Result of inspecting a publication for an attached action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAction {
    pub publication: PublicationIdentifier,
    /// `None` when no action module is attached to the publication.
    pub action: Option<ActionDescriptor>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_to_composite() {
        let id = PublicationIdentifier { profile_id: "10859".to_string(), post_id: "1".to_string() };

        assert_eq!(id.to_composite().unwrap(), "0x2a6b-0x01");
    }

    #[test]
    fn test_to_composite_rejects_hex_components() {
        let id = PublicationIdentifier { profile_id: "0x2a6b".to_string(), post_id: "1".to_string() };

        assert!(matches!(id.to_composite(), Err(ResolutionError::InvalidArgument(_))));
    }

    #[test]
    fn test_module_kind_discriminant() {
        for kind in [ModuleKind::FixedPrice, ModuleKind::Auction, ModuleKind::Mint] {
            assert_eq!(ModuleKind::from_u8(kind.as_u8()), Some(kind));
        }
        assert_eq!(ModuleKind::from_u8(3), None);
        assert_eq!(ModuleKind::from_str("fixed_price").unwrap(), ModuleKind::FixedPrice);
    }

    #[test]
    fn test_action_descriptor_serializes_hex_payload() {
        let descriptor = ActionDescriptor::new(Address::ZERO, Bytes::from(vec![0xab, 0xcd]), 137);

        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["initialize_calldata"], "0xabcd");
        assert_eq!(json["chain_id"], 137);
    }
}

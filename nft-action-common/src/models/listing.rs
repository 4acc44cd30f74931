use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::{
    models::{ChainId, Marketplace},
    serde_primitives::u256_decimal,
};

/// A marketplace-neutral reference to a single token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentReference {
    pub marketplace: Marketplace,
    pub contract_address: Address,
    #[serde(with = "u256_decimal")]
    pub token_id: U256,
    pub chain_id: ChainId,
}

impl ContentReference {
    pub fn new(
        marketplace: Marketplace,
        contract_address: Address,
        token_id: U256,
        chain_id: ChainId,
    ) -> Self {
        Self { marketplace, contract_address, token_id, chain_id }
    }
}

impl std::fmt::Display for ContentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}#{}",
            self.marketplace, self.chain_id, self.contract_address, self.token_id
        )
    }
}

/// An amount in the smallest unit of `currency`.
///
/// The zero address stands for the chain's native currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    #[serde(with = "u256_decimal")]
    pub amount: U256,
    pub currency: Address,
}

impl Price {
    pub fn new(amount: U256, currency: Address) -> Self {
        Self { amount, currency }
    }

    pub fn native(amount: U256) -> Self {
        Self { amount, currency: Address::ZERO }
    }

    pub fn is_native(&self) -> bool {
        self.currency == Address::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SaleKind {
    #[default]
    FixedPrice,
    Auction,
}

/// Descriptive token data used for display purposes only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub creator: Option<Address>,
}

/// Normalized listing data as reported by a marketplace provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingInfo {
    pub content: ContentReference,
    /// `None` when the token exists but is not actively listed.
    pub price: Option<Price>,
    pub seller: Option<Address>,
    pub sale_kind: SaleKind,
    #[serde(default)]
    pub metadata: NftMetadata,
}

impl ListingInfo {
    pub fn unlisted(content: ContentReference) -> Self {
        Self {
            content,
            price: None,
            seller: None,
            sale_kind: SaleKind::default(),
            metadata: NftMetadata::default(),
        }
    }

    pub fn is_listed(&self) -> bool {
        self.price.is_some()
    }
}

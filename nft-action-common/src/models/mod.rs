pub mod action;
pub mod display;
pub mod execution;
pub mod listing;

use std::{borrow::Cow, convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Numeric EVM chain id, as used in transactions and by bridge providers.
pub type ChainId = u64;

/// Chains on which NFTs can be resolved and actions executed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Chain {
    #[default]
    Ethereum,
    Optimism,
    Polygon,
    Base,
    Arbitrum,
    Zora,
}

impl Chain {
    pub const ALL: [Chain; 6] =
        [Chain::Ethereum, Chain::Optimism, Chain::Polygon, Chain::Base, Chain::Arbitrum, Chain::Zora];

    pub fn id(&self) -> ChainId {
        match self {
            Chain::Ethereum => 1,
            Chain::Optimism => 10,
            Chain::Polygon => 137,
            Chain::Base => 8453,
            Chain::Arbitrum => 42161,
            Chain::Zora => 7777777,
        }
    }

    pub fn from_id(id: ChainId) -> Option<Chain> {
        Self::ALL
            .into_iter()
            .find(|chain| chain.id() == id)
    }
}

/// Identifier of the marketplace a content URI originates from, e.g. `opensea`.
///
/// The set of marketplaces is open: every configured marketplace provider reports its own id
/// and owns the URL grammar of its content URIs. Ids are lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marketplace(Cow<'static, str>);

impl Marketplace {
    pub const OPENSEA: Marketplace = Marketplace(Cow::Borrowed("opensea"));
    pub const RARIBLE: Marketplace = Marketplace(Cow::Borrowed("rarible"));

    pub fn new(id: &str) -> Self {
        Self(Cow::Owned(id.trim().to_ascii_lowercase()))
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl FromStr for Marketplace {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

use strum_macros::Display;
use thiserror::Error;

use crate::models::{action::ModuleKind, listing::ContentReference, ChainId};

/// Failure to locate an identifier inside a free-form link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The marker segment is missing or is the last segment of the link.
    #[error("No identifier following '{marker}' in: {input}")]
    Absent { marker: &'static str, input: String },

    /// The marker is followed by an empty segment.
    #[error("Empty identifier following '{marker}' in: {input}")]
    Empty { marker: &'static str, input: String },
}

/// Errors reported by external collaborators (marketplaces, social graph, bridge).
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The collaborator is not configured, usually because its credential is missing.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The collaborator rejected the configured credential.
    #[error("Provider rejected credentials: {0}")]
    Credentials(String),

    #[error("Provider rate limited the request")]
    RateLimited,

    #[error("Provider request timed out: {0}")]
    Timeout(String),

    /// Transport level failures and unexpected server errors.
    #[error("Provider unreachable: {0}")]
    Network(String),

    /// The response could not be parsed into the expected shape.
    #[error("Failed to parse provider response: {0}")]
    ParseResponse(String),

    #[error("Fatal provider error: {0}")]
    Fatal(String),
}

/// The pipeline stage a collaborator failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    MarketplaceLookup,
    PublicationLookup,
    Routing,
}

/// Outer-level errors of action resolution and calldata construction.
///
/// Parsing and validation variants are produced before any collaborator is contacted.
/// Collaborator failures are wrapped in `ProviderUnavailable` together with the stage they
/// occurred in.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("No configured marketplace supports content URI: {0}")]
    UnsupportedMarketplace(String),

    #[error("Listing not found: {0}")]
    ListingNotFound(ContentReference),

    #[error("Publication not found: {0}")]
    PublicationNotFound(String),

    #[error("No {kind} action module deployed on chain {chain_id}")]
    ModuleUnavailableForChain { kind: ModuleKind, chain_id: ChainId },

    #[error("Malformed publication id: {0}")]
    MalformedPublicationId(String),

    #[error("Invalid quantity: {0}, must be a positive integer")]
    InvalidQuantity(i64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The action payload does not reveal a price, so no bridge amount can be computed.
    #[error("Action on chain {0} has no decodable price, cannot route payment")]
    UnpricedAction(ChainId),

    #[error("No route from chain {src_chain_id} to chain {dst_chain_id}")]
    NoRouteAvailable { src_chain_id: ChainId, dst_chain_id: ChainId },

    #[error("Provider unavailable during {stage}: {source}")]
    ProviderUnavailable {
        stage: Stage,
        #[source]
        source: ProviderError,
    },
}

impl ResolutionError {
    pub fn provider(stage: Stage, source: ProviderError) -> Self {
        ResolutionError::ProviderUnavailable { stage, source }
    }
}

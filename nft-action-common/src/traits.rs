use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use url::Url;

use crate::{
    errors::ProviderError,
    models::{
        action::Publication,
        execution::DestinationCall,
        listing::{ContentReference, ListingInfo},
        ChainId, Marketplace,
    },
};

/// Trait for recognizing content URIs of one marketplace and looking up their listing data.
///
/// A provider owns the URL grammar of its marketplace, so marketplaces are added by
/// configuring another provider.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait MarketplaceProvider: Send + Sync {
    /// The marketplace whose content URIs this provider resolves.
    fn marketplace(&self) -> Marketplace;

    /// Human readable platform name shown next to an action, e.g. `OpenSea`.
    fn platform_name(&self) -> String;

    /// Parses `uri` if it points at a single token of this marketplace on a supported chain.
    ///
    /// Returns `None` for URIs of other marketplaces and for pages that are not a single
    /// token, e.g. collections or profiles.
    fn parse_content_uri(&self, uri: &Url) -> Option<ContentReference>;

    /// Fetches normalized listing data for a token.
    ///
    /// # Returns
    /// * `Ok(Some(listing))` - the token exists. `listing.price` is `None` if it is not listed.
    /// * `Ok(None)` - the marketplace does not know the token.
    /// * `Err(_)` - the marketplace could not be queried.
    async fn fetch_listing(
        &self,
        reference: &ContentReference,
    ) -> Result<Option<ListingInfo>, ProviderError>;
}

/// Trait for fetching publications from the social graph.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait PublicationProvider: Send + Sync {
    /// Fetches a publication by its composite `<hex>-<hex>` id. Returns `Ok(None)` if the
    /// publication does not exist.
    async fn fetch_publication(&self, composite_id: &str)
        -> Result<Option<Publication>, ProviderError>;
}

/// A request for a route delivering `amount` of `dst_token` on `dst_chain_id`, paid with
/// `payment_token` on `src_chain_id`, and then performing `destination_call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub src_chain_id: ChainId,
    pub dst_chain_id: ChainId,
    pub payment_token: Address,
    pub dst_token: Address,
    pub amount: U256,
    pub sender: Address,
    pub recipient: Address,
    pub destination_call: DestinationCall,
}

/// The source chain transaction that executes a bridge route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Bridge entry point on the source chain.
    pub to: Address,
    pub data: alloy_primitives::Bytes,
    pub value: U256,
}

/// Trait for finding bridge/swap routes between chains and tokens.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait BridgeProvider: Send + Sync {
    /// Name reported in routing metadata.
    fn name(&self) -> String;

    /// Returns `Ok(None)` when the provider has no viable route for the request.
    async fn find_route(&self, request: &RouteRequest) -> Result<Option<Route>, ProviderError>;
}

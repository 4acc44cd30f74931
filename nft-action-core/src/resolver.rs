//! Classification of content URIs and listing lookup through the configured marketplaces.
use std::sync::Arc;

use nft_action_common::{
    errors::{ResolutionError, Stage},
    models::{
        listing::{ContentReference, ListingInfo},
        Marketplace,
    },
    traits::MarketplaceProvider,
};
use tracing::{debug, instrument, warn};
use url::Url;

/// Resolves content URIs against a configurable set of marketplace providers.
///
/// The resolver knows nothing about individual marketplaces: a URI is supported exactly when a
/// configured provider claims it. Providers are asked in the order they were configured.
#[derive(Clone, Default)]
pub struct MarketplaceResolver {
    providers: Vec<Arc<dyn MarketplaceProvider>>,
}

impl MarketplaceResolver {
    pub fn new(providers: Vec<Arc<dyn MarketplaceProvider>>) -> Self {
        Self { providers }
    }

    /// Platform name reported by the provider of `marketplace`.
    pub fn platform_name(&self, marketplace: &Marketplace) -> Option<String> {
        self.providers
            .iter()
            .find(|provider| provider.marketplace() == *marketplace)
            .map(|provider| provider.platform_name())
    }

    /// Finds the provider responsible for `content_uri` and the token it references.
    pub fn classify(
        &self,
        content_uri: &str,
    ) -> Result<(Arc<dyn MarketplaceProvider>, ContentReference), ResolutionError> {
        let unsupported = || ResolutionError::UnsupportedMarketplace(content_uri.to_string());
        let uri = Url::parse(content_uri.trim()).map_err(|err| {
            debug!(%err, content_uri, "Content URI is not a valid URL");
            unsupported()
        })?;

        self.providers
            .iter()
            .find_map(|provider| {
                provider
                    .parse_content_uri(&uri)
                    .map(|reference| (provider.clone(), reference))
            })
            .ok_or_else(unsupported)
    }

    /// Fetches listing data for `content_uri`.
    ///
    /// `Ok(None)` means the marketplace does not know the token, which callers may treat as a
    /// regular outcome.
    #[instrument(skip(self))]
    pub async fn resolve(&self, content_uri: &str) -> Result<Option<ListingInfo>, ResolutionError> {
        let (provider, reference) = self.classify(content_uri)?;
        debug!(%reference, "Fetching listing");

        let listing = provider
            .fetch_listing(&reference)
            .await
            .map_err(|err| {
                warn!(%reference, %err, "Marketplace lookup failed");
                ResolutionError::provider(Stage::MarketplaceLookup, err)
            })?;

        if listing.is_none() {
            debug!(%reference, "Marketplace does not know the token");
        }
        Ok(listing)
    }

    /// Like [`Self::resolve`] but treats an unknown token as an error.
    pub async fn resolve_strict(&self, content_uri: &str) -> Result<ListingInfo, ResolutionError> {
        let (_, reference) = self.classify(content_uri)?;
        self.resolve(content_uri)
            .await?
            .ok_or(ResolutionError::ListingNotFound(reference))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};
    use nft_action_common::{errors::ProviderError, traits::MockMarketplaceProvider};
    use pretty_assertions::assert_eq;

    use super::*;

    const OPENSEA_URI: &str =
        "https://opensea.io/assets/base/0x9ee91f9f426fa633d227f7a9b000e28b9dfd8599/1";

    fn reference(marketplace: Marketplace) -> ContentReference {
        ContentReference::new(
            marketplace,
            Address::from_slice(&hex::decode("9ee91f9f426fa633d227f7a9b000e28b9dfd8599").unwrap()),
            U256::from(1u64),
            8453,
        )
    }

    /// A provider claiming every URI served from `host`.
    fn provider(
        marketplace: Marketplace,
        host: &'static str,
        times: usize,
        response: fn() -> Result<Option<ListingInfo>, ProviderError>,
    ) -> Arc<dyn MarketplaceProvider> {
        let mut mock = MockMarketplaceProvider::new();
        mock.expect_marketplace()
            .return_const(marketplace.clone());
        mock.expect_platform_name()
            .return_const(marketplace.id().to_uppercase());
        mock.expect_parse_content_uri()
            .returning(move |uri| {
                (uri.host_str() == Some(host)).then(|| reference(marketplace.clone()))
            });
        mock.expect_fetch_listing()
            .times(times)
            .returning(move |_| response());
        Arc::new(mock)
    }

    fn unlisted() -> Result<Option<ListingInfo>, ProviderError> {
        Ok(Some(ListingInfo::unlisted(reference(Marketplace::OPENSEA))))
    }

    #[tokio::test]
    async fn test_resolve_with_matching_provider() {
        let resolver = MarketplaceResolver::new(vec![
            provider(Marketplace::RARIBLE, "rarible.com", 0, || Ok(None)),
            provider(Marketplace::OPENSEA, "opensea.io", 1, unlisted),
        ]);

        let listing = resolver
            .resolve(OPENSEA_URI)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(listing.content.chain_id, 8453);
        assert_eq!(listing.content.marketplace, Marketplace::OPENSEA);
    }

    #[test]
    fn test_classify_marketplace_unknown_to_core() {
        let foundation = Marketplace::new("foundation");
        let resolver = MarketplaceResolver::new(vec![
            provider(Marketplace::OPENSEA, "opensea.io", 0, || Ok(None)),
            provider(foundation.clone(), "foundation.app", 0, || Ok(None)),
        ]);

        let (provider, reference) = resolver
            .classify("https://foundation.app/mint/base/0x9ee91f9f426fa633d227f7a9b000e28b9dfd8599/1")
            .unwrap();

        assert_eq!(provider.marketplace(), foundation);
        assert_eq!(reference.marketplace, foundation);
        assert_eq!(resolver.platform_name(&foundation).as_deref(), Some("FOUNDATION"));
    }

    #[test]
    fn test_platform_name_of_unconfigured_marketplace() {
        let resolver = MarketplaceResolver::new(vec![provider(
            Marketplace::OPENSEA,
            "opensea.io",
            0,
            || Ok(None),
        )]);

        assert_eq!(resolver.platform_name(&Marketplace::RARIBLE), None);
    }

    #[tokio::test]
    async fn test_unconfigured_marketplace_is_unsupported() {
        let resolver = MarketplaceResolver::new(vec![provider(
            Marketplace::RARIBLE,
            "rarible.com",
            0,
            || Ok(None),
        )]);

        let err = resolver
            .resolve(OPENSEA_URI)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::UnsupportedMarketplace(uri) if uri == OPENSEA_URI));
    }

    #[tokio::test]
    async fn test_invalid_url_is_unsupported() {
        let resolver = MarketplaceResolver::new(vec![provider(
            Marketplace::OPENSEA,
            "opensea.io",
            0,
            || Ok(None),
        )]);

        let err = resolver
            .resolve("opensea.io/assets/base")
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::UnsupportedMarketplace(_)));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let resolver = MarketplaceResolver::new(vec![provider(
            Marketplace::OPENSEA,
            "opensea.io",
            2,
            || Ok(None),
        )]);

        let lenient = resolver.resolve(OPENSEA_URI).await.unwrap();
        let strict = resolver
            .resolve_strict(OPENSEA_URI)
            .await
            .unwrap_err();

        assert_eq!(lenient, None);
        assert!(matches!(strict, ResolutionError::ListingNotFound(reference) if reference.chain_id == 8453));
    }

    #[tokio::test]
    async fn test_provider_failure_is_wrapped_with_stage() {
        let resolver =
            MarketplaceResolver::new(vec![provider(Marketplace::OPENSEA, "opensea.io", 1, || {
                Err(ProviderError::Network("connection reset".to_string()))
            })]);

        let err = resolver
            .resolve(OPENSEA_URI)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolutionError::ProviderUnavailable {
                stage: Stage::MarketplaceLookup,
                source: ProviderError::Network(_)
            }
        ));
    }
}

//! The public entry point tying identifier parsing, listing resolution, module matching, routing
//! and calldata assembly together.
use std::sync::Arc;

use nft_action_common::{
    errors::{ProviderError, ResolutionError, Stage},
    models::{
        action::ActionDescriptor,
        display::DisplayData,
        execution::{CalldataResult, ExecutionOutcome, ExecutionParams, ExecutionRequest},
    },
    traits::{BridgeProvider, MarketplaceProvider, PublicationProvider},
};
use tracing::{debug, info, instrument, warn};

use crate::{
    assembler::{assemble, encode_action_call, validate_params},
    identifiers::{parse_profile_id, post_id_from_link},
    modules::{module_kind_for, ModuleRegistry},
    publication::{decode_publication_id, extract_action},
    resolver::MarketplaceResolver,
    router::{PaymentRouter, RoutingParams},
};

/// Resolves purchase open actions and builds the calldata executing them.
///
/// The kit holds no mutable state; concurrent calls only share the collaborators.
#[derive(Clone)]
pub struct ActionKit {
    resolver: MarketplaceResolver,
    modules: ModuleRegistry,
    publications: Option<Arc<dyn PublicationProvider>>,
    router: PaymentRouter,
}

pub struct ActionKitBuilder {
    modules: ModuleRegistry,
    marketplaces: Vec<Arc<dyn MarketplaceProvider>>,
    publications: Option<Arc<dyn PublicationProvider>>,
    bridge: Option<Arc<dyn BridgeProvider>>,
}

impl ActionKitBuilder {
    /// Creates a builder without any collaborators. Operations needing a missing collaborator
    /// fail with the matching error instead of panicking.
    pub fn new(modules: ModuleRegistry) -> Self {
        Self { modules, marketplaces: Vec::new(), publications: None, bridge: None }
    }

    /// Adds a marketplace. URIs are matched against marketplaces in the order they were added.
    pub fn marketplace(mut self, provider: Arc<dyn MarketplaceProvider>) -> Self {
        self.marketplaces.push(provider);
        self
    }

    pub fn publications(mut self, provider: Arc<dyn PublicationProvider>) -> Self {
        self.publications = Some(provider);
        self
    }

    pub fn bridge(mut self, provider: Arc<dyn BridgeProvider>) -> Self {
        self.bridge = Some(provider);
        self
    }

    pub fn build(self) -> ActionKit {
        if self.marketplaces.is_empty() {
            warn!("No marketplace configured, every content URI will be unsupported");
        }
        ActionKit {
            resolver: MarketplaceResolver::new(self.marketplaces),
            modules: self.modules,
            publications: self.publications,
            router: PaymentRouter::new(self.bridge),
        }
    }
}

impl ActionKit {
    pub fn builder(modules: ModuleRegistry) -> ActionKitBuilder {
        ActionKitBuilder::new(modules)
    }

    /// Detects the purchase action for the NFT behind `content_uri`.
    ///
    /// # Arguments
    /// * `content_uri` - marketplace link of a single token.
    /// * `publishing_profile_id` - decimal id of the client profile publishing the post.
    ///
    /// # Errors
    /// `ListingNotFound` if the marketplace does not know the token.
    #[instrument(skip(self))]
    pub async fn detect_action(
        &self,
        content_uri: &str,
        publishing_profile_id: &str,
    ) -> Result<ActionDescriptor, ResolutionError> {
        parse_profile_id("publishing profile id", publishing_profile_id)?;
        let listing = self
            .resolver
            .resolve_strict(content_uri)
            .await?;
        let action = self
            .modules
            .match_listing(&listing, publishing_profile_id)?;
        info!(module = %action.action_module_address, chain_id = action.chain_id, "Detected action");
        Ok(action)
    }

    /// Collects what a front end needs to render the NFT and its action.
    ///
    /// Returns `Ok(None)` if the marketplace does not know the token.
    #[instrument(skip(self))]
    pub async fn generate_display_data(
        &self,
        content_uri: &str,
    ) -> Result<Option<DisplayData>, ResolutionError> {
        let Some(listing) = self.resolver.resolve(content_uri).await? else {
            return Ok(None);
        };
        let content = &listing.content;
        let platform_name = self
            .resolver
            .platform_name(&content.marketplace)
            .unwrap_or_else(|| content.marketplace.to_string());
        Ok(Some(DisplayData {
            marketplace: content.marketplace.clone(),
            platform_name,
            nft_name: listing.metadata.name.clone(),
            nft_image_url: listing.metadata.image_url.clone(),
            nft_creator: listing.metadata.creator,
            contract_address: content.contract_address,
            token_id: content.token_id,
            chain_id: content.chain_id,
            action: module_kind_for(&listing),
            price: listing.price.map(|price| price.amount),
            currency: listing.price.map(|price| price.currency),
            seller: listing.seller,
        }))
    }

    /// Builds the transaction executing `request.action`, bridging payment if needed.
    #[instrument(skip_all, fields(module = %request.action.action_module_address))]
    pub async fn build_execution_calldata(
        &self,
        request: &ExecutionRequest,
    ) -> Result<CalldataResult, ResolutionError> {
        validate_params(&request.params)?;
        let action_call = encode_action_call(request)?;

        let plan = self
            .router
            .plan(RoutingParams {
                action: &request.action,
                quantity: request.params.quantity,
                src_chain_id: request.params.src_chain_id,
                payment_token: request.params.payment_token,
                sender: request.params.sender_address,
                recipient: request.params.profile_owner_address,
                action_call,
            })
            .await?;
        Ok(assemble(plan))
    }

    /// Builds the transaction executing the action attached to the post behind `post_link`.
    ///
    /// Parameters, the post id and the composite publication id are all validated before the
    /// social graph is queried. A post without an attached action yields
    /// [`ExecutionOutcome::NoAction`].
    #[instrument(skip(self, params))]
    pub async fn action_from_post(
        &self,
        post_link: &str,
        params: ExecutionParams,
    ) -> Result<ExecutionOutcome, ResolutionError> {
        validate_params(&params)?;
        let composite_id = post_id_from_link(post_link)?;
        decode_publication_id(&composite_id)?;

        let publications = self.publications.as_ref().ok_or_else(|| {
            ResolutionError::provider(
                Stage::PublicationLookup,
                ProviderError::NotConfigured("no publication provider configured".to_string()),
            )
        })?;
        let publication = publications
            .fetch_publication(&composite_id)
            .await
            .map_err(|err| {
                warn!(%composite_id, %err, "Publication lookup failed");
                ResolutionError::provider(Stage::PublicationLookup, err)
            })?
            .ok_or_else(|| ResolutionError::PublicationNotFound(composite_id.clone()))?;

        let post_action = extract_action(&publication)?;
        let Some(action) = post_action.action else {
            debug!(%composite_id, "Nothing to execute");
            return Ok(ExecutionOutcome::NoAction { publication: post_action.publication });
        };

        let request = ExecutionRequest { action, publication: post_action.publication, params };
        let result = self
            .build_execution_calldata(&request)
            .await?;
        Ok(ExecutionOutcome::Ready(result))
    }
}

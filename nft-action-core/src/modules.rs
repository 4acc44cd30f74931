//! Selection of the open action module for a listing and encoding of its init payload.
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolType, SolValue};
use nft_action_common::{
    errors::ResolutionError,
    models::{
        action::{ActionDescriptor, ModuleKind},
        listing::{ListingInfo, Price, SaleKind},
        ChainId, Marketplace,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{abi::PurchaseActionInit, identifiers::parse_profile_id};

/// Picks the module kind fitting the shape of a listing.
pub fn module_kind_for(listing: &ListingInfo) -> ModuleKind {
    match (&listing.price, listing.sale_kind) {
        (None, _) => ModuleKind::Mint,
        (Some(_), SaleKind::Auction) => ModuleKind::Auction,
        (Some(_), SaleKind::FixedPrice) => ModuleKind::FixedPrice,
    }
}

/// A deployed open action module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDeployment {
    pub kind: ModuleKind,
    pub chain_id: ChainId,
    pub address: Address,
    /// Restricts the deployment to listings of one marketplace. Generic deployments serve all.
    #[serde(default)]
    pub marketplace: Option<Marketplace>,
}

/// Known module deployments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRegistry {
    deployments: Vec<ModuleDeployment>,
}

impl ModuleRegistry {
    pub fn new(deployments: Vec<ModuleDeployment>) -> Self {
        Self { deployments }
    }

    /// Finds the module for `kind` on `chain_id`, preferring a deployment dedicated to
    /// `marketplace` over a generic one.
    pub fn lookup(
        &self,
        kind: ModuleKind,
        chain_id: ChainId,
        marketplace: &Marketplace,
    ) -> Option<&ModuleDeployment> {
        let candidates = self
            .deployments
            .iter()
            .filter(|d| d.kind == kind && d.chain_id == chain_id);
        let mut generic = None;
        for deployment in candidates {
            match &deployment.marketplace {
                Some(m) if m == marketplace => return Some(deployment),
                None if generic.is_none() => generic = Some(deployment),
                _ => {}
            }
        }
        generic
    }

    /// Builds the action descriptor for a listing.
    ///
    /// # Arguments
    /// * `listing` - the resolved listing.
    /// * `publishing_profile_id` - decimal id of the client profile publishing the action.
    ///
    /// The init payload only depends on the arguments, the same listing always encodes to the
    /// same bytes.
    #[instrument(skip(self, listing), fields(content = %listing.content))]
    pub fn match_listing(
        &self,
        listing: &ListingInfo,
        publishing_profile_id: &str,
    ) -> Result<ActionDescriptor, ResolutionError> {
        let publishing_profile_id =
            parse_profile_id("publishing profile id", publishing_profile_id)?;

        let kind = module_kind_for(listing);
        let chain_id = listing.content.chain_id;
        let deployment = self
            .lookup(kind, chain_id, &listing.content.marketplace)
            .ok_or(ResolutionError::ModuleUnavailableForChain { kind, chain_id })?;
        debug!(%kind, module = %deployment.address, "Matched action module");

        let init = encode_init(listing, kind, publishing_profile_id);
        Ok(ActionDescriptor::new(deployment.address, init, chain_id))
    }
}

fn encode_init(listing: &ListingInfo, kind: ModuleKind, publishing_profile_id: U256) -> Bytes {
    let price = listing
        .price
        .unwrap_or(Price::native(U256::ZERO));
    PurchaseActionInit {
        nftContract: listing.content.contract_address,
        tokenId: listing.content.token_id,
        chainId: U256::from(listing.content.chain_id),
        saleKind: kind.as_u8(),
        price: price.amount,
        currency: price.currency,
        seller: listing.seller.unwrap_or(Address::ZERO),
        publishingClientProfileId: publishing_profile_id,
    }
    .abi_encode()
    .into()
}

/// Recovers the payment an action expects from its init payload.
///
/// Returns `None` for payloads not produced by [`ModuleRegistry::match_listing`], e.g. actions
/// of foreign modules attached to a post.
pub fn decode_expected_payment(initialize_calldata: &[u8]) -> Option<Price> {
    let init = <PurchaseActionInit as SolType>::abi_decode(initialize_calldata, true).ok()?;
    ModuleKind::from_u8(init.saleKind)?;
    Some(Price::new(init.price, init.currency))
}

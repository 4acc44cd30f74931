//! Payment routing: decides whether an action can be called directly or needs a bridge/swap
//! route, and asks the bridge provider for one.
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use nft_action_common::{
    errors::{ProviderError, ResolutionError, Stage},
    models::{
        action::ActionDescriptor,
        execution::{DestinationCall, RoutingInfo},
        ChainId,
    },
    traits::{BridgeProvider, Route, RouteRequest},
};
use tracing::{debug, info, instrument, warn};

use crate::modules::decode_expected_payment;

/// Checks that `quantity` is a positive integer.
pub fn validate_quantity(quantity: i64) -> Result<U256, ResolutionError> {
    if quantity <= 0 {
        return Err(ResolutionError::InvalidQuantity(quantity));
    }
    Ok(U256::from(quantity as u64))
}

/// Inputs of a routing decision.
#[derive(Debug, Clone)]
pub struct RoutingParams<'a> {
    pub action: &'a ActionDescriptor,
    pub quantity: i64,
    pub src_chain_id: ChainId,
    pub payment_token: Address,
    pub sender: Address,
    pub recipient: Address,
    /// Encoded call executing the action on its module.
    pub action_call: Bytes,
}

/// How the action call reaches its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePlan {
    /// Send the call straight to the module on `chain_id`.
    Direct { call: DestinationCall, chain_id: ChainId },
    /// Send `route` on the source chain; the bridge performs `routing.destination_call`.
    Bridged { route: Route, routing: RoutingInfo },
}

/// Decides between direct execution and bridged execution of an action.
#[derive(Clone, Default)]
pub struct PaymentRouter {
    bridge: Option<Arc<dyn BridgeProvider>>,
}

impl PaymentRouter {
    pub fn new(bridge: Option<Arc<dyn BridgeProvider>>) -> Self {
        Self { bridge }
    }

    /// Plans the execution of an action.
    ///
    /// The action is called directly if it lives on the source chain and is paid with the
    /// currency it expects. If the payload does not reveal a price, a same-chain action is
    /// still called directly and the module settles payment itself.
    ///
    /// Everything else requires a route from the bridge provider. Provider failures are
    /// surfaced, never retried.
    #[instrument(skip_all, fields(src_chain_id = params.src_chain_id, dst_chain_id = params.action.chain_id))]
    pub async fn plan(&self, params: RoutingParams<'_>) -> Result<RoutePlan, ResolutionError> {
        let quantity = validate_quantity(params.quantity)?;
        let dst_chain_id = params.action.chain_id;

        let expected = decode_expected_payment(&params.action.initialize_calldata);
        let total = match expected {
            Some(price) => Some(
                price
                    .amount
                    .checked_mul(quantity)
                    .ok_or(ResolutionError::InvalidQuantity(params.quantity))?,
            ),
            None => None,
        };
        let module_value = match (expected, total) {
            (Some(price), Some(total)) if price.is_native() => total,
            _ => U256::ZERO,
        };
        let destination_call = DestinationCall {
            to: params.action.action_module_address,
            data: params.action_call,
            value: module_value,
        };

        let currency_matches = expected.map_or(true, |price| price.currency == params.payment_token);
        if params.src_chain_id == dst_chain_id && currency_matches {
            debug!(module = %destination_call.to, "Routing directly to action module");
            return Ok(RoutePlan::Direct { call: destination_call, chain_id: dst_chain_id });
        }

        let (Some(price), Some(amount)) = (expected, total) else {
            warn!("Cannot route payment for an action without a decodable price");
            return Err(ResolutionError::UnpricedAction(dst_chain_id));
        };
        let bridge = self.bridge.as_ref().ok_or_else(|| {
            ResolutionError::provider(
                Stage::Routing,
                ProviderError::NotConfigured("no bridge provider configured".to_string()),
            )
        })?;

        let request = RouteRequest {
            src_chain_id: params.src_chain_id,
            dst_chain_id,
            payment_token: params.payment_token,
            dst_token: price.currency,
            amount,
            sender: params.sender,
            recipient: params.recipient,
            destination_call,
        };
        let route = bridge
            .find_route(&request)
            .await
            .map_err(|err| ResolutionError::provider(Stage::Routing, err))?
            .ok_or(ResolutionError::NoRouteAvailable {
                src_chain_id: params.src_chain_id,
                dst_chain_id,
            })?;
        info!(bridge = %bridge.name(), entry = %route.to, %amount, "Found bridge route");

        Ok(RoutePlan::Bridged {
            route,
            routing: RoutingInfo {
                bridge: bridge.name(),
                source_chain_id: request.src_chain_id,
                destination_chain_id: dst_chain_id,
                destination_call: request.destination_call,
                amount,
            },
        })
    }
}

//! Decent bridge API collaborator.
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use nft_action_common::{
    errors::ProviderError,
    models::ChainId,
    serde_primitives::{parse_decimal_u256, parse_hex_u256, u256_decimal},
    traits::{BridgeProvider, Route, RouteRequest},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::http::{error_for_response, map_request_error, parse_json, HttpClientOptions, HttpEndpoint};

pub const DECENT_API_URL: &str = "https://box-v3-2-0.api.decent.xyz";
const API_KEY_HEADER: &str = "x-api-key";
/// Slippage tolerance in percent.
pub const DEFAULT_SLIPPAGE: f64 = 1.0;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BoxActionRequest {
    sender: Address,
    src_chain_id: ChainId,
    dst_chain_id: ChainId,
    src_token: Address,
    dst_token: Address,
    slippage: f64,
    action_type: &'static str,
    action_config: ActionConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionConfig {
    contract_address: Address,
    chain_id: ChainId,
    data: Bytes,
    #[serde(with = "u256_decimal")]
    value: U256,
    cost: ActionCost,
    recipient: Address,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionCost {
    #[serde(with = "u256_decimal")]
    amount: U256,
    is_native: bool,
    token_address: Address,
}

#[derive(Debug, Deserialize)]
struct BoxActionResponse {
    tx: Option<BoxTransaction>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct BoxTransaction {
    to: Address,
    data: Bytes,
    #[serde(default)]
    value: Option<String>,
}

impl From<&RouteRequest> for BoxActionRequest {
    fn from(request: &RouteRequest) -> Self {
        let call = &request.destination_call;
        Self {
            sender: request.sender,
            src_chain_id: request.src_chain_id,
            dst_chain_id: request.dst_chain_id,
            src_token: request.payment_token,
            dst_token: request.dst_token,
            slippage: DEFAULT_SLIPPAGE,
            action_type: "arbitrary",
            action_config: ActionConfig {
                contract_address: call.to,
                chain_id: request.dst_chain_id,
                data: call.data.clone(),
                value: call.value,
                cost: ActionCost {
                    amount: request.amount,
                    is_native: request.dst_token == Address::ZERO,
                    token_address: request.dst_token,
                },
                recipient: request.recipient,
            },
        }
    }
}

/// Bridge amounts come back either as decimal or as `0x` prefixed hex strings.
fn parse_amount(value: &str) -> Option<U256> {
    if value.starts_with("0x") {
        parse_hex_u256(value)
    } else {
        parse_decimal_u256(value)
    }
}

/// Requests bridge/swap routes from the Decent API.
#[derive(Debug, Clone)]
pub struct DecentClient {
    endpoint: HttpEndpoint,
    slippage: f64,
}

impl DecentClient {
    pub fn new(base_uri: &str, options: HttpClientOptions) -> Result<Self, ProviderError> {
        Ok(Self {
            endpoint: HttpEndpoint::new(base_uri, API_KEY_HEADER, &options)?,
            slippage: DEFAULT_SLIPPAGE,
        })
    }

    /// Sets the slippage tolerance, in percent, routes are requested with.
    pub fn with_slippage(mut self, slippage: f64) -> Self {
        self.slippage = slippage;
        self
    }
}

#[async_trait]
impl BridgeProvider for DecentClient {
    fn name(&self) -> String {
        "decent".to_string()
    }

    #[instrument(skip_all, fields(src_chain_id = request.src_chain_id, dst_chain_id = request.dst_chain_id))]
    async fn find_route(&self, request: &RouteRequest) -> Result<Option<Route>, ProviderError> {
        let mut body = BoxActionRequest::from(request);
        body.slippage = self.slippage;

        let response = self
            .endpoint
            .client()
            .post(self.endpoint.url("api/getBoxAction"))
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = error_for_response(response).await?;
        let action = parse_json::<BoxActionResponse>(response).await?;

        let Some(tx) = action.tx else {
            debug!(error = ?action.error, "Decent returned no route");
            return Ok(None);
        };
        let value = match tx.value.as_deref() {
            None | Some("") => U256::ZERO,
            Some(raw) => parse_amount(raw).ok_or_else(|| {
                ProviderError::ParseResponse(format!("invalid transaction value: {raw}"))
            })?,
        };
        info!(entry = %tx.to, %value, "Decent route found");
        Ok(Some(Route { to: tx.to, data: tx.data, value }))
    }
}

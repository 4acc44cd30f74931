use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::{
    models::{
        action::{ActionDescriptor, PublicationIdentifier},
        ChainId,
    },
    serde_primitives::u256_decimal,
};

/// Caller supplied parameters of an action execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Number of items to buy. Must be positive; kept signed so invalid input can be reported
    /// instead of wrapping.
    pub quantity: i64,
    /// Decimal id of the profile performing the action.
    pub actor_profile_id: String,
    /// Decimal id of the client profile the action is executed through.
    pub executing_client_profile_id: String,
    pub sender_address: Address,
    pub profile_owner_address: Address,
    pub src_chain_id: ChainId,
    pub payment_token: Address,
    pub source_url: Option<String>,
}

/// Everything needed to build the calldata of one action execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub action: ActionDescriptor,
    pub publication: PublicationIdentifier,
    pub params: ExecutionParams,
}

/// A call as it would be sent straight to the action module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DestinationCall {
    pub to: Address,
    pub data: Bytes,
    #[serde(with = "u256_decimal")]
    pub value: U256,
}

/// Metadata describing how payment is bridged for a cross-chain execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingInfo {
    pub bridge: String,
    pub source_chain_id: ChainId,
    pub destination_chain_id: ChainId,
    /// The call the bridge performs on the destination chain once funds arrive.
    pub destination_call: DestinationCall,
    /// Amount of the action's currency delivered on the destination chain.
    #[serde(with = "u256_decimal")]
    pub amount: U256,
}

/// A transaction ready to be signed by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalldataResult {
    pub to: Address,
    pub data: Bytes,
    #[serde(with = "u256_decimal")]
    pub value: U256,
    pub chain_id: ChainId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub routing: Option<RoutingInfo>,
}

impl CalldataResult {
    pub fn is_bridged(&self) -> bool {
        self.routing.is_some()
    }
}

/// Outcome of executing the action attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Ready(CalldataResult),
    /// The post carries no action module; nothing needs to be executed.
    NoAction { publication: PublicationIdentifier },
}

//! Encoding of the action execution call and assembly of the final transaction.
use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};
use nft_action_common::{
    errors::ResolutionError,
    models::execution::{CalldataResult, ExecutionParams, ExecutionRequest},
};

use crate::{
    abi::{processPublicationActionCall, ProcessActionParams, PurchaseActionExecution},
    identifiers::parse_profile_id,
    router::{validate_quantity, RoutePlan},
};

/// Validates the caller supplied execution parameters without touching any collaborator.
pub fn validate_params(params: &ExecutionParams) -> Result<(), ResolutionError> {
    validate_quantity(params.quantity)?;
    parse_profile_id("actor profile id", &params.actor_profile_id)?;
    parse_profile_id("executing client profile id", &params.executing_client_profile_id)?;
    Ok(())
}

/// Encodes the call that executes the action on its module.
///
/// The module receives the purchase details as `actionModuleData`; the purchased items are
/// delivered to the profile owner.
pub fn encode_action_call(request: &ExecutionRequest) -> Result<Bytes, ResolutionError> {
    let params = &request.params;
    let quantity = validate_quantity(params.quantity)?;

    let module_data = PurchaseActionExecution {
        paymentToken: params.payment_token,
        quantity,
        recipient: params.profile_owner_address,
        executingClientProfileId: parse_profile_id(
            "executing client profile id",
            &params.executing_client_profile_id,
        )?,
        sourceUrl: params
            .source_url
            .clone()
            .unwrap_or_default(),
    };

    let call = processPublicationActionCall {
        params: ProcessActionParams {
            publicationActedProfileId: parse_profile_id(
                "publication profile id",
                &request.publication.profile_id,
            )?,
            publicationActedId: parse_profile_id("publication id", &request.publication.post_id)?,
            actorProfileId: parse_profile_id("actor profile id", &params.actor_profile_id)?,
            actorProfileOwner: params.profile_owner_address,
            transactionExecutor: params.sender_address,
            referrerProfileIds: Vec::<U256>::new(),
            referrerPubIds: Vec::<U256>::new(),
            actionModuleData: module_data.abi_encode().into(),
        },
    };
    Ok(call.abi_encode().into())
}

/// Combines a route plan into the transaction handed to the wallet.
pub fn assemble(plan: RoutePlan) -> CalldataResult {
    match plan {
        RoutePlan::Direct { call, chain_id } => CalldataResult {
            to: call.to,
            data: call.data,
            value: call.value,
            chain_id,
            routing: None,
        },
        RoutePlan::Bridged { route, routing } => CalldataResult {
            to: route.to,
            data: route.data,
            value: route.value,
            chain_id: routing.source_chain_id,
            routing: Some(routing),
        },
    }
}

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    models::{action::ModuleKind, ChainId, Marketplace},
    serde_primitives::{u256_decimal, u256_decimal_option},
};

/// Everything a front end needs to render an NFT together with its purchase action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayData {
    pub marketplace: Marketplace,
    pub platform_name: String,
    pub nft_name: Option<String>,
    pub nft_image_url: Option<String>,
    pub nft_creator: Option<Address>,
    pub contract_address: Address,
    #[serde(with = "u256_decimal")]
    pub token_id: U256,
    pub chain_id: ChainId,
    pub action: ModuleKind,
    #[serde(with = "u256_decimal_option", default)]
    pub price: Option<U256>,
    pub currency: Option<Address>,
    pub seller: Option<Address>,
}

//! Rarible multichain API collaborator.
use std::{collections::HashMap, str::FromStr};

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use nft_action_common::{
    errors::ProviderError,
    models::{
        listing::{ContentReference, ListingInfo, NftMetadata, Price, SaleKind},
        Chain, Marketplace,
    },
    serde_primitives::parse_decimal_u256,
    traits::MarketplaceProvider,
};
use nft_action_core::identifiers::{host_matches, parse_address, path_segments};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::{error_for_response, map_request_error, parse_json, HttpClientOptions, HttpEndpoint};

pub const RARIBLE_API_URL: &str = "https://api.rarible.org";
/// Rarible documents the header as `X-API-KEY`; header names are case-insensitive.
const API_KEY_HEADER: &str = "x-api-key";
/// Decimals assumed for currencies without a configured entry.
pub const DEFAULT_DECIMALS: u8 = 18;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RaribleItem {
    #[serde(default)]
    creators: Vec<RaribleCreator>,
    meta: Option<RaribleMeta>,
    best_sell_order: Option<RaribleOrder>,
}

#[derive(Debug, Deserialize)]
struct RaribleCreator {
    account: String,
}

#[derive(Debug, Deserialize)]
struct RaribleMeta {
    name: Option<String>,
    #[serde(default)]
    content: Vec<RaribleContent>,
}

#[derive(Debug, Deserialize)]
struct RaribleContent {
    #[serde(rename = "@type")]
    kind: String,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RaribleOrder {
    make_price: String,
    maker: String,
    take: RaribleAsset,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RaribleAsset {
    #[serde(rename = "type")]
    asset_type: RaribleAssetType,
}

#[derive(Debug, Deserialize)]
struct RaribleAssetType {
    #[serde(rename = "@type")]
    kind: String,
    contract: Option<String>,
}

const RARIBLE_HOST: &str = "rarible.com";

/// Chain name Rarible uses in item links. Item ids in the API use its uppercase form.
fn chain_slug(chain: Chain) -> &'static str {
    match chain {
        Chain::Ethereum => "ethereum",
        Chain::Optimism => "optimism",
        Chain::Polygon => "polygon",
        Chain::Base => "base",
        Chain::Arbitrum => "arbitrum",
        Chain::Zora => "zora",
    }
}

fn chain_from_slug(slug: &str) -> Option<Chain> {
    Chain::ALL
        .into_iter()
        .find(|chain| slug.eq_ignore_ascii_case(chain_slug(*chain)))
}

/// Parses a Rarible item link: `https://rarible.com/token/[<chain>/]<contract>:<token id>`.
///
/// Links without a chain segment refer to Ethereum.
pub fn parse_rarible_uri(uri: &Url) -> Option<ContentReference> {
    if !host_matches(uri, RARIBLE_HOST) {
        return None;
    }
    let segments = path_segments(uri)?;
    let (chain, item) = match segments[..] {
        ["token", item] => (Chain::Ethereum, item),
        ["token", chain, item] => (chain_from_slug(chain)?, item),
        _ => return None,
    };
    let (contract, token_id) = item.split_once(':')?;
    Some(ContentReference::new(
        Marketplace::RARIBLE,
        parse_address(contract)?,
        parse_decimal_u256(token_id)?,
        chain.id(),
    ))
}

/// Strips the `BLOCKCHAIN:` prefix Rarible puts in front of account and contract ids.
fn parse_union_address(value: &str) -> Option<Address> {
    let raw = value
        .rsplit_once(':')
        .map_or(value, |(_, address)| address);
    Address::from_str(raw).ok()
}

/// Converts a decimal amount such as `"0.05"` into the currency's smallest unit.
///
/// Returns `None` if the value is not a plain decimal number or has more fractional digits
/// than the currency supports.
pub fn parse_decimal_amount(value: &str, decimals: u8) -> Option<U256> {
    let (whole, fraction) = value
        .split_once('.')
        .unwrap_or((value, ""));
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize || (whole.is_empty() && fraction.is_empty()) {
        return None;
    }
    let whole = if whole.is_empty() { U256::ZERO } else { parse_decimal_u256(whole)? };
    let fraction = if fraction.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{fraction:0<width$}", width = decimals as usize);
        parse_decimal_u256(&padded)?
    };
    let scale = U256::from(10u64).checked_pow(U256::from(decimals))?;
    whole
        .checked_mul(scale)?
        .checked_add(fraction)
}

/// Looks up tokens and their best sell order on Rarible.
#[derive(Debug, Clone)]
pub struct RaribleClient {
    endpoint: HttpEndpoint,
    token_decimals: HashMap<Address, u8>,
}

impl RaribleClient {
    pub fn new(base_uri: &str, options: HttpClientOptions) -> Result<Self, ProviderError> {
        Ok(Self {
            endpoint: HttpEndpoint::new(base_uri, API_KEY_HEADER, &options)?,
            token_decimals: HashMap::new(),
        })
    }

    /// Registers the decimals of an ERC20 currency, e.g. `6` for USDC.
    pub fn with_token_decimals(mut self, token: Address, decimals: u8) -> Self {
        self.token_decimals.insert(token, decimals);
        self
    }

    fn decimals(&self, currency: &Address) -> u8 {
        self.token_decimals
            .get(currency)
            .copied()
            .unwrap_or(DEFAULT_DECIMALS)
    }

    fn order_price(&self, order: &RaribleOrder) -> Result<Price, ProviderError> {
        let currency = match order.take.asset_type.kind.as_str() {
            "ETH" => Address::ZERO,
            "ERC20" => order
                .take
                .asset_type
                .contract
                .as_deref()
                .and_then(parse_union_address)
                .ok_or_else(|| {
                    ProviderError::ParseResponse("ERC20 order without currency contract".to_string())
                })?,
            other => {
                return Err(ProviderError::ParseResponse(format!(
                    "unsupported order currency type: {other}"
                )))
            }
        };
        let amount = parse_decimal_amount(&order.make_price, self.decimals(&currency))
            .ok_or_else(|| {
                ProviderError::ParseResponse(format!("invalid order price: {}", order.make_price))
            })?;
        Ok(Price::new(amount, currency))
    }
}

#[async_trait]
impl MarketplaceProvider for RaribleClient {
    fn marketplace(&self) -> Marketplace {
        Marketplace::RARIBLE
    }

    fn platform_name(&self) -> String {
        "Rarible".to_string()
    }

    fn parse_content_uri(&self, uri: &Url) -> Option<ContentReference> {
        parse_rarible_uri(uri)
    }

    #[instrument(skip(self), fields(reference = %reference))]
    async fn fetch_listing(
        &self,
        reference: &ContentReference,
    ) -> Result<Option<ListingInfo>, ProviderError> {
        let chain = Chain::from_id(reference.chain_id).ok_or_else(|| {
            ProviderError::Fatal(format!("Rarible does not support chain {}", reference.chain_id))
        })?;
        let item_id = format!(
            "{}:{:#x}:{}",
            chain_slug(chain).to_uppercase(),
            reference.contract_address,
            reference.token_id
        );

        let response = self
            .endpoint
            .client()
            .get(self.endpoint.url(&format!("v0.1/items/{item_id}")))
            .send()
            .await
            .map_err(map_request_error)?;
        let response = error_for_response(response).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%item_id, "Rarible does not know the token");
            return Ok(None);
        }
        let item = parse_json::<RaribleItem>(response).await?;

        let mut listing = ListingInfo::unlisted(reference.clone());
        listing.metadata = NftMetadata {
            name: item
                .meta
                .as_ref()
                .and_then(|meta| meta.name.clone()),
            image_url: item.meta.as_ref().and_then(|meta| {
                meta.content
                    .iter()
                    .find(|content| content.kind == "IMAGE")
                    .map(|content| content.url.clone())
            }),
            creator: item
                .creators
                .first()
                .and_then(|creator| parse_union_address(&creator.account)),
        };

        let active_order = item
            .best_sell_order
            .filter(|order| order.status.as_deref().map_or(true, |status| status == "ACTIVE"));
        if let Some(order) = active_order {
            listing.price = Some(self.order_price(&order)?);
            listing.seller = parse_union_address(&order.maker);
            listing.sale_kind = SaleKind::FixedPrice;
        }
        debug!(listed = listing.is_listed(), "Fetched Rarible listing");
        Ok(Some(listing))
    }
}

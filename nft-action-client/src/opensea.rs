//! OpenSea v2 API collaborator.
use std::str::FromStr;

use alloy_primitives::Address;
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

pub const OPENSEA_API_URL: &str = "https://api.opensea.io";
const API_KEY_HEADER: &str = "x-api-key";
const OPENSEA_HOST: &str = "opensea.io";

/// Chain name OpenSea uses in item links and API paths.
fn chain_slug(chain: Chain) -> &'static str {
    match chain {
        Chain::Ethereum => "ethereum",
        Chain::Optimism => "optimism",
        Chain::Polygon => "matic",
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

/// Parses an OpenSea item link: `https://opensea.io/assets/<chain>/<contract>/<token id>`.
///
/// The newer `/item/` prefix is accepted as well. Collection pages and links on unknown chains
/// yield `None`.
pub fn parse_opensea_uri(uri: &Url) -> Option<ContentReference> {
    if !host_matches(uri, OPENSEA_HOST) {
        return None;
    }
    let segments = path_segments(uri)?;
    let [prefix, chain, contract, token_id] = segments[..] else {
        return None;
    };
    if prefix != "assets" && prefix != "item" {
        return None;
    }
    Some(ContentReference::new(
        Marketplace::OPENSEA,
        parse_address(contract)?,
        parse_decimal_u256(token_id)?,
        chain_from_slug(chain)?.id(),
    ))
}

#[derive(Debug, Deserialize)]
struct NftResponse {
    nft: OpenSeaNft,
}

#[derive(Debug, Deserialize)]
struct OpenSeaNft {
    name: Option<String>,
    image_url: Option<String>,
    creator: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingsResponse {
    #[serde(default)]
    orders: Vec<OpenSeaOrder>,
}

#[derive(Debug, Deserialize)]
struct OpenSeaOrder {
    current_price: String,
    maker: Option<OpenSeaAccount>,
    #[serde(default)]
    order_type: String,
    protocol_data: Option<ProtocolData>,
}

#[derive(Debug, Deserialize)]
struct OpenSeaAccount {
    address: Address,
}

#[derive(Debug, Deserialize)]
struct ProtocolData {
    parameters: OrderParameters,
}

#[derive(Debug, Deserialize)]
struct OrderParameters {
    #[serde(default)]
    consideration: Vec<ConsiderationItem>,
}

#[derive(Debug, Deserialize)]
struct ConsiderationItem {
    token: Address,
}

impl OpenSeaOrder {
    fn into_price(self) -> Result<(Price, Option<Address>, SaleKind), ProviderError> {
        let amount = parse_decimal_u256(&self.current_price).ok_or_else(|| {
            ProviderError::ParseResponse(format!("invalid listing price: {}", self.current_price))
        })?;
        // Payments go to the seller first; its token is the listing currency.
        let currency = self
            .protocol_data
            .and_then(|data| {
                data.parameters
                    .consideration
                    .into_iter()
                    .next()
            })
            .map(|item| item.token)
            .unwrap_or(Address::ZERO);
        let sale_kind = match self.order_type.as_str() {
            "english" | "dutch" => SaleKind::Auction,
            _ => SaleKind::FixedPrice,
        };
        Ok((Price::new(amount, currency), self.maker.map(|m| m.address), sale_kind))
    }
}

/// Looks up tokens and their cheapest active listing on OpenSea.
#[derive(Debug, Clone)]
pub struct OpenSeaClient {
    endpoint: HttpEndpoint,
}

impl OpenSeaClient {
    pub fn new(base_uri: &str, options: HttpClientOptions) -> Result<Self, ProviderError> {
        Ok(Self { endpoint: HttpEndpoint::new(base_uri, API_KEY_HEADER, &options)? })
    }

    async fn fetch_metadata(
        &self,
        chain: Chain,
        reference: &ContentReference,
    ) -> Result<Option<NftMetadata>, ProviderError> {
        let url = self.endpoint.url(&format!(
            "api/v2/chain/{}/contract/{:#x}/nfts/{}",
            chain_slug(chain),
            reference.contract_address,
            reference.token_id
        ));
        let response = self
            .endpoint
            .client()
            .get(url)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = error_for_response(response).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let nft = parse_json::<NftResponse>(response).await?.nft;
        Ok(Some(NftMetadata {
            name: nft.name,
            image_url: nft.image_url,
            creator: nft
                .creator
                .as_deref()
                .and_then(|creator| Address::from_str(creator).ok()),
        }))
    }

    async fn fetch_best_order(
        &self,
        chain: Chain,
        reference: &ContentReference,
    ) -> Result<Option<OpenSeaOrder>, ProviderError> {
        let url = self.endpoint.url(&format!(
            "api/v2/orders/{}/seaport/listings",
            chain_slug(chain)
        ));
        let response = self
            .endpoint
            .client()
            .get(url)
            .query(&[
                ("asset_contract_address", format!("{:#x}", reference.contract_address)),
                ("token_ids", reference.token_id.to_string()),
                ("order_by", "eth_price".to_string()),
                ("order_direction", "asc".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(map_request_error)?;
        let response = error_for_response(response).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let listings = parse_json::<ListingsResponse>(response).await?;
        Ok(listings.orders.into_iter().next())
    }
}

#[async_trait]
impl MarketplaceProvider for OpenSeaClient {
    fn marketplace(&self) -> Marketplace {
        Marketplace::OPENSEA
    }

    fn platform_name(&self) -> String {
        "OpenSea".to_string()
    }

    fn parse_content_uri(&self, uri: &Url) -> Option<ContentReference> {
        parse_opensea_uri(uri)
    }

    #[instrument(skip(self), fields(reference = %reference))]
    async fn fetch_listing(
        &self,
        reference: &ContentReference,
    ) -> Result<Option<ListingInfo>, ProviderError> {
        let chain = Chain::from_id(reference.chain_id).ok_or_else(|| {
            ProviderError::Fatal(format!("OpenSea does not support chain {}", reference.chain_id))
        })?;

        let Some(metadata) = self
            .fetch_metadata(chain, reference)
            .await?
        else {
            debug!("OpenSea does not know the token");
            return Ok(None);
        };

        let mut listing = ListingInfo::unlisted(reference.clone());
        listing.metadata = metadata;
        if let Some(order) = self
            .fetch_best_order(chain, reference)
            .await?
        {
            let (price, seller, sale_kind) = order.into_price()?;
            listing.price = Some(price);
            listing.seller = seller;
            listing.sale_kind = sale_kind;
        }
        debug!(listed = listing.is_listed(), "Fetched OpenSea listing");
        Ok(Some(listing))
    }
}

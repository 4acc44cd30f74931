//! Lens GraphQL API collaborator.
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use nft_action_common::{
    errors::ProviderError,
    models::{
        action::{AttachedActionModule, Publication},
        ChainId,
    },
    traits::PublicationProvider,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::http::{error_for_response, map_request_error, parse_json, HttpClientOptions, HttpEndpoint};

pub const LENS_API_URL: &str = "https://api-v2.lens.dev";
/// Optional access token of an authenticated Lens session.
const ACCESS_TOKEN_HEADER: &str = "x-access-token";

const PUBLICATION_QUERY: &str = r#"
fragment OpenActions on PrimaryPublication {
  id
  by { id }
  openActionModules {
    ... on UnknownOpenActionModuleSettings {
      contract { address chainId }
      initializeCalldata
    }
  }
}

query Publication($request: PublicationRequest!) {
  publication(request: $request) {
    ... on Post { ...OpenActions }
    ... on Comment { ...OpenActions }
    ... on Quote { ...OpenActions }
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PublicationData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PublicationData {
    publication: Option<LensPublication>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LensPublication {
    id: Option<String>,
    by: Option<LensProfile>,
    #[serde(default)]
    open_action_modules: Vec<LensOpenActionModule>,
}

#[derive(Debug, Deserialize)]
struct LensProfile {
    id: String,
}

/// Known module types only carry a `__typename`, custom modules expose contract and payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LensOpenActionModule {
    contract: Option<LensContract>,
    initialize_calldata: Option<Bytes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LensContract {
    address: Address,
    chain_id: ChainId,
}

impl LensOpenActionModule {
    fn into_attached(self) -> Option<AttachedActionModule> {
        let contract = self.contract?;
        Some(AttachedActionModule {
            contract_address: contract.address,
            chain_id: contract.chain_id,
            initialize_calldata: self.initialize_calldata?,
        })
    }
}

/// Fetches publications and their open action modules from the Lens API.
#[derive(Debug, Clone)]
pub struct LensClient {
    endpoint: HttpEndpoint,
}

impl LensClient {
    pub fn new(base_uri: &str, options: HttpClientOptions) -> Result<Self, ProviderError> {
        Ok(Self { endpoint: HttpEndpoint::new(base_uri, ACCESS_TOKEN_HEADER, &options)? })
    }
}

#[async_trait]
impl PublicationProvider for LensClient {
    #[instrument(skip(self))]
    async fn fetch_publication(
        &self,
        composite_id: &str,
    ) -> Result<Option<Publication>, ProviderError> {
        let request = GraphQlRequest {
            query: PUBLICATION_QUERY,
            variables: json!({ "request": { "forId": composite_id } }),
        };
        let response = self
            .endpoint
            .client()
            .post(self.endpoint.url("graphql"))
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = error_for_response(response).await?;
        let body = parse_json::<GraphQlResponse>(response).await?;

        if !body.errors.is_empty() {
            let messages: Vec<_> = body
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect();
            warn!(?messages, "Lens API returned errors");
            return Err(ProviderError::Fatal(messages.join("; ")));
        }

        let Some(publication) = body
            .data
            .and_then(|data| data.publication)
        else {
            debug!("Lens does not know the publication");
            return Ok(None);
        };
        // Mirrors and other secondary publications match none of the fragments.
        let (Some(id), Some(by)) = (publication.id, publication.by) else {
            debug!("Publication is not a primary publication");
            return Ok(None);
        };

        let action_modules: Vec<_> = publication
            .open_action_modules
            .into_iter()
            .filter_map(LensOpenActionModule::into_attached)
            .collect();
        debug!(modules = action_modules.len(), "Fetched publication");
        Ok(Some(Publication { id, author_profile_id: by.id, action_modules }))
    }
}

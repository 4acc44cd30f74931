//! Shared plumbing of the HTTP collaborators: client construction, status classification and
//! response parsing.
use std::time::Duration;

use nft_action_common::errors::ProviderError;
use reqwest::{header, Client, ClientBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options shared by all HTTP collaborators.
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// API key sent with every request, header name depends on the collaborator.
    pub api_key: Option<String>,
    /// Total time allowed per request.
    pub timeout: Duration,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientOptions {
    pub fn new() -> Self {
        Self { api_key: None, timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Base URL and preconfigured client of one collaborator API.
#[derive(Debug, Clone)]
pub(crate) struct HttpEndpoint {
    client: Client,
    base_url: String,
}

impl HttpEndpoint {
    /// Creates an endpoint sending `options.api_key` in the `api_key_header` header.
    pub(crate) fn new(
        base_uri: &str,
        api_key_header: &'static str,
        options: &HttpClientOptions,
    ) -> Result<Self, ProviderError> {
        let url = base_uri
            .parse::<Url>()
            .map_err(|e| ProviderError::Fatal(format!("Failed to parse URL {base_uri}: {e}")))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let user_agent = format!("nft-action-client-{version}", version = env!("CARGO_PKG_VERSION"));
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&user_agent)
                .map_err(|e| ProviderError::Fatal(format!("Invalid user agent format: {e}")))?,
        );

        if let Some(key) = options.api_key.as_deref() {
            let mut key_value = header::HeaderValue::from_str(key)
                .map_err(|e| ProviderError::Credentials(format!("Invalid API key format: {e}")))?;
            key_value.set_sensitive(true);
            headers.insert(api_key_header, key_value);
        }

        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| ProviderError::Fatal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url: url.as_str().trim_end_matches('/').to_string() })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }
}

/// Maps transport failures, keeping timeouts distinguishable.
pub(crate) fn map_request_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Converts an error response to a `ProviderError`.
///
/// `404` is passed through: collaborators report unknown entities as `Ok(None)`.
pub(crate) async fn error_for_response(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() || status == StatusCode::NOT_FOUND {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_default();
    debug!(%status, %body, "Collaborator returned an error response");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!(%status, "Credentials were rejected");
            Err(ProviderError::Credentials(format!("{status}: {body}")))
        }
        StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            Err(ProviderError::Timeout(format!("{status}: {body}")))
        }
        s if s.is_server_error() => Err(ProviderError::Network(if body.is_empty() {
            "Server unreachable".to_string()
        } else {
            body
        })),
        _ => Err(ProviderError::Fatal(format!("{status}: {body}"))),
    }
}

/// Reads and deserializes a JSON body, keeping the raw body in the error for debugging.
pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let body = response
        .text()
        .await
        .map_err(map_request_error)?;
    serde_json::from_str(&body).map_err(|e| ProviderError::ParseResponse(format!("{e}: {body}")))
}

//! Configuration: module deployments from YAML and collaborator settings from the environment.
use std::{fs::File, io::Read, sync::Arc, time::Duration};

use alloy_primitives::Address;
use nft_action_common::errors::ProviderError;
use nft_action_core::{ActionKit, ModuleDeployment, ModuleRegistry};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    decent::DecentClient,
    http::HttpClientOptions,
    lens::LensClient,
    opensea::OpenSeaClient,
    rarible::RaribleClient,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to set up collaborator: {0}")]
    Provider(#[from] ProviderError),
}

/// An ERC20 currency whose decimals differ from the default of 18.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenDecimals {
    pub address: Address,
    pub decimals: u8,
}

/// Content of the modules YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleConfig {
    pub deployments: Vec<ModuleDeployment>,
    #[serde(default)]
    pub tokens: Vec<TokenDecimals>,
}

impl ModuleConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_yaml(path: &str) -> Result<Self, ConfigError> {
        let mut file = File::open(path).map_err(|e| ConfigError::Io(path.to_string(), e))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ConfigError::Io(path.to_string(), e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn registry(&self) -> ModuleRegistry {
        ModuleRegistry::new(self.deployments.clone())
    }
}

/// Endpoints and credentials of the HTTP collaborators.
///
/// A collaborator without credentials is left out of the kit; operations needing it fail with
/// a typed error instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub opensea_api_key: Option<String>,
    pub opensea_url: String,
    pub rarible_api_key: Option<String>,
    pub rarible_url: String,
    pub decent_api_key: Option<String>,
    pub decent_url: String,
    /// Slippage tolerance of bridge routes, in percent.
    pub decent_slippage: f64,
    /// The Lens API is public, it is only disabled by an empty URL.
    pub lens_url: String,
    pub lens_access_token: Option<String>,
    pub timeout: Duration,
}

/// Treats empty strings, as produced by unset-but-exported variables, as missing.
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Assembles an [`ActionKit`] from the module config and the collaborator settings.
pub fn build_kit(modules: &ModuleConfig, settings: &ProviderSettings) -> Result<ActionKit, ConfigError> {
    let options = |api_key: Option<String>| {
        HttpClientOptions::new()
            .with_api_key(api_key)
            .with_timeout(settings.timeout)
    };
    let mut builder = ActionKit::builder(modules.registry());

    match present(&settings.opensea_api_key) {
        Some(key) => {
            builder = builder.marketplace(Arc::new(OpenSeaClient::new(
                &settings.opensea_url,
                options(Some(key)),
            )?));
            info!(url = %settings.opensea_url, "OpenSea configured");
        }
        None => warn!("No OpenSea API key set, OpenSea links are not supported"),
    }

    match present(&settings.rarible_api_key) {
        Some(key) => {
            let rarible = modules.tokens.iter().fold(
                RaribleClient::new(&settings.rarible_url, options(Some(key)))?,
                |client, token| client.with_token_decimals(token.address, token.decimals),
            );
            builder = builder.marketplace(Arc::new(rarible));
            info!(url = %settings.rarible_url, "Rarible configured");
        }
        None => warn!("No Rarible API key set, Rarible links are not supported"),
    }

    match present(&settings.decent_api_key) {
        Some(key) => {
            let decent = DecentClient::new(&settings.decent_url, options(Some(key)))?
                .with_slippage(settings.decent_slippage);
            builder = builder.bridge(Arc::new(decent));
            info!(url = %settings.decent_url, slippage = settings.decent_slippage, "Decent bridge configured");
        }
        None => warn!("No Decent API key set, cross-chain actions cannot be routed"),
    }

    if settings.lens_url.trim().is_empty() {
        warn!("No Lens API URL set, post actions cannot be resolved");
    } else {
        builder = builder.publications(Arc::new(LensClient::new(
            &settings.lens_url,
            options(present(&settings.lens_access_token)),
        )?));
        info!(url = %settings.lens_url, "Lens configured");
    }

    Ok(builder.build())
}

use std::{fs, time::Duration};

use alloy_primitives::Address;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use nft_action_common::models::{
    execution::{ExecutionParams, ExecutionRequest},
    ChainId,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{build_kit, ModuleConfig, ProviderSettings},
    decent::{DECENT_API_URL, DEFAULT_SLIPPAGE},
    http::DEFAULT_TIMEOUT,
    lens::LENS_API_URL,
    opensea::OPENSEA_API_URL,
    rarible::RARIBLE_API_URL,
};

/// NFT open action CLI
///
/// Detects purchase actions for marketplace NFTs and builds the calldata executing the action
/// attached to a Lens post. Results are printed as JSON on stdout, logs go to stderr.
#[derive(Parser, PartialEq, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    global_args: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn args(&self) -> GlobalArgs {
        self.global_args.clone()
    }

    pub fn command(&self) -> Command {
        self.command.clone()
    }
}

#[derive(Subcommand, Clone, PartialEq, Debug)]
pub enum Command {
    /// Detects the open action for an NFT marketplace link.
    Detect(DetectArgs),
    /// Prints what a front end needs to render an NFT marketplace link.
    UiData(UiDataArgs),
    /// Builds the calldata executing the action attached to a post.
    Act(ActArgs),
    /// Builds the calldata for an execution request read from a JSON file.
    Calldata(CalldataArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct GlobalArgs {
    /// YAML file listing the open action module deployments
    #[clap(long, env = "NFT_ACTION_MODULES", default_value = "config/modules.yaml")]
    pub modules: String,

    /// OpenSea API key, OpenSea links are unsupported without it
    #[clap(long, env = "OPENSEA_API_KEY", hide_env_values = true)]
    pub opensea_api_key: Option<String>,

    #[clap(long, env = "OPENSEA_API_URL", default_value = OPENSEA_API_URL)]
    pub opensea_url: String,

    /// Rarible API key, Rarible links are unsupported without it
    #[clap(long, env = "RARIBLE_API_KEY", hide_env_values = true)]
    pub rarible_api_key: Option<String>,

    #[clap(long, env = "RARIBLE_API_URL", default_value = RARIBLE_API_URL)]
    pub rarible_url: String,

    /// Decent API key, cross-chain actions cannot be routed without it
    #[clap(long, env = "DECENT_API_KEY", hide_env_values = true)]
    pub decent_api_key: Option<String>,

    #[clap(long, env = "DECENT_API_URL", default_value = DECENT_API_URL)]
    pub decent_url: String,

    /// Slippage tolerance of bridge routes, in percent
    #[clap(long, env = "DECENT_SLIPPAGE", default_value_t = DEFAULT_SLIPPAGE)]
    pub slippage: f64,

    /// Lens API endpoint. An empty value disables post lookups.
    #[clap(long, env = "LENS_API_URL", default_value = LENS_API_URL)]
    pub lens_url: String,

    #[clap(long, env = "LENS_ACCESS_TOKEN", hide_env_values = true)]
    pub lens_access_token: Option<String>,

    /// Timeout of a single collaborator request, in seconds
    #[clap(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Enable verbose logging.
    #[clap(long)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            opensea_api_key: self.opensea_api_key.clone(),
            opensea_url: self.opensea_url.clone(),
            rarible_api_key: self.rarible_api_key.clone(),
            rarible_url: self.rarible_url.clone(),
            decent_api_key: self.decent_api_key.clone(),
            decent_url: self.decent_url.clone(),
            decent_slippage: self.slippage,
            lens_url: self.lens_url.clone(),
            lens_access_token: self.lens_access_token.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DetectArgs {
    /// Marketplace link of a single NFT
    pub content_uri: String,

    /// Decimal id of the client profile publishing the post
    #[clap(long, default_value = "10")]
    pub publishing_profile_id: String,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UiDataArgs {
    /// Marketplace link of a single NFT
    pub content_uri: String,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ActArgs {
    /// Post link or composite publication id, e.g. 0x2a6b-0x01d8
    pub post_link: String,

    #[clap(long, default_value_t = 1, allow_negative_numbers = true)]
    pub quantity: i64,

    /// Decimal id of the profile performing the action
    #[clap(long)]
    pub actor_profile_id: String,

    /// Decimal id of the client profile executing the action
    #[clap(long, default_value = "10")]
    pub executing_client_profile_id: String,

    /// Address signing the transaction
    #[clap(long)]
    pub sender: Address,

    /// Owner of the actor profile. Defaults to the sender.
    #[clap(long)]
    pub profile_owner: Option<Address>,

    /// Chain the transaction is sent on
    #[clap(long)]
    pub src_chain_id: ChainId,

    /// Token paid with on the source chain, zero address for the native currency
    #[clap(long, default_value_t = Address::ZERO)]
    pub payment_token: Address,

    #[clap(long)]
    pub source_url: Option<String>,
}

impl ActArgs {
    pub fn params(&self) -> ExecutionParams {
        ExecutionParams {
            quantity: self.quantity,
            actor_profile_id: self.actor_profile_id.clone(),
            executing_client_profile_id: self
                .executing_client_profile_id
                .clone(),
            sender_address: self.sender,
            profile_owner_address: self.profile_owner.unwrap_or(self.sender),
            src_chain_id: self.src_chain_id,
            payment_token: self.payment_token,
            source_url: self.source_url.clone(),
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CalldataArgs {
    /// JSON file holding the action, the publication and the execution parameters
    pub request: String,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set up logging subscriber")
}

pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let args = cli.args();
    init_tracing(args.verbose)?;
    info!("Running with version: {}", option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"));

    let modules = ModuleConfig::from_yaml(&args.modules)?;
    debug!(deployments = modules.deployments.len(), path = %args.modules, "Loaded module config");
    let kit = build_kit(&modules, &args.provider_settings())?;

    match cli.command() {
        Command::Detect(detect) => {
            let action = kit
                .detect_action(&detect.content_uri, &detect.publishing_profile_id)
                .await?;
            print_json(&action)
        }
        Command::UiData(ui_data) => {
            let display = kit
                .generate_display_data(&ui_data.content_uri)
                .await?;
            if display.is_none() {
                warn!(uri = %ui_data.content_uri, "Marketplace does not know the NFT");
            }
            print_json(&display)
        }
        Command::Act(act) => {
            let outcome = kit
                .action_from_post(&act.post_link, act.params())
                .await?;
            print_json(&outcome)
        }
        Command::Calldata(calldata) => {
            let contents = fs::read_to_string(&calldata.request)
                .with_context(|| format!("Failed to read {}", calldata.request))?;
            let request: ExecutionRequest = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", calldata.request))?;
            let result = kit
                .build_execution_calldata(&request)
                .await?;
            print_json(&result)
        }
    }
}

//! HTTP collaborators, configuration and CLI around the open action engine.
//!
//! The marketplace, publication and bridge clients implement the collaborator traits of
//! `nft-action-common` and are wired into an [`nft_action_core::ActionKit`] by
//! [`config::build_kit`].
pub mod cli;
pub mod config;
pub mod decent;
pub mod http;
pub mod lens;
pub mod opensea;
pub mod rarible;

pub use decent::DecentClient;
pub use http::HttpClientOptions;
pub use lens::LensClient;
pub use opensea::OpenSeaClient;
pub use rarible::RaribleClient;

//! Shared models, collaborator traits and error types of the NFT open action kit.
//!
//! Everything in here is plain data or an interface. The resolution and calldata logic lives in
//! `nft-action-core`, concrete collaborators live in `nft-action-client`.
pub mod errors;
pub mod models;
pub mod serde_primitives;
pub mod traits;

pub use alloy_primitives::{Address, Bytes, U256};

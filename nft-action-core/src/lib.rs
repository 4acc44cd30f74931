//! Resolution of NFT purchase open actions and construction of their execution calldata.
//!
//! [`ActionKit`] is the entry point. The modules below are public so that individual steps
//! (parsing a post link, decoding a composite publication id, encoding an action call) can be
//! used on their own.
pub mod abi;
pub mod assembler;
pub mod identifiers;
pub mod kit;
pub mod modules;
pub mod publication;
pub mod resolver;
pub mod router;

pub use kit::{ActionKit, ActionKitBuilder};
pub use modules::{ModuleDeployment, ModuleRegistry};

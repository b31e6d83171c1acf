//! Chain identifiers and the catalog of networks the app offers.
//!
//! # Data Flow
//! ```text
//! config.networks (TOML)
//!     → types.rs (ChainId, Network)
//!     → NetworkCatalog (ordered, immutable)
//!     → shared via Arc with the NetworkSwitcher and the CLI
//! ```
//!
//! Chain ids are opaque integers; the catalog only decides which of them
//! the app is willing to switch to.

pub mod types;

pub use types::{ChainId, Network, NetworkCatalog};

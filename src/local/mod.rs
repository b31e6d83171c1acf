//! Local private-key wallet.
//!
//! # Data Flow
//! ```text
//! Environment Variable (private key)
//!     → wallet.rs (key loading, message + transfer signing, nonces)
//!     → connector.rs (Connector / SessionTransport for the wallet core)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or signatures
//! - Transfers are signed, never broadcast

pub mod connector;
pub mod wallet;

pub use connector::{LocalConnector, LocalSession};
pub use wallet::LocalWallet;

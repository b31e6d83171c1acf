//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → WalletConfig (validated, immutable)
//!     → passed explicitly (Arc) to WalletContext at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded and lives for the process
//! - No global: every component receives what it needs through its constructor
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::DeepLinkConfig;
pub use schema::LocalWalletConfig;
pub use schema::ObservabilityConfig;
pub use schema::WalletConfig;
pub use schema::WalletEntryConfig;

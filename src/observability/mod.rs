//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All wallet components produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges via the `metrics` facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → whatever recorder the host installs (none by default)
//! ```
//!
//! # Design Decisions
//! - Structured fields (wallet_id, chain_id, request_id), never free-form interpolation
//! - Signatures and private keys are never logged
//! - Metrics are cheap; without a recorder they are no-ops

pub mod logging;
pub mod metrics;

pub use logging::init_logging;

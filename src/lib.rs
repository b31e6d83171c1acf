//! Wallet Connection Orchestration Library
//!
//! Resolves a user's wallet choice to a provider session, tracks the
//! connection state, switches networks, survives mobile deep-link handoffs
//! across page loads, and sequences signing / transaction requests.
//!
//! ```text
//!   UI event ──▶ registry ──▶ orchestrator ──▶ session (watch) ──▶ UI observers
//!                   │              ▲                 │
//!                   │ not found    │ page load       ├──▶ network switcher
//!                   ▼              │                 └──▶ signing gateway
//!            modal / deep link ──▶ recovery (persisted store)
//! ```

pub mod chain;
pub mod config;
pub mod local;
pub mod observability;
pub mod wallet;

pub use chain::{ChainId, NetworkCatalog};
pub use config::WalletConfig;
pub use wallet::{ConnectionStatus, Outcome, Selection, WalletContext, WalletError};

//! Wallet connection orchestration.
//!
//! # Data Flow
//! ```text
//! registry.rs      wallet id → Connector (ordered match strategies)
//!     → orchestrator.rs   connect / disconnect, one attempt at a time
//!         → state.rs      SessionSnapshot (single shared session, watch channel)
//!     → network.rs        chain switch on the live session
//!     → signing.rs        sign / send, latest completed outcome per kind
//!
//! handoff.rs       mobile deep link, page navigates away
//!     → recovery.rs       record before leaving, replay once on next load
//!         → store.rs      persisted key-value store
//! ```
//!
//! # Concurrency
//! All mutation of the session goes through [`SessionStore`], which applies
//! one event at a time; asynchronous completions land in the order they
//! complete. Nothing here imposes timeouts: the provider owns those, and a
//! user closing the wallet prompt is a `Rejected` failure.

pub mod connector;
pub mod context;
pub mod error;
pub mod handoff;
pub mod network;
pub mod orchestrator;
pub mod recovery;
pub mod registry;
pub mod signing;
pub mod state;
pub mod store;

pub use connector::{Connector, EstablishedSession, SessionTransport};
pub use context::{Collaborators, Selection, WalletContext};
pub use error::{Outcome, ProviderError, WalletError, WalletResult};
pub use handoff::{ConnectModal, DeviceKind, Navigator, RecordingNavigator};
pub use network::NetworkSwitcher;
pub use orchestrator::ConnectionOrchestrator;
pub use recovery::{PendingConnectionRecovery, PendingHandoff, RecoveryReport};
pub use registry::{ConnectorRegistry, MatchStrategy, WalletDescriptor};
pub use signing::{OutcomeLedger, OutcomeStore, SigningGateway};
pub use state::{ConnectionStatus, SessionEvent, SessionSnapshot, SessionStore};
pub use store::{FileStore, KeyValueStore, MemoryStore};

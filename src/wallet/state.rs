//! Session state machine.
//!
//! # States
//! - Disconnected: no session
//! - Connecting: one connector invocation in flight
//! - Connected: address and chain id populated
//! - SwitchingNetwork: chain change requested on the live session
//! - Error: last connect attempt failed; a fresh connect is allowed
//!
//! # State Transitions
//! ```text
//! Disconnected | Error  → Connecting        : ConnectRequested
//! Connecting            → Connected         : Established
//! Connecting            → Error             : ConnectFailed
//! Connected             → SwitchingNetwork  : SwitchRequested
//! SwitchingNetwork      → Connected         : SwitchSucceeded (new chain)
//! SwitchingNetwork      → Connected         : SwitchFailed (chain unchanged)
//! Connected             → Disconnected      : Disconnected
//! ```
//!
//! Every asynchronous operation ends in exactly one event, and
//! [`SessionSnapshot::apply`] is the only place the snapshot changes.
//! Events that arrive in a state that does not accept them are rejected
//! with [`WalletError::InvalidStateTransition`]; `Disconnected` outside
//! `Connected` is a no-op.

use std::fmt;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use serde::Serialize;
use tokio::sync::watch;

use crate::chain::ChainId;
use crate::wallet::connector::SessionTransport;
use crate::wallet::error::{ProviderError, WalletError, WalletResult};

/// Connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    SwitchingNetwork,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::SwitchingNetwork => "switching network",
            ConnectionStatus::Error => "in error",
        };
        f.write_str(s)
    }
}

/// Transition input. One per completed (or started) operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ConnectRequested {
        connector: String,
    },
    Established {
        connector: String,
        address: Address,
        chain_id: ChainId,
    },
    ConnectFailed(ProviderError),
    SwitchRequested(ChainId),
    SwitchSucceeded(ChainId),
    SwitchFailed(ProviderError),
    Disconnected,
}

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: ConnectionStatus,
    /// Connector the session was (or is being) established with.
    pub connector: Option<String>,
    pub address: Option<Address>,
    pub chain_id: Option<ChainId>,
    /// Chain requested while `SwitchingNetwork`.
    pub pending_chain_id: Option<ChainId>,
    /// Most recent connect or switch failure.
    pub last_error: Option<ProviderError>,
    /// Bumped on every established session.
    pub epoch: u64,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Apply one event. Returns whether the snapshot changed.
    pub fn apply(&mut self, event: SessionEvent) -> WalletResult<bool> {
        use ConnectionStatus::*;

        match (self.status, event) {
            (Disconnected | Error, SessionEvent::ConnectRequested { connector }) => {
                *self = SessionSnapshot {
                    status: Connecting,
                    connector: Some(connector),
                    epoch: self.epoch,
                    ..SessionSnapshot::default()
                };
                Ok(true)
            }
            (Connecting, SessionEvent::ConnectRequested { .. }) => Err(WalletError::ConnectInFlight),
            (status, SessionEvent::ConnectRequested { .. }) => {
                Err(WalletError::InvalidStateTransition {
                    operation: "connect",
                    status,
                })
            }

            (
                Connecting,
                SessionEvent::Established {
                    connector,
                    address,
                    chain_id,
                },
            ) => {
                *self = SessionSnapshot {
                    status: Connected,
                    connector: Some(connector),
                    address: Some(address),
                    chain_id: Some(chain_id),
                    pending_chain_id: None,
                    last_error: None,
                    epoch: self.epoch + 1,
                };
                Ok(true)
            }
            (Connecting, SessionEvent::ConnectFailed(reason)) => {
                // No partial session state survives a failed attempt.
                *self = SessionSnapshot {
                    status: Error,
                    connector: self.connector.take(),
                    last_error: Some(reason),
                    epoch: self.epoch,
                    ..SessionSnapshot::default()
                };
                Ok(true)
            }

            (Connected, SessionEvent::SwitchRequested(target)) => {
                self.status = SwitchingNetwork;
                self.pending_chain_id = Some(target);
                Ok(true)
            }
            (SwitchingNetwork, SessionEvent::SwitchSucceeded(chain_id)) => {
                self.status = Connected;
                self.chain_id = Some(chain_id);
                self.pending_chain_id = None;
                self.last_error = None;
                Ok(true)
            }
            (SwitchingNetwork, SessionEvent::SwitchFailed(reason)) => {
                self.status = Connected;
                self.pending_chain_id = None;
                self.last_error = Some(reason);
                Ok(true)
            }

            (Connected, SessionEvent::Disconnected) => {
                *self = SessionSnapshot {
                    epoch: self.epoch,
                    ..SessionSnapshot::default()
                };
                Ok(true)
            }
            (_, SessionEvent::Disconnected) => Ok(false),

            (status, event) => Err(WalletError::InvalidStateTransition {
                operation: event_operation(&event),
                status,
            }),
        }
    }
}

fn event_operation(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::ConnectRequested { .. } => "connect",
        SessionEvent::Established { .. } => "establish a session",
        SessionEvent::ConnectFailed(_) => "fail a connect attempt",
        SessionEvent::SwitchRequested(_) => "switch network",
        SessionEvent::SwitchSucceeded(_) | SessionEvent::SwitchFailed(_) => "complete a network switch",
        SessionEvent::Disconnected => "disconnect",
    }
}

/// The single shared session.
///
/// Owned by the orchestrator and the network switcher, read-only for
/// everyone else. Observers subscribe to snapshot changes.
pub struct SessionStore {
    tx: watch::Sender<SessionSnapshot>,
    transport: Mutex<Option<Arc<dyn SessionTransport>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            tx,
            transport: Mutex::new(None),
        }
    }

    /// Current snapshot (cloned).
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.tx.borrow().status
    }

    /// Receive every subsequent snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Apply an event atomically and notify observers on change.
    pub(crate) fn apply(&self, event: SessionEvent) -> WalletResult<bool> {
        let mut result = Ok(false);
        self.tx.send_if_modified(|snapshot| match snapshot.apply(event) {
            Ok(changed) => {
                result = Ok(changed);
                changed
            }
            Err(e) => {
                result = Err(e);
                false
            }
        });
        result
    }

    /// Transport of the live session, if any.
    pub(crate) fn transport(&self) -> Option<Arc<dyn SessionTransport>> {
        self.transport
            .lock()
            .expect("session transport mutex poisoned")
            .clone()
    }

    pub(crate) fn set_transport(&self, transport: Arc<dyn SessionTransport>) {
        *self.transport.lock().expect("session transport mutex poisoned") = Some(transport);
    }

    pub(crate) fn take_transport(&self) -> Option<Arc<dyn SessionTransport>> {
        self.transport
            .lock()
            .expect("session transport mutex poisoned")
            .take()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

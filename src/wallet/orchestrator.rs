//! Connection orchestration.
//!
//! # Responsibilities
//! - Drive `connect` / `disconnect` through the session state machine
//! - Reject a second connect while one is in flight (no queueing)
//! - Keep provider failures as state (`Error` + reason), never as `Err`
//! - Reset signature / transaction results whenever the session changes

use std::sync::Arc;

use alloy::primitives::Address;

use crate::observability::metrics;
use crate::wallet::connector::Connector;
use crate::wallet::error::{Outcome, WalletResult};
use crate::wallet::signing::OutcomeStore;
use crate::wallet::state::{ConnectionStatus, SessionEvent, SessionSnapshot, SessionStore};

/// Owns the connection lifecycle of the single shared session.
#[derive(Clone)]
pub struct ConnectionOrchestrator {
    session: Arc<SessionStore>,
    outcomes: Arc<OutcomeStore>,
}

impl ConnectionOrchestrator {
    pub fn new(session: Arc<SessionStore>, outcomes: Arc<OutcomeStore>) -> Self {
        Self { session, outcomes }
    }

    /// Connect through `connector`.
    ///
    /// Requires `Disconnected` or `Error`. `Err` means the call itself was
    /// not allowed (already connecting or connected); a wallet that declines
    /// or fails yields `Ok(Outcome::Failure)` and status `Error`.
    pub async fn connect(&self, connector: &dyn Connector) -> WalletResult<Outcome<Address>> {
        let name = connector.name().to_string();
        if let Err(e) = self.session.apply(SessionEvent::ConnectRequested {
            connector: name.clone(),
        }) {
            tracing::warn!(connector = %name, error = %e, "Connect refused");
            return Err(e);
        }
        tracing::info!(connector = %name, connector_id = %connector.id(), "Connecting");

        match connector.initiate_session().await {
            Ok(established) => {
                self.session.set_transport(established.transport.clone());
                self.session.apply(SessionEvent::Established {
                    connector: name.clone(),
                    address: established.address,
                    chain_id: established.chain_id,
                })?;
                self.outcomes.clear();

                metrics::record_connect("success");
                metrics::record_session_connected(true);
                tracing::info!(
                    connector = %name,
                    address = %established.address,
                    chain_id = %established.chain_id,
                    "Wallet connected"
                );
                Ok(Outcome::Success(established.address))
            }
            Err(reason) => {
                self.session.apply(SessionEvent::ConnectFailed(reason.clone()))?;

                metrics::record_connect(reason.label());
                tracing::warn!(connector = %name, reason = %reason, "Connect failed");
                Ok(Outcome::Failure(reason))
            }
        }
    }

    /// Tear down the session. No-op unless `Connected`.
    pub async fn disconnect(&self) {
        let changed = self.session.apply(SessionEvent::Disconnected).unwrap_or(false);
        if !changed {
            tracing::debug!(status = %self.session.status(), "Disconnect ignored");
            return;
        }
        self.outcomes.clear();
        metrics::record_session_connected(false);

        if let Some(transport) = self.session.take_transport() {
            transport.close().await;
        }
        tracing::info!("Wallet disconnected");
    }

    pub fn status(&self) -> ConnectionStatus {
        self.session.status()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }
}

//! Active-chain switching on an established session.

use std::sync::Arc;

use crate::chain::{ChainId, NetworkCatalog};
use crate::observability::metrics;
use crate::wallet::error::{Outcome, ProviderError, WalletError, WalletResult};
use crate::wallet::state::{ConnectionStatus, SessionEvent, SessionStore};

/// Requests chain changes on the live session.
#[derive(Clone)]
pub struct NetworkSwitcher {
    session: Arc<SessionStore>,
    catalog: Arc<NetworkCatalog>,
}

impl NetworkSwitcher {
    pub fn new(session: Arc<SessionStore>, catalog: Arc<NetworkCatalog>) -> Self {
        Self { session, catalog }
    }

    /// Switch to `chain_id`. Only valid while `Connected`.
    ///
    /// The already-active chain returns immediately without a provider call.
    /// A failed switch returns to `Connected` on the previous chain and
    /// records the reason in the session snapshot.
    pub async fn switch_to(&self, chain_id: ChainId) -> WalletResult<Outcome<ChainId>> {
        let snapshot = self.session.snapshot();
        if snapshot.status != ConnectionStatus::Connected {
            tracing::warn!(status = %snapshot.status, chain_id = %chain_id, "Network switch refused");
            return Err(WalletError::InvalidStateTransition {
                operation: "switch network",
                status: snapshot.status,
            });
        }
        if snapshot.chain_id == Some(chain_id) {
            tracing::debug!(chain_id = %chain_id, "Already on requested chain");
            metrics::record_network_switch("noop");
            return Ok(Outcome::Success(chain_id));
        }

        self.session.apply(SessionEvent::SwitchRequested(chain_id))?;
        tracing::info!(
            from = ?snapshot.chain_id,
            to = %chain_id,
            network = %self.catalog.name_of(chain_id),
            "Switching network"
        );

        let result = if !self.catalog.supports(chain_id) {
            Err(ProviderError::UnsupportedChain(chain_id))
        } else {
            match self.session.transport() {
                Some(transport) => transport.request_chain_switch(chain_id).await,
                None => Err(ProviderError::Fault("no session transport".to_string())),
            }
        };

        match result {
            Ok(()) => {
                self.session.apply(SessionEvent::SwitchSucceeded(chain_id))?;
                metrics::record_network_switch("success");
                tracing::info!(chain_id = %chain_id, "Network switched");
                Ok(Outcome::Success(chain_id))
            }
            Err(reason) => {
                self.session.apply(SessionEvent::SwitchFailed(reason.clone()))?;
                metrics::record_network_switch(reason.label());
                tracing::warn!(chain_id = %chain_id, reason = %reason, "Network switch failed");
                Ok(Outcome::Failure(reason))
            }
        }
    }

    pub fn catalog(&self) -> &NetworkCatalog {
        &self.catalog
    }
}

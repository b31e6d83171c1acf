//! Recovery of a connection attempt interrupted by a mobile handoff.
//!
//! # Lifecycle
//! ```text
//! record(walletId)          written right before navigating to the wallet app
//!     … page unloads, user approves in the wallet, browser comes back …
//! consume_and_recover()     first page load: read → delete → resolve → connect
//! ```
//!
//! The record is deleted before any connect attempt (at-most-once): a
//! failing recovery is never retried on a later reload. A record found
//! while a session is already connected is deleted without being acted on.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::wallet::error::{Outcome, WalletError, WalletResult};
use crate::wallet::orchestrator::ConnectionOrchestrator;
use crate::wallet::registry::ConnectorRegistry;
use crate::wallet::signing::unix_now;
use crate::wallet::state::ConnectionStatus;
use crate::wallet::store::KeyValueStore;

/// Durable record of an in-flight mobile handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingHandoff {
    pub wallet_id: String,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
}

/// What happened on page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryReport {
    /// No record persisted; nothing was touched.
    NoRecord,
    /// A session was already connected; the record was discarded.
    AlreadyConnected { wallet_id: String },
    /// The record was older than the configured limit; discarded.
    Stale { wallet_id: String, age_secs: u64 },
    /// The record could not be decoded; discarded.
    Corrupt,
    /// No connector matches the wallet any more; silent.
    Unresolved { wallet_id: String },
    /// A connect call was refused by the state machine (e.g. already connecting).
    Refused { wallet_id: String },
    /// A connect attempt was made.
    Attempted {
        wallet_id: String,
        outcome: Outcome<Address>,
    },
}

/// Persists and replays the pending handoff record.
#[derive(Clone)]
pub struct PendingConnectionRecovery {
    store: Arc<dyn KeyValueStore>,
    key: String,
    max_age: Option<Duration>,
}

impl PendingConnectionRecovery {
    /// `max_age` of `None` replays records of any age.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, max_age: Option<Duration>) -> Self {
        Self {
            store,
            key: key.into(),
            max_age,
        }
    }

    /// Persist the handoff record for `wallet_id`. Call right before navigating away.
    pub fn record(&self, wallet_id: &str) -> WalletResult<PendingHandoff> {
        let handoff = PendingHandoff {
            wallet_id: wallet_id.to_string(),
            created_at: unix_now(),
        };
        let encoded = serde_json::to_string(&handoff)
            .map_err(|e| WalletError::Storage(format!("encode handoff: {}", e)))?;
        self.store.set(&self.key, &encoded)?;
        metrics::record_handoff("recorded");
        tracing::info!(wallet_id = %wallet_id, "Pending handoff recorded");
        Ok(handoff)
    }

    /// Drop the record without acting on it.
    pub fn discard(&self) -> WalletResult<()> {
        self.store.delete(&self.key)
    }

    /// Currently persisted record, if any. Does not consume it.
    pub fn peek(&self) -> WalletResult<Option<PendingHandoff>> {
        match self.store.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw).ok()),
            None => Ok(None),
        }
    }

    /// Run once per page load.
    ///
    /// `Err` only for store failures; every wallet-side problem ends silently
    /// in a [`RecoveryReport`].
    pub async fn consume_and_recover(
        &self,
        registry: &ConnectorRegistry,
        orchestrator: &ConnectionOrchestrator,
    ) -> WalletResult<RecoveryReport> {
        let raw = match self.store.get(&self.key)? {
            Some(raw) => raw,
            None => return Ok(RecoveryReport::NoRecord),
        };
        // At-most-once: gone before anything else happens.
        self.store.delete(&self.key)?;

        let handoff: PendingHandoff = match serde_json::from_str(&raw) {
            Ok(h) => h,
            Err(e) => {
                metrics::record_handoff("corrupt");
                tracing::warn!(error = %e, "Discarding unreadable handoff record");
                return Ok(RecoveryReport::Corrupt);
            }
        };
        let wallet_id = handoff.wallet_id;

        if orchestrator.status() == ConnectionStatus::Connected {
            metrics::record_handoff("discarded");
            tracing::info!(wallet_id = %wallet_id, "Session already connected, discarding handoff");
            return Ok(RecoveryReport::AlreadyConnected { wallet_id });
        }

        let age_secs = unix_now().saturating_sub(handoff.created_at);
        if let Some(max_age) = self.max_age {
            if age_secs > max_age.as_secs() {
                metrics::record_handoff("stale");
                tracing::info!(wallet_id = %wallet_id, age_secs, "Discarding stale handoff");
                return Ok(RecoveryReport::Stale { wallet_id, age_secs });
            }
        }

        let connector = match registry.resolve(&wallet_id) {
            Ok(c) => c,
            Err(_) => {
                metrics::record_handoff("unresolved");
                tracing::info!(wallet_id = %wallet_id, "Handoff wallet not available, abandoning");
                return Ok(RecoveryReport::Unresolved { wallet_id });
            }
        };

        tracing::info!(wallet_id = %wallet_id, connector_id = %connector.id(), "Resuming handoff");
        match orchestrator.connect(connector.as_ref()).await {
            Ok(outcome) => {
                metrics::record_handoff(if outcome.is_success() { "recovered" } else { "failed" });
                Ok(RecoveryReport::Attempted { wallet_id, outcome })
            }
            Err(e) => {
                tracing::warn!(wallet_id = %wallet_id, error = %e, "Handoff recovery refused");
                Ok(RecoveryReport::Refused { wallet_id })
            }
        }
    }
}

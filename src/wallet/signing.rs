//! Message signing and transaction submission against the live session.
//!
//! # Ordering
//! Requests of the same kind may overlap at the provider; the ledger always
//! holds the most recently *completed* outcome, whatever order the requests
//! were issued in.
//!
//! # Session scoping
//! A request remembers the session epoch it was dispatched under. If the
//! session was torn down or replaced before the provider answered, the
//! outcome is dropped instead of leaking into the next session's ledger.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::schema::SigningConfig;
use crate::observability::metrics;
use crate::wallet::error::{Outcome, ProviderError};
use crate::wallet::state::{ConnectionStatus, SessionStore};

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A message signing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningRequest {
    pub id: Uuid,
    pub payload: String,
    pub requested_at: u64,
}

impl SigningRequest {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload: payload.into(),
            requested_at: unix_now(),
        }
    }
}

/// A native-value transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub id: Uuid,
    pub to: Address,
    pub value: U256,
    pub requested_at: u64,
}

impl TransactionRequest {
    pub fn new(to: Address, value: U256) -> Self {
        Self {
            id: Uuid::new_v4(),
            to,
            value,
            requested_at: unix_now(),
        }
    }
}

/// Latest results of one request kind.
///
/// A success replaces the previous success and clears the failure; a
/// failure replaces the previous failure and keeps the last success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeSlot<T> {
    pub success: Option<T>,
    pub failure: Option<ProviderError>,
}

impl<T> Default for OutcomeSlot<T> {
    fn default() -> Self {
        Self {
            success: None,
            failure: None,
        }
    }
}

impl<T> OutcomeSlot<T> {
    fn record(&mut self, outcome: Outcome<T>) {
        match outcome {
            Outcome::Success(value) => {
                self.success = Some(value);
                self.failure = None;
            }
            Outcome::Failure(reason) => self.failure = Some(reason),
        }
    }
}

/// Signature and transaction results for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeLedger {
    pub signature: OutcomeSlot<Bytes>,
    pub transaction: OutcomeSlot<TxHash>,
}

/// Observable ledger, cleared by the orchestrator on connect and disconnect.
pub struct OutcomeStore {
    tx: watch::Sender<OutcomeLedger>,
}

impl OutcomeStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(OutcomeLedger::default());
        Self { tx }
    }

    pub fn ledger(&self) -> OutcomeLedger {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OutcomeLedger> {
        self.tx.subscribe()
    }

    pub(crate) fn clear(&self) {
        self.tx.send_if_modified(|ledger| {
            if *ledger == OutcomeLedger::default() {
                return false;
            }
            *ledger = OutcomeLedger::default();
            true
        });
    }

    fn record_signature(&self, outcome: Outcome<Bytes>) {
        self.tx.send_modify(|ledger| ledger.signature.record(outcome));
    }

    fn record_transaction(&self, outcome: Outcome<TxHash>) {
        self.tx.send_modify(|ledger| ledger.transaction.record(outcome));
    }
}

impl Default for OutcomeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequences sign / send requests against the active session.
#[derive(Clone)]
pub struct SigningGateway {
    session: Arc<SessionStore>,
    outcomes: Arc<OutcomeStore>,
    defaults: SigningConfig,
}

impl SigningGateway {
    pub fn new(session: Arc<SessionStore>, outcomes: Arc<OutcomeStore>, defaults: SigningConfig) -> Self {
        Self {
            session,
            outcomes,
            defaults,
        }
    }

    /// Sign `payload`. `None` when no session is connected (no request is made).
    pub async fn sign_message(&self, payload: impl Into<String>) -> Option<Outcome<Bytes>> {
        let request = SigningRequest::new(payload);
        let snapshot = self.session.snapshot();
        if snapshot.status != ConnectionStatus::Connected {
            tracing::debug!(status = %snapshot.status, "Sign request ignored, no connected session");
            return None;
        }
        let transport = self.session.transport()?;

        tracing::info!(request_id = %request.id, "Requesting message signature");
        let outcome: Outcome<Bytes> = transport.request_signature(&request.payload).await.into();
        metrics::record_request("sign_message", outcome_label(&outcome));

        if self.still_current(snapshot.epoch) {
            self.outcomes.record_signature(outcome.clone());
        } else {
            tracing::debug!(request_id = %request.id, "Dropping signature outcome of a closed session");
        }
        log_outcome(&request.id, "signature", &outcome);
        Some(outcome)
    }

    /// Send `value` wei to `to`. `None` when no session is connected.
    pub async fn send_transaction(&self, to: Address, value: U256) -> Option<Outcome<TxHash>> {
        let request = TransactionRequest::new(to, value);
        let snapshot = self.session.snapshot();
        if snapshot.status != ConnectionStatus::Connected {
            tracing::debug!(status = %snapshot.status, "Transaction request ignored, no connected session");
            return None;
        }
        let transport = self.session.transport()?;

        tracing::info!(
            request_id = %request.id,
            to = %request.to,
            value = %request.value,
            "Requesting transaction"
        );
        let outcome: Outcome<TxHash> = transport
            .request_transaction(request.to, request.value)
            .await
            .into();
        metrics::record_request("send_transaction", outcome_label(&outcome));

        if self.still_current(snapshot.epoch) {
            self.outcomes.record_transaction(outcome.clone());
        } else {
            tracing::debug!(request_id = %request.id, "Dropping transaction outcome of a closed session");
        }
        log_outcome(&request.id, "transaction", &outcome);
        Some(outcome)
    }

    /// Sign the configured default message.
    pub async fn sign_default_message(&self) -> Option<Outcome<Bytes>> {
        self.sign_message(self.defaults.default_message.clone()).await
    }

    /// Send the configured default transfer.
    ///
    /// `None` also when the configured recipient or amount does not parse;
    /// validated configs never hit that.
    pub async fn send_default_transaction(&self) -> Option<Outcome<TxHash>> {
        let to: Address = match self.defaults.default_recipient.parse() {
            Ok(to) => to,
            Err(e) => {
                tracing::error!(error = %e, "Invalid default recipient");
                return None;
            }
        };
        let value = match parse_ether(&self.defaults.default_value_ether) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "Invalid default transaction value");
                return None;
            }
        };
        self.send_transaction(to, value).await
    }

    /// Current ledger.
    pub fn ledger(&self) -> OutcomeLedger {
        self.outcomes.ledger()
    }

    fn still_current(&self, epoch: u64) -> bool {
        let now = self.session.snapshot();
        now.epoch == epoch
            && matches!(
                now.status,
                ConnectionStatus::Connected | ConnectionStatus::SwitchingNetwork
            )
    }
}

fn outcome_label<T>(outcome: &Outcome<T>) -> &'static str {
    match outcome {
        Outcome::Success(_) => "success",
        Outcome::Failure(reason) => reason.label(),
    }
}

fn log_outcome<T>(request_id: &Uuid, kind: &str, outcome: &Outcome<T>) {
    match outcome {
        Outcome::Success(_) => tracing::info!(request_id = %request_id, kind, "Request completed"),
        Outcome::Failure(reason) => {
            tracing::warn!(request_id = %request_id, kind, reason = %reason, "Request failed")
        }
    }
}

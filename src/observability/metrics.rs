//! Metrics collection.
//!
//! # Metrics
//! - `wallet_connect_total` (counter): connect attempts by outcome
//! - `wallet_network_switch_total` (counter): switch requests by outcome
//! - `wallet_requests_total` (counter): sign / send requests by kind, outcome
//! - `wallet_handoff_total` (counter): mobile handoff lifecycle events
//! - `wallet_session_connected` (gauge): 1=connected, 0=not connected
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host decides the exporter
//! - Labels are small closed sets (outcome, kind, event)

use metrics::{counter, gauge};

/// Record the end of a connect attempt ("success", "rejected", "fault").
pub fn record_connect(outcome: &'static str) {
    counter!("wallet_connect_total", "outcome" => outcome).increment(1);
}

/// Record the end of a network switch ("success", "noop", "rejected", ...).
pub fn record_network_switch(outcome: &'static str) {
    counter!("wallet_network_switch_total", "outcome" => outcome).increment(1);
}

/// Record a completed signing or transaction request.
pub fn record_request(kind: &'static str, outcome: &'static str) {
    counter!("wallet_requests_total", "kind" => kind, "outcome" => outcome).increment(1);
}

/// Record a mobile handoff event ("recorded", "recovered", "discarded", ...).
pub fn record_handoff(event: &'static str) {
    counter!("wallet_handoff_total", "event" => event).increment(1);
}

/// Track whether a session is currently connected.
pub fn record_session_connected(connected: bool) {
    gauge!("wallet_session_connected").set(if connected { 1.0 } else { 0.0 });
}

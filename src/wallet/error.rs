//! Error and outcome types for the wallet core.

use serde::Serialize;
use thiserror::Error;

use crate::chain::ChainId;
use crate::wallet::state::ConnectionStatus;

/// Failures reported by a wallet provider.
///
/// These are user-facing: they are stored in session or outcome state for
/// the UI to render and never returned as `Err` across the UI boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ProviderError {
    /// The user declined in the wallet UI (or closed it).
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Transport or provider-internal failure.
    #[error("Provider error: {0}")]
    Fault(String),

    /// The requested chain is not offered by the app or the wallet.
    #[error("Unsupported chain {0}")]
    UnsupportedChain(ChainId),
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderError::Rejected(_) => "rejected",
            ProviderError::Fault(_) => "fault",
            ProviderError::UnsupportedChain(_) => "unsupported_chain",
        }
    }
}

/// Errors raised by the wallet core itself.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No connector matches a wallet id.
    #[error("No connector matches wallet '{0}'")]
    Resolution(String),

    /// An operation was invoked while the session status forbids it.
    #[error("Cannot {operation} while {status}")]
    InvalidStateTransition {
        operation: &'static str,
        status: ConnectionStatus,
    },

    /// A connect call is already in flight.
    #[error("A connection attempt is already in progress")]
    ConnectInFlight,

    /// Persisted key-value store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Outbound navigation to a wallet app failed.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Local signer setup failure.
    #[error("Signer error: {0}")]
    Signer(String),
}

/// Result type for wallet core operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// Terminal result of one asynchronous provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Success(T),
    Failure(ProviderError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ProviderError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(reason) => Some(reason),
        }
    }
}

impl<T> From<Result<T, ProviderError>> for Outcome<T> {
    fn from(result: Result<T, ProviderError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(reason) => Outcome::Failure(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WalletError::InvalidStateTransition {
            operation: "switch network",
            status: ConnectionStatus::Disconnected,
        };
        assert_eq!(err.to_string(), "Cannot switch network while disconnected");

        let err = ProviderError::UnsupportedChain(ChainId(8453));
        assert_eq!(err.to_string(), "Unsupported chain 8453");
        assert_eq!(err.label(), "unsupported_chain");
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: Outcome<u8> = Ok(7).into();
        assert_eq!(ok.success(), Some(&7));
        let failed: Outcome<u8> = Err(ProviderError::Rejected("no".into())).into();
        assert!(!failed.is_success());
        assert_eq!(failed.failure(), Some(&ProviderError::Rejected("no".into())));
    }
}

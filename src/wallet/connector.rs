//! Collaborator traits implemented by wallet provider libraries.
//!
//! A [`Connector`] is the opaque handle the provider registry hands out;
//! a successful [`Connector::initiate_session`] yields a [`SessionTransport`]
//! used for every later request on that session.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::chain::ChainId;
use crate::wallet::error::ProviderError;

/// One wallet provider's session-initiation capability.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Stable connector id, e.g. "io.metamask".
    fn id(&self) -> &str;

    /// Advertised display name, e.g. "MetaMask SDK".
    fn name(&self) -> &str;

    /// Ask the wallet for an account. Suspends until the user answers.
    async fn initiate_session(&self) -> Result<EstablishedSession, ProviderError>;
}

/// Requests against a live session.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    async fn request_chain_switch(&self, chain_id: ChainId) -> Result<(), ProviderError>;

    /// Personal-sign a UTF-8 message; returns the raw signature.
    async fn request_signature(&self, payload: &str) -> Result<Bytes, ProviderError>;

    /// Submit a native-value transfer; returns the transaction hash.
    async fn request_transaction(&self, to: Address, value: U256) -> Result<TxHash, ProviderError>;

    /// Release provider resources. Called once on disconnect.
    async fn close(&self) {}
}

/// What a connector returns on approval.
#[derive(Clone)]
pub struct EstablishedSession {
    pub address: Address,
    pub chain_id: ChainId,
    pub transport: Arc<dyn SessionTransport>,
}

impl std::fmt::Debug for EstablishedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EstablishedSession")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

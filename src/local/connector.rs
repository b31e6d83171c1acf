//! The local wallet exposed as a [`Connector`] and [`SessionTransport`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::chain::{ChainId, NetworkCatalog};
use crate::config::LocalWalletConfig;
use crate::local::wallet::LocalWallet;
use crate::wallet::connector::{Connector, EstablishedSession, SessionTransport};
use crate::wallet::error::{ProviderError, WalletResult};

/// A private-key wallet announced like an injected browser provider.
///
/// Approval is a switch rather than a prompt: while `approve` is off, every
/// request fails with [`ProviderError::Rejected`].
pub struct LocalConnector {
    id: String,
    name: String,
    wallet: LocalWallet,
    initial_chain: ChainId,
    networks: Arc<NetworkCatalog>,
    gas_price_wei: u128,
    approve: Arc<AtomicBool>,
}

impl LocalConnector {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        wallet: LocalWallet,
        initial_chain: ChainId,
        networks: Arc<NetworkCatalog>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            wallet,
            initial_chain,
            networks,
            gas_price_wei: 1_000_000_000,
            approve: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Build from config, loading the key from `config.private_key_env`.
    pub fn from_config(config: &LocalWalletConfig, networks: Arc<NetworkCatalog>) -> WalletResult<Self> {
        let wallet = LocalWallet::from_env(&config.private_key_env)?;
        let connector = Self::new(
            config.id.clone(),
            config.name.clone(),
            wallet,
            ChainId(config.chain_id),
            networks,
        )
        .with_gas_price_gwei(config.gas_price_gwei);
        connector.set_approve(config.auto_approve);
        Ok(connector)
    }

    pub fn with_gas_price_gwei(mut self, gwei: u64) -> Self {
        self.gas_price_wei = gwei as u128 * 1_000_000_000;
        self
    }

    /// Approve (true) or reject (false) all subsequent requests, including
    /// those on sessions already established.
    pub fn set_approve(&self, approve: bool) {
        self.approve.store(approve, Ordering::SeqCst);
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

#[async_trait]
impl Connector for LocalConnector {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn initiate_session(&self) -> Result<EstablishedSession, ProviderError> {
        if !self.approve.load(Ordering::SeqCst) {
            return Err(ProviderError::Rejected("User rejected the request.".to_string()));
        }
        let session = LocalSession {
            wallet: self.wallet.clone(),
            chain_id: AtomicU64::new(self.initial_chain.0),
            networks: self.networks.clone(),
            gas_price_wei: self.gas_price_wei,
            approve: self.approve.clone(),
        };
        Ok(EstablishedSession {
            address: self.wallet.address(),
            chain_id: self.initial_chain,
            transport: Arc::new(session),
        })
    }
}

/// Live session of a [`LocalConnector`].
pub struct LocalSession {
    wallet: LocalWallet,
    chain_id: AtomicU64,
    networks: Arc<NetworkCatalog>,
    gas_price_wei: u128,
    approve: Arc<AtomicBool>,
}

impl LocalSession {
    fn check_approval(&self) -> Result<(), ProviderError> {
        if self.approve.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProviderError::Rejected("User rejected the request.".to_string()))
        }
    }

    pub fn chain_id(&self) -> ChainId {
        ChainId(self.chain_id.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl SessionTransport for LocalSession {
    async fn request_chain_switch(&self, chain_id: ChainId) -> Result<(), ProviderError> {
        self.check_approval()?;
        if !self.networks.supports(chain_id) {
            return Err(ProviderError::UnsupportedChain(chain_id));
        }
        self.chain_id.store(chain_id.0, Ordering::SeqCst);
        Ok(())
    }

    async fn request_signature(&self, payload: &str) -> Result<Bytes, ProviderError> {
        self.check_approval()?;
        self.wallet
            .sign_message(payload.as_bytes())
            .await
            .map_err(|e| ProviderError::Fault(e.to_string()))
    }

    async fn request_transaction(&self, to: Address, value: U256) -> Result<TxHash, ProviderError> {
        self.check_approval()?;
        self.wallet
            .sign_transfer(to, value, self.chain_id().0, self.gas_price_wei)
            .map_err(|e| ProviderError::Fault(e.to_string()))
    }

    async fn close(&self) {
        tracing::debug!(address = %self.wallet.address(), "Local session closed");
    }
}

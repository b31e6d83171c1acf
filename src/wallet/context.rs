//! Application context: every wallet component, built once and passed explicitly.
//!
//! # Data Flow
//! ```text
//! UI event (wallet id)
//!     → select_wallet
//!         → ConnectorRegistry::resolve
//!             found     → ConnectionOrchestrator::connect
//!             not found → mobile + deep link → record handoff → navigate away
//!                       → otherwise          → ConnectModal::open
//!
//! page load
//!     → on_page_load → PendingConnectionRecovery::consume_and_recover
//! ```

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use url::Url;

use crate::chain::NetworkCatalog;
use crate::config::WalletConfig;
use crate::observability::metrics;
use crate::wallet::error::{Outcome, WalletError, WalletResult};
use crate::wallet::handoff::{deep_link_url, ConnectModal, DeviceKind, Navigator};
use crate::wallet::network::NetworkSwitcher;
use crate::wallet::orchestrator::ConnectionOrchestrator;
use crate::wallet::recovery::{PendingConnectionRecovery, RecoveryReport};
use crate::wallet::registry::ConnectorRegistry;
use crate::wallet::signing::{OutcomeStore, SigningGateway};
use crate::wallet::state::{SessionSnapshot, SessionStore};
use crate::wallet::store::KeyValueStore;

/// Result of a wallet selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A connector was found and a connect attempt ran.
    Attempted(Outcome<Address>),
    /// The page navigated to a native wallet app; resumes on next load.
    HandedOff(Url),
    /// Nothing matched; the generic selection modal was opened.
    FallbackModal,
}

/// Environment-provided collaborators.
pub struct Collaborators {
    pub store: Arc<dyn KeyValueStore>,
    pub navigator: Arc<dyn Navigator>,
    pub modal: Arc<dyn ConnectModal>,
    pub device: DeviceKind,
}

/// All wallet components of one page instance.
pub struct WalletContext {
    config: Arc<WalletConfig>,
    dapp_url: Url,
    registry: Arc<ConnectorRegistry>,
    orchestrator: ConnectionOrchestrator,
    switcher: NetworkSwitcher,
    gateway: SigningGateway,
    recovery: PendingConnectionRecovery,
    navigator: Arc<dyn Navigator>,
    modal: Arc<dyn ConnectModal>,
    device: DeviceKind,
}

impl WalletContext {
    pub fn new(config: Arc<WalletConfig>, collaborators: Collaborators) -> WalletResult<Self> {
        let dapp_url = Url::parse(&config.app.dapp_url)
            .map_err(|e| WalletError::Navigation(format!("invalid dapp URL: {}", e)))?;

        let session = Arc::new(SessionStore::new());
        let outcomes = Arc::new(OutcomeStore::new());
        let catalog: Arc<NetworkCatalog> = Arc::new(config.network_catalog());
        let max_age = match config.recovery.max_age_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        tracing::info!(
            app = %config.app.identity(),
            wallets = config.wallets.len(),
            networks = catalog.len(),
            device = ?collaborators.device,
            "Wallet context initialized"
        );

        Ok(Self {
            registry: Arc::new(ConnectorRegistry::from_config(&config.wallets)),
            orchestrator: ConnectionOrchestrator::new(session.clone(), outcomes.clone()),
            switcher: NetworkSwitcher::new(session.clone(), catalog),
            gateway: SigningGateway::new(session, outcomes, config.signing.clone()),
            recovery: PendingConnectionRecovery::new(
                collaborators.store,
                config.recovery.storage_key.clone(),
                max_age,
            ),
            navigator: collaborators.navigator,
            modal: collaborators.modal,
            device: collaborators.device,
            dapp_url,
            config,
        })
    }

    /// Run pending handoff recovery. Call once per page load.
    pub async fn on_page_load(&self) -> WalletResult<RecoveryReport> {
        self.recovery
            .consume_and_recover(&self.registry, &self.orchestrator)
            .await
    }

    /// Handle the user picking `wallet_id`.
    pub async fn select_wallet(&self, wallet_id: &str) -> WalletResult<Selection> {
        match self.registry.resolve(wallet_id) {
            Ok(connector) => {
                let outcome = self.orchestrator.connect(connector.as_ref()).await?;
                Ok(Selection::Attempted(outcome))
            }
            Err(WalletError::Resolution(_)) => {
                let deep_link = self
                    .registry
                    .descriptor(wallet_id)
                    .and_then(|d| d.deep_link.as_ref());
                match deep_link {
                    Some(link) if self.device.is_mobile() => {
                        let url = deep_link_url(link, &self.dapp_url)?;
                        self.hand_off(wallet_id, url)
                    }
                    _ => {
                        tracing::info!(wallet_id = %wallet_id, "No connector for wallet, opening selection modal");
                        self.modal.open();
                        Ok(Selection::FallbackModal)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    fn hand_off(&self, wallet_id: &str, url: Url) -> WalletResult<Selection> {
        self.recovery.record(wallet_id)?;
        if let Err(e) = self.navigator.navigate(&url) {
            // The page stays; a leftover record would replay on a later load.
            if let Err(discard_err) = self.recovery.discard() {
                tracing::warn!(
                    wallet_id = %wallet_id,
                    error = %discard_err,
                    "Could not discard handoff record after failed navigation"
                );
            }
            metrics::record_handoff("navigation_failed");
            return Err(e);
        }
        Ok(Selection::HandedOff(url))
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ConnectorRegistry> {
        &self.registry
    }

    pub fn orchestrator(&self) -> &ConnectionOrchestrator {
        &self.orchestrator
    }

    pub fn switcher(&self) -> &NetworkSwitcher {
        &self.switcher
    }

    pub fn gateway(&self) -> &SigningGateway {
        &self.gateway
    }

    pub fn recovery(&self) -> &PendingConnectionRecovery {
        &self.recovery
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.orchestrator.snapshot()
    }
}

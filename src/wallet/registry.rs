//! Wallet catalog and connector resolution.
//!
//! # Resolution
//! A wallet id is resolved against the live connector list by walking the
//! wallet's match strategies in their declared order; for each strategy the
//! connectors are scanned in registry order and the first hit wins.
//!
//! ```text
//! "metaMask" → [ExactId("metaMask"), NameContains("metamask")]
//!     pass 1: connector.id  == "metamask" (case-insensitive)
//!     pass 2: connector.name contains "metamask" (case-insensitive)
//! ```
//!
//! # Tie-break hazard
//! Substring matching is ambiguous: "trust" also matches e.g. "Trustless
//! Relay". When several connectors match the same strategy the first in
//! registry order is returned and a warning is logged. No further
//! disambiguation is attempted.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::{DeepLinkConfig, WalletEntryConfig};
use crate::wallet::connector::Connector;
use crate::wallet::error::{WalletError, WalletResult};

/// How a catalog entry recognises a runtime connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Case-insensitive equality with the connector id.
    ExactId(String),
    /// Case-insensitive substring of the connector name.
    NameContains(String),
}

/// Case folding shared by every comparison in the match table.
fn fold(s: &str) -> String {
    s.to_lowercase()
}

impl MatchStrategy {
    /// Test a connector's advertised id and name.
    pub fn matches(&self, connector_id: &str, connector_name: &str) -> bool {
        match self {
            MatchStrategy::ExactId(id) => fold(connector_id) == fold(id),
            MatchStrategy::NameContains(needle) => fold(connector_name).contains(&fold(needle)),
        }
    }
}

/// Static catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletDescriptor {
    pub id: String,
    pub display_name: String,
    /// Evaluated in order; earlier strategies take priority.
    pub strategies: Vec<MatchStrategy>,
    pub deep_link: Option<DeepLinkConfig>,
}

impl WalletDescriptor {
    /// Descriptor for an id missing from the catalog: id, then id as a name substring.
    pub fn ad_hoc(wallet_id: &str) -> Self {
        Self {
            id: wallet_id.to_string(),
            display_name: wallet_id.to_string(),
            strategies: vec![
                MatchStrategy::ExactId(wallet_id.to_string()),
                MatchStrategy::NameContains(wallet_id.to_string()),
            ],
            deep_link: None,
        }
    }
}

impl From<&WalletEntryConfig> for WalletDescriptor {
    fn from(entry: &WalletEntryConfig) -> Self {
        let mut strategies = vec![MatchStrategy::ExactId(entry.id.clone())];
        if entry.match_names.is_empty() {
            strategies.push(MatchStrategy::NameContains(entry.id.clone()));
        } else {
            strategies.extend(
                entry
                    .match_names
                    .iter()
                    .map(|n| MatchStrategy::NameContains(n.clone())),
            );
        }
        Self {
            id: entry.id.clone(),
            display_name: entry.display_name.clone(),
            strategies,
            deep_link: entry.deep_link.clone(),
        }
    }
}

/// Catalog of known wallets plus the live set of announced connectors.
pub struct ConnectorRegistry {
    descriptors: Vec<WalletDescriptor>,
    connectors: ArcSwap<Vec<Arc<dyn Connector>>>,
}

impl ConnectorRegistry {
    pub fn new(descriptors: Vec<WalletDescriptor>) -> Self {
        Self {
            descriptors,
            connectors: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn from_config(wallets: &[WalletEntryConfig]) -> Self {
        Self::new(wallets.iter().map(WalletDescriptor::from).collect())
    }

    /// Catalog entries in priority order.
    pub fn descriptors(&self) -> &[WalletDescriptor] {
        &self.descriptors
    }

    /// Catalog entry for a wallet id (case-insensitive).
    pub fn descriptor(&self, wallet_id: &str) -> Option<&WalletDescriptor> {
        let wanted = fold(wallet_id);
        self.descriptors.iter().find(|d| fold(&d.id) == wanted)
    }

    /// Add a connector announced at runtime. Re-announcing an id replaces it in place.
    pub fn announce(&self, connector: Arc<dyn Connector>) {
        self.connectors.rcu(|current| {
            let mut next: Vec<Arc<dyn Connector>> = current.iter().cloned().collect();
            match next.iter().position(|c| c.id() == connector.id()) {
                Some(i) => next[i] = connector.clone(),
                None => next.push(connector.clone()),
            }
            next
        });
        tracing::debug!(connector_id = %connector.id(), name = %connector.name(), "Connector announced");
    }

    /// Remove a connector by id.
    pub fn withdraw(&self, connector_id: &str) {
        self.connectors.rcu(|current| {
            current
                .iter()
                .filter(|c| c.id() != connector_id)
                .cloned()
                .collect::<Vec<_>>()
        });
    }

    /// Snapshot of the live connectors in registry order.
    pub fn connectors(&self) -> Arc<Vec<Arc<dyn Connector>>> {
        self.connectors.load_full()
    }

    /// Resolve a wallet id to a connector.
    ///
    /// Pure lookup: identical input and registry state give identical results.
    pub fn resolve(&self, wallet_id: &str) -> WalletResult<Arc<dyn Connector>> {
        let ad_hoc;
        let descriptor = match self.descriptor(wallet_id) {
            Some(d) => d,
            None => {
                ad_hoc = WalletDescriptor::ad_hoc(wallet_id);
                &ad_hoc
            }
        };

        let connectors = self.connectors.load();
        for strategy in &descriptor.strategies {
            let mut hits = connectors
                .iter()
                .filter(|c| strategy.matches(c.id(), c.name()));
            if let Some(first) = hits.next() {
                let others = hits.count();
                if others > 0 {
                    tracing::warn!(
                        wallet_id = %wallet_id,
                        chosen = %first.name(),
                        other_matches = others,
                        "Ambiguous wallet match, using first connector in registry order"
                    );
                }
                tracing::debug!(
                    wallet_id = %wallet_id,
                    connector_id = %first.id(),
                    strategy = ?strategy,
                    "Wallet resolved"
                );
                return Ok(first.clone());
            }
        }

        tracing::debug!(wallet_id = %wallet_id, "No connector matches wallet");
        Err(WalletError::Resolution(wallet_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WalletConfig;
    use crate::wallet::connector::EstablishedSession;
    use crate::wallet::error::ProviderError;
    use async_trait::async_trait;

    struct Named(&'static str, &'static str);

    #[async_trait]
    impl Connector for Named {
        fn id(&self) -> &str {
            self.0
        }
        fn name(&self) -> &str {
            self.1
        }
        async fn initiate_session(&self) -> Result<EstablishedSession, ProviderError> {
            Err(ProviderError::Fault("not wired".into()))
        }
    }

    fn registry(connectors: &[(&'static str, &'static str)]) -> ConnectorRegistry {
        let registry = ConnectorRegistry::from_config(&WalletConfig::default().wallets);
        for (id, name) in connectors {
            registry.announce(Arc::new(Named(id, name)));
        }
        registry
    }

    #[test]
    fn test_substring_match() {
        let r = registry(&[("io.metamask", "MetaMask SDK")]);
        assert_eq!(r.resolve("metaMask").unwrap().id(), "io.metamask");
    }

    #[test]
    fn test_exact_id_beats_earlier_substring() {
        let r = registry(&[
            ("injected", "Injected (MetaMask)"),
            ("metaMask", "MetaMask"),
        ]);
        assert_eq!(r.resolve("METAMASK").unwrap().id(), "metaMask");
    }

    #[test]
    fn test_first_substring_match_wins() {
        let r = registry(&[
            ("relay", "Trustless Relay"),
            ("com.trustwallet", "Trust Wallet"),
        ]);
        // Known hazard: registry order decides.
        assert_eq!(r.resolve("trust").unwrap().id(), "relay");
    }

    #[test]
    fn test_id_and_name_fold_case_alike() {
        let id = MatchStrategy::ExactId("ÉtoileWallet".into());
        let name = MatchStrategy::NameContains("Étoile".into());
        assert!(id.matches("étoilewallet", "-"));
        assert!(name.matches("-", "ÉTOILE Wallet"));

        let r = registry(&[("étoilewallet", "Some Wallet")]);
        assert_eq!(r.resolve("ÉTOILEWALLET").unwrap().id(), "étoilewallet");
    }

    #[test]
    fn test_not_found() {
        let r = registry(&[("io.metamask", "MetaMask SDK")]);
        let err = r.resolve("trust").err().unwrap();
        assert!(matches!(err, WalletError::Resolution(id) if id == "trust"));
    }

    #[test]
    fn test_unknown_wallet_id_uses_itself() {
        let r = registry(&[("app.phantom", "Phantom")]);
        assert_eq!(r.resolve("phantom").unwrap().id(), "app.phantom");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let r = registry(&[
            ("a", "Coinbase Wallet SDK"),
            ("b", "Coinbase Smart Wallet"),
        ]);
        let first = r.resolve("coinbaseWallet").unwrap().id().to_string();
        for _ in 0..10 {
            assert_eq!(r.resolve("coinbaseWallet").unwrap().id(), first);
        }
    }

    #[test]
    fn test_announce_replaces_and_withdraw_removes() {
        let r = registry(&[("io.metamask", "MetaMask SDK")]);
        r.announce(Arc::new(Named("io.metamask", "MetaMask Flask")));
        assert_eq!(r.connectors().len(), 1);
        assert_eq!(r.resolve("metaMask").unwrap().name(), "MetaMask Flask");

        r.withdraw("io.metamask");
        assert!(r.resolve("metaMask").is_err());
    }

    #[test]
    fn test_descriptor_strategies_from_config() {
        let r = registry(&[]);
        let d = r.descriptor("coinbasewallet").unwrap();
        assert_eq!(
            d.strategies,
            vec![
                MatchStrategy::ExactId("coinbaseWallet".into()),
                MatchStrategy::NameContains("coinbase".into()),
            ]
        );
        assert!(d.deep_link.is_some());
    }
}

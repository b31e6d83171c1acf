//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the wallet
//! bridge. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::chain::{ChainId, Network, NetworkCatalog};

/// Root configuration for the wallet bridge.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Application identity presented to wallets.
    pub app: AppConfig,

    /// Networks the user may switch between, in display order.
    pub networks: Vec<NetworkConfig>,

    /// Wallet catalog, evaluated in order during resolution.
    pub wallets: Vec<WalletEntryConfig>,

    /// Mobile handoff recovery settings.
    pub recovery: RecoveryConfig,

    /// Defaults for the sign / send actions.
    pub signing: SigningConfig,

    /// Local private-key wallet used for demos and tests.
    pub local_wallet: LocalWalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            networks: vec![
                NetworkConfig {
                    chain_id: ChainId::SEPOLIA.0,
                    name: "Sepolia".to_string(),
                },
                NetworkConfig {
                    chain_id: ChainId::BASE_SEPOLIA.0,
                    name: "Base Sepolia".to_string(),
                },
            ],
            wallets: default_wallets(),
            recovery: RecoveryConfig::default(),
            signing: SigningConfig::default(),
            local_wallet: LocalWalletConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl WalletConfig {
    /// Build the network catalog from the configured list.
    pub fn network_catalog(&self) -> NetworkCatalog {
        NetworkCatalog::new(
            self.networks
                .iter()
                .map(|n| Network::new(n.chain_id, n.name.clone()))
                .collect(),
        )
    }
}

/// Application identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name shown in wallet approval prompts.
    pub name: String,

    /// Relay project identifier for the remote-signing protocol.
    pub project_id: String,

    /// Public URL of the dapp, handed to wallet apps on mobile.
    pub dapp_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "My Web3 App".to_string(),
            project_id: String::new(),
            dapp_url: "https://localhost:5173/".to_string(),
        }
    }
}

impl AppConfig {
    /// Name plus relay project id, as presented to wallets.
    pub fn identity(&self) -> String {
        if self.project_id.is_empty() {
            format!("{} (no relay project)", self.name)
        } else {
            format!("{} (project {})", self.name, self.project_id)
        }
    }
}

/// A supported network.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Numeric chain id.
    pub chain_id: u64,

    /// Display name.
    pub name: String,
}

/// A wallet catalog entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalletEntryConfig {
    /// Stable wallet key, e.g. "metaMask".
    pub id: String,

    /// Name shown to the user.
    pub display_name: String,

    /// Substrings matched case-insensitively against connector names.
    /// Defaults to the wallet id itself when empty.
    #[serde(default)]
    pub match_names: Vec<String>,

    /// Native-app deep link used on mobile when no connector is injected.
    #[serde(default)]
    pub deep_link: Option<DeepLinkConfig>,
}

/// Deep-link template for a native wallet app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum DeepLinkConfig {
    /// Dapp host and path appended to `base`, e.g. `https://metamask.app.link/dapp/`.
    Path { base: String },
    /// Full dapp URL passed as query parameter `param` on `base`.
    Query { base: String, param: String },
}

fn default_wallets() -> Vec<WalletEntryConfig> {
    vec![
        WalletEntryConfig {
            id: "metaMask".to_string(),
            display_name: "MetaMask".to_string(),
            match_names: vec!["metamask".to_string()],
            deep_link: Some(DeepLinkConfig::Path {
                base: "https://metamask.app.link/dapp/".to_string(),
            }),
        },
        WalletEntryConfig {
            id: "coinbaseWallet".to_string(),
            display_name: "Coinbase Wallet".to_string(),
            match_names: vec!["coinbase".to_string()],
            deep_link: Some(DeepLinkConfig::Query {
                base: "https://go.cb-w.com/dapp".to_string(),
                param: "cb_url".to_string(),
            }),
        },
        WalletEntryConfig {
            id: "rainbow".to_string(),
            display_name: "Rainbow".to_string(),
            match_names: vec!["rainbow".to_string()],
            deep_link: None,
        },
        WalletEntryConfig {
            id: "trust".to_string(),
            display_name: "Trust Wallet".to_string(),
            match_names: vec!["trust".to_string()],
            deep_link: Some(DeepLinkConfig::Query {
                base: "https://link.trustwallet.com/open_url".to_string(),
                param: "url".to_string(),
            }),
        },
        WalletEntryConfig {
            id: "walletConnect".to_string(),
            display_name: "WalletConnect".to_string(),
            match_names: vec!["walletconnect".to_string()],
            deep_link: None,
        },
    ]
}

/// Mobile handoff recovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Key under which the pending handoff record is persisted.
    pub storage_key: String,

    /// Records older than this are discarded without a connect attempt.
    /// Zero disables the cut-off.
    pub max_age_secs: u64,

    /// File backing the persisted store (CLI only).
    pub store_path: String,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            storage_key: "wallet-bridge.pending-handoff".to_string(),
            max_age_secs: 600,
            store_path: ".wallet-bridge-store.json".to_string(),
        }
    }
}

/// Defaults for the sign / send actions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Message signed by "Sign Message".
    pub default_message: String,

    /// Recipient of "Send Transaction".
    pub default_recipient: String,

    /// Amount of "Send Transaction", in ether.
    pub default_value_ether: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            default_message: "Hello from my app!".to_string(),
            default_recipient: "0x78Bdc100555672a193359bd3e9CD68F23015A051".to_string(),
            default_value_ether: "0.001".to_string(),
        }
    }
}

/// Local private-key wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalWalletConfig {
    /// Announce the local wallet as an injected connector.
    pub enabled: bool,

    /// Connector id.
    pub id: String,

    /// Connector name, matched by the wallet catalog.
    pub name: String,

    /// Environment variable holding the hex private key.
    pub private_key_env: String,

    /// Chain the wallet starts on.
    pub chain_id: u64,

    /// Gas price used for locally signed transfers.
    pub gas_price_gwei: u64,

    /// Approve every request (false rejects everything).
    pub auto_approve: bool,
}

impl Default for LocalWalletConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            id: "injected".to_string(),
            name: "MetaMask (local signer)".to_string(),
            private_key_env: "WALLET_BRIDGE_PRIVATE_KEY".to_string(),
            chain_id: ChainId::SEPOLIA.0,
            gas_price_gwei: 2,
            auto_approve: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the pretty format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

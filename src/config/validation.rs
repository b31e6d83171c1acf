//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Wallet ids unique and non-empty (the registry keys on them)
//! - Chain ids unique, at least one network
//! - URLs, the default recipient and the default value parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WalletConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use alloy::primitives::utils::parse_ether;
use alloy::primitives::Address;

use crate::config::schema::{DeepLinkConfig, WalletConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyWalletId { index: usize },
    DuplicateWalletId(String),
    NoNetworks,
    DuplicateChainId(u64),
    InvalidUrl { field: String, value: String },
    InvalidRecipient(String),
    InvalidValue(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyWalletId { index } => {
                write!(f, "wallets[{}] has an empty id", index)
            }
            ValidationError::DuplicateWalletId(id) => write!(f, "duplicate wallet id '{}'", id),
            ValidationError::NoNetworks => write!(f, "at least one network must be configured"),
            ValidationError::DuplicateChainId(id) => write!(f, "duplicate chain id {}", id),
            ValidationError::InvalidUrl { field, value } => {
                write!(f, "{} is not a valid URL: '{}'", field, value)
            }
            ValidationError::InvalidRecipient(v) => {
                write!(f, "signing.default_recipient is not an address: '{}'", v)
            }
            ValidationError::InvalidValue(v) => {
                write!(f, "signing.default_value_ether is not an ether amount: '{}'", v)
            }
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &WalletConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen_wallets = HashSet::new();
    for (index, wallet) in config.wallets.iter().enumerate() {
        if wallet.id.trim().is_empty() {
            errors.push(ValidationError::EmptyWalletId { index });
            continue;
        }
        // Ids resolve case-insensitively, so "metamask" and "metaMask" collide.
        if !seen_wallets.insert(wallet.id.to_lowercase()) {
            errors.push(ValidationError::DuplicateWalletId(wallet.id.clone()));
        }
        if let Some(link) = &wallet.deep_link {
            let base = match link {
                DeepLinkConfig::Path { base } | DeepLinkConfig::Query { base, .. } => base,
            };
            if url::Url::parse(base).is_err() {
                errors.push(ValidationError::InvalidUrl {
                    field: format!("wallets[{}].deep_link.base", index),
                    value: base.clone(),
                });
            }
        }
    }

    if config.networks.is_empty() {
        errors.push(ValidationError::NoNetworks);
    }
    let mut seen_chains = HashSet::new();
    for network in &config.networks {
        if !seen_chains.insert(network.chain_id) {
            errors.push(ValidationError::DuplicateChainId(network.chain_id));
        }
    }

    if url::Url::parse(&config.app.dapp_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "app.dapp_url".to_string(),
            value: config.app.dapp_url.clone(),
        });
    }

    if config.signing.default_recipient.parse::<Address>().is_err() {
        errors.push(ValidationError::InvalidRecipient(
            config.signing.default_recipient.clone(),
        ));
    }
    if parse_ether(&config.signing.default_value_ether).is_err() {
        errors.push(ValidationError::InvalidValue(
            config.signing.default_value_ether.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Mobile deep-link handoff and UI fallbacks.
//!
//! On a mobile browser with no injected provider the only way to reach a
//! native wallet is to navigate away to the wallet app. The page is gone
//! after that; the attempt resumes on the next page load through
//! [`PendingConnectionRecovery`](crate::wallet::recovery::PendingConnectionRecovery).

use std::sync::Mutex;

use url::Url;

use crate::config::DeepLinkConfig;
use crate::wallet::error::{WalletError, WalletResult};

const MOBILE_TOKENS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Device class, derived from the runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceKind {
    /// Classify a user agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        if MOBILE_TOKENS.iter().any(|t| ua.contains(t)) {
            DeviceKind::Mobile
        } else {
            DeviceKind::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        self == DeviceKind::Mobile
    }
}

/// Build the wallet-app URL that opens `dapp_url` inside the wallet.
pub fn deep_link_url(link: &DeepLinkConfig, dapp_url: &Url) -> WalletResult<Url> {
    match link {
        DeepLinkConfig::Path { base } => {
            let host = dapp_url
                .host_str()
                .ok_or_else(|| WalletError::Navigation(format!("dapp URL has no host: {}", dapp_url)))?;
            let mut target = String::from(host);
            if let Some(port) = dapp_url.port() {
                target.push_str(&format!(":{}", port));
            }
            target.push_str(dapp_url.path());
            if let Some(query) = dapp_url.query() {
                target.push('?');
                target.push_str(query);
            }
            let base = if base.ends_with('/') {
                base.clone()
            } else {
                format!("{}/", base)
            };
            Url::parse(&format!("{}{}", base, target.trim_start_matches('/')))
                .map_err(|e| WalletError::Navigation(format!("invalid deep link: {}", e)))
        }
        DeepLinkConfig::Query { base, param } => {
            let mut url = Url::parse(base)
                .map_err(|e| WalletError::Navigation(format!("invalid deep link base: {}", e)))?;
            url.query_pairs_mut().append_pair(param, dapp_url.as_str());
            Ok(url)
        }
    }
}

/// Performs a full-page navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &Url) -> WalletResult<()>;
}

/// Generic wallet-selection modal, opened when a wallet id cannot be resolved.
pub trait ConnectModal: Send + Sync {
    fn open(&self);
}

/// Navigator that only remembers where it was sent. Used by the CLI,
/// which prints the URL instead of leaving the page.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<Url> {
        self.visited.lock().expect("navigator mutex poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) -> WalletResult<()> {
        tracing::info!(url = %url, "Navigating to wallet app");
        self.visited
            .lock()
            .expect("navigator mutex poisoned")
            .push(url.clone());
        Ok(())
    }
}

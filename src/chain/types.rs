//! Chain-specific types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Ethereum Sepolia testnet.
    pub const SEPOLIA: ChainId = ChainId(11_155_111);
    /// Base Sepolia testnet.
    pub const BASE_SEPOLIA: ChainId = ChainId(84_532);
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A network the user may switch to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Numeric chain id.
    pub chain_id: ChainId,
    /// Human readable name, e.g. "Base Sepolia".
    pub name: String,
}

impl Network {
    pub fn new(chain_id: impl Into<ChainId>, name: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            name: name.into(),
        }
    }
}

/// Ordered list of supported networks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCatalog {
    networks: Vec<Network>,
}

impl NetworkCatalog {
    pub fn new(networks: Vec<Network>) -> Self {
        Self { networks }
    }

    /// Sepolia and Base Sepolia, in that order.
    pub fn testnets() -> Self {
        Self::new(vec![
            Network::new(ChainId::SEPOLIA, "Sepolia"),
            Network::new(ChainId::BASE_SEPOLIA, "Base Sepolia"),
        ])
    }

    pub fn get(&self, chain_id: ChainId) -> Option<&Network> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    /// An empty catalog accepts every chain id.
    pub fn supports(&self, chain_id: ChainId) -> bool {
        self.networks.is_empty() || self.get(chain_id).is_some()
    }

    /// Display name of a chain, falling back to "Unknown".
    pub fn name_of(&self, chain_id: ChainId) -> &str {
        self.get(chain_id).map(|n| n.name.as_str()).unwrap_or("Unknown")
    }

    pub fn iter(&self) -> impl Iterator<Item = &Network> {
        self.networks.iter()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

//! Local private-key wallet and transfer signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::consensus::{SignableTransaction, TxLegacy};
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signer, SignerSync};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::wallet::error::{WalletError, WalletResult};

/// Gas limit of a plain value transfer.
const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Wallet for message and transaction signing with nonce management.
#[derive(Debug, Clone)]
pub struct LocalWallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Next nonce for locally signed transfers.
    nonce: Arc<AtomicU64>,
}

impl LocalWallet {
    /// Create a wallet from a hex-encoded private key string (with or without 0x).
    pub fn from_private_key(private_key_hex: &str) -> WalletResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::Signer(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Local wallet initialized");

        Ok(Self {
            signer,
            nonce: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Load wallet from the environment variable `var`.
    pub fn from_env(var: &str) -> WalletResult<Self> {
        let private_key = std::env::var(var)
            .map_err(|_| WalletError::Signer(format!("Environment variable {} not set", var)))?;

        Self::from_private_key(&private_key)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get and increment the nonce atomically.
    pub fn get_and_increment_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Sign arbitrary message bytes (EIP-191 prefixed). Returns the 65-byte signature.
    pub async fn sign_message(&self, message: &[u8]) -> WalletResult<Bytes> {
        let signature = self
            .signer
            .sign_message(message)
            .await
            .map_err(|e| WalletError::Signer(format!("Message signing failed: {}", e)))?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }

    /// Sign an EIP-155 legacy transfer and return its transaction hash.
    ///
    /// The signed transaction is not broadcast.
    pub fn sign_transfer(
        &self,
        to: Address,
        value: U256,
        chain_id: u64,
        gas_price_wei: u128,
    ) -> WalletResult<TxHash> {
        let tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce: self.get_and_increment_nonce(),
            gas_price: gas_price_wei,
            gas_limit: TRANSFER_GAS_LIMIT,
            to: TxKind::Call(to),
            value,
            input: Bytes::new(),
        };

        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| WalletError::Signer(format!("Transaction signing failed: {}", e)))?;
        let signed = tx.into_signed(signature);
        Ok(*signed.hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let wallet = LocalWallet::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        let result = LocalWallet::from_private_key("invalid_key");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_missing_env_var() {
        let err = LocalWallet::from_env("WALLET_BRIDGE_TEST_UNSET_KEY").unwrap_err();
        assert!(err.to_string().contains("WALLET_BRIDGE_TEST_UNSET_KEY not set"));
    }

    #[tokio::test]
    async fn test_sign_message() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let signature = wallet.sign_message(b"Hello from my app!").await.unwrap();
        assert_eq!(signature.len(), 65);
    }

    #[test]
    fn test_transfer_hashes_differ_per_nonce() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let to = Address::repeat_byte(0x11);
        let first = wallet.sign_transfer(to, U256::from(1), 11155111, 2_000_000_000).unwrap();
        let second = wallet.sign_transfer(to, U256::from(1), 11155111, 2_000_000_000).unwrap();
        assert_ne!(first, second);
        assert_eq!(wallet.current_nonce(), 2);
    }
}

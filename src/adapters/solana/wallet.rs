use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::VersionedTransaction,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to load keypair from file: {0}")]
    LoadError(String),
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
    #[error("Invalid transaction bytes: {0}")]
    InvalidTransaction(String),
}

/// Signing wallet loaded from a Solana CLI keypair file
#[derive(Clone)]
pub struct WalletManager {
    keypair: Arc<Keypair>,
}

impl WalletManager {
    /// Load keypair from a file path (JSON array format). `~` and `$VARS` are expanded.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let raw = path.as_ref().to_string_lossy();
        let expanded = shellexpand::full(&raw)
            .map_err(|e| WalletError::LoadError(format!("Failed to expand path: {}", e)))?;

        let contents = fs::read_to_string(expanded.as_ref())
            .map_err(|e| WalletError::LoadError(format!("Failed to read {}: {}", expanded, e)))?;

        let bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| WalletError::LoadError(format!("Invalid JSON format: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair = Keypair::from_bytes(bytes)
            .map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;

        Ok(Self {
            keypair: Arc::new(keypair),
        })
    }

    /// Create a new random keypair (for testing)
    pub fn new_random() -> Self {
        Self {
            keypair: Arc::new(Keypair::new()),
        }
    }

    /// Get the public key as a string
    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Deserialize an unsigned, bincode-encoded versioned transaction and sign it.
    ///
    /// Aggregator and trade APIs return transactions whose fee payer is this wallet, so the
    /// wallet's signature is the only one required.
    pub fn sign_serialized(&self, bytes: &[u8]) -> Result<VersionedTransaction, WalletError> {
        let unsigned: VersionedTransaction = bincode::deserialize(bytes)
            .map_err(|e| WalletError::InvalidTransaction(e.to_string()))?;

        VersionedTransaction::try_new(unsigned.message, &[self.keypair.as_ref()])
            .map_err(|e| WalletError::SigningError(e.to_string()))
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager")
            .field("pubkey", &self.public_key())
            .finish()
    }
}

//! Ledger ports
//!
//! Read-only JSON-RPC access, transaction submission and SPL token transfers.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ledger::{SignatureInfo, TokenAccount, TokenAccountFilter, TransactionRecord};

/// Ledger error type
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("RPC error {code}: {message}")]
    RpcResponse { code: i64, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Read-only ledger lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Native balance in lamports
    async fn get_balance(&self, address: &str) -> Result<u64, LedgerError>;

    /// Token accounts owned by `owner`
    async fn get_token_accounts(
        &self,
        owner: &str,
        filter: &TokenAccountFilter,
    ) -> Result<Vec<TokenAccount>, LedgerError>;

    /// One page of signatures, newest first, starting before `before` when given
    async fn get_signatures(
        &self,
        address: &str,
        limit: usize,
        before: Option<String>,
    ) -> Result<Vec<SignatureInfo>, LedgerError>;

    /// A confirmed transaction, or `None` if the node does not know it
    async fn get_transaction(&self, signature: &str) -> Result<Option<TransactionRecord>, LedgerError>;
}

/// Signs and submits transactions built elsewhere (Jupiter, bonding-curve trade API)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Address of the signing wallet
    fn signer_address(&self) -> String;

    /// Sign a bincode-serialized versioned transaction, submit it and wait for confirmation.
    /// Returns the signature.
    async fn sign_and_submit(&self, transaction: Vec<u8>) -> Result<String, LedgerError>;
}

/// SPL token transfer primitive used by the cross-chain distributor
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenTransfer: Send + Sync {
    /// Transfer `amount` base units of `mint` from `from` to the token account of
    /// `destination_owner`. Returns the transaction signature.
    async fn transfer(
        &self,
        from: &str,
        mint: &str,
        destination_owner: &str,
        amount: u64,
        decimals: u8,
    ) -> Result<String, LedgerError>;

    /// True when nothing reaches the ledger
    fn is_simulated(&self) -> bool {
        false
    }
}

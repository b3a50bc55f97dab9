//! Chain Reader
//!
//! Read-only ledger lookups. Every read is fail-soft: invalid addresses and RPC failures come
//! back as degraded `ReadOutcome`s carrying the default value (0 or an empty list), never as an
//! error. No retries.

use std::sync::Arc;

use futures::future::join_all;

use crate::domain::address::WalletAddress;
use crate::domain::bonding_curve::LAMPORTS_PER_SOL;
use crate::domain::ledger::{TokenAccount, TokenAccountFilter, TransactionRecord};
use crate::domain::read_outcome::ReadOutcome;
use crate::ports::ledger::LedgerReader;

/// Largest page `getSignaturesForAddress` accepts
pub const SIGNATURE_PAGE_LIMIT: usize = 1000;

#[derive(Clone)]
pub struct ChainReader {
    ledger: Arc<dyn LedgerReader>,
}

impl ChainReader {
    pub fn new(ledger: Arc<dyn LedgerReader>) -> Self {
        Self { ledger }
    }

    fn validate(address: &str) -> Result<WalletAddress, String> {
        WalletAddress::parse(address).map_err(|e| format!("invalid address '{}': {}", address, e))
    }

    /// Native balance in lamports
    pub async fn get_balance(&self, address: &str) -> ReadOutcome<u64> {
        let address = match Self::validate(address) {
            Ok(a) => a,
            Err(reason) => {
                tracing::warn!("get_balance: {}", reason);
                return ReadOutcome::failed(reason);
            }
        };

        match self.ledger.get_balance(address.as_str()).await {
            Ok(lamports) => ReadOutcome::fresh(lamports),
            Err(e) => {
                tracing::warn!("get_balance({}) failed: {}", address, e);
                ReadOutcome::failed(e.to_string())
            }
        }
    }

    /// Native balance in SOL
    pub async fn get_sol_balance(&self, address: &str) -> ReadOutcome<f64> {
        self.get_balance(address)
            .await
            .map(|lamports| lamports as f64 / LAMPORTS_PER_SOL)
    }

    pub async fn get_token_accounts(
        &self,
        owner: &str,
        filter: &TokenAccountFilter,
    ) -> ReadOutcome<Vec<TokenAccount>> {
        let owner = match Self::validate(owner) {
            Ok(a) => a,
            Err(reason) => {
                tracing::warn!("get_token_accounts: {}", reason);
                return ReadOutcome::failed(reason);
            }
        };
        if let TokenAccountFilter::Mint(mint) = filter {
            if let Err(reason) = Self::validate(mint) {
                tracing::warn!("get_token_accounts: {}", reason);
                return ReadOutcome::failed(reason);
            }
        }

        match self.ledger.get_token_accounts(owner.as_str(), filter).await {
            Ok(accounts) => ReadOutcome::fresh(accounts),
            Err(e) => {
                tracing::warn!("get_token_accounts({}) failed: {}", owner, e);
                ReadOutcome::failed(e.to_string())
            }
        }
    }

    /// Sum of the owner's raw balances of `mint` across all its token accounts
    pub async fn get_token_balance(&self, owner: &str, mint: &str) -> ReadOutcome<u64> {
        self.get_token_accounts(owner, &TokenAccountFilter::mint(mint))
            .await
            .map(|accounts| {
                accounts
                    .iter()
                    .filter(|a| a.mint == mint)
                    .fold(0u64, |total, a| total.saturating_add(a.amount))
            })
    }

    /// Raw balance of the owner's associated token account for `mint` (0 when it does not exist)
    pub async fn get_associated_token_balance(&self, owner: &str, mint: &str) -> ReadOutcome<u64> {
        let (owner_address, mint_address) = match (Self::validate(owner), Self::validate(mint)) {
            (Ok(o), Ok(m)) => (o, m),
            (Err(reason), _) | (_, Err(reason)) => {
                tracing::warn!("get_associated_token_balance: {}", reason);
                return ReadOutcome::failed(reason);
            }
        };
        let ata = owner_address.associated_token_account(&mint_address);

        self.get_token_accounts(owner, &TokenAccountFilter::mint(mint))
            .await
            .map(|accounts| {
                accounts
                    .iter()
                    .filter(|a| a.address == ata.as_str())
                    .fold(0u64, |total, a| total.saturating_add(a.amount))
            })
    }

    /// Up to `limit` most recent transactions, newest first.
    ///
    /// Transactions that fail to load or are unknown to the node are dropped. If paging
    /// signatures fails part-way the result is degraded and holds what was gathered so far.
    pub async fn get_transaction_history(
        &self,
        address: &str,
        limit: usize,
    ) -> ReadOutcome<Vec<TransactionRecord>> {
        let address = match Self::validate(address) {
            Ok(a) => a,
            Err(reason) => {
                tracing::warn!("get_transaction_history: {}", reason);
                return ReadOutcome::failed(reason);
            }
        };

        let mut signatures = Vec::new();
        let mut before: Option<String> = None;
        let mut paging_error = None;

        while signatures.len() < limit {
            let page_size = (limit - signatures.len()).min(SIGNATURE_PAGE_LIMIT);
            let page = match self
                .ledger
                .get_signatures(address.as_str(), page_size, before.clone())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("get_signatures({}) failed: {}", address, e);
                    paging_error = Some(e.to_string());
                    break;
                }
            };

            let short_page = page.len() < page_size;
            before = page.last().map(|s| s.signature.clone());
            signatures.extend(page);

            if short_page || before.is_none() {
                break;
            }
        }
        signatures.truncate(limit);

        let fetches = signatures
            .iter()
            .map(|s| self.ledger.get_transaction(&s.signature));
        let results = join_all(fetches).await;

        let records: Vec<TransactionRecord> = signatures
            .iter()
            .zip(results)
            .filter_map(|(sig, result)| match result {
                Ok(Some(record)) => Some(record),
                Ok(None) => {
                    tracing::debug!("transaction {} not found, skipping", sig.signature);
                    None
                }
                Err(e) => {
                    tracing::warn!("get_transaction({}) failed, skipping: {}", sig.signature, e);
                    None
                }
            })
            .collect();

        match paging_error {
            Some(reason) => ReadOutcome::degraded(records, reason),
            None => ReadOutcome::fresh(records),
        }
    }
}

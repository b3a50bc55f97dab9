//! Recording test doubles for the ports
//!
//! Each double records the calls it receives and answers from canned data configured with
//! builder methods. Anything not configured behaves like an empty ledger/market.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::ledger::{LedgerError, LedgerReader, TokenTransfer};
use super::market_data::{CoinListQuery, MarketApi, MarketCoin, MarketError};
use super::mint::{CardMintRequest, MintApi, MintError, MintReceipt};
use crate::domain::ledger::{SignatureInfo, TokenAccount, TokenAccountFilter, TransactionRecord};
use crate::domain::token::MarketTrade;

/// Ledger reader backed by in-memory maps
#[derive(Debug, Default, Clone)]
pub struct MockLedger {
    balances: Arc<Mutex<HashMap<String, u64>>>,
    accounts: Arc<Mutex<Vec<TokenAccount>>>,
    signatures: Arc<Mutex<HashMap<String, Vec<SignatureInfo>>>>,
    transactions: Arc<Mutex<HashMap<String, TransactionRecord>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, address: &str, lamports: u64) -> Self {
        self.balances.lock().unwrap().insert(address.to_string(), lamports);
        self
    }

    pub fn with_token_account(self, account: TokenAccount) -> Self {
        self.accounts.lock().unwrap().push(account);
        self
    }

    pub fn with_transaction(self, address: &str, record: TransactionRecord) -> Self {
        self.signatures
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .push(SignatureInfo {
                signature: record.signature.clone(),
                slot: record.slot,
                block_time: record.block_time,
                failed: !record.success,
            });
        self.transactions
            .lock()
            .unwrap()
            .insert(record.signature.clone(), record);
        self
    }

    /// Make every call that names `key` (address or signature) fail
    pub fn failing_on(self, key: &str) -> Self {
        self.failing.lock().unwrap().insert(key.to_string());
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String, key: &str) -> Result<(), LedgerError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(key) {
            return Err(LedgerError::Rpc(format!("unreachable for {}", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerReader for MockLedger {
    async fn get_balance(&self, address: &str) -> Result<u64, LedgerError> {
        self.record(format!("get_balance:{}", address), address)?;
        Ok(self.balances.lock().unwrap().get(address).copied().unwrap_or(0))
    }

    async fn get_token_accounts(
        &self,
        owner: &str,
        filter: &TokenAccountFilter,
    ) -> Result<Vec<TokenAccount>, LedgerError> {
        self.record(format!("get_token_accounts:{}", owner), owner)?;
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .filter(|a| a.owner == owner)
            .filter(|a| match filter {
                TokenAccountFilter::Mint(mint) => &a.mint == mint,
                TokenAccountFilter::ProgramId(_) => true,
            })
            .cloned()
            .collect())
    }

    async fn get_signatures(
        &self,
        address: &str,
        limit: usize,
        before: Option<String>,
    ) -> Result<Vec<SignatureInfo>, LedgerError> {
        self.record(format!("get_signatures:{}", address), address)?;
        let signatures = self.signatures.lock().unwrap();
        let all = signatures.get(address).cloned().unwrap_or_default();
        let start = match before {
            Some(cursor) => all
                .iter()
                .position(|s| s.signature == cursor)
                .map(|i| i + 1)
                .unwrap_or(all.len()),
            None => 0,
        };
        Ok(all.into_iter().skip(start).take(limit).collect())
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<TransactionRecord>, LedgerError> {
        self.record(format!("get_transaction:{}", signature), signature)?;
        Ok(self.transactions.lock().unwrap().get(signature).cloned())
    }
}

/// Market API backed by in-memory coins and trades
#[derive(Debug, Default, Clone)]
pub struct MockMarket {
    coins: Arc<Mutex<Vec<MarketCoin>>>,
    trades: Arc<Mutex<HashMap<String, Vec<MarketTrade>>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    down: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coin(self, coin: MarketCoin) -> Self {
        self.coins.lock().unwrap().push(coin);
        self
    }

    pub fn with_trades(self, mint: &str, trades: Vec<MarketTrade>) -> Self {
        self.trades.lock().unwrap().insert(mint.to_string(), trades);
        self
    }

    /// Make lookups for `mint` fail
    pub fn failing_on(self, mint: &str) -> Self {
        self.failing.lock().unwrap().insert(mint.to_string());
        self
    }

    /// Make every call fail
    pub fn unavailable(self) -> Self {
        *self.down.lock().unwrap() = true;
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String, key: &str) -> Result<(), MarketError> {
        self.calls.lock().unwrap().push(call);
        if *self.down.lock().unwrap() || self.failing.lock().unwrap().contains(key) {
            return Err(MarketError::Http(format!("connection refused for {}", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketApi for MockMarket {
    async fn list_coins(&self, query: &CoinListQuery) -> Result<Vec<MarketCoin>, MarketError> {
        self.record(format!("list_coins:{}:{}", query.offset, query.limit), "")?;
        let coins = self.coins.lock().unwrap();
        Ok(coins.iter().skip(query.offset).take(query.limit).cloned().collect())
    }

    async fn get_coin(&self, mint: &str) -> Result<Option<MarketCoin>, MarketError> {
        self.record(format!("get_coin:{}", mint), mint)?;
        Ok(self.coins.lock().unwrap().iter().find(|c| c.token.mint == mint).cloned())
    }

    async fn king_of_the_hill(&self, _include_nsfw: bool) -> Result<Option<MarketCoin>, MarketError> {
        self.record("king_of_the_hill".to_string(), "")?;
        let coins = self.coins.lock().unwrap();
        Ok(coins
            .iter()
            .filter(|c| !c.completed)
            .max_by(|a, b| a.usd_market_cap.total_cmp(&b.usd_market_cap))
            .cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<MarketCoin>, MarketError> {
        self.record(format!("search:{}", query), query)?;
        let needle = query.to_lowercase();
        Ok(self
            .coins
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                c.token.name.to_lowercase().contains(&needle)
                    || c.token.symbol.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn trades(
        &self,
        mint: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MarketTrade>, MarketError> {
        self.record(format!("trades:{}", mint), mint)?;
        let trades = self.trades.lock().unwrap();
        Ok(trades
            .get(mint)
            .map(|t| t.iter().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// A transfer the distributor asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCall {
    pub from: String,
    pub mint: String,
    pub destination_owner: String,
    pub amount: u64,
    pub decimals: u8,
}

/// Token transfer that records calls and optionally fails
#[derive(Debug, Default, Clone)]
pub struct RecordingTransfer {
    calls: Arc<Mutex<Vec<TransferCall>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl RecordingTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(self, reason: &str) -> Self {
        *self.failure.lock().unwrap() = Some(reason.to_string());
        self
    }

    pub fn get_calls(&self) -> Vec<TransferCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenTransfer for RecordingTransfer {
    async fn transfer(
        &self,
        from: &str,
        mint: &str,
        destination_owner: &str,
        amount: u64,
        decimals: u8,
    ) -> Result<String, LedgerError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(TransferCall {
                from: from.to_string(),
                mint: mint.to_string(),
                destination_owner: destination_owner.to_string(),
                amount,
                decimals,
            });
            calls.len()
        };

        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(LedgerError::Transaction(reason));
        }
        Ok(format!("transfer-sig-{}", call_number))
    }
}

/// Mint API that records requests and fails for configured card names
#[derive(Debug, Default, Clone)]
pub struct RecordingMintApi {
    calls: Arc<Mutex<Vec<CardMintRequest>>>,
    failing_names: Arc<Mutex<HashSet<String>>>,
}

impl RecordingMintApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail mint calls whose card name equals `name`
    pub fn failing_for(self, name: &str) -> Self {
        self.failing_names.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn get_calls(&self) -> Vec<CardMintRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MintApi for RecordingMintApi {
    async fn create_card_token(&self, request: &CardMintRequest) -> Result<MintReceipt, MintError> {
        self.calls.lock().unwrap().push(request.clone());
        if self.failing_names.lock().unwrap().contains(&request.name) {
            return Err(MintError::Status {
                status: 503,
                body: format!("mint service unavailable for {}", request.name),
            });
        }
        Ok(MintReceipt {
            reference: format!("mint-{}", request.metadata.bridge_transaction_id),
            simulated: false,
        })
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::trade::TradeAction;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("Transaction signing failed: {0}")]
    SigningError(String),
    #[error("Transaction execution failed: {0}")]
    ExecutionError(String),
    #[error("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapQuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: u64,
    pub slippage_bps: u16, // basis points (1 = 0.01%)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub input_mint: String,
    pub output_mint: String,
    pub input_amount: u64,
    pub output_amount: u64,
    pub min_output_amount: u64, // after slippage
    pub price_impact_pct: f64,
    pub route: Vec<String>, // DEX labels
    /// Full aggregator response, echoed back when building the swap
    pub raw: serde_json::Value,
}

/// Request to the bonding-curve trade API for an unsigned transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveTradeRequest {
    pub public_key: String,
    pub action: TradeAction,
    pub mint: String,
    /// SOL when `denominated_in_sol`, whole tokens otherwise
    pub amount: f64,
    pub denominated_in_sol: bool,
    /// Percent
    pub slippage: f64,
    /// SOL
    pub priority_fee: f64,
    pub pool: String,
}

/// DEX aggregator (quote, swap transaction, prices)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapApi: Send + Sync {
    async fn get_swap_quote(&self, request: &SwapQuoteRequest) -> Result<SwapQuote, ExecutionError>;

    /// Unsigned, bincode-serialized versioned transaction for the quote
    async fn get_swap_transaction(
        &self,
        quote: &SwapQuote,
        user_public_key: &str,
    ) -> Result<Vec<u8>, ExecutionError>;

    /// USD prices keyed by mint
    async fn get_prices(&self, mints: &[String]) -> Result<HashMap<String, f64>, ExecutionError>;
}

/// Bonding-curve buy/sell transaction builder
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurveTradeApi: Send + Sync {
    /// Unsigned, bincode-serialized versioned transaction for the trade
    async fn get_trade_transaction(&self, request: &CurveTradeRequest) -> Result<Vec<u8>, ExecutionError>;
}

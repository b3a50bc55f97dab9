use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::bonding_curve::Reserves;
use crate::domain::token::{MarketTrade, TokenDescriptor};

/// Market data error type
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Data parsing error: {0}")]
    Parse(String),

    #[error("Token not found: {0}")]
    NotFound(String),
}

/// Paging and ordering for coin listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinListQuery {
    pub offset: usize,
    pub limit: usize,
    pub sort: String,
    pub order: String,
    pub include_nsfw: bool,
}

impl Default for CoinListQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
            sort: "market_cap".to_string(),
            order: "DESC".to_string(),
            include_nsfw: false,
        }
    }
}

impl CoinListQuery {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn sorted_by(mut self, sort: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort = sort.into();
        self.order = order.into();
        self
    }
}

/// A coin as reported by the bonding-curve market, before any derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCoin {
    pub token: TokenDescriptor,
    pub reserves: Reserves,
    pub completed: bool,
    pub usd_market_cap: f64,
    /// Total supply in base units
    pub total_supply: u64,
}

/// Bonding-curve market API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn list_coins(&self, query: &CoinListQuery) -> Result<Vec<MarketCoin>, MarketError>;

    /// `Ok(None)` when the market does not know the mint
    async fn get_coin(&self, mint: &str) -> Result<Option<MarketCoin>, MarketError>;

    async fn king_of_the_hill(&self, include_nsfw: bool) -> Result<Option<MarketCoin>, MarketError>;

    async fn search(&self, query: &str) -> Result<Vec<MarketCoin>, MarketError>;

    async fn trades(
        &self,
        mint: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MarketTrade>, MarketError>;
}

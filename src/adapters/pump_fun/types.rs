//! Pump.fun Types
//!
//! Wire types for the pump.fun frontend REST API and their conversion into market port models.

use serde::{Deserialize, Serialize};

use crate::domain::bonding_curve::Reserves;
use crate::domain::token::{MarketTrade, SocialLinks, TokenDescriptor};
use crate::ports::market_data::MarketCoin;

/// Coin as returned by `/coins` and `/coins/{mint}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpFunCoin {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub creator: String,
    /// Seconds since the epoch
    #[serde(default)]
    pub created_timestamp: i64,
    #[serde(default)]
    pub virtual_sol_reserves: u64,
    #[serde(default)]
    pub virtual_token_reserves: u64,
    #[serde(default)]
    pub total_supply: u64,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub usd_market_cap: f64,
    #[serde(default)]
    pub nsfw: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<PumpFunCoin> for MarketCoin {
    fn from(coin: PumpFunCoin) -> Self {
        MarketCoin {
            token: TokenDescriptor {
                mint: coin.mint,
                name: coin.name,
                symbol: coin.symbol,
                description: coin.description.unwrap_or_default(),
                image: non_empty(coin.image_uri),
                creator: coin.creator,
                created_at: coin.created_timestamp,
                socials: SocialLinks {
                    twitter: non_empty(coin.twitter),
                    telegram: non_empty(coin.telegram),
                    website: non_empty(coin.website),
                },
            },
            reserves: Reserves {
                sol: coin.virtual_sol_reserves,
                token: coin.virtual_token_reserves,
            },
            completed: coin.complete,
            usd_market_cap: coin.usd_market_cap,
            total_supply: coin.total_supply,
        }
    }
}

/// Trade as returned by `/trades/{mint}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpFunTrade {
    pub signature: String,
    pub mint: String,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub is_buy: bool,
    pub user: String,
    /// Seconds since the epoch
    pub timestamp: i64,
}

impl From<PumpFunTrade> for MarketTrade {
    fn from(trade: PumpFunTrade) -> Self {
        MarketTrade {
            signature: trade.signature,
            mint: trade.mint,
            user: trade.user,
            is_buy: trade.is_buy,
            sol_amount: trade.sol_amount,
            token_amount: trade.token_amount,
            timestamp: trade.timestamp,
        }
    }
}

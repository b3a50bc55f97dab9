//! Token descriptors and market trades

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::bonding_curve::TokenMarketSnapshot;

/// Optional social links attached to a token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.twitter.is_none() && self.telegram.is_none() && self.website.is_none()
    }
}

/// Read-only description of a token, built from market API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: Option<String>,
    pub creator: String,
    /// Unix seconds
    pub created_at: i64,
    pub socials: SocialLinks,
}

impl TokenDescriptor {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at, 0).single()
    }
}

/// Token descriptor paired with its freshly derived market snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenView {
    pub token: TokenDescriptor,
    pub market: TokenMarketSnapshot,
    pub completed: bool,
}

/// One buy or sell on the bonding-curve market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTrade {
    pub signature: String,
    pub mint: String,
    pub user: String,
    pub is_buy: bool,
    /// Lamports
    pub sol_amount: u64,
    /// Token base units
    pub token_amount: u64,
    /// Unix seconds
    pub timestamp: i64,
}

impl MarketTrade {
    /// Effective SOL per whole token for this fill
    pub fn price_sol(&self, native_unit_scale: f64, token_unit_scale: f64) -> f64 {
        if self.token_amount == 0 {
            return 0.0;
        }
        (self.sol_amount as f64 / native_unit_scale) / (self.token_amount as f64 / token_unit_scale)
    }
}

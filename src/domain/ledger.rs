//! Ledger read models

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// SPL Token program id
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
/// Wrapped SOL mint
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// Which token accounts to enumerate for an owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenAccountFilter {
    ProgramId(String),
    Mint(String),
}

impl TokenAccountFilter {
    pub fn spl_token() -> Self {
        TokenAccountFilter::ProgramId(TOKEN_PROGRAM_ID.to_string())
    }

    pub fn mint(mint: impl Into<String>) -> Self {
        TokenAccountFilter::Mint(mint.into())
    }
}

/// A token account owned by a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAccount {
    /// Token account address
    pub address: String,
    pub mint: String,
    pub owner: String,
    /// Raw amount in base units
    pub amount: u64,
    pub decimals: u8,
}

impl TokenAccount {
    /// Amount scaled by the mint decimals
    pub fn ui_amount(&self) -> f64 {
        self.amount as f64 / 10f64.powi(self.decimals as i32)
    }
}

/// Signature entry returned when paging an address's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub failed: bool,
}

/// Summary of a confirmed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: String,
    pub slot: u64,
    /// Unix seconds, when the node reports it
    pub block_time: Option<i64>,
    /// Fee in lamports
    pub fee: u64,
    pub success: bool,
    pub error: Option<String>,
}

impl TransactionRecord {
    pub fn block_time_utc(&self) -> Option<DateTime<Utc>> {
        self.block_time.and_then(|t| Utc.timestamp_opt(t, 0).single())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_amount() {
        let account = TokenAccount {
            address: "acc".into(),
            mint: "mint".into(),
            owner: "owner".into(),
            amount: 1_234_500_000,
            decimals: 6,
        };
        assert!((account.ui_amount() - 1234.5).abs() < 1e-9);
    }

    #[test]
    fn test_filter_serialization() {
        let json = serde_json::to_value(TokenAccountFilter::spl_token()).unwrap();
        assert_eq!(json["programId"], TOKEN_PROGRAM_ID);

        let json = serde_json::to_value(TokenAccountFilter::mint("abc")).unwrap();
        assert_eq!(json["mint"], "abc");
    }
}

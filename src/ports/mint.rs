//! Cross-chain mint/purchase port

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MintError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Mint API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Mint rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMintMetadata {
    #[serde(with = "rust_decimal::serde::float")]
    pub oof_amount: Decimal,
    pub bridge_transaction_id: String,
    pub created_at: DateTime<Utc>,
}

/// Body of the mint call for one card category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMintRequest {
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub initial_supply: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_token: Decimal,
    pub metadata: CardMintMetadata,
}

/// Acknowledgement from the mint API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub reference: String,
    pub simulated: bool,
}

/// Destination-chain minting service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MintApi: Send + Sync {
    async fn create_card_token(&self, request: &CardMintRequest) -> Result<MintReceipt, MintError>;
}

//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Ledger reads, transaction submission and token transfers
//! - The bonding-curve market API
//! - DEX aggregator quotes/swaps and bonding-curve trades
//! - The destination-chain mint API

pub mod ledger;
pub mod market_data;
pub mod execution;
pub mod mint;
pub mod mocks;

// Re-export main traits and types
pub use ledger::{LedgerError, LedgerReader, TokenTransfer, TransactionSubmitter};
pub use market_data::{CoinListQuery, MarketApi, MarketCoin, MarketError};
pub use execution::{
    CurveTradeApi, CurveTradeRequest, ExecutionError, SwapApi, SwapQuote, SwapQuoteRequest,
};
pub use mint::{CardMintMetadata, CardMintRequest, MintApi, MintError, MintReceipt};

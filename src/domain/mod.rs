//! Domain Layer - Core types and pure logic
//!
//! This module contains pure domain types and logic with no I/O.
//! All external interactions happen through the ports layer.
//!
//! - `address`: validated base58 wallet/mint addresses
//! - `read_outcome`: fail-soft read results that stay distinguishable from real zeros
//! - `bonding_curve`: price, liquidity and graduation progress from raw reserves
//! - `token`: token descriptors, derived views and market trades
//! - `ledger`: token accounts, signatures and transaction summaries
//! - `trade`: execution mode and swap/buy/sell results
//! - `portfolio`: priced wallet holdings
//! - `oof`: missed-gains analysis of a wallet's sells
//! - `distribution`: card categories, OOF splits and cross-chain purchase outcomes

pub mod address;
pub mod read_outcome;
pub mod bonding_curve;
pub mod token;
pub mod ledger;
pub mod trade;
pub mod portfolio;
pub mod oof;
pub mod distribution;

pub use address::{AddressError, WalletAddress};
pub use read_outcome::ReadOutcome;
pub use bonding_curve::{CurveParams, Reserves, TokenMarketSnapshot};
pub use token::{MarketTrade, SocialLinks, TokenDescriptor, TokenView};
pub use ledger::{SignatureInfo, TokenAccount, TokenAccountFilter, TransactionRecord};
pub use trade::{ExecutionMode, TradeAction, TradeResult};
pub use portfolio::{Portfolio, PortfolioEntry};
pub use oof::{OofReport, OofSummary};
pub use distribution::{
    Allocation, BridgeRates, CardCategory, CardDistribution, CategoryFailure, CategoryStatus,
    CrossChainPurchase, CrossChainPurchaseRequest, DistributionError, DistributionPolicy,
    PurchaseEstimate, PurchaseOutcome,
};

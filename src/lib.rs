//! oof - Memecoin Aggregation and Cross-Chain Distribution Library
//!
//! Reads Solana wallets and bonding-curve markets, quotes and executes swaps, values
//! portfolios and converts OOF into three destination-chain cards.
//!
//! # Modules
//!
//! - `domain`: Core value types and pure math (bonding curve, OOF factor, distribution split)
//! - `ports`: Trait abstractions (LedgerReader, MarketApi, SwapApi, MintApi)
//! - `adapters`: External implementations (Solana RPC, pump.fun, Jupiter, mint API, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Chain reader, market aggregator, trade gateway, portfolio valuator and
//!   cross-chain distributor

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

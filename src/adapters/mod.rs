//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Solana: JSON-RPC reader, transaction submission and wallet management
//! - Pump.fun: bonding-curve market API and trade transaction builder
//! - Jupiter: DEX aggregator API client
//! - Bridge: destination-chain mint API and simulated collaborators
//! - CLI: Command-line interface handlers

pub mod bridge;
pub mod cli;
pub mod jupiter;
pub mod pump_fun;
pub mod solana;

pub use bridge::{HttpMintApi, LoggingMintApi, SimulatedTransfer};
pub use cli::{AppContext, CliApp};
pub use jupiter::JupiterClient;
pub use pump_fun::{PumpFunClient, PumpPortalClient};
pub use solana::{JsonRpcLedger, SolanaClient, WalletManager};

//! Pump.fun Adapter
//!
//! REST access to the pump.fun bonding-curve market and PumpPortal's local-trade endpoint.
//!
//! # Overview
//!
//! Pump.fun launches tokens on a bonding curve. This adapter reads:
//! - Coin listings and single-coin lookups (`/coins`), search (`/search/coins`)
//! - The current king of the hill (`/coins/king-of-the-hill`)
//! - A token's trade tape (`/trades/{mint}`)
//!
//! Buys and sells are built by PumpPortal (`POST /api/trade-local`), which returns an unsigned
//! versioned transaction for the caller's wallet.

mod client;
mod trade;
mod types;

pub use client::{PumpFunClient, PumpFunConfig};
pub use trade::{PumpPortalClient, PumpPortalConfig};
pub use types::{PumpFunCoin, PumpFunTrade};

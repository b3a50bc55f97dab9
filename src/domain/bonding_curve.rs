//! Bonding curve math
//!
//! Derives display metrics from the raw virtual reserves reported by the market API.
//! Everything here is pure; snapshots are recomputed on every fetch and never stored.

use serde::{Deserialize, Serialize};

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;
/// Base units per token (pump.fun tokens use 6 decimals)
pub const TOKEN_UNIT_SCALE: f64 = 1_000_000.0;
/// SOL in the curve at which a token graduates
pub const DEFAULT_GRADUATION_SOL: f64 = 85.0;

/// Unit scales and graduation threshold used by the curve math
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    pub native_unit_scale: f64,
    pub token_unit_scale: f64,
    pub graduation_threshold_sol: f64,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            native_unit_scale: LAMPORTS_PER_SOL,
            token_unit_scale: TOKEN_UNIT_SCALE,
            graduation_threshold_sol: DEFAULT_GRADUATION_SOL,
        }
    }
}

/// Raw reserve figures for one token
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Reserves {
    /// Virtual SOL reserves in lamports
    pub sol: u64,
    /// Virtual token reserves in base units
    pub token: u64,
}

/// Derived market view of a bonding-curve token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenMarketSnapshot {
    /// Price in SOL per whole token
    pub price: f64,
    /// Market cap in USD as reported by the market API
    pub market_cap: f64,
    /// Virtual SOL liquidity in SOL
    pub liquidity: f64,
    /// Graduation progress in [0, 100]
    pub bonding_curve_progress: f64,
}

/// Price in SOL per whole token. Zero token reserves give a price of 0.
pub fn price(sol_reserves: u64, token_reserves: u64, params: &CurveParams) -> f64 {
    if token_reserves == 0 {
        return 0.0;
    }
    (sol_reserves as f64 / params.native_unit_scale)
        / (token_reserves as f64 / params.token_unit_scale)
}

/// Graduation progress, clamped to [0, 100]
pub fn bonding_curve_progress(sol_reserves: u64, params: &CurveParams) -> f64 {
    if params.graduation_threshold_sol <= 0.0 {
        return 100.0;
    }
    let progress =
        sol_reserves as f64 / params.native_unit_scale / params.graduation_threshold_sol * 100.0;
    progress.clamp(0.0, 100.0)
}

/// Progress for a token whose completion flag is known. Graduated tokens always report 100.
pub fn progress_for(sol_reserves: u64, completed: bool, params: &CurveParams) -> f64 {
    if completed {
        100.0
    } else {
        bonding_curve_progress(sol_reserves, params)
    }
}

/// Build a fresh snapshot from raw reserves
pub fn snapshot(
    reserves: Reserves,
    completed: bool,
    usd_market_cap: f64,
    params: &CurveParams,
) -> TokenMarketSnapshot {
    TokenMarketSnapshot {
        price: price(reserves.sol, reserves.token, params),
        market_cap: usd_market_cap,
        liquidity: reserves.sol as f64 / params.native_unit_scale,
        bonding_curve_progress: progress_for(reserves.sol, completed, params),
    }
}

//! OOF factor
//!
//! Measures how much a wallet left on the table by selling before the price moved higher.
//! `missed = sum(max(0, current - sell_price) * tokens_sold)` and
//! `oof_factor = missed / realized`, both in SOL.

use serde::{Deserialize, Serialize};

use super::bonding_curve::CurveParams;
use super::token::MarketTrade;

/// OOF figures for one token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OofReport {
    pub mint: String,
    pub sells: usize,
    /// Whole tokens sold
    pub tokens_sold: f64,
    /// SOL received from sells
    pub realized_sol: f64,
    /// SOL the same tokens would fetch at the current price, above what was received
    pub missed_sol: f64,
    pub oof_factor: f64,
}

/// Aggregate over several tokens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OofSummary {
    pub reports: Vec<OofReport>,
    pub realized_sol: f64,
    pub missed_sol: f64,
    pub oof_factor: f64,
}

fn ratio(missed: f64, realized: f64) -> f64 {
    if realized > 0.0 {
        missed / realized
    } else {
        0.0
    }
}

/// Compute the OOF report for `wallet` from a token's trade tape
pub fn oof_report(
    mint: &str,
    wallet: &str,
    trades: &[MarketTrade],
    current_price_sol: f64,
    params: &CurveParams,
) -> OofReport {
    let mut sells = 0;
    let mut tokens_sold = 0.0;
    let mut realized = 0.0;
    let mut missed = 0.0;

    for trade in trades.iter().filter(|t| !t.is_buy && t.user == wallet && t.mint == mint) {
        let tokens = trade.token_amount as f64 / params.token_unit_scale;
        let proceeds = trade.sol_amount as f64 / params.native_unit_scale;
        let sell_price = trade.price_sol(params.native_unit_scale, params.token_unit_scale);

        sells += 1;
        tokens_sold += tokens;
        realized += proceeds;
        missed += (current_price_sol - sell_price).max(0.0) * tokens;
    }

    OofReport {
        mint: mint.to_string(),
        sells,
        tokens_sold,
        realized_sol: realized,
        missed_sol: missed,
        oof_factor: ratio(missed, realized),
    }
}

/// Combine per-token reports
pub fn summarize(reports: Vec<OofReport>) -> OofSummary {
    let realized_sol = reports.iter().map(|r| r.realized_sol).sum();
    let missed_sol = reports.iter().map(|r| r.missed_sol).sum();
    OofSummary {
        oof_factor: ratio(missed_sol, realized_sol),
        reports,
        realized_sol,
        missed_sol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trade(user: &str, is_buy: bool, sol: f64, tokens: f64) -> MarketTrade {
        MarketTrade {
            signature: format!("sig-{}-{}", user, sol),
            mint: "mint".to_string(),
            user: user.to_string(),
            is_buy,
            sol_amount: (sol * 1e9) as u64,
            token_amount: (tokens * 1e6) as u64,
            timestamp: 0,
        }
    }

    #[test]
    fn test_no_sells_means_no_oof() {
        let params = CurveParams::default();
        let trades = vec![trade("me", true, 1.0, 1000.0)];
        let report = oof_report("mint", "me", &trades, 0.01, &params);
        assert_eq!(report.sells, 0);
        assert_eq!(report.oof_factor, 0.0);
    }

    #[test]
    fn test_sold_too_early() {
        let params = CurveParams::default();
        // Sold 1000 tokens for 1 SOL (0.001 each); now worth 0.003 each
        let trades = vec![
            trade("me", true, 0.5, 1000.0),
            trade("me", false, 1.0, 1000.0),
            trade("someone-else", false, 5.0, 1000.0),
        ];
        let report = oof_report("mint", "me", &trades, 0.003, &params);
        assert_eq!(report.sells, 1);
        assert_relative_eq!(report.realized_sol, 1.0, epsilon = 1e-9);
        assert_relative_eq!(report.missed_sol, 2.0, epsilon = 1e-9);
        assert_relative_eq!(report.oof_factor, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sold_at_top_has_no_missed_gains() {
        let params = CurveParams::default();
        let trades = vec![trade("me", false, 3.0, 1000.0)];
        let report = oof_report("mint", "me", &trades, 0.001, &params);
        assert_eq!(report.missed_sol, 0.0);
        assert_eq!(report.oof_factor, 0.0);
    }

    #[test]
    fn test_summary() {
        let a = OofReport {
            mint: "a".into(),
            sells: 1,
            tokens_sold: 1.0,
            realized_sol: 1.0,
            missed_sol: 3.0,
            oof_factor: 3.0,
        };
        let b = OofReport {
            mint: "b".into(),
            sells: 1,
            tokens_sold: 1.0,
            realized_sol: 3.0,
            missed_sol: 1.0,
            oof_factor: 1.0 / 3.0,
        };
        let summary = summarize(vec![a, b]);
        assert_relative_eq!(summary.oof_factor, 1.0);
        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summarize(vec![]).oof_factor, 0.0);
    }
}

use serde::{Deserialize, Serialize};

/// One priced token holding in a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub mint: String,
    /// Raw balance in base units
    pub balance: u64,
    pub decimals: u8,
    pub price_usd: f64,
    pub value_usd: f64,
}

impl PortfolioEntry {
    /// Value the balance, scaling by the mint decimals
    pub fn new(mint: String, balance: u64, decimals: u8, price_usd: f64) -> Self {
        let ui_amount = balance as f64 / 10f64.powi(decimals as i32);
        PortfolioEntry {
            mint,
            balance,
            decimals,
            price_usd,
            value_usd: ui_amount * price_usd,
        }
    }

    pub fn ui_amount(&self) -> f64 {
        self.balance as f64 / 10f64.powi(self.decimals as i32)
    }
}

/// Fresh snapshot of a wallet's priced holdings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub entries: Vec<PortfolioEntry>,
}

impl Portfolio {
    pub fn new(entries: Vec<PortfolioEntry>) -> Self {
        Portfolio { entries }
    }

    pub fn total_value_usd(&self) -> f64 {
        self.entries.iter().map(|e| e.value_usd).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry holding the largest USD value
    pub fn largest(&self) -> Option<&PortfolioEntry> {
        self.entries
            .iter()
            .max_by(|a, b| a.value_usd.total_cmp(&b.value_usd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_value() {
        let entry = PortfolioEntry::new("mint".to_string(), 2_500_000, 6, 0.4);
        assert!((entry.ui_amount() - 2.5).abs() < 1e-12);
        assert!((entry.value_usd - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_portfolio_totals() {
        let portfolio = Portfolio::new(vec![
            PortfolioEntry::new("a".to_string(), 1_000_000, 6, 2.0),
            PortfolioEntry::new("b".to_string(), 3_000_000_000, 9, 5.0),
        ]);
        assert!((portfolio.total_value_usd() - 17.0).abs() < 1e-9);
        assert_eq!(portfolio.largest().unwrap().mint, "b");
        assert!(Portfolio::default().is_empty());
    }
}

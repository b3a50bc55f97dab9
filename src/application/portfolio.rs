//! Portfolio Valuator
//!
//! Composes the chain reader and the market aggregator into a net-worth view and the OOF
//! wallet analysis. One bad token never aborts the whole computation: its entries are dropped
//! and logged.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::domain::ledger::{TokenAccount, TokenAccountFilter};
use crate::domain::oof::{self, OofReport, OofSummary};
use crate::domain::portfolio::{Portfolio, PortfolioEntry};
use crate::domain::read_outcome::ReadOutcome;

use super::chain_reader::ChainReader;
use super::market::TokenMarketAggregator;

/// Trades fetched per mint for the OOF analysis
pub const DEFAULT_TRADE_WINDOW: usize = 200;

#[derive(Clone)]
pub struct PortfolioValuator {
    reader: Arc<ChainReader>,
    market: Arc<TokenMarketAggregator>,
    trade_window: usize,
}

impl PortfolioValuator {
    pub fn new(reader: Arc<ChainReader>, market: Arc<TokenMarketAggregator>) -> Self {
        Self {
            reader,
            market,
            trade_window: DEFAULT_TRADE_WINDOW,
        }
    }

    pub fn with_trade_window(mut self, trade_window: usize) -> Self {
        self.trade_window = trade_window;
        self
    }

    async fn held_accounts(&self, wallet: &str) -> ReadOutcome<Vec<TokenAccount>> {
        self.reader
            .get_token_accounts(wallet, &TokenAccountFilter::spl_token())
            .await
            .map(|accounts| accounts.into_iter().filter(|a| a.amount > 0).collect())
    }

    /// Distinct mints in first-seen order
    fn distinct_mints(accounts: &[TokenAccount]) -> Vec<String> {
        let mut mints: Vec<String> = Vec::new();
        for account in accounts {
            if !mints.contains(&account.mint) {
                mints.push(account.mint.clone());
            }
        }
        mints
    }

    /// Priced holdings of `wallet`, in token-account order.
    ///
    /// Degraded only when the account enumeration itself failed.
    pub async fn get_portfolio(&self, wallet: &str) -> ReadOutcome<Portfolio> {
        let accounts = self.held_accounts(wallet).await;
        if let Some(reason) = accounts.reason() {
            let reason = reason.to_string();
            return ReadOutcome::degraded(Portfolio::default(), reason);
        }
        let accounts = accounts.into_value();
        let mints = Self::distinct_mints(&accounts);

        let prices = join_all(mints.iter().map(|mint| self.market.price_usd(mint))).await;
        let prices: HashMap<&str, f64> = mints
            .iter()
            .zip(prices)
            .filter_map(|(mint, price)| match price {
                Ok(price) => Some((mint.as_str(), price)),
                Err(e) => {
                    tracing::warn!("Dropping {} from portfolio of {}: {}", mint, wallet, e);
                    None
                }
            })
            .collect();

        let entries = accounts
            .iter()
            .filter_map(|account| {
                prices.get(account.mint.as_str()).map(|price| {
                    PortfolioEntry::new(
                        account.mint.clone(),
                        account.amount,
                        account.decimals,
                        *price,
                    )
                })
            })
            .collect();

        ReadOutcome::fresh(Portfolio::new(entries))
    }

    /// OOF analysis over `mints`, or over every token the wallet holds when `mints` is empty
    pub async fn analyze_wallet(&self, wallet: &str, mints: &[String]) -> ReadOutcome<OofSummary> {
        let mints = if mints.is_empty() {
            let accounts = self.held_accounts(wallet).await;
            if let Some(reason) = accounts.reason() {
                let reason = reason.to_string();
                return ReadOutcome::degraded(OofSummary::default(), reason);
            }
            Self::distinct_mints(accounts.value())
        } else {
            mints.to_vec()
        };

        let reports = join_all(mints.iter().map(|mint| self.report(wallet, mint))).await;
        ReadOutcome::fresh(oof::summarize(reports.into_iter().flatten().collect()))
    }

    async fn report(&self, wallet: &str, mint: &str) -> Option<OofReport> {
        let (trades, price) = tokio::join!(
            self.market.get_token_trades(mint, self.trade_window, 0),
            self.market.price_sol(mint)
        );

        if let Some(reason) = trades.reason() {
            tracing::warn!("Skipping {} in OOF analysis: trades unavailable: {}", mint, reason);
            return None;
        }
        let price = match price {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!("Skipping {} in OOF analysis: {}", mint, e);
                return None;
            }
        };

        Some(oof::oof_report(
            mint,
            wallet,
            trades.value(),
            price,
            self.market.params(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bonding_curve::{CurveParams, Reserves};
    use crate::domain::token::{MarketTrade, TokenDescriptor};
    use crate::ports::ledger::{LedgerError, MockLedgerReader};
    use crate::ports::market_data::{MarketCoin, MarketError, MockMarketApi};
    use approx::assert_relative_eq;

    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn account(mint: &str, amount: u64) -> TokenAccount {
        TokenAccount {
            address: format!("acct-{}", mint),
            mint: mint.to_string(),
            owner: WALLET.to_string(),
            amount,
            decimals: 6,
        }
    }

    fn coin(mint: &str) -> MarketCoin {
        MarketCoin {
            token: TokenDescriptor {
                mint: mint.to_string(),
                name: mint.to_uppercase(),
                symbol: mint.to_uppercase(),
                description: String::new(),
                image: None,
                creator: "creator".to_string(),
                created_at: 1_700_000_000,
                socials: Default::default(),
            },
            // 40 SOL against 400M tokens: 1e-7 SOL per token
            reserves: Reserves {
                sol: 40_000_000_000,
                token: 400_000_000_000_000,
            },
            completed: false,
            usd_market_cap: 20_000.0,
            total_supply: 1_000_000_000_000_000,
        }
    }

    fn valuator(ledger: MockLedgerReader, api: MockMarketApi) -> PortfolioValuator {
        PortfolioValuator::new(
            Arc::new(ChainReader::new(Arc::new(ledger))),
            Arc::new(TokenMarketAggregator::new(Arc::new(api), CurveParams::default())),
        )
    }

    #[tokio::test]
    async fn test_price_error_drops_only_that_entry() {
        let mut ledger = MockLedgerReader::new();
        ledger
            .expect_get_token_accounts()
            .returning(|_, _| Ok(vec![account("good", 3_000_000), account("bad", 5_000_000)]));

        let mut api = MockMarketApi::new();
        api.expect_get_coin().returning(|mint| match mint {
            "good" => Ok(Some(coin("good"))),
            _ => Err(MarketError::Http("timeout".into())),
        });

        let portfolio = valuator(ledger, api).get_portfolio(WALLET).await;
        assert!(!portfolio.is_degraded());

        let entries = &portfolio.value().entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mint, "good");
        // 3 tokens at 20k USD / 1B tokens
        assert_relative_eq!(entries[0].value_usd, 3.0 * 0.00002, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_zero_balances_skipped_and_mints_priced_once() {
        let mut ledger = MockLedgerReader::new();
        ledger.expect_get_token_accounts().returning(|_, _| {
            Ok(vec![
                account("a", 1_000_000),
                account("empty", 0),
                account("a", 2_000_000),
            ])
        });

        let mut api = MockMarketApi::new();
        api.expect_get_coin()
            .times(1)
            .returning(|mint| Ok(Some(coin(mint))));

        let portfolio = valuator(ledger, api).get_portfolio(WALLET).await.into_value();
        assert_eq!(portfolio.entries.len(), 2);
        assert!(portfolio.entries.iter().all(|e| e.mint == "a"));
    }

    #[tokio::test]
    async fn test_account_failure_degrades() {
        let mut ledger = MockLedgerReader::new();
        ledger
            .expect_get_token_accounts()
            .returning(|_, _| Err(LedgerError::Rpc("unreachable".into())));
        let mut api = MockMarketApi::new();
        api.expect_get_coin().times(0);

        let portfolio = valuator(ledger, api).get_portfolio(WALLET).await;
        assert!(portfolio.is_degraded());
        assert!(portfolio.value().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_wallet_skips_failed_mints() {
        let ledger = MockLedgerReader::new();
        let mut api = MockMarketApi::new();
        api.expect_trades().returning(|mint, _, _| match mint {
            "sold" => Ok(vec![MarketTrade {
                signature: "s1".to_string(),
                mint: "sold".to_string(),
                user: WALLET.to_string(),
                is_buy: false,
                // 100 tokens for 0.000005 SOL: 5e-8 SOL per token
                sol_amount: 5_000,
                token_amount: 100_000_000,
                timestamp: 0,
            }]),
            _ => Err(MarketError::Http("timeout".into())),
        });
        api.expect_get_coin().returning(|mint| Ok(Some(coin(mint))));

        let mints = vec!["sold".to_string(), "broken".to_string()];
        let summary = valuator(ledger, api)
            .analyze_wallet(WALLET, &mints)
            .await
            .into_value();

        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].mint, "sold");
        // (1e-7 - 5e-8) * 100 tokens missed against 5e-6 SOL realized
        assert_relative_eq!(summary.missed_sol, 5e-6, epsilon = 1e-15);
        assert_relative_eq!(summary.oof_factor, 1.0, epsilon = 1e-9);
    }
}

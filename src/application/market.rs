//! Token Market Aggregator
//!
//! Wraps the bonding-curve market API and attaches freshly derived price, liquidity and
//! graduation progress to every token it returns. Lists degrade to empty; single lookups keep
//! "not found" (`Fresh(None)`) apart from "lookup failed" (`Degraded`).

use std::sync::Arc;

use crate::domain::bonding_curve::{self, CurveParams};
use crate::domain::read_outcome::ReadOutcome;
use crate::domain::token::{MarketTrade, TokenView};
use crate::ports::market_data::{CoinListQuery, MarketApi, MarketCoin, MarketError};

#[derive(Clone)]
pub struct TokenMarketAggregator {
    api: Arc<dyn MarketApi>,
    params: CurveParams,
    include_nsfw: bool,
}

impl TokenMarketAggregator {
    pub fn new(api: Arc<dyn MarketApi>, params: CurveParams) -> Self {
        Self {
            api,
            params,
            include_nsfw: false,
        }
    }

    pub fn with_nsfw(mut self, include_nsfw: bool) -> Self {
        self.include_nsfw = include_nsfw;
        self
    }

    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    /// Attach a fresh snapshot to a raw coin
    pub fn view(&self, coin: MarketCoin) -> TokenView {
        let market = bonding_curve::snapshot(
            coin.reserves,
            coin.completed,
            coin.usd_market_cap,
            &self.params,
        );
        TokenView {
            token: coin.token,
            market,
            completed: coin.completed,
        }
    }

    fn views(&self, result: Result<Vec<MarketCoin>, MarketError>, op: &str) -> ReadOutcome<Vec<TokenView>> {
        match result {
            Ok(coins) => ReadOutcome::fresh(coins.into_iter().map(|c| self.view(c)).collect()),
            Err(e) => {
                tracing::warn!("{} failed, returning empty list: {}", op, e);
                ReadOutcome::failed(e.to_string())
            }
        }
    }

    fn single(&self, result: Result<Option<MarketCoin>, MarketError>, op: &str) -> ReadOutcome<Option<TokenView>> {
        match result {
            Ok(coin) => ReadOutcome::fresh(coin.map(|c| self.view(c))),
            Err(e) => {
                tracing::warn!("{} failed: {}", op, e);
                ReadOutcome::failed(e.to_string())
            }
        }
    }

    pub async fn list_trending(&self, query: &CoinListQuery) -> ReadOutcome<Vec<TokenView>> {
        let mut query = query.clone();
        query.include_nsfw |= self.include_nsfw;
        self.views(self.api.list_coins(&query).await, "list_trending")
    }

    pub async fn search(&self, query: &str) -> ReadOutcome<Vec<TokenView>> {
        let query = query.trim();
        if query.is_empty() {
            return ReadOutcome::fresh(Vec::new());
        }
        self.views(self.api.search(query).await, "search")
    }

    pub async fn get_token_info(&self, mint: &str) -> ReadOutcome<Option<TokenView>> {
        self.single(self.api.get_coin(mint).await, "get_token_info")
    }

    pub async fn king_of_the_hill(&self) -> ReadOutcome<Option<TokenView>> {
        self.single(
            self.api.king_of_the_hill(self.include_nsfw).await,
            "king_of_the_hill",
        )
    }

    pub async fn get_token_trades(
        &self,
        mint: &str,
        limit: usize,
        offset: usize,
    ) -> ReadOutcome<Vec<MarketTrade>> {
        match self.api.trades(mint, limit, offset).await {
            Ok(trades) => ReadOutcome::fresh(trades),
            Err(e) => {
                tracing::warn!("get_token_trades({}) failed, returning empty list: {}", mint, e);
                ReadOutcome::failed(e.to_string())
            }
        }
    }

    async fn coin(&self, mint: &str) -> Result<MarketCoin, MarketError> {
        self.api
            .get_coin(mint)
            .await?
            .ok_or_else(|| MarketError::NotFound(mint.to_string()))
    }

    /// USD per whole token: market cap over circulating whole tokens
    pub async fn price_usd(&self, mint: &str) -> Result<f64, MarketError> {
        let coin = self.coin(mint).await?;
        if coin.total_supply == 0 {
            return Err(MarketError::Parse(format!("{} reports zero total supply", mint)));
        }
        let whole_tokens = coin.total_supply as f64 / self.params.token_unit_scale;
        Ok(coin.usd_market_cap / whole_tokens)
    }

    /// SOL per whole token from the current reserves
    pub async fn price_sol(&self, mint: &str) -> Result<f64, MarketError> {
        let coin = self.coin(mint).await?;
        Ok(bonding_curve::price(coin.reserves.sol, coin.reserves.token, &self.params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bonding_curve::Reserves;
    use crate::domain::token::{SocialLinks, TokenDescriptor};
    use crate::ports::market_data::MockMarketApi;
    use approx::assert_relative_eq;

    fn coin(mint: &str, sol: u64, completed: bool) -> MarketCoin {
        MarketCoin {
            token: TokenDescriptor {
                mint: mint.to_string(),
                name: format!("Token {}", mint),
                symbol: "TKN".to_string(),
                description: String::new(),
                image: None,
                creator: "creator".to_string(),
                created_at: 1_700_000_000,
                socials: SocialLinks::default(),
            },
            reserves: Reserves {
                sol,
                token: 500_000_000_000_000,
            },
            completed,
            usd_market_cap: 50_000.0,
            total_supply: 1_000_000_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_list_failure_is_empty_and_degraded() {
        let mut api = MockMarketApi::new();
        api.expect_list_coins()
            .returning(|_| Err(MarketError::Http("connection refused".into())));

        let market = TokenMarketAggregator::new(Arc::new(api), CurveParams::default());
        let trending = market.list_trending(&CoinListQuery::default()).await;
        assert!(trending.value().is_empty());
        assert!(trending.is_degraded());
    }

    #[tokio::test]
    async fn test_views_carry_snapshot() {
        let mut api = MockMarketApi::new();
        api.expect_list_coins().returning(|_| {
            Ok(vec![coin("A", 42_500_000_000, false), coin("B", 1_000_000_000, true)])
        });

        let market = TokenMarketAggregator::new(Arc::new(api), CurveParams::default());
        let trending = market.list_trending(&CoinListQuery::default()).await.into_value();
        assert_eq!(trending.len(), 2);
        assert_relative_eq!(trending[0].market.bonding_curve_progress, 50.0, epsilon = 1e-9);
        assert_eq!(trending[1].market.bonding_curve_progress, 100.0);
    }

    #[tokio::test]
    async fn test_token_info_not_found_vs_failed() {
        let mut api = MockMarketApi::new();
        api.expect_get_coin().returning(|mint| match mint {
            "missing" => Ok(None),
            _ => Err(MarketError::Status {
                status: 502,
                body: "bad gateway".into(),
            }),
        });

        let market = TokenMarketAggregator::new(Arc::new(api), CurveParams::default());

        let missing = market.get_token_info("missing").await;
        assert_eq!(missing, ReadOutcome::fresh(None));

        let failed = market.get_token_info("broken").await;
        assert!(failed.value().is_none());
        assert!(failed.is_degraded());
    }

    #[tokio::test]
    async fn test_blank_search_skips_api() {
        let mut api = MockMarketApi::new();
        api.expect_search().times(0);

        let market = TokenMarketAggregator::new(Arc::new(api), CurveParams::default());
        assert_eq!(market.search("   ").await, ReadOutcome::fresh(vec![]));
    }

    #[tokio::test]
    async fn test_price_usd() {
        let mut api = MockMarketApi::new();
        api.expect_get_coin()
            .returning(|mint| Ok(Some(coin(mint, 30_000_000_000, false))));

        let market = TokenMarketAggregator::new(Arc::new(api), CurveParams::default());
        // 50k USD over 1B whole tokens
        assert_relative_eq!(market.price_usd("A").await.unwrap(), 0.00005, epsilon = 1e-12);
        assert_relative_eq!(
            market.price_sol("A").await.unwrap(),
            30.0 / 500_000_000.0,
            epsilon = 1e-15
        );
    }

    #[tokio::test]
    async fn test_price_usd_missing_coin() {
        let mut api = MockMarketApi::new();
        api.expect_get_coin().returning(|_| Ok(None));

        let market = TokenMarketAggregator::new(Arc::new(api), CurveParams::default());
        assert!(matches!(
            market.price_usd("A").await,
            Err(MarketError::NotFound(_))
        ));
    }
}

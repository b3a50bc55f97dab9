//! Pump.fun REST Client
//!
//! Coin listings, lookups, search and trade tape from the pump.fun frontend API.
//! Reads are single-shot; the market aggregator decides how to degrade on failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::types::{PumpFunCoin, PumpFunTrade};
use crate::domain::token::MarketTrade;
use crate::ports::market_data::{CoinListQuery, MarketApi, MarketCoin, MarketError};

/// Pump.fun API client configuration
#[derive(Debug, Clone)]
pub struct PumpFunConfig {
    /// Base URL for the frontend API
    pub api_base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for PumpFunConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://frontend-api.pump.fun".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Bonding-curve market client
#[derive(Debug, Clone)]
pub struct PumpFunClient {
    config: PumpFunConfig,
    http: Client,
}

impl PumpFunClient {
    pub fn with_config(config: PumpFunConfig) -> Result<Self, MarketError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MarketError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn with_base_url(api_base_url: impl Into<String>) -> Result<Self, MarketError> {
        Self::with_config(PumpFunConfig {
            api_base_url: api_base_url.into(),
            ..Default::default()
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, MarketError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketError::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// `Ok(None)` on 404 or an empty body
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>, MarketError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketError::Http(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<Option<T>>(&body)
            .map_err(|e| MarketError::Parse(format!("Failed to parse response: {}", e)))
    }
}

fn into_coins(coins: Option<Vec<PumpFunCoin>>) -> Vec<MarketCoin> {
    coins
        .unwrap_or_default()
        .into_iter()
        .map(MarketCoin::from)
        .collect()
}

#[async_trait]
impl MarketApi for PumpFunClient {
    async fn list_coins(&self, query: &CoinListQuery) -> Result<Vec<MarketCoin>, MarketError> {
        let coins: Option<Vec<PumpFunCoin>> = self
            .get(
                "/coins",
                &[
                    ("offset", query.offset.to_string()),
                    ("limit", query.limit.to_string()),
                    ("sort", query.sort.clone()),
                    ("order", query.order.clone()),
                    ("includeNsfw", query.include_nsfw.to_string()),
                ],
            )
            .await?;
        Ok(into_coins(coins))
    }

    async fn get_coin(&self, mint: &str) -> Result<Option<MarketCoin>, MarketError> {
        let coin: Option<PumpFunCoin> = self.get(&format!("/coins/{}", mint), &[]).await?;
        Ok(coin.map(MarketCoin::from))
    }

    async fn king_of_the_hill(&self, include_nsfw: bool) -> Result<Option<MarketCoin>, MarketError> {
        let coin: Option<PumpFunCoin> = self
            .get(
                "/coins/king-of-the-hill",
                &[("includeNsfw", include_nsfw.to_string())],
            )
            .await?;
        Ok(coin.map(MarketCoin::from))
    }

    async fn search(&self, query: &str) -> Result<Vec<MarketCoin>, MarketError> {
        let coins: Option<Vec<PumpFunCoin>> = self
            .get("/search/coins", &[("q", query.to_string())])
            .await?;
        Ok(into_coins(coins))
    }

    async fn trades(
        &self,
        mint: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MarketTrade>, MarketError> {
        let trades: Option<Vec<PumpFunTrade>> = self
            .get(
                &format!("/trades/{}", mint),
                &[("limit", limit.to_string()), ("offset", offset.to_string())],
            )
            .await?;
        Ok(trades
            .unwrap_or_default()
            .into_iter()
            .map(MarketTrade::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coin_json(mint: &str, usd_market_cap: f64) -> serde_json::Value {
        json!({
            "mint": mint,
            "name": format!("Coin {}", mint),
            "symbol": "CN",
            "description": "",
            "creator": "Creator",
            "created_timestamp": 1700000000i64,
            "virtual_sol_reserves": 30000000000u64,
            "virtual_token_reserves": 1073000000000000u64,
            "total_supply": 1000000000000000u64,
            "complete": false,
            "usd_market_cap": usd_market_cap
        })
    }

    #[tokio::test]
    async fn test_list_coins_passes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins"))
            .and(query_param("limit", "2"))
            .and(query_param("offset", "10"))
            .and(query_param("includeNsfw", "false"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([coin_json("A", 10.0), coin_json("B", 5.0)])),
            )
            .mount(&server)
            .await;

        let client = PumpFunClient::with_base_url(server.uri()).unwrap();
        let coins = client
            .list_coins(&CoinListQuery::default().with_limit(2).with_offset(10))
            .await
            .unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].token.mint, "A");
    }

    #[tokio::test]
    async fn test_get_coin_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = PumpFunClient::with_base_url(server.uri()).unwrap();
        assert!(client.get_coin("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = PumpFunClient::with_base_url(server.uri()).unwrap();
        let err = client.get_coin("x").await.unwrap_err();
        assert!(matches!(err, MarketError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_king_of_the_hill_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/king-of-the-hill"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = PumpFunClient::with_base_url(server.uri()).unwrap();
        assert!(client.king_of_the_hill(false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_uses_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/coins"))
            .and(query_param("q", "oof"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([coin_json("OOF", 1.0)])))
            .mount(&server)
            .await;

        let client = PumpFunClient::with_base_url(server.uri()).unwrap();
        let coins = client.search("oof").await.unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].token.created_at, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_trades() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trades/MintA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "signature": "sig1",
                "mint": "MintA",
                "sol_amount": 1000000000u64,
                "token_amount": 35000000000u64,
                "is_buy": false,
                "user": "Trader",
                "timestamp": 1700000100
            }])))
            .mount(&server)
            .await;

        let client = PumpFunClient::with_base_url(server.uri()).unwrap();
        let trades = client.trades("MintA", 10, 0).await.unwrap();
        assert_eq!(trades.len(), 1);
        assert!(!trades[0].is_buy);
        assert_eq!(trades[0].user, "Trader");
    }
}

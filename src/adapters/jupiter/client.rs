//! Jupiter API Client
//!
//! HTTP client for the Jupiter DEX aggregator: quotes, swap transactions and USD prices.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;

use super::price::PriceResponse;
use super::quote::{QuoteRequest, QuoteResponse};
use super::swap::{SwapRequest, SwapResponse};
use crate::ports::execution::{ExecutionError, SwapApi, SwapQuote, SwapQuoteRequest};

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    /// Base URL for the swap API (`/quote`, `/swap`)
    pub api_base_url: String,
    /// Price API endpoint
    pub price_api_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.jup.ag/swap/v1".to_string(),
            price_api_url: "https://api.jup.ag/price/v2".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// Jupiter DEX aggregator client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    pub fn with_config(config: JupiterConfig) -> Result<Self, ExecutionError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExecutionError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("x-api-key", api_key),
            None => req,
        }
    }

    /// Raw `/quote` call; returns the typed response and the untouched JSON
    pub async fn get_quote(
        &self,
        request: &QuoteRequest,
    ) -> Result<(QuoteResponse, serde_json::Value), ExecutionError> {
        let url = format!("{}/quote", self.config.api_base_url);
        let req = self.authorized(self.http.get(&url).query(&request.query_pairs()));

        let raw: serde_json::Value = self.send(req).await?;
        let quote = serde_json::from_value(raw.clone())
            .map_err(|e| ExecutionError::ApiError(format!("Failed to parse quote: {}", e)))?;
        Ok((quote, raw))
    }

    pub async fn post_swap(&self, request: &SwapRequest) -> Result<SwapResponse, ExecutionError> {
        let url = format!("{}/swap", self.config.api_base_url);
        let req = self.authorized(self.http.post(&url).json(request));
        self.send(req).await
    }

    async fn send<T: for<'de> Deserialize<'de>>(&self, req: RequestBuilder) -> Result<T, ExecutionError> {
        let response = self
            .execute_with_retry(|| async {
                req.try_clone()
                    .ok_or_else(|| ExecutionError::ApiError("Failed to clone request".into()))?
                    .send()
                    .await
                    .map_err(|e| ExecutionError::ApiError(e.to_string()))
            })
            .await?;

        self.handle_response(response).await
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<reqwest::Response, ExecutionError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, ExecutionError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries.max(1) {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = Duration::from_secs(2u64.pow(attempt + 1));
                        tracing::warn!(
                            "Rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            self.config.max_retries
                        );
                        last_error = Some(ExecutionError::ApiError("Rate limit exceeded".into()));
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(ExecutionError::ApiError(format!("Server error: {}", status)));
                        tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(e);
                    tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ExecutionError::ApiError("Max retries exceeded".into())))
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ExecutionError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if error_text.contains("SlippageToleranceExceeded") || error_text.contains("6001") {
                return Err(ExecutionError::SlippageExceeded);
            }

            return Err(ExecutionError::ApiError(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ExecutionError::ApiError(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl SwapApi for JupiterClient {
    async fn get_swap_quote(&self, request: &SwapQuoteRequest) -> Result<SwapQuote, ExecutionError> {
        if request.amount == 0 {
            return Err(ExecutionError::InvalidParameters("amount must be non-zero".into()));
        }
        if request.input_mint == request.output_mint {
            return Err(ExecutionError::InvalidParameters(
                "input and output mint are the same".into(),
            ));
        }

        let (quote, raw) = self.get_quote(&QuoteRequest::from(request)).await?;
        quote.into_swap_quote(raw)
    }

    async fn get_swap_transaction(
        &self,
        quote: &SwapQuote,
        user_public_key: &str,
    ) -> Result<Vec<u8>, ExecutionError> {
        let swap = self
            .post_swap(&SwapRequest::new(user_public_key.to_string(), quote.raw.clone()))
            .await?;

        swap.transaction_bytes()
            .map_err(|e| ExecutionError::ApiError(format!("Invalid swap transaction encoding: {}", e)))
    }

    async fn get_prices(&self, mints: &[String]) -> Result<HashMap<String, f64>, ExecutionError> {
        if mints.is_empty() {
            return Ok(HashMap::new());
        }

        let req = self.authorized(
            self.http
                .get(&self.config.price_api_url)
                .query(&[("ids", mints.join(","))]),
        );
        let response: PriceResponse = self.send(req).await?;
        Ok(response.into_prices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> JupiterClient {
        JupiterClient::with_config(JupiterConfig {
            api_base_url: server.uri(),
            price_api_url: format!("{}/price", server.uri()),
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(5),
            max_retries: 1,
        })
        .unwrap()
    }

    fn quote_request() -> SwapQuoteRequest {
        SwapQuoteRequest {
            input_mint: "So11111111111111111111111111111111111111112".to_string(),
            output_mint: "MintA".to_string(),
            amount: 1_000_000_000,
            slippage_bps: 50,
        }
    }

    #[test]
    fn test_jupiter_config_default() {
        let config = JupiterConfig::default();
        assert_eq!(config.api_base_url, "https://api.jup.ag/swap/v1");
        assert!(config.api_key.is_none());
        assert_eq!(config.max_retries, 3);
    }

    #[tokio::test]
    async fn test_quote_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .and(header("x-api-key", "test-key"))
            .and(query_param("slippageBps", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "inputMint": "So11111111111111111111111111111111111111112",
                "outputMint": "MintA",
                "inAmount": "1000000000",
                "outAmount": "35000000000",
                "otherAmountThreshold": "34825000000",
                "priceImpactPct": "0.5",
                "routePlan": []
            })))
            .mount(&server)
            .await;

        let quote = client(&server).get_swap_quote(&quote_request()).await.unwrap();
        assert_eq!(quote.output_amount, 35_000_000_000);
        assert_eq!(quote.raw["otherAmountThreshold"], "34825000000");
    }

    #[tokio::test]
    async fn test_quote_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"Could not find any route"}"#),
            )
            .mount(&server)
            .await;

        let err = client(&server).get_swap_quote(&quote_request()).await.unwrap_err();
        assert!(err.to_string().contains("Could not find any route"));
    }

    #[tokio::test]
    async fn test_quote_rejects_same_mint() {
        let server = MockServer::start().await;
        let mut request = quote_request();
        request.output_mint = request.input_mint.clone();
        let err = client(&server).get_swap_quote(&request).await.unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_swap_transaction_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/swap"))
            .and(body_partial_json(json!({ "userPublicKey": "Wallet" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "swapTransaction": "AQID",
                "lastValidBlockHeight": 1000
            })))
            .mount(&server)
            .await;

        let quote = SwapQuote {
            input_mint: "A".into(),
            output_mint: "B".into(),
            input_amount: 1,
            output_amount: 1,
            min_output_amount: 1,
            price_impact_pct: 0.0,
            route: vec![],
            raw: json!({ "inAmount": "1" }),
        };
        let bytes = client(&server).get_swap_transaction(&quote, "Wallet").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_slippage_error_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/swap"))
            .respond_with(ResponseTemplate::new(400).set_body_string("SlippageToleranceExceeded"))
            .mount(&server)
            .await;

        let quote = SwapQuote {
            input_mint: "A".into(),
            output_mint: "B".into(),
            input_amount: 1,
            output_amount: 1,
            min_output_amount: 1,
            price_impact_pct: 0.0,
            route: vec![],
            raw: json!({}),
        };
        let err = client(&server).get_swap_transaction(&quote, "Wallet").await.unwrap_err();
        assert!(matches!(err, ExecutionError::SlippageExceeded));
    }

    #[tokio::test]
    async fn test_prices() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/price"))
            .and(query_param("ids", "MintA,MintB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "MintA": { "id": "MintA", "price": "0.25" },
                    "MintB": null
                }
            })))
            .mount(&server)
            .await;

        let prices = client(&server)
            .get_prices(&["MintA".to_string(), "MintB".to_string()])
            .await
            .unwrap();
        assert_eq!(prices.len(), 1);
        assert!((prices["MintA"] - 0.25).abs() < 1e-12);
    }
}

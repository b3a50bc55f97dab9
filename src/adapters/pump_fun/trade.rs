//! PumpPortal local-trade client
//!
//! Builds unsigned bonding-curve buy/sell transactions. The caller signs and submits them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::ports::execution::{CurveTradeApi, CurveTradeRequest, ExecutionError};

#[derive(Debug, Clone)]
pub struct PumpPortalConfig {
    /// Full URL of the local-trade endpoint
    pub trade_url: String,
    pub timeout: Duration,
}

impl Default for PumpPortalConfig {
    fn default() -> Self {
        Self {
            trade_url: "https://pumpportal.fun/api/trade-local".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PumpPortalClient {
    config: PumpPortalConfig,
    http: Client,
}

impl PumpPortalClient {
    pub fn with_config(config: PumpPortalConfig) -> Result<Self, ExecutionError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExecutionError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }
}

#[async_trait]
impl CurveTradeApi for PumpPortalClient {
    async fn get_trade_transaction(&self, request: &CurveTradeRequest) -> Result<Vec<u8>, ExecutionError> {
        if request.amount <= 0.0 {
            return Err(ExecutionError::InvalidParameters(format!(
                "trade amount must be positive, got {}",
                request.amount
            )));
        }

        tracing::debug!("POST {} ({} {})", self.config.trade_url, request.action, request.mint);
        let response = self
            .http
            .post(&self.config.trade_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ExecutionError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExecutionError::ApiError(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExecutionError::ApiError(format!("Failed to read transaction: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::TradeAction;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(amount: f64) -> CurveTradeRequest {
        CurveTradeRequest {
            public_key: "Wallet".to_string(),
            action: TradeAction::Buy,
            mint: "MintA".to_string(),
            amount,
            denominated_in_sol: true,
            slippage: 10.0,
            priority_fee: 0.0005,
            pool: "pump".to_string(),
        }
    }

    async fn client(server: &MockServer) -> PumpPortalClient {
        PumpPortalClient::with_config(PumpPortalConfig {
            trade_url: format!("{}/api/trade-local", server.uri()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_returns_raw_transaction_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/trade-local"))
            .and(body_partial_json(json!({
                "publicKey": "Wallet",
                "action": "buy",
                "denominatedInSol": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let bytes = client(&server).await.get_trade_transaction(&request(0.5)).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad mint"))
            .mount(&server)
            .await;

        let err = client(&server).await.get_trade_transaction(&request(0.5)).await.unwrap_err();
        assert!(err.to_string().contains("bad mint"));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount() {
        let server = MockServer::start().await;
        let err = client(&server).await.get_trade_transaction(&request(0.0)).await.unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidParameters(_)));
    }
}

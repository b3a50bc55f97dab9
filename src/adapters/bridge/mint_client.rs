//! Destination-chain mint API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::ports::mint::{CardMintRequest, MintApi, MintError, MintReceipt};

#[derive(Debug, Clone)]
pub struct MintApiConfig {
    /// Endpoint receiving `POST` card mint requests
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct MintApiResponse {
    #[serde(alias = "id", alias = "tokenId", alias = "tokenAddress")]
    reference: String,
}

/// Mint API over HTTP
#[derive(Debug, Clone)]
pub struct HttpMintApi {
    config: MintApiConfig,
    http: Client,
}

impl HttpMintApi {
    pub fn with_config(config: MintApiConfig) -> Result<Self, MintError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MintError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }
}

#[async_trait]
impl MintApi for HttpMintApi {
    async fn create_card_token(&self, request: &CardMintRequest) -> Result<MintReceipt, MintError> {
        tracing::debug!(
            "POST {} for {} (bridge tx {})",
            self.config.url,
            request.name,
            request.metadata.bridge_transaction_id
        );

        let response = self
            .http
            .post(&self.config.url)
            .json(request)
            .send()
            .await
            .map_err(|e| MintError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(MintError::Rejected(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MintError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MintApiResponse = response
            .json()
            .await
            .map_err(|e| MintError::Parse(e.to_string()))?;

        Ok(MintReceipt {
            reference: parsed.reference,
            simulated: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mint::CardMintMetadata;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CardMintRequest {
        CardMintRequest {
            name: "Dust Collector".to_string(),
            description: "card".to_string(),
            image: "ipfs://dust".to_string(),
            initial_supply: dec!(3500),
            price_per_token: dec!(0.001),
            metadata: CardMintMetadata {
                oof_amount: dec!(350),
                bridge_transaction_id: "bridge-2".to_string(),
                created_at: Utc::now(),
            },
        }
    }

    async fn api(server: &MockServer) -> HttpMintApi {
        HttpMintApi::with_config(MintApiConfig {
            url: format!("{}/tokens", server.uri()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_card_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tokens"))
            .and(body_partial_json(json!({
                "name": "Dust Collector",
                "metadata": { "bridgeTransactionId": "bridge-2" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "tokenId": "tok-9" })))
            .mount(&server)
            .await;

        let receipt = api(&server).await.create_card_token(&request()).await.unwrap();
        assert_eq!(receipt.reference, "tok-9");
        assert!(!receipt.simulated);
    }

    #[tokio::test]
    async fn test_rejected_and_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad supply"))
            .mount(&server)
            .await;

        let err = api(&server).await.create_card_token(&request()).await.unwrap_err();
        assert!(matches!(err, MintError::Rejected(_)));

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = api(&server).await.create_card_token(&request()).await.unwrap_err();
        assert!(matches!(err, MintError::Status { status: 502, .. }));
    }
}

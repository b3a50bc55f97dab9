//! JSON-RPC ledger reader
//!
//! Read-only lookups over plain HTTP JSON-RPC (`getBalance`, `getTokenAccountsByOwner`,
//! `getSignaturesForAddress`, `getTransaction`). No retries: a failed call surfaces once and the
//! chain reader turns it into a degraded read.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::ledger::{SignatureInfo, TokenAccount, TokenAccountFilter, TransactionRecord};
use crate::ports::ledger::{LedgerError, LedgerReader};

/// Configuration for the JSON-RPC reader
#[derive(Debug, Clone)]
pub struct JsonRpcConfig {
    pub rpc_url: String,
    pub commitment: String,
    pub timeout: Duration,
}

impl Default for JsonRpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct KeyedAccount {
    pubkey: String,
    account: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedTokenAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedTokenAccount {
    info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    mint: String,
    owner: String,
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    amount: String,
    decimals: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignature {
    signature: String,
    slot: u64,
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    block_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    slot: u64,
    #[serde(default)]
    block_time: Option<i64>,
    meta: Option<RawMeta>,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    fee: u64,
    #[serde(default)]
    err: Option<Value>,
}

impl KeyedAccount {
    /// Decode one entry of a `getTokenAccountsByOwner` result
    fn from_value(raw: Value) -> Result<TokenAccount, LedgerError> {
        let keyed: KeyedAccount =
            serde_json::from_value(raw).map_err(|e| LedgerError::Parse(e.to_string()))?;
        keyed.into_token_account()
    }

    fn into_token_account(self) -> Result<TokenAccount, LedgerError> {
        let info = self.account.data.parsed.info;
        let amount = info.token_amount.amount.parse::<u64>().map_err(|e| {
            LedgerError::Parse(format!("token amount '{}': {}", info.token_amount.amount, e))
        })?;
        Ok(TokenAccount {
            address: self.pubkey,
            mint: info.mint,
            owner: info.owner,
            amount,
            decimals: info.token_amount.decimals,
        })
    }
}

/// Ledger reader over HTTP JSON-RPC
#[derive(Debug, Clone)]
pub struct JsonRpcLedger {
    config: JsonRpcConfig,
    http: Client,
}

impl JsonRpcLedger {
    pub fn with_rpc_url(rpc_url: impl Into<String>) -> Result<Self, LedgerError> {
        Self::with_config(JsonRpcConfig {
            rpc_url: rpc_url.into(),
            ..Default::default()
        })
    }

    pub fn with_config(config: JsonRpcConfig) -> Result<Self, LedgerError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LedgerError::Rpc(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Issue one JSON-RPC call. `Ok(None)` when the node answers with a null result.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::debug!("RPC {} -> {}", method, self.config.rpc_url);
        let response = self
            .http
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LedgerError::Rpc(format!("HTTP {}: {}", status, text)));
        }

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::Parse(format!("{}: {}", method, e)))?;

        if let Some(error) = envelope.error {
            return Err(LedgerError::RpcResponse {
                code: error.code,
                message: error.message,
            });
        }
        Ok(envelope.result)
    }

    async fn call_required<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LedgerError> {
        self.call(method, params)
            .await?
            .ok_or_else(|| LedgerError::Parse(format!("{}: missing result", method)))
    }
}

#[async_trait]
impl LedgerReader for JsonRpcLedger {
    async fn get_balance(&self, address: &str) -> Result<u64, LedgerError> {
        let result: WithContext<u64> = self
            .call_required(
                "getBalance",
                json!([address, { "commitment": self.config.commitment }]),
            )
            .await?;
        Ok(result.value)
    }

    async fn get_token_accounts(
        &self,
        owner: &str,
        filter: &TokenAccountFilter,
    ) -> Result<Vec<TokenAccount>, LedgerError> {
        let result: WithContext<Vec<Value>> = self
            .call_required(
                "getTokenAccountsByOwner",
                json!([
                    owner,
                    filter,
                    { "encoding": "jsonParsed", "commitment": self.config.commitment }
                ]),
            )
            .await?;

        // Accounts the node could not parse come back as raw base64; skip only those
        Ok(result
            .value
            .into_iter()
            .filter_map(|raw| {
                let pubkey = raw
                    .get("pubkey")
                    .and_then(Value::as_str)
                    .unwrap_or("<unknown>")
                    .to_string();
                match KeyedAccount::from_value(raw) {
                    Ok(account) => Some(account),
                    Err(e) => {
                        tracing::warn!("Skipping token account {} of {}: {}", pubkey, owner, e);
                        None
                    }
                }
            })
            .collect())
    }

    async fn get_signatures(
        &self,
        address: &str,
        limit: usize,
        before: Option<String>,
    ) -> Result<Vec<SignatureInfo>, LedgerError> {
        let mut options = json!({ "limit": limit, "commitment": self.config.commitment });
        if let Some(before) = before {
            options["before"] = Value::String(before);
        }

        let raw: Vec<RawSignature> = self
            .call_required("getSignaturesForAddress", json!([address, options]))
            .await?;

        Ok(raw
            .into_iter()
            .map(|s| SignatureInfo {
                failed: s.err.as_ref().is_some_and(|e| !e.is_null()),
                signature: s.signature,
                slot: s.slot,
                block_time: s.block_time,
            })
            .collect())
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<TransactionRecord>, LedgerError> {
        let raw: Option<RawTransaction> = self
            .call(
                "getTransaction",
                json!([
                    signature,
                    {
                        "encoding": "json",
                        "commitment": self.config.commitment,
                        "maxSupportedTransactionVersion": 0
                    }
                ]),
            )
            .await?;

        Ok(raw.map(|tx| {
            let (fee, error) = match tx.meta {
                Some(meta) => (meta.fee, meta.err.filter(|e| !e.is_null()).map(|e| e.to_string())),
                None => (0, None),
            };
            TransactionRecord {
                signature: signature.to_string(),
                slot: tx.slot,
                block_time: tx.block_time,
                fee,
                success: error.is_none(),
                error,
            }
        }))
    }
}

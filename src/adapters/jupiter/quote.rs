//! Jupiter Quote Types
//!
//! Wire types for the `/quote` endpoint and their conversion into `SwapQuote`.

use serde::{Deserialize, Serialize};

use crate::ports::execution::{ExecutionError, SwapQuote, SwapQuoteRequest};

/// Query parameters for `/quote`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// Amount in base units (lamports for SOL)
    pub amount: u64,
    /// Slippage tolerance in basis points (1 = 0.01%)
    pub slippage_bps: u16,
}

impl From<&SwapQuoteRequest> for QuoteRequest {
    fn from(request: &SwapQuoteRequest) -> Self {
        Self {
            input_mint: request.input_mint.clone(),
            output_mint: request.output_mint.clone(),
            amount: request.amount,
            slippage_bps: request.slippage_bps,
        }
    }
}

impl QuoteRequest {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("inputMint", self.input_mint.clone()),
            ("outputMint", self.output_mint.clone()),
            ("amount", self.amount.to_string()),
            ("slippageBps", self.slippage_bps.to_string()),
        ]
    }
}

/// Response from Jupiter quote API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: String,
    pub out_amount: String,
    /// Minimum output amount after slippage
    pub other_amount_threshold: String,
    #[serde(default)]
    pub price_impact_pct: String,
    #[serde(default)]
    pub route_plan: Vec<RoutePlanStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlanStep {
    pub swap_info: SwapInfo,
    pub percent: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInfo {
    pub amm_key: String,
    /// DEX label, e.g. "Raydium"
    #[serde(default)]
    pub label: String,
}

fn parse_amount(field: &str, value: &str) -> Result<u64, ExecutionError> {
    value
        .parse()
        .map_err(|_| ExecutionError::ApiError(format!("Invalid {} in quote: '{}'", field, value)))
}

impl QuoteResponse {
    /// Convert into the port model, keeping the raw JSON for the swap call
    pub fn into_swap_quote(self, raw: serde_json::Value) -> Result<SwapQuote, ExecutionError> {
        Ok(SwapQuote {
            input_amount: parse_amount("inAmount", &self.in_amount)?,
            output_amount: parse_amount("outAmount", &self.out_amount)?,
            min_output_amount: parse_amount("otherAmountThreshold", &self.other_amount_threshold)?,
            price_impact_pct: self.price_impact_pct.parse().unwrap_or(0.0),
            route: self
                .route_plan
                .iter()
                .map(|step| step.swap_info.label.clone())
                .collect(),
            input_mint: self.input_mint,
            output_mint: self.output_mint,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE: &str = r#"{
        "inputMint": "So11111111111111111111111111111111111111112",
        "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        "inAmount": "1000000000",
        "outAmount": "150000000",
        "otherAmountThreshold": "149250000",
        "swapMode": "ExactIn",
        "slippageBps": 50,
        "priceImpactPct": "0.12",
        "routePlan": [{
            "swapInfo": {
                "ammKey": "pool123",
                "label": "Raydium",
                "inputMint": "SOL",
                "outputMint": "USDC",
                "inAmount": "1000000000",
                "outAmount": "150000000"
            },
            "percent": 100
        }]
    }"#;

    #[test]
    fn test_quote_conversion_keeps_raw() {
        let raw: serde_json::Value = serde_json::from_str(QUOTE).unwrap();
        let response: QuoteResponse = serde_json::from_value(raw.clone()).unwrap();
        let quote = response.into_swap_quote(raw.clone()).unwrap();

        assert_eq!(quote.input_amount, 1_000_000_000);
        assert_eq!(quote.output_amount, 150_000_000);
        assert_eq!(quote.min_output_amount, 149_250_000);
        assert!((quote.price_impact_pct - 0.12).abs() < 1e-9);
        assert_eq!(quote.route, vec!["Raydium".to_string()]);
        assert_eq!(quote.raw["swapMode"], "ExactIn");
    }

    #[test]
    fn test_bad_amount_is_error() {
        let mut raw: serde_json::Value = serde_json::from_str(QUOTE).unwrap();
        raw["outAmount"] = serde_json::Value::String("lots".into());
        let response: QuoteResponse = serde_json::from_value(raw.clone()).unwrap();
        assert!(response.into_swap_quote(raw).is_err());
    }

    #[test]
    fn test_query_pairs() {
        let request = QuoteRequest::from(&SwapQuoteRequest {
            input_mint: "A".into(),
            output_mint: "B".into(),
            amount: 42,
            slippage_bps: 100,
        });
        let pairs = request.query_pairs();
        assert!(pairs.contains(&("amount", "42".to_string())));
        assert!(pairs.contains(&("slippageBps", "100".to_string())));
    }
}

//! Jupiter Swap Types
//!
//! Request and response structures for the `/swap` endpoint.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Body of `/swap`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// Wallet that signs and pays for the swap
    pub user_public_key: String,
    /// The full quote response from `/quote`
    pub quote_response: serde_json::Value,
    pub wrap_and_unwrap_sol: bool,
    pub dynamic_compute_unit_limit: bool,
}

impl SwapRequest {
    pub fn new(user_public_key: String, quote_response: serde_json::Value) -> Self {
        Self {
            user_public_key,
            quote_response,
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
        }
    }
}

/// Response from Jupiter swap API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Base64 encoded serialized transaction ready to sign and send
    pub swap_transaction: String,
    #[serde(default)]
    pub last_valid_block_height: u64,
}

impl SwapResponse {
    /// Get the transaction bytes from base64
    pub fn transaction_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.swap_transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_request_serialization() {
        let request = SwapRequest::new(
            "Wallet".to_string(),
            serde_json::json!({ "inAmount": "1" }),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userPublicKey"], "Wallet");
        assert_eq!(json["quoteResponse"]["inAmount"], "1");
        assert_eq!(json["wrapAndUnwrapSol"], true);
    }

    #[test]
    fn test_transaction_bytes() {
        let response = SwapResponse {
            swap_transaction: "AQID".to_string(),
            last_valid_block_height: 100,
        };
        assert_eq!(response.transaction_bytes().unwrap(), vec![1, 2, 3]);

        let bad = SwapResponse {
            swap_transaction: "%%%".to_string(),
            last_valid_block_height: 0,
        };
        assert!(bad.transaction_bytes().is_err());
    }
}

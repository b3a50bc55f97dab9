//! Simulated bridge collaborators
//!
//! Used when execution mode is `simulated`: nothing reaches the ledger or the mint API, every
//! call is logged and answered with a `sim-` identifier.

use async_trait::async_trait;
use uuid::Uuid;

use crate::ports::ledger::{LedgerError, TokenTransfer};
use crate::ports::mint::{CardMintRequest, MintApi, MintError, MintReceipt};

fn sim_id() -> String {
    format!("sim-{}", Uuid::new_v4())
}

/// Token transfer that only logs
#[derive(Debug, Clone, Default)]
pub struct SimulatedTransfer;

#[async_trait]
impl TokenTransfer for SimulatedTransfer {
    async fn transfer(
        &self,
        from: &str,
        mint: &str,
        destination_owner: &str,
        amount: u64,
        decimals: u8,
    ) -> Result<String, LedgerError> {
        let signature = sim_id();
        tracing::info!(
            "[simulated] transfer {} base units (decimals {}) of {} from {} to {}: {}",
            amount,
            decimals,
            mint,
            from,
            destination_owner,
            signature
        );
        Ok(signature)
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Mint API that logs the request body instead of sending it
#[derive(Debug, Clone, Default)]
pub struct LoggingMintApi;

#[async_trait]
impl MintApi for LoggingMintApi {
    async fn create_card_token(&self, request: &CardMintRequest) -> Result<MintReceipt, MintError> {
        let body = serde_json::to_string(request).map_err(|e| MintError::Parse(e.to_string()))?;
        tracing::info!("[simulated] mint request: {}", body);
        Ok(MintReceipt {
            reference: sim_id(),
            simulated: true,
        })
    }
}

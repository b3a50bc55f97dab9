use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether transactions are really submitted to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Nothing is submitted; results are flagged as simulated
    #[default]
    Simulated,
    /// Transactions are signed, submitted and confirmed
    Live,
}

impl ExecutionMode {
    pub fn is_live(&self) -> bool {
        matches!(self, ExecutionMode::Live)
    }
}

/// Side of a bonding-curve trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("buy"),
            TradeAction::Sell => f.write_str("sell"),
        }
    }
}

/// Result of a swap, buy or sell
///
/// A failed result never carries a signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub success: bool,
    pub signature: Option<String>,
    pub error: Option<String>,
    /// True when nothing was submitted to the ledger
    pub simulated: bool,
}

impl TradeResult {
    /// Confirmed on-chain
    pub fn confirmed(signature: String) -> Self {
        Self {
            success: true,
            signature: Some(signature),
            error: None,
            simulated: false,
        }
    }

    /// Accepted in simulation mode with a placeholder signature
    pub fn simulated(signature: String) -> Self {
        Self {
            success: true,
            signature: Some(signature),
            error: None,
            simulated: true,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            signature: None,
            error: Some(error.into()),
            simulated: false,
        }
    }
}

impl fmt::Display for TradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.signature, &self.error) {
            (Some(sig), _) if self.simulated => write!(f, "Simulated: {}", sig),
            (Some(sig), _) => write!(f, "Confirmed: {}", sig),
            (None, Some(err)) => write!(f, "Failed: {}", err),
            (None, None) => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_has_no_signature() {
        let result = TradeResult::failed("blockhash expired");
        assert!(!result.success);
        assert!(result.signature.is_none());
        assert_eq!(result.error.as_deref(), Some("blockhash expired"));
        assert_eq!(result.to_string(), "Failed: blockhash expired");
    }

    #[test]
    fn test_simulated_is_flagged() {
        let result = TradeResult::simulated("sim-1".to_string());
        assert!(result.success);
        assert!(result.simulated);
        assert_eq!(result.to_string(), "Simulated: sim-1");

        let live = TradeResult::confirmed("5abc".to_string());
        assert!(!live.simulated);
        assert_eq!(live.to_string(), "Confirmed: 5abc");
    }

    #[test]
    fn test_execution_mode_serde() {
        let mode: ExecutionMode = serde_json::from_str("\"live\"").unwrap();
        assert!(mode.is_live());
        assert_eq!(ExecutionMode::default(), ExecutionMode::Simulated);
        assert_eq!(TradeAction::Sell.to_string(), "sell");
    }
}

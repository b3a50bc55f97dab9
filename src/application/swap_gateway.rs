//! Swap/Trade Gateway
//!
//! Quotes and swaps through the DEX aggregator, buys and sells bonding-curve tokens through the
//! trade API. Quote and price failures propagate. Executions always come back as a
//! `TradeResult`: confirmed on-chain in live mode, flagged as simulated otherwise.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::trade::{ExecutionMode, TradeAction, TradeResult};
use crate::ports::execution::{
    CurveTradeApi, CurveTradeRequest, ExecutionError, SwapApi, SwapQuote, SwapQuoteRequest,
};
use crate::ports::ledger::TransactionSubmitter;

/// One aggregator swap
#[derive(Debug, Clone, PartialEq)]
pub struct SwapConfig {
    pub input_mint: String,
    pub output_mint: String,
    /// Input amount in base units
    pub amount: u64,
    pub slippage_bps: u16,
}

#[derive(Debug, Clone)]
pub struct TradeGatewayConfig {
    pub mode: ExecutionMode,
    pub default_slippage_bps: u16,
    /// Bonding-curve slippage in percent
    pub curve_slippage_pct: f64,
    pub priority_fee_sol: f64,
    /// Venue passed to the trade API
    pub pool: String,
}

impl Default for TradeGatewayConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Simulated,
            default_slippage_bps: 50,
            curve_slippage_pct: 10.0,
            priority_fee_sol: 0.00005,
            pool: "pump".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct TradeGateway {
    swap_api: Arc<dyn SwapApi>,
    curve_api: Arc<dyn CurveTradeApi>,
    submitter: Option<Arc<dyn TransactionSubmitter>>,
    config: TradeGatewayConfig,
}

impl TradeGateway {
    pub fn new(
        swap_api: Arc<dyn SwapApi>,
        curve_api: Arc<dyn CurveTradeApi>,
        config: TradeGatewayConfig,
    ) -> Self {
        Self {
            swap_api,
            curve_api,
            submitter: None,
            config,
        }
    }

    /// Attach the signer used in live mode
    pub fn with_submitter(mut self, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.config.mode
    }

    pub fn default_slippage_bps(&self) -> u16 {
        self.config.default_slippage_bps
    }

    pub async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<SwapQuote, ExecutionError> {
        let request = SwapQuoteRequest {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            amount,
            slippage_bps,
        };
        let quote = self.swap_api.get_swap_quote(&request).await?;
        tracing::debug!(
            "Quote {} {} -> {} {} (impact {:.4}%, route {})",
            quote.input_amount,
            input_mint,
            quote.output_amount,
            output_mint,
            quote.price_impact_pct,
            quote.route.join(" > ")
        );
        Ok(quote)
    }

    pub async fn prices(&self, mints: &[String]) -> Result<HashMap<String, f64>, ExecutionError> {
        self.swap_api.get_prices(mints).await
    }

    pub async fn execute_swap(&self, config: &SwapConfig, wallet: &str) -> TradeResult {
        let transaction: Result<Vec<u8>, ExecutionError> = async {
            let quote = self
                .quote(
                    &config.input_mint,
                    &config.output_mint,
                    config.amount,
                    config.slippage_bps,
                )
                .await?;
            self.swap_api.get_swap_transaction(&quote, wallet).await
        }
        .await;

        self.finish("swap", wallet, transaction).await
    }

    /// Buy a bonding-curve token with `sol_amount` SOL
    pub async fn buy(&self, mint: &str, sol_amount: f64, wallet: &str) -> TradeResult {
        self.curve_trade(TradeAction::Buy, mint, sol_amount, true, wallet)
            .await
    }

    /// Sell `token_amount` whole tokens of a bonding-curve token
    pub async fn sell(&self, mint: &str, token_amount: f64, wallet: &str) -> TradeResult {
        self.curve_trade(TradeAction::Sell, mint, token_amount, false, wallet)
            .await
    }

    async fn curve_trade(
        &self,
        action: TradeAction,
        mint: &str,
        amount: f64,
        denominated_in_sol: bool,
        wallet: &str,
    ) -> TradeResult {
        let request = CurveTradeRequest {
            public_key: wallet.to_string(),
            action,
            mint: mint.to_string(),
            amount,
            denominated_in_sol,
            slippage: self.config.curve_slippage_pct,
            priority_fee: self.config.priority_fee_sol,
            pool: self.config.pool.clone(),
        };
        let transaction = self.curve_api.get_trade_transaction(&request).await;
        self.finish(&action.to_string(), wallet, transaction).await
    }

    /// Submit a built transaction, or stop short of it in simulated mode
    async fn finish(
        &self,
        op: &str,
        wallet: &str,
        transaction: Result<Vec<u8>, ExecutionError>,
    ) -> TradeResult {
        let transaction = match transaction {
            Ok(tx) => tx,
            Err(e) => {
                tracing::warn!("{} for {} failed: {}", op, wallet, e);
                return TradeResult::failed(e.to_string());
            }
        };

        match self.config.mode {
            ExecutionMode::Simulated => {
                let signature = format!("sim-{}", Uuid::new_v4());
                tracing::info!(
                    "[simulated] {} for {} built ({} bytes), not submitted: {}",
                    op,
                    wallet,
                    transaction.len(),
                    signature
                );
                TradeResult::simulated(signature)
            }
            ExecutionMode::Live => match self.submit(wallet, transaction).await {
                Ok(signature) => {
                    tracing::info!("{} confirmed: {}", op, signature);
                    TradeResult::confirmed(signature)
                }
                Err(e) => {
                    tracing::warn!("{} for {} failed: {}", op, wallet, e);
                    TradeResult::failed(e.to_string())
                }
            },
        }
    }

    async fn submit(&self, wallet: &str, transaction: Vec<u8>) -> Result<String, ExecutionError> {
        let submitter = self.submitter.as_ref().ok_or_else(|| {
            ExecutionError::SigningError("live mode requires a signing wallet".to_string())
        })?;
        let signer = submitter.signer_address();
        if signer != wallet {
            return Err(ExecutionError::SigningError(format!(
                "wallet {} is not the configured signer {}",
                wallet, signer
            )));
        }
        submitter
            .sign_and_submit(transaction)
            .await
            .map_err(|e| ExecutionError::ExecutionError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::execution::{MockCurveTradeApi, MockSwapApi};
    use crate::ports::ledger::{LedgerError, MockTransactionSubmitter};
    use mockall::predicate::*;
    use serde_json::json;

    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const SOL: &str = "So11111111111111111111111111111111111111112";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn quote() -> SwapQuote {
        SwapQuote {
            input_mint: SOL.to_string(),
            output_mint: USDC.to_string(),
            input_amount: 1_000_000_000,
            output_amount: 150_000_000,
            min_output_amount: 149_250_000,
            price_impact_pct: 0.01,
            route: vec!["Orca".to_string()],
            raw: json!({ "inAmount": "1000000000" }),
        }
    }

    fn swap_config() -> SwapConfig {
        SwapConfig {
            input_mint: SOL.to_string(),
            output_mint: USDC.to_string(),
            amount: 1_000_000_000,
            slippage_bps: 50,
        }
    }

    fn swap_api() -> MockSwapApi {
        let mut api = MockSwapApi::new();
        api.expect_get_swap_quote().returning(|_| Ok(quote()));
        api.expect_get_swap_transaction()
            .returning(|_, _| Ok(vec![1, 2, 3]));
        api
    }

    fn gateway(api: MockSwapApi, mode: ExecutionMode) -> TradeGateway {
        TradeGateway::new(
            Arc::new(api),
            Arc::new(MockCurveTradeApi::new()),
            TradeGatewayConfig {
                mode,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_quote_error_propagates() {
        let mut api = MockSwapApi::new();
        api.expect_get_swap_quote().returning(|_| {
            Err(ExecutionError::ApiError("Quote failed: 400 Bad Request".into()))
        });

        let gateway = gateway(api, ExecutionMode::Simulated);
        let result = gateway.quote(SOL, USDC, 1_000, 50).await;
        assert!(matches!(result, Err(ExecutionError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_simulated_swap_is_flagged() {
        let gateway = gateway(swap_api(), ExecutionMode::Simulated);
        let result = gateway.execute_swap(&swap_config(), WALLET).await;

        assert!(result.success);
        assert!(result.simulated);
        assert!(result.signature.unwrap().starts_with("sim-"));
    }

    #[tokio::test]
    async fn test_live_swap_submits() {
        let mut submitter = MockTransactionSubmitter::new();
        submitter
            .expect_signer_address()
            .return_const(WALLET.to_string());
        submitter
            .expect_sign_and_submit()
            .with(eq(vec![1u8, 2, 3]))
            .times(1)
            .returning(|_| Ok("5sig".to_string()));

        let gateway = gateway(swap_api(), ExecutionMode::Live).with_submitter(Arc::new(submitter));
        let result = gateway.execute_swap(&swap_config(), WALLET).await;

        assert_eq!(result, TradeResult::confirmed("5sig".to_string()));
    }

    #[tokio::test]
    async fn test_live_submission_failure_has_no_signature() {
        let mut submitter = MockTransactionSubmitter::new();
        submitter
            .expect_signer_address()
            .return_const(WALLET.to_string());
        submitter
            .expect_sign_and_submit()
            .returning(|_| Err(LedgerError::Transaction("blockhash expired".into())));

        let gateway = gateway(swap_api(), ExecutionMode::Live).with_submitter(Arc::new(submitter));
        let result = gateway.execute_swap(&swap_config(), WALLET).await;

        assert!(!result.success);
        assert!(result.signature.is_none());
        assert!(result.error.unwrap().contains("blockhash expired"));
    }

    #[tokio::test]
    async fn test_live_without_signer_fails() {
        let gateway = gateway(swap_api(), ExecutionMode::Live);
        let result = gateway.execute_swap(&swap_config(), WALLET).await;
        assert!(!result.success);
        assert!(!result.simulated);
    }

    #[tokio::test]
    async fn test_live_rejects_foreign_wallet() {
        let mut submitter = MockTransactionSubmitter::new();
        submitter
            .expect_signer_address()
            .return_const(USDC.to_string());
        submitter.expect_sign_and_submit().times(0);

        let gateway = gateway(swap_api(), ExecutionMode::Live).with_submitter(Arc::new(submitter));
        let result = gateway.execute_swap(&swap_config(), WALLET).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_buy_builds_curve_trade() {
        let mut curve = MockCurveTradeApi::new();
        curve
            .expect_get_trade_transaction()
            .withf(|req| {
                req.action == TradeAction::Buy
                    && req.denominated_in_sol
                    && req.amount == 0.5
                    && req.public_key == WALLET
                    && req.pool == "pump"
            })
            .times(1)
            .returning(|_| Ok(vec![9]));

        let gateway = TradeGateway::new(
            Arc::new(MockSwapApi::new()),
            Arc::new(curve),
            TradeGatewayConfig::default(),
        );
        let result = gateway.buy("MemeMint", 0.5, WALLET).await;
        assert!(result.success);
        assert!(result.simulated);
    }

    #[tokio::test]
    async fn test_sell_failure_reported() {
        let mut curve = MockCurveTradeApi::new();
        curve
            .expect_get_trade_transaction()
            .withf(|req| req.action == TradeAction::Sell && !req.denominated_in_sol)
            .returning(|_| Err(ExecutionError::ApiError("400: bad mint".into())));

        let gateway = TradeGateway::new(
            Arc::new(MockSwapApi::new()),
            Arc::new(curve),
            TradeGatewayConfig::default(),
        );
        let result = gateway.sell("MemeMint", 1_000.0, WALLET).await;
        assert!(!result.success);
        assert!(result.signature.is_none());
    }
}

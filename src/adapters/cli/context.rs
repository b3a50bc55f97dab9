//! Service wiring for CLI commands
//!
//! Builds the application services from `Config`, choosing live or simulated collaborators
//! from the execution mode.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::adapters::bridge::{HttpMintApi, LoggingMintApi, MintApiConfig, SimulatedTransfer};
use crate::adapters::jupiter::{JupiterClient, JupiterConfig};
use crate::adapters::pump_fun::{PumpFunClient, PumpFunConfig, PumpPortalClient, PumpPortalConfig};
use crate::adapters::solana::{parse_commitment, JsonRpcConfig, JsonRpcLedger, SolanaClient, WalletManager};
use crate::application::{
    ChainReader, CrossChainDistributor, PortfolioValuator, TokenMarketAggregator, TradeGateway,
};
use crate::config::Config;
use crate::domain::trade::ExecutionMode;
use crate::ports::ledger::TokenTransfer;
use crate::ports::mint::MintApi;

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AppContext {
    pub config: Config,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.config.execution.mode
    }

    pub fn chain_reader(&self) -> Result<Arc<ChainReader>> {
        let ledger = JsonRpcLedger::with_config(JsonRpcConfig {
            rpc_url: self.config.solana.get_rpc_url(),
            commitment: self.config.solana.commitment.clone(),
            timeout: RPC_TIMEOUT,
        })
        .context("Failed to create RPC client")?;
        Ok(Arc::new(ChainReader::new(Arc::new(ledger))))
    }

    pub fn market(&self) -> Result<Arc<TokenMarketAggregator>> {
        let market = &self.config.market;
        let client = PumpFunClient::with_config(PumpFunConfig {
            api_base_url: market.api_url.clone(),
            timeout: market.timeout(),
        })
        .context("Failed to create market API client")?;
        Ok(Arc::new(
            TokenMarketAggregator::new(Arc::new(client), market.curve_params())
                .with_nsfw(market.include_nsfw),
        ))
    }

    pub fn portfolio(&self) -> Result<PortfolioValuator> {
        Ok(PortfolioValuator::new(self.chain_reader()?, self.market()?))
    }

    /// Signing wallet from the configured keypair
    pub fn wallet(&self) -> Result<WalletManager> {
        let keypair_path = shellexpand::tilde(&self.config.solana.get_keypair_path()).to_string();
        load_wallet_with_context(&keypair_path)
    }

    fn solana_client(&self) -> Result<SolanaClient> {
        Ok(SolanaClient::new(
            self.config.solana.get_rpc_url(),
            parse_commitment(&self.config.solana.commitment),
            self.wallet()?,
        ))
    }

    pub fn gateway(&self) -> Result<TradeGateway> {
        let jupiter = &self.config.jupiter;
        let swap_api = JupiterClient::with_config(JupiterConfig {
            api_base_url: jupiter.api_url.clone(),
            price_api_url: jupiter.price_api_url.clone(),
            api_key: jupiter.get_api_key(),
            timeout: Duration::from_secs(jupiter.timeout_secs),
            max_retries: jupiter.max_retries,
        })
        .context("Failed to create Jupiter client")?;
        let curve_api = PumpPortalClient::with_config(PumpPortalConfig {
            trade_url: self.config.market.trade_url.clone(),
            timeout: self.config.market.timeout(),
        })
        .context("Failed to create trade API client")?;

        let gateway = TradeGateway::new(
            Arc::new(swap_api),
            Arc::new(curve_api),
            self.config.trade_gateway_config(),
        );

        match self.mode() {
            ExecutionMode::Live => Ok(gateway.with_submitter(Arc::new(self.solana_client()?))),
            ExecutionMode::Simulated => Ok(gateway),
        }
    }

    pub fn distributor(&self) -> Result<CrossChainDistributor> {
        let bridge = self
            .config
            .bridge
            .as_ref()
            .context("No [bridge] section in configuration")?;

        let (transfer, mint_api): (Arc<dyn TokenTransfer>, Arc<dyn MintApi>) = match self.mode() {
            ExecutionMode::Simulated => (Arc::new(SimulatedTransfer), Arc::new(LoggingMintApi)),
            ExecutionMode::Live => {
                let Some(url) = bridge.mint_api_url.clone() else {
                    bail!("Live mode requires bridge.mint_api_url");
                };
                let mint_api = HttpMintApi::with_config(MintApiConfig {
                    url,
                    timeout: Duration::from_secs(bridge.mint_timeout_secs),
                })
                .context("Failed to create mint API client")?;
                (Arc::new(self.solana_client()?), Arc::new(mint_api))
            }
        };

        Ok(CrossChainDistributor::new(
            self.chain_reader()?,
            transfer,
            mint_api,
            bridge.distributor_config(),
        ))
    }
}

/// Load wallet with helpful error messages
fn load_wallet_with_context(keypair_path: &str) -> Result<WalletManager> {
    if !Path::new(keypair_path).exists() {
        bail!(
            "Wallet file not found: {}\n\n\
             To create a new wallet, run:\n  \
             solana-keygen new --outfile {}\n\n\
             Or pass --wallet, or update 'keypair_path' in your config",
            keypair_path,
            keypair_path
        );
    }

    WalletManager::from_file(keypair_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load wallet from '{}': {}\n\n\
             Expected format: JSON array of bytes (e.g., [1,2,3,...])",
            keypair_path,
            e
        )
    })
}

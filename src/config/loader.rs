//! Configuration Loader
//!
//! Loads and validates configuration from a TOML file layered with `OOF__SECTION__KEY`
//! environment variables.

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::application::distributor::{CardConfig, DistributorConfig};
use crate::application::swap_gateway::TradeGatewayConfig;
use crate::domain::address::WalletAddress;
use crate::domain::bonding_curve::{CurveParams, LAMPORTS_PER_SOL, TOKEN_UNIT_SCALE};
use crate::domain::distribution::{BridgeRates, CardCategory, DistributionPolicy};
use crate::domain::trade::ExecutionMode;

/// Prefix of environment variables layered over the file
pub const ENV_PREFIX: &str = "OOF";

const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub solana: SolanaSection,
    #[serde(default)]
    pub market: MarketSection,
    #[serde(default)]
    pub jupiter: JupiterSection,
    /// Required only for `estimate` and `purchase`
    #[serde(default)]
    pub bridge: Option<BridgeSection>,
    #[serde(default)]
    pub execution: ExecutionSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Devnet,
}

impl Network {
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_RPC_URL,
            Network::Devnet => DEVNET_RPC_URL,
        }
    }
}

impl std::str::FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Network::Mainnet),
            "devnet" => Ok(Network::Devnet),
            other => Err(ConfigError::ValidationError(format!(
                "unknown network '{}', expected mainnet or devnet",
                other
            ))),
        }
    }
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaSection {
    #[serde(default)]
    pub network: Network,
    /// RPC endpoint; the network's public endpoint when unset
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Commitment level: "processed", "confirmed", "finalized"
    #[serde(default = "default_commitment")]
    pub commitment: String,
    /// Wallet keypair path (NEVER commit this file!)
    #[serde(default = "default_keypair_path")]
    pub keypair_path: String,
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

fn default_keypair_path() -> String {
    "~/.config/solana/id.json".to_string()
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            network: Network::default(),
            rpc_url: None,
            commitment: default_commitment(),
            keypair_path: default_keypair_path(),
        }
    }
}

impl SolanaSection {
    /// Get RPC URL with environment variable override
    /// Checks SOLANA_RPC_URL env var first, then the config value, then the network default
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.rpc_url.clone().filter(|url| !url.is_empty()))
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }

    /// Get keypair path with environment variable override
    /// Checks SOLANA_KEYPAIR_PATH env var first, falls back to config value
    pub fn get_keypair_path(&self) -> String {
        std::env::var("SOLANA_KEYPAIR_PATH").unwrap_or_else(|_| self.keypair_path.clone())
    }
}

/// Bonding-curve market and trade API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketSection {
    pub api_url: String,
    /// Trade API building unsigned buy/sell transactions
    pub trade_url: String,
    pub timeout_secs: u64,
    pub include_nsfw: bool,
    pub native_unit_scale: f64,
    pub token_unit_scale: f64,
    pub graduation_threshold_sol: f64,
    /// Slippage for bonding-curve trades in percent
    pub curve_slippage_pct: f64,
    pub priority_fee_sol: f64,
    pub pool: String,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            api_url: "https://frontend-api.pump.fun".to_string(),
            trade_url: "https://pumpportal.fun/api/trade-local".to_string(),
            timeout_secs: 15,
            include_nsfw: false,
            native_unit_scale: LAMPORTS_PER_SOL,
            token_unit_scale: TOKEN_UNIT_SCALE,
            graduation_threshold_sol: 85.0,
            curve_slippage_pct: 10.0,
            priority_fee_sol: 0.00005,
            pool: "pump".to_string(),
        }
    }
}

impl MarketSection {
    pub fn curve_params(&self) -> CurveParams {
        CurveParams {
            native_unit_scale: self.native_unit_scale,
            token_unit_scale: self.token_unit_scale,
            graduation_threshold_sol: self.graduation_threshold_sol,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Jupiter API configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JupiterSection {
    pub api_url: String,
    pub price_api_url: String,
    /// Optional API key for higher rate limits (get from jup.ag)
    pub api_key: Option<String>,
    /// Slippage tolerance in basis points (0.5% = 50 bps)
    pub slippage_bps: u16,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for JupiterSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.jup.ag/swap/v1".to_string(),
            price_api_url: "https://api.jup.ag/price/v2".to_string(),
            api_key: None,
            slippage_bps: 50,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl JupiterSection {
    /// Get API key with environment variable fallback
    /// Checks JUPITER_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("JUPITER_API_KEY").ok()
    }
}

/// Cross-chain bridge section
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeSection {
    pub custody_address: String,
    pub source_mint: String,
    #[serde(default = "default_source_decimals")]
    pub source_decimals: u8,
    /// USD per OOF
    pub exchange_rate_usd: Decimal,
    #[serde(default = "default_bridge_fee_pct")]
    pub bridge_fee_pct: Decimal,
    /// Destination tokens per USD
    pub tokens_per_usd: Decimal,
    /// Mint API endpoint; requests are only logged when unset
    #[serde(default)]
    pub mint_api_url: Option<String>,
    #[serde(default = "default_mint_timeout_secs")]
    pub mint_timeout_secs: u64,
    #[serde(default)]
    pub distribution_policy: DistributionPolicy,
    #[serde(default)]
    pub cards: Vec<CardConfig>,
}

fn default_source_decimals() -> u8 {
    6
}

fn default_bridge_fee_pct() -> Decimal {
    Decimal::from(3)
}

fn default_mint_timeout_secs() -> u64 {
    30
}

impl BridgeSection {
    pub fn rates(&self) -> BridgeRates {
        BridgeRates {
            exchange_rate_usd: self.exchange_rate_usd,
            bridge_fee_pct: self.bridge_fee_pct,
            tokens_per_usd: self.tokens_per_usd,
        }
    }

    pub fn distributor_config(&self) -> DistributorConfig {
        DistributorConfig {
            custody_address: self.custody_address.clone(),
            source_mint: self.source_mint.clone(),
            source_decimals: self.source_decimals,
            rates: self.rates(),
            policy: self.distribution_policy,
            cards: self.cards.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        WalletAddress::parse(&self.custody_address).map_err(|e| {
            ConfigError::ValidationError(format!("bridge.custody_address: {}", e))
        })?;
        WalletAddress::parse(&self.source_mint)
            .map_err(|e| ConfigError::ValidationError(format!("bridge.source_mint: {}", e)))?;

        if self.exchange_rate_usd <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "exchange_rate_usd must be > 0, got {}",
                self.exchange_rate_usd
            )));
        }

        if self.tokens_per_usd <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "tokens_per_usd must be > 0, got {}",
                self.tokens_per_usd
            )));
        }

        if self.bridge_fee_pct < Decimal::ZERO || self.bridge_fee_pct >= Decimal::ONE_HUNDRED {
            return Err(ConfigError::ValidationError(format!(
                "bridge_fee_pct must be in [0, 100), got {}",
                self.bridge_fee_pct
            )));
        }

        if let Some(url) = &self.mint_api_url {
            if url.is_empty() {
                return Err(ConfigError::ValidationError(
                    "mint_api_url cannot be empty".to_string(),
                ));
            }
        }

        let mut categories: Vec<CardCategory> = self.cards.iter().map(|c| c.category).collect();
        categories.sort();
        if categories != CardCategory::ALL {
            return Err(ConfigError::ValidationError(format!(
                "bridge.cards must configure each of {:?} exactly once",
                CardCategory::ALL
            )));
        }

        for card in &self.cards {
            if card.name.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "card name for {} cannot be empty",
                    card.category
                )));
            }
            if card.destination_token.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "destination_token for {} cannot be empty",
                    card.category
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionSection {
    /// `simulated` (default) or `live`
    #[serde(default)]
    pub mode: ExecutionMode,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::ParseError(e.to_string())
    }
}

impl From<::config::ConfigError> for ConfigError {
    fn from(e: ::config::ConfigError) -> Self {
        ConfigError::ParseError(e.to_string())
    }
}

/// Load configuration from a TOML file, layered with `OOF__*` environment variables
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    let config: Config = ::config::Config::builder()
        .add_source(::config::File::from(path).format(::config::FileFormat::Toml))
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}

impl Config {
    /// Parse and validate TOML text without environment layering
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn trade_gateway_config(&self) -> TradeGatewayConfig {
        TradeGatewayConfig {
            mode: self.execution.mode,
            default_slippage_bps: self.jupiter.slippage_bps,
            curve_slippage_pct: self.market.curve_slippage_pct,
            priority_fee_sol: self.market.priority_fee_sol,
            pool: self.market.pool.clone(),
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate market section
        if self.market.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "market.api_url cannot be empty".to_string(),
            ));
        }

        if self.market.trade_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "market.trade_url cannot be empty".to_string(),
            ));
        }

        if self.market.native_unit_scale <= 0.0 || self.market.token_unit_scale <= 0.0 {
            return Err(ConfigError::ValidationError(
                "unit scales must be > 0".to_string(),
            ));
        }

        if self.market.graduation_threshold_sol <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "graduation_threshold_sol must be > 0, got {}",
                self.market.graduation_threshold_sol
            )));
        }

        // Validate Jupiter
        if self.jupiter.api_url.is_empty() || self.jupiter.price_api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "jupiter urls cannot be empty".to_string(),
            ));
        }

        // Validate Solana
        if let Some(url) = &self.solana.rpc_url {
            if url.is_empty() {
                return Err(ConfigError::ValidationError(
                    "rpc_url cannot be empty".to_string(),
                ));
            }
        }

        if self.solana.keypair_path.is_empty() {
            return Err(ConfigError::ValidationError(
                "keypair_path cannot be empty".to_string(),
            ));
        }

        if let Some(bridge) = &self.bridge {
            bridge.validate()?;
        }

        Ok(())
    }
}

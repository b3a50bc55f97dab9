//! Configuration Module
//!
//! Loads and validates configuration from TOML files with environment overrides.

pub mod loader;

pub use loader::{
    load_config, BridgeSection, Config, ConfigError, ExecutionSection, JupiterSection,
    LoggingSection, MarketSection, Network, SolanaSection,
};

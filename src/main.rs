//! oof - Memecoin Aggregation and Cross-Chain Distribution CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use oof_aggregator::adapters::cli::{self, AppContext};
use oof_aggregator::config::{load_config, Config};

const DEFAULT_CONFIG_PATH: &str = "config/oof.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = cli::init();

    let mut config = load(app.config.as_deref())?;
    if let Some(network) = app.network {
        config.solana.network = network;
    }

    init_logging(app.verbose, app.debug, &config.logging.level)?;
    tracing::debug!(
        "Network {:?}, RPC {}, mode {:?}",
        config.solana.network,
        config.solana.get_rpc_url(),
        config.execution.mode
    );

    cli::execute(app, AppContext::new(config)).await
}

/// Explicit `--config` must exist; the default path is optional
fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_config(&default).context("Failed to load configuration")
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}

//! CLI Adapter
//!
//! Command-line interface for the oof aggregator.
//! Uses clap derive macros for argument parsing.

mod commands;
mod context;

pub use commands::{
    AddressCmd, CliApp, Command, CurveTradeCmd, EstimateCmd, HistoryCmd, MintCmd, OofCmd,
    PurchaseCmd, QuoteCmd, SearchCmd, SwapCmd, TradesCmd, TrendingCmd,
};
pub use context::AppContext;

use anyhow::Result;

/// Parse command-line arguments
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp, ctx: AppContext) -> Result<()> {
    commands::execute(app, ctx).await
}

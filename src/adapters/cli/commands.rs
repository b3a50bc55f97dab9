//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the oof aggregator.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use super::context::AppContext;
use crate::application::SwapConfig;
use crate::config::Network;
use crate::domain::address::WalletAddress;
use crate::domain::bonding_curve::LAMPORTS_PER_SOL;
use crate::domain::distribution::{CardDistribution, CrossChainPurchaseRequest, PurchaseOutcome};
use crate::domain::read_outcome::ReadOutcome;
use crate::domain::token::TokenView;
use crate::ports::market_data::CoinListQuery;

/// oof - memecoin market aggregation and cross-chain card distribution for Solana
#[derive(Parser, Debug)]
#[command(
    name = "oof",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Memecoin market aggregation and cross-chain card distribution for Solana",
    long_about = "oof reads wallets and bonding-curve markets, quotes and executes swaps, \
                  values portfolios and converts OOF into destination-chain cards."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured network (mainnet, devnet)
    #[arg(long, value_name = "NETWORK", global = true)]
    pub network: Option<Network>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Native balance of an address
    Balance(AddressCmd),

    /// Recent transactions of an address
    History(HistoryCmd),

    /// Trending bonding-curve tokens
    Trending(TrendingCmd),

    /// Search tokens by name or symbol
    Search(SearchCmd),

    /// Details of one token
    Token(MintCmd),

    /// Current king of the hill
    King,

    /// Trade tape of one token
    Trades(TradesCmd),

    /// Priced token holdings of a wallet
    Portfolio(AddressCmd),

    /// How much a wallet left on the table by selling early
    Oof(OofCmd),

    /// Get a quote for a token swap
    Quote(QuoteCmd),

    /// Execute a token swap
    Swap(SwapCmd),

    /// Buy a bonding-curve token with SOL
    Buy(CurveTradeCmd),

    /// Sell a bonding-curve token
    Sell(CurveTradeCmd),

    /// Preview the value of an OOF amount on the destination chain
    Estimate(EstimateCmd),

    /// Convert OOF into the three destination cards
    Purchase(PurchaseCmd),
}

#[derive(Parser, Debug)]
pub struct AddressCmd {
    /// Wallet or account address
    #[arg(value_name = "ADDRESS")]
    pub address: String,
}

#[derive(Parser, Debug)]
pub struct HistoryCmd {
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Maximum number of transactions
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

#[derive(Parser, Debug)]
pub struct TrendingCmd {
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Sort field (market_cap, created_timestamp, last_trade_timestamp)
    #[arg(long, default_value = "market_cap")]
    pub sort: String,

    #[arg(long, default_value = "DESC")]
    pub order: String,

    /// Include NSFW tokens
    #[arg(long)]
    pub nsfw: bool,
}

#[derive(Parser, Debug)]
pub struct SearchCmd {
    #[arg(value_name = "QUERY")]
    pub query: String,
}

#[derive(Parser, Debug)]
pub struct MintCmd {
    #[arg(value_name = "MINT")]
    pub mint: String,
}

#[derive(Parser, Debug)]
pub struct TradesCmd {
    #[arg(value_name = "MINT")]
    pub mint: String,

    #[arg(short, long, default_value = "50")]
    pub limit: usize,

    #[arg(long, default_value = "0")]
    pub offset: usize,
}

#[derive(Parser, Debug)]
pub struct OofCmd {
    #[arg(value_name = "WALLET")]
    pub wallet: String,

    /// Restrict the analysis to these mints (default: every held token)
    #[arg(short, long = "mint", value_name = "MINT")]
    pub mints: Vec<String>,
}

/// Get swap quote
#[derive(Parser, Debug)]
pub struct QuoteCmd {
    /// Input token mint
    #[arg(value_name = "INPUT")]
    pub input_mint: String,

    /// Output token mint
    #[arg(value_name = "OUTPUT")]
    pub output_mint: String,

    /// Amount to swap in base units of the input token
    #[arg(value_name = "AMOUNT")]
    pub amount: u64,

    /// Slippage tolerance in basis points (default: configured)
    #[arg(long, value_name = "BPS")]
    pub slippage: Option<u16>,
}

/// Execute swap
#[derive(Parser, Debug)]
pub struct SwapCmd {
    #[arg(value_name = "INPUT")]
    pub input_mint: String,

    #[arg(value_name = "OUTPUT")]
    pub output_mint: String,

    /// Amount to swap in base units of the input token
    #[arg(value_name = "AMOUNT")]
    pub amount: u64,

    /// Slippage tolerance in basis points (default: configured)
    #[arg(long, value_name = "BPS")]
    pub slippage: Option<u16>,

    /// Wallet to trade for (default: configured keypair)
    #[arg(long, value_name = "ADDRESS")]
    pub wallet: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CurveTradeCmd {
    #[arg(value_name = "MINT")]
    pub mint: String,

    /// SOL to spend when buying, whole tokens when selling
    #[arg(value_name = "AMOUNT")]
    pub amount: f64,

    /// Wallet to trade for (default: configured keypair)
    #[arg(long, value_name = "ADDRESS")]
    pub wallet: Option<String>,
}

#[derive(Parser, Debug)]
pub struct EstimateCmd {
    /// OOF amount
    #[arg(value_name = "AMOUNT")]
    pub amount: Decimal,
}

#[derive(Parser, Debug)]
pub struct PurchaseCmd {
    /// OOF amount
    #[arg(value_name = "AMOUNT")]
    pub amount: Decimal,

    /// Percent allocated to Paper Hands
    #[arg(long, default_value = "40")]
    pub paper_hands: Decimal,

    /// Percent allocated to Dust Collector
    #[arg(long, default_value = "35")]
    pub dust_collector: Decimal,

    /// Percent allocated to Gains Master
    #[arg(long, default_value = "25")]
    pub gains_master: Decimal,

    /// Source wallet (default: configured keypair)
    #[arg(long, value_name = "ADDRESS")]
    pub wallet: Option<String>,

    /// Execute instead of only printing the preview
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Execute the CLI command
pub async fn execute(app: CliApp, ctx: AppContext) -> Result<()> {
    let json = app.json;
    match app.command {
        Command::Balance(cmd) => balance_command(&ctx, cmd, json).await,
        Command::History(cmd) => history_command(&ctx, cmd, json).await,
        Command::Trending(cmd) => trending_command(&ctx, cmd, json).await,
        Command::Search(cmd) => search_command(&ctx, cmd, json).await,
        Command::Token(cmd) => token_command(&ctx, cmd, json).await,
        Command::King => king_command(&ctx, json).await,
        Command::Trades(cmd) => trades_command(&ctx, cmd, json).await,
        Command::Portfolio(cmd) => portfolio_command(&ctx, cmd, json).await,
        Command::Oof(cmd) => oof_command(&ctx, cmd, json).await,
        Command::Quote(cmd) => quote_command(&ctx, cmd, json).await,
        Command::Swap(cmd) => swap_command(&ctx, cmd, json).await,
        Command::Buy(cmd) => buy_command(&ctx, cmd, json).await,
        Command::Sell(cmd) => sell_command(&ctx, cmd, json).await,
        Command::Estimate(cmd) => estimate_command(&ctx, cmd, json),
        Command::Purchase(cmd) => purchase_command(&ctx, cmd, json).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

/// Note printed under degraded reads
fn degraded_note<T>(outcome: &ReadOutcome<T>) {
    if let Some(reason) = outcome.reason() {
        println!("  (lookup failed: {})", reason);
    }
}

fn print_tokens(tokens: &[TokenView]) {
    if tokens.is_empty() {
        println!("No tokens");
        return;
    }
    for view in tokens {
        println!(
            "{:<10} {:<28} price {:.10} SOL  mcap ${:.0}  liq {:.2} SOL  curve {:>5.1}%{}",
            view.token.symbol,
            view.token.name,
            view.market.price,
            view.market.market_cap,
            view.market.liquidity,
            view.market.bonding_curve_progress,
            if view.completed { "  graduated" } else { "" }
        );
        println!("           {}", view.token.mint);
    }
}

/// Wallet from `--wallet`, or the configured keypair's address
fn resolve_wallet(ctx: &AppContext, wallet: Option<String>) -> Result<String> {
    match wallet {
        Some(w) => Ok(WalletAddress::parse(&w)
            .with_context(|| format!("Invalid wallet address '{}'", w))?
            .to_string()),
        None => Ok(ctx.wallet()?.public_key()),
    }
}

async fn balance_command(ctx: &AppContext, cmd: AddressCmd, json: bool) -> Result<()> {
    let reader = ctx.chain_reader()?;
    let balance = reader.get_balance(&cmd.address).await;

    if json {
        return print_json(&balance);
    }
    let lamports = *balance.value();
    println!("Address: {}", cmd.address);
    println!(
        "Balance: {} lamports ({:.4} SOL)",
        lamports,
        lamports as f64 / LAMPORTS_PER_SOL
    );
    degraded_note(&balance);
    Ok(())
}

async fn history_command(ctx: &AppContext, cmd: HistoryCmd, json: bool) -> Result<()> {
    let reader = ctx.chain_reader()?;
    let history = reader.get_transaction_history(&cmd.address, cmd.limit).await;

    if json {
        return print_json(&history);
    }
    for tx in history.value() {
        let when = tx
            .block_time_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} slot {:>10} fee {:>7} {} {}",
            when,
            tx.slot,
            tx.fee,
            if tx.success { "ok    " } else { "FAILED" },
            tx.signature
        );
    }
    println!("{} transactions", history.value().len());
    degraded_note(&history);
    Ok(())
}

async fn trending_command(ctx: &AppContext, cmd: TrendingCmd, json: bool) -> Result<()> {
    let market = ctx.market()?;
    let mut query = CoinListQuery::default()
        .with_limit(cmd.limit)
        .with_offset(cmd.offset)
        .sorted_by(cmd.sort, cmd.order);
    query.include_nsfw = cmd.nsfw;

    let trending = market.list_trending(&query).await;
    if json {
        return print_json(&trending);
    }
    print_tokens(trending.value());
    degraded_note(&trending);
    Ok(())
}

async fn search_command(ctx: &AppContext, cmd: SearchCmd, json: bool) -> Result<()> {
    let results = ctx.market()?.search(&cmd.query).await;
    if json {
        return print_json(&results);
    }
    print_tokens(results.value());
    degraded_note(&results);
    Ok(())
}

fn print_token(token: &ReadOutcome<Option<TokenView>>, what: &str) {
    match token {
        ReadOutcome::Fresh { value: Some(view) } | ReadOutcome::Degraded { value: Some(view), .. } => {
            print_tokens(std::slice::from_ref(view));
            if !view.token.description.is_empty() {
                println!("           {}", view.token.description);
            }
            for link in [
                &view.token.socials.twitter,
                &view.token.socials.telegram,
                &view.token.socials.website,
            ]
            .into_iter()
            .flatten()
            {
                println!("           {}", link);
            }
        }
        ReadOutcome::Fresh { value: None } => println!("{} not found", what),
        ReadOutcome::Degraded { value: None, reason } => {
            println!("{} lookup failed: {}", what, reason)
        }
    }
}

async fn token_command(ctx: &AppContext, cmd: MintCmd, json: bool) -> Result<()> {
    let token = ctx.market()?.get_token_info(&cmd.mint).await;
    if json {
        return print_json(&token);
    }
    print_token(&token, &cmd.mint);
    Ok(())
}

async fn king_command(ctx: &AppContext, json: bool) -> Result<()> {
    let king = ctx.market()?.king_of_the_hill().await;
    if json {
        return print_json(&king);
    }
    print_token(&king, "King of the hill");
    Ok(())
}

async fn trades_command(ctx: &AppContext, cmd: TradesCmd, json: bool) -> Result<()> {
    let market = ctx.market()?;
    let trades = market
        .get_token_trades(&cmd.mint, cmd.limit, cmd.offset)
        .await;

    if json {
        return print_json(&trades);
    }
    let params = market.params();
    for trade in trades.value() {
        println!(
            "{} {:<4} {:>14.2} tokens for {:>10.4} SOL  by {}",
            trade.timestamp,
            if trade.is_buy { "BUY" } else { "SELL" },
            trade.token_amount as f64 / params.token_unit_scale,
            trade.sol_amount as f64 / params.native_unit_scale,
            trade.user
        );
    }
    degraded_note(&trades);
    Ok(())
}

async fn portfolio_command(ctx: &AppContext, cmd: AddressCmd, json: bool) -> Result<()> {
    let portfolio = ctx.portfolio()?.get_portfolio(&cmd.address).await;
    if json {
        return print_json(&portfolio);
    }

    let value = portfolio.value();
    for entry in &value.entries {
        println!(
            "{:<44} {:>18.6} @ ${:<12.8} = ${:.2}",
            entry.mint,
            entry.ui_amount(),
            entry.price_usd,
            entry.value_usd
        );
    }
    println!("Total: ${:.2}", value.total_value_usd());
    degraded_note(&portfolio);
    Ok(())
}

async fn oof_command(ctx: &AppContext, cmd: OofCmd, json: bool) -> Result<()> {
    let summary = ctx
        .portfolio()?
        .analyze_wallet(&cmd.wallet, &cmd.mints)
        .await;
    if json {
        return print_json(&summary);
    }

    let value = summary.value();
    for report in &value.reports {
        println!(
            "{:<44} {} sells, realized {:.4} SOL, missed {:.4} SOL, oof x{:.2}",
            report.mint, report.sells, report.realized_sol, report.missed_sol, report.oof_factor
        );
    }
    println!(
        "OOF factor: {:.2} (missed {:.4} SOL on {:.4} SOL realized)",
        value.oof_factor, value.missed_sol, value.realized_sol
    );
    degraded_note(&summary);
    Ok(())
}

async fn quote_command(ctx: &AppContext, cmd: QuoteCmd, json: bool) -> Result<()> {
    let gateway = ctx.gateway()?;
    let slippage = cmd.slippage.unwrap_or_else(|| gateway.default_slippage_bps());

    let quote = gateway
        .quote(&cmd.input_mint, &cmd.output_mint, cmd.amount, slippage)
        .await
        .context("Failed to get quote")?;

    if json {
        return print_json(&quote);
    }
    println!(
        "Quote: {} {} -> {} {}",
        quote.input_amount, quote.input_mint, quote.output_amount, quote.output_mint
    );
    println!("Minimum out: {} ({} bps slippage)", quote.min_output_amount, slippage);
    println!("Price impact: {}%", quote.price_impact_pct);
    println!("Route: {}", quote.route.join(" > "));
    Ok(())
}

fn print_trade(result: &crate::domain::trade::TradeResult, json: bool) -> Result<()> {
    if json {
        return print_json(result);
    }
    println!("{}", result);
    if !result.success {
        bail!("Trade failed");
    }
    Ok(())
}

async fn swap_command(ctx: &AppContext, cmd: SwapCmd, json: bool) -> Result<()> {
    let gateway = ctx.gateway()?;
    let wallet = resolve_wallet(ctx, cmd.wallet)?;
    let config = SwapConfig {
        input_mint: cmd.input_mint,
        output_mint: cmd.output_mint,
        amount: cmd.amount,
        slippage_bps: cmd.slippage.unwrap_or_else(|| gateway.default_slippage_bps()),
    };

    tracing::info!("Swapping {} {} -> {} ({:?})", config.amount, config.input_mint, config.output_mint, gateway.mode());
    let result = gateway.execute_swap(&config, &wallet).await;
    print_trade(&result, json)
}

async fn buy_command(ctx: &AppContext, cmd: CurveTradeCmd, json: bool) -> Result<()> {
    let gateway = ctx.gateway()?;
    let wallet = resolve_wallet(ctx, cmd.wallet)?;
    let result = gateway.buy(&cmd.mint, cmd.amount, &wallet).await;
    print_trade(&result, json)
}

async fn sell_command(ctx: &AppContext, cmd: CurveTradeCmd, json: bool) -> Result<()> {
    let gateway = ctx.gateway()?;
    let wallet = resolve_wallet(ctx, cmd.wallet)?;
    let result = gateway.sell(&cmd.mint, cmd.amount, &wallet).await;
    print_trade(&result, json)
}

fn estimate_command(ctx: &AppContext, cmd: EstimateCmd, json: bool) -> Result<()> {
    let distributor = ctx.distributor()?;
    let estimate = distributor
        .estimate_purchase(cmd.amount)
        .context("Failed to estimate purchase")?;

    if json {
        return print_json(&estimate);
    }
    println!("OOF:              {}", estimate.oof_amount);
    println!("USD value:        ${}", estimate.usd_value.round_dp(4));
    println!("Bridge fee:       ${}", estimate.bridge_fee.round_dp(4));
    println!("Estimated tokens: {}", estimate.estimated_tokens.round_dp(4));
    Ok(())
}

async fn purchase_command(ctx: &AppContext, cmd: PurchaseCmd, json: bool) -> Result<()> {
    let distributor = ctx.distributor()?;
    let wallet = resolve_wallet(ctx, cmd.wallet)?;
    let request = CrossChainPurchaseRequest {
        wallet: WalletAddress::parse(&wallet)?,
        oof_amount: cmd.amount,
        distribution: CardDistribution::new(cmd.paper_hands, cmd.dust_collector, cmd.gains_master),
    };

    let preview = match distributor.preview(&request) {
        Ok(preview) => preview,
        Err(reason) => bail!("Invalid distribution: {}", reason),
    };

    if !cmd.yes {
        if json {
            return print_json(&preview);
        }
        println!("Purchase preview for {} OOF from {}", cmd.amount, wallet);
        for allocation in &preview.allocations {
            println!(
                "  {:<15} {:>6}%  {} OOF",
                allocation.category.label(),
                allocation.percentage,
                allocation.oof_amount
            );
        }
        println!(
            "  Estimated tokens after {}% fee: {}",
            distributor.config().rates.bridge_fee_pct,
            preview.estimate.estimated_tokens.round_dp(4)
        );
        println!("\nMode: {:?}. Re-run with --yes to execute.", ctx.mode());
        return Ok(());
    }

    let outcome = distributor.purchase(&request).await;
    if json {
        return print_json(&outcome);
    }

    match &outcome {
        PurchaseOutcome::Rejected { reason } => bail!("Purchase rejected: {}", reason),
        PurchaseOutcome::Failed { reason } => bail!("Purchase failed: {}", reason),
        PurchaseOutcome::Completed {
            transfer_signature,
            purchases,
            failures,
            simulated,
        } => {
            if *simulated {
                println!("SIMULATED - nothing was transferred or minted");
            }
            println!("Custody transfer: {}", transfer_signature);
            for p in purchases {
                println!(
                    "  {:<15} {} OOF -> {} tokens (bridge tx {}, ref {})",
                    p.category.label(),
                    p.oof_amount,
                    p.estimated_tokens.round_dp(4),
                    p.bridge_transaction_id,
                    p.mint_reference
                );
            }
            for f in failures {
                println!(
                    "  {:<15} {} OOF FAILED (bridge tx {}): {}",
                    f.category.label(),
                    f.oof_amount,
                    f.bridge_transaction_id,
                    f.reason
                );
            }
            if !failures.is_empty() {
                tracing::warn!(
                    "{} categories need reconciliation: {:?}",
                    failures.len(),
                    outcome.failed_categories()
                );
            }
        }
    }
    Ok(())
}

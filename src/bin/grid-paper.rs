// Grid paper trader CLI
// Single entry point: workspace setup, supervised trading, journal inspection

use std::io::{self, Write};
use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use grid_paper_trader::{
    BinanceRestClient, Config, Journal, Supervisor, TradingError, TradingResult,
};

#[derive(Parser)]
#[command(name = "grid-paper")]
#[command(version)]
#[command(about = "Grid trading simulator with paper balances", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (.json, or .toml)
    #[arg(short, long, global = true, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Start paper trading until interrupted or capital is lost
    Run {
        /// Amount to add to the carried balance; prompts when omitted
        #[arg(long)]
        capital: Option<f64>,
    },

    /// Show the session record and operation count
    Status,

    /// Regenerate the balance chart from the operation log
    Chart,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Setup logging first so config errors are visible
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = execute(cli).await {
        error!("❌ {}", e.user_message());
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> TradingResult<()> {
    match cli.command {
        // Init doesn't require config (it creates it)
        Commands::Init { force } => init_config(&cli.config, force),
        Commands::Run { capital } => {
            let config = load_config(&cli.config)?;
            run_trading(&config, capital).await
        }
        Commands::Status => {
            let config = load_config(&cli.config)?;
            show_status(&config)
        }
        Commands::Chart => {
            let config = load_config(&cli.config)?;
            render_chart(&config)
        }
    }
}

fn load_config(path: &str) -> TradingResult<Config> {
    info!("📁 Config: {}", path);
    Ok(Config::from_file(path)?)
}

fn init_config(path: &str, force: bool) -> TradingResult<()> {
    if Path::new(path).exists() && !force {
        warn!("⚠️  {} already exists, skipping (use --force to overwrite)", path);
        return Ok(());
    }

    Config::default().to_file(path)?;
    info!("📝 Created {}", path);
    info!("💡 Next steps:");
    info!("   1. Set symbol, grid_levels, trade_size and fee_rate");
    info!("   2. Run: grid-paper run --capital 1000");
    Ok(())
}

async fn run_trading(config: &Config, capital: Option<f64>) -> TradingResult<()> {
    let journal = Journal::from_config(&config.files, &config.trading);
    let previous = journal.sessions.load()?;

    let deposit = match capital {
        Some(amount) => validate_deposit(amount)?,
        None => prompt_deposit(previous.balance, &config.trading.quote_asset)?,
    };

    let mut client = BinanceRestClient::new(&config.exchange, &config.trading)?;
    info!(
        "🧪 Paper trading {} against {}",
        config.trading.symbol, config.exchange.base_url
    );

    let mut supervisor = Supervisor::new(config, &journal);
    let state = supervisor.run(&mut client, deposit, shutdown_signal()).await?;

    info!(
        "📊 Sessions: {} | Wins: {} | Losses: {} | Carried balance: {:.2} {}",
        state.sessions, state.wins, state.losses, state.balance, config.trading.quote_asset
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("⚠️  Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Received shutdown signal");
}

fn prompt_deposit(previous_balance: f64, quote_asset: &str) -> TradingResult<f64> {
    print!(
        "Amount to invest ({}) [previous balance {:.2}]: ",
        quote_asset, previous_balance
    );
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    parse_deposit(&line)
}

fn parse_deposit(input: &str) -> TradingResult<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let amount = trimmed.parse::<f64>().map_err(|e| {
        TradingError::InvalidParameter("capital".to_string(), format!("'{}': {}", trimmed, e))
    })?;
    validate_deposit(amount)
}

fn validate_deposit(amount: f64) -> TradingResult<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(TradingError::InvalidParameter(
            "capital".to_string(),
            "must be a non-negative amount".to_string(),
        ));
    }
    Ok(amount)
}

fn show_status(config: &Config) -> TradingResult<()> {
    let journal = Journal::from_config(&config.files, &config.trading);
    let state = journal.sessions.load()?;
    let operations = journal.operations.read_all()?;

    let win_rate = if state.sessions > 0 {
        state.wins as f64 / state.sessions as f64 * 100.0
    } else {
        0.0
    };

    info!("📊 Session Record");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("💰 Carried balance: {:.2} {}", state.balance, config.trading.quote_asset);
    info!("🔢 Sessions: {} (wins {}, losses {}, {:.1}% won)", state.sessions, state.wins, state.losses, win_rate);
    info!("📒 Logged operations: {}", operations.len());
    if let Some(last) = operations.last() {
        info!(
            "🕒 Last: {} {} @ {:.4} | profit {:.2}",
            last.timestamp, last.side, last.price, last.profit
        );
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    Ok(())
}

fn render_chart(config: &Config) -> TradingResult<()> {
    let journal = Journal::from_config(&config.files, &config.trading);
    if journal.chart.render_from_log(&journal.operations)? {
        info!("📈 Chart written to {}", journal.chart.path().display());
    } else {
        warn!("⚠️  No operations logged yet, nothing to chart");
    }
    Ok(())
}

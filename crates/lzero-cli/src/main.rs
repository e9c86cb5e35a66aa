//! # licensezero CLI entry point
//!
//! Parses arguments, sets up logging and dispatches to subcommand
//! handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lzero_broker::BrokerConfig;
use lzero_cli::buy::{run_buy, BuyArgs};
use lzero_cli::quote::{run_quote, QuoteArgs};
use lzero_cli::renew::{run_renew, RenewArgs};
use lzero_cli::verify::{run_verify, VerifyArgs};
use lzero_cli::Session;
use lzero_inventory::StoreConfig;

/// License Zero: find, price, buy and verify licenses for your
/// dependencies.
#[derive(Parser, Debug)]
#[command(name = "licensezero", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Identity store directory. Defaults to $LICENSEZERO_CONFIG, then
    /// ~/.config/licensezero.
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Project root to scan. Defaults to the current directory.
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List License Zero dependencies and the cost of licensing them.
    Quote(QuoteArgs),

    /// Order licenses for every unlicensed dependency.
    Buy(BuyArgs),

    /// Verify every saved receipt.
    Verify(VerifyArgs),

    /// Fetch newer receipts for recurring licenses.
    Renew(RenewArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::new(level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let root = match cli.cwd {
        Some(root) => root,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let store = StoreConfig::resolve(cli.config_dir)?;
    let broker = BrokerConfig::from_env()?;
    tracing::debug!(root = %root.display(), store = %store.dir.display(), "starting");

    let session = Session::open(root, store, &broker)?;
    match cli.command {
        Commands::Quote(args) => run_quote(&args, &session).await,
        Commands::Buy(args) => run_buy(&args, &session).await,
        Commands::Verify(args) => run_verify(&args, &session).await,
        Commands::Renew(args) => run_renew(&args, &session).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

//! SwapGate command-line tool
//!
//! Usage:
//!   swapgate quote --reserve-in 100 --reserve-out 200000 --amount-in 1
//!   swapgate lp-mint --amount-a 100 --amount-b 200000
//!   swapgate --config config/swapgate.toml --env devnet check-config

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use swapgate_amm::PricingEngine;
use swapgate_config::GateConfig;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config/swapgate.toml";

#[derive(Parser, Debug)]
#[command(name = "swapgate")]
#[command(about = "Swap admission and pricing tools")]
#[command(version)]
struct Args {
    /// Path to configuration file (defaults to config/swapgate.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Environment override file under config/environments/
    #[arg(short, long, global = true)]
    env: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Quote a constant-product swap
    Quote {
        #[arg(long)]
        reserve_in: Decimal,
        #[arg(long)]
        reserve_out: Decimal,
        #[arg(long)]
        amount_in: Decimal,
        /// Pool fee in basis points
        #[arg(long, default_value_t = swapgate_config::defaults::pricing::FEE_BPS)]
        fee_bps: u32,
    },

    /// Estimate LP tokens minted for a deposit
    LpMint {
        #[arg(long)]
        amount_a: Decimal,
        #[arg(long)]
        amount_b: Decimal,
        #[arg(long, default_value_t = Decimal::ZERO)]
        reserve_a: Decimal,
        #[arg(long, default_value_t = Decimal::ZERO)]
        reserve_b: Decimal,
        #[arg(long, default_value_t = Decimal::ZERO)]
        total_lp_supply: Decimal,
    },

    /// Load, validate and print the effective configuration
    CheckConfig,
}

#[derive(Serialize)]
struct LpMintEstimate {
    lp_tokens: Decimal,
    bootstrap: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    init_logging(&args, &config)?;
    debug!(?args, "Parsed arguments");

    let engine = PricingEngine::new(config.pricing);

    match args.command {
        Command::Quote {
            reserve_in,
            reserve_out,
            amount_in,
            fee_bps,
        } => {
            let quote = engine
                .quote(reserve_in, reserve_out, amount_in, fee_bps)
                .context("Quote failed")?;
            print_json(&quote)?;
        }
        Command::LpMint {
            amount_a,
            amount_b,
            reserve_a,
            reserve_b,
            total_lp_supply,
        } => {
            let lp_tokens = engine
                .estimate_lp_mint(amount_a, amount_b, reserve_a, reserve_b, total_lp_supply)
                .context("LP mint estimate failed")?;
            print_json(&LpMintEstimate {
                lp_tokens,
                bootstrap: total_lp_supply <= Decimal::ZERO,
            })?;
        }
        Command::CheckConfig => {
            info!("Configuration is valid");
            print_json(&config)?;
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<GateConfig> {
    match &args.config {
        Some(path) => GateConfig::load(Some(path.as_path()), args.env.as_deref())
            .with_context(|| format!("Failed to load {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            GateConfig::load(None, args.env.as_deref())
        }
        None => Ok(GateConfig::default()),
    }
}

fn init_logging(args: &Args, config: &GateConfig) -> Result<()> {
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .context("Invalid log level")?;

    // Logs go to stderr so stdout stays clean JSON
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if args.json_logs || config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

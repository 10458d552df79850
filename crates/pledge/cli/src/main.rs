//! Pledge CLI - price pledges and replay checkout sessions from the terminal
//!
//! Checkouts are described in TOML files naming a project, a reward, its
//! add-ons, a shipping destination and a bonus. The CLI can:
//! - Quote the total for a checkout file
//! - Simulate a live checkout session step by step
//! - Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod checkout_file;
mod commands;
mod config;
mod error;
mod output;

use commands::{quote, simulate};
use config::PledgeConfig;
use error::CliResult;
use output::OutputFormat;

/// Pledge CLI application
#[derive(Parser)]
#[command(name = "pledge")]
#[command(about = "Pledge total calculator and checkout simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PLEDGE_CONFIG")]
    config: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Price a checkout file
    Quote {
        /// Checkout file
        file: PathBuf,
    },

    /// Replay the steps of a checkout file through a live session
    #[command(alias = "sim")]
    Simulate {
        /// Checkout file
        file: PathBuf,
    },

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let config = PledgeConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    match cli.command {
        Commands::Quote { file } => quote::execute(&file, &config, cli.output),
        Commands::Simulate { file } => simulate::execute(&file, &config, cli.output).await,
        Commands::Config => match cli.output {
            OutputFormat::Json => output::print_json(&config),
            OutputFormat::Table => {
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
        },
    }
}

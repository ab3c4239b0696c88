//! nidam - N.I.D.A.M pay-per-time AI terminal

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nidam_core::{
    AppConfig, CreditStore, FileStorage, PaymentGate, PollinationsChat, PollinationsImage,
    detect_wallet,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nidam",
    version,
    about = "N.I.D.A.M - pay-per-time AI terminal",
    long_about = "A paywalled AI chat terminal. Access is sold in timed blocks paid over\n\
                  Bitcoin Lightning; while a session runs, chat freely or prefix a prompt\n\
                  with /image to generate an image instead.\n\
                  \n\
                  Examples:\n\
                    nidam                            # Run the terminal (default)\n\
                    nidam packages                   # List purchasable time packages\n\
                    nidam balance                    # Show the local credit balance\n\
                    nidam identity                   # Show this install's credit identity\n\
                    nidam buy 573                    # Buy 573 sats of credits over Lightning\n\
                  \n\
                  Environment Variables:\n\
                    NIDAM_DATA_DIR                   # Override data directory\n\
                    NIDAM_LNBITS_URL                 # LNbits instance URL\n\
                    NIDAM_LNBITS_KEY                 # LNbits API key"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Path to data directory (default: platform data dir + /nidam)
    #[arg(long, env = "NIDAM_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the terminal interface (default)
    Tui,
    /// List purchasable time packages
    Packages {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the local credit balance
    Balance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show this install's credit identity
    Identity,
    /// Adopt a credit identity from an invoice memo
    Adopt {
        /// Memo text (must start with NIDAM-)
        memo: String,
    },
    /// Buy credits over Lightning (requires a configured wallet)
    Buy {
        /// Amount in satoshis
        amount_sats: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .or_else(|| dirs::data_dir().map(|d| d.join("nidam")))
        .context("Could not determine data directory")?;

    let mode = cli.mode.unwrap_or(Mode::Tui);
    init_logging(&mode, &data_dir)?;

    tracing::info!(data_dir = %data_dir.display(), "Starting nidam");

    let config = AppConfig::load(&data_dir).with_env_overrides();
    let storage = Arc::new(FileStorage::open(&data_dir));
    let wallet = detect_wallet(&config.wallet);
    let gate = Arc::new(PaymentGate::new(CreditStore::new(storage), wallet));

    match mode {
        Mode::Tui => {
            let chat = Arc::new(PollinationsChat::new(config.chat.clone()));
            let image = Arc::new(PollinationsImage::new(config.image.clone()));
            nidam_tui::run(gate, chat, image, config.chat).await?;
        }
        Mode::Packages { json } => {
            println!("{}", cli::format_packages(json)?);
        }
        Mode::Balance { json } => {
            println!("{}", cli::format_balance(&gate, json)?);
        }
        Mode::Identity => {
            println!("{}", gate.credit_identity());
        }
        Mode::Adopt { memo } => {
            gate.adopt_identity(&memo)?;
            println!("Adopted identity {}", gate.credit_identity());
        }
        Mode::Buy { amount_sats } => {
            cli::run_buy(&gate, amount_sats).await?;
        }
    }

    Ok(())
}

/// CLI modes log to stderr; the TUI logs to a file so the alternate
/// screen stays clean.
fn init_logging(mode: &Mode, data_dir: &std::path::Path) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("nidam=info".parse()?);

    match mode {
        Mode::Tui => {
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("Failed to create {}", data_dir.display()))?;
            let log_file = std::fs::File::create(data_dir.join("nidam.log"))
                .context("Failed to open log file")?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(log_file)
                .with_ansi(false)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

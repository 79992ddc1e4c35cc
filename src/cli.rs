use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::constants::{DEFAULT_DIVIDEND_LOOKBACK_DAYS, DEFAULT_LOOKBACK_DAYS};

#[derive(Parser)]
#[command(name = "portsignal")]
#[command(about = "Portfolio signal CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the trading signal for one security
    Signal {
        /// Bare security code (venue is resolved automatically)
        code: String,

        /// Lookback window in trading days
        #[arg(short, long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
        lookback: u32,
    },
    /// Scan a watchlist for momentum breakout candidates
    Scan {
        /// Path to the watchlist JSON file
        #[arg(short, long, default_value = "watchlist.json")]
        watchlist: PathBuf,

        /// Scan only one named group
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Value the portfolio at latest prices
    Value {
        /// Path to the holdings CSV file
        #[arg(long, default_value = "holdings.csv")]
        holdings: PathBuf,
    },
    /// Detect upcoming ex-dividend dates across holdings
    Dividends {
        /// Path to the holdings CSV file
        #[arg(long, default_value = "holdings.csv")]
        holdings: PathBuf,

        /// Alert window: how many days back an ex-date still counts
        #[arg(short, long, default_value_t = DEFAULT_DIVIDEND_LOOKBACK_DAYS)]
        lookback: i64,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Signal { code, lookback } => {
            commands::signal::run(code, lookback);
        }
        Commands::Scan { watchlist, group } => {
            commands::scan::run(watchlist, group);
        }
        Commands::Value { holdings } => {
            commands::value::run(holdings);
        }
        Commands::Dividends { holdings, lookback } => {
            commands::dividends::run(holdings, lookback);
        }
    }
}

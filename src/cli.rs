use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chrono::NaiveDate;

/// Historical options aggregates collector — pull bars from Polygon.io into
/// SQLite and serve them over a small HTTP API.
#[derive(Parser)]
#[command(name = "aggs-ingest", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "8000")]
        port: u16,

        /// Directory holding the SQLite database
        #[arg(long, default_value = "~/.aggs-ingest")]
        data_dir: PathBuf,
    },

    /// Fetch aggregates for one symbol and date range, then exit
    Fetch {
        /// Ticker symbol (e.g. AAPL, or an O:-prefixed option ticker)
        symbol: String,

        /// Aggregation window multiplier
        #[arg(long, default_value = "1")]
        multiplier: u32,

        /// Bar granularity: minute, hour, day, week, month
        #[arg(long, default_value = "day")]
        timespan: String,

        /// Range start (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: NaiveDate,

        /// Range end (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: NaiveDate,

        /// Directory holding the SQLite database
        #[arg(long, default_value = "~/.aggs-ingest")]
        data_dir: PathBuf,
    },
}

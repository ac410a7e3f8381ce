use anyhow::Context;
use clap::Parser;

use aggs_ingest::cli::{Cli, Command};
use aggs_ingest::{api, ingest};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            data_dir,
        } => {
            let rt = tokio::runtime::Runtime::new().context("creating async runtime")?;
            rt.block_on(api::serve(&host, port, &data_dir))
        }
        Command::Fetch {
            symbol,
            multiplier,
            timespan,
            from,
            to,
            data_dir,
        } => ingest::run(
            &ingest::CollectRequest {
                symbol,
                multiplier,
                timespan,
                from_date: from,
                to_date: to,
            },
            &data_dir,
        ),
    }
}

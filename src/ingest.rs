use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use thiserror::Error;

use crate::polygon::{AggBar, Polygon};
use crate::store::{self, OptionBar, Store};

/// Everything needed for one ingestion run; nothing is retained afterward.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectRequest {
    pub symbol: String,
    pub multiplier: u32,
    /// Bar granularity: minute, hour, day, week, month.
    pub timespan: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// The cause is folded into the message; no separate `source` so chain-aware
/// printers report it once.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("provider fetch failed: {0:#}")]
    Provider(anyhow::Error),
    #[error("storage write failed: {0:#}")]
    Storage(anyhow::Error),
}

/// Fetch every bar the provider has for the request window and persist the
/// batch in one transaction. Duplicate (symbol, timestamp) pairs are skipped;
/// any failure aborts the whole batch after logging.
pub async fn collect_and_store(
    polygon: &Polygon,
    store: &Store,
    req: &CollectRequest,
) -> Result<(), IngestError> {
    let result = run_once(polygon, store, req).await;
    match &result {
        Ok((stored, skipped)) => println!(
            "[ingest] {} {}..{}: {} bars stored, {} duplicates skipped",
            req.symbol, req.from_date, req.to_date, stored, skipped
        ),
        Err(e) => eprintln!(
            "[ingest] {} {}..{}: {}",
            req.symbol, req.from_date, req.to_date, e
        ),
    }
    result.map(|_| ())
}

async fn run_once(
    polygon: &Polygon,
    store: &Store,
    req: &CollectRequest,
) -> Result<(usize, usize), IngestError> {
    let bars = polygon
        .fetch_aggs(
            &req.symbol,
            req.multiplier,
            &req.timespan,
            req.from_date,
            req.to_date,
        )
        .await
        .map_err(IngestError::Provider)?;

    let rows = bars
        .iter()
        .map(|b| bar_to_row(&req.symbol, b))
        .collect::<Result<Vec<_>>>()
        .map_err(IngestError::Provider)?;

    let stored = store
        .insert_bars(&rows)
        .await
        .map_err(IngestError::Storage)?;

    Ok((stored, rows.len() - stored))
}

fn bar_to_row(symbol: &str, bar: &AggBar) -> Result<OptionBar> {
    let timestamp = DateTime::from_timestamp_millis(bar.timestamp_ms)
        .with_context(|| format!("bar timestamp {} out of range", bar.timestamp_ms))?
        .naive_utc();

    Ok(OptionBar {
        symbol: symbol.to_string(),
        timestamp,
        volume: bar.volume as i64,
        vwap: bar.vwap,
        open: bar.open,
        close: bar.close,
        high: bar.high,
        low: bar.low,
        transactions: bar.transactions,
    })
}

/// Run the `fetch` subcommand: one-shot ingestion against the local store.
pub fn run(req: &CollectRequest, data_dir: &Path) -> Result<()> {
    let api_key = std::env::var("POLYGON_API_KEY").context("POLYGON_API_KEY not set")?;

    let data_dir = store::resolve_data_dir(data_dir);
    let db_path = data_dir.join("aggs-ingest.db");
    let store = Store::open(&db_path)
        .with_context(|| format!("opening database at {}", db_path.display()))?;

    let rt = tokio::runtime::Runtime::new().context("creating async runtime")?;
    rt.block_on(async {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("aggs-ingest/0.1")
            .build()
            .context("creating HTTP client")?;
        let polygon = Polygon::new(http, api_key);

        collect_and_store(&polygon, &store, req).await?;
        Ok(())
    })
}

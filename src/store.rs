use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// One persisted aggregate bar. Identity is (symbol, timestamp); a second
/// insert for the same pair is silently ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionBar {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub volume: i64,
    pub vwap: f64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub transactions: i64,
}

/// SQLite-backed store for aggregate bars. Cloning shares the connection.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path.parent().unwrap_or(path))
            .context("creating db directory")?;

        let conn = Connection::open(path)
            .with_context(|| format!("opening sqlite at {}", path.display()))?;

        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        migrate(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory sqlite")?;
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert bars in a single transaction, skipping any (symbol, timestamp)
    /// pair that already exists. All-or-nothing: an error on any row rolls
    /// back the whole batch. Returns the number of rows actually written.
    pub async fn insert_bars(&self, bars: &[OptionBar]) -> Result<usize> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().context("starting transaction")?;

        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO option_data
                 (symbol, timestamp, volume, vwap, open, close, high, low, transactions)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for bar in bars {
                inserted += stmt.execute(rusqlite::params![
                    bar.symbol,
                    bar.timestamp,
                    bar.volume,
                    bar.vwap,
                    bar.open,
                    bar.close,
                    bar.high,
                    bar.low,
                    bar.transactions,
                ])?;
            }
        }

        tx.commit().context("committing batch")?;
        Ok(inserted)
    }

    /// All bars for `symbol` with timestamp on any day in
    /// [start_date, end_date] (both ends inclusive), ordered by timestamp.
    pub async fn query_range(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OptionBar>> {
        let start = start_date.and_hms_opt(0, 0, 0).unwrap();
        // First instant after the end date, so the whole end day is included.
        let end = end_date
            .succ_opt()
            .context("end_date out of calendar range")?
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT symbol, timestamp, volume, vwap, open, close, high, low, transactions
             FROM option_data
             WHERE symbol = ?1 AND timestamp >= ?2 AND timestamp < ?3
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt
            .query_map(rusqlite::params![symbol, start, end], |row| {
                Ok(OptionBar {
                    symbol: row.get(0)?,
                    timestamp: row.get(1)?,
                    volume: row.get(2)?,
                    vwap: row.get(3)?,
                    open: row.get(4)?,
                    close: row.get(5)?,
                    high: row.get(6)?,
                    low: row.get(7)?,
                    transactions: row.get(8)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("reading option_data rows")?;

        Ok(rows)
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS option_data (
            symbol        TEXT NOT NULL,
            timestamp     TEXT NOT NULL,
            volume        INTEGER NOT NULL,
            vwap          REAL NOT NULL,
            open          REAL NOT NULL,
            close         REAL NOT NULL,
            high          REAL NOT NULL,
            low           REAL NOT NULL,
            transactions  INTEGER NOT NULL,
            PRIMARY KEY (symbol, timestamp)
        );
        ",
    )?;
    Ok(())
}

/// Expand a leading `~` in a data-dir path to the user's home directory.
pub fn resolve_data_dir(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(path.strip_prefix("~").unwrap_or(path))
    } else {
        path.to_path_buf()
    }
}

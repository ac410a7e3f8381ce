use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

const API_URL: &str = "https://api.polygon.io";
const PAGE_LIMIT: u32 = 50_000;
const RATE_LIMIT_MS: u64 = 200;

// ── API response types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AggBar {
    /// Window start, epoch milliseconds (UTC).
    #[serde(rename = "t")]
    pub timestamp_ms: i64,
    #[serde(rename = "v", default)]
    pub volume: f64,
    /// Volume-weighted average price. Absent for some tickers.
    #[serde(rename = "vw", default)]
    pub vwap: f64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "n", default)]
    pub transactions: i64,
}

#[derive(Debug, Deserialize)]
struct AggsResponse {
    #[serde(default)]
    results: Vec<AggBar>,
    /// Present when more pages remain; carries the cursor but not the key.
    next_url: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Polygon {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Polygon {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self::with_base_url(http, API_URL.to_string(), api_key)
    }

    /// Point the client at a non-default host (stub servers, proxies).
    pub fn with_base_url(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// Fetch all aggregate bars for one symbol over an inclusive date range,
    /// following `next_url` pagination until the provider reports no more
    /// pages.
    pub async fn fetch_aggs(
        &self,
        symbol: &str,
        multiplier: u32,
        timespan: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AggBar>> {
        let mut url = format!(
            "{base}/v2/aggs/ticker/{symbol}/range/{multiplier}/{timespan}/{from}/{to}\
             ?adjusted=true&sort=asc&limit={PAGE_LIMIT}&apiKey={key}",
            base = self.base_url,
            key = self.api_key,
        );

        let mut all_bars: Vec<AggBar> = Vec::new();
        loop {
            let resp = self
                .http
                .get(&url)
                .send()
                .await
                .with_context(|| format!("requesting aggregates for {symbol}"))?
                .error_for_status()
                .with_context(|| format!("aggregates request for {symbol} rejected"))?
                .json::<AggsResponse>()
                .await
                .with_context(|| format!("decoding aggregates response for {symbol}"))?;

            all_bars.extend(resp.results);

            match resp.next_url {
                Some(next) => {
                    url = with_api_key(&next, &self.api_key);
                    tokio::time::sleep(std::time::Duration::from_millis(RATE_LIMIT_MS)).await;
                }
                None => break,
            }
        }

        Ok(all_bars)
    }
}

/// `next_url` cursors come back without credentials; re-append the key.
fn with_api_key(url: &str, api_key: &str) -> String {
    if url.contains('?') {
        format!("{url}&apiKey={api_key}")
    } else {
        format!("{url}?apiKey={api_key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_aggs_envelope() {
        let body = r#"{
            "ticker": "AAPL",
            "queryCount": 2,
            "resultsCount": 2,
            "adjusted": true,
            "status": "OK",
            "request_id": "abc123",
            "results": [
                {"v": 112117471.0, "vw": 125.725, "o": 130.28, "c": 125.07,
                 "h": 130.9, "l": 124.17, "t": 1672722000000, "n": 1021065},
                {"v": 89113633.0, "o": 126.89, "c": 126.36,
                 "h": 128.66, "l": 125.08, "t": 1672808400000}
            ],
            "next_url": "https://api.polygon.io/v2/aggs/ticker/AAPL/range/1/day/2023-01-01/2023-01-05?cursor=abc"
        }"#;

        let resp: AggsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].timestamp_ms, 1672722000000);
        assert_eq!(resp.results[0].transactions, 1021065);
        // Missing vw/n default to zero.
        assert_eq!(resp.results[1].vwap, 0.0);
        assert_eq!(resp.results[1].transactions, 0);
        assert!(resp.next_url.is_some());
    }

    #[test]
    fn decodes_empty_results() {
        let body = r#"{"ticker": "AAPL", "queryCount": 0, "resultsCount": 0, "status": "OK"}"#;
        let resp: AggsResponse = serde_json::from_str(body).unwrap();
        assert!(resp.results.is_empty());
        assert!(resp.next_url.is_none());
    }

    #[test]
    fn next_url_gets_key_reappended() {
        assert_eq!(
            with_api_key("https://api.polygon.io/v2/aggs?cursor=abc", "k"),
            "https://api.polygon.io/v2/aggs?cursor=abc&apiKey=k"
        );
        assert_eq!(
            with_api_key("https://api.polygon.io/v2/aggs", "k"),
            "https://api.polygon.io/v2/aggs?apiKey=k"
        );
    }

    #[test]
    fn default_client_targets_the_live_api() {
        let p = Polygon::new(reqwest::Client::new(), "k".to_string());
        assert_eq!(p.base_url, API_URL);
    }
}

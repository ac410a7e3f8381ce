pub mod error;
pub mod handlers;
pub mod state;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::polygon::Polygon;
use crate::store::{self, Store};
use state::AppState;

pub async fn serve(host: &str, port: u16, data_dir: &Path) -> Result<()> {
    let data_dir = store::resolve_data_dir(data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let db_path = data_dir.join("aggs-ingest.db");
    let store = Store::open(&db_path)
        .with_context(|| format!("opening database at {}", db_path.display()))?;

    let polygon_api_key = std::env::var("POLYGON_API_KEY").unwrap_or_default();
    if polygon_api_key.is_empty() {
        println!("  Warning: POLYGON_API_KEY not set — POST /collect_data/ will fail upstream");
    }

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent("aggs-ingest/0.1")
        .build()
        .context("creating HTTP client")?;

    let state = AppState::new(store, Polygon::new(http, polygon_api_key));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state);

    let addr = format!("{host}:{port}");
    println!("aggs-ingest API server listening on {addr}");
    println!("  Health:  GET  http://{addr}/health");
    println!("  Collect: POST http://{addr}/collect_data/");
    println!("  Query:   GET  http://{addr}/option_data/");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    axum::serve(listener, app.layer(cors))
        .await
        .context("running server")?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/collect_data/", post(handlers::collect::collect_data))
        .route("/option_data/", get(handlers::option_data::get_option_data))
        .with_state(state)
}

use axum::Json;
use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::CollectDataResponse;
use crate::ingest::{self, CollectRequest};

/// Kick off ingestion for one symbol/date-range and acknowledge immediately.
/// The spawned task has no feedback channel back to the caller; failures are
/// visible only in the process log.
pub async fn collect_data(
    State(state): State<AppState>,
    Json(req): Json<CollectRequest>,
) -> Json<CollectDataResponse> {
    let message = format!("Data collection for {} has been initiated.", req.symbol);

    tokio::spawn(async move {
        // collect_and_store logs its own outcome; nothing left to surface here.
        let _ = ingest::collect_and_store(&state.polygon, &state.store, &req).await;
    });

    Json(CollectDataResponse { message })
}

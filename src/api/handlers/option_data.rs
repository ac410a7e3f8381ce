use axum::Json;
use axum::extract::State;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::OptionDataQuery;
use crate::store::OptionBar;

pub async fn get_option_data(
    State(state): State<AppState>,
    q: OptionDataQuery,
) -> Result<Json<Vec<OptionBar>>, ApiError> {
    let rows = state
        .store
        .query_range(&q.symbol, q.start_date, q.end_date)
        .await?;
    Ok(Json(rows))
}

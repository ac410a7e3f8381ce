use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::ApiError;

// ── Request types ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct OptionDataQuery {
    pub symbol: String,
    /// Range start (YYYY-MM-DD, inclusive).
    pub start_date: NaiveDate,
    /// Range end (YYYY-MM-DD, inclusive).
    pub end_date: NaiveDate,
}

// Wrap axum's Query rejection so malformed parameters come back in the same
// {"error": ...} JSON shape as every other error on this surface.
impl<S> FromRequestParts<S> for OptionDataQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<OptionDataQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(query)
    }
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CollectDataResponse {
    pub message: String,
}

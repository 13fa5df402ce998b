use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::types::SearchQuery;
use super::{ApiError, ApiResponse, AppState};
use crate::clients::tmdb::SearchItem;

/// GET /search?q=
/// Multi-search across movies, series, and people.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchItem>>>, ApiError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }

    let results = state.catalog().search(q).await?;
    Ok(Json(ApiResponse::success(results)))
}

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::clients::tmdb::{MediaKind, PersonDetails, WatchProviderResults};

/// GET /people/{id}
pub async fn get_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PersonDetails>>, ApiError> {
    let details = state.catalog().person(id).await?;
    Ok(Json(ApiResponse::success(details)))
}

/// GET /watch-providers/{kind}/{id}
pub async fn get_watch_providers(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<WatchProviderResults>>, ApiError> {
    let kind = MediaKind::parse(&kind)
        .ok_or_else(|| ApiError::validation("Kind must be 'movie' or 'tv'"))?;

    let providers = state.catalog().watch_providers(kind, id).await?;
    Ok(Json(ApiResponse::success(providers)))
}

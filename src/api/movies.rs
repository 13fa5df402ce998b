use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user_id;
use super::types::{MoviePageDto, MovieWatchDto};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::media_key;

/// GET /movies/{id}
/// Catalog details plus the caller's watch row, if any.
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MoviePageDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let details = state.catalog().movie(id).await?;
    let watch = state
        .store()
        .get_movie_watch(user_id, &media_key(id))
        .await?
        .map(MovieWatchDto::from);

    Ok(Json(ApiResponse::success(MoviePageDto { details, watch })))
}

/// POST /movies/{id}/watch
/// Records a watch; repeat calls count rewatches.
pub async fn watch_movie(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MovieWatchDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    // A failed catalog fetch aborts here, before any watch-state mutation.
    let details = state.catalog().movie(id).await?;

    let row = state
        .watch_service()
        .record_movie_watch(user_id, &details)
        .await?;

    Ok(Json(ApiResponse::success(MovieWatchDto::from(row))))
}

/// DELETE /movies/{id}/watch
pub async fn unwatch_movie(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    state
        .watch_service()
        .remove_movie_watch(user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(())))
}

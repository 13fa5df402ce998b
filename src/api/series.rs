use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user_id;
use super::types::{
    SeasonPageDto, SeasonUpdateOutcomeDto, SeasonWatchDto, SeriesPageDto, SeriesWatchDto,
    WatchStateDto,
};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::media_key;
use crate::services::SeasonUpdateRequest;

/// GET /series/{id}
/// Catalog details plus the caller's watch state for the series.
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SeriesPageDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let details = state.catalog().series(id).await?;
    let watch_state = state
        .watch_service()
        .get_series_watch_state(user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(SeriesPageDto {
        details,
        watch_state: WatchStateDto::from(watch_state),
    })))
}

/// GET /series/{id}/watch
pub async fn get_series_watch_state(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<WatchStateDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let watch_state = state
        .watch_service()
        .get_series_watch_state(user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(WatchStateDto::from(watch_state))))
}

/// GET /series/{id}/seasons/{number}
pub async fn get_season(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((series_id, season_number)): Path<(i64, i32)>,
) -> Result<Json<ApiResponse<SeasonPageDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let details = state.catalog().season(series_id, season_number).await?;
    let season_key = media_key(details.id);

    let watch = state
        .store()
        .get_season_watch(user_id, &season_key)
        .await?
        .map(SeasonWatchDto::from);

    let watched_episode_ids = state
        .store()
        .get_episode_watches_for_season(user_id, &season_key)
        .await?
        .into_iter()
        .map(|row| row.episode_id)
        .collect();

    Ok(Json(ApiResponse::success(SeasonPageDto {
        details,
        watch,
        watched_episode_ids,
    })))
}

/// PUT /series/{id}/seasons/{number}
/// Applies per-episode selections and cascades season -> series -> stats.
pub async fn update_season(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((series_id, season_number)): Path<(i64, i32)>,
    Json(request): Json<SeasonUpdateRequest>,
) -> Result<Json<ApiResponse<SeasonUpdateOutcomeDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    // Fetch (or refresh) the season snapshot first; a remote failure aborts
    // the whole action with no partial watch-state change.
    let season = state.catalog().season(series_id, season_number).await?;

    if request.episode_selections.len() > season.episodes.len() {
        return Err(ApiError::validation(format!(
            "Season {season_number} has {} episodes but {} selections were provided",
            season.episodes.len(),
            request.episode_selections.len()
        )));
    }

    let outcome = state
        .watch_service()
        .apply_season_update(user_id, series_id, &season, request)
        .await?;

    Ok(Json(ApiResponse::success(SeasonUpdateOutcomeDto {
        season: SeasonWatchDto::from(outcome.season),
        series: SeriesWatchDto::from(outcome.series),
    })))
}

/// POST /series/{id}/complete
/// Marks every season of the series watched.
pub async fn complete_series(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SeriesWatchDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let details = state.catalog().series(id).await?;

    let row = state
        .watch_service()
        .mark_series_completed(user_id, &details)
        .await?;

    Ok(Json(ApiResponse::success(SeriesWatchDto::from(row))))
}

/// DELETE /series/{id}/watch
/// Removes the caller's watch state for the series (episodes included).
pub async fn remove_series(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    state.watch_service().remove_series(user_id, id).await?;

    Ok(Json(ApiResponse::success(())))
}

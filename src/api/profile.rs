use axum::{Json, extract::State};
use std::collections::HashMap;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user_id;
use super::types::{ProfileMovieDto, ProfileSeriesDto, UserStatsDto};
use super::{ApiError, ApiResponse, AppState};
use crate::clients::tmdb::{MovieDetails, SeriesDetails};

/// GET /profile/stats
/// Aggregate counters for the profile page.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserStatsDto>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let stats = state.watch_service().get_user_stats(user_id).await?;
    Ok(Json(ApiResponse::success(UserStatsDto::from(stats))))
}

/// GET /profile/movies
/// Every movie the caller has watched, most recent first, joined with the
/// cached snapshots in one batch query.
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<ProfileMovieDto>>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let rows = state.store().list_movie_watches(user_id).await?;

    let keys: Vec<String> = rows.iter().map(|r| r.movie_id.clone()).collect();
    let snapshots: HashMap<String, (String, Option<String>)> = state
        .store()
        .get_movie_snapshots_by_keys(&keys)
        .await?
        .into_iter()
        .map(|s| {
            let poster = serde_json::from_str::<MovieDetails>(&s.payload)
                .ok()
                .and_then(|d| d.poster_path);
            (s.movie_id, (s.title, poster))
        })
        .collect();

    let dtos = rows
        .into_iter()
        .map(|row| {
            let (title, poster_path) = snapshots
                .get(&row.movie_id)
                .cloned()
                .map_or((None, None), |(t, p)| (Some(t), p));
            ProfileMovieDto {
                movie_id: row.movie_id,
                title,
                poster_path,
                times_watched: row.times_watched,
                duration_minutes: row.duration_minutes,
                last_watched_at: row.last_watched_at,
            }
        })
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /profile/series
/// Every series the caller is tracking, joined with the cached snapshots.
pub async fn list_series(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<ProfileSeriesDto>>>, ApiError> {
    let user_id = session_user_id(&session).await?;

    let rows = state.store().list_series_watches(user_id).await?;

    let keys: Vec<String> = rows.iter().map(|r| r.series_id.clone()).collect();
    let snapshots: HashMap<String, (String, Option<String>)> = state
        .store()
        .get_series_snapshots_by_keys(&keys)
        .await?
        .into_iter()
        .map(|s| {
            let poster = serde_json::from_str::<SeriesDetails>(&s.payload)
                .ok()
                .and_then(|d| d.poster_path);
            (s.series_id, (s.name, poster))
        })
        .collect();

    let dtos = rows
        .into_iter()
        .map(|row| {
            let (name, poster_path) = snapshots
                .get(&row.series_id)
                .cloned()
                .map_or((None, None), |(n, p)| (Some(n), p));
            ProfileSeriesDto {
                series_id: row.series_id,
                name,
                poster_path,
                status: row.status,
                season_count: row.season_count,
                started_at: row.started_at,
                ended_at: row.ended_at,
            }
        })
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

use serde::{Deserialize, Serialize};

use crate::clients::tmdb::{MovieDetails, SeasonDetails, SeriesDetails};
use crate::domain::WatchStatus;
use crate::entities::{movie_watches, season_watches, series_watches, user_stats};
use crate::services::SeriesWatchState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieWatchDto {
    pub movie_id: String,
    pub times_watched: i32,
    pub duration_minutes: i64,
    pub last_watched_at: String,
}

impl From<movie_watches::Model> for MovieWatchDto {
    fn from(model: movie_watches::Model) -> Self {
        Self {
            movie_id: model.movie_id,
            times_watched: model.times_watched,
            duration_minutes: model.duration_minutes,
            last_watched_at: model.last_watched_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeriesWatchDto {
    pub series_id: String,
    pub status: WatchStatus,
    pub season_count: i32,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

impl From<series_watches::Model> for SeriesWatchDto {
    fn from(model: series_watches::Model) -> Self {
        Self {
            series_id: model.series_id,
            status: model.status,
            season_count: model.season_count,
            started_at: model.started_at,
            ended_at: model.ended_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeasonWatchDto {
    pub season_id: String,
    pub series_id: String,
    pub status: WatchStatus,
    pub episodes_watched: i32,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

impl From<season_watches::Model> for SeasonWatchDto {
    fn from(model: season_watches::Model) -> Self {
        Self {
            season_id: model.season_id,
            series_id: model.series_id,
            status: model.status,
            episodes_watched: model.episodes_watched,
            started_at: model.started_at,
            ended_at: model.ended_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WatchStateDto {
    pub series: Option<SeriesWatchDto>,
    pub seasons: Vec<SeasonWatchDto>,
}

impl From<SeriesWatchState> for WatchStateDto {
    fn from(state: SeriesWatchState) -> Self {
        Self {
            series: state.series.map(SeriesWatchDto::from),
            seasons: state.seasons.into_iter().map(SeasonWatchDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MoviePageDto {
    pub details: MovieDetails,
    pub watch: Option<MovieWatchDto>,
}

#[derive(Debug, Serialize)]
pub struct SeriesPageDto {
    pub details: SeriesDetails,
    pub watch_state: WatchStateDto,
}

#[derive(Debug, Serialize)]
pub struct SeasonPageDto {
    pub details: SeasonDetails,
    pub watch: Option<SeasonWatchDto>,
    /// Canonical episode keys this user has watched in the season.
    pub watched_episode_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SeasonUpdateOutcomeDto {
    pub season: SeasonWatchDto,
    pub series: SeriesWatchDto,
}

#[derive(Debug, Serialize)]
pub struct UserStatsDto {
    pub movies_watched: i32,
    pub movie_minutes: i64,
    pub episodes_watched: i32,
    pub episode_minutes: i64,
    pub series_completed: i32,
    pub series_watching: i32,
}

impl From<user_stats::Model> for UserStatsDto {
    fn from(model: user_stats::Model) -> Self {
        Self {
            movies_watched: model.movies_watched,
            movie_minutes: model.movie_minutes,
            episodes_watched: model.episodes_watched,
            episode_minutes: model.episode_minutes,
            series_completed: model.series_completed,
            series_watching: model.series_watching,
        }
    }
}

/// Movie watch row joined with its cached snapshot for the profile list.
#[derive(Debug, Serialize)]
pub struct ProfileMovieDto {
    pub movie_id: String,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub times_watched: i32,
    pub duration_minutes: i64,
    pub last_watched_at: String,
}

/// Series watch row joined with its cached snapshot for the profile list.
#[derive(Debug, Serialize)]
pub struct ProfileSeriesDto {
    pub series_id: String,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub status: WatchStatus,
    pub season_count: i32,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatusDto {
    pub version: String,
    pub uptime_seconds: u64,
    pub database_ok: bool,
}

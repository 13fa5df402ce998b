//! Domain service for the watch-state aggregation engine.
//!
//! This module provides the [`WatchService`] trait: every user action that
//! touches watch state goes through here, and derived state (season status,
//! series status, per-user counters) is recomputed bottom-up from source rows
//! rather than patched with deltas.

use crate::clients::tmdb::{EpisodeRef, MovieDetails, SeasonDetails, SeriesDetails};
use crate::domain::WatchStatus;
use crate::entities::{movie_watches, season_watches, series_watches, user_stats};
use serde::Deserialize;
use thiserror::Error;

/// Domain errors for watch-state operations.
#[derive(Debug, Error)]
pub enum WatchError {
    /// A required watch row was absent (user-facing: "nothing to remove").
    #[error("{0} not found")]
    NotFound(String),

    /// Recomputation produced an impossible state. A defect signal: the
    /// mutating operation aborts without persisting the inconsistent value.
    #[error("watch-state invariant violated: {0}")]
    Invariant(String),

    /// A create raced a concurrent create of the same unique key and could
    /// not fall back to the update path.
    #[error("conflicting concurrent update: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for WatchError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for WatchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<sea_orm::TransactionError<Self>> for WatchError {
    fn from(err: sea_orm::TransactionError<Self>) -> Self {
        match err {
            sea_orm::TransactionError::Connection(e) => e.into(),
            sea_orm::TransactionError::Transaction(e) => e,
        }
    }
}

/// Desired state for one season, applied in a single transaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonUpdateRequest {
    /// One entry per episode, ordered by ascending episode number.
    pub episode_selections: Vec<bool>,

    /// Status to honor when no episode of the season is watched
    /// (e.g. PLANNING). Ignored once any episode is watched.
    pub explicit_status: Option<WatchStatus>,

    /// Start/end dates; previously stored values are kept when omitted.
    pub started: Option<String>,
    pub ended: Option<String>,
}

/// Season and series rows as persisted by [`WatchService::apply_season_update`].
#[derive(Debug, Clone)]
pub struct SeasonUpdateOutcome {
    pub season: season_watches::Model,
    pub series: series_watches::Model,
}

/// Read-side completion summary for one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonCompletion {
    pub complete: bool,
    pub episode_count: i32,
}

/// Read-side completion summary for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesCompletion {
    pub complete: bool,
    pub season_count: i32,
}

/// Everything the profile/series pages need about one user's series.
#[derive(Debug, Clone, Default)]
pub struct SeriesWatchState {
    pub series: Option<series_watches::Model>,
    pub seasons: Vec<season_watches::Model>,
}

/// The watch-state aggregation engine.
///
/// Write operations run as one transaction per call; replaying a cascade
/// after a crash converges because every derived value is recomputed from
/// source rows. Read operations never fail on absence; they return empty
/// sentinels instead.
#[async_trait::async_trait]
pub trait WatchService: Send + Sync {
    /// Records a movie watch (first watch creates the row, rewatches
    /// increment it) and recomputes the user's movie totals.
    ///
    /// Repeat calls are a supported use case, never an error.
    async fn record_movie_watch(
        &self,
        user_id: i32,
        movie: &MovieDetails,
    ) -> Result<movie_watches::Model, WatchError>;

    /// Deletes the user's watch row for a movie and recomputes totals.
    ///
    /// # Errors
    ///
    /// - [`WatchError::NotFound`] if the movie was never watched
    /// - [`WatchError::Invariant`] if the implied decrement would drive a
    ///   counter negative (a prior inconsistency)
    async fn remove_movie_watch(&self, user_id: i32, movie_id: i64) -> Result<(), WatchError>;

    /// Marks one episode watched or unwatched. Unwatching an absent row is
    /// a no-op; this primitive does not run the season/series cascade.
    async fn set_episode_watched(
        &self,
        user_id: i32,
        episode: &EpisodeRef,
        season_id: i64,
        series_id: i64,
        watched: bool,
    ) -> Result<(), WatchError>;

    /// Applies per-episode selections for a season, derives the season
    /// status, and cascades series status and user counters.
    async fn apply_season_update(
        &self,
        user_id: i32,
        series_id: i64,
        season: &SeasonDetails,
        request: SeasonUpdateRequest,
    ) -> Result<SeasonUpdateOutcome, WatchError>;

    /// Marks every season of the series complete and the series itself
    /// COMPLETED, then recomputes user counters.
    async fn mark_series_completed(
        &self,
        user_id: i32,
        series: &SeriesDetails,
    ) -> Result<series_watches::Model, WatchError>;

    /// Deletes the user's episode, season, and series rows for a series and
    /// recomputes user counters. Idempotent.
    async fn remove_series(&self, user_id: i32, series_id: i64) -> Result<(), WatchError>;

    /// `{complete: false, episode_count: 0}` when no watch row exists yet.
    async fn is_season_complete(
        &self,
        user_id: i32,
        season_id: i64,
    ) -> Result<SeasonCompletion, WatchError>;

    /// `{complete: false, season_count: 0}` when no watch row exists yet.
    async fn is_series_complete(
        &self,
        user_id: i32,
        series_id: i64,
    ) -> Result<SeriesCompletion, WatchError>;

    /// The user's series watch row plus all of its season rows.
    async fn get_series_watch_state(
        &self,
        user_id: i32,
        series_id: i64,
    ) -> Result<SeriesWatchState, WatchError>;

    /// The user's aggregate counters.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::NotFound`] if the stats row is missing; one is
    /// created for every user at signup.
    async fn get_user_stats(&self, user_id: i32) -> Result<user_stats::Model, WatchError>;
}

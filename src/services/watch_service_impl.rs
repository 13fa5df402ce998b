//! `SeaORM` implementation of the [`WatchService`] trait.
//!
//! Each mutating operation runs in a single transaction against the store,
//! and every derived value (season status, series status, user counters) is
//! recomputed from source rows inside that same transaction. Replaying a
//! partially applied cascade therefore converges instead of drifting.

use crate::clients::tmdb::{EpisodeRef, MovieDetails, SeasonDetails, SeriesDetails};
use crate::db::repositories::{snapshots, stats, watches};
use crate::db::{Store, StatsTotals};
use crate::domain::{WatchStatus, media_key};
use crate::entities::{movie_watches, season_watches, series_watches, user_stats};
use crate::services::watch_service::{
    SeasonCompletion, SeasonUpdateOutcome, SeasonUpdateRequest, SeriesCompletion,
    SeriesWatchState, WatchError, WatchService,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use tracing::{info, warn};

/// SeaORM-backed watch-state aggregation engine.
pub struct SeaOrmWatchService {
    store: Store,
}

impl SeaOrmWatchService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Season status from recomputed inputs. Zero watched episodes honors the
/// caller's explicit status; a fully watched, non-empty season is COMPLETED;
/// anything in between is WATCHING.
const fn derive_season_status(
    episodes_watched: i32,
    episode_count: i32,
    explicit: Option<WatchStatus>,
) -> WatchStatus {
    if episodes_watched == 0 {
        match explicit {
            Some(status) => status,
            None => WatchStatus::Planning,
        }
    } else if episode_count > 0 && episodes_watched >= episode_count {
        WatchStatus::Completed
    } else {
        WatchStatus::Watching
    }
}

fn clamp_count(count: u64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Applies one episode selection. Inserts are idempotent and unwatching an
/// absent row is a no-op.
async fn apply_episode_selection<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    episode: &EpisodeRef,
    season_key: &str,
    series_key: &str,
    watched: bool,
    now: &str,
) -> Result<(), WatchError> {
    let episode_key = media_key(episode.id);

    if watched {
        watches::insert_episode_watch(
            conn,
            user_id,
            &episode_key,
            season_key,
            series_key,
            episode.runtime.unwrap_or(0),
            now,
        )
        .await?;
    } else {
        watches::delete_episode_watch(conn, user_id, &episode_key).await?;
    }

    Ok(())
}

/// Recomputes series status from sibling season rows and persists it.
///
/// The season total comes from the series snapshot when one exists; a series
/// is COMPLETED only when every one of those seasons has a COMPLETED row.
async fn recompute_series<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    series_key: &str,
    now: &str,
) -> Result<series_watches::Model, WatchError> {
    let watch = watches::find_series_watch(conn, user_id, series_key)
        .await?
        .ok_or_else(|| {
            WatchError::Invariant(format!(
                "series watch for {series_key} missing during cascade"
            ))
        })?;

    let seasons = watches::season_watches_for_series(conn, user_id, series_key).await?;
    let completed = clamp_count(
        seasons
            .iter()
            .filter(|s| s.status == WatchStatus::Completed)
            .count() as u64,
    );

    let season_total = match snapshots::find_series(conn, series_key).await? {
        Some(snapshot) if snapshot.season_count > 0 => snapshot.season_count,
        _ => clamp_count(seasons.len() as u64),
    };

    let status = if season_total > 0 && completed == season_total {
        WatchStatus::Completed
    } else {
        WatchStatus::Watching
    };

    let mut active: series_watches::ActiveModel = watch.into();
    active.status = Set(status);
    active.season_count = Set(season_total);
    active.updated_at = Set(now.to_string());
    Ok(active.update(conn).await?)
}

/// Recomputes every user counter from source rows and persists the result.
async fn recompute_user_stats<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    now: &str,
) -> Result<user_stats::Model, WatchError> {
    let movies = watches::list_movie_watches(conn, user_id).await?;
    let episodes = watches::list_episode_watches(conn, user_id).await?;
    let series = watches::list_series_watches(conn, user_id).await?;

    let totals = StatsTotals {
        movies_watched: movies.iter().map(|m| m.times_watched).sum(),
        movie_minutes: movies.iter().map(|m| m.duration_minutes).sum(),
        episodes_watched: clamp_count(episodes.len() as u64),
        episode_minutes: episodes
            .iter()
            .map(|e| i64::from(e.runtime_minutes))
            .sum(),
        series_completed: clamp_count(
            series
                .iter()
                .filter(|s| s.status == WatchStatus::Completed)
                .count() as u64,
        ),
        series_watching: clamp_count(
            series
                .iter()
                .filter(|s| s.status == WatchStatus::Watching)
                .count() as u64,
        ),
    };

    if totals.movies_watched < 0 || totals.movie_minutes < 0 || totals.episode_minutes < 0 {
        return Err(WatchError::Invariant(format!(
            "recomputed negative totals for user {user_id}"
        )));
    }

    let row = stats::find_stats(conn, user_id).await?.ok_or_else(|| {
        WatchError::Invariant(format!("user {user_id} has no stats row"))
    })?;

    Ok(stats::write_totals(conn, row, totals, now).await?)
}

#[async_trait::async_trait]
impl WatchService for SeaOrmWatchService {
    async fn record_movie_watch(
        &self,
        user_id: i32,
        movie: &MovieDetails,
    ) -> Result<movie_watches::Model, WatchError> {
        let movie = movie.clone();
        let movie_key = media_key(movie.id);

        let row = self
            .store
            .conn
            .transaction::<_, movie_watches::Model, WatchError>(move |txn| {
                Box::pin(async move {
                    let now = chrono::Utc::now().to_rfc3339();

                    snapshots::upsert_movie(txn, &movie).await?;

                    let row = watches::increment_movie_watch(
                        txn,
                        user_id,
                        &movie_key,
                        movie.runtime.unwrap_or(0),
                        &now,
                    )
                    .await?;

                    recompute_user_stats(txn, user_id, &now).await?;
                    Ok(row)
                })
            })
            .await
            .map_err(WatchError::from)?;

        info!(
            user_id,
            movie_id = %row.movie_id,
            times_watched = row.times_watched,
            "Recorded movie watch"
        );

        Ok(row)
    }

    async fn remove_movie_watch(&self, user_id: i32, movie_id: i64) -> Result<(), WatchError> {
        let movie_key = media_key(movie_id);

        self.store
            .conn
            .transaction::<_, (), WatchError>(move |txn| {
                Box::pin(async move {
                    let now = chrono::Utc::now().to_rfc3339();

                    let watch = watches::find_movie_watch(txn, user_id, &movie_key)
                        .await?
                        .ok_or_else(|| {
                            WatchError::NotFound(format!("movie watch for {movie_key}"))
                        })?;

                    // A stored counter smaller than this row's contribution
                    // means an earlier mutation drifted; abort rather than
                    // persist a negative value.
                    let stats = stats::find_stats(txn, user_id).await?.ok_or_else(|| {
                        WatchError::Invariant(format!("user {user_id} has no stats row"))
                    })?;
                    if stats.movies_watched < watch.times_watched
                        || stats.movie_minutes < watch.duration_minutes
                    {
                        return Err(WatchError::Invariant(format!(
                            "removing movie {movie_key} would drive user {user_id} totals negative"
                        )));
                    }

                    watches::delete_movie_watch(txn, user_id, &movie_key).await?;
                    recompute_user_stats(txn, user_id, &now).await?;
                    Ok(())
                })
            })
            .await
            .map_err(WatchError::from)?;

        info!(user_id, movie_id = %media_key(movie_id), "Removed movie watch");
        Ok(())
    }

    async fn set_episode_watched(
        &self,
        user_id: i32,
        episode: &EpisodeRef,
        season_id: i64,
        series_id: i64,
        watched: bool,
    ) -> Result<(), WatchError> {
        let episode = episode.clone();
        let season_key = media_key(season_id);
        let series_key = media_key(series_id);

        self.store
            .conn
            .transaction::<_, (), WatchError>(move |txn| {
                Box::pin(async move {
                    let now = chrono::Utc::now().to_rfc3339();
                    apply_episode_selection(
                        txn,
                        user_id,
                        &episode,
                        &season_key,
                        &series_key,
                        watched,
                        &now,
                    )
                    .await?;
                    recompute_user_stats(txn, user_id, &now).await?;
                    Ok(())
                })
            })
            .await
            .map_err(WatchError::from)
    }

    async fn apply_season_update(
        &self,
        user_id: i32,
        series_id: i64,
        season: &SeasonDetails,
        request: SeasonUpdateRequest,
    ) -> Result<SeasonUpdateOutcome, WatchError> {
        let season = season.clone();
        let season_key = media_key(season.id);
        let series_key = media_key(series_id);

        if request.episode_selections.len() > season.episodes.len() {
            warn!(
                user_id,
                season_id = %season_key,
                selections = request.episode_selections.len(),
                episodes = season.episodes.len(),
                "More episode selections than episodes; extra entries ignored"
            );
        }

        let outcome = self
            .store
            .conn
            .transaction::<_, SeasonUpdateOutcome, WatchError>(move |txn| {
                Box::pin(async move {
                    let now = chrono::Utc::now().to_rfc3339();

                    snapshots::upsert_season(txn, series_id, &season).await?;

                    watches::get_or_create_series_watch(txn, user_id, &series_key, &now).await?;
                    let season_watch =
                        watches::get_or_create_season_watch(txn, user_id, &season_key, &series_key, &now)
                            .await?;

                    let mut episodes: Vec<EpisodeRef> = season.episodes.clone();
                    episodes.sort_by_key(|e| e.episode_number);

                    for (episode, watched) in
                        episodes.iter().zip(request.episode_selections.iter())
                    {
                        apply_episode_selection(
                            txn,
                            user_id,
                            episode,
                            &season_key,
                            &series_key,
                            *watched,
                            &now,
                        )
                        .await?;
                    }

                    let episodes_watched = clamp_count(
                        watches::episode_watch_count_for_season(txn, user_id, &season_key).await?,
                    );
                    let status = derive_season_status(
                        episodes_watched,
                        season.episode_count(),
                        request.explicit_status,
                    );

                    let mut active: season_watches::ActiveModel = season_watch.into();
                    active.episodes_watched = Set(episodes_watched);
                    active.status = Set(status);
                    if let Some(started) = request.started {
                        active.started_at = Set(Some(started));
                    }
                    if let Some(ended) = request.ended {
                        active.ended_at = Set(Some(ended));
                    }
                    active.updated_at = Set(now.clone());
                    let season_row = active.update(txn).await?;

                    let series_row = recompute_series(txn, user_id, &series_key, &now).await?;
                    recompute_user_stats(txn, user_id, &now).await?;

                    Ok(SeasonUpdateOutcome {
                        season: season_row,
                        series: series_row,
                    })
                })
            })
            .await
            .map_err(WatchError::from)?;

        info!(
            user_id,
            season_id = %outcome.season.season_id,
            season_status = %outcome.season.status,
            series_status = %outcome.series.status,
            "Applied season update"
        );

        Ok(outcome)
    }

    async fn mark_series_completed(
        &self,
        user_id: i32,
        series: &SeriesDetails,
    ) -> Result<series_watches::Model, WatchError> {
        let series = series.clone();
        let series_key = media_key(series.id);

        let row = self
            .store
            .conn
            .transaction::<_, series_watches::Model, WatchError>(move |txn| {
                Box::pin(async move {
                    let now = chrono::Utc::now().to_rfc3339();

                    snapshots::upsert_series(txn, &series).await?;

                    for season in &series.seasons {
                        let season_key = media_key(season.id);
                        let watch = watches::get_or_create_season_watch(
                            txn, user_id, &season_key, &series_key, &now,
                        )
                        .await?;

                        let mut active: season_watches::ActiveModel = watch.into();
                        active.episodes_watched = Set(season.episode_count);
                        active.status = Set(WatchStatus::Completed);
                        active.updated_at = Set(now.clone());
                        active.update(txn).await?;
                    }

                    let watch =
                        watches::get_or_create_series_watch(txn, user_id, &series_key, &now)
                            .await?;
                    let mut active: series_watches::ActiveModel = watch.into();
                    active.status = Set(WatchStatus::Completed);
                    active.season_count = Set(clamp_count(series.seasons.len() as u64));
                    active.updated_at = Set(now.clone());
                    let series_row = active.update(txn).await?;

                    recompute_user_stats(txn, user_id, &now).await?;
                    Ok(series_row)
                })
            })
            .await
            .map_err(WatchError::from)?;

        info!(
            user_id,
            series_id = %row.series_id,
            season_count = row.season_count,
            "Marked series completed"
        );

        Ok(row)
    }

    async fn remove_series(&self, user_id: i32, series_id: i64) -> Result<(), WatchError> {
        let series_key = media_key(series_id);

        self.store
            .conn
            .transaction::<_, (), WatchError>(move |txn| {
                Box::pin(async move {
                    let now = chrono::Utc::now().to_rfc3339();

                    watches::delete_episode_watches_for_series(txn, user_id, &series_key).await?;
                    watches::delete_season_watches_for_series(txn, user_id, &series_key).await?;
                    watches::delete_series_watch(txn, user_id, &series_key).await?;

                    recompute_user_stats(txn, user_id, &now).await?;
                    Ok(())
                })
            })
            .await
            .map_err(WatchError::from)?;

        info!(user_id, series_id = %media_key(series_id), "Removed series watch state");
        Ok(())
    }

    async fn is_season_complete(
        &self,
        user_id: i32,
        season_id: i64,
    ) -> Result<SeasonCompletion, WatchError> {
        let season_key = media_key(season_id);

        let Some(watch) = self.store.get_season_watch(user_id, &season_key).await? else {
            return Ok(SeasonCompletion {
                complete: false,
                episode_count: 0,
            });
        };

        let episode_count = self
            .store
            .get_season_snapshot(&season_key)
            .await?
            .map_or(0, |s| s.episode_count);

        Ok(SeasonCompletion {
            complete: episode_count > 0 && watch.episodes_watched >= episode_count,
            episode_count,
        })
    }

    async fn is_series_complete(
        &self,
        user_id: i32,
        series_id: i64,
    ) -> Result<SeriesCompletion, WatchError> {
        let series_key = media_key(series_id);

        if self
            .store
            .get_series_watch(user_id, &series_key)
            .await?
            .is_none()
        {
            return Ok(SeriesCompletion {
                complete: false,
                season_count: 0,
            });
        }

        let seasons = self
            .store
            .get_season_watches_for_series(user_id, &series_key)
            .await?;
        let completed = clamp_count(
            seasons
                .iter()
                .filter(|s| s.status == WatchStatus::Completed)
                .count() as u64,
        );

        let season_count = match self.store.get_series_snapshot(&series_key).await? {
            Some(snapshot) if snapshot.season_count > 0 => snapshot.season_count,
            _ => clamp_count(seasons.len() as u64),
        };

        Ok(SeriesCompletion {
            complete: season_count > 0 && completed == season_count,
            season_count,
        })
    }

    async fn get_series_watch_state(
        &self,
        user_id: i32,
        series_id: i64,
    ) -> Result<SeriesWatchState, WatchError> {
        let series_key = media_key(series_id);

        Ok(SeriesWatchState {
            series: self.store.get_series_watch(user_id, &series_key).await?,
            seasons: self
                .store
                .get_season_watches_for_series(user_id, &series_key)
                .await?,
        })
    }

    async fn get_user_stats(&self, user_id: i32) -> Result<user_stats::Model, WatchError> {
        self.store
            .get_user_stats(user_id)
            .await?
            .ok_or_else(|| WatchError::NotFound(format!("stats for user {user_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_watched_honors_explicit_status() {
        assert_eq!(
            derive_season_status(0, 12, Some(WatchStatus::Planning)),
            WatchStatus::Planning
        );
        assert_eq!(
            derive_season_status(0, 12, Some(WatchStatus::Dropped)),
            WatchStatus::Dropped
        );
        assert_eq!(derive_season_status(0, 12, None), WatchStatus::Planning);
    }

    #[test]
    fn full_season_is_completed() {
        assert_eq!(
            derive_season_status(12, 12, None),
            WatchStatus::Completed
        );
    }

    #[test]
    fn partial_season_is_watching() {
        assert_eq!(
            derive_season_status(3, 12, Some(WatchStatus::Paused)),
            WatchStatus::Watching
        );
    }

    #[test]
    fn empty_season_cannot_complete() {
        assert_eq!(derive_season_status(0, 0, None), WatchStatus::Planning);
    }
}

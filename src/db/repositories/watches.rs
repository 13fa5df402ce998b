//! Row operations for per-user watch records.
//!
//! Get-or-create primitives are idempotent: inserts race through a unique
//! key and fall back to the existing row instead of surfacing a conflict.
//! Derivation rules (status, counters, cascades) live in the watch service,
//! not here.

use crate::domain::WatchStatus;
use crate::entities::{
    episode_watches, movie_watches, prelude::*, season_watches, series_watches,
};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// Treats a skipped `ON CONFLICT DO NOTHING` insert as success.
fn absorb_conflict<T>(result: Result<T, DbErr>) -> Result<(), DbErr> {
    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Movie watches
// ============================================================================

pub async fn find_movie_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    movie_key: &str,
) -> Result<Option<movie_watches::Model>> {
    Ok(MovieWatches::find_by_id((user_id, movie_key.to_string()))
        .one(conn)
        .await?)
}

pub async fn list_movie_watches<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Vec<movie_watches::Model>> {
    Ok(MovieWatches::find()
        .filter(movie_watches::Column::UserId.eq(user_id))
        .order_by_desc(movie_watches::Column::LastWatchedAt)
        .all(conn)
        .await?)
}

/// Insert-or-increment for a rewatch. Returns the row as persisted.
pub async fn increment_movie_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    movie_key: &str,
    runtime_minutes: i32,
    now: &str,
) -> Result<movie_watches::Model> {
    if let Some(existing) = find_movie_watch(conn, user_id, movie_key).await? {
        let times = existing.times_watched + 1;
        let duration = existing.duration_minutes + i64::from(runtime_minutes);

        let mut active: movie_watches::ActiveModel = existing.into();
        active.times_watched = Set(times);
        active.duration_minutes = Set(duration);
        active.last_watched_at = Set(now.to_string());
        return Ok(active.update(conn).await?);
    }

    let model = movie_watches::ActiveModel {
        user_id: Set(user_id),
        movie_id: Set(movie_key.to_string()),
        times_watched: Set(1),
        duration_minutes: Set(i64::from(runtime_minutes)),
        last_watched_at: Set(now.to_string()),
    };

    absorb_conflict(
        MovieWatches::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    movie_watches::Column::UserId,
                    movie_watches::Column::MovieId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(conn)
            .await,
    )?;

    find_movie_watch(conn, user_id, movie_key)
        .await?
        .context("movie watch row missing after upsert")
}

pub async fn delete_movie_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    movie_key: &str,
) -> Result<bool> {
    let result = MovieWatches::delete_by_id((user_id, movie_key.to_string()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

// ============================================================================
// Series watches
// ============================================================================

pub async fn find_series_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    series_key: &str,
) -> Result<Option<series_watches::Model>> {
    Ok(SeriesWatches::find_by_id((user_id, series_key.to_string()))
        .one(conn)
        .await?)
}

pub async fn list_series_watches<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Vec<series_watches::Model>> {
    Ok(SeriesWatches::find()
        .filter(series_watches::Column::UserId.eq(user_id))
        .all(conn)
        .await?)
}

pub async fn get_or_create_series_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    series_key: &str,
    now: &str,
) -> Result<series_watches::Model> {
    let model = series_watches::ActiveModel {
        user_id: Set(user_id),
        series_id: Set(series_key.to_string()),
        status: Set(WatchStatus::Planning),
        season_count: Set(0),
        started_at: Set(None),
        ended_at: Set(None),
        updated_at: Set(now.to_string()),
    };

    absorb_conflict(
        SeriesWatches::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    series_watches::Column::UserId,
                    series_watches::Column::SeriesId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(conn)
            .await,
    )?;

    find_series_watch(conn, user_id, series_key)
        .await?
        .context("series watch row missing after upsert")
}

pub async fn delete_series_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    series_key: &str,
) -> Result<bool> {
    let result = SeriesWatches::delete_by_id((user_id, series_key.to_string()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

// ============================================================================
// Season watches
// ============================================================================

pub async fn find_season_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    season_key: &str,
) -> Result<Option<season_watches::Model>> {
    Ok(SeasonWatches::find_by_id((user_id, season_key.to_string()))
        .one(conn)
        .await?)
}

pub async fn season_watches_for_series<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    series_key: &str,
) -> Result<Vec<season_watches::Model>> {
    Ok(SeasonWatches::find()
        .filter(season_watches::Column::UserId.eq(user_id))
        .filter(season_watches::Column::SeriesId.eq(series_key))
        .all(conn)
        .await?)
}

pub async fn get_or_create_season_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    season_key: &str,
    series_key: &str,
    now: &str,
) -> Result<season_watches::Model> {
    let model = season_watches::ActiveModel {
        user_id: Set(user_id),
        season_id: Set(season_key.to_string()),
        series_id: Set(series_key.to_string()),
        status: Set(WatchStatus::Planning),
        episodes_watched: Set(0),
        started_at: Set(None),
        ended_at: Set(None),
        updated_at: Set(now.to_string()),
    };

    absorb_conflict(
        SeasonWatches::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    season_watches::Column::UserId,
                    season_watches::Column::SeasonId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(conn)
            .await,
    )?;

    find_season_watch(conn, user_id, season_key)
        .await?
        .context("season watch row missing after upsert")
}

pub async fn delete_season_watches_for_series<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    series_key: &str,
) -> Result<u64> {
    let result = SeasonWatches::delete_many()
        .filter(season_watches::Column::UserId.eq(user_id))
        .filter(season_watches::Column::SeriesId.eq(series_key))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

// ============================================================================
// Episode watches
// ============================================================================

pub async fn insert_episode_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    episode_key: &str,
    season_key: &str,
    series_key: &str,
    runtime_minutes: i32,
    now: &str,
) -> Result<()> {
    let model = episode_watches::ActiveModel {
        user_id: Set(user_id),
        episode_id: Set(episode_key.to_string()),
        season_id: Set(season_key.to_string()),
        series_id: Set(series_key.to_string()),
        runtime_minutes: Set(runtime_minutes),
        watched_at: Set(now.to_string()),
    };

    absorb_conflict(
        EpisodeWatches::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    episode_watches::Column::UserId,
                    episode_watches::Column::EpisodeId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(conn)
            .await,
    )?;

    Ok(())
}

pub async fn delete_episode_watch<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    episode_key: &str,
) -> Result<bool> {
    let result = EpisodeWatches::delete_by_id((user_id, episode_key.to_string()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn episode_watch_count_for_season<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    season_key: &str,
) -> Result<u64> {
    Ok(EpisodeWatches::find()
        .filter(episode_watches::Column::UserId.eq(user_id))
        .filter(episode_watches::Column::SeasonId.eq(season_key))
        .count(conn)
        .await?)
}

pub async fn episode_watches_for_season<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    season_key: &str,
) -> Result<Vec<episode_watches::Model>> {
    Ok(EpisodeWatches::find()
        .filter(episode_watches::Column::UserId.eq(user_id))
        .filter(episode_watches::Column::SeasonId.eq(season_key))
        .all(conn)
        .await?)
}

pub async fn list_episode_watches<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Vec<episode_watches::Model>> {
    Ok(EpisodeWatches::find()
        .filter(episode_watches::Column::UserId.eq(user_id))
        .all(conn)
        .await?)
}

pub async fn delete_episode_watches_for_series<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    series_key: &str,
) -> Result<u64> {
    let result = EpisodeWatches::delete_many()
        .filter(episode_watches::Column::UserId.eq(user_id))
        .filter(episode_watches::Column::SeriesId.eq(series_key))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

// ============================================================================
// Store facade
// ============================================================================

/// Read-side repository for watch rows.
pub struct WatchRepository {
    conn: DatabaseConnection,
}

impl WatchRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_movie_watch(
        &self,
        user_id: i32,
        movie_key: &str,
    ) -> Result<Option<movie_watches::Model>> {
        find_movie_watch(&self.conn, user_id, movie_key).await
    }

    pub async fn list_movie_watches(&self, user_id: i32) -> Result<Vec<movie_watches::Model>> {
        list_movie_watches(&self.conn, user_id).await
    }

    pub async fn get_series_watch(
        &self,
        user_id: i32,
        series_key: &str,
    ) -> Result<Option<series_watches::Model>> {
        find_series_watch(&self.conn, user_id, series_key).await
    }

    pub async fn list_series_watches(&self, user_id: i32) -> Result<Vec<series_watches::Model>> {
        list_series_watches(&self.conn, user_id).await
    }

    pub async fn get_season_watch(
        &self,
        user_id: i32,
        season_key: &str,
    ) -> Result<Option<season_watches::Model>> {
        find_season_watch(&self.conn, user_id, season_key).await
    }

    pub async fn get_season_watches_for_series(
        &self,
        user_id: i32,
        series_key: &str,
    ) -> Result<Vec<season_watches::Model>> {
        season_watches_for_series(&self.conn, user_id, series_key).await
    }

    pub async fn get_episode_watches_for_season(
        &self,
        user_id: i32,
        season_key: &str,
    ) -> Result<Vec<episode_watches::Model>> {
        episode_watches_for_season(&self.conn, user_id, season_key).await
    }
}

//! Row operations for per-user aggregate counters.

use crate::entities::{prelude::*, user_stats};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};

/// Fully recomputed totals, produced by the watch service from source rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsTotals {
    pub movies_watched: i32,
    pub movie_minutes: i64,
    pub episodes_watched: i32,
    pub episode_minutes: i64,
    pub series_completed: i32,
    pub series_watching: i32,
}

pub async fn find_stats<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<user_stats::Model>> {
    Ok(UserStats::find_by_id(user_id).one(conn).await?)
}

/// Creates the zeroed stats row at signup.
pub async fn insert_stats<C: ConnectionTrait>(conn: &C, user_id: i32, now: &str) -> Result<()> {
    let model = user_stats::ActiveModel {
        user_id: Set(user_id),
        movies_watched: Set(0),
        movie_minutes: Set(0),
        episodes_watched: Set(0),
        episode_minutes: Set(0),
        series_completed: Set(0),
        series_watching: Set(0),
        updated_at: Set(now.to_string()),
    };
    UserStats::insert(model).exec(conn).await?;
    Ok(())
}

/// Overwrites every counter with the recomputed totals.
pub async fn write_totals<C: ConnectionTrait>(
    conn: &C,
    stats: user_stats::Model,
    totals: StatsTotals,
    now: &str,
) -> Result<user_stats::Model> {
    let mut active: user_stats::ActiveModel = stats.into();
    active.movies_watched = Set(totals.movies_watched);
    active.movie_minutes = Set(totals.movie_minutes);
    active.episodes_watched = Set(totals.episodes_watched);
    active.episode_minutes = Set(totals.episode_minutes);
    active.series_completed = Set(totals.series_completed);
    active.series_watching = Set(totals.series_watching);
    active.updated_at = Set(now.to_string());
    Ok(active.update(conn).await?)
}

/// Repository for stats lookups via the `Store` facade.
pub struct StatsRepository {
    conn: DatabaseConnection,
}

impl StatsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: i32) -> Result<Option<user_stats::Model>> {
        find_stats(&self.conn, user_id).await
    }
}

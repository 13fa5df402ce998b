//! Row operations for cached catalog snapshots.
//!
//! The free functions are generic over the connection so the aggregation
//! engine can run them inside its per-action transaction; the repository
//! struct wraps them for plain `Store` access.

use crate::clients::tmdb::{MovieDetails, SeasonDetails, SeriesDetails};
use crate::domain::media_key;
use crate::entities::{movie_snapshots, season_snapshots, series_snapshots, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub async fn upsert_movie<C: ConnectionTrait>(conn: &C, details: &MovieDetails) -> Result<()> {
    let model = movie_snapshots::ActiveModel {
        movie_id: Set(media_key(details.id)),
        title: Set(details.title.clone()),
        runtime_minutes: Set(details.runtime.unwrap_or(0)),
        payload: Set(serde_json::to_string(details)?),
        fetched_at: Set(chrono::Utc::now().to_rfc3339()),
    };

    MovieSnapshots::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(movie_snapshots::Column::MovieId)
                .update_columns([
                    movie_snapshots::Column::Title,
                    movie_snapshots::Column::RuntimeMinutes,
                    movie_snapshots::Column::Payload,
                    movie_snapshots::Column::FetchedAt,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await?;

    Ok(())
}

/// Upserts the series row and a season row per season summary in one pass,
/// since the catalog returns both together.
pub async fn upsert_series<C: ConnectionTrait>(conn: &C, details: &SeriesDetails) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let series_key = media_key(details.id);

    let model = series_snapshots::ActiveModel {
        series_id: Set(series_key.clone()),
        name: Set(details.name.clone()),
        season_count: Set(details.number_of_seasons),
        payload: Set(serde_json::to_string(details)?),
        fetched_at: Set(now.clone()),
    };

    SeriesSnapshots::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(series_snapshots::Column::SeriesId)
                .update_columns([
                    series_snapshots::Column::Name,
                    series_snapshots::Column::SeasonCount,
                    series_snapshots::Column::Payload,
                    series_snapshots::Column::FetchedAt,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await?;

    for season in &details.seasons {
        let model = season_snapshots::ActiveModel {
            season_id: Set(media_key(season.id)),
            series_id: Set(series_key.clone()),
            season_number: Set(season.season_number),
            episode_count: Set(season.episode_count),
            payload: Set(serde_json::to_string(season)?),
            fetched_at: Set(now.clone()),
        };

        SeasonSnapshots::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(season_snapshots::Column::SeasonId)
                    .update_columns([
                        season_snapshots::Column::SeriesId,
                        season_snapshots::Column::SeasonNumber,
                        season_snapshots::Column::EpisodeCount,
                        season_snapshots::Column::Payload,
                        season_snapshots::Column::FetchedAt,
                    ])
                    .to_owned(),
            )
            .exec(conn)
            .await?;
    }

    Ok(())
}

/// Upserts a full season snapshot (with its episode list in the payload).
/// The episode list is authoritative here, so `episode_count` comes from it.
pub async fn upsert_season<C: ConnectionTrait>(
    conn: &C,
    series_id: i64,
    details: &SeasonDetails,
) -> Result<()> {
    let model = season_snapshots::ActiveModel {
        season_id: Set(media_key(details.id)),
        series_id: Set(media_key(series_id)),
        season_number: Set(details.season_number),
        episode_count: Set(details.episode_count()),
        payload: Set(serde_json::to_string(details)?),
        fetched_at: Set(chrono::Utc::now().to_rfc3339()),
    };

    SeasonSnapshots::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(season_snapshots::Column::SeasonId)
                .update_columns([
                    season_snapshots::Column::SeriesId,
                    season_snapshots::Column::SeasonNumber,
                    season_snapshots::Column::EpisodeCount,
                    season_snapshots::Column::Payload,
                    season_snapshots::Column::FetchedAt,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await?;

    Ok(())
}

pub async fn movies_by_keys<C: ConnectionTrait>(
    conn: &C,
    keys: &[String],
) -> Result<Vec<movie_snapshots::Model>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    Ok(MovieSnapshots::find()
        .filter(movie_snapshots::Column::MovieId.is_in(keys.iter().cloned()))
        .all(conn)
        .await?)
}

pub async fn find_series<C: ConnectionTrait>(
    conn: &C,
    series_key: &str,
) -> Result<Option<series_snapshots::Model>> {
    Ok(SeriesSnapshots::find_by_id(series_key).one(conn).await?)
}

pub async fn series_by_keys<C: ConnectionTrait>(
    conn: &C,
    keys: &[String],
) -> Result<Vec<series_snapshots::Model>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    Ok(SeriesSnapshots::find()
        .filter(series_snapshots::Column::SeriesId.is_in(keys.iter().cloned()))
        .all(conn)
        .await?)
}

pub async fn find_season<C: ConnectionTrait>(
    conn: &C,
    season_key: &str,
) -> Result<Option<season_snapshots::Model>> {
    Ok(SeasonSnapshots::find_by_id(season_key).one(conn).await?)
}

pub async fn find_season_by_number<C: ConnectionTrait>(
    conn: &C,
    series_key: &str,
    season_number: i32,
) -> Result<Option<season_snapshots::Model>> {
    Ok(SeasonSnapshots::find()
        .filter(season_snapshots::Column::SeriesId.eq(series_key))
        .filter(season_snapshots::Column::SeasonNumber.eq(season_number))
        .one(conn)
        .await?)
}

/// Repository for snapshot lookups via the `Store` facade.
pub struct SnapshotRepository {
    conn: DatabaseConnection,
}

impl SnapshotRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn upsert_movie(&self, details: &MovieDetails) -> Result<()> {
        upsert_movie(&self.conn, details).await
    }

    pub async fn upsert_series(&self, details: &SeriesDetails) -> Result<()> {
        upsert_series(&self.conn, details).await
    }

    pub async fn upsert_season(&self, series_id: i64, details: &SeasonDetails) -> Result<()> {
        upsert_season(&self.conn, series_id, details).await
    }

    pub async fn get_movies_by_keys(
        &self,
        keys: &[String],
    ) -> Result<Vec<movie_snapshots::Model>> {
        movies_by_keys(&self.conn, keys).await
    }

    pub async fn get_series(&self, series_key: &str) -> Result<Option<series_snapshots::Model>> {
        find_series(&self.conn, series_key).await
    }

    pub async fn get_series_by_keys(
        &self,
        keys: &[String],
    ) -> Result<Vec<series_snapshots::Model>> {
        series_by_keys(&self.conn, keys).await
    }

    pub async fn get_season(&self, season_key: &str) -> Result<Option<season_snapshots::Model>> {
        find_season(&self.conn, season_key).await
    }

    pub async fn get_season_by_number(
        &self,
        series_key: &str,
        season_number: i32,
    ) -> Result<Option<season_snapshots::Model>> {
        find_season_by_number(&self.conn, series_key, season_number).await
    }
}

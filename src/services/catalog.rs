//! Catalog access with snapshot caching.
//!
//! Series and season metadata is served from the local snapshot while it is
//! fresh (seven days by default) and refetched from the catalog otherwise,
//! so completion math never runs against stale episode counts. A failed
//! remote fetch propagates and aborts the triggering action before any
//! watch-state mutation happens.

use crate::clients::tmdb::{
    MediaKind, MovieDetails, PersonDetails, SearchItem, SeasonDetails, SeriesDetails, TmdbClient,
    TmdbError, WatchProviderResults,
};
use crate::db::Store;
use crate::domain::media_key;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Remote(#[from] TmdbError),

    #[error("database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Returns true when an RFC 3339 `fetched_at` is younger than `ttl_days`.
/// Unparseable timestamps count as stale.
fn is_fresh(fetched_at: &str, ttl_days: i64) -> bool {
    chrono::DateTime::parse_from_rfc3339(fetched_at).is_ok_and(|fetched| {
        let age = chrono::Utc::now().signed_duration_since(fetched.with_timezone(&chrono::Utc));
        age < chrono::Duration::days(ttl_days)
    })
}

pub struct CatalogService {
    store: Store,
    tmdb: Arc<TmdbClient>,
    ttl_days: i64,
}

impl CatalogService {
    #[must_use]
    pub const fn new(store: Store, tmdb: Arc<TmdbClient>, ttl_days: i64) -> Self {
        Self {
            store,
            tmdb,
            ttl_days,
        }
    }

    /// Movies are refreshed on every lookup or watch; the snapshot exists so
    /// watch rows always have a local copy to render from.
    pub async fn movie(&self, id: i64) -> Result<MovieDetails, CatalogError> {
        let details = self.tmdb.fetch_movie(id).await?;
        self.store.upsert_movie_snapshot(&details).await?;
        Ok(details)
    }

    pub async fn series(&self, id: i64) -> Result<SeriesDetails, CatalogError> {
        let key = media_key(id);

        if let Some(snapshot) = self.store.get_series_snapshot(&key).await?
            && is_fresh(&snapshot.fetched_at, self.ttl_days)
        {
            match serde_json::from_str::<SeriesDetails>(&snapshot.payload) {
                Ok(details) => {
                    debug!(series_id = %key, "Serving series from fresh snapshot");
                    return Ok(details);
                }
                Err(e) => {
                    warn!(series_id = %key, error = %e, "Corrupt series snapshot; refetching");
                }
            }
        }

        let details = self.tmdb.fetch_series(id).await?;
        self.store.upsert_series_snapshot(&details).await?;
        Ok(details)
    }

    pub async fn season(
        &self,
        series_id: i64,
        season_number: i32,
    ) -> Result<SeasonDetails, CatalogError> {
        let series_key = media_key(series_id);

        if let Some(snapshot) = self
            .store
            .get_season_snapshot_by_number(&series_key, season_number)
            .await?
            && is_fresh(&snapshot.fetched_at, self.ttl_days)
        {
            match serde_json::from_str::<SeasonDetails>(&snapshot.payload) {
                Ok(details) if !details.episodes.is_empty() => {
                    debug!(
                        series_id = %series_key,
                        season_number,
                        "Serving season from fresh snapshot"
                    );
                    return Ok(details);
                }
                // Season rows written from a series fetch carry only the
                // summary; a season page needs the episode list.
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        series_id = %series_key,
                        season_number,
                        error = %e,
                        "Corrupt season snapshot; refetching"
                    );
                }
            }
        }

        let details = self.tmdb.fetch_season(series_id, season_number).await?;
        self.store
            .upsert_season_snapshot(series_id, &details)
            .await?;
        Ok(details)
    }

    pub async fn person(&self, id: i64) -> Result<PersonDetails, CatalogError> {
        Ok(self.tmdb.fetch_person(id).await?)
    }

    pub async fn watch_providers(
        &self,
        kind: MediaKind,
        id: i64,
    ) -> Result<WatchProviderResults, CatalogError> {
        Ok(self.tmdb.fetch_watch_providers(kind, id).await?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchItem>, CatalogError> {
        Ok(self.tmdb.search_multi(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_timestamp_is_fresh() {
        let now = chrono::Utc::now().to_rfc3339();
        assert!(is_fresh(&now, 7));
    }

    #[test]
    fn old_timestamp_is_stale() {
        let old = (chrono::Utc::now() - chrono::Duration::days(8)).to_rfc3339();
        assert!(!is_fresh(&old, 7));
    }

    #[test]
    fn boundary_is_exclusive() {
        let edge = (chrono::Utc::now() - chrono::Duration::days(7)).to_rfc3339();
        assert!(!is_fresh(&edge, 7));
    }

    #[test]
    fn garbage_timestamp_is_stale() {
        assert!(!is_fresh("not-a-date", 7));
    }
}

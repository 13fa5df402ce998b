//! Thin client for the TMDB-compatible catalog API.
//!
//! Returns typed snapshots; any non-2xx response surfaces as
//! [`TmdbError::RemoteFetch`] and the triggering action is expected to abort.
//! No retries here: transport policy belongs to the caller's deployment.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("catalog transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned {status} for {url}")]
    RemoteFetch { status: StatusCode, url: String },

    #[error("catalog resource not found")]
    NotFound,
}

/// Which catalog namespace an ID lives in (movie vs. TV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    #[must_use]
    pub const fn path_segment(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub runtime: Option<i32>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub id: i64,
    pub season_number: i32,
    pub episode_count: i32,
    pub name: String,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesDetails {
    pub id: i64,
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub number_of_seasons: i32,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub id: i64,
    pub episode_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub runtime: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonDetails {
    pub id: i64,
    pub season_number: i32,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub episodes: Vec<EpisodeRef>,
}

impl SeasonDetails {
    /// Episode count as the aggregation engine sees it.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn episode_count(&self) -> i32 {
        self.episodes.len() as i32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonDetails {
    pub id: i64,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchProvider {
    pub provider_id: i64,
    pub provider_name: String,
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryProviders {
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<WatchProvider>,
    #[serde(default)]
    pub rent: Vec<WatchProvider>,
    #[serde(default)]
    pub buy: Vec<WatchProvider>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchProviderResults {
    pub id: Option<i64>,
    #[serde(default)]
    pub results: HashMap<String, CountryProviders>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: i64,
    pub media_type: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub profile_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchItem>,
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_shared_client(Client::new(), base_url, api_key)
    }

    /// Build on a shared reqwest client so all catalog calls pool connections.
    #[must_use]
    pub fn with_shared_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, TmdbError> {
        let sep = if path.contains('?') { '&' } else { '?' };
        let url = format!("{}{}{}api_key={}", self.base_url, path, sep, self.api_key);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TmdbError::NotFound);
        }

        if !response.status().is_success() {
            return Err(TmdbError::RemoteFetch {
                status: response.status(),
                url: format!("{}{}", self.base_url, path),
            });
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn fetch_movie(&self, id: i64) -> Result<MovieDetails, TmdbError> {
        self.get_json(&format!("/movie/{id}")).await
    }

    pub async fn fetch_series(&self, id: i64) -> Result<SeriesDetails, TmdbError> {
        self.get_json(&format!("/tv/{id}")).await
    }

    pub async fn fetch_season(
        &self,
        series_id: i64,
        season_number: i32,
    ) -> Result<SeasonDetails, TmdbError> {
        self.get_json(&format!("/tv/{series_id}/season/{season_number}"))
            .await
    }

    pub async fn fetch_person(&self, id: i64) -> Result<PersonDetails, TmdbError> {
        self.get_json(&format!("/person/{id}")).await
    }

    pub async fn fetch_watch_providers(
        &self,
        kind: MediaKind,
        id: i64,
    ) -> Result<WatchProviderResults, TmdbError> {
        self.get_json(&format!("/{}/{id}/watch/providers", kind.path_segment()))
            .await
    }

    pub async fn search_multi(&self, query: &str) -> Result<Vec<SearchItem>, TmdbError> {
        let page: SearchPage = self
            .get_json(&format!(
                "/search/multi?query={}&include_adult=false",
                urlencoding::encode(query)
            ))
            .await?;

        // People and media share one result list upstream; unknown kinds are
        // dropped rather than surfaced half-typed.
        Ok(page
            .results
            .into_iter()
            .filter(|r| matches!(r.media_type.as_str(), "movie" | "tv" | "person"))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_parses_path_segments() {
        assert_eq!(MediaKind::parse("movie"), Some(MediaKind::Movie));
        assert_eq!(MediaKind::parse("tv"), Some(MediaKind::Tv));
        assert_eq!(MediaKind::parse("person"), None);
    }

    #[test]
    fn season_episode_count_reflects_episode_list() {
        let season = SeasonDetails {
            id: 3624,
            season_number: 1,
            name: "Season 1".to_string(),
            overview: None,
            air_date: None,
            poster_path: None,
            episodes: (1..=8)
                .map(|n| EpisodeRef {
                    id: i64::from(n) + 60000,
                    episode_number: n,
                    name: None,
                    overview: None,
                    air_date: None,
                    runtime: Some(55),
                })
                .collect(),
        };
        assert_eq!(season.episode_count(), 8);
    }
}

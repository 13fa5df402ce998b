//! Engine-level tests for the watch-state aggregation cascade, run against
//! an in-memory SQLite store.

use trackarr::clients::tmdb::{
    EpisodeRef, MovieDetails, SeasonDetails, SeasonSummary, SeriesDetails,
};
use trackarr::db::Store;
use trackarr::domain::{WatchStatus, media_key};
use trackarr::services::{
    SeaOrmWatchService, SeasonUpdateRequest, WatchError, WatchService,
};

/// Seeded by the migrations alongside its stats row.
const ADMIN: i32 = 1;

async fn setup() -> (Store, SeaOrmWatchService) {
    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("in-memory store");
    let engine = SeaOrmWatchService::new(store.clone());
    (store, engine)
}

fn movie(id: i64, runtime: i32) -> MovieDetails {
    MovieDetails {
        id,
        title: format!("Movie {id}"),
        overview: None,
        poster_path: None,
        backdrop_path: None,
        runtime: Some(runtime),
        release_date: Some("2020-01-01".to_string()),
        vote_average: Some(7.5),
        genres: vec![],
    }
}

fn episode(id: i64, number: i32, runtime: i32) -> EpisodeRef {
    EpisodeRef {
        id,
        episode_number: number,
        name: Some(format!("Episode {number}")),
        overview: None,
        air_date: None,
        runtime: Some(runtime),
    }
}

fn season(id: i64, number: i32, episode_count: i32) -> SeasonDetails {
    SeasonDetails {
        id,
        season_number: number,
        name: format!("Season {number}"),
        overview: None,
        air_date: None,
        poster_path: None,
        episodes: (1..=episode_count)
            .map(|n| episode(id * 1000 + i64::from(n), n, 42))
            .collect(),
    }
}

fn series(id: i64, seasons: &[SeasonDetails]) -> SeriesDetails {
    SeriesDetails {
        id,
        name: format!("Series {id}"),
        overview: None,
        poster_path: None,
        backdrop_path: None,
        first_air_date: None,
        number_of_seasons: seasons.len() as i32,
        vote_average: None,
        genres: vec![],
        seasons: seasons
            .iter()
            .map(|s| SeasonSummary {
                id: s.id,
                season_number: s.season_number,
                episode_count: s.episode_count(),
                name: s.name.clone(),
                air_date: None,
                poster_path: None,
            })
            .collect(),
    }
}

fn select_all(season: &SeasonDetails, watched: bool) -> SeasonUpdateRequest {
    SeasonUpdateRequest {
        episode_selections: vec![watched; season.episodes.len()],
        explicit_status: None,
        started: None,
        ended: None,
    }
}

#[tokio::test]
async fn episode_toggle_is_last_write_wins() {
    let (store, engine) = setup().await;
    let ep = episode(9001, 1, 40);

    engine
        .set_episode_watched(ADMIN, &ep, 500, 50, true)
        .await
        .unwrap();
    engine
        .set_episode_watched(ADMIN, &ep, 500, 50, true)
        .await
        .unwrap();

    let rows = store
        .get_episode_watches_for_season(ADMIN, &media_key(500))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    engine
        .set_episode_watched(ADMIN, &ep, 500, 50, false)
        .await
        .unwrap();
    // Unwatching an absent row is a no-op, not an error.
    engine
        .set_episode_watched(ADMIN, &ep, 500, 50, false)
        .await
        .unwrap();

    let rows = store
        .get_episode_watches_for_season(ADMIN, &media_key(500))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn season_update_derives_completion_from_snapshot() {
    let (store, engine) = setup().await;
    let s1 = season(3100, 1, 5);
    let show = series(31, std::slice::from_ref(&s1));
    store.upsert_series_snapshot(&show).await.unwrap();

    let outcome = engine
        .apply_season_update(ADMIN, 31, &s1, select_all(&s1, true))
        .await
        .unwrap();
    assert_eq!(outcome.season.status, WatchStatus::Completed);
    assert_eq!(outcome.season.episodes_watched, 5);

    let completion = engine.is_season_complete(ADMIN, 3100).await.unwrap();
    assert!(completion.complete);
    assert_eq!(completion.episode_count, 5);

    // Partially watched: three of five.
    let request = SeasonUpdateRequest {
        episode_selections: vec![true, true, true, false, false],
        explicit_status: None,
        started: None,
        ended: None,
    };
    let outcome = engine
        .apply_season_update(ADMIN, 31, &s1, request)
        .await
        .unwrap();
    assert_eq!(outcome.season.status, WatchStatus::Watching);
    assert_eq!(outcome.season.episodes_watched, 3);

    let completion = engine.is_season_complete(ADMIN, 3100).await.unwrap();
    assert!(!completion.complete);
    assert_eq!(completion.episode_count, 5);
}

#[tokio::test]
async fn completing_every_season_cascades_to_series() {
    let (store, engine) = setup().await;
    let s1 = season(3200, 1, 3);
    let s2 = season(3201, 2, 4);
    let show = series(32, &[s1.clone(), s2.clone()]);
    store.upsert_series_snapshot(&show).await.unwrap();

    let outcome = engine
        .apply_season_update(ADMIN, 32, &s1, select_all(&s1, true))
        .await
        .unwrap();
    // One of two seasons done: series is watching, not completed.
    assert_eq!(outcome.series.status, WatchStatus::Watching);
    assert!(!engine.is_series_complete(ADMIN, 32).await.unwrap().complete);

    let outcome = engine
        .apply_season_update(ADMIN, 32, &s2, select_all(&s2, true))
        .await
        .unwrap();
    assert_eq!(outcome.series.status, WatchStatus::Completed);

    let completion = engine.is_series_complete(ADMIN, 32).await.unwrap();
    assert!(completion.complete);
    assert_eq!(completion.season_count, 2);

    // The cascade also recomputes the user's series counters.
    let stats = engine.get_user_stats(ADMIN).await.unwrap();
    assert_eq!(stats.series_completed, 1);
    assert_eq!(stats.series_watching, 0);
}

#[tokio::test]
async fn mark_series_completed_builds_all_rows() {
    let (store, engine) = setup().await;
    let seasons = [season(3300, 1, 8), season(3301, 2, 10), season(3302, 3, 6)];
    let show = series(33, &seasons);

    let row = engine.mark_series_completed(ADMIN, &show).await.unwrap();
    assert_eq!(row.status, WatchStatus::Completed);
    assert_eq!(row.season_count, 3);

    let watches = store
        .get_season_watches_for_series(ADMIN, &media_key(33))
        .await
        .unwrap();
    assert_eq!(watches.len(), 3);

    for (season, expected) in seasons.iter().zip([8, 10, 6]) {
        let watch = watches
            .iter()
            .find(|w| w.season_id == media_key(season.id))
            .expect("season watch row");
        assert_eq!(watch.status, WatchStatus::Completed);
        assert_eq!(watch.episodes_watched, expected);
    }

    let stats = engine.get_user_stats(ADMIN).await.unwrap();
    assert_eq!(stats.series_completed, 1);
}

#[tokio::test]
async fn movie_rewatch_increments_and_remove_requires_row() {
    let (store, engine) = setup().await;
    let film = movie(603, 136);

    let first = engine.record_movie_watch(ADMIN, &film).await.unwrap();
    assert_eq!(first.times_watched, 1);
    assert_eq!(first.duration_minutes, 136);

    let second = engine.record_movie_watch(ADMIN, &film).await.unwrap();
    assert_eq!(second.times_watched, 2);
    assert_eq!(second.duration_minutes, 272);

    let rows = store.list_movie_watches(ADMIN).await.unwrap();
    assert_eq!(rows.len(), 1);

    // Recording the watch also cached the movie snapshot.
    let snapshots = store
        .get_movie_snapshots_by_keys(&[media_key(603)])
        .await
        .unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].title, "Movie 603");
    assert_eq!(snapshots[0].runtime_minutes, 136);

    let stats = engine.get_user_stats(ADMIN).await.unwrap();
    assert_eq!(stats.movies_watched, 2);
    assert_eq!(stats.movie_minutes, 272);

    // Removing a never-watched movie is a NotFound, not a silent no-op.
    let err = engine.remove_movie_watch(ADMIN, 999).await.unwrap_err();
    assert!(matches!(err, WatchError::NotFound(_)));

    engine.remove_movie_watch(ADMIN, 603).await.unwrap();
    let stats = engine.get_user_stats(ADMIN).await.unwrap();
    assert_eq!(stats.movies_watched, 0);
    assert_eq!(stats.movie_minutes, 0);
}

#[tokio::test]
async fn remove_series_clears_every_row() {
    let (store, engine) = setup().await;
    let s1 = season(3400, 1, 4);
    let show = series(34, std::slice::from_ref(&s1));
    store.upsert_series_snapshot(&show).await.unwrap();

    engine
        .apply_season_update(ADMIN, 34, &s1, select_all(&s1, true))
        .await
        .unwrap();
    assert!(engine.is_series_complete(ADMIN, 34).await.unwrap().complete);

    engine.remove_series(ADMIN, 34).await.unwrap();

    let completion = engine.is_series_complete(ADMIN, 34).await.unwrap();
    assert!(!completion.complete);
    assert_eq!(completion.season_count, 0);

    let season_rows = store
        .get_season_watches_for_series(ADMIN, &media_key(34))
        .await
        .unwrap();
    assert!(season_rows.is_empty());

    let episode_rows = store
        .get_episode_watches_for_season(ADMIN, &media_key(3400))
        .await
        .unwrap();
    assert!(episode_rows.is_empty());

    let stats = engine.get_user_stats(ADMIN).await.unwrap();
    assert_eq!(stats.episodes_watched, 0);
    assert_eq!(stats.series_completed, 0);

    // Removing again stays idempotent.
    engine.remove_series(ADMIN, 34).await.unwrap();
}

#[tokio::test]
async fn unwatching_a_completed_season_leaves_completed_state() {
    let (store, engine) = setup().await;
    let s1 = season(3500, 1, 6);
    let show = series(35, std::slice::from_ref(&s1));
    store.upsert_series_snapshot(&show).await.unwrap();

    engine
        .apply_season_update(ADMIN, 35, &s1, select_all(&s1, true))
        .await
        .unwrap();
    assert!(engine.is_series_complete(ADMIN, 35).await.unwrap().complete);

    // All-false selections with an explicit PLANNING status.
    let request = SeasonUpdateRequest {
        episode_selections: vec![false; 6],
        explicit_status: Some(WatchStatus::Planning),
        started: None,
        ended: None,
    };
    let outcome = engine
        .apply_season_update(ADMIN, 35, &s1, request)
        .await
        .unwrap();
    assert_eq!(outcome.season.status, WatchStatus::Planning);
    assert_eq!(outcome.season.episodes_watched, 0);
    assert_eq!(outcome.series.status, WatchStatus::Watching);
    assert!(!engine.is_series_complete(ADMIN, 35).await.unwrap().complete);

    // Without an explicit status, zero watched episodes defaults to PLANNING.
    engine
        .apply_season_update(ADMIN, 35, &s1, select_all(&s1, true))
        .await
        .unwrap();
    let outcome = engine
        .apply_season_update(ADMIN, 35, &s1, select_all(&s1, false))
        .await
        .unwrap();
    assert_eq!(outcome.season.status, WatchStatus::Planning);
}

#[tokio::test]
async fn season_dates_default_to_stored_values() {
    let (store, engine) = setup().await;
    let s1 = season(3600, 1, 2);
    let show = series(36, std::slice::from_ref(&s1));
    store.upsert_series_snapshot(&show).await.unwrap();

    let request = SeasonUpdateRequest {
        episode_selections: vec![true, false],
        explicit_status: None,
        started: Some("2024-02-01".to_string()),
        ended: None,
    };
    let outcome = engine
        .apply_season_update(ADMIN, 36, &s1, request)
        .await
        .unwrap();
    assert_eq!(outcome.season.started_at.as_deref(), Some("2024-02-01"));

    // Omitted dates keep what was stored; provided ones overwrite.
    let request = SeasonUpdateRequest {
        episode_selections: vec![true, true],
        explicit_status: None,
        started: None,
        ended: Some("2024-03-01".to_string()),
    };
    let outcome = engine
        .apply_season_update(ADMIN, 36, &s1, request)
        .await
        .unwrap();
    assert_eq!(outcome.season.started_at.as_deref(), Some("2024-02-01"));
    assert_eq!(outcome.season.ended_at.as_deref(), Some("2024-03-01"));
}

#[tokio::test]
async fn episode_totals_recompute_from_rows() {
    let (store, engine) = setup().await;
    let s1 = season(3700, 1, 4);
    let show = series(37, std::slice::from_ref(&s1));
    store.upsert_series_snapshot(&show).await.unwrap();

    engine
        .apply_season_update(ADMIN, 37, &s1, select_all(&s1, true))
        .await
        .unwrap();

    let stats = engine.get_user_stats(ADMIN).await.unwrap();
    assert_eq!(stats.episodes_watched, 4);
    // Fixture episodes run 42 minutes each.
    assert_eq!(stats.episode_minutes, 4 * 42);

    let request = SeasonUpdateRequest {
        episode_selections: vec![true, false, false, false],
        explicit_status: None,
        started: None,
        ended: None,
    };
    engine
        .apply_season_update(ADMIN, 37, &s1, request)
        .await
        .unwrap();

    let stats = engine.get_user_stats(ADMIN).await.unwrap();
    assert_eq!(stats.episodes_watched, 1);
    assert_eq!(stats.episode_minutes, 42);
}

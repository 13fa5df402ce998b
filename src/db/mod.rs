use crate::clients::tmdb::{MovieDetails, SeasonDetails, SeriesDetails};
use crate::entities::{
    episode_watches, movie_snapshots, movie_watches, season_snapshots, season_watches,
    series_snapshots, series_watches, user_stats,
};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::stats::StatsTotals;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn snapshot_repo(&self) -> repositories::snapshots::SnapshotRepository {
        repositories::snapshots::SnapshotRepository::new(self.conn.clone())
    }

    fn watch_repo(&self) -> repositories::watches::WatchRepository {
        repositories::watches::WatchRepository::new(self.conn.clone())
    }

    fn stats_repo(&self) -> repositories::stats::StatsRepository {
        repositories::stats::StatsRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========== Snapshots ==========

    pub async fn upsert_movie_snapshot(&self, details: &MovieDetails) -> Result<()> {
        self.snapshot_repo().upsert_movie(details).await
    }

    pub async fn upsert_series_snapshot(&self, details: &SeriesDetails) -> Result<()> {
        self.snapshot_repo().upsert_series(details).await
    }

    pub async fn upsert_season_snapshot(
        &self,
        series_id: i64,
        details: &SeasonDetails,
    ) -> Result<()> {
        self.snapshot_repo().upsert_season(series_id, details).await
    }

    pub async fn get_movie_snapshots_by_keys(
        &self,
        keys: &[String],
    ) -> Result<Vec<movie_snapshots::Model>> {
        self.snapshot_repo().get_movies_by_keys(keys).await
    }

    pub async fn get_series_snapshot(
        &self,
        series_key: &str,
    ) -> Result<Option<series_snapshots::Model>> {
        self.snapshot_repo().get_series(series_key).await
    }

    pub async fn get_series_snapshots_by_keys(
        &self,
        keys: &[String],
    ) -> Result<Vec<series_snapshots::Model>> {
        self.snapshot_repo().get_series_by_keys(keys).await
    }

    pub async fn get_season_snapshot(
        &self,
        season_key: &str,
    ) -> Result<Option<season_snapshots::Model>> {
        self.snapshot_repo().get_season(season_key).await
    }

    pub async fn get_season_snapshot_by_number(
        &self,
        series_key: &str,
        season_number: i32,
    ) -> Result<Option<season_snapshots::Model>> {
        self.snapshot_repo()
            .get_season_by_number(series_key, season_number)
            .await
    }

    // ========== Watch rows (read side) ==========

    pub async fn get_movie_watch(
        &self,
        user_id: i32,
        movie_key: &str,
    ) -> Result<Option<movie_watches::Model>> {
        self.watch_repo().get_movie_watch(user_id, movie_key).await
    }

    pub async fn list_movie_watches(&self, user_id: i32) -> Result<Vec<movie_watches::Model>> {
        self.watch_repo().list_movie_watches(user_id).await
    }

    pub async fn get_series_watch(
        &self,
        user_id: i32,
        series_key: &str,
    ) -> Result<Option<series_watches::Model>> {
        self.watch_repo().get_series_watch(user_id, series_key).await
    }

    pub async fn list_series_watches(&self, user_id: i32) -> Result<Vec<series_watches::Model>> {
        self.watch_repo().list_series_watches(user_id).await
    }

    pub async fn get_season_watch(
        &self,
        user_id: i32,
        season_key: &str,
    ) -> Result<Option<season_watches::Model>> {
        self.watch_repo().get_season_watch(user_id, season_key).await
    }

    pub async fn get_season_watches_for_series(
        &self,
        user_id: i32,
        series_key: &str,
    ) -> Result<Vec<season_watches::Model>> {
        self.watch_repo()
            .get_season_watches_for_series(user_id, series_key)
            .await
    }

    pub async fn get_episode_watches_for_season(
        &self,
        user_id: i32,
        season_key: &str,
    ) -> Result<Vec<episode_watches::Model>> {
        self.watch_repo()
            .get_episode_watches_for_season(user_id, season_key)
            .await
    }

    // ========== User stats ==========

    pub async fn get_user_stats(&self, user_id: i32) -> Result<Option<user_stats::Model>> {
        self.stats_repo().get(user_id).await
    }

    // ========== Users ==========

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }
}

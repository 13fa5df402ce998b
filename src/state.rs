use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CatalogService, SeaOrmAuthService, SeaOrmWatchService, WatchService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Trackarr/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub tmdb: Arc<TmdbClient>,

    pub catalog: Arc<CatalogService>,

    pub watch_service: Arc<dyn WatchService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client =
            build_shared_http_client(config.catalog.request_timeout_seconds.into())?;

        let tmdb = Arc::new(TmdbClient::with_shared_client(
            http_client,
            config.catalog.base_url.clone(),
            config.catalog.api_key.clone(),
        ));

        let catalog = Arc::new(CatalogService::new(
            store.clone(),
            tmdb.clone(),
            config.catalog.snapshot_ttl_days,
        ));

        let watch_service = Arc::new(SeaOrmWatchService::new(store.clone()))
            as Arc<dyn WatchService + Send + Sync + 'static>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            tmdb,
            catalog,
            watch_service,
            auth_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}

pub mod catalog;
pub use catalog::{CatalogError, CatalogService};

pub mod watch_service;
pub mod watch_service_impl;
pub use watch_service::{
    SeasonCompletion, SeasonUpdateOutcome, SeasonUpdateRequest, SeriesCompletion,
    SeriesWatchState, WatchError, WatchService,
};
pub use watch_service_impl::SeaOrmWatchService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

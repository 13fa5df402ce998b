pub use super::episode_watches::Entity as EpisodeWatches;
pub use super::movie_snapshots::Entity as MovieSnapshots;
pub use super::movie_watches::Entity as MovieWatches;
pub use super::season_snapshots::Entity as SeasonSnapshots;
pub use super::season_watches::Entity as SeasonWatches;
pub use super::series_snapshots::Entity as SeriesSnapshots;
pub use super::series_watches::Entity as SeriesWatches;
pub use super::user_stats::Entity as UserStats;
pub use super::users::Entity as Users;

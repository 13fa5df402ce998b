pub mod prelude;

pub mod episode_watches;
pub mod movie_snapshots;
pub mod movie_watches;
pub mod season_snapshots;
pub mod season_watches;
pub mod series_snapshots;
pub mod series_watches;
pub mod user_stats;
pub mod users;

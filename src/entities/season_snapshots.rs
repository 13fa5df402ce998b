use sea_orm::entity::prelude::*;

/// Cached catalog metadata for one season of a series.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "season_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub season_id: String,

    /// Canonical key of the owning series. Not a foreign key: a season can
    /// be fetched before its series snapshot exists.
    pub series_id: String,
    pub season_number: i32,

    /// Source of truth for season completion math.
    pub episode_count: i32,

    pub payload: String,

    pub fetched_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

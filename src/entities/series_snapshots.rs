use sea_orm::entity::prelude::*;

/// Cached catalog metadata for a series. Stale after seven days; refreshed
/// from the catalog before completion math relies on it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "series_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub series_id: String,

    pub name: String,
    pub season_count: i32,

    pub payload: String,

    pub fetched_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

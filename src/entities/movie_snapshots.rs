use sea_orm::entity::prelude::*;

/// Cached catalog metadata for a movie. Created or refreshed whenever a movie
/// is looked up or watched; never deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movie_snapshots")]
pub struct Model {
    /// Canonical string form of the catalog movie ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub movie_id: String,

    pub title: String,
    pub runtime_minutes: i32,

    /// Full catalog payload as JSON, for rendering without a remote fetch.
    pub payload: String,

    pub fetched_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

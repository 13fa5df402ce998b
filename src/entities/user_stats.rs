use sea_orm::entity::prelude::*;

/// Per-user aggregate counters. Exactly one row per user, created at signup.
/// Values are always recomputed from watch rows, never carried as deltas.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,

    pub movies_watched: i32,
    pub movie_minutes: i64,

    pub episodes_watched: i32,
    pub episode_minutes: i64,

    pub series_completed: i32,
    pub series_watching: i32,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

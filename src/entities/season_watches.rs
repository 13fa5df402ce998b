use crate::domain::WatchStatus;
use sea_orm::entity::prelude::*;

/// One row per (user, season), with a back-reference to the owning series so
/// the series cascade can find its siblings.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "season_watches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub season_id: String,

    pub series_id: String,

    pub status: WatchStatus,

    /// Count of this user's episode-watch rows in the season, recomputed on
    /// every season update.
    pub episodes_watched: i32,

    pub started_at: Option<String>,
    pub ended_at: Option<String>,

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

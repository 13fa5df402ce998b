use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Hash the default password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = b"password";
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password();

        let insert_user = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Username,
                crate::entities::users::Column::PasswordHash,
                crate::entities::users::Column::CreatedAt,
                crate::entities::users::Column::UpdatedAt,
            ])
            .values_panic([
                "admin".into(),
                password_hash.into(),
                now.clone().into(),
                now.clone().into(),
            ])
            .to_owned();

        manager.exec_stmt(insert_user).await?;

        // Stats row exists from signup onward; the seeded admin gets one too.
        let insert_stats = sea_orm_migration::sea_query::Query::insert()
            .into_table(UserStats)
            .columns([
                crate::entities::user_stats::Column::UserId,
                crate::entities::user_stats::Column::MoviesWatched,
                crate::entities::user_stats::Column::MovieMinutes,
                crate::entities::user_stats::Column::EpisodesWatched,
                crate::entities::user_stats::Column::EpisodeMinutes,
                crate::entities::user_stats::Column::SeriesCompleted,
                crate::entities::user_stats::Column::SeriesWatching,
                crate::entities::user_stats::Column::UpdatedAt,
            ])
            .values_panic([
                1.into(),
                0.into(),
                0.into(),
                0.into(),
                0.into(),
                0.into(),
                0.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert_stats).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete_stats = sea_orm_migration::sea_query::Query::delete()
            .from_table(UserStats)
            .and_where(
                Expr::col(crate::entities::user_stats::Column::UserId).eq(1),
            )
            .to_owned();
        manager.exec_stmt(delete_stats).await?;

        let delete_user = sea_orm_migration::sea_query::Query::delete()
            .from_table(Users)
            .and_where(
                Expr::col(crate::entities::users::Column::Username).eq("admin"),
            )
            .to_owned();
        manager.exec_stmt(delete_user).await?;

        Ok(())
    }
}

//! `SeaORM` implementation of the [`AuthService`] trait.

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::repositories::{stats, user};
use crate::entities::users;
use crate::services::auth_service::{AuthError, AuthService, UserInfo};
use sea_orm::TransactionTrait;
use tokio::task;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate_username(username: &str) -> Result<(), AuthError> {
        let trimmed = username.trim();
        if trimmed.len() < 3 || trimmed.len() > 32 {
            return Err(AuthError::Validation(
                "Username must be between 3 and 32 characters".to_string(),
            ));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AuthError::Validation(
                "Username may only contain letters, digits, '-' and '_'".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.len() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }
}

fn user_info(model: &users::Model) -> UserInfo {
    UserInfo {
        id: model.id,
        username: model.username.clone(),
        created_at: model.created_at.clone(),
        updated_at: model.updated_at.clone(),
    }
}

#[async_trait::async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, username: &str, password: &str) -> Result<UserInfo, AuthError> {
        Self::validate_username(username)?;
        self.validate_password(password)?;

        let username = username.trim().to_string();

        if self.store.get_user_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password = password.to_string();
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || {
            user::hash_password(&password, Some(&security))
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))??;

        let created = self
            .store
            .conn
            .transaction::<_, users::Model, AuthError>(move |txn| {
                Box::pin(async move {
                    let now = chrono::Utc::now().to_rfc3339();
                    let model = user::insert_user(txn, &username, &password_hash, &now).await?;
                    stats::insert_stats(txn, model.id, &now).await?;
                    Ok(model)
                })
            })
            .await
            .map_err(|e| {
                // A concurrent signup of the same name loses the unique-key
                // race; surface it the same way as the pre-check.
                match AuthError::from(e) {
                    AuthError::Database(msg) | AuthError::Internal(msg)
                        if msg.contains("UNIQUE") =>
                    {
                        AuthError::UsernameTaken
                    }
                    other => other,
                }
            })?;

        info!(user_id = created.id, username = %created.username, "User registered");
        Ok(user_info(&created))
    }

    async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError> {
        let is_valid = self
            .store
            .verify_user_password(username, password)
            .await
            .map_err(|e| AuthError::Internal(format!("Authentication error: {e}")))?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    async fn get_user_info(&self, username: &str) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.validate_password(new_password)?;

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_user_password(username, current_password)
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification error: {e}")))?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .user_repo()
            .update_password(username, new_password, &self.security)
            .await?;

        info!("Password changed for user: {username}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_usernames() {
        assert!(matches!(
            SeaOrmAuthService::validate_username("ab"),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn rejects_exotic_characters() {
        assert!(matches!(
            SeaOrmAuthService::validate_username("a user!"),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn accepts_reasonable_usernames() {
        assert!(SeaOrmAuthService::validate_username("movie-fan_42").is_ok());
    }
}

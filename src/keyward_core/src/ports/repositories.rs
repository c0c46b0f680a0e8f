use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::user::User;

// UserRepository port trait and errors
#[derive(Debug, Error)]
pub enum UserRepositoryError {
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for UserRepositoryError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
        }
    }
}

/// Keyed access to user aggregates.
///
/// Lookups return `Ok(None)` for an unknown key; only storage failures are errors. A token
/// lookup matches both direct token sets and tokens held by any of the user's clients.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, user_id: &str) -> Result<Option<User>, UserRepositoryError>;
    async fn get_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<User>, UserRepositoryError>;
    async fn get_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<User>, UserRepositoryError>;
    /// Insert or replace the whole aggregate.
    async fn save(&self, user: &User) -> Result<(), UserRepositoryError>;
}

#[async_trait]
impl<R: UserRepository + ?Sized> UserRepository for Arc<R> {
    async fn get_by_id(&self, user_id: &str) -> Result<Option<User>, UserRepositoryError> {
        (**self).get_by_id(user_id).await
    }

    async fn get_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        (**self).get_by_access_token(access_token).await
    }

    async fn get_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        (**self).get_by_refresh_token(refresh_token).await
    }

    async fn save(&self, user: &User) -> Result<(), UserRepositoryError> {
        (**self).save(user).await
    }
}

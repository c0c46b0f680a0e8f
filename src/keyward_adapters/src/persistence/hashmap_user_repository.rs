use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use keyward_core::{User, UserRepository, UserRepositoryError};

/// Process-local repository. Lookups by token scan every stored user.
#[derive(Debug, Default, Clone)]
pub struct HashMapUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl HashMapUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl UserRepository for HashMapUserRepository {
    async fn get_by_id(&self, user_id: &str) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn get_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.holds_access_token(access_token))
            .cloned())
    }

    async fn get_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.holds_refresh_token(refresh_token))
            .cloned())
    }

    async fn save(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.users.write().await;
        users.insert(user.id().to_owned(), user.clone());
        Ok(())
    }
}

use async_trait::async_trait;

use super::domain::AuthUser;
use super::errors::AuthError;

/// Repository abstraction for user persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Returns the user and whether this call created it.
    async fn find_or_create_user(&self, username: &str) -> Result<(AuthUser, bool), AuthError>;
    async fn find_user(&self, id: i32) -> Result<Option<AuthUser>, AuthError>;
    async fn list_users(&self) -> Result<Vec<AuthUser>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<Vec<AuthUser>>, // index + 1 == id
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_or_create_user(&self, username: &str) -> Result<(AuthUser, bool), AuthError> {
            let mut users = self.users.lock().await;
            if let Some(existing) = users.iter().find(|u| u.username == username) {
                return Ok((existing.clone(), false));
            }
            let id = i32::try_from(users.len() + 1).map_err(|e| AuthError::Repository(e.to_string()))?;
            let user = AuthUser { id, username: username.to_string() };
            users.push(user.clone());
            Ok((user, true))
        }

        async fn find_user(&self, id: i32) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().await;
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn list_users(&self) -> Result<Vec<AuthUser>, AuthError> {
            Ok(self.users.lock().await.clone())
        }
    }
}

use sea_orm::{DatabaseConnection, EntityTrait};

use crate::auth::domain::AuthUser;
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_or_create_user(&self, username: &str) -> Result<(AuthUser, bool), AuthError> {
        let (user, created) = models::user::find_or_create(&self.db, username).await?;
        Ok((user.into(), created))
    }

    async fn find_user(&self, id: i32) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(AuthUser::from))
    }

    async fn list_users(&self) -> Result<Vec<AuthUser>, AuthError> {
        let rows = models::user::list(&self.db).await?;
        Ok(rows.into_iter().map(AuthUser::from).collect())
    }
}

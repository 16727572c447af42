use std::collections::HashMap;

use async_trait::async_trait;
use models::work::NewWork;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::errors::ServiceError;
use crate::works::domain::{Vote, Work};
use crate::works::repository::{VoteRepository, WorkRepository};

/// SeaORM-backed Work Store.
pub struct SeaOrmWorkRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl WorkRepository for SeaOrmWorkRepository {
    async fn list(&self) -> Result<Vec<Work>, ServiceError> {
        Ok(models::work::list(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<Work>, ServiceError> {
        models::work::Entity::find_by_id(id).one(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn create(&self, input: &NewWork) -> Result<Work, ServiceError> {
        Ok(models::work::create(&self.db, input).await?)
    }

    async fn update(&self, id: i32, input: &NewWork) -> Result<Work, ServiceError> {
        match models::work::replace(&self.db, id, input).await {
            Ok(w) => Ok(w),
            Err(models::errors::ModelError::NotFound(_)) => Err(ServiceError::not_found("work")),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(models::work::hard_delete(&self.db, id).await?)
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(models::work::count(&self.db).await?)
    }
}

/// SeaORM-backed Vote Store; uniqueness comes from the table's primary key.
pub struct SeaOrmVoteRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl VoteRepository for SeaOrmVoteRepository {
    async fn create_once(&self, user_id: i32, work_id: i32) -> Result<bool, ServiceError> {
        Ok(models::vote::create_once(&self.db, user_id, work_id).await?)
    }

    async fn find(&self, user_id: i32, work_id: i32) -> Result<Option<Vote>, ServiceError> {
        Ok(models::vote::find(&self.db, user_id, work_id).await?)
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(models::vote::count(&self.db).await?)
    }

    async fn list_for_work(&self, work_id: i32) -> Result<Vec<Vote>, ServiceError> {
        Ok(models::vote::list_for_work(&self.db, work_id).await?)
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Vote>, ServiceError> {
        Ok(models::vote::list_for_user(&self.db, user_id).await?)
    }

    async fn tally(&self) -> Result<HashMap<i32, u64>, ServiceError> {
        Ok(models::vote::tally(&self.db).await?)
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use models::work::NewWork;

use super::domain::{Vote, Work};
use crate::errors::ServiceError;

/// Work Store.
#[async_trait]
pub trait WorkRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Work>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<Work>, ServiceError>;
    async fn create(&self, input: &NewWork) -> Result<Work, ServiceError>;
    /// Overwrites every field; `NotFound` when `id` is unknown.
    async fn update(&self, id: i32, input: &NewWork) -> Result<Work, ServiceError>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn count(&self) -> Result<u64, ServiceError>;
}

/// Vote Store, keyed by `(user_id, work_id)`.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Atomic create-or-noop. `true` when a vote was written; `NotFound` when
    /// either side of the pair no longer exists.
    async fn create_once(&self, user_id: i32, work_id: i32) -> Result<bool, ServiceError>;
    async fn find(&self, user_id: i32, work_id: i32) -> Result<Option<Vote>, ServiceError>;
    async fn count(&self) -> Result<u64, ServiceError>;
    async fn list_for_work(&self, work_id: i32) -> Result<Vec<Vote>, ServiceError>;
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Vote>, ServiceError>;
    async fn tally(&self) -> Result<HashMap<i32, u64>, ServiceError>;
}

/// In-memory store for tests and doc examples. Implements both traits on one
/// value so deleting a work drops its votes, like the FK cascade does.
pub mod mock {
    use std::collections::BTreeMap;

    use super::*;
    use chrono::Utc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Tables {
        works: BTreeMap<i32, Work>,
        votes: BTreeMap<(i32, i32), Vote>,
        last_id: i32,
    }

    #[derive(Default)]
    pub struct MemoryStore {
        tables: Mutex<Tables>,
    }

    #[async_trait]
    impl WorkRepository for MemoryStore {
        async fn list(&self) -> Result<Vec<Work>, ServiceError> {
            Ok(self.tables.lock().await.works.values().cloned().collect())
        }

        async fn get(&self, id: i32) -> Result<Option<Work>, ServiceError> {
            Ok(self.tables.lock().await.works.get(&id).cloned())
        }

        async fn create(&self, input: &NewWork) -> Result<Work, ServiceError> {
            models::work::validate_title(&input.title)?;
            let mut t = self.tables.lock().await;
            t.last_id += 1;
            let now = Utc::now().into();
            let work = Work {
                id: t.last_id,
                title: input.title.clone(),
                creator: input.creator.clone(),
                description: input.description.clone(),
                publication_year: input.publication_year,
                category: input.category,
                created_at: now,
                updated_at: now,
            };
            t.works.insert(work.id, work.clone());
            Ok(work)
        }

        async fn update(&self, id: i32, input: &NewWork) -> Result<Work, ServiceError> {
            models::work::validate_title(&input.title)?;
            let mut t = self.tables.lock().await;
            let work = t.works.get_mut(&id).ok_or_else(|| ServiceError::not_found("work"))?;
            work.title = input.title.clone();
            work.creator = input.creator.clone();
            work.description = input.description.clone();
            work.publication_year = input.publication_year;
            work.category = input.category;
            work.updated_at = Utc::now().into();
            Ok(work.clone())
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            let mut t = self.tables.lock().await;
            let removed = t.works.remove(&id).is_some();
            t.votes.retain(|(_, work_id), _| *work_id != id);
            Ok(removed)
        }

        async fn count(&self) -> Result<u64, ServiceError> {
            Ok(self.tables.lock().await.works.len() as u64)
        }
    }

    #[async_trait]
    impl VoteRepository for MemoryStore {
        async fn create_once(&self, user_id: i32, work_id: i32) -> Result<bool, ServiceError> {
            // one lock across check and insert
            let mut t = self.tables.lock().await;
            if !t.works.contains_key(&work_id) {
                return Err(ServiceError::not_found("work"));
            }
            if t.votes.contains_key(&(user_id, work_id)) {
                return Ok(false);
            }
            t.votes.insert((user_id, work_id), Vote { user_id, work_id, created_at: Utc::now().into() });
            Ok(true)
        }

        async fn find(&self, user_id: i32, work_id: i32) -> Result<Option<Vote>, ServiceError> {
            Ok(self.tables.lock().await.votes.get(&(user_id, work_id)).cloned())
        }

        async fn count(&self) -> Result<u64, ServiceError> {
            Ok(self.tables.lock().await.votes.len() as u64)
        }

        async fn list_for_work(&self, work_id: i32) -> Result<Vec<Vote>, ServiceError> {
            let t = self.tables.lock().await;
            Ok(t.votes.values().filter(|v| v.work_id == work_id).cloned().collect())
        }

        async fn list_for_user(&self, user_id: i32) -> Result<Vec<Vote>, ServiceError> {
            let t = self.tables.lock().await;
            Ok(t.votes.values().filter(|v| v.user_id == user_id).cloned().collect())
        }

        async fn tally(&self) -> Result<HashMap<i32, u64>, ServiceError> {
            let t = self.tables.lock().await;
            let mut out = HashMap::new();
            for (_, work_id) in t.votes.keys() {
                *out.entry(*work_id).or_insert(0) += 1;
            }
            Ok(out)
        }
    }
}

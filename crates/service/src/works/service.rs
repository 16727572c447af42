use std::sync::Arc;

use tracing::{info, instrument};

use super::domain::{
    Destination, Landing, Outcome, Vote, Work, WorkDetail, WorkForm, WorkPayload, ALREADY_VOTED, NO_SUCH_WORK, UPVOTED,
};
use super::repository::{VoteRepository, WorkRepository};
use crate::auth::domain::Actor;
use crate::errors::ServiceError;
use models::errors::ModelError;

/// Application service encapsulating the catalogue's business rules.
///
/// Order of checks for every gated operation: actor, then id, then payload.
pub struct WorksService {
    works: Arc<dyn WorkRepository>,
    votes: Arc<dyn VoteRepository>,
    top_n: usize,
}

impl WorksService {
    pub fn new(works: Arc<dyn WorkRepository>, votes: Arc<dyn VoteRepository>, top_n: usize) -> Self {
        Self { works, votes, top_n }
    }

    pub async fn list(&self) -> Result<Vec<Work>, ServiceError> { self.works.list().await }

    #[instrument(skip(self))]
    pub async fn landing(&self) -> Result<Landing, ServiceError> {
        let works = self.works.list().await?;
        let tally = self.votes.tally().await?;
        Ok(Landing::rank(works, &tally, self.top_n))
    }

    async fn find(&self, id: i32) -> Result<Work, ServiceError> {
        self.works.get(id).await?.ok_or_else(|| ServiceError::not_found("work"))
    }

    pub async fn show(&self, id: i32, actor: &Actor) -> Result<WorkDetail, ServiceError> {
        actor.require_user()?;
        let work = self.find(id).await?;
        let votes = self.votes.list_for_work(id).await?;
        Ok(WorkDetail { work, vote_count: votes.len() as u64, votes })
    }

    pub async fn new_form(&self, actor: &Actor) -> Result<WorkForm, ServiceError> {
        actor.require_user()?;
        Ok(WorkForm::new(None))
    }

    pub async fn edit_form(&self, id: i32, actor: &Actor) -> Result<WorkForm, ServiceError> {
        actor.require_user()?;
        Ok(WorkForm::new(Some(self.find(id).await?)))
    }

    #[instrument(skip(self, payload, actor))]
    pub async fn create(&self, payload: &WorkPayload, actor: &Actor) -> Result<(Work, Outcome), ServiceError> {
        let user = actor.require_user()?;
        let input = payload.validate()?;
        let work = self.works.create(&input).await?;
        info!(work_id = work.id, category = work.category.as_str(), user_id = user.id, "work_created");
        let message = format!("Successfully created {} {}", work.category.as_str(), work.id);
        Ok((work.clone(), Outcome::new(Destination::Work(work.id), message)))
    }

    #[instrument(skip(self, payload, actor))]
    pub async fn update(&self, id: i32, payload: &WorkPayload, actor: &Actor) -> Result<(Work, Outcome), ServiceError> {
        let user = actor.require_user()?;
        let existing = self.find(id).await?;
        let input = payload.merge(&existing)?;
        let work = self.works.update(id, &input).await?;
        info!(work_id = work.id, category = work.category.as_str(), user_id = user.id, "work_updated");
        let message = format!("Successfully updated {} {}", work.category.as_str(), work.id);
        Ok((work.clone(), Outcome::new(Destination::Work(work.id), message)))
    }

    #[instrument(skip(self, actor))]
    pub async fn destroy(&self, id: i32, actor: &Actor) -> Result<Outcome, ServiceError> {
        let user = actor.require_user()?;
        let existing = self.find(id).await?;
        if !self.works.delete(id).await? {
            // lost a race with another delete
            return Err(ServiceError::not_found("work"));
        }
        info!(work_id = id, category = existing.category.as_str(), user_id = user.id, "work_destroyed");
        Ok(Outcome::new(Destination::Root, format!("Successfully destroyed {} {}", existing.category.as_str(), id)))
    }

    /// Cast the actor's vote for work `id`, at most once per (user, work).
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::domain::{Actor, AuthUser};
    /// use service::works::{WorksService, domain::WorkPayload, repository::{mock::MemoryStore, VoteRepository}};
    /// let store = Arc::new(MemoryStore::default());
    /// let svc = WorksService::new(store.clone(), store.clone(), 10);
    /// let actor = Actor::User(AuthUser { id: 1, username: "dan".into() });
    /// let payload = WorkPayload { title: Some("Abbey Road".into()), category: Some("album".into()), ..Default::default() };
    /// let (work, _) = tokio_test::block_on(svc.create(&payload, &actor)).unwrap();
    /// let first = tokio_test::block_on(svc.upvote(work.id, &actor)).unwrap();
    /// assert_eq!(first.message, "Successfully upvoted!");
    /// let _second = tokio_test::block_on(svc.upvote(work.id, &actor)).unwrap();
    /// assert_eq!(tokio_test::block_on(store.count()).unwrap(), 1);
    /// ```
    #[instrument(skip(self, actor))]
    pub async fn upvote(&self, id: i32, actor: &Actor) -> Result<Outcome, ServiceError> {
        let user = actor.require_user()?;
        if self.works.get(id).await?.is_none() {
            return Ok(Outcome::new(Destination::Works, NO_SUCH_WORK));
        }
        match self.votes.create_once(user.id, id).await {
            Ok(true) => {
                info!(work_id = id, user_id = user.id, "vote_created");
                Ok(Outcome::new(Destination::Work(id), UPVOTED))
            }
            Ok(false) => {
                info!(work_id = id, user_id = user.id, "vote_duplicate");
                Ok(Outcome::new(Destination::Work(id), ALREADY_VOTED))
            }
            // work deleted meanwhile, or a session for a user row that is gone
            Err(ServiceError::NotFound(_)) | Err(ServiceError::Model(ModelError::NotFound(_))) => {
                info!(work_id = id, user_id = user.id, "vote_dangling");
                Ok(Outcome::new(Destination::Works, NO_SUCH_WORK))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn votes_by_user(&self, user_id: i32) -> Result<Vec<Vote>, ServiceError> {
        self.votes.list_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::AuthUser;
    use crate::test_support::{payload, seed};
    use crate::works::repository::mock::MemoryStore;
    use models::Category;

    const INVALID_CATEGORIES: [&str; 7] = ["nope", "42", "", "  ", "albumstrailingtext", "albums", "Movie"];

    fn setup() -> (WorksService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (WorksService::new(store.clone(), store.clone(), 10), store)
    }

    fn grace() -> Actor {
        Actor::User(AuthUser { id: 1, username: "grace".into() })
    }

    fn dan() -> Actor {
        Actor::User(AuthUser { id: 2, username: "dan".into() })
    }

    async fn work_count(store: &MemoryStore) -> u64 { WorkRepository::count(store).await.unwrap() }
    async fn vote_count(store: &MemoryStore) -> u64 { VoteRepository::count(store).await.unwrap() }

    #[tokio::test]
    async fn list_succeeds_with_and_without_works() {
        let (svc, store) = setup();
        assert!(svc.list().await.unwrap().is_empty());
        seed(store.as_ref()).await;
        assert_eq!(svc.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn create_persists_every_field() {
        let (svc, store) = setup();
        let (work, outcome) = svc.create(&payload("Eat, Love, Pray", "book"), &grace()).await.unwrap();
        assert_eq!(work_count(&store).await, 1);
        assert_eq!(work.title, "Eat, Love, Pray");
        assert_eq!(work.creator.as_deref(), Some("Elizabeth Gilbert"));
        assert_eq!(work.description.as_deref(), Some("Memoir"));
        assert_eq!(work.publication_year, Some(2004));
        assert_eq!(work.category, Category::Book);
        assert_eq!(outcome.destination, Destination::Work(work.id));
        assert_eq!(outcome.message, format!("Successfully created book {}", work.id));
    }

    #[tokio::test]
    async fn create_without_title_is_rejected() {
        let (svc, store) = setup();
        for title in [None, Some(""), Some("   ")] {
            let p = WorkPayload { title: title.map(str::to_string), ..payload("x", "book") };
            let err = svc.create(&p, &grace()).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_) | ServiceError::Model(_)), "{err:?}");
        }
        assert_eq!(work_count(&store).await, 0);
    }

    #[tokio::test]
    async fn create_with_bogus_category_is_rejected() {
        let (svc, store) = setup();
        for bad in INVALID_CATEGORIES {
            let err = svc.create(&payload("Eat, Love, Pray", bad), &grace()).await.unwrap_err();
            assert!(matches!(err, ServiceError::Model(models::errors::ModelError::Validation(_))), "{bad:?}");
        }
        let missing = WorkPayload { category: None, ..payload("Eat, Love, Pray", "book") };
        assert!(matches!(svc.create(&missing, &grace()).await, Err(ServiceError::Validation(_))));
        assert_eq!(work_count(&store).await, 0);
    }

    #[tokio::test]
    async fn guest_is_forbidden_everywhere() {
        let (svc, store) = setup();
        let f = seed(store.as_ref()).await;
        let guest = Actor::Guest;

        assert!(matches!(svc.new_form(&guest).await, Err(ServiceError::Forbidden)));
        assert!(matches!(svc.create(&payload("x", "book"), &guest).await, Err(ServiceError::Forbidden)));
        assert!(matches!(svc.create(&WorkPayload::default(), &guest).await, Err(ServiceError::Forbidden)));
        for id in [f.poodr.id, -1] {
            assert!(matches!(svc.show(id, &guest).await, Err(ServiceError::Forbidden)));
            assert!(matches!(svc.edit_form(id, &guest).await, Err(ServiceError::Forbidden)));
            assert!(matches!(svc.update(id, &payload("x", "book"), &guest).await, Err(ServiceError::Forbidden)));
            assert!(matches!(svc.destroy(id, &guest).await, Err(ServiceError::Forbidden)));
            assert!(matches!(svc.upvote(id, &guest).await, Err(ServiceError::Forbidden)));
        }
        assert_eq!(work_count(&store).await, 3);
        assert_eq!(vote_count(&store).await, 0);
        assert_eq!(svc.show(f.poodr.id, &grace()).await.unwrap().work, f.poodr);
    }

    #[tokio::test]
    async fn bogus_ids_are_not_found() {
        let (svc, store) = setup();
        seed(store.as_ref()).await;
        assert!(matches!(svc.show(-1, &grace()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.edit_form(-1, &grace()).await, Err(ServiceError::NotFound(_))));
        // id resolution happens before payload validation
        assert!(matches!(svc.update(-1, &WorkPayload::default(), &grace()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.destroy(-1, &grace()).await, Err(ServiceError::NotFound(_))));
        assert_eq!(work_count(&store).await, 3);
    }

    #[tokio::test]
    async fn update_overwrites_sent_fields() {
        let (svc, store) = setup();
        let f = seed(store.as_ref()).await;
        let p = WorkPayload { creator: Some(Some("Sandi Metz".into())), description: None, publication_year: None, ..payload("POODR 2e", "book") };
        let (work, outcome) = svc.update(f.poodr.id, &p, &grace()).await.unwrap();
        assert_eq!(work.title, "POODR 2e");
        assert_eq!(work.creator.as_deref(), Some("Sandi Metz"));
        // not sent, so kept
        assert_eq!(work.description, f.poodr.description);
        assert_eq!(work.publication_year, f.poodr.publication_year);
        assert_eq!(outcome.destination, Destination::Work(f.poodr.id));
        assert_eq!(work_count(&store).await, 3);
    }

    #[tokio::test]
    async fn invalid_update_changes_nothing() {
        let (svc, store) = setup();
        let f = seed(store.as_ref()).await;
        let mut attempts = vec![WorkPayload { title: None, ..payload("x", "movie") }, WorkPayload { title: Some(String::new()), ..payload("x", "movie") }];
        attempts.extend(INVALID_CATEGORIES.iter().map(|c| payload("New title", c)));
        for p in attempts {
            assert!(svc.update(f.poodr.id, &p, &grace()).await.is_err());
            let after = store.get(f.poodr.id).await.unwrap().unwrap();
            assert_eq!(after, f.poodr);
        }
    }

    #[tokio::test]
    async fn destroy_removes_exactly_one() {
        let (svc, store) = setup();
        let f = seed(store.as_ref()).await;
        let outcome = svc.destroy(f.poodr.id, &grace()).await.unwrap();
        assert_eq!(outcome.message, format!("Successfully destroyed book {}", f.poodr.id));
        assert_eq!(outcome.destination, Destination::Root);
        assert_eq!(work_count(&store).await, 2);
        assert!(store.get(f.poodr.id).await.unwrap().is_none());
        assert!(matches!(svc.destroy(f.poodr.id, &grace()).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn upvote_is_idempotent_per_user_and_work() {
        let (svc, store) = setup();
        let f = seed(store.as_ref()).await;

        let first = svc.upvote(f.another_album.id, &dan()).await.unwrap();
        assert_eq!(first.message, UPVOTED);
        assert_eq!(vote_count(&store).await, 1);

        let again = svc.upvote(f.another_album.id, &dan()).await.unwrap();
        assert_eq!(again.message, ALREADY_VOTED);
        assert_ne!(again.message, first.message);
        assert_eq!(again.destination, Destination::Work(f.another_album.id));
        assert_eq!(vote_count(&store).await, 1);

        // another user may still vote for it
        svc.upvote(f.another_album.id, &grace()).await.unwrap();
        assert_eq!(vote_count(&store).await, 2);
        assert_eq!(svc.show(f.another_album.id, &dan()).await.unwrap().vote_count, 2);
        assert_eq!(svc.votes_by_user(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upvote_on_missing_work_is_a_redirecting_noop() {
        let (svc, store) = setup();
        let outcome = svc.upvote(-1, &dan()).await.unwrap();
        assert_eq!(outcome, Outcome::new(Destination::Works, NO_SUCH_WORK));
        assert_eq!(vote_count(&store).await, 0);
    }

    #[tokio::test]
    async fn concurrent_upvotes_write_one_vote() {
        let (svc, store) = setup();
        let f = seed(store.as_ref()).await;
        let svc = Arc::new(svc);
        let mut handles = Vec::new();
        for _ in 0..16 {
            let svc = svc.clone();
            let id = f.movie.id;
            handles.push(tokio::spawn(async move { svc.upvote(id, &dan()).await }));
        }
        let mut upvoted = 0;
        for h in handles {
            if h.await.unwrap().unwrap().message == UPVOTED {
                upvoted += 1;
            }
        }
        assert_eq!(upvoted, 1);
        assert_eq!(vote_count(&store).await, 1);
    }

    #[tokio::test]
    async fn destroying_a_work_drops_its_votes() {
        let (svc, store) = setup();
        let f = seed(store.as_ref()).await;
        svc.upvote(f.movie.id, &dan()).await.unwrap();
        svc.destroy(f.movie.id, &grace()).await.unwrap();
        assert_eq!(vote_count(&store).await, 0);
    }

    #[tokio::test]
    async fn landing_ranks_by_votes_and_keeps_empty_categories() {
        let (svc, store) = setup();
        let empty = svc.landing().await.unwrap();
        assert!(empty.spotlight.is_none());
        assert_eq!(empty.top.len(), 3);
        assert!(empty.top.values().all(Vec::is_empty));

        let f = seed(store.as_ref()).await;
        svc.upvote(f.movie.id, &dan()).await.unwrap();
        svc.upvote(f.movie.id, &grace()).await.unwrap();
        svc.upvote(f.another_album.id, &dan()).await.unwrap();

        let landing = svc.landing().await.unwrap();
        let spotlight = landing.spotlight.unwrap();
        assert_eq!(spotlight.work.id, f.movie.id);
        assert_eq!(spotlight.votes, 2);
        assert_eq!(landing.top[&Category::Book][0].votes, 0);
        assert_eq!(landing.top[&Category::Album][0].work.id, f.another_album.id);

        svc.destroy(f.poodr.id, &grace()).await.unwrap();
        let two_categories = svc.landing().await.unwrap();
        assert!(two_categories.top[&Category::Book].is_empty());
    }

    #[tokio::test]
    async fn landing_caps_each_category() {
        let store = Arc::new(MemoryStore::default());
        let svc = WorksService::new(store.clone(), store.clone(), 2);
        for i in 0..5 {
            svc.create(&payload(&format!("Book {i}"), "book"), &grace()).await.unwrap();
        }
        let landing = svc.landing().await.unwrap();
        let ids: Vec<i32> = landing.top[&Category::Book].iter().map(|r| r.work.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn forms_list_the_categories() {
        let (svc, store) = setup();
        let f = seed(store.as_ref()).await;
        let blank = svc.new_form(&grace()).await.unwrap();
        assert!(blank.work.is_none());
        assert_eq!(blank.categories, Category::ALL.to_vec());
        let edit = svc.edit_form(f.movie.id, &grace()).await.unwrap();
        assert_eq!(edit.work, Some(f.movie));
    }

    /// Vote store whose rows reference a user that no longer exists.
    struct DanglingVotes;

    #[async_trait::async_trait]
    impl VoteRepository for DanglingVotes {
        async fn create_once(&self, _user_id: i32, _work_id: i32) -> Result<bool, ServiceError> {
            Err(ServiceError::Model(ModelError::NotFound("violates foreign key constraint \"fk_vote_user\"".into())))
        }
        async fn find(&self, _: i32, _: i32) -> Result<Option<Vote>, ServiceError> { Ok(None) }
        async fn count(&self) -> Result<u64, ServiceError> { Ok(0) }
        async fn list_for_work(&self, _: i32) -> Result<Vec<Vote>, ServiceError> { Ok(Vec::new()) }
        async fn list_for_user(&self, _: i32) -> Result<Vec<Vote>, ServiceError> { Ok(Vec::new()) }
        async fn tally(&self) -> Result<std::collections::HashMap<i32, u64>, ServiceError> { Ok(Default::default()) }
    }

    #[tokio::test]
    async fn upvote_with_a_vanished_user_redirects_instead_of_failing() {
        let store = Arc::new(MemoryStore::default());
        let f = seed(store.as_ref()).await;
        let svc = WorksService::new(store, Arc::new(DanglingVotes), 10);
        let outcome = svc.upvote(f.movie.id, &dan()).await.unwrap();
        assert_eq!(outcome, Outcome::new(Destination::Works, NO_SUCH_WORK));
    }

    #[tokio::test]
    async fn memory_store_reports_votes_for_missing_works_as_not_found() {
        let store = MemoryStore::default();
        assert!(matches!(store.create_once(1, 42).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn long_creator_is_stored_and_null_clears_it() {
        let (svc, store) = setup();
        let long = "x".repeat(300);
        let p = WorkPayload { creator: Some(Some(long.clone())), ..payload("T", "book") };
        let (work, _) = svc.create(&p, &grace()).await.unwrap();
        assert_eq!(work.creator.as_deref(), Some(long.as_str()));

        let clear = WorkPayload { creator: Some(None), description: None, publication_year: Some(None), ..payload("T", "book") };
        let (updated, _) = svc.update(work.id, &clear, &grace()).await.unwrap();
        assert_eq!(updated.creator, None);
        assert_eq!(updated.publication_year, None);
        assert_eq!(updated.description.as_deref(), Some("Memoir"));
        assert_eq!(work_count(&store).await, 1);
    }
}

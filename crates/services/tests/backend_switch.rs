//! A database that drops out after users have signed in.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use career_core::model::{
    CareerTitle, CompletedStep, Email, FavoriteJob, Grade, JobTitle, NewQuizResult, NewUser,
    QuizResult, QuizResultId, SearchEntry, SearchQuery, StepIndex, User, UserId, ViewedCareer,
};
use career_core::time::fixed_now;
use serde_json::json;
use services::{AppServices, Clock, CredentialHasher};
use storage::repository::{
    ActivityRepository, Backend, FavoriteRepository, InMemoryRepository, QuizRepository,
    SessionRepository, StepRepository, Storage, StorageError, UserInsert, UserRepository,
};
use storage::{Availability, StoreAvailability};

/// Stands in for the database: answers from its own tables until `trip` is
/// set, then fails the next call as a lost connection.
#[derive(Default)]
struct FlakyDatabase {
    tables: InMemoryRepository,
    trip: AtomicBool,
}

impl FlakyDatabase {
    fn gate(&self) -> Result<&InMemoryRepository, StorageError> {
        if self.trip.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Connection("pool timed out".into()));
        }
        Ok(&self.tables)
    }
}

#[async_trait]
impl UserRepository for FlakyDatabase {
    async fn insert_user(&self, user: NewUser) -> Result<UserInsert, StorageError> {
        self.gate()?.insert_user(user).await
    }
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        self.gate()?.find_by_email(email).await
    }
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        self.gate()?.get_user(id).await
    }
    async fn update_user(&self, user: &User) -> Result<(), StorageError> {
        self.gate()?.update_user(user).await
    }
}

#[async_trait]
impl QuizRepository for FlakyDatabase {
    async fn append_result(&self, result: NewQuizResult) -> Result<QuizResultId, StorageError> {
        self.gate()?.append_result(result).await
    }
    async fn results_for_user(&self, user_id: UserId) -> Result<Vec<QuizResult>, StorageError> {
        self.gate()?.results_for_user(user_id).await
    }
    async fn count_for_user(&self, user_id: UserId) -> Result<u64, StorageError> {
        self.gate()?.count_for_user(user_id).await
    }
    async fn clear_for_user(&self, user_id: UserId) -> Result<u64, StorageError> {
        self.gate()?.clear_for_user(user_id).await
    }
}

#[async_trait]
impl StepRepository for FlakyDatabase {
    async fn mark_completed(&self, step: &CompletedStep) -> Result<(), StorageError> {
        self.gate()?.mark_completed(step).await
    }
    async fn unmark_completed(
        &self,
        user_id: UserId,
        career: &CareerTitle,
        step: StepIndex,
    ) -> Result<u64, StorageError> {
        self.gate()?.unmark_completed(user_id, career, step).await
    }
    async fn completed_steps(
        &self,
        user_id: UserId,
        career: &CareerTitle,
    ) -> Result<Vec<StepIndex>, StorageError> {
        self.gate()?.completed_steps(user_id, career).await
    }
}

#[async_trait]
impl FavoriteRepository for FlakyDatabase {
    async fn add_favorite(&self, favorite: &FavoriteJob) -> Result<(), StorageError> {
        self.gate()?.add_favorite(favorite).await
    }
    async fn remove_favorite(
        &self,
        user_id: UserId,
        title: &JobTitle,
    ) -> Result<u64, StorageError> {
        self.gate()?.remove_favorite(user_id, title).await
    }
    async fn favorites(&self, user_id: UserId) -> Result<Vec<JobTitle>, StorageError> {
        self.gate()?.favorites(user_id).await
    }
}

#[async_trait]
impl ActivityRepository for FlakyDatabase {
    async fn record_view(&self, view: &ViewedCareer) -> Result<bool, StorageError> {
        self.gate()?.record_view(view).await
    }
    async fn recent_views(&self, user_id: UserId) -> Result<Vec<CareerTitle>, StorageError> {
        self.gate()?.recent_views(user_id).await
    }
    async fn record_search(&self, search: &SearchEntry) -> Result<bool, StorageError> {
        self.gate()?.record_search(search).await
    }
    async fn recent_searches(&self, user_id: UserId) -> Result<Vec<SearchQuery>, StorageError> {
        self.gate()?.recent_searches(user_id).await
    }
}

#[tokio::test]
async fn session_from_before_the_switch_cannot_read_new_users_data() {
    let database = Arc::new(FlakyDatabase::default());
    let database_sessions = InMemoryRepository::new();
    let availability = StoreAvailability::new(Availability::Available);
    let storage = Storage::with_fallback(
        Some(Arc::clone(&database) as Arc<dyn Backend>),
        Some(Arc::new(database_sessions.clone()) as Arc<dyn SessionRepository>),
        InMemoryRepository::new(),
        availability.clone(),
    );
    let app = AppServices::new(
        storage,
        Clock::fixed(fixed_now()),
        CredentialHasher::with_cost(8, 1, 1).expect("params"),
    );

    let alice = app
        .auth()
        .register("Alice", "alice@x.com", "p", Some(Grade::Tenth))
        .await
        .expect("register alice");
    let alice_session = app.sessions().start(&alice).await.expect("alice session");

    database.trip.store(true, Ordering::SeqCst);
    app.quiz()
        .history(&alice_session.user)
        .await
        .expect("history served from memory");
    assert_eq!(availability.get(), Availability::Unavailable);
    assert_eq!(app.storage_mode(), "in-memory");

    let bob = app
        .auth()
        .register("Bob", "bob@x.com", "p", Some(Grade::Eleventh))
        .await
        .expect("register bob");
    let bob_session = app.sessions().start(&bob).await.expect("bob session");
    app.quiz()
        .save(&bob_session.user, json!({ "q1": "b" }), json!(["Pilot"]))
        .await
        .expect("bob saves a quiz");

    // Alice's session still sits in the database session table, but it names
    // a user id from the other store and must not resolve.
    assert!(database_sessions
        .load_session(&alice_session.id, fixed_now())
        .await
        .expect("raw lookup")
        .is_some());
    assert_eq!(
        app.sessions().load(&alice_session.id).await.expect("load"),
        None
    );

    let bob_again = app
        .sessions()
        .load(&bob_session.id)
        .await
        .expect("load")
        .expect("bob stays signed in");
    assert_eq!(bob_again.user.email.as_str(), "bob@x.com");
    assert_eq!(
        app.quiz().history(&bob_again.user).await.expect("history").len(),
        1
    );
}

//! Routes every data query to the relational backend or the in-memory store.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use career_core::model::{
    CareerTitle, CompletedStep, Email, FavoriteJob, JobTitle, NewQuizResult, NewUser, QuizResult,
    QuizResultId, SearchEntry, SearchQuery, StepIndex, User, UserId, ViewedCareer,
};
use tracing::{debug, warn};

use crate::availability::StoreAvailability;
use crate::repository::{
    ActivityRepository, Backend, FavoriteRepository, InMemoryRepository, QuizRepository,
    SessionRepository, StepRepository, Storage, StorageError, UserInsert, UserRepository,
};
use crate::session_store::FallbackSessionStore;

/// Chooses a backend per call based on the shared availability flag.
///
/// A connectivity failure on the relational backend flips the flag and the
/// same call is retried once against memory. Any other error is returned
/// as-is.
#[derive(Clone)]
pub struct DispatchingRepository {
    primary: Option<Arc<dyn Backend>>,
    memory: InMemoryRepository,
    availability: StoreAvailability,
}

impl DispatchingRepository {
    #[must_use]
    pub fn new(
        primary: Option<Arc<dyn Backend>>,
        memory: InMemoryRepository,
        availability: StoreAvailability,
    ) -> Self {
        Self {
            primary,
            memory,
            availability,
        }
    }

    fn active_primary(&self) -> Option<Arc<dyn Backend>> {
        self.primary
            .as_ref()
            .filter(|_| self.availability.is_available())
            .map(Arc::clone)
    }

    async fn route<T, P, PF, M, MF>(
        &self,
        op: &'static str,
        on_primary: P,
        on_memory: M,
    ) -> Result<T, StorageError>
    where
        P: FnOnce(Arc<dyn Backend>) -> PF,
        PF: Future<Output = Result<T, StorageError>>,
        M: FnOnce(InMemoryRepository) -> MF,
        MF: Future<Output = Result<T, StorageError>>,
    {
        if let Some(primary) = self.active_primary() {
            match on_primary(primary).await {
                Err(err) if err.is_connectivity() => {
                    if self.availability.mark_unavailable() {
                        warn!(op, error = %err, "relational store failed; switching to in-memory store");
                    } else {
                        debug!(op, error = %err, "relational store failed; serving from memory");
                    }
                }
                other => return other,
            }
        }
        on_memory(self.memory.clone()).await
    }
}

#[async_trait]
impl UserRepository for DispatchingRepository {
    async fn insert_user(&self, user: NewUser) -> Result<UserInsert, StorageError> {
        let retry = user.clone();
        self.route(
            "insert_user",
            |p| async move { p.insert_user(user).await },
            |m| async move { m.insert_user(retry).await },
        )
        .await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        self.route(
            "find_by_email",
            |p| async move { p.find_by_email(email).await },
            |m| async move { m.find_by_email(email).await },
        )
        .await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        self.route(
            "get_user",
            |p| async move { p.get_user(id).await },
            |m| async move { m.get_user(id).await },
        )
        .await
    }

    async fn update_user(&self, user: &User) -> Result<(), StorageError> {
        self.route(
            "update_user",
            |p| async move { p.update_user(user).await },
            |m| async move { m.update_user(user).await },
        )
        .await
    }
}

#[async_trait]
impl QuizRepository for DispatchingRepository {
    async fn append_result(&self, result: NewQuizResult) -> Result<QuizResultId, StorageError> {
        let retry = result.clone();
        self.route(
            "append_result",
            |p| async move { p.append_result(result).await },
            |m| async move { m.append_result(retry).await },
        )
        .await
    }

    async fn results_for_user(&self, user_id: UserId) -> Result<Vec<QuizResult>, StorageError> {
        self.route(
            "results_for_user",
            |p| async move { p.results_for_user(user_id).await },
            |m| async move { m.results_for_user(user_id).await },
        )
        .await
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<u64, StorageError> {
        self.route(
            "count_for_user",
            |p| async move { p.count_for_user(user_id).await },
            |m| async move { m.count_for_user(user_id).await },
        )
        .await
    }

    async fn clear_for_user(&self, user_id: UserId) -> Result<u64, StorageError> {
        self.route(
            "clear_for_user",
            |p| async move { p.clear_for_user(user_id).await },
            |m| async move { m.clear_for_user(user_id).await },
        )
        .await
    }
}

#[async_trait]
impl StepRepository for DispatchingRepository {
    async fn mark_completed(&self, step: &CompletedStep) -> Result<(), StorageError> {
        self.route(
            "mark_completed",
            |p| async move { p.mark_completed(step).await },
            |m| async move { m.mark_completed(step).await },
        )
        .await
    }

    async fn unmark_completed(
        &self,
        user_id: UserId,
        career: &CareerTitle,
        step: StepIndex,
    ) -> Result<u64, StorageError> {
        self.route(
            "unmark_completed",
            |p| async move { p.unmark_completed(user_id, career, step).await },
            |m| async move { m.unmark_completed(user_id, career, step).await },
        )
        .await
    }

    async fn completed_steps(
        &self,
        user_id: UserId,
        career: &CareerTitle,
    ) -> Result<Vec<StepIndex>, StorageError> {
        self.route(
            "completed_steps",
            |p| async move { p.completed_steps(user_id, career).await },
            |m| async move { m.completed_steps(user_id, career).await },
        )
        .await
    }
}

#[async_trait]
impl FavoriteRepository for DispatchingRepository {
    async fn add_favorite(&self, favorite: &FavoriteJob) -> Result<(), StorageError> {
        self.route(
            "add_favorite",
            |p| async move { p.add_favorite(favorite).await },
            |m| async move { m.add_favorite(favorite).await },
        )
        .await
    }

    async fn remove_favorite(
        &self,
        user_id: UserId,
        title: &JobTitle,
    ) -> Result<u64, StorageError> {
        self.route(
            "remove_favorite",
            |p| async move { p.remove_favorite(user_id, title).await },
            |m| async move { m.remove_favorite(user_id, title).await },
        )
        .await
    }

    async fn favorites(&self, user_id: UserId) -> Result<Vec<JobTitle>, StorageError> {
        self.route(
            "favorites",
            |p| async move { p.favorites(user_id).await },
            |m| async move { m.favorites(user_id).await },
        )
        .await
    }
}

#[async_trait]
impl ActivityRepository for DispatchingRepository {
    async fn record_view(&self, view: &ViewedCareer) -> Result<bool, StorageError> {
        self.route(
            "record_view",
            |p| async move { p.record_view(view).await },
            |m| async move { m.record_view(view).await },
        )
        .await
    }

    async fn recent_views(&self, user_id: UserId) -> Result<Vec<CareerTitle>, StorageError> {
        self.route(
            "recent_views",
            |p| async move { p.recent_views(user_id).await },
            |m| async move { m.recent_views(user_id).await },
        )
        .await
    }

    async fn record_search(&self, search: &SearchEntry) -> Result<bool, StorageError> {
        self.route(
            "record_search",
            |p| async move { p.record_search(search).await },
            |m| async move { m.record_search(search).await },
        )
        .await
    }

    async fn recent_searches(&self, user_id: UserId) -> Result<Vec<SearchQuery>, StorageError> {
        self.route(
            "recent_searches",
            |p| async move { p.recent_searches(user_id).await },
            |m| async move { m.recent_searches(user_id).await },
        )
        .await
    }
}

impl Storage {
    /// Build storage that prefers `primary` while `availability` says it is
    /// reachable and falls back to `memory` otherwise.
    ///
    /// The session store is chosen once, here: with a reachable primary its
    /// session operations are wrapped with an in-memory fallback; otherwise
    /// sessions live in memory only. Either way each session records the
    /// store that was active when it was issued.
    #[must_use]
    pub fn with_fallback(
        primary: Option<Arc<dyn Backend>>,
        primary_sessions: Option<Arc<dyn SessionRepository>>,
        memory: InMemoryRepository,
        availability: StoreAvailability,
    ) -> Self {
        let sessions: Arc<dyn SessionRepository> = match primary_sessions {
            Some(store) if availability.is_available() => {
                Arc::new(FallbackSessionStore::new(
                    store,
                    memory.clone(),
                    availability.clone(),
                ))
            }
            _ => Arc::new(memory.clone()),
        };
        let dispatcher = DispatchingRepository::new(primary, memory, availability.clone());
        Self {
            users: Arc::new(dispatcher.clone()),
            quizzes: Arc::new(dispatcher.clone()),
            steps: Arc::new(dispatcher.clone()),
            favorites: Arc::new(dispatcher.clone()),
            activity: Arc::new(dispatcher),
            sessions,
            availability,
        }
    }
}

use async_trait::async_trait;
use career_core::model::{
    CareerTitle, CompletedStep, Email, FavoriteJob, JobTitle, NewQuizResult, NewUser, QuizResult,
    QuizResultId, RECENT_ACTIVITY_LIMIT, SearchEntry, SearchQuery, SessionId, SessionUser,
    StepIndex, User, UserId, ViewedCareer,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::availability::{Availability, StoreAvailability, StoreKind};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    /// The backend is reachable but did not answer in time, e.g. the pool is
    /// saturated. Not a reason to abandon it.
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// True when the backend itself could not be reached, as opposed to the
    /// backend rejecting a well-formed request.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, StorageError::Connection(_))
    }
}

/// Result of inserting a user whose email may already be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInsert {
    Created(User),
    /// A user with the same email already exists; it is returned unchanged.
    Existing(User),
}

impl UserInsert {
    #[must_use]
    pub fn into_user(self) -> User {
        match self {
            UserInsert::Created(user) | UserInsert::Existing(user) => user,
        }
    }
}

/// Persisted shape of a server-side session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
    /// Store that issued `user.id`; ids are only meaningful there.
    pub store: StoreKind,
}

impl SessionRecord {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// When the email is already registered the existing row is returned as
    /// `UserInsert::Existing` and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn insert_user(&self, user: NewUser) -> Result<UserInsert, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Persist the mutable profile fields (name, grade).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist.
    async fn update_user(&self, user: &User) -> Result<(), StorageError>;
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Append a quiz submission to the user's history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: NewQuizResult) -> Result<QuizResultId, StorageError>;

    /// Results for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn results_for_user(&self, user_id: UserId) -> Result<Vec<QuizResult>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn count_for_user(&self, user_id: UserId) -> Result<u64, StorageError>;

    /// Remove the whole history of a user; returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear_for_user(&self, user_id: UserId) -> Result<u64, StorageError>;
}

#[async_trait]
pub trait StepRepository: Send + Sync {
    /// Mark a step complete, refreshing `completed_at` if it already was.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the step cannot be stored.
    async fn mark_completed(&self, step: &CompletedStep) -> Result<(), StorageError>;

    /// Remove a completion; a missing row is a no-op returning 0.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn unmark_completed(
        &self,
        user_id: UserId,
        career: &CareerTitle,
        step: StepIndex,
    ) -> Result<u64, StorageError>;

    /// Completed step indexes for a career, ascending.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn completed_steps(
        &self,
        user_id: UserId,
        career: &CareerTitle,
    ) -> Result<Vec<StepIndex>, StorageError>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the favorite cannot be stored.
    async fn add_favorite(&self, favorite: &FavoriteJob) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn remove_favorite(&self, user_id: UserId, title: &JobTitle)
    -> Result<u64, StorageError>;

    /// Favorites for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn favorites(&self, user_id: UserId) -> Result<Vec<JobTitle>, StorageError>;
}

/// Recently viewed careers and recent searches, newest first and capped at
/// [`RECENT_ACTIVITY_LIMIT`] per user.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Record a view unless the career is already among the recent ones.
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the view cannot be stored.
    async fn record_view(&self, view: &ViewedCareer) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn recent_views(&self, user_id: UserId) -> Result<Vec<CareerTitle>, StorageError>;

    /// Record a search unless the same query is already among the recent
    /// ones. Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the search cannot be stored.
    async fn record_search(&self, search: &SearchEntry) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn recent_searches(&self, user_id: UserId) -> Result<Vec<SearchQuery>, StorageError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load a session that has not expired at `now`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn load_session(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn store_session(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn destroy_session(&self, id: &SessionId) -> Result<(), StorageError>;

    /// Drop every session expired at `now`; returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError>;
}

/// Every data repository a relational backend has to provide.
pub trait Backend:
    UserRepository + QuizRepository + StepRepository + FavoriteRepository + ActivityRepository
{
}

impl<T> Backend for T where
    T: UserRepository + QuizRepository + StepRepository + FavoriteRepository + ActivityRepository
{
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

type StepKey = (UserId, CareerTitle, StepIndex);

/// First user id handed out by [`InMemoryRepository`].
///
/// Far above anything the relational store's auto-increment reaches, so an
/// id issued by one store never names a different user in the other.
pub const MEMORY_USER_ID_BASE: u64 = 1_000_000_000_000;

/// Process-memory store used when the relational backend is unreachable.
///
/// Data lives for the lifetime of the process only.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<Vec<User>>>,
    next_user_id: Arc<AtomicU64>,
    quiz_results: Arc<Mutex<Vec<QuizResult>>>,
    next_quiz_id: Arc<AtomicU64>,
    steps: Arc<Mutex<HashMap<StepKey, CompletedStep>>>,
    favorites: Arc<Mutex<HashMap<(UserId, JobTitle), FavoriteJob>>>,
    viewed: Arc<Mutex<Vec<ViewedCareer>>>,
    searches: Arc<Mutex<Vec<SearchEntry>>>,
    sessions: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: NewUser) -> Result<UserInsert, StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        if let Some(existing) = guard.iter().find(|u| u.email() == &user.email) {
            return Ok(UserInsert::Existing(existing.clone()));
        }
        let id = UserId::new(
            MEMORY_USER_ID_BASE + self.next_user_id.fetch_add(1, Ordering::Relaxed),
        );
        let created = user.assign_id(id);
        guard.push(created.clone());
        Ok(UserInsert::Created(created))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.iter().find(|u| u.email() == email).cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.iter().find(|u| u.id() == id).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        let slot = guard
            .iter_mut()
            .find(|u| u.id() == user.id())
            .ok_or(StorageError::NotFound)?;
        slot.rename(user.name().clone());
        slot.set_grade(user.grade());
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn append_result(&self, result: NewQuizResult) -> Result<QuizResultId, StorageError> {
        let id = QuizResultId::new(self.next_quiz_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut guard = self.quiz_results.lock().map_err(poisoned)?;
        guard.push(result.assign_id(id));
        Ok(id)
    }

    async fn results_for_user(&self, user_id: UserId) -> Result<Vec<QuizResult>, StorageError> {
        let guard = self.quiz_results.lock().map_err(poisoned)?;
        let mut results: Vec<QuizResult> = guard
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(results)
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<u64, StorageError> {
        let guard = self.quiz_results.lock().map_err(poisoned)?;
        Ok(guard.iter().filter(|r| r.user_id == user_id).count() as u64)
    }

    async fn clear_for_user(&self, user_id: UserId) -> Result<u64, StorageError> {
        let mut guard = self.quiz_results.lock().map_err(poisoned)?;
        let before = guard.len();
        guard.retain(|r| r.user_id != user_id);
        Ok((before - guard.len()) as u64)
    }
}

#[async_trait]
impl StepRepository for InMemoryRepository {
    async fn mark_completed(&self, step: &CompletedStep) -> Result<(), StorageError> {
        let mut guard = self.steps.lock().map_err(poisoned)?;
        guard.insert(
            (step.user_id, step.career_title.clone(), step.step_index),
            step.clone(),
        );
        Ok(())
    }

    async fn unmark_completed(
        &self,
        user_id: UserId,
        career: &CareerTitle,
        step: StepIndex,
    ) -> Result<u64, StorageError> {
        let mut guard = self.steps.lock().map_err(poisoned)?;
        let removed = guard.remove(&(user_id, career.clone(), step));
        Ok(u64::from(removed.is_some()))
    }

    async fn completed_steps(
        &self,
        user_id: UserId,
        career: &CareerTitle,
    ) -> Result<Vec<StepIndex>, StorageError> {
        let guard = self.steps.lock().map_err(poisoned)?;
        let mut steps: Vec<StepIndex> = guard
            .keys()
            .filter(|(uid, title, _)| *uid == user_id && title == career)
            .map(|(_, _, index)| *index)
            .collect();
        steps.sort_unstable();
        Ok(steps)
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryRepository {
    async fn add_favorite(&self, favorite: &FavoriteJob) -> Result<(), StorageError> {
        let mut guard = self.favorites.lock().map_err(poisoned)?;
        guard
            .entry((favorite.user_id, favorite.job_title.clone()))
            .or_insert_with(|| favorite.clone());
        Ok(())
    }

    async fn remove_favorite(
        &self,
        user_id: UserId,
        title: &JobTitle,
    ) -> Result<u64, StorageError> {
        let mut guard = self.favorites.lock().map_err(poisoned)?;
        let removed = guard.remove(&(user_id, title.clone()));
        Ok(u64::from(removed.is_some()))
    }

    async fn favorites(&self, user_id: UserId) -> Result<Vec<JobTitle>, StorageError> {
        let guard = self.favorites.lock().map_err(poisoned)?;
        let mut found: Vec<&FavoriteJob> =
            guard.values().filter(|f| f.user_id == user_id).collect();
        found.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.job_title.cmp(&b.job_title))
        });
        Ok(found.into_iter().map(|f| f.job_title.clone()).collect())
    }
}

/// Newest-first entries of one user, keeping at most
/// [`RECENT_ACTIVITY_LIMIT`] of them and dropping older ones.
fn insert_recent<T, K>(
    entries: &mut Vec<T>,
    entry: &T,
    owner: impl Fn(&T) -> UserId,
    key: impl Fn(&T) -> &K,
) -> bool
where
    T: Clone,
    K: PartialEq + ?Sized,
{
    let user_id = owner(entry);
    if entries
        .iter()
        .any(|e| owner(e) == user_id && key(e) == key(entry))
    {
        return false;
    }
    entries.insert(0, entry.clone());
    let mut kept = 0;
    entries.retain(|e| {
        if owner(e) != user_id {
            return true;
        }
        kept += 1;
        kept <= RECENT_ACTIVITY_LIMIT
    });
    true
}

#[async_trait]
impl ActivityRepository for InMemoryRepository {
    async fn record_view(&self, view: &ViewedCareer) -> Result<bool, StorageError> {
        let mut guard = self.viewed.lock().map_err(poisoned)?;
        Ok(insert_recent(&mut guard, view, |v| v.user_id, |v| &v.career_title))
    }

    async fn recent_views(&self, user_id: UserId) -> Result<Vec<CareerTitle>, StorageError> {
        let guard = self.viewed.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|v| v.user_id == user_id)
            .map(|v| v.career_title.clone())
            .collect())
    }

    async fn record_search(&self, search: &SearchEntry) -> Result<bool, StorageError> {
        let mut guard = self.searches.lock().map_err(poisoned)?;
        Ok(insert_recent(&mut guard, search, |s| s.user_id, |s| &s.query))
    }

    async fn recent_searches(&self, user_id: UserId) -> Result<Vec<SearchQuery>, StorageError> {
        let guard = self.searches.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.query.clone())
            .collect())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn load_session(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        Ok(guard.get(id).filter(|s| !s.is_expired(now)).cloned())
    }

    async fn store_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        guard.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn destroy_session(&self, id: &SessionId) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        guard.remove(id);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        let before = guard.len();
        guard.retain(|_, s| !s.is_expired(now));
        Ok((before - guard.len()) as u64)
    }
}

/// Aggregates the repositories behind trait objects so the backend can be
/// chosen at startup without callers knowing which one serves them.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub steps: Arc<dyn StepRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub activity: Arc<dyn ActivityRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub availability: StoreAvailability,
}

impl Storage {
    /// Storage served entirely from process memory.
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            users: Arc::new(repo.clone()),
            quizzes: Arc::new(repo.clone()),
            steps: Arc::new(repo.clone()),
            favorites: Arc::new(repo.clone()),
            activity: Arc::new(repo.clone()),
            sessions: Arc::new(repo),
            availability: StoreAvailability::new(Availability::Unavailable),
        }
    }

    /// Label reported by health checks: `"database"` or `"in-memory"`.
    #[must_use]
    pub fn mode(&self) -> &'static str {
        self.availability.get().mode_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_core::model::{Grade, UserName};
    use career_core::time::fixed_now;
    use chrono::Duration;
    use serde_json::json;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: UserName::new("A").unwrap(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".into(),
            grade: Grade::Tenth,
            created_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_insert_returns_existing_row() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_user(new_user("a@x.com")).await.unwrap();
        let UserInsert::Created(created) = first else {
            panic!("first insert must create");
        };
        assert_eq!(created.id(), UserId::new(MEMORY_USER_ID_BASE));

        let mut again = new_user("A@X.com");
        again.name = UserName::new("Other").unwrap();
        let second = repo.insert_user(again).await.unwrap();
        assert_eq!(second, UserInsert::Existing(created.clone()));

        let other = repo.insert_user(new_user("b@x.com")).await.unwrap();
        assert_eq!(
            other.into_user().id(),
            UserId::new(MEMORY_USER_ID_BASE + 1)
        );
    }

    #[tokio::test]
    async fn update_user_requires_existing_row() {
        let repo = InMemoryRepository::new();
        let mut user = repo
            .insert_user(new_user("a@x.com"))
            .await
            .unwrap()
            .into_user();
        user.set_grade(Grade::Twelfth);
        repo.update_user(&user).await.unwrap();
        let fetched = repo.get_user(user.id()).await.unwrap().unwrap();
        assert_eq!(fetched.grade(), Grade::Twelfth);

        let ghost = new_user("ghost@x.com").assign_id(UserId::new(99));
        assert!(matches!(
            repo.update_user(&ghost).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn quiz_history_is_newest_first_and_clearable() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(1);
        for minutes in [0, 10, 5] {
            repo.append_result(NewQuizResult {
                user_id: user,
                quiz_data: json!({ "m": minutes }),
                suggested_careers: json!([]),
                created_at: fixed_now() + Duration::minutes(minutes),
            })
            .await
            .unwrap();
        }
        repo.append_result(NewQuizResult {
            user_id: UserId::new(2),
            quiz_data: json!({}),
            suggested_careers: json!([]),
            created_at: fixed_now(),
        })
        .await
        .unwrap();

        let history = repo.results_for_user(user).await.unwrap();
        let order: Vec<_> = history.iter().map(|r| r.quiz_data["m"].clone()).collect();
        assert_eq!(order, vec![json!(10), json!(5), json!(0)]);
        assert_eq!(repo.count_for_user(user).await.unwrap(), 3);

        assert_eq!(repo.clear_for_user(user).await.unwrap(), 3);
        assert_eq!(repo.count_for_user(user).await.unwrap(), 0);
        assert_eq!(repo.count_for_user(UserId::new(2)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn completing_twice_keeps_one_row_and_delete_missing_is_noop() {
        let repo = InMemoryRepository::new();
        let career = CareerTitle::new("Nurse").unwrap();
        let step = CompletedStep {
            user_id: UserId::new(1),
            career_title: career.clone(),
            step_index: StepIndex::new(2),
            completed_at: fixed_now(),
        };
        repo.mark_completed(&step).await.unwrap();
        repo.mark_completed(&step).await.unwrap();
        assert_eq!(
            repo.completed_steps(UserId::new(1), &career).await.unwrap(),
            vec![StepIndex::new(2)]
        );

        let removed = repo
            .unmark_completed(UserId::new(1), &career, StepIndex::new(7))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        let removed = repo
            .unmark_completed(UserId::new(1), &career, StepIndex::new(2))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(repo
            .completed_steps(UserId::new(1), &career)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn expired_sessions_are_invisible_and_purged() {
        let repo = InMemoryRepository::new();
        let record = SessionRecord {
            id: SessionId::new("s1"),
            user: SessionUser::from_user(&new_user("a@x.com").assign_id(UserId::new(1))),
            expires_at: fixed_now() + Duration::hours(1),
            store: StoreKind::InMemory,
        };
        repo.store_session(&record).await.unwrap();

        let live = repo.load_session(&record.id, fixed_now()).await.unwrap();
        assert_eq!(live, Some(record.clone()));

        let later = fixed_now() + Duration::hours(2);
        assert_eq!(repo.load_session(&record.id, later).await.unwrap(), None);
        assert_eq!(repo.purge_expired(later).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn recent_views_are_deduplicated_newest_first_and_capped() {
        let repo = InMemoryRepository::new();
        let view = |user: u64, title: &str, minutes: i64| ViewedCareer {
            user_id: UserId::new(user),
            career_title: CareerTitle::new(title).unwrap(),
            viewed_at: fixed_now() + Duration::minutes(minutes),
        };
        assert!(repo.record_view(&view(1, "Nurse", 0)).await.unwrap());
        assert!(repo.record_view(&view(1, "Pilot", 1)).await.unwrap());
        assert!(!repo.record_view(&view(1, "Nurse", 2)).await.unwrap());
        repo.record_view(&view(2, "Chef", 3)).await.unwrap();

        let titles: Vec<String> = repo
            .recent_views(UserId::new(1))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.as_str().to_owned())
            .collect();
        assert_eq!(titles, vec!["Pilot", "Nurse"]);

        for i in 0..12 {
            repo.record_view(&view(1, &format!("Career {i}"), 10 + i))
                .await
                .unwrap();
        }
        let recent = repo.recent_views(UserId::new(1)).await.unwrap();
        assert_eq!(recent.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(recent[0].as_str(), "Career 11");
        assert_eq!(repo.recent_views(UserId::new(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recent_searches_skip_repeats() {
        let repo = InMemoryRepository::new();
        let search = |q: &str| SearchEntry {
            user_id: UserId::new(1),
            query: SearchQuery::new(q).unwrap(),
            searched_at: fixed_now(),
        };
        assert!(repo.record_search(&search("nurse")).await.unwrap());
        assert!(!repo.record_search(&search(" nurse ")).await.unwrap());
        assert!(repo.record_search(&search("Nurse")).await.unwrap());
        let queries: Vec<String> = repo
            .recent_searches(UserId::new(1))
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.as_str().to_owned())
            .collect();
        assert_eq!(queries, vec!["Nurse", "nurse"]);
    }

    #[test]
    fn in_memory_storage_reports_in_memory_mode() {
        assert_eq!(Storage::in_memory().mode(), "in-memory");
    }
}

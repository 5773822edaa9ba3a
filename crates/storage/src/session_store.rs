use std::sync::Arc;

use async_trait::async_trait;
use career_core::model::SessionId;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::availability::StoreAvailability;
use crate::repository::{InMemoryRepository, SessionRecord, SessionRepository, StorageError};

/// Session store backed by the relational database, degrading to process
/// memory when the database errors.
///
/// Reads the same availability flag as the data dispatcher. Once the flag
/// says the database is gone, sessions are served from memory without
/// touching it, and a connectivity failure seen here flips the flag for
/// everyone.
///
/// A session written to memory during an outage is still found after the
/// database comes back, because a miss on the primary falls through to the
/// in-memory copy.
pub struct FallbackSessionStore {
    primary: Arc<dyn SessionRepository>,
    fallback: InMemoryRepository,
    availability: StoreAvailability,
}

impl FallbackSessionStore {
    #[must_use]
    pub fn new(
        primary: Arc<dyn SessionRepository>,
        fallback: InMemoryRepository,
        availability: StoreAvailability,
    ) -> Self {
        Self {
            primary,
            fallback,
            availability,
        }
    }

    fn primary(&self) -> Option<&dyn SessionRepository> {
        self.availability
            .is_available()
            .then_some(self.primary.as_ref())
    }

    fn note_failure(&self, op: &'static str, err: &StorageError) {
        if err.is_connectivity() && self.availability.mark_unavailable() {
            warn!(op, error = %err, "session store lost the database; switching to memory");
        } else {
            warn!(op, error = %err, "session operation failed on database; using memory");
        }
    }
}

#[async_trait]
impl SessionRepository for FallbackSessionStore {
    async fn load_session(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StorageError> {
        if let Some(primary) = self.primary() {
            match primary.load_session(id, now).await {
                Ok(Some(record)) => return Ok(Some(record)),
                Ok(None) => {}
                Err(err) => self.note_failure("load_session", &err),
            }
        }
        self.fallback.load_session(id, now).await
    }

    async fn store_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        if let Some(primary) = self.primary() {
            match primary.store_session(record).await {
                Ok(()) => return Ok(()),
                Err(err) => self.note_failure("store_session", &err),
            }
        }
        self.fallback.store_session(record).await
    }

    async fn destroy_session(&self, id: &SessionId) -> Result<(), StorageError> {
        self.fallback.destroy_session(id).await?;
        if let Some(primary) = self.primary() {
            if let Err(err) = primary.destroy_session(id).await {
                self.note_failure("destroy_session", &err);
            }
        }
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let in_memory = self.fallback.purge_expired(now).await?;
        let Some(primary) = self.primary() else {
            return Ok(in_memory);
        };
        match primary.purge_expired(now).await {
            Ok(removed) => Ok(removed + in_memory),
            Err(err) => {
                self.note_failure("purge_expired", &err);
                Ok(in_memory)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{Availability, StoreKind};
    use career_core::model::{Email, Grade, SessionUser, UserId, UserName};
    use career_core::time::fixed_now;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Down;

    #[async_trait]
    impl SessionRepository for Down {
        async fn load_session(
            &self,
            _: &SessionId,
            _: DateTime<Utc>,
        ) -> Result<Option<SessionRecord>, StorageError> {
            Err(StorageError::Connection("gone".into()))
        }
        async fn store_session(&self, _: &SessionRecord) -> Result<(), StorageError> {
            Err(StorageError::Connection("gone".into()))
        }
        async fn destroy_session(&self, _: &SessionId) -> Result<(), StorageError> {
            Err(StorageError::Connection("gone".into()))
        }
        async fn purge_expired(&self, _: DateTime<Utc>) -> Result<u64, StorageError> {
            Err(StorageError::Connection("gone".into()))
        }
    }

    fn record(id: &str) -> SessionRecord {
        SessionRecord {
            id: SessionId::new(id),
            user: SessionUser {
                id: UserId::new(1),
                name: UserName::new("A").unwrap(),
                email: Email::parse("a@x.com").unwrap(),
                grade: Grade::Eleventh,
            },
            expires_at: fixed_now() + Duration::hours(24),
            store: StoreKind::Database,
        }
    }

    fn available() -> StoreAvailability {
        StoreAvailability::new(Availability::Available)
    }

    /// Primary that counts calls and holds nothing.
    #[derive(Default)]
    struct Counting(AtomicUsize);

    #[async_trait]
    impl SessionRepository for Counting {
        async fn load_session(
            &self,
            _: &SessionId,
            _: DateTime<Utc>,
        ) -> Result<Option<SessionRecord>, StorageError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
        async fn store_session(&self, _: &SessionRecord) -> Result<(), StorageError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn destroy_session(&self, _: &SessionId) -> Result<(), StorageError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn purge_expired(&self, _: DateTime<Utc>) -> Result<u64, StorageError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[tokio::test]
    async fn outage_keeps_sessions_working_in_memory() {
        let availability = available();
        let store = FallbackSessionStore::new(
            Arc::new(Down),
            InMemoryRepository::new(),
            availability.clone(),
        );
        let session = record("abc");
        store.store_session(&session).await.unwrap();
        assert_eq!(
            store.load_session(&session.id, fixed_now()).await.unwrap(),
            Some(session.clone())
        );
        store.destroy_session(&session.id).await.unwrap();
        assert_eq!(store.load_session(&session.id, fixed_now()).await.unwrap(), None);
        assert_eq!(availability.get(), Availability::Unavailable);
    }

    #[tokio::test]
    async fn miss_on_primary_checks_memory_copy() {
        let primary = InMemoryRepository::new();
        let fallback = InMemoryRepository::new();
        let session = record("xyz");
        fallback.store_session(&session).await.unwrap();

        let store = FallbackSessionStore::new(Arc::new(primary.clone()), fallback, available());
        assert!(store
            .load_session(&session.id, fixed_now())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn purge_counts_memory_even_when_primary_fails() {
        let fallback = InMemoryRepository::new();
        fallback.store_session(&record("old")).await.unwrap();
        let store = FallbackSessionStore::new(Arc::new(Down), fallback, available());
        let later = fixed_now() + Duration::hours(48);
        assert_eq!(store.purge_expired(later).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn flipped_flag_keeps_sessions_off_the_database() {
        let primary = Arc::new(Counting::default());
        let availability = StoreAvailability::new(Availability::Unavailable);
        let store = FallbackSessionStore::new(
            Arc::clone(&primary) as Arc<dyn SessionRepository>,
            InMemoryRepository::new(),
            availability.clone(),
        );

        let session = record("mem");
        store.store_session(&session).await.unwrap();
        assert_eq!(
            store.load_session(&session.id, fixed_now()).await.unwrap(),
            Some(session.clone())
        );
        store.destroy_session(&session.id).await.unwrap();
        store.purge_expired(fixed_now()).await.unwrap();
        assert_eq!(primary.0.load(Ordering::SeqCst), 0);

        availability.set(Availability::Available);
        store.store_session(&record("db")).await.unwrap();
        assert_eq!(primary.0.load(Ordering::SeqCst), 1);
    }
}

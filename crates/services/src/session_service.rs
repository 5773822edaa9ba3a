use std::sync::Arc;
use std::time::Duration;

use career_core::model::{SessionId, SessionUser, User};
use rand::Rng;
use rand::distr::Alphanumeric;
use storage::StoreAvailability;
use storage::repository::{SessionRecord, SessionRepository};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::Clock;
use crate::error::SessionServiceError;

/// How often expired sessions are swept.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

const SESSION_ID_LEN: usize = 48;

fn new_session_id() -> SessionId {
    let raw: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect();
    SessionId::new(raw)
}

/// Server-side sessions with a rolling expiry.
///
/// Each session remembers which store issued its user id. A session from
/// the other store is treated as absent, so after a switch between the
/// database and memory the client has to sign in again instead of reading
/// another user's rows under a reused id.
#[derive(Clone)]
pub struct SessionService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    availability: StoreAvailability,
}

impl SessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        availability: StoreAvailability,
    ) -> Self {
        Self {
            clock,
            sessions,
            availability,
        }
    }

    /// Open a fresh session for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if the session cannot be stored.
    pub async fn start(&self, user: &User) -> Result<SessionRecord, SessionServiceError> {
        let record = SessionRecord {
            id: new_session_id(),
            user: SessionUser::from_user(user),
            expires_at: self.clock.session_expiry(),
            store: self.availability.active_store(),
        };
        self.sessions.store_session(&record).await?;
        debug!(session = ?record.id, user_id = %user.id(), "session started");
        Ok(record)
    }

    /// Look up a live session issued by the currently active store.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if the lookup fails.
    pub async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionServiceError> {
        let Some(record) = self.sessions.load_session(id, self.clock.now()).await? else {
            return Ok(None);
        };
        let active = self.availability.active_store();
        if record.store != active {
            debug!(
                session = ?record.id,
                issued_by = ?record.store,
                ?active,
                "session from inactive store ignored"
            );
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Replace the user snapshot held by a session and extend its expiry.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if the session cannot be stored.
    pub async fn update_user(
        &self,
        id: &SessionId,
        user: SessionUser,
    ) -> Result<SessionRecord, SessionServiceError> {
        let record = SessionRecord {
            id: id.clone(),
            user,
            expires_at: self.clock.session_expiry(),
            store: self.availability.active_store(),
        };
        self.sessions.store_session(&record).await?;
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if the delete fails.
    pub async fn destroy(&self, id: &SessionId) -> Result<(), SessionServiceError> {
        self.sessions.destroy_session(id).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if the sweep fails.
    pub async fn purge_expired(&self) -> Result<u64, SessionServiceError> {
        Ok(self.sessions.purge_expired(self.clock.now()).await?)
    }

    /// Sweep expired sessions on a fixed interval.
    #[must_use]
    pub fn spawn_purge(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match self.purge_expired().await {
                    Ok(0) => {}
                    Ok(removed) => debug!(removed, "purged expired sessions"),
                    Err(e) => warn!(error = %e, "session purge failed"),
                }
            }
        })
    }
}

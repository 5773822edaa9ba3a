use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use thiserror::Error;

use crate::availability::StoreAvailability;
use crate::probe::HealthCheck;
use crate::repository::{Backend, InMemoryRepository, SessionRepository, Storage, StorageError};

mod activity_repo;
mod favorite_repo;
mod mapping;
mod migrate;
mod quiz_repo;
mod session_repo;
mod step_repo;
mod user_repo;

const MAX_CONNECTIONS: u32 = 10;

/// Connection parameters for the relational store.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Bounds pool acquisition and the startup probe.
    pub connect_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3306,
            user: "root".into(),
            password: String::new(),
            database: "career_guidance".into(),
            connect_timeout: crate::probe::DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl DbConfig {
    #[must_use]
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .charset("utf8mb4")
    }
}

#[derive(Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MySqlInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl MySqlRepository {
    /// Build a pool that opens connections on first use.
    ///
    /// Never touches the network, so it succeeds whether or not the server is
    /// up. Reachability is established by [`HealthCheck::check`].
    #[must_use]
    pub fn lazy(config: &DbConfig) -> Self {
        Self::lazy_with(config.connect_options(), config.connect_timeout)
    }

    /// Same as [`MySqlRepository::lazy`] but from a `mysql://` URL.
    ///
    /// # Errors
    ///
    /// Returns `MySqlInitError` if the URL cannot be parsed.
    pub fn lazy_from_url(url: &str, connect_timeout: Duration) -> Result<Self, MySqlInitError> {
        let options = MySqlConnectOptions::from_str(url)?;
        Ok(Self::lazy_with(options, connect_timeout))
    }

    fn lazy_with(options: MySqlConnectOptions, connect_timeout: Duration) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(connect_timeout)
            .connect_lazy_with(options);
        Self { pool }
    }

    /// Classify an error returned by a query on this pool.
    ///
    /// sqlx reports a refused connection as a pool timeout once its retries
    /// run out. With no connection open at all that timeout means the server
    /// is gone; with connections open it means the pool is saturated.
    pub(crate) fn query_err(&self, e: sqlx::Error) -> StorageError {
        if matches!(e, sqlx::Error::PoolTimedOut) && self.pool.size() == 0 {
            return StorageError::Connection(
                "no connection to the database could be opened".into(),
            );
        }
        mapping::db_err(e)
    }

    /// # Errors
    ///
    /// Returns `MySqlInitError` if no connection can be acquired.
    pub async fn ping(&self) -> Result<(), MySqlInitError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `MySqlInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), MySqlInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

#[async_trait]
impl HealthCheck for MySqlRepository {
    async fn check(&self) -> Result<(), StorageError> {
        self.ping()
            .await
            .map_err(|MySqlInitError::Sqlx(e)| self.query_err(e))?;
        self.migrate()
            .await
            .map_err(|MySqlInitError::Sqlx(e)| self.query_err(e))
    }
}

impl Storage {
    /// Storage that prefers MySQL and degrades to `memory` per the shared
    /// availability flag.
    #[must_use]
    pub fn mysql_with_fallback(
        repo: MySqlRepository,
        memory: InMemoryRepository,
        availability: StoreAvailability,
    ) -> Self {
        let repo = Arc::new(repo);
        let primary: Arc<dyn Backend> = repo.clone();
        let sessions: Arc<dyn SessionRepository> = repo;
        Self::with_fallback(Some(primary), Some(sessions), memory, availability)
    }
}

use std::sync::Arc;
use std::time::Duration;

use storage::mysql::{DbConfig, MySqlRepository};
use storage::probe::{ConnectionProber, HealthCheck};
use storage::repository::InMemoryRepository;
use storage::{Availability, Storage, StoreAvailability};
use tokio::task::JoinHandle;
use tracing::info;

use crate::Clock;
use crate::activity_service::ActivityService;
use crate::auth_service::AuthService;
use crate::error::AppServicesError;
use crate::favorites_service::FavoritesService;
use crate::password::CredentialHasher;
use crate::profile_service::ProfileService;
use crate::quiz_service::QuizService;
use crate::roadmap_service::RoadmapService;
use crate::session_service::{PURGE_INTERVAL, SessionService};

/// How storage is brought up at startup.
#[derive(Debug, Clone, Default)]
pub struct StorageSettings {
    /// `None` skips the database entirely and serves from memory.
    pub database: Option<DbConfig>,
    /// Re-probe interval while the database is down; `None` keeps the
    /// fallback for the lifetime of the process.
    pub reprobe_interval: Option<Duration>,
    /// Seed the demo account when serving from memory.
    pub seed_demo_user: bool,
}

/// Assembles every service on top of one `Storage`.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    prober: Option<Arc<ConnectionProber>>,
    auth: Arc<AuthService>,
    sessions: Arc<SessionService>,
    quiz: Arc<QuizService>,
    roadmap: Arc<RoadmapService>,
    profile: Arc<ProfileService>,
    favorites: Arc<FavoritesService>,
    activity: Arc<ActivityService>,
}

impl AppServices {
    /// Wire services over already-selected storage.
    #[must_use]
    pub fn new(storage: Storage, clock: Clock, hasher: CredentialHasher) -> Self {
        let auth = Arc::new(AuthService::new(clock, Arc::clone(&storage.users), hasher));
        let sessions = Arc::new(SessionService::new(
            clock,
            Arc::clone(&storage.sessions),
            storage.availability.clone(),
        ));
        let quiz = Arc::new(QuizService::new(
            clock,
            Arc::clone(&storage.users),
            Arc::clone(&storage.quizzes),
        ));
        let roadmap = Arc::new(RoadmapService::new(clock, Arc::clone(&storage.steps)));
        let profile = Arc::new(ProfileService::new(Arc::clone(&storage.users)));
        let favorites = Arc::new(FavoritesService::new(clock, Arc::clone(&storage.favorites)));
        let activity = Arc::new(ActivityService::new(clock, Arc::clone(&storage.activity)));

        Self {
            storage,
            prober: None,
            auth,
            sessions,
            quiz,
            roadmap,
            profile,
            favorites,
            activity,
        }
    }

    /// Probe the database once and build services on whichever store
    /// answered. An unreachable database is not an error.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if seeding the demo account fails.
    pub async fn bootstrap(
        settings: &StorageSettings,
        clock: Clock,
        hasher: CredentialHasher,
    ) -> Result<Self, AppServicesError> {
        let memory = InMemoryRepository::new();
        let availability = StoreAvailability::default();

        let (storage, prober) = match &settings.database {
            None => {
                availability.set(Availability::Unavailable);
                info!("database disabled; using in-memory store");
                (
                    Storage::with_fallback(None, None, memory, availability),
                    None,
                )
            }
            Some(config) => {
                let repo = MySqlRepository::lazy(config);
                let target: Arc<dyn HealthCheck> = Arc::new(repo.clone());
                let prober = Arc::new(ConnectionProber::new(
                    target,
                    config.connect_timeout,
                    availability.clone(),
                ));
                prober.probe().await;
                (
                    Storage::mysql_with_fallback(repo, memory, availability),
                    Some(prober),
                )
            }
        };

        let mut services = Self::new(storage, clock, hasher);
        services.prober = prober;

        if settings.seed_demo_user && !services.storage.availability.is_available() {
            let demo = services.auth.ensure_demo_user().await?;
            info!(user_id = %demo.id(), "demo user available");
        }
        Ok(services)
    }

    /// Start the session sweeper and, when configured, the database re-probe.
    #[must_use]
    pub fn spawn_background(&self, reprobe_interval: Option<Duration>) -> Vec<JoinHandle<()>> {
        let mut handles = vec![Arc::clone(&self.sessions).spawn_purge(PURGE_INTERVAL)];
        if let (Some(prober), Some(interval)) = (&self.prober, reprobe_interval) {
            info!(interval_secs = interval.as_secs(), "database re-probe enabled");
            handles.push(Arc::clone(prober).spawn_reprobe(interval));
        }
        handles
    }

    /// `"database"` or `"in-memory"`.
    #[must_use]
    pub fn storage_mode(&self) -> &'static str {
        self.storage.mode()
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn roadmap(&self) -> Arc<RoadmapService> {
        Arc::clone(&self.roadmap)
    }

    #[must_use]
    pub fn profile(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile)
    }

    #[must_use]
    pub fn favorites(&self) -> Arc<FavoritesService> {
        Arc::clone(&self.favorites)
    }

    #[must_use]
    pub fn activity(&self) -> Arc<ActivityService> {
        Arc::clone(&self.activity)
    }
}

use std::sync::Arc;

use career_core::model::{Email, Grade, NewUser, User, UserName};
use storage::repository::{UserInsert, UserRepository};
use tracing::{debug, info};

use crate::Clock;
use crate::error::AuthError;
use crate::password::CredentialHasher;

/// Credentials of the account seeded for in-memory demos.
pub const DEMO_EMAIL: &str = "test@example.com";
pub const DEMO_PASSWORD: &str = "password";

/// Registration and login against the user repository.
#[derive(Clone)]
pub struct AuthService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
}

impl AuthService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>, hasher: CredentialHasher) -> Self {
        Self {
            clock,
            users,
            hasher,
        }
    }

    /// Create an account. Blank fields count as missing.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` when any field is absent,
    /// `AuthError::InvalidUser` when a field fails validation,
    /// `AuthError::AlreadyRegistered` when the email is taken, and
    /// `AuthError::Storage` if persistence fails.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        grade: Option<Grade>,
    ) -> Result<User, AuthError> {
        let Some(grade) = grade else {
            return Err(AuthError::MissingFields);
        };
        if [name, email, password].iter().any(|f| f.trim().is_empty()) {
            return Err(AuthError::MissingFields);
        }
        let name = UserName::new(name)?;
        let email = Email::parse(email)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyRegistered);
        }

        let password_hash = self.hash(password).await?;
        let inserted = self
            .users
            .insert_user(NewUser {
                name,
                email,
                password_hash,
                grade,
                created_at: self.clock.now(),
            })
            .await?;

        match inserted {
            UserInsert::Created(user) => {
                info!(user_id = %user.id(), "user registered");
                Ok(user)
            }
            UserInsert::Existing(_) => Err(AuthError::AlreadyRegistered),
        }
    }

    /// Check credentials.
    ///
    /// An unknown email and a wrong password are reported differently so the
    /// client can offer registration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials`, `AuthError::NotRegistered`,
    /// `AuthError::InvalidCredentials`, or `AuthError::Storage`.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        // A malformed address can never have been registered.
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::NotRegistered);
        };
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::NotRegistered)?;

        if !self.verify(password, user.password_hash()).await? {
            debug!(user_id = %user.id(), "login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Register the demo account unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the account cannot be created.
    pub async fn ensure_demo_user(&self) -> Result<User, AuthError> {
        match self
            .register("Test User", DEMO_EMAIL, DEMO_PASSWORD, Some(Grade::Tenth))
            .await
        {
            Ok(user) => Ok(user),
            Err(AuthError::AlreadyRegistered) => {
                let email = Email::parse(DEMO_EMAIL)?;
                self.users
                    .find_by_email(&email)
                    .await?
                    .ok_or(AuthError::NotRegistered)
            }
            Err(e) => Err(e),
        }
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    async fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let stored = stored.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }
}

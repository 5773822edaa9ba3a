//! Shared error types for the services crate.

use thiserror::Error;

use career_core::model::{ActivityError, FavoriteError, StepError, UserError};
use storage::repository::StorageError;

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("All fields are required")]
    MissingFields,
    #[error("Email and password are required")]
    MissingCredentials,
    #[error(transparent)]
    InvalidUser(#[from] UserError),
    #[error("User already exists")]
    AlreadyRegistered,
    #[error("You are not registered. Please create an account.")]
    NotRegistered,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RoadmapService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoadmapServiceError {
    #[error("careerTitle and stepIndex are required")]
    MissingFields,
    #[error(transparent)]
    Step(#[from] StepError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error("No valid fields to update")]
    NoFields,
    #[error(transparent)]
    InvalidUser(#[from] UserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `FavoritesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FavoriteServiceError {
    #[error("jobTitle is required")]
    MissingTitle,
    #[error(transparent)]
    Favorite(#[from] FavoriteError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ActivityService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActivityServiceError {
    #[error("careerTitle is required")]
    MissingCareer,
    #[error("query is required")]
    MissingQuery,
    #[error(transparent)]
    Career(#[from] StepError),
    #[error(transparent)]
    Query(#[from] ActivityError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Auth(#[from] AuthError),
}

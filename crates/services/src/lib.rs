#![forbid(unsafe_code)]

pub mod activity_service;
pub mod app_services;
pub mod auth_service;
pub mod error;
pub mod favorites_service;
pub mod password;
pub mod profile_service;
pub mod quiz_service;
pub mod roadmap_service;
pub mod session_service;

pub use career_core::Clock;

pub use activity_service::ActivityService;
pub use app_services::{AppServices, StorageSettings};
pub use auth_service::AuthService;
pub use error::{
    ActivityServiceError, AppServicesError, AuthError, FavoriteServiceError, ProfileServiceError,
    QuizServiceError, RoadmapServiceError, SessionServiceError,
};
pub use favorites_service::FavoritesService;
pub use password::CredentialHasher;
pub use profile_service::{ProfileChanges, ProfileService};
pub use quiz_service::QuizService;
pub use roadmap_service::RoadmapService;
pub use session_service::SessionService;

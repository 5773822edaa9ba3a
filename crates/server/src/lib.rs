#![forbid(unsafe_code)]

//! HTTP API for the career guidance backend.

pub mod config;
pub mod cookie;
pub mod error;
mod handlers;
pub mod logging;
mod middleware;
pub mod session;

use std::sync::Arc;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use services::AppServices;

use crate::config::ServerConfig;
use crate::cookie::SessionCookie;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
    pub cookies: Arc<SessionCookie>,
    pub cors_allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        services: AppServices,
        cookies: SessionCookie,
        cors_allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            services,
            cookies: Arc::new(cookies),
            cors_allowed_origins: Arc::new(cors_allowed_origins),
        }
    }

    #[must_use]
    pub fn from_config(services: AppServices, config: &ServerConfig) -> Self {
        Self::new(
            services,
            SessionCookie::new(&config.session.secret, config.session.secure_cookies),
            config.cors_allowed_origins.clone(),
        )
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/register", post(handlers::auth::register))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
        .route("/api/quiz/save", post(handlers::quiz::save))
        .route(
            "/api/quiz/has-completed/:email",
            get(handlers::quiz::has_completed),
        )
        .route("/api/quiz/history", get(handlers::quiz::history))
        .route("/api/quiz/clear", post(handlers::quiz::clear))
        .route(
            "/api/roadmap/complete-step",
            post(handlers::roadmap::complete_step).delete(handlers::roadmap::uncomplete_step),
        )
        .route(
            "/api/roadmap/completed-steps/:careerTitle",
            get(handlers::roadmap::completed_steps),
        )
        .route("/api/user", get(handlers::user::current))
        .route("/api/user/update", put(handlers::user::update))
        .route(
            "/api/favorites",
            get(handlers::favorites::list)
                .post(handlers::favorites::add)
                .delete(handlers::favorites::remove),
        )
        .route(
            "/api/careers/viewed",
            get(handlers::activity::viewed_careers).post(handlers::activity::record_view),
        )
        .route(
            "/api/search-history",
            get(handlers::activity::search_history).post(handlers::activity::record_search),
        )
        .route("/api/healthcheck", get(handlers::health::healthcheck))
        .layer(from_fn(middleware::request_tracing_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::cors_middleware))
        .with_state(state)
}

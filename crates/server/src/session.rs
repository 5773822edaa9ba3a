//! Request extractors for the cookie-backed session.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use career_core::model::{SessionId, SessionUser};
use tracing::debug;

use crate::AppState;
use crate::error::ApiError;

/// An authenticated request. Rejects with 401 when the cookie is missing,
/// badly signed, or points at an expired session.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: SessionId,
    pub user: SessionUser,
}

/// The session, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<CurrentSession>);

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<CurrentSession>, ApiError> {
    let Some(id) = state.cookies.read(&parts.headers) else {
        return Ok(None);
    };
    let record = state.services.sessions().load(&id).await?;
    if record.is_none() {
        debug!(session = ?id, "session cookie without live session");
    }
    Ok(record.map(|r| CurrentSession {
        id: r.id,
        user: r.user,
    }))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await?.ok_or_else(ApiError::unauthorized)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state).await?))
    }
}

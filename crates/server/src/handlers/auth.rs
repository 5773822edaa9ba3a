use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use career_core::model::{SessionUser, User};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::{ApiJson, GradeInput};
use crate::session::MaybeSession;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    grade: Option<GradeInput>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// Start a session for `user` and answer with `status` and the cookie set.
async fn signed_in(
    state: &AppState,
    user: &User,
    status: StatusCode,
    message: &str,
) -> Result<Response, ApiError> {
    let record = state.services.sessions().start(user).await?;
    let mut headers = HeaderMap::new();
    if let Some(cookie) = state.cookies.set(&record.id) {
        headers.insert(header::SET_COOKIE, cookie);
    }
    let body = json!({ "message": message, "user": SessionUser::from_user(user) });
    Ok((status, headers, Json(body)).into_response())
}

pub(crate) async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Response, ApiError> {
    let grade = GradeInput::resolve(req.grade)?;
    let user = state
        .services
        .auth()
        .register(&req.name, &req.email, &req.password, grade)
        .await?;
    signed_in(&state, &user, StatusCode::CREATED, "User registered successfully").await
}

pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = state.services.auth().login(&req.email, &req.password).await?;
    info!(user_id = %user.id(), "login");
    signed_in(&state, &user, StatusCode::OK, "Login successful").await
}

/// Always succeeds; an absent session is already logged out.
pub(crate) async fn logout(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response, ApiError> {
    if let Some(session) = session {
        state.services.sessions().destroy(&session.id).await?;
    }
    Ok((
        [(header::SET_COOKIE, state.cookies.clear())],
        Json(json!({ "message": "Logout successful" })),
    )
        .into_response())
}

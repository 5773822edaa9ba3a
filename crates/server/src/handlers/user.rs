use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use services::ProfileChanges;

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::{ApiJson, GradeInput};
use crate::session::CurrentSession;

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateUserRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    grade: Option<GradeInput>,
}

pub(crate) async fn current(session: CurrentSession) -> Json<Value> {
    Json(json!({
        "message": "User data retrieved successfully",
        "user": session.user,
    }))
}

/// Blank fields are treated as absent.
pub(crate) async fn update(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let changes = ProfileChanges {
        name: req.name.filter(|n| !n.trim().is_empty()),
        grade: GradeInput::resolve(req.grade)?,
    };
    let user = state.services.profile().update(&session.user, changes).await?;
    state
        .services
        .sessions()
        .update_user(&session.id, user.clone())
        .await?;
    Ok(Json(json!({
        "message": "User profile updated successfully",
        "user": user,
    })))
}

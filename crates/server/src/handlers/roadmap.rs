use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::session::CurrentSession;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StepRequest {
    #[serde(default)]
    career_title: String,
    #[serde(default)]
    step_index: Option<i64>,
}

pub(crate) async fn complete_step(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(req): ApiJson<StepRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .services
        .roadmap()
        .complete(session.user.id, &req.career_title, req.step_index)
        .await?;
    Ok(Json(json!({ "message": "Step marked as completed" })))
}

pub(crate) async fn uncomplete_step(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(req): ApiJson<StepRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .services
        .roadmap()
        .uncomplete(session.user.id, &req.career_title, req.step_index)
        .await?;
    Ok(Json(json!({ "message": "Step marked as incomplete" })))
}

pub(crate) async fn completed_steps(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(career_title): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let steps = state
        .services
        .roadmap()
        .completed_steps(session.user.id, &career_title)
        .await?;
    Ok(Json(json!({
        "message": "Completed steps retrieved successfully",
        "completedSteps": steps,
    })))
}

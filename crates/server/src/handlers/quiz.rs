use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use career_core::model::{QuizResult, QuizResultId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::{ApiJson, GradeInput};
use crate::session::CurrentSession;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveQuizRequest {
    #[serde(default)]
    quiz_data: Value,
    #[serde(default)]
    suggested_careers: Value,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClearQuizRequest {
    #[serde(default)]
    grade: Option<GradeInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizHistoryEntry {
    id: QuizResultId,
    quiz_data: Value,
    suggested_careers: Value,
    created_at: DateTime<Utc>,
}

impl From<QuizResult> for QuizHistoryEntry {
    fn from(r: QuizResult) -> Self {
        Self {
            id: r.id,
            quiz_data: r.quiz_data,
            suggested_careers: r.suggested_careers,
            created_at: r.created_at,
        }
    }
}

pub(crate) async fn save(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(req): ApiJson<SaveQuizRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state
        .services
        .quiz()
        .save(&session.user, req.quiz_data, req.suggested_careers)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Quiz results saved successfully" })),
    ))
}

pub(crate) async fn has_completed(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let done = state.services.quiz().has_completed(&email).await?;
    Ok(Json(json!({ "hasCompleted": done })))
}

pub(crate) async fn history(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<Value>, ApiError> {
    let entries: Vec<QuizHistoryEntry> = state
        .services
        .quiz()
        .history(&session.user)
        .await?
        .into_iter()
        .map(QuizHistoryEntry::from)
        .collect();
    Ok(Json(json!({
        "message": "Quiz history retrieved successfully",
        "quizHistory": entries,
    })))
}

/// Clear history for a retake. The body is optional.
pub(crate) async fn clear(
    State(state): State<AppState>,
    session: CurrentSession,
    body: Option<ApiJson<ClearQuizRequest>>,
) -> Result<Json<Value>, ApiError> {
    let req = body.map(|ApiJson(r)| r).unwrap_or_default();
    let grade = GradeInput::resolve(req.grade)?;
    let user = state.services.quiz().clear(&session.user, grade).await?;
    state
        .services
        .sessions()
        .update_user(&session.id, user.clone())
        .await?;
    Ok(Json(json!({
        "message": "Quiz data cleared successfully",
        "grade": user.grade,
    })))
}

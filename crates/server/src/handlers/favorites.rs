use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::session::CurrentSession;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FavoriteRequest {
    #[serde(default)]
    job_title: String,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<Value>, ApiError> {
    let titles = state.services.favorites().list(session.user.id).await?;
    Ok(Json(json!({ "favoriteJobs": titles })))
}

pub(crate) async fn add(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(req): ApiJson<FavoriteRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .services
        .favorites()
        .add(session.user.id, &req.job_title)
        .await?;
    Ok(Json(json!({ "message": "Job added to favorites", "favorite": true })))
}

pub(crate) async fn remove(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(req): ApiJson<FavoriteRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .services
        .favorites()
        .remove(session.user.id, &req.job_title)
        .await?;
    Ok(Json(json!({ "message": "Job removed from favorites", "favorite": false })))
}

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
pub(crate) struct ViewRequest {
    #[serde(default)]
    career_title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchRequest {
    #[serde(default)]
    query: String,
}

pub(crate) async fn viewed_careers(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<Value>, ApiError> {
    let titles = state
        .services
        .activity()
        .viewed_careers(session.user.id)
        .await?;
    Ok(Json(json!({ "viewedCareers": titles })))
}

pub(crate) async fn record_view(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(req): ApiJson<ViewRequest>,
) -> Result<Json<Value>, ApiError> {
    let titles = state
        .services
        .activity()
        .record_view(session.user.id, &req.career_title)
        .await?;
    Ok(Json(json!({ "message": "Career view recorded", "viewedCareers": titles })))
}

pub(crate) async fn search_history(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<Value>, ApiError> {
    let queries = state
        .services
        .activity()
        .search_history(session.user.id)
        .await?;
    Ok(Json(json!({ "searchHistory": queries })))
}

pub(crate) async fn record_search(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(req): ApiJson<SearchRequest>,
) -> Result<Json<Value>, ApiError> {
    let queries = state
        .services
        .activity()
        .record_search(session.user.id, &req.query)
        .await?;
    Ok(Json(json!({ "message": "Search saved", "searchHistory": queries })))
}

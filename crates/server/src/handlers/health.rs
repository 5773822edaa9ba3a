use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde_json::{Value, json};

use crate::AppState;
use crate::session::MaybeSession;

/// Liveness plus which store is serving requests.
pub(crate) async fn healthcheck(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Json<Value> {
    let session = session.map_or_else(|| "no-session".to_string(), |s| s.id.to_string());
    Json(json!({
        "status": "ok",
        "time": Utc::now().to_rfc3339(),
        "mode": state.services.storage_mode(),
        "session": session,
    }))
}

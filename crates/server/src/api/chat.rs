//! `POST /api/chat` (§4.7, §4.8): free-form Q&A grounded in the current
//! sample, the active fault's snapshot, and the session's own transcript.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use pump_diagnostics::ChatRole;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub include_sensor_context: bool,
    pub session_id: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Ask the diagnostic engine a free-form question
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Diagnostics",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty message"),
        (status = 503, description = "LLM unavailable")
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let sample = req.include_sensor_context.then(|| state.telemetry.store.latest()).flatten();
    let fault_snapshot = state
        .telemetry
        .fault_tracker
        .active()
        .map(|ctx| ctx.fault_start_snapshot);
    let history = state.sessions.history(&req.session_id);
    let history: Vec<_> = history
        .into_iter()
        .filter(|e| e.role == ChatRole::User || e.role == ChatRole::Assistant)
        .collect();

    let reply = state
        .engine
        .ask(&req.message, sample.as_ref(), fault_snapshot.as_ref(), &history)
        .await;

    let text = state
        .sessions
        .record_exchange(&req.session_id, req.message.clone(), reply)?;

    Ok(Json(ChatResponse { response: text, timestamp: Utc::now() }))
}

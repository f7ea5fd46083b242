//! `POST /api/logigramme` (§4.6.3, §4.8): ordered remediation checklist for
//! a fault type.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use pump_diagnostics::ChecklistStep;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LogigrammeRequest {
    pub fault_type: String,
    pub diagnosis: Option<String>,
}

/// Generate an ordered remediation checklist for a fault type
#[utoipa::path(
    post,
    path = "/api/logigramme",
    tag = "Diagnostics",
    request_body = LogigrammeRequest,
    responses(
        (status = 200, description = "Ordered checklist", body = Object),
        (status = 503, description = "LLM unavailable")
    )
)]
pub async fn logigramme(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogigrammeRequest>,
) -> Result<Json<Vec<ChecklistStep>>, ApiError> {
    let sample = state.telemetry.store.latest();
    let steps = state
        .engine
        .checklist(&req.fault_type, sample.as_ref(), req.diagnosis.as_deref())
        .await?;
    Ok(Json(steps))
}

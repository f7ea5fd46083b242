//! `GET /healthz` (§4.8, §5): process liveness plus the readiness capsule —
//! is the Bridge worker healthy, is the retrieval index built.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use pump_bridge::WorkerStatus;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub bridge_status: &'static str,
    pub index_chunk_count: usize,
    pub active_session_count: usize,
}

/// Process liveness and component readiness
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    responses((status = 200, description = "Liveness and readiness capsule", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let bridge_status = match state.bridge_health.read().unwrap().as_ref() {
        Some(h) => match h.status {
            WorkerStatus::Healthy => "healthy",
            WorkerStatus::Degraded => "degraded",
            WorkerStatus::Unhealthy => "unhealthy",
        },
        None => "starting",
    };

    Json(HealthResponse {
        status: "ok",
        bridge_status,
        index_chunk_count: state.index.len(),
        active_session_count: state.sessions.session_count(),
    })
}

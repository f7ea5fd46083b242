//! `POST /api/diagnose` (§4.8, §4.6.1).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use pump_diagnostics::Reference;
use serde::{Deserialize, Serialize};

use crate::api::dto::{SampleInput, ShutdownDecisionView};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct DiagnoseRequest {
    #[schema(value_type = Object)]
    pub sensor_data: SampleInput,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DiagnoseResponse {
    pub diagnosis: String,
    #[schema(value_type = Object)]
    pub shutdown_decision: ShutdownDecisionView,
    #[schema(value_type = Vec<Object>)]
    pub references: Vec<Reference>,
    pub fault_detected: bool,
}

/// Run the diagnostic engine against a sensor sample
#[utoipa::path(
    post,
    path = "/api/diagnose",
    tag = "Diagnostics",
    request_body = DiagnoseRequest,
    responses(
        (status = 200, description = "Diagnostic report", body = DiagnoseResponse),
        (status = 400, description = "Invalid sensor_data"),
        (status = 503, description = "LLM unavailable")
    )
)]
pub async fn diagnose(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DiagnoseRequest>,
) -> Result<Json<DiagnoseResponse>, ApiError> {
    let sample = req.sensor_data.into();
    let report = state.engine.diagnose(&sample).await.map_err(ApiError)?;

    Ok(Json(DiagnoseResponse {
        diagnosis: report.diagnosis_text,
        shutdown_decision: report.shutdown_decision.into(),
        references: report.references,
        fault_detected: report.fault_detected,
    }))
}

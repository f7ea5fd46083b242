//! Telemetry read endpoints (§4.8): current sample, rolling history, fault
//! context, and the enumerable set of fault identifiers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use pump_core::{FaultContext, FaultState, PumpError};
use serde::Serialize;

use crate::api::dto::SampleView;
use crate::error::ApiError;
use crate::state::AppState;

/// Current sensor sample
#[utoipa::path(
    get,
    path = "/api/sensor-data",
    tag = "Telemetry",
    responses(
        (status = 200, description = "The most recently ingested sample", body = Object),
        (status = 404, description = "Nothing ingested yet")
    )
)]
pub async fn sensor_data(State(state): State<Arc<AppState>>) -> Result<Json<SampleView>, ApiError> {
    let sample = state.telemetry.store.latest().ok_or(PumpError::NoData)?;
    Ok(Json(SampleView::from(&sample)))
}

/// Rolling sample history
#[utoipa::path(
    get,
    path = "/api/sensor-history",
    tag = "Telemetry",
    responses((status = 200, description = "The rolling sample history, oldest first", body = Object))
)]
pub async fn sensor_history(State(state): State<Arc<AppState>>) -> Json<Vec<SampleView>> {
    let history = state.telemetry.store.history();
    Json(history.iter().map(SampleView::from).collect())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FaultTypesResponse {
    pub fault_types: Vec<&'static str>,
}

/// Enumerate valid fault identifiers
#[utoipa::path(
    get,
    path = "/api/fault-types",
    tag = "Telemetry",
    responses((status = 200, description = "Every fault identifier the pump simulator can report", body = FaultTypesResponse))
)]
pub async fn fault_types() -> Json<FaultTypesResponse> {
    Json(FaultTypesResponse {
        fault_types: FaultState::all().iter().map(FaultState::as_str).collect(),
    })
}

#[derive(Serialize)]
pub struct FaultContextResponse {
    pub active: Option<FaultContext>,
    pub events: Vec<FaultContext>,
}

/// Active fault context plus the bounded event log
#[utoipa::path(
    get,
    path = "/api/fault-context",
    tag = "Telemetry",
    responses((status = 200, description = "Active fault context and recent transitions", body = Object))
)]
pub async fn fault_context(State(state): State<Arc<AppState>>) -> Json<FaultContextResponse> {
    Json(FaultContextResponse {
        active: state.telemetry.fault_tracker.active(),
        events: state.telemetry.fault_tracker.events(),
    })
}

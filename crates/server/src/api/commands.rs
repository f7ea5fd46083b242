//! Outbound command endpoints (§4.8): publish `InjectFault`/`EmergencyStop`
//! onto the command topic via the Bridge.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use pump_core::{Command, CommandKind, FaultState, PumpError};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct InjectFaultRequest {
    pub fault_type: String,
    pub temperature_target: Option<f64>,
    pub temperature_band: Option<f64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CommandAck {
    pub request_id: String,
}

fn parse_fault_type(raw: &str) -> Result<FaultState, ApiError> {
    FaultState::all()
        .iter()
        .copied()
        .find(|f| f.as_str().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| ApiError(PumpError::InvalidInput(format!("unknown fault_type: '{raw}'"))))
}

/// Publish an InjectFault command
#[utoipa::path(
    post,
    path = "/api/inject-fault",
    tag = "Commands",
    request_body = InjectFaultRequest,
    responses(
        (status = 200, description = "Command published", body = CommandAck),
        (status = 400, description = "Unknown fault_type"),
        (status = 503, description = "Publish failed")
    )
)]
pub async fn inject_fault(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InjectFaultRequest>,
) -> Result<Json<CommandAck>, ApiError> {
    let fault_type = parse_fault_type(&req.fault_type)?;
    let command = Command {
        command: CommandKind::InjectFault,
        fault_type: Some(fault_type),
        temperature_target: req.temperature_target,
        temperature_band: req.temperature_band,
        request_id: Command::new_request_id(),
        asset_id: state.config.broker.asset_id.clone(),
        timestamp: Utc::now(),
    };
    state.bridge.send_command(&command).await.map_err(PumpError::from)?;
    Ok(Json(CommandAck { request_id: command.request_id }))
}

/// Publish an EmergencyStop command
#[utoipa::path(
    post,
    path = "/api/emergency-stop",
    tag = "Commands",
    responses(
        (status = 200, description = "Command published", body = CommandAck),
        (status = 503, description = "Publish failed")
    )
)]
pub async fn emergency_stop(State(state): State<Arc<AppState>>) -> Result<Json<CommandAck>, ApiError> {
    let command = Command {
        command: CommandKind::EmergencyStop,
        fault_type: None,
        temperature_target: None,
        temperature_band: None,
        request_id: Command::new_request_id(),
        asset_id: state.config.broker.asset_id.clone(),
        timestamp: Utc::now(),
    };
    state.bridge.send_command(&command).await.map_err(PumpError::from)?;
    Ok(Json(CommandAck { request_id: command.request_id }))
}

//! HTTP router construction (§4.8): assembles every REST route, the
//! WebSocket upgrade route, CORS, and the OpenAPI docs into one `Router`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::state::AppState;
use crate::{api, live};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/sensor-data", get(api::sensor_data))
        .route("/api/sensor-history", get(api::sensor_history))
        .route("/api/fault-types", get(api::fault_types))
        .route("/api/fault-context", get(api::fault_context))
        .route("/api/inject-fault", post(api::inject_fault))
        .route("/api/emergency-stop", post(api::emergency_stop))
        .route("/api/diagnose", post(api::diagnose))
        .route("/api/chat", post(api::chat))
        .route("/api/logigramme", post(api::logigramme))
        .route("/ws/sensor-stream", get(live::ws_upgrade))
        .route("/healthz", get(api::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI 3.1 spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pump-telemetry API",
        version = "0.1.0",
        description = "Real-time telemetry ingestion, fault tracking, safety evaluation, and LLM-backed diagnostics for a monitored pump.",
    ),
    tags(
        (name = "Telemetry", description = "Current sample, rolling history, fault context, and fault identifiers"),
        (name = "Commands", description = "Outbound InjectFault / EmergencyStop commands"),
        (name = "Diagnostics", description = "LLM-backed diagnosis, chat, and remediation checklists"),
        (name = "Health", description = "Process liveness and component readiness"),
    ),
    paths(
        crate::api::sensor::sensor_data,
        crate::api::sensor::sensor_history,
        crate::api::sensor::fault_types,
        crate::api::sensor::fault_context,
        crate::api::commands::inject_fault,
        crate::api::commands::emergency_stop,
        crate::api::diagnose::diagnose,
        crate::api::chat::chat,
        crate::api::logigramme::logigramme,
        crate::api::health::health,
    ),
    components(schemas(
        crate::api::sensor::FaultTypesResponse,
        crate::api::commands::InjectFaultRequest,
        crate::api::commands::CommandAck,
        crate::api::diagnose::DiagnoseRequest,
        crate::api::diagnose::DiagnoseResponse,
        crate::api::chat::ChatRequest,
        crate::api::chat::ChatResponse,
        crate::api::logigramme::LogigrammeRequest,
        crate::api::health::HealthResponse,
    ))
)]
pub struct ApiDoc;

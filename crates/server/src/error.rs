//! Maps the shared `PumpError` taxonomy onto HTTP responses (§7). Every
//! error body has shape `{error: {kind, message, retry_after_ms?}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pump_core::PumpError;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_ms: Option<u64>,
}

pub struct ApiError(pub PumpError);

impl From<PumpError> for ApiError {
    fn from(e: PumpError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PumpError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PumpError::NoData => StatusCode::NOT_FOUND,
            PumpError::BrokerUnavailable(_) | PumpError::PublishFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            PumpError::RetrievalUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PumpError::IndexBuildFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PumpError::LlmUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PumpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.0.kind(),
                message: self.0.to_string(),
                retry_after_ms: self.0.retry_after_ms(),
            },
        };
        (status, Json(body)).into_response()
    }
}

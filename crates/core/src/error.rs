use thiserror::Error;

/// Shared error taxonomy for the whole workspace. Each variant maps to exactly
/// one HTTP status at the API layer; see `pump-server`'s `IntoResponse` impl.
#[derive(Error, Debug)]
pub enum PumpError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no data available yet")]
    NoData,

    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("failed to publish command: {0}")]
    PublishFailed(String),

    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("index build failed: {0}")]
    IndexBuildFailed(String),

    #[error("LLM call failed: {0}")]
    LlmUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PumpError {
    pub fn kind(&self) -> &'static str {
        match self {
            PumpError::InvalidInput(_) => "InvalidInput",
            PumpError::NoData => "NoData",
            PumpError::BrokerUnavailable(_) => "BrokerUnavailable",
            PumpError::PublishFailed(_) => "PublishFailed",
            PumpError::RetrievalUnavailable(_) => "RetrievalUnavailable",
            PumpError::IndexBuildFailed(_) => "IndexBuildFailed",
            PumpError::LlmUnavailable(_) => "LLMUnavailable",
            PumpError::Internal(_) => "InternalError",
        }
    }

    /// Transient failures the caller may retry; carries the `retry_after_ms`
    /// hint surfaced in the `{error:{...}}` body.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            PumpError::BrokerUnavailable(_) | PumpError::PublishFailed(_) => Some(2_000),
            PumpError::LlmUnavailable(_) => Some(5_000),
            _ => None,
        }
    }
}

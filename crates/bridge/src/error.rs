use thiserror::Error;

/// Errors that can occur in the bridge's pub/sub transport layer.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("zeromq error: {0}")]
    Zmq(#[from] zeromq::ZmqError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("connection timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("publish failed: {0}")]
    PublishFailed(String),
}

impl From<BridgeError> for pump_core::PumpError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::BrokerUnavailable(m) => pump_core::PumpError::BrokerUnavailable(m),
            BridgeError::PublishFailed(m) => pump_core::PumpError::PublishFailed(m),
            other => pump_core::PumpError::BrokerUnavailable(other.to_string()),
        }
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BridgeError;

/// A raw (topic, JSON payload) pair as it travels over the wire. Kept as raw
/// bytes at this layer — the Bridge decodes the payload into a `Sample` or
/// `Command` one level up.
#[derive(Debug, Clone)]
pub struct WireMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Publishes messages to one or more subscribers via PUB/SUB pattern.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BridgeError>;
}

/// Blanket implementation so `Arc<dyn EventPublisher>` can be used directly.
#[async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BridgeError> {
        (**self).publish(topic, payload).await
    }
}

/// Subscribes to messages matching topic filters via PUB/SUB pattern.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    async fn subscribe(&self, topic_prefix: &str) -> Result<(), BridgeError>;
    async fn recv(&self) -> Result<WireMessage, BridgeError>;
}

//! The Bridge itself: wires an [`EventSubscriber`]/[`EventPublisher`] pair to
//! the telemetry/command topics, normalizing inbound samples and serializing
//! outbound commands. This is the Worker registered with the WorkerRunner for
//! the service's receive loop (§5).

use std::sync::Arc;

use async_trait::async_trait;
use pump_core::{Command, Sample};
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::error::BridgeError;
use crate::normalize::normalize_telemetry;
use crate::traits::{EventPublisher, EventSubscriber};
use crate::worker::Worker;

/// Bridges a ZeroMQ (or other) pub/sub transport to the rest of the service.
///
/// Generic over the publisher/subscriber traits rather than the concrete
/// ZeroMQ types so a test double can stand in for the broker.
pub struct Bridge<S, P> {
    subscriber: S,
    publisher: Arc<P>,
    telemetry_topic: String,
    command_topic: String,
    samples_tx: mpsc::Sender<Sample>,
}

impl<S, P> Bridge<S, P>
where
    S: EventSubscriber + 'static,
    P: EventPublisher + 'static,
{
    pub fn new(
        subscriber: S,
        publisher: Arc<P>,
        telemetry_topic: impl Into<String>,
        command_topic: impl Into<String>,
        samples_tx: mpsc::Sender<Sample>,
    ) -> Self {
        Self {
            subscriber,
            publisher,
            telemetry_topic: telemetry_topic.into(),
            command_topic: command_topic.into(),
            samples_tx,
        }
    }

    /// Publish a command onto the command topic as JSON.
    pub async fn send_command(&self, command: &Command) -> Result<(), BridgeError> {
        let payload = serde_json::to_vec(command)?;
        self.publisher.publish(&self.command_topic, &payload).await
    }

    async fn receive_loop(&self) -> Result<(), BridgeError> {
        self.subscriber.subscribe(&self.telemetry_topic).await?;
        loop {
            let msg = self.subscriber.recv().await?;
            let payload: serde_json::Value = match serde_json::from_slice(&msg.payload) {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, topic = %msg.topic, "dropping unparseable telemetry payload");
                    continue;
                }
            };
            let sample = normalize_telemetry(&payload);
            if self.samples_tx.send(sample).await.is_err() {
                error!("sample channel closed, stopping receive loop");
                return Ok(());
            }
        }
    }
}

#[async_trait]
impl<S, P> Worker for Bridge<S, P>
where
    S: EventSubscriber + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    async fn start(&self) -> Result<(), BridgeError> {
        self.receive_loop().await
    }

    async fn stop(&self) -> Result<(), BridgeError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "bridge"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::WireMessage;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct StubSubscriber {
        messages: Mutex<Vec<WireMessage>>,
    }

    #[async_trait]
    impl EventSubscriber for StubSubscriber {
        async fn subscribe(&self, _topic_prefix: &str) -> Result<(), BridgeError> {
            Ok(())
        }

        async fn recv(&self) -> Result<WireMessage, BridgeError> {
            let mut messages = self.messages.lock().unwrap();
            if messages.is_empty() {
                std::future::pending::<()>().await;
            }
            Ok(messages.remove(0))
        }
    }

    struct StubPublisher {
        sent: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl EventPublisher for StubPublisher {
        async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BridgeError> {
            self.sent.lock().unwrap().push((topic.to_string(), payload.to_vec()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn normalizes_and_forwards_telemetry() {
        let sub = StubSubscriber {
            messages: Mutex::new(vec![WireMessage {
                topic: "digital_twin/pump01/telemetry".into(),
                payload: br#"{"fault_state":"Normal","amps_A":10,"amps_B":10,"amps_C":10}"#.to_vec(),
            }]),
        };
        let publisher = Arc::new(StubPublisher { sent: Mutex::new(Vec::new()) });
        let (tx, mut rx) = mpsc::channel(4);
        let bridge = Bridge::new(sub, publisher, "digital_twin/pump01/telemetry", "digital_twin/pump01/command", tx);

        tokio::spawn(async move {
            let _ = bridge.receive_loop().await;
        });

        let sample = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed");
        assert_eq!(sample.i_avg, 10.0);
    }

    #[tokio::test]
    async fn send_command_serializes_as_json() {
        let sub = StubSubscriber { messages: Mutex::new(Vec::new()) };
        let publisher = Arc::new(StubPublisher { sent: Mutex::new(Vec::new()) });
        let (tx, _rx) = mpsc::channel(4);
        let bridge = Bridge::new(sub, publisher.clone(), "t", "c", tx);

        let command = Command {
            command: pump_core::CommandKind::Reset,
            fault_type: None,
            temperature_target: None,
            temperature_band: None,
            request_id: "req-1".into(),
            asset_id: "pump01".into(),
            timestamp: chrono::Utc::now(),
        };
        bridge.send_command(&command).await.unwrap();

        let sent = publisher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "c");
    }
}

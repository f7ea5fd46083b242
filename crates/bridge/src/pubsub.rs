use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use zeromq::prelude::*;
use zeromq::{PubSocket, SubSocket, ZmqMessage};

use crate::error::BridgeError;
use crate::traits::{EventPublisher, EventSubscriber, WireMessage};
use crate::transport::Transport;

/// Connect retry budget used by `start()` (external interface contract):
/// exponential backoff, 8 attempts, delay capped at 30s.
const CONNECT_MAX_ATTEMPTS: u32 = 8;
const CONNECT_BASE_DELAY: Duration = Duration::from_millis(250);
const CONNECT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Retries `connect` with exponential backoff, returning `BrokerUnavailable`
/// once the attempt budget is exhausted.
async fn connect_with_retry<F, Fut, T, E>(endpoint: &str, mut connect: F) -> Result<T, BridgeError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match connect().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= CONNECT_MAX_ATTEMPTS => {
                return Err(BridgeError::BrokerUnavailable(format!(
                    "{endpoint}: giving up after {attempt} attempts: {e}"
                )));
            }
            Err(e) => {
                let delay = CONNECT_BASE_DELAY
                    .saturating_mul(1 << (attempt - 1))
                    .min(CONNECT_MAX_DELAY);
                warn!(endpoint, attempt, delay = ?delay, error = %e, "connect attempt failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// ZeroMQ PUB socket publisher.
///
/// Messages are sent as two-frame ZMQ messages: `[topic, payload]`. The
/// payload is whatever bytes the caller hands in — the Bridge passes plain
/// JSON here, matching the wire shapes in the external interface contract,
/// rather than wrapping it in a binary envelope.
pub struct ZmqPublisher {
    socket: Mutex<PubSocket>,
}

impl ZmqPublisher {
    /// Connect to a broker frontend endpoint.
    #[instrument(skip_all, fields(endpoint = %transport))]
    pub async fn connect(transport: &Transport) -> Result<Self, BridgeError> {
        let endpoint = transport.endpoint();
        info!(endpoint = %endpoint, "connecting PUB socket to broker");
        let socket = connect_with_retry(&endpoint, || {
            let endpoint = endpoint.clone();
            async move {
                let mut socket = PubSocket::new();
                socket.connect(&endpoint).await?;
                Ok(socket)
            }
        })
        .await?;
        Ok(Self { socket: Mutex::new(socket) })
    }

    /// Bind directly to an endpoint (no broker in between).
    #[instrument(skip_all, fields(endpoint = %transport))]
    pub async fn bind(transport: &Transport) -> Result<Self, BridgeError> {
        let mut socket = PubSocket::new();
        let endpoint = transport.endpoint();
        info!(endpoint = %endpoint, "binding PUB socket");
        socket.bind(&endpoint).await?;
        Ok(Self { socket: Mutex::new(socket) })
    }
}

#[async_trait]
impl EventPublisher for ZmqPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BridgeError> {
        let mut zmq_msg = ZmqMessage::from(topic);
        zmq_msg.push_back(payload.to_vec().into());

        let mut socket = self.socket.lock().await;
        socket.send(zmq_msg).await?;

        debug!(topic, "published message");
        Ok(())
    }
}

/// ZeroMQ SUB socket subscriber.
pub struct ZmqSubscriber {
    socket: Mutex<SubSocket>,
}

impl ZmqSubscriber {
    #[instrument(skip_all, fields(endpoint = %transport))]
    pub async fn connect(transport: &Transport) -> Result<Self, BridgeError> {
        let endpoint = transport.endpoint();
        info!(endpoint = %endpoint, "connecting SUB socket");
        let socket = connect_with_retry(&endpoint, || {
            let endpoint = endpoint.clone();
            async move {
                let mut socket = SubSocket::new();
                socket.connect(&endpoint).await?;
                Ok(socket)
            }
        })
        .await?;
        Ok(Self { socket: Mutex::new(socket) })
    }
}

#[async_trait]
impl EventSubscriber for ZmqSubscriber {
    async fn subscribe(&self, topic_prefix: &str) -> Result<(), BridgeError> {
        let mut socket = self.socket.lock().await;
        socket.subscribe(topic_prefix).await?;
        info!(topic_prefix, "subscribed to topic prefix");
        Ok(())
    }

    /// Expects a two-frame ZMQ message `[topic, payload]`; falls back to
    /// treating a single-frame message as an empty-topic payload.
    async fn recv(&self) -> Result<WireMessage, BridgeError> {
        let mut socket = self.socket.lock().await;
        let zmq_msg = socket.recv().await?;
        let frames: Vec<_> = zmq_msg.iter().collect();

        if frames.len() >= 2 {
            let topic = String::from_utf8_lossy(frames[0].as_ref()).into_owned();
            let payload = frames[1].as_ref().to_vec();
            debug!(%topic, "received message");
            Ok(WireMessage { topic, payload })
        } else if let Some(frame) = frames.first() {
            Ok(WireMessage { topic: String::new(), payload: frame.as_ref().to_vec() })
        } else {
            Err(BridgeError::Transport("empty ZMQ message".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn connect_with_retry_succeeds_after_transient_failures() {
        let attempts = AtomicU32::new(0);
        let result = connect_with_retry("test://endpoint", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move { if n < 3 { Err("not yet") } else { Ok(()) } }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_with_retry_gives_up_after_budget_exhausted() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), BridgeError> = connect_with_retry("test://endpoint", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err("always fails") }
        })
        .await;

        assert!(matches!(result, Err(BridgeError::BrokerUnavailable(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), CONNECT_MAX_ATTEMPTS);
    }

    #[test]
    fn zmq_message_two_frame_construction() {
        let topic = "digital_twin.test.topic";
        let payload_bytes = b"{\"ok\":true}";

        let mut msg = ZmqMessage::from(topic);
        msg.push_back(payload_bytes.to_vec().into());

        let frames: Vec<_> = msg.iter().collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref(), topic.as_bytes());
        assert_eq!(frames[1].as_ref(), payload_bytes);
    }

    #[tokio::test]
    async fn direct_pub_sub_roundtrip() {
        let transport = Transport::tcp("127.0.0.1", 15700);

        let publisher = ZmqPublisher::bind(&transport).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let subscriber = ZmqSubscriber::connect(&transport).await.unwrap();
        subscriber.subscribe("digital_twin/pump01").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        publisher
            .publish("digital_twin/pump01/telemetry", br#"{"voltage":230.0}"#)
            .await
            .unwrap();

        let received = tokio::time::timeout(std::time::Duration::from_secs(2), subscriber.recv())
            .await
            .expect("timed out waiting for message")
            .unwrap();

        assert_eq!(received.topic, "digital_twin/pump01/telemetry");
        assert_eq!(received.payload, br#"{"voltage":230.0}"#);
    }

    #[tokio::test]
    async fn topic_filtering_works() {
        let transport = Transport::tcp("127.0.0.1", 15701);

        let publisher = ZmqPublisher::bind(&transport).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let subscriber = ZmqSubscriber::connect(&transport).await.unwrap();
        subscriber.subscribe("digital_twin/pump01/telemetry").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        publisher
            .publish("digital_twin/pump01/telemetry", b"{}")
            .await
            .unwrap();
        publisher
            .publish("digital_twin/pump01/command", b"{}")
            .await
            .unwrap();

        let received = tokio::time::timeout(std::time::Duration::from_secs(2), subscriber.recv())
            .await
            .expect("timed out")
            .unwrap();
        assert_eq!(received.topic, "digital_twin/pump01/telemetry");

        let timeout_result =
            tokio::time::timeout(std::time::Duration::from_millis(300), subscriber.recv()).await;
        assert!(timeout_result.is_err(), "should not receive filtered topic");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_message() {
        let transport = Transport::tcp("127.0.0.1", 15720);

        let publisher = ZmqPublisher::bind(&transport).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let sub1 = ZmqSubscriber::connect(&transport).await.unwrap();
        let sub2 = ZmqSubscriber::connect(&transport).await.unwrap();
        sub1.subscribe("digital_twin").await.unwrap();
        sub2.subscribe("digital_twin").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        publisher.publish("digital_twin/pump01/telemetry", b"42").await.unwrap();

        let r1 = tokio::time::timeout(std::time::Duration::from_secs(2), sub1.recv())
            .await
            .expect("sub1 timed out")
            .unwrap();
        let r2 = tokio::time::timeout(std::time::Duration::from_secs(2), sub2.recv())
            .await
            .expect("sub2 timed out")
            .unwrap();

        assert_eq!(r1.payload, b"42");
        assert_eq!(r2.payload, b"42");
    }
}

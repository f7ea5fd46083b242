//! ZeroMQ pub/sub bridge between the broker and the rest of the service.
//!
//! Normalizes inbound telemetry (§4.1) and serializes outbound commands onto
//! their respective topics, and provides the [`Worker`]/[`WorkerRunner`]
//! lifecycle used to run it as one of the service's long-lived loops.

pub mod bridge;
pub mod error;
pub mod normalize;
pub mod pubsub;
pub mod traits;
pub mod transport;
pub mod worker;

pub use bridge::Bridge;
pub use error::BridgeError;
pub use normalize::normalize_telemetry;
pub use pubsub::{ZmqPublisher, ZmqSubscriber};
pub use traits::{EventPublisher, EventSubscriber, WireMessage};
pub use transport::Transport;
pub use worker::{Worker, WorkerHealth, WorkerRunner, WorkerRunnerConfig, WorkerStatus};

//! Shared application state (§5): one `Arc<AppState>` handed to every
//! handler, each field internally synchronized so no handler ever takes a
//! lock across an `.await` boundary that crosses into another component.

use std::sync::{Arc, RwLock};

use pump_bridge::{Bridge, WorkerHealth, ZmqPublisher, ZmqSubscriber};
use pump_core::Config;
use pump_diagnostics::{ChatSessions, DiagnosticEngine};
use pump_retrieval::RetrievalIndex;
use pump_store::Telemetry;

/// The concrete Bridge wiring used by this process: ZeroMQ in, ZeroMQ out.
pub type PumpBridge = Bridge<ZmqSubscriber, ZmqPublisher>;

pub struct AppState {
    pub config: Config,
    pub telemetry: Telemetry,
    pub sessions: ChatSessions,
    pub engine: DiagnosticEngine,
    pub index: Arc<RetrievalIndex>,
    pub bridge: Arc<PumpBridge>,
    /// Most recent health ping from the Bridge's `WorkerRunner`, updated by
    /// the `on_health` callback passed to `WorkerRunner::run` in `main`.
    pub bridge_health: Arc<RwLock<Option<WorkerHealth>>>,
}

mod api;
mod error;
mod live;
mod router;
mod state;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use pump_bridge::{Bridge, Transport, Worker, WorkerRunner, WorkerRunnerConfig, ZmqPublisher, ZmqSubscriber};
use pump_core::Config;
use pump_diagnostics::{ChatSessions, DiagnosticEngine};
use pump_retrieval::{ChunkConfig, RetrievalIndex};
use pump_store::Telemetry;
use tokio::sync::{mpsc, Notify};
use tracing::{error, info};

use state::{AppState, PumpBridge};

async fn build_index(config: &Config) -> anyhow::Result<Arc<RetrievalIndex>> {
    let embedder = pump_retrieval::create_embedder(
        &config.embedding,
        &config.ollama,
        config.llm.openai_api_key.as_deref(),
    );

    let Some(reference_document) = config.retrieval.reference_document.as_ref() else {
        info!("no REFERENCE_DOCUMENT configured — retrieval index is empty");
        return Ok(Arc::new(RetrievalIndex::empty()));
    };

    let embedder = match embedder {
        Ok(e) => e,
        Err(e) => {
            error!(error = %e, "embedding backend unavailable — retrieval index is empty");
            return Ok(Arc::new(RetrievalIndex::empty()));
        }
    };

    let index = RetrievalIndex::load_or_build(
        reference_document,
        "reference",
        embedder,
        &config.retrieval.index_persist_dir,
        &ChunkConfig::default(),
    )
    .await?;
    info!(chunks = index.len(), "retrieval index ready");
    Ok(Arc::new(index))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).with_level(true).init();

    pump_core::config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let index = build_index(&config).await?;

    let provider: Arc<dyn pump_llm::LlmProvider> =
        Arc::from(pump_llm::create_provider(&config.llm, &config.ollama)?);
    let engine = DiagnosticEngine::new(provider, index.clone(), config.llm.temperature, config.llm.max_tokens);

    let telemetry = Telemetry::new(config.bounds.history_capacity, config.bounds.fault_event_cap);
    let sessions = ChatSessions::new(config.bounds.chat_turn_cap, config.bounds.session_cap);

    let transport = Transport::tcp(config.broker.host.clone(), config.broker.port);
    let (samples_tx, mut samples_rx) = mpsc::channel(256);
    let subscriber = ZmqSubscriber::connect(&transport).await?;
    let publisher = Arc::new(ZmqPublisher::connect(&transport).await?);
    let bridge: Arc<PumpBridge> = Arc::new(Bridge::new(
        subscriber,
        publisher,
        config.broker.telemetry_topic(),
        config.broker.command_topic(),
        samples_tx,
    ));

    let bridge_health = Arc::new(RwLock::new(None));

    let state = Arc::new(AppState {
        config: config.clone(),
        telemetry: telemetry.clone(),
        sessions,
        engine,
        index,
        bridge: bridge.clone(),
        bridge_health: bridge_health.clone(),
    });

    // (1) Bridge receive loop, run as a Worker under the WorkerRunner.
    let shutdown = Arc::new(Notify::new());
    let worker: Arc<dyn Worker> = bridge.clone();
    let runner_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let runner_config = WorkerRunnerConfig::new("bridge");
        if let Err(e) = WorkerRunner::run(worker, runner_config, runner_shutdown, move |health| {
            *bridge_health.write().unwrap() = Some(health);
        })
        .await
        {
            error!(error = %e, "bridge worker exited with an error");
        }
    });

    // Drains normalized samples off the Bridge into the Store/FaultTracker.
    let drain_telemetry = telemetry.clone();
    tokio::spawn(async move {
        while let Some(sample) = samples_rx.recv().await {
            drain_telemetry.ingest(sample);
        }
    });

    // (3) Ticker driving periodic housekeeping — currently just a liveness log.
    let ticker_telemetry = telemetry.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            info!(
                history_len = ticker_telemetry.store.history().len(),
                subscribers = ticker_telemetry.store.subscriber_count(),
                "telemetry tick"
            );
        }
    });

    let app = router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "server listening");

    // (2) HTTP/WebSocket server dispatch; (4) is the tokio runtime's normal
    // per-request task pool, which every async handler above already uses.
    axum::serve(listener, app).await?;
    shutdown.notify_waiters();
    Ok(())
}

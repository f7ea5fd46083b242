//! Worker trait and lifecycle management.
//!
//! Provides the [`Worker`] trait for defining long-running processes and
//! [`WorkerRunner`] for executing the event loop with automatic health pings
//! and graceful shutdown. The Bridge's receive loop is one such worker; the
//! periodic ticker mentioned in the concurrency model is another.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::error::BridgeError;

/// A long-running process that participates in the service's lifecycle.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Called once when the worker starts. Set up subscriptions, open connections, etc.
    async fn start(&self) -> Result<(), BridgeError>;

    /// Called once during graceful shutdown. Drain in-flight work, close connections.
    async fn stop(&self) -> Result<(), BridgeError>;

    /// Human-readable name for this worker (used in health pings and logging).
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHealth {
    pub worker_id: String,
    pub status: WorkerStatus,
}

pub struct WorkerRunnerConfig {
    pub name: String,
    pub health_interval: Duration,
    pub shutdown_timeout: Duration,
}

impl WorkerRunnerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            health_interval: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// Runs a [`Worker`] with automatic health pings and graceful shutdown.
pub struct WorkerRunner;

impl WorkerRunner {
    /// Run a worker to completion. Blocks until `shutdown_notify` is triggered.
    /// `on_health` is invoked with each health ping (e.g. to expose it on `/healthz`).
    pub async fn run(
        worker: Arc<dyn Worker>,
        config: WorkerRunnerConfig,
        shutdown_notify: Arc<Notify>,
        on_health: impl Fn(WorkerHealth) + Send + Sync + 'static,
    ) -> Result<(), BridgeError> {
        let worker_name = config.name.clone();
        info!(worker = %worker_name, "starting worker");

        worker.start().await?;
        info!(worker = %worker_name, "worker started");
        on_health(WorkerHealth { worker_id: worker_name.clone(), status: WorkerStatus::Healthy });

        let health_shutdown = shutdown_notify.clone();
        let health_name = worker_name.clone();
        let health_interval = config.health_interval;
        let on_health = Arc::new(on_health);
        let health_on_health = on_health.clone();
        let health_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(health_interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        health_on_health(WorkerHealth { worker_id: health_name.clone(), status: WorkerStatus::Healthy });
                    }
                    _ = health_shutdown.notified() => break,
                }
            }
        });

        shutdown_notify.notified().await;
        health_handle.abort();

        info!(worker = %worker_name, timeout = ?config.shutdown_timeout, "stopping worker");
        match tokio::time::timeout(config.shutdown_timeout, worker.stop()).await {
            Ok(Ok(())) => info!(worker = %worker_name, "worker stopped gracefully"),
            Ok(Err(e)) => warn!(worker = %worker_name, error = %e, "worker stop returned error"),
            Err(_) => warn!(worker = %worker_name, "worker stop timed out, forcing shutdown"),
        }

        on_health(WorkerHealth { worker_id: worker_name.clone(), status: WorkerStatus::Unhealthy });
        info!(worker = %worker_name, "worker shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    struct TestWorker {
        started: AtomicBool,
        stopped: AtomicBool,
        start_count: AtomicU32,
        stop_count: AtomicU32,
    }

    impl TestWorker {
        fn new() -> Self {
            Self {
                started: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                start_count: AtomicU32::new(0),
                stop_count: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Worker for TestWorker {
        async fn start(&self) -> Result<(), BridgeError> {
            self.started.store(true, Ordering::SeqCst);
            self.start_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> Result<(), BridgeError> {
            self.stopped.store(true, Ordering::SeqCst);
            self.stop_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "test-worker"
        }
    }

    #[tokio::test]
    async fn worker_lifecycle_start_health_stop() {
        let worker = Arc::new(TestWorker::new());
        let shutdown = Arc::new(Notify::new());
        let pings: Arc<Mutex<Vec<WorkerHealth>>> = Arc::new(Mutex::new(Vec::new()));

        let mut config = WorkerRunnerConfig::new("test-worker");
        config.health_interval = Duration::from_millis(50);
        config.shutdown_timeout = Duration::from_secs(1);

        let w = worker.clone();
        let s = shutdown.clone();
        let pings_cb = pings.clone();
        let handle = tokio::spawn(async move {
            WorkerRunner::run(w, config, s, move |h| pings_cb.lock().unwrap().push(h)).await
        });

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(worker.started.load(Ordering::SeqCst));
        assert!(pings.lock().unwrap().len() >= 2);

        shutdown.notify_waiters();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runner should complete")
            .expect("join handle should not panic");
        assert!(result.is_ok());
        assert!(worker.stopped.load(Ordering::SeqCst));
        assert_eq!(worker.start_count.load(Ordering::SeqCst), 1);
        assert_eq!(worker.stop_count.load(Ordering::SeqCst), 1);

        let last = pings.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.status, WorkerStatus::Unhealthy);
    }
}

//! Thread-safe latest-sample + bounded ring buffer + fan-out (§4.2).
//!
//! Mirrors the `AppState` shared-state pattern (broadcast channel over a
//! central struct) but swaps the broadcast channel for per-subscriber bounded
//! queues so a slow subscriber only ever drops its own backlog, never the
//! history or another subscriber's stream.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use pump_core::Sample;
use tokio::sync::Notify;

const SUBSCRIBER_QUEUE_CAPACITY: usize = 256;

struct SubscriberInner {
    queue: Mutex<VecDeque<Sample>>,
    notify: Notify,
    dropped: AtomicU64,
    closed: std::sync::atomic::AtomicBool,
}

/// A live handle to the Store's sample stream. Drop or call [`close`](Handle::close)
/// to unregister.
pub struct Handle {
    id: u64,
    inner: Arc<SubscriberInner>,
    store: Arc<StoreInner>,
}

impl Handle {
    /// Wait for the next sample in ingest order. Returns `None` once closed
    /// with nothing left queued.
    pub async fn recv(&self) -> Option<Sample> {
        loop {
            if let Some(sample) = self.inner.queue.lock().unwrap().pop_front() {
                return Some(sample);
            }
            if self.inner.closed.load(Ordering::Acquire) {
                return None;
            }
            self.inner.notify.notified().await;
        }
    }

    /// Number of samples dropped from this subscriber's queue due to backpressure.
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
        self.store.subscribers.lock().unwrap().retain(|(id, _)| *id != self.id);
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.close();
    }
}

struct StoreInner {
    latest: Mutex<Option<Sample>>,
    history: Mutex<VecDeque<Sample>>,
    capacity: usize,
    subscribers: Mutex<Vec<(u64, Arc<SubscriberInner>)>>,
    next_subscriber_id: AtomicU64,
}

/// Holds the latest [`Sample`], a bounded rolling history, and fans the
/// stream out to live subscribers (e.g. the WebSocket handler).
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                latest: Mutex::new(None),
                history: Mutex::new(VecDeque::with_capacity(history_capacity)),
                capacity: history_capacity,
                subscribers: Mutex::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(0),
            }),
        }
    }

    /// Atomically replace the latest sample, append to history (evicting the
    /// oldest if full), then deliver to every registered subscriber. The
    /// whole sequence runs under one lock per sub-structure without
    /// suspending, so the order latest→history→delivery is linear across
    /// concurrent callers.
    pub fn ingest(&self, sample: Sample) {
        *self.inner.latest.lock().unwrap() = Some(sample.clone());

        {
            let mut history = self.inner.history.lock().unwrap();
            if history.len() >= self.inner.capacity {
                history.pop_front();
            }
            history.push_back(sample.clone());
        }

        let subscribers = self.inner.subscribers.lock().unwrap();
        for (_, sub) in subscribers.iter() {
            let mut queue = sub.queue.lock().unwrap();
            if queue.len() >= SUBSCRIBER_QUEUE_CAPACITY {
                queue.pop_front();
                sub.dropped.fetch_add(1, Ordering::Relaxed);
            }
            queue.push_back(sample.clone());
            drop(queue);
            sub.notify.notify_one();
        }
    }

    pub fn latest(&self) -> Option<Sample> {
        self.inner.latest.lock().unwrap().clone()
    }

    pub fn history(&self) -> Vec<Sample> {
        self.inner.history.lock().unwrap().iter().cloned().collect()
    }

    pub fn subscribe(&self) -> Handle {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let sub = Arc::new(SubscriberInner {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
            closed: std::sync::atomic::AtomicBool::new(false),
        });
        self.inner.subscribers.lock().unwrap().push((id, sub.clone()));
        Handle { id, inner: sub, store: self.inner.clone() }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().unwrap().len()
    }
}

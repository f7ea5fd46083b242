//! Normal↔Fault transition detector (§4.3). A small synchronous state
//! machine rather than the source's inline mutation of module-level
//! variables — gives one unambiguous ordering against Store ingest.

use std::collections::VecDeque;
use std::sync::Mutex;

use pump_core::{FaultContext, FaultState, Sample};

struct TrackerInner {
    previous: FaultState,
    active: Option<FaultContext>,
    events: VecDeque<FaultContext>,
    event_cap: usize,
}

#[derive(Clone)]
pub struct FaultTracker {
    inner: std::sync::Arc<Mutex<TrackerInner>>,
}

impl FaultTracker {
    pub fn new(event_cap: usize) -> Self {
        Self {
            inner: std::sync::Arc::new(Mutex::new(TrackerInner {
                previous: FaultState::Normal,
                active: None,
                events: VecDeque::new(),
                event_cap,
            })),
        }
    }

    /// Apply the transition table in §4.3 for one incoming sample.
    pub fn on_sample(&self, sample: &Sample) {
        let mut inner = self.inner.lock().unwrap();
        let previous = inner.previous;
        let current = sample.fault_state;

        match (previous.is_normal(), current.is_normal()) {
            (true, true) => {}
            (true, false) => {
                let ctx = FaultContext {
                    fault_state: current,
                    fault_start_time: sample.timestamp,
                    fault_start_snapshot: sample.clone(),
                };
                inner.active = Some(ctx.clone());
                Self::push_event(&mut inner.events, inner.event_cap, ctx);
            }
            (false, false) if previous == current => {}
            (false, false) => {
                let ctx = FaultContext {
                    fault_state: current,
                    fault_start_time: sample.timestamp,
                    fault_start_snapshot: sample.clone(),
                };
                inner.active = Some(ctx.clone());
                Self::push_event(&mut inner.events, inner.event_cap, ctx);
            }
            (false, true) => {
                inner.active = None;
            }
        }

        inner.previous = current;
    }

    fn push_event(events: &mut VecDeque<FaultContext>, cap: usize, ctx: FaultContext) {
        if events.len() >= cap {
            events.pop_front();
        }
        events.push_back(ctx);
    }

    pub fn active(&self) -> Option<FaultContext> {
        self.inner.lock().unwrap().active.clone()
    }

    pub fn events(&self) -> Vec<FaultContext> {
        self.inner.lock().unwrap().events.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(state: FaultState) -> Sample {
        Sample::new(Utc::now(), state, 0, 10.0, 10.0, 10.0, 230.0, 1.0, 5.0, 60.0)
    }

    #[test]
    fn normal_to_normal_is_a_no_op() {
        let tracker = FaultTracker::new(256);
        tracker.on_sample(&sample(FaultState::Normal));
        tracker.on_sample(&sample(FaultState::Normal));
        assert!(tracker.active().is_none());
        assert!(tracker.events().is_empty());
    }

    #[test]
    fn normal_to_fault_creates_active_context_and_event() {
        let tracker = FaultTracker::new(256);
        tracker.on_sample(&sample(FaultState::Normal));
        let fault_sample = sample(FaultState::WindingDefect);
        tracker.on_sample(&fault_sample);

        let active = tracker.active().expect("should have active context");
        assert_eq!(active.fault_state, FaultState::WindingDefect);
        assert_eq!(active.fault_start_snapshot, fault_sample);
        assert_eq!(tracker.events().len(), 1);
    }

    #[test]
    fn fault_to_different_fault_replaces_context() {
        let tracker = FaultTracker::new(256);
        tracker.on_sample(&sample(FaultState::WindingDefect));
        tracker.on_sample(&sample(FaultState::Cavitation));

        let active = tracker.active().unwrap();
        assert_eq!(active.fault_state, FaultState::Cavitation);
        assert_eq!(tracker.events().len(), 2);
    }

    #[test]
    fn fault_to_normal_clears_active_context() {
        let tracker = FaultTracker::new(256);
        tracker.on_sample(&sample(FaultState::Overload));
        tracker.on_sample(&sample(FaultState::Normal));
        assert!(tracker.active().is_none());
        assert_eq!(tracker.events().len(), 1);
    }

    #[test]
    fn event_log_is_bounded() {
        let tracker = FaultTracker::new(2);
        tracker.on_sample(&sample(FaultState::WindingDefect));
        tracker.on_sample(&sample(FaultState::Cavitation));
        tracker.on_sample(&sample(FaultState::BearingWear));
        assert_eq!(tracker.events().len(), 2);
        assert_eq!(tracker.events()[0].fault_state, FaultState::Cavitation);
    }
}

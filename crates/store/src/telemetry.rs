//! Ties [`FaultTracker`] and [`Store`] together in the order §4.1 and §5
//! require: a sample whose fault state differs from the prior latest sample
//! must trigger the fault transition before it is published to the Store, so
//! every subscriber sees the transition and the new sample in a consistent
//! order.

use pump_core::Sample;

use crate::fault::FaultTracker;
use crate::store::Store;

#[derive(Clone)]
pub struct Telemetry {
    pub store: Store,
    pub fault_tracker: FaultTracker,
}

impl Telemetry {
    pub fn new(history_capacity: usize, fault_event_cap: usize) -> Self {
        Self {
            store: Store::new(history_capacity),
            fault_tracker: FaultTracker::new(fault_event_cap),
        }
    }

    pub fn ingest(&self, sample: Sample) {
        self.fault_tracker.on_sample(&sample);
        self.store.ingest(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pump_core::FaultState;

    #[test]
    fn fault_transition_visible_alongside_new_sample() {
        let telemetry = Telemetry::new(60, 256);
        let normal = Sample::new(Utc::now(), FaultState::Normal, 0, 10.0, 10.0, 10.0, 230.0, 1.0, 5.0, 60.0);
        telemetry.ingest(normal);

        let fault = Sample::new(Utc::now(), FaultState::WindingDefect, 0, 10.0, 10.0, 10.0, 230.0, 1.0, 5.0, 60.0);
        telemetry.ingest(fault.clone());

        let active = telemetry.fault_tracker.active().expect("fault should be active");
        assert_eq!(active.fault_start_snapshot, fault);
        assert_eq!(telemetry.store.latest().unwrap(), fault);
    }
}

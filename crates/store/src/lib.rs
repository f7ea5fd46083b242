//! Store, FaultTracker, and SafetyEvaluator (§4.2, §4.3, §4.4).

pub mod fault;
pub mod safety;
pub mod store;
pub mod telemetry;

pub use fault::FaultTracker;
pub use safety::{evaluate, Action, Condition, SafetyDecision, Urgency};
pub use store::{Handle, Store};
pub use telemetry::Telemetry;

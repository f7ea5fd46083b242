//! Wire-shape views (§6) over the core domain types. The core `Sample` and
//! `SafetyDecision` serialize flat, in the shape most convenient for Rust
//! callers inside the workspace; the REST surface nests amperage under one
//! key and adds presentation-only fields (`icon`, `message`,
//! `recommendation`) that have no bearing on the safety decision itself.

use chrono::{DateTime, Utc};
use pump_core::{FaultState, Sample};
use pump_store::{Action, Condition, SafetyDecision, Urgency};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Amperage {
    pub phase_a: f64,
    pub phase_b: f64,
    pub phase_c: f64,
    pub average: f64,
    pub imbalance_pct: f64,
}

#[derive(Debug, Serialize)]
pub struct SampleView {
    pub timestamp: DateTime<Utc>,
    pub fault_state: FaultState,
    pub fault_duration_s: u64,
    pub amperage: Amperage,
    pub voltage: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl From<&Sample> for SampleView {
    fn from(s: &Sample) -> Self {
        Self {
            timestamp: s.timestamp,
            fault_state: s.fault_state,
            fault_duration_s: s.fault_duration_s,
            amperage: Amperage {
                phase_a: s.i_a,
                phase_b: s.i_b,
                phase_c: s.i_c,
                average: s.i_avg,
                imbalance_pct: s.imbalance_pct,
            },
            voltage: s.voltage,
            vibration: s.vibration,
            pressure: s.pressure,
            temperature: s.temperature,
        }
    }
}

impl From<Sample> for SampleView {
    fn from(s: Sample) -> Self {
        Self::from(&s)
    }
}

/// Deserializable counterpart to [`SampleView`], accepted wherever a
/// request body carries a sample (e.g. `POST /api/diagnose`). `i_avg` and
/// `imbalance_pct` are always recomputed from the phase currents rather
/// than trusted from the client, the same invariant inbound telemetry
/// enforces.
#[derive(Debug, Deserialize)]
pub struct AmperageInput {
    pub phase_a: f64,
    pub phase_b: f64,
    pub phase_c: f64,
}

#[derive(Debug, Deserialize)]
pub struct SampleInput {
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub fault_state: FaultState,
    #[serde(default)]
    pub fault_duration_s: u64,
    pub amperage: AmperageInput,
    pub voltage: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl From<SampleInput> for Sample {
    fn from(s: SampleInput) -> Self {
        Sample::new(
            s.timestamp,
            s.fault_state,
            s.fault_duration_s,
            s.amperage.phase_a,
            s.amperage.phase_b,
            s.amperage.phase_c,
            s.voltage,
            s.vibration,
            s.pressure,
            s.temperature,
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ShutdownDecisionView {
    pub action: Action,
    pub urgency: Urgency,
    pub icon: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub critical_conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warning_conditions: Vec<Condition>,
    pub recommendation: &'static str,
}

impl From<SafetyDecision> for ShutdownDecisionView {
    fn from(d: SafetyDecision) -> Self {
        let (icon, message, recommendation) = match d.action {
            Action::NormalOperation => ("✅", "Operating normally", "Continue normal operation."),
            Action::ContinueThenStop => (
                "⚠️",
                "Warning conditions detected",
                "Schedule maintenance and plan for a controlled stop.",
            ),
            Action::ImmediateShutdown => (
                "🛑",
                "Critical conditions detected",
                "Shut down immediately and inspect before restarting.",
            ),
        };
        Self {
            action: d.action,
            urgency: d.urgency,
            icon,
            message,
            critical_conditions: d.critical_conditions,
            warning_conditions: d.warning_conditions,
            recommendation,
        }
    }
}

//! Pure, deterministic sample classifier (§4.4). No I/O, no shared state.

use pump_core::Sample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    NormalOperation,
    ContinueThenStop,
    ImmediateShutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub parameter: &'static str,
    pub value: f64,
    pub threshold: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyDecision {
    pub action: Action,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub critical_conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warning_conditions: Vec<Condition>,
}

fn condition(parameter: &'static str, value: f64, threshold: f64, reason: impl Into<String>) -> Condition {
    Condition { parameter, value, threshold, reason: reason.into() }
}

/// Classify a sample against the fixed threshold table in §4.4.
pub fn evaluate(sample: &Sample) -> SafetyDecision {
    let mut critical = Vec::new();
    let mut warning = Vec::new();

    if sample.temperature > 90.0 {
        critical.push(condition("temperature", sample.temperature, 90.0, "temperature exceeds critical limit"));
    } else if (80.0..=90.0).contains(&sample.temperature) {
        warning.push(condition("temperature", sample.temperature, 80.0, "temperature approaching critical limit"));
    }

    if sample.vibration > 10.0 {
        critical.push(condition("vibration", sample.vibration, 10.0, "vibration exceeds critical limit"));
    } else if sample.vibration > 5.0 && sample.vibration <= 10.0 {
        warning.push(condition("vibration", sample.vibration, 5.0, "vibration elevated above normal range"));
    }

    if sample.imbalance_pct > 15.0 {
        critical.push(condition("imbalance_pct", sample.imbalance_pct, 15.0, "phase current imbalance exceeds critical limit"));
    } else if sample.imbalance_pct > 5.0 && sample.imbalance_pct <= 15.0 {
        warning.push(condition("imbalance_pct", sample.imbalance_pct, 5.0, "phase current imbalance elevated"));
    }

    if sample.voltage < 180.0 || sample.voltage > 270.0 {
        critical.push(condition("voltage", sample.voltage, if sample.voltage < 180.0 { 180.0 } else { 270.0 }, "voltage outside critical operating range"));
    } else if (sample.voltage < 207.0 || sample.voltage > 253.0) && (180.0..=270.0).contains(&sample.voltage) {
        warning.push(condition("voltage", sample.voltage, if sample.voltage < 207.0 { 207.0 } else { 253.0 }, "voltage outside nominal operating range"));
    }

    if sample.pressure <= 0.0 {
        critical.push(condition("pressure", sample.pressure, 0.0, "pressure at or below critical floor"));
    } else if sample.pressure > 0.0 && sample.pressure < 2.0 {
        warning.push(condition("pressure", sample.pressure, 2.0, "pressure below nominal operating range"));
    }

    if !critical.is_empty() {
        SafetyDecision { action: Action::ImmediateShutdown, urgency: Urgency::Critical, critical_conditions: critical, warning_conditions: warning }
    } else if !warning.is_empty() {
        SafetyDecision { action: Action::ContinueThenStop, urgency: Urgency::Warning, critical_conditions: Vec::new(), warning_conditions: warning }
    } else {
        SafetyDecision { action: Action::NormalOperation, urgency: Urgency::Ok, critical_conditions: Vec::new(), warning_conditions: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pump_core::FaultState;

    fn sample(temperature: f64, vibration: f64, voltage: f64, pressure: f64, i_a: f64, i_b: f64, i_c: f64) -> Sample {
        Sample::new(Utc::now(), FaultState::Normal, 0, i_a, i_b, i_c, voltage, vibration, pressure, temperature)
    }

    #[test]
    fn all_nominal_is_normal_operation() {
        let s = sample(65.0, 1.5, 230.0, 5.0, 10.0, 10.0, 10.0);
        let d = evaluate(&s);
        assert_eq!(d.action, Action::NormalOperation);
        assert_eq!(d.urgency, Urgency::Ok);
    }

    #[test]
    fn critical_shutdown_scenario() {
        // temperature=92 (critical), currents skewed to push imbalance_pct past 15 (critical)
        let s = Sample::new(Utc::now(), FaultState::Normal, 0, 14.0, 10.0, 10.0, 230.0, 2.0, 4.0, 92.0);
        let d = evaluate(&s);
        assert_eq!(d.action, Action::ImmediateShutdown);
        assert!(d.critical_conditions.iter().any(|c| c.parameter == "temperature"));
        assert!(d.critical_conditions.iter().any(|c| c.parameter == "imbalance_pct"));
    }

    #[test]
    fn warning_only_scenario() {
        // temperature=82 (warning band), currents skewed to push imbalance_pct into (5,15] (warning)
        let s = Sample::new(Utc::now(), FaultState::Normal, 0, 11.0, 10.0, 10.0, 220.0, 4.0, 4.0, 82.0);
        let d = evaluate(&s);
        assert_eq!(d.action, Action::ContinueThenStop);
        assert!(d.critical_conditions.is_empty());
        assert!(d.warning_conditions.iter().any(|c| c.parameter == "temperature"));
        assert!(d.warning_conditions.iter().any(|c| c.parameter == "imbalance_pct"));
    }

    #[test]
    fn low_pressure_is_critical() {
        let s = sample(65.0, 1.0, 230.0, 0.0, 10.0, 10.0, 10.0);
        assert_eq!(evaluate(&s).action, Action::ImmediateShutdown);
    }

    #[test]
    fn determinism_across_repeated_calls() {
        let s = sample(82.0, 4.0, 220.0, 4.0, 10.7, 10.0, 10.0);
        assert_eq!(evaluate(&s), evaluate(&s));
    }
}

//! Shared wire/domain types used across the workspace: the telemetry
//! `Sample`, the fault-state identifier, and the outbound `Command`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of fault identifiers the pump simulator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultState {
    Normal,
    WindingDefect,
    SupplyFault,
    Cavitation,
    BearingWear,
    Overload,
}

impl Default for FaultState {
    fn default() -> Self {
        FaultState::Normal
    }
}

impl FaultState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultState::Normal => "Normal",
            FaultState::WindingDefect => "WindingDefect",
            FaultState::SupplyFault => "SupplyFault",
            FaultState::Cavitation => "Cavitation",
            FaultState::BearingWear => "BearingWear",
            FaultState::Overload => "Overload",
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, FaultState::Normal)
    }

    /// Canonicalize an arbitrary inbound string: uppercase, collapse
    /// whitespace/underscores, map anything unrecognized to `Normal`.
    pub fn canonicalize(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter_map(|c| {
                if c.is_whitespace() || c == '_' || c == '-' {
                    None
                } else {
                    Some(c.to_ascii_uppercase())
                }
            })
            .collect();

        match normalized.as_str() {
            "NORMAL" => FaultState::Normal,
            "WINDINGDEFECT" => FaultState::WindingDefect,
            "SUPPLYFAULT" => FaultState::SupplyFault,
            "CAVITATION" => FaultState::Cavitation,
            "BEARINGWEAR" => FaultState::BearingWear,
            "OVERLOAD" => FaultState::Overload,
            _ => FaultState::Normal,
        }
    }

    pub fn all() -> &'static [FaultState] {
        &[
            FaultState::Normal,
            FaultState::WindingDefect,
            FaultState::SupplyFault,
            FaultState::Cavitation,
            FaultState::BearingWear,
            FaultState::Overload,
        ]
    }
}

impl std::fmt::Display for FaultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A timestamped telemetry snapshot for the monitored asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub fault_state: FaultState,
    pub fault_duration_s: u64,
    pub i_a: f64,
    pub i_b: f64,
    pub i_c: f64,
    pub i_avg: f64,
    pub imbalance_pct: f64,
    pub voltage: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl Sample {
    /// Build a Sample from raw phase currents, deriving `i_avg` and
    /// `imbalance_pct` per the invariant in the data model. Non-finite
    /// inputs are coerced to 0 before the derivation runs.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: DateTime<Utc>,
        fault_state: FaultState,
        fault_duration_s: u64,
        i_a: f64,
        i_b: f64,
        i_c: f64,
        voltage: f64,
        vibration: f64,
        pressure: f64,
        temperature: f64,
    ) -> Self {
        let i_a = coerce_finite(i_a);
        let i_b = coerce_finite(i_b);
        let i_c = coerce_finite(i_c);
        let i_avg = (i_a + i_b + i_c) / 3.0;
        let imbalance_pct = imbalance_percent(i_a, i_b, i_c, i_avg);

        Self {
            timestamp,
            fault_state,
            fault_duration_s,
            i_a,
            i_b,
            i_c,
            i_avg,
            imbalance_pct,
            voltage: coerce_finite(voltage),
            vibration: coerce_finite(vibration),
            pressure: coerce_finite(pressure),
            temperature: coerce_finite(temperature),
        }
    }
}

/// Non-finite (NaN/infinite) numeric inputs are coerced to 0, per §3.
pub fn coerce_finite(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// `imbalance_pct = 100 * max(|I_k - avg|) / avg`, or 0 when `avg <= 0`.
pub fn imbalance_percent(i_a: f64, i_b: f64, i_c: f64, avg: f64) -> f64 {
    if avg <= 0.0 {
        return 0.0;
    }
    let worst = [i_a, i_b, i_c]
        .iter()
        .map(|i| (i - avg).abs())
        .fold(0.0_f64, f64::max);
    100.0 * worst / avg
}

/// A snapshot captured at the moment a Sample first enters a non-Normal
/// state, plus the bookkeeping that identifies the transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultContext {
    pub fault_state: FaultState,
    pub fault_start_time: DateTime<Utc>,
    pub fault_start_snapshot: Sample,
}

/// Outbound advisory message to the simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub command: CommandKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_type: Option<FaultState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_band: Option<f64>,
    pub request_id: String,
    pub asset_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    InjectFault,
    Reset,
    EmergencyStop,
}

impl Command {
    /// `request_id` is idempotent-safe: `req-{ms-epoch}` as specified in §6.
    pub fn new_request_id() -> String {
        format!("req-{}", Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_average_gives_zero_imbalance() {
        assert_eq!(imbalance_percent(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn balanced_phases_give_zero_imbalance() {
        let s = Sample::new(Utc::now(), FaultState::Normal, 0, 10.0, 10.0, 10.0, 230.0, 1.5, 5.0, 65.0);
        assert_eq!(s.i_avg, 10.0);
        assert_eq!(s.imbalance_pct, 0.0);
    }

    #[test]
    fn non_finite_inputs_coerce_to_zero() {
        let s = Sample::new(Utc::now(), FaultState::Normal, 0, f64::NAN, 10.0, f64::INFINITY, 230.0, 1.5, 5.0, 65.0);
        assert_eq!(s.i_a, 0.0);
        assert_eq!(s.i_c, 0.0);
    }

    #[test]
    fn unknown_fault_state_canonicalizes_to_normal() {
        assert_eq!(FaultState::canonicalize("garbled-value"), FaultState::Normal);
        assert_eq!(FaultState::canonicalize("winding_defect"), FaultState::WindingDefect);
        assert_eq!(FaultState::canonicalize("  Supply Fault "), FaultState::SupplyFault);
    }
}

//! Telemetry payload normalization (§4.1). Accepts both the flat inbound
//! wire shape and an already-nested `amperage.{...}` shape, coerces missing
//! or non-numeric fields to 0, and canonicalizes the fault state.

use chrono::{DateTime, Utc};
use pump_core::{FaultState, Sample};
use serde_json::Value;

fn num(v: &Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok()))
}

fn field(payload: &Value, flat_key: &str, nested_path: &[&str]) -> f64 {
    if let Some(v) = payload.get(flat_key).and_then(num) {
        return v;
    }
    let mut cur = payload;
    for key in nested_path {
        match cur.get(key) {
            Some(v) => cur = v,
            None => return 0.0,
        }
    }
    num(cur).unwrap_or(0.0)
}

/// Parse an inbound telemetry JSON payload into a canonical `Sample`.
/// Never fails — malformed fields fall back to safe defaults so the caller
/// can log-and-drop only on genuinely unparseable JSON, not on missing fields.
pub fn normalize_telemetry(payload: &Value) -> Sample {
    let timestamp = payload
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let fault_state_raw = payload
        .get("fault_state")
        .and_then(Value::as_str)
        .unwrap_or("Normal");
    let fault_state = FaultState::canonicalize(fault_state_raw);

    let fault_duration_s = payload
        .get("fault_duration_s")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let i_a = field(payload, "amps_A", &["amperage", "phase_a"]);
    let i_b = field(payload, "amps_B", &["amperage", "phase_b"]);
    let i_c = field(payload, "amps_C", &["amperage", "phase_c"]);
    let voltage = field(payload, "voltage", &["voltage"]);
    let vibration = field(payload, "vibration", &["vibration"]);
    let pressure = field(payload, "pressure", &["pressure"]);
    let temperature = field(payload, "temperature", &["temperature"]);

    Sample::new(
        timestamp,
        fault_state,
        fault_duration_s,
        i_a,
        i_b,
        i_c,
        voltage,
        vibration,
        pressure,
        temperature,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_payload_normalizes() {
        let payload = json!({
            "pump_id": "pump01",
            "timestamp": "2024-01-01T00:00:00Z",
            "fault_state": "Normal",
            "fault_duration_s": 0,
            "amps_A": 10.0, "amps_B": 10.0, "amps_C": 10.0,
            "voltage": 230.0, "vibration": 1.5, "pressure": 5.0, "temperature": 65.0
        });
        let s = normalize_telemetry(&payload);
        assert_eq!(s.fault_state, FaultState::Normal);
        assert_eq!(s.i_avg, 10.0);
        assert_eq!(s.imbalance_pct, 0.0);
    }

    #[test]
    fn nested_amperage_payload_normalizes() {
        let payload = json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "fault_state": "WINDING_DEFECT",
            "amperage": { "phase_a": 12.0, "phase_b": 10.0, "phase_c": 10.0 },
            "voltage": 230.0
        });
        let s = normalize_telemetry(&payload);
        assert_eq!(s.fault_state, FaultState::WindingDefect);
        assert!(s.imbalance_pct > 0.0);
    }

    #[test]
    fn missing_timestamp_substitutes_now() {
        let payload = json!({ "fault_state": "Normal" });
        let s = normalize_telemetry(&payload);
        assert!((Utc::now() - s.timestamp).num_seconds() < 5);
    }

    #[test]
    fn unknown_fault_state_canonicalizes_to_normal() {
        let payload = json!({ "fault_state": "something-weird" });
        let s = normalize_telemetry(&payload);
        assert_eq!(s.fault_state, FaultState::Normal);
    }

    #[test]
    fn non_numeric_field_coerces_to_zero() {
        let payload = json!({ "fault_state": "Normal", "amps_A": "garbage" });
        let s = normalize_telemetry(&payload);
        assert_eq!(s.i_a, 0.0);
    }
}

//! Deterministic prompt composition. No network calls, no LLM invocation —
//! every function here is a pure string transform so the prompt layer is
//! testable with golden strings.

use pump_core::Sample;
use pump_retrieval::RetrievalResult;

use crate::types::{ChatEntry, ChatRole};

const ROLE_PREAMBLE: &str =
    "You are a senior maintenance engineer diagnosing an industrial pump from live telemetry.";

/// Build the retrieval query for `diagnose`, from anomalies present in `sample`.
/// Mirrors the fixed ordered table: each test that passes appends its fragment.
pub fn diagnose_query(sample: &Sample) -> String {
    let mut fragments = Vec::new();

    if sample.imbalance_pct > 5.0 {
        fragments.push("motor winding defect phase imbalance");
    }
    if sample.voltage < 207.0 {
        fragments.push("voltage supply fault low voltage");
    }
    if sample.vibration > 5.0 {
        fragments.push("cavitation high vibration");
    }
    if sample.temperature > 80.0 {
        fragments.push("motor overheating causes");
    }
    if sample.vibration > 3.0 && sample.vibration <= 5.0 {
        fragments.push("bearing wear diagnosis");
    }

    if fragments.is_empty() {
        format!("{} troubleshooting diagnosis", sample.fault_state)
    } else {
        fragments.join(" ")
    }
}

/// Render a Sample as a deterministic, human-readable block.
pub fn render_sample(sample: &Sample) -> String {
    format!(
        "Timestamp: {}\nFault state: {} (duration {}s)\nPhase currents: I_a={:.2}A I_b={:.2}A I_c={:.2}A (avg {:.2}A, imbalance {:.2}%)\nVoltage: {:.1}V\nVibration: {:.2}mm/s\nPressure: {:.2}bar\nTemperature: {:.1}°C",
        sample.timestamp.to_rfc3339(),
        sample.fault_state,
        sample.fault_duration_s,
        sample.i_a,
        sample.i_b,
        sample.i_c,
        sample.i_avg,
        sample.imbalance_pct,
        sample.voltage,
        sample.vibration,
        sample.pressure,
        sample.temperature,
    )
}

/// Render retrieved chunks with ordinal page labels, or an explicit empty marker.
pub fn render_chunks(results: &[RetrievalResult]) -> String {
    if results.is_empty() {
        return "(no reference material retrieved)".to_string();
    }
    results
        .iter()
        .map(|r| format!("[p.{}] {}", r.ordinal_page, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Compose the prompt for `DiagnosticEngine::diagnose`.
pub fn compose_diagnose_prompt(sample: &Sample, chunks: &[RetrievalResult]) -> String {
    format!(
        "{preamble}\n\n## Current reading\n{sample}\n\n## Reference material\n{chunks}\n\n## Task\nProduce exactly four sections, each on its own line starting with the header:\nDIAGNOSIS\nROOT CAUSE\nACTION ITEMS\nVERIFICATION STEPS\nEach of ACTION ITEMS and VERIFICATION STEPS must be a bulleted list.",
        preamble = ROLE_PREAMBLE,
        sample = render_sample(sample),
        chunks = render_chunks(chunks),
    )
}

/// Compose the prompt for `DiagnosticEngine::ask`.
pub fn compose_ask_prompt(
    question: &str,
    sample: Option<&Sample>,
    fault_context_snapshot: Option<&Sample>,
    history: &[ChatEntry],
    chunks: &[RetrievalResult],
) -> String {
    let mut out = String::new();
    out.push_str(ROLE_PREAMBLE);
    out.push_str("\n\n## Conversation so far\n");
    if history.is_empty() {
        out.push_str("(no prior turns)");
    } else {
        for entry in history.iter().rev().take(20).collect::<Vec<_>>().into_iter().rev() {
            let role = match entry.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            out.push_str(&format!("{}: {}\n", role, entry.content));
        }
    }

    if let Some(s) = sample {
        out.push_str("\n## Current reading\n");
        out.push_str(&render_sample(s));
    }

    if let Some(s) = fault_context_snapshot {
        out.push_str("\n\n## Reading at fault onset\n");
        out.push_str(&render_sample(s));
    }

    out.push_str("\n\n## Reference material\n");
    out.push_str(&render_chunks(chunks));

    out.push_str(&format!(
        "\n\n## Question\n{}\n\n## Task\nReply in the same language as the question. Give a direct answer as 4-8 bullet points. Do not use full report section headers.",
        question
    ));

    out
}

/// Humanize a fault type identifier for the checklist retrieval query, e.g.
/// `WindingDefect` -> `"winding defect"`.
pub fn humanize_fault_type(fault_type: &str) -> String {
    let mut out = String::new();
    for (i, ch) in fault_type.chars().enumerate() {
        if i > 0 && ch.is_uppercase() {
            out.push(' ');
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Build the retrieval query for `checklist`.
pub fn checklist_query(fault_type: &str) -> String {
    format!(
        "{} repair steps troubleshooting procedure",
        humanize_fault_type(fault_type)
    )
}

/// Compose the prompt for `DiagnosticEngine::checklist`.
pub fn compose_checklist_prompt(
    fault_type: &str,
    sample: Option<&Sample>,
    diagnosis: Option<&str>,
    chunks: &[RetrievalResult],
) -> String {
    let mut out = String::new();
    out.push_str(ROLE_PREAMBLE);
    out.push_str(&format!("\n\n## Fault\n{}", fault_type));

    if let Some(s) = sample {
        out.push_str("\n\n## Current reading\n");
        out.push_str(&render_sample(s));
    }

    if let Some(d) = diagnosis {
        out.push_str("\n\n## Prior diagnosis\n");
        out.push_str(d);
    }

    out.push_str("\n\n## Reference material\n");
    out.push_str(&render_chunks(chunks));

    out.push_str(
        "\n\n## Task\nProduce a numbered list of 5 to 7 repair steps. Each item must start with an imperative verb and be at most 10 words. Mark safety-critical items by appending '[CRITICAL]' to the item.",
    );

    out
}

/// Does the question look like it's asking for action in French? Matches the
/// canonical action markers named in the post-processing rule.
fn looks_french(question: &str) -> bool {
    let lower = question.to_lowercase();
    lower.contains("comment") || lower.contains("régler") || lower.contains("regler")
}

const SECTION_HEADERS: &[&str] = &["DIAGNOSIS", "ROOT CAUSE", "ACTION ITEMS", "VERIFICATION STEPS"];

/// Post-process an `ask` reply: if it leaked full report section headers,
/// extract only ACTION ITEMS / VERIFICATION STEPS bullets and prefix with a
/// localized title. Otherwise return the reply unchanged.
pub fn postprocess_ask_reply(question: &str, reply: &str) -> String {
    let has_headers = SECTION_HEADERS.iter().any(|h| reply.contains(h));
    if !has_headers {
        return reply.to_string();
    }

    let mut bullets = Vec::new();
    let mut in_target_section = false;
    for line in reply.lines() {
        let trimmed = line.trim();
        let upper = trimmed.trim_end_matches(':').to_uppercase();
        if upper == "ACTION ITEMS" || upper == "VERIFICATION STEPS" {
            in_target_section = true;
            continue;
        }
        if SECTION_HEADERS.contains(&upper.as_str()) {
            in_target_section = false;
            continue;
        }
        if in_target_section && is_bullet_line(trimmed) {
            bullets.push(trimmed.to_string());
        }
    }

    let title = if looks_french(question) {
        "À faire maintenant:"
    } else {
        "What to do now:"
    };

    if bullets.is_empty() {
        return reply.to_string();
    }

    format!("{}\n{}", title, bullets.join("\n"))
}

fn is_bullet_line(line: &str) -> bool {
    line.starts_with('-') || line.starts_with('*') || line.starts_with('•')
        || line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Assign an icon to a checklist step label by keyword match against a fixed table.
pub fn icon_for_label(label: &str) -> &'static str {
    let lower = label.to_lowercase();
    if lower.contains("power") || lower.contains("voltage") {
        "⚡"
    } else if lower.contains("temperature") {
        "🌡️"
    } else if lower.contains("measure") || lower.contains("test") {
        "📊"
    } else if lower.contains("winding") || lower.contains("replace") {
        "🔧"
    } else if lower.contains("bearing") {
        "⚙️"
    } else if lower.contains("vibration") {
        "📳"
    } else if lower.contains("pressure") || lower.contains("flow") {
        "💧"
    } else if lower.contains("restart") || lower.contains("start") {
        "▶️"
    } else {
        "📋"
    }
}

/// Parse the LLM's numbered checklist response into structured steps.
pub fn parse_checklist(raw: &str) -> Vec<crate::types::ChecklistStep> {
    let mut steps = Vec::new();
    let mut next_id = 1u32;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(rest) = strip_numbering(trimmed) else {
            continue;
        };

        let critical = rest.to_uppercase().contains("[CRITICAL]");
        let label = strip_critical_marker(rest).trim().to_string();
        if label.is_empty() {
            continue;
        }

        let icon = icon_for_label(&label).to_string();
        steps.push(crate::types::ChecklistStep {
            id: next_id,
            label,
            icon,
            critical,
        });
        next_id += 1;
    }

    steps
}

/// Strip a leading "1.", "1)", "- " etc. numbering prefix. Returns `None` if
/// the line doesn't look like a list item.
fn strip_numbering(line: &str) -> Option<&str> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit()).unwrap_or(0);
    if digits_end > 0 {
        let rest = &line[digits_end..];
        let rest = rest.trim_start_matches(['.', ')', ':']).trim_start();
        return Some(rest);
    }
    if let Some(rest) = line.strip_prefix('-').or_else(|| line.strip_prefix('*')) {
        return Some(rest.trim_start());
    }
    None
}

fn strip_critical_marker(s: &str) -> String {
    let mut out = s.to_string();
    for marker in ["[CRITICAL]", "[critical]", "[Critical]"] {
        out = out.replace(marker, "");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pump_core::FaultState;

    fn sample(voltage: f64, vibration: f64, temperature: f64, imbalance: f64) -> Sample {
        let mut s = Sample::new(Utc::now(), FaultState::Normal, 0, 10.0, 10.0, 10.0, voltage, vibration, 5.0, temperature);
        s.imbalance_pct = imbalance;
        s
    }

    #[test]
    fn diagnose_query_falls_back_without_anomalies() {
        let s = sample(230.0, 1.0, 65.0, 0.0);
        assert_eq!(diagnose_query(&s), "Normal troubleshooting diagnosis");
    }

    #[test]
    fn diagnose_query_joins_anomaly_fragments_in_order() {
        let s = sample(200.0, 6.0, 85.0, 10.0);
        let q = diagnose_query(&s);
        assert_eq!(
            q,
            "motor winding defect phase imbalance voltage supply fault low voltage cavitation high vibration motor overheating causes"
        );
    }

    #[test]
    fn diagnose_query_detects_bearing_wear_band() {
        let s = sample(230.0, 4.0, 65.0, 0.0);
        assert_eq!(diagnose_query(&s), "bearing wear diagnosis");
    }

    #[test]
    fn humanize_fault_type_inserts_spaces() {
        assert_eq!(humanize_fault_type("WindingDefect"), "winding defect");
        assert_eq!(humanize_fault_type("Normal"), "normal");
    }

    #[test]
    fn render_chunks_empty_uses_marker() {
        assert_eq!(render_chunks(&[]), "(no reference material retrieved)");
    }

    #[test]
    fn postprocess_strips_headers_and_extracts_action_items() {
        let reply = "DIAGNOSIS\nsomething bad\nROOT CAUSE\nworn bearing\nACTION ITEMS\n- stop the pump\n- inspect bearing\nVERIFICATION STEPS\n- measure vibration again";
        let out = postprocess_ask_reply("what should I do?", reply);
        assert!(out.starts_with("What to do now:"));
        assert!(out.contains("- stop the pump"));
        assert!(out.contains("- measure vibration again"));
        assert!(!out.contains("DIAGNOSIS"));
    }

    #[test]
    fn postprocess_uses_french_title_for_french_markers() {
        let reply = "DIAGNOSIS\nx\nACTION ITEMS\n- arreter la pompe";
        let out = postprocess_ask_reply("comment régler ce problème ?", reply);
        assert!(out.starts_with("À faire maintenant:"));
    }

    #[test]
    fn postprocess_leaves_plain_reply_untouched() {
        let reply = "Just check the voltage supply.";
        assert_eq!(postprocess_ask_reply("what now", reply), reply);
    }

    #[test]
    fn parse_checklist_strips_numbering_and_critical_marker() {
        let raw = "1. Stop the pump immediately [CRITICAL]\n2. Inspect the bearing housing\n3. Measure phase voltages";
        let steps = parse_checklist(raw);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].id, 1);
        assert!(steps[0].critical);
        assert_eq!(steps[0].label, "Stop the pump immediately");
        assert!(!steps[1].critical);
    }

    #[test]
    fn parse_checklist_assigns_icons_by_keyword() {
        let raw = "1. Measure supply voltage\n2. Replace worn bearing\n3. Restart the pump";
        let steps = parse_checklist(raw);
        assert_eq!(steps[0].icon, "⚡");
        assert_eq!(steps[1].icon, "⚙️");
        assert_eq!(steps[2].icon, "▶️");
    }

    #[test]
    fn parse_checklist_ids_are_monotonic_regardless_of_source_numbering() {
        let raw = "5. Do one thing\n7. Do another thing";
        let steps = parse_checklist(raw);
        assert_eq!(steps[0].id, 1);
        assert_eq!(steps[1].id, 2);
    }
}

use serde::{Deserialize, Serialize};

use pump_store::SafetyDecision;

/// A retrieved chunk's page and similarity score, as surfaced to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub page: usize,
    pub score: f32,
}

/// Result of `DiagnosticEngine::diagnose`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub diagnosis_text: String,
    pub shutdown_decision: SafetyDecision,
    pub references: Vec<Reference>,
    pub fault_detected: bool,
}

/// A single step in a `DiagnosticEngine::checklist` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistStep {
    pub id: u32,
    pub label: String,
    pub icon: String,
    pub critical: bool,
}

/// Role of a `ChatSessions` transcript entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single turn in a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub content: String,
}

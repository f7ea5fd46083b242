//! Turns a Sample (plus optional question/history) into LLM-backed diagnostic
//! text by composing deterministic prompts and delegating generation to a
//! swappable [`pump_llm::LlmProvider`] (§4.6), and holds the in-memory chat
//! transcript map (§4.7).

pub mod engine;
pub mod prompt;
pub mod sessions;
pub mod types;

pub use engine::DiagnosticEngine;
pub use sessions::ChatSessions;
pub use types::{ChatEntry, ChatRole, ChecklistStep, DiagnosticReport, Reference};

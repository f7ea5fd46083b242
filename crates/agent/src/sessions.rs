use std::collections::VecDeque;
use std::sync::Mutex;

use pump_core::PumpError;

use crate::types::{ChatEntry, ChatRole};

const TRANSCRIPT_CAP: usize = 20;
const SESSION_CAP: usize = 10_000;

struct SessionEntry {
    id: String,
    transcript: VecDeque<ChatEntry>,
}

/// In-memory-only map of session id -> bounded transcript (§4.7). Never
/// persisted: on restart every session is lost, by design.
pub struct ChatSessions {
    inner: Mutex<VecDeque<SessionEntry>>,
    session_cap: usize,
    transcript_cap: usize,
}

impl Default for ChatSessions {
    fn default() -> Self {
        Self::new(TRANSCRIPT_CAP, SESSION_CAP)
    }
}

impl ChatSessions {
    pub fn new(transcript_cap: usize, session_cap: usize) -> Self {
        Self { inner: Mutex::new(VecDeque::new()), session_cap, transcript_cap }
    }

    /// Appends an entry, creating the session lazily if it doesn't exist yet.
    /// Truncates the transcript to the trailing `transcript_cap` entries, and
    /// evicts the least-recently-touched session if this creates a new one
    /// past `session_cap`.
    pub fn append(&self, session_id: &str, role: ChatRole, content: String) {
        let mut sessions = self.inner.lock().unwrap();

        if let Some(pos) = sessions.iter().position(|s| s.id == session_id) {
            let mut entry = sessions.remove(pos).unwrap();
            entry.transcript.push_back(ChatEntry { role, content });
            while entry.transcript.len() > self.transcript_cap {
                entry.transcript.pop_front();
            }
            sessions.push_back(entry);
            return;
        }

        if sessions.len() >= self.session_cap {
            sessions.pop_front();
        }

        let mut transcript = VecDeque::new();
        transcript.push_back(ChatEntry { role, content });
        sessions.push_back(SessionEntry { id: session_id.to_string(), transcript });
    }

    /// Returns a snapshot of the transcript in insertion order, or an empty
    /// vec if the session doesn't exist yet.
    pub fn history(&self, session_id: &str) -> Vec<ChatEntry> {
        let sessions = self.inner.lock().unwrap();
        sessions
            .iter()
            .find(|s| s.id == session_id)
            .map(|s| s.transcript.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Append a user turn then the assistant's reply, returning the updated
    /// history. A convenience used by the chat API handler.
    pub fn record_exchange(
        &self,
        session_id: &str,
        question: String,
        reply: Result<String, PumpError>,
    ) -> Result<String, PumpError> {
        self.append(session_id, ChatRole::User, question);
        match reply {
            Ok(text) => {
                self.append(session_id, ChatRole::Assistant, text.clone());
                Ok(text)
            }
            Err(e) => Err(e),
        }
    }
}

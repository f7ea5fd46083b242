use std::sync::Arc;
use std::time::Duration;

use pump_core::{PumpError, Sample};
use pump_llm::{LlmProvider, Message, Role};
use pump_retrieval::RetrievalIndex;
use pump_store::evaluate;
use tracing::info;

use crate::prompt;
use crate::types::{ChatEntry, ChecklistStep, DiagnosticReport, Reference};

const LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Composes prompts from a Sample/question/history and delegates generation
/// to the configured LLM provider. Holds no mutable state beyond per-request
/// scratch — `index` is read-mostly after initialization.
pub struct DiagnosticEngine {
    provider: Arc<dyn LlmProvider>,
    index: Arc<RetrievalIndex>,
    temperature: f32,
    max_tokens: u32,
}

impl DiagnosticEngine {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        index: Arc<RetrievalIndex>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self { provider, index, temperature, max_tokens }
    }

    async fn complete(&self, prompt: String) -> Result<String, PumpError> {
        let messages = vec![Message { role: Role::User, content: prompt }];
        tokio::time::timeout(LLM_TIMEOUT, self.provider.complete(messages, self.temperature, self.max_tokens))
            .await
            .map_err(|_| PumpError::LlmUnavailable("LLM call timed out".into()))?
            .map_err(|e| PumpError::LlmUnavailable(e.to_string()))
    }

    /// `diagnose(sample) -> DiagnosticReport` (§4.6.1).
    pub async fn diagnose(&self, sample: &Sample) -> Result<DiagnosticReport, PumpError> {
        let decision = evaluate(sample);
        let query = prompt::diagnose_query(sample);
        let chunks = self.index.query(&query, 3).await.unwrap_or_default();

        let prompt_text = prompt::compose_diagnose_prompt(sample, &chunks);
        info!(query = %query, chunks = chunks.len(), "running diagnose");
        let diagnosis_text = self.complete(prompt_text).await?;

        let fault_detected = decision.urgency != pump_store::Urgency::Ok;
        let references = chunks.iter().map(|c| Reference { page: c.ordinal_page, score: c.score }).collect();

        Ok(DiagnosticReport {
            diagnosis_text,
            shutdown_decision: decision,
            references,
            fault_detected,
        })
    }

    /// `ask(question, sample?, fault_context?, history) -> string` (§4.6.2).
    pub async fn ask(
        &self,
        question: &str,
        sample: Option<&Sample>,
        fault_context_snapshot: Option<&Sample>,
        history: &[ChatEntry],
    ) -> Result<String, PumpError> {
        if question.trim().is_empty() {
            return Err(PumpError::InvalidInput("question must not be empty".into()));
        }

        let chunks = self.index.query(question, 3).await.unwrap_or_default();
        let prompt_text = prompt::compose_ask_prompt(question, sample, fault_context_snapshot, history, &chunks);
        info!(chunks = chunks.len(), "running ask");
        let reply = self.complete(prompt_text).await?;
        Ok(prompt::postprocess_ask_reply(question, &reply))
    }

    /// `checklist(fault_type, sample?, diagnosis?) -> [Step]` (§4.6.3).
    pub async fn checklist(
        &self,
        fault_type: &str,
        sample: Option<&Sample>,
        diagnosis: Option<&str>,
    ) -> Result<Vec<ChecklistStep>, PumpError> {
        let query = prompt::checklist_query(fault_type);
        let chunks = self.index.query(&query, 4).await.unwrap_or_default();

        let prompt_text = prompt::compose_checklist_prompt(fault_type, sample, diagnosis, &chunks);
        info!(query = %query, chunks = chunks.len(), "running checklist");
        let raw = self.complete(prompt_text).await?;
        Ok(prompt::parse_checklist(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use pump_core::FaultState;
    use pump_llm::LlmError;

    struct StubProvider {
        reply: String,
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn complete(&self, _messages: Vec<Message>, _temperature: f32, _max_tokens: u32) -> Result<String, LlmError> {
            Ok(self.reply.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        async fn complete(&self, _messages: Vec<Message>, _temperature: f32, _max_tokens: u32) -> Result<String, LlmError> {
            Err(LlmError::NotConfigured("no key".into()))
        }
    }

    fn empty_index() -> Arc<RetrievalIndex> {
        Arc::new(RetrievalIndex::empty())
    }

    fn normal_sample() -> Sample {
        Sample::new(Utc::now(), FaultState::Normal, 0, 10.0, 10.0, 10.0, 230.0, 1.5, 5.0, 65.0)
    }

    #[tokio::test]
    async fn diagnose_reports_no_fault_on_normal_sample() {
        let engine = DiagnosticEngine::new(
            Arc::new(StubProvider { reply: "DIAGNOSIS\nall good".into() }),
            empty_index(),
            0.2,
            512,
        );
        let report = engine.diagnose(&normal_sample()).await.unwrap();
        assert!(!report.fault_detected);
    }

    #[tokio::test]
    async fn ask_rejects_empty_question() {
        let engine = DiagnosticEngine::new(Arc::new(StubProvider { reply: "x".into() }), empty_index(), 0.2, 512);
        let err = engine.ask("   ", None, None, &[]).await.unwrap_err();
        assert!(matches!(err, PumpError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn llm_failure_surfaces_as_llm_unavailable() {
        let engine = DiagnosticEngine::new(Arc::new(FailingProvider), empty_index(), 0.2, 512);
        let err = engine.diagnose(&normal_sample()).await.unwrap_err();
        assert!(matches!(err, PumpError::LlmUnavailable(_)));
    }

    #[tokio::test]
    async fn checklist_parses_provider_output() {
        let reply = "1. Stop the pump [CRITICAL]\n2. Inspect bearing housing";
        let engine = DiagnosticEngine::new(Arc::new(StubProvider { reply: reply.into() }), empty_index(), 0.2, 512);
        let steps = engine.checklist("BearingWear", None, None).await.unwrap();
        assert_eq!(steps.len(), 2);
        assert!(steps[0].critical);
    }
}

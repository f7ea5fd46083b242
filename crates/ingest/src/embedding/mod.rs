pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use pump_core::config::{EmbeddingConfig, OllamaConfig};

pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};

/// Create the configured embedding backend, mirroring `pump_llm::create_provider`.
pub fn create_embedder(
    embedding_config: &EmbeddingConfig,
    ollama_config: &OllamaConfig,
    openai_api_key: Option<&str>,
) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match embedding_config.provider.as_str() {
        "openai" => {
            let api_key = openai_api_key
                .ok_or_else(|| EmbeddingError::Api("OPENAI_API_KEY not set".into()))?;
            Ok(Arc::new(OpenAiEmbedder::new(
                api_key.to_string(),
                embedding_config.model.clone(),
                None,
                embedding_config.dimensions,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            ollama_config.url.clone(),
            embedding_config.model.clone(),
            embedding_config.dimensions,
        ))),
        other => Err(EmbeddingError::Api(format!("unknown embedding provider: '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_an_api_error() {
        let embedding = EmbeddingConfig { provider: "bogus".into(), model: "m".into(), dimensions: 8 };
        let ollama = OllamaConfig::default();
        let err = create_embedder(&embedding, &ollama, None).unwrap_err();
        assert!(matches!(err, EmbeddingError::Api(_)));
    }

    #[test]
    fn openai_without_key_is_an_api_error() {
        let embedding = EmbeddingConfig { provider: "openai".into(), model: "m".into(), dimensions: 8 };
        let ollama = OllamaConfig::default();
        let err = create_embedder(&embedding, &ollama, None).unwrap_err();
        assert!(matches!(err, EmbeddingError::Api(_)));
    }
}

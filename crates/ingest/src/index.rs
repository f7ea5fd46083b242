//! Vector index over a chunked reference document (§4.5).
//!
//! The teacher persists vectors in pgvector via sqlx; this service has no
//! database, so chunks and embeddings are persisted as a single JSON file
//! under the configured directory and the similarity search is a brute-force
//! cosine scan. At index sizes expected for a single reference document this
//! is the pragmatic trade — no partial-index state, O(index size) reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pump_core::PumpError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::document::chunker::{chunk_document, ChunkConfig};
use crate::document::extract_text;
use crate::embedding::Embedder;

const EMBED_BATCH_TIMEOUT: Duration = Duration::from_secs(10);
const EMBED_QUERY_TIMEOUT: Duration = Duration::from_secs(10);
const INDEX_FILE_NAME: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedChunk {
    content: String,
    ordinal_page: usize,
    source_id: String,
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedIndex {
    chunks: Vec<IndexedChunk>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResult {
    pub content: String,
    pub ordinal_page: usize,
    pub source_id: String,
    pub score: f32,
}

pub struct RetrievalIndex {
    chunks: Vec<IndexedChunk>,
    embedder: Arc<dyn Embedder>,
}

impl RetrievalIndex {
    /// An index with no chunks. `query` short-circuits to an empty result
    /// without ever touching the embedder, so no reference document is
    /// required — useful where a caller (or test) has none configured.
    pub fn empty() -> Self {
        struct NullEmbedder;
        #[async_trait::async_trait]
        impl Embedder for NullEmbedder {
            async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, crate::embedding::EmbeddingError> {
                unreachable!("empty RetrievalIndex never embeds")
            }
            fn dimensions(&self) -> usize {
                0
            }
        }
        Self { chunks: Vec::new(), embedder: Arc::new(NullEmbedder) }
    }

    /// Load a previously persisted index from `persist_dir`, or build a fresh
    /// one from `document_path` if no persisted index exists there.
    pub async fn load_or_build(
        document_path: &Path,
        source_id: &str,
        embedder: Arc<dyn Embedder>,
        persist_dir: &Path,
        chunk_config: &ChunkConfig,
    ) -> Result<Self, PumpError> {
        let index_path = persist_dir.join(INDEX_FILE_NAME);
        if index_path.exists() {
            match Self::load(&index_path, embedder.clone()) {
                Ok(index) => {
                    info!(chunks = index.chunks.len(), path = %index_path.display(), "loaded retrieval index from disk");
                    return Ok(index);
                }
                Err(e) => warn!(error = %e, "persisted index unreadable, rebuilding"),
            }
        }
        Self::build(document_path, source_id, embedder, persist_dir, chunk_config).await
    }

    fn load(index_path: &Path, embedder: Arc<dyn Embedder>) -> Result<Self, PumpError> {
        let bytes = std::fs::read(index_path)
            .map_err(|e| PumpError::IndexBuildFailed(format!("failed to read persisted index: {e}")))?;
        let persisted: PersistedIndex = serde_json::from_slice(&bytes)
            .map_err(|e| PumpError::IndexBuildFailed(format!("failed to parse persisted index: {e}")))?;
        Ok(Self { chunks: persisted.chunks, embedder })
    }

    /// Build the index from scratch: extract, chunk, embed, persist.
    /// Never leaves a partial index on disk if embedding fails.
    pub async fn build(
        document_path: &Path,
        source_id: &str,
        embedder: Arc<dyn Embedder>,
        persist_dir: &Path,
        chunk_config: &ChunkConfig,
    ) -> Result<Self, PumpError> {
        let bytes = std::fs::read(document_path)
            .map_err(|e| PumpError::IndexBuildFailed(format!("failed to read reference document: {e}")))?;
        let filename = document_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("reference.txt");
        let doc = extract_text(&bytes, filename)
            .map_err(|e| PumpError::IndexBuildFailed(format!("extraction failed: {e}")))?;

        let raw_chunks = chunk_document(&doc, chunk_config, source_id);
        if raw_chunks.is_empty() {
            return Err(PumpError::IndexBuildFailed("reference document produced zero chunks".into()));
        }

        let texts: Vec<&str> = raw_chunks.iter().map(|c| c.content.as_str()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(64) {
            let result = tokio::time::timeout(EMBED_BATCH_TIMEOUT, embedder.embed_batch(batch))
                .await
                .map_err(|_| PumpError::IndexBuildFailed("embedder timed out".into()))?
                .map_err(|e| PumpError::IndexBuildFailed(format!("embedder failed: {e}")))?;
            embeddings.extend(result);
        }
        if embeddings.len() != raw_chunks.len() {
            return Err(PumpError::IndexBuildFailed("embedder returned a mismatched vector count".into()));
        }

        let chunks: Vec<IndexedChunk> = raw_chunks
            .into_iter()
            .zip(embeddings)
            .map(|(c, embedding)| IndexedChunk { content: c.content, ordinal_page: c.page_number, source_id: c.source_id, embedding })
            .collect();

        std::fs::create_dir_all(persist_dir)
            .map_err(|e| PumpError::IndexBuildFailed(format!("failed to create persist dir: {e}")))?;
        let persisted = PersistedIndex { chunks: chunks.clone() };
        let serialized = serde_json::to_vec_pretty(&persisted)
            .map_err(|e| PumpError::IndexBuildFailed(format!("failed to serialize index: {e}")))?;
        std::fs::write(persist_dir.join(INDEX_FILE_NAME), serialized)
            .map_err(|e| PumpError::IndexBuildFailed(format!("failed to persist index: {e}")))?;

        info!(chunks = chunks.len(), path = %persist_dir.display(), "built and persisted retrieval index");
        Ok(Self { chunks, embedder })
    }

    /// Top-k similarity search. `k` is clamped to `[1, 50]` per §4.5.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievalResult>, PumpError> {
        let k = k.clamp(1, 50);
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = tokio::time::timeout(EMBED_QUERY_TIMEOUT, self.embedder.embed_batch(&[text]))
            .await
            .map_err(|_| PumpError::RetrievalUnavailable("embedder timed out".into()))?
            .map_err(|e| PumpError::RetrievalUnavailable(format!("embedder failed: {e}")))?
            .into_iter()
            .next()
            .ok_or_else(|| PumpError::RetrievalUnavailable("embedder returned no vector".into()))?;

        let mut scored: Vec<RetrievalResult> = self
            .chunks
            .iter()
            .map(|c| RetrievalResult {
                content: c.content.clone(),
                ordinal_page: c.ordinal_page,
                source_id: c.source_id.clone(),
                score: cosine_distance(&embedding, &c.embedding),
            })
            .collect();
        scored.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Cosine distance normalized to `[0, 2]`: `1 - cosine_similarity`. Lower is
/// more similar.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 2.0;
    }
    1.0 - (dot / (norm_a * norm_b))
}

pub fn persist_dir_path(dir: impl Into<PathBuf>) -> PathBuf {
    dir.into()
}

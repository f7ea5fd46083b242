//! Builds and serves the reference-document vector index (§4.5).

pub mod document;
pub mod embedding;
pub mod index;

pub use document::chunker::{chunk_document, Chunk, ChunkConfig};
pub use embedding::{create_embedder, Embedder, EmbeddingError, OllamaEmbedder, OpenAiEmbedder};
pub use index::{RetrievalIndex, RetrievalResult};

// Embeddings module
// Text chunking plus the embedding backends used to vectorize passages

pub mod chunking;
pub mod ollama;

pub use chunking::{ChunkingConfig, Passage, SourceDocument, chunk_documents};
pub use ollama::OllamaClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0:#}")]
    Request(anyhow::Error),
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A sentence-embedding model with a fixed output dimension
pub trait Embedder: Send + Sync {
    /// Name of the underlying model, recorded in index snapshots
    fn model_name(&self) -> &str;

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, preserving order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Reject vectors whose length differs from the embedder's dimension
#[inline]
pub fn check_dimension(vector: &[f32], expected: usize) -> Result<(), EmbeddingError> {
    if vector.len() == expected {
        Ok(())
    } else {
        Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: vector.len(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing;

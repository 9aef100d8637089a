// Vector index module
// Exact cosine-similarity index over passage embeddings, persisted as a
// single snapshot file

#[cfg(test)]
mod tests;

pub mod bootstrap;
pub mod snapshot;

pub use bootstrap::{Bootstrapped, bootstrap_index, seed_documents};
pub use snapshot::{SNAPSHOT_FILE, SNAPSHOT_FORMAT_VERSION};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::embeddings::{Embedder, EmbeddingError, Passage, check_dimension};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("No index snapshot found at {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Index snapshot at {} is unusable: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("Snapshot IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A passage together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(flatten)]
    pub passage: Passage,
    pub vector: Vec<f32>,
}

/// A passage returned from a similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
    pub passage: Passage,
    /// Cosine similarity to the query, higher is closer
    pub score: f32,
}

/// In-memory nearest-neighbour index over passage vectors
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    embedding_model: String,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// An index with no passages; every query returns nothing
    #[inline]
    pub fn empty(dimension: usize, embedding_model: impl Into<String>) -> Self {
        Self {
            dimension,
            embedding_model: embedding_model.into(),
            entries: Vec::new(),
        }
    }

    /// Embed every passage and build the index
    #[inline]
    pub fn build(passages: Vec<Passage>, embedder: &dyn Embedder) -> Result<Self, IndexError> {
        let dimension = embedder.dimension();

        if passages.is_empty() {
            debug!("Building empty index ({} dimensions)", dimension);
            return Ok(Self::empty(dimension, embedder.model_name()));
        }

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;

        if vectors.len() != passages.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                passages.len(),
                vectors.len()
            ))
            .into());
        }

        for vector in &vectors {
            check_dimension(vector, dimension)?;
        }

        let entries = passages
            .into_iter()
            .zip(vectors)
            .map(|(passage, vector)| IndexEntry { passage, vector })
            .collect::<Vec<_>>();

        debug!(
            "Built index with {} passages ({} dimensions)",
            entries.len(),
            dimension
        );

        Ok(Self {
            dimension,
            embedding_model: embedder.model_name().to_string(),
            entries,
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Passages in insertion order
    #[inline]
    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.entries.iter().map(|entry| &entry.passage)
    }

    /// Rank passages against a precomputed query vector.
    ///
    /// Results are ordered by descending score; equal scores keep insertion
    /// order.
    #[inline]
    pub fn search(&self, vector: &[f32], k: usize) -> Vec<ScoredPassage> {
        if k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(vector, &entry.vector)))
            .collect();

        // Stable sort keeps insertion order among ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(position, score)| ScoredPassage {
                passage: self.entries[position].passage.clone(),
                score,
            })
            .collect()
    }

    /// Embed `text` and return the `k` most similar passages with scores
    #[inline]
    pub fn query_scored(
        &self,
        embedder: &dyn Embedder,
        text: &str,
        k: usize,
    ) -> Result<Vec<ScoredPassage>, IndexError> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let vector = embedder.embed(text)?;
        check_dimension(&vector, self.dimension)?;

        Ok(self.search(&vector, k))
    }

    /// Embed `text` and return the `k` most similar passages
    #[inline]
    pub fn query(
        &self,
        embedder: &dyn Embedder,
        text: &str,
        k: usize,
    ) -> Result<Vec<Passage>, IndexError> {
        Ok(self
            .query_scored(embedder, text, k)?
            .into_iter()
            .map(|scored| scored.passage)
            .collect())
    }
}

/// Cosine similarity; zero-length vectors score 0
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b) {
        dot = x.mul_add(*y, dot);
        norm_a = x.mul_add(*x, norm_a);
        norm_b = y.mul_add(*y, norm_b);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::{EmbeddingError, Embedder};

/// Deterministic bag-of-words embedder: every lower-cased word adds one to a
/// hashed bucket
pub(crate) struct HashingEmbedder {
    pub(crate) dimension: usize,
}

impl HashingEmbedder {
    pub(crate) fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        "hashing-test"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0; self.dimension];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}

/// Embedder whose backend is always down
pub(crate) struct FailingEmbedder {
    pub(crate) dimension: usize,
}

impl Embedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing-test"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Request(anyhow::anyhow!(
            "connection refused"
        )))
    }
}

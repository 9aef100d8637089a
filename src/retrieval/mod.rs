// Retrieval module
// Query interface over the vector index


use std::sync::Arc;
use tracing::debug;

use crate::embeddings::{Embedder, Passage};
use crate::index::{IndexError, VectorIndex};

/// Fetches the passages most relevant to a question
pub struct Retriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    #[inline]
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    #[inline]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Ranked passages for `question`, at most `top_k` of them
    #[inline]
    pub fn retrieve(&self, question: &str) -> Result<Vec<Passage>, IndexError> {
        let passages = self
            .index
            .query(self.embedder.as_ref(), question, self.top_k)?;
        debug!(
            "Retrieved {} passages for question ({} chars)",
            passages.len(),
            question.len()
        );
        Ok(passages)
    }
}

/// Join passage texts with blank lines into a grounding context
#[inline]
pub fn join_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|passage| passage.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

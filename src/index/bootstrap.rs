use std::path::Path;
use tracing::{error, info, warn};

use super::{IndexError, VectorIndex};
use crate::embeddings::{ChunkingConfig, Embedder, SourceDocument, chunk_documents};

/// Documents indexed when no usable snapshot exists
#[inline]
pub fn seed_documents() -> Vec<SourceDocument> {
    vec![
        SourceDocument::new(
            "Atomcamp is a leading data science education platform offering comprehensive \
             courses in machine learning, Python programming, data analysis, and AI. We provide \
             hands-on projects, expert mentorship, and career guidance to help students become \
             successful data scientists.",
            "https://www.atomcamp.com/about",
        ),
        SourceDocument::new(
            "Our courses include: Python for Data Science, Machine Learning Fundamentals, Deep \
             Learning with TensorFlow, Data Visualization with Matplotlib and Seaborn, SQL for \
             Data Analysis, Statistics for Data Science, and Advanced AI Techniques.",
            "https://www.atomcamp.com/courses",
        ),
        SourceDocument::new(
            "Atomcamp offers flexible learning paths: Beginner Track (3 months) - Python basics, \
             data manipulation, basic statistics. Intermediate Track (6 months) - Machine \
             learning, advanced Python, real projects. Advanced Track (9 months) - Deep \
             learning, AI, industry projects, job placement assistance.",
            "https://www.atomcamp.com/learning-paths",
        ),
    ]
}

/// How the startup index came to be
#[derive(Debug)]
pub enum Bootstrapped {
    /// An existing snapshot was loaded
    Loaded(VectorIndex),
    /// The seed corpus was indexed; `persisted` is false when saving failed
    Built { index: VectorIndex, persisted: bool },
    /// Nothing could be built, usually because the embedder is unreachable
    Unavailable,
}

impl Bootstrapped {
    #[inline]
    pub fn index(&self) -> Option<&VectorIndex> {
        match self {
            Self::Loaded(index) | Self::Built { index, .. } => Some(index),
            Self::Unavailable => None,
        }
    }

    #[inline]
    pub fn into_index(self) -> Option<VectorIndex> {
        match self {
            Self::Loaded(index) | Self::Built { index, .. } => Some(index),
            Self::Unavailable => None,
        }
    }
}

/// Load the snapshot in `snapshot_dir`, or index the seed corpus and save it
/// there.
///
/// Never fails: snapshot and embedding errors are logged and the caller
/// gets whatever index could be produced.
#[inline]
pub fn bootstrap_index(
    snapshot_dir: &Path,
    embedder: &dyn Embedder,
    chunking: &ChunkingConfig,
) -> Bootstrapped {
    match VectorIndex::load_for_model(snapshot_dir, embedder.dimension(), embedder.model_name()) {
        Ok(index) => {
            info!(
                "Loaded index snapshot with {} passages from {}",
                index.len(),
                snapshot_dir.display()
            );
            return Bootstrapped::Loaded(index);
        }
        Err(IndexError::NotFound { path }) => {
            info!("No index snapshot at {}, building from seed corpus", path.display());
        }
        Err(e) => {
            warn!("Discarding index snapshot: {}", e);
        }
    }

    let passages = chunk_documents(&seed_documents(), chunking);
    let index = match VectorIndex::build(passages, embedder) {
        Ok(index) => index,
        Err(e) => {
            error!("Failed to build index from seed corpus: {}", e);
            return Bootstrapped::Unavailable;
        }
    };

    let persisted = match index.save(snapshot_dir) {
        Ok(()) => true,
        Err(e) => {
            warn!(
                "Failed to save index snapshot to {}: {}",
                snapshot_dir.display(),
                e
            );
            false
        }
    };

    Bootstrapped::Built { index, persisted }
}

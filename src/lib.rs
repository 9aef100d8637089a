use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] embeddings::EmbeddingError),

    #[error("Completion error: {0}")]
    Completion(#[from] completion::CompletionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod assistant;
pub mod commands;
pub mod completion;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod retrieval;
pub mod server;

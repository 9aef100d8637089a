// Assistant module
// Response generation: retrieval, remote completion and canned fallbacks


pub mod fallback;

pub use fallback::{FALLBACK_RULES, FallbackRule, classify, generic_answer};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::completion::{CompletionClient, CompletionError, GroqClient};
use crate::config::Config;
use crate::embeddings::{Embedder, OllamaClient};
use crate::index::bootstrap_index;
use crate::retrieval::{Retriever, join_passages};

/// Context used when nothing could be retrieved
pub const DEFAULT_CONTEXT: &str =
    "I'm an AI assistant for Atomcamp, a data science education platform.";

/// Which branch of the fallback chain produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Remote,
    FallbackKeyword(&'static str),
    FallbackGeneric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub source: ResponseSource,
}

/// Process-wide answering context.
///
/// Built once at startup and never mutated afterwards, so it can be shared
/// across request handlers behind an `Arc`.
pub struct Assistant {
    retriever: Option<Retriever>,
    completion: Box<dyn CompletionClient>,
}

impl Assistant {
    #[inline]
    pub fn new(retriever: Option<Retriever>, completion: Box<dyn CompletionClient>) -> Self {
        Self {
            retriever,
            completion,
        }
    }

    /// Initialize everything the assistant needs, in order:
    ///
    /// 1. read the completion credential from the environment
    /// 2. connect the embedder
    /// 3. load or build the vector index
    /// 4. wrap the index in a retriever
    /// 5. create the completion client
    ///
    /// Only configuration errors fail; an unreachable embedder or a broken
    /// snapshot leaves the assistant running without retrieval.
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = std::env::var(&config.completion.api_key_env).ok();
        if api_key.is_none() {
            warn!(
                "{} is not set; answers will come from canned fallbacks",
                config.completion.api_key_env
            );
        }

        let embedder: Arc<dyn Embedder> = Arc::new(
            OllamaClient::new(&config.ollama).context("Failed to create embedding client")?,
        );
        let retriever = Self::bootstrap_retriever(config, embedder);

        let completion = GroqClient::new(&config.completion, api_key)
            .context("Failed to create completion client")?;

        Ok(Self::new(retriever, Box::new(completion)))
    }

    /// Bootstrap the index with `embedder` and assemble the assistant
    #[inline]
    pub fn with_embedder(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        completion: Box<dyn CompletionClient>,
    ) -> Self {
        Self::new(Self::bootstrap_retriever(config, embedder), completion)
    }

    fn bootstrap_retriever(config: &Config, embedder: Arc<dyn Embedder>) -> Option<Retriever> {
        let snapshot_dir = config.snapshot_path();
        let retriever = bootstrap_index(&snapshot_dir, embedder.as_ref(), &config.chunking)
            .into_index()
            .map(|index| Retriever::new(index, embedder, config.retrieval.top_k));

        match &retriever {
            Some(retriever) => info!(
                "Retriever ready with {} indexed passages",
                retriever.index().len()
            ),
            None => warn!("No vector index available, answering without retrieval"),
        }

        retriever
    }

    #[inline]
    pub fn index_loaded(&self) -> bool {
        self.retriever.is_some()
    }

    #[inline]
    pub fn remote_enabled(&self) -> bool {
        self.completion.is_enabled()
    }

    /// Retrieved passages joined into a prompt context.
    ///
    /// Falls back to [`DEFAULT_CONTEXT`] when there is no index, retrieval
    /// fails or nothing is found.
    #[inline]
    pub fn grounding_context(&self, message: &str) -> String {
        let Some(retriever) = &self.retriever else {
            debug!("No index available, using default context");
            return DEFAULT_CONTEXT.to_string();
        };

        match retriever.retrieve(message) {
            Ok(passages) if !passages.is_empty() => join_passages(&passages),
            Ok(_) => {
                debug!("Retrieval found no passages, using default context");
                DEFAULT_CONTEXT.to_string()
            }
            Err(e) => {
                warn!("Retrieval failed, using default context: {}", e);
                DEFAULT_CONTEXT.to_string()
            }
        }
    }

    /// Answer `message`, reporting which branch produced the text
    #[inline]
    pub fn respond(&self, message: &str) -> Answer {
        if message.trim().is_empty() {
            debug!("Empty message, answering generically");
            return Answer {
                text: generic_answer(message),
                source: ResponseSource::FallbackGeneric,
            };
        }

        let context = self.grounding_context(message);

        match self.completion.complete(message, &context) {
            Ok(text) => {
                debug!("Answered from remote model");
                return Answer {
                    text,
                    source: ResponseSource::Remote,
                };
            }
            Err(CompletionError::MissingCredential) => {
                debug!("Remote completion disabled, skipping");
            }
            Err(e) if e.is_misconfiguration() => {
                error!("Remote completion unavailable: {}", e);
            }
            Err(e) => {
                warn!("Remote completion failed: {}", e);
            }
        }

        match classify(message) {
            Some(rule) => {
                debug!("Answering from canned {} fallback", rule.topic);
                Answer {
                    text: rule.response.to_string(),
                    source: ResponseSource::FallbackKeyword(rule.topic),
                }
            }
            None => {
                debug!("No fallback rule matched, answering generically");
                Answer {
                    text: generic_answer(message),
                    source: ResponseSource::FallbackGeneric,
                }
            }
        }
    }

    /// Answer `message`; never fails
    #[inline]
    pub fn answer(&self, message: &str) -> String {
        self.respond(message).text
    }
}

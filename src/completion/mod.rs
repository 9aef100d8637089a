// Completion module
// Remote chat-completion clients used to generate grounded answers

#[cfg(test)]
mod tests;

pub mod groq;

pub use groq::GroqClient;

use thiserror::Error;

/// Why a remote completion could not be produced
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("No API key configured for the completion service")]
    MissingCredential,
    #[error("Completion service rejected the credential (HTTP {0})")]
    Unauthorized(u16),
    #[error("Completion service returned HTTP {0}")]
    Status(u16),
    #[error("Completion request timed out")]
    Timeout,
    #[error("Network error calling completion service: {0}")]
    Network(String),
    #[error("Malformed completion response: {0}")]
    Malformed(String),
}

impl CompletionError {
    /// Errors an operator has to fix, as opposed to transient failures
    #[inline]
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::Unauthorized(_))
    }
}

/// A service that turns a question plus grounding context into an answer
pub trait CompletionClient: Send + Sync {
    /// One attempt, no retries
    fn complete(&self, user_message: &str, grounding_context: &str)
    -> Result<String, CompletionError>;

    /// Whether a credential is configured at all
    fn is_enabled(&self) -> bool;
}

/// Build the system instruction sent ahead of the user's message
#[inline]
pub fn system_prompt(grounding_context: &str) -> String {
    format!(
        "You are an AI assistant for Atomcamp, a data science education platform.\n\
         Answer questions about Atomcamp's courses, career services and data science topics \
         using the context below.\n\
         \n\
         Context: {}\n\
         \n\
         Guidelines:\n\
         - Focus on Atomcamp's offerings and stay on topic\n\
         - Give specific details when the context has them\n\
         - Use bullet points for lists\n\
         - Keep answers concise\n\
         - Do not use emojis or decorative symbols",
        grounding_context
    )
}

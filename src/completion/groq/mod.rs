
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use url::Url;

use super::{CompletionClient, CompletionError, system_prompt};
use crate::config::CompletionConfig;

/// Blocking client for an OpenAI-compatible chat-completions endpoint
#[derive(Clone)]
pub struct GroqClient {
    endpoint: Url,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl GroqClient {
    /// Create a client; `api_key` of `None` disables remote completion
    #[inline]
    pub fn new(config: &CompletionConfig, api_key: Option<String>) -> Result<Self> {
        let endpoint = config
            .endpoint()
            .context("Failed to build chat completion URL from config")?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build()
            .into();

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            agent,
        })
    }

    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn send(&self, api_key: &str, body: &str) -> Result<String, CompletionError> {
        self.agent
            .post(self.endpoint.as_str())
            .header("Authorization", &format!("Bearer {}", api_key.trim()))
            .header("Content-Type", "application/json")
            .send(body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(classify_error)
    }
}

fn classify_error(error: ureq::Error) -> CompletionError {
    match error {
        ureq::Error::StatusCode(status @ (401 | 403)) => CompletionError::Unauthorized(status),
        ureq::Error::StatusCode(status) => CompletionError::Status(status),
        ureq::Error::Timeout(_) => CompletionError::Timeout,
        other => CompletionError::Network(other.to_string()),
    }
}

fn parse_response(response_text: &str) -> Result<String, CompletionError> {
    let response: ChatResponse = serde_json::from_str(response_text)
        .map_err(|e| CompletionError::Malformed(e.to_string()))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CompletionError::Malformed("response has no choices".to_string()))?;

    if content.trim().is_empty() {
        return Err(CompletionError::Malformed(
            "completion content is empty".to_string(),
        ));
    }

    Ok(content)
}

impl CompletionClient for GroqClient {
    #[inline]
    fn complete(
        &self,
        user_message: &str,
        grounding_context: &str,
    ) -> Result<String, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingCredential)?;

        let system = system_prompt(grounding_context);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_output_tokens,
        };

        let body = serde_json::to_string(&request)
            .map_err(|e| CompletionError::Malformed(format!("request serialization: {}", e)))?;

        debug!(
            "Requesting completion from {} with model {}",
            self.endpoint, self.model
        );

        let response_text = self.send(api_key, &body)?;
        let content = parse_response(&response_text)?;

        debug!("Received completion ({} chars)", content.len());
        Ok(content)
    }

    #[inline]
    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

pub mod openai;
pub mod openrouter;
pub mod deepseek;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::{ LlmConfig, LlmType };
use crate::models::chat::Message;
use self::openai::OpenAICompatClient;

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub tokens_used: u64,
}

/// Per-call generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl CompletionOptions {
    /// Settings for conversational replies.
    pub fn chat() -> Self {
        Self { temperature: 0.7, max_tokens: 1500, timeout: Duration::from_secs(30) }
    }

    /// Settings for document analysis, which produces longer answers.
    pub fn document_analysis() -> Self {
        Self { temperature: 0.7, max_tokens: 2000, timeout: Duration::from_secs(60) }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} is not configured in environment variables")]
    MissingApiKey(&'static str),

    #[error("invalid upstream configuration: {0}")]
    InvalidConfig(String),

    #[error("upstream rejected the API key ({status}): {message}")]
    Unauthorized {
        status: u16,
        message: String,
    },

    #[error("upstream rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("upstream request timed out")]
    Timeout,

    #[error("could not reach upstream: {0}")]
    Transport(String),

    #[error("HTTP error from upstream: {status} - {message}")]
    Status {
        status: u16,
        message: String,
    },

    #[error("unexpected upstream response: {0}")]
    Schema(String),
}

impl ProviderError {
    /// Whether a later attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Timeout | ProviderError::Transport(_) | ProviderError::RateLimited(_) => true,
            ProviderError::Status { status, .. } => matches!(status, 408 | 500 | 502 | 503 | 504),
            ProviderError::MissingApiKey(_) |
            ProviderError::InvalidConfig(_) |
            ProviderError::Unauthorized { .. } |
            ProviderError::Schema(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Schema(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// A chat-completion provider. Handlers only ever talk to this trait.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions
    ) -> Result<Completion, ProviderError>;

    /// Lightweight credential and reachability check used by the health endpoint.
    async fn check(&self) -> Result<(), ProviderError>;

    fn get_provider(&self) -> LlmType;
    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
    fn is_configured(&self) -> bool;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ProviderError> {
    let client: OpenAICompatClient = match config.llm_type {
        LlmType::OpenRouter => openrouter::from_config(config)?,
        LlmType::DeepSeek => deepseek::from_config(config)?,
    };
    Ok(Arc::new(client))
}

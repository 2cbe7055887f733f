use super::openai::{ Endpoints, OpenAICompatClient };
use super::ProviderError;
use crate::llm::{ LlmConfig, LlmType };

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3.1:free";

/// `/auth/key` answers 200 for any valid key without spending credits.
pub const ENDPOINTS: Endpoints = Endpoints {
    chat: "/chat/completions",
    check: "/auth/key",
};

pub fn from_config(config: &LlmConfig) -> Result<OpenAICompatClient, ProviderError> {
    // OpenRouter uses these for app attribution on its dashboard.
    let mut headers = Vec::new();
    if let Some(referer) = &config.referer {
        headers.push(("http-referer", referer.clone()));
    }
    if let Some(title) = &config.title {
        headers.push(("x-title", title.clone()));
    }

    OpenAICompatClient::new(
        LlmType::OpenRouter,
        config.api_key.clone(),
        config.completion_model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        config.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        ENDPOINTS,
        headers,
        config.retry.clone(),
    )
}

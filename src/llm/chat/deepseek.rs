use super::openai::{ Endpoints, OpenAICompatClient };
use super::ProviderError;
use crate::llm::{ LlmConfig, LlmType };

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

pub const ENDPOINTS: Endpoints = Endpoints {
    chat: "/chat/completions",
    check: "/models",
};

pub fn from_config(config: &LlmConfig) -> Result<OpenAICompatClient, ProviderError> {
    OpenAICompatClient::new(
        LlmType::DeepSeek,
        config.api_key.clone(),
        config.completion_model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        config.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        ENDPOINTS,
        Vec::new(),
        config.retry.clone(),
    )
}

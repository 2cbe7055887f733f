pub mod chat;
pub mod retry;

use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;
use log::warn;

use crate::cli::Args;
use self::retry::RetryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    OpenRouter,
    DeepSeek,
}

impl LlmType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmType::OpenRouter => "openrouter",
            LlmType::DeepSeek => "deepseek",
        }
    }

    /// Environment variable that carries the key for this provider.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmType::OpenRouter => "OPENROUTER_API_KEY",
            LlmType::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}

impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openrouter" => Ok(LlmType::OpenRouter),
            "deepseek" => Ok(LlmType::DeepSeek),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Invalid LLM provider: '{}' (expected openrouter or deepseek)", s),
                }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    pub referer: Option<String>,
    pub title: Option<String>,
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::OpenRouter,
            api_key: None,
            completion_model: None,
            base_url: None,
            referer: None,
            title: None,
            retry: RetryConfig::default(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl LlmConfig {
    /// Resolves the provider and its key from the command line / environment.
    ///
    /// An explicit provider wins. Otherwise OpenRouter is used when its key is
    /// present, DeepSeek when only the DeepSeek key is present, and OpenRouter
    /// (unconfigured) when neither is.
    pub fn from_args(args: &Args) -> Result<Self, ParseLlmTypeError> {
        let openrouter_key = non_empty(&args.openrouter_api_key);
        let deepseek_key = non_empty(&args.deepseek_api_key);

        let llm_type = match non_empty(&args.provider) {
            Some(provider) => provider.parse()?,
            None if openrouter_key.is_some() => LlmType::OpenRouter,
            None if deepseek_key.is_some() => LlmType::DeepSeek,
            None => LlmType::OpenRouter,
        };

        let api_key = match llm_type {
            LlmType::OpenRouter => openrouter_key,
            LlmType::DeepSeek => deepseek_key,
        };

        // `vendor/model` ids only exist on OpenRouter.
        let completion_model = match non_empty(&args.model) {
            Some(model) if llm_type == LlmType::DeepSeek && model.contains('/') => {
                warn!(
                    "Ignoring OPENROUTER_MODEL '{}': it is an OpenRouter model id and the provider is DeepSeek",
                    model
                );
                None
            }
            model => model,
        };

        Ok(Self {
            llm_type,
            api_key,
            completion_model,
            base_url: non_empty(&args.upstream_base_url),
            referer: Some(args.app_referer.clone()).filter(|v| !v.trim().is_empty()),
            title: Some(args.app_title.clone()).filter(|v| !v.trim().is_empty()),
            retry: RetryConfig {
                max_retries: args.upstream_max_retries,
                ..RetryConfig::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["chat-relay"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn parses_provider_names_case_insensitively() {
        assert_eq!("OpenRouter".parse::<LlmType>(), Ok(LlmType::OpenRouter));
        assert_eq!(" deepseek ".parse::<LlmType>(), Ok(LlmType::DeepSeek));
        assert!("ollama".parse::<LlmType>().is_err());
    }

    #[test]
    fn explicit_provider_selects_matching_key() {
        let config = LlmConfig::from_args(
            &args(&["--provider", "deepseek", "--openrouter-api-key", "or", "--deepseek-api-key", "ds"])
        ).unwrap();
        assert_eq!(config.llm_type, LlmType::DeepSeek);
        assert_eq!(config.api_key.as_deref(), Some("ds"));
    }

    #[test]
    fn deepseek_inferred_when_only_its_key_is_set() {
        let config = LlmConfig::from_args(
            &args(&["--provider", "", "--openrouter-api-key", "", "--deepseek-api-key", "ds"])
        ).unwrap();
        assert_eq!(config.llm_type, LlmType::DeepSeek);
        assert_eq!(config.api_key.as_deref(), Some("ds"));
    }

    #[test]
    fn openrouter_model_id_is_not_sent_to_deepseek() {
        let config = LlmConfig::from_args(
            &args(&["--provider", "deepseek", "--deepseek-api-key", "ds", "--model", "deepseek/deepseek-chat-v3.1:free"])
        ).unwrap();
        assert_eq!(config.completion_model, None);

        let config = LlmConfig::from_args(
            &args(&["--provider", "deepseek", "--deepseek-api-key", "ds", "--model", "deepseek-reasoner"])
        ).unwrap();
        assert_eq!(config.completion_model.as_deref(), Some("deepseek-reasoner"));

        let config = LlmConfig::from_args(
            &args(&["--provider", "openrouter", "--model", "openai/gpt-4o-mini"])
        ).unwrap();
        assert_eq!(config.completion_model.as_deref(), Some("openai/gpt-4o-mini"));
    }

    #[test]
    fn retry_count_comes_from_args() {
        let config = LlmConfig::from_args(
            &args(&["--provider", "openrouter", "--upstream-max-retries", "5"])
        ).unwrap();
        assert_eq!(config.retry.max_retries, 5);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(LlmConfig::from_args(&args(&["--provider", "gemini"])).is_err());
    }
}

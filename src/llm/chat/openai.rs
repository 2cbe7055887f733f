use async_trait::async_trait;
use log::{ debug, info };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE } };
use serde::{ Deserialize, Serialize };
use std::time::Duration;

use super::{ ChatClient, Completion, CompletionOptions, ProviderError };
use crate::llm::retry::{ with_retry, RetryConfig };
use crate::llm::LlmType;
use crate::models::chat::Message;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const ERROR_SNIPPET_LEN: usize = 500;

/// Routes of an OpenAI-compatible provider, relative to its base URL.
#[derive(Debug, Clone, Copy)]
pub struct Endpoints {
    pub chat: &'static str,
    pub check: &'static str,
}

/// Client for any provider speaking the OpenAI `chat/completions` format.
pub struct OpenAICompatClient {
    http: HttpClient,
    provider: LlmType,
    api_key: Option<String>,
    model: String,
    base_url: String,
    endpoints: Endpoints,
    retry: RetryConfig,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
    error: Option<UpstreamErrorBody>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

#[derive(Deserialize)]
struct UpstreamErrorBody {
    message: String,
    code: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: UpstreamErrorBody,
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Prefers the provider's `error.message`, falls back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => truncate(body.trim(), ERROR_SNIPPET_LEN),
    }
}

fn error_from_status(status: u16, message: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Unauthorized { status, message },
        429 => ProviderError::RateLimited(message),
        _ => ProviderError::Status { status, message },
    }
}

/// Maps an `error` object found in a 2xx body. Codes outside the HTTP range count as 502.
fn error_from_body(err: UpstreamErrorBody) -> ProviderError {
    let status = err.code
        .as_ref()
        .and_then(|c| c.as_u64())
        .and_then(|c| u16::try_from(c).ok())
        .filter(|c| (100..=599).contains(c))
        .unwrap_or(502);
    error_from_status(status, err.message)
}

impl OpenAICompatClient {
    pub fn new(
        provider: LlmType,
        api_key: Option<String>,
        model: String,
        base_url: String,
        endpoints: Endpoints,
        extra_headers: Vec<(&'static str, String)>,
        retry: RetryConfig,
    ) -> Result<Self, ProviderError> {
        url::Url::parse(&base_url)
            .map_err(|e| ProviderError::InvalidConfig(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in extra_headers {
            let value = HeaderValue::from_str(&value)
                .map_err(|e| ProviderError::InvalidConfig(format!("Invalid {} header: {}", name, e)))?;
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ProviderError::InvalidConfig(format!("Invalid header name {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            provider,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints,
            retry,
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    fn require_key(&self) -> Result<&str, ProviderError> {
        self.api_key.as_deref().ok_or(ProviderError::MissingApiKey(self.provider.api_key_env()))
    }

    async fn send_completion(
        &self,
        url: &str,
        api_key: &str,
        req: &ChatCompletionRequest<'_>,
        timeout: Duration,
    ) -> Result<Completion, ProviderError> {
        let resp = self.http.post(url)
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(error_from_status(status.as_u16(), error_message(&body)));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e|
            ProviderError::Schema(format!("{} in body: {}", e, truncate(&body, 200)))
        )?;

        // OpenRouter reports some failures (e.g. data-policy restrictions) inside a 200 body.
        if let Some(err) = parsed.error {
            return Err(error_from_body(err));
        }

        let content = parsed.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::Schema("response contained no assistant message".to_string()))?;

        Ok(Completion {
            content,
            model: self.model.clone(),
            tokens_used: parsed.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }
}

#[async_trait]
impl ChatClient for OpenAICompatClient {
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions
    ) -> Result<Completion, ProviderError> {
        let api_key = self.require_key()?;
        let url = self.url(self.endpoints.chat);
        let req = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        info!(
            "Sending request to {}: model={}, messages={}, max_tokens={}",
            self.provider,
            self.model,
            messages.len(),
            options.max_tokens
        );

        let url = url.as_str();
        let req = &req;
        let timeout = options.timeout;
        let completion = with_retry(
            &self.retry,
            move |_| self.send_completion(url, api_key, req, timeout),
            ProviderError::is_transient
        ).await?;

        debug!("{} replied with {} tokens", self.provider, completion.tokens_used);
        Ok(completion)
    }

    async fn check(&self) -> Result<(), ProviderError> {
        let api_key = self.require_key()?;
        let resp = self.http.get(self.url(self.endpoints.check))
            .bearer_auth(api_key)
            .timeout(CHECK_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(error_from_status(status.as_u16(), error_message(&body)))
    }

    fn get_provider(&self) -> LlmType {
        self.provider
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#![allow(dead_code)]

use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{ header::CONTENT_TYPE, Request, Response };
use axum::Router;
use serde_json::Value;

use chat_relay::config::prompt::PromptConfig;
use chat_relay::llm::chat::{ ChatClient, Completion, CompletionOptions, ProviderError };
use chat_relay::llm::LlmType;
use chat_relay::models::chat::Message;
use chat_relay::relay::ChatRelay;
use chat_relay::server::api::{ router, AppState, ServerSettings };

pub const TEST_MODEL: &str = "deepseek/deepseek-chat-v3.1:free";
pub const BOUNDARY: &str = "----chat-relay-test-boundary";

/// Scripted stand-in for the upstream provider.
pub struct FakeClient {
    pub configured: bool,
    pub reply: String,
    pub failure: Option<fn() -> ProviderError>,
    pub check_failure: Option<fn() -> ProviderError>,
    pub check_delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub last_messages: Mutex<Vec<Message>>,
    pub last_options: Mutex<Option<CompletionOptions>>,
}

impl FakeClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            configured: true,
            reply: reply.to_string(),
            failure: None,
            check_failure: None,
            check_delay: None,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
            last_options: Mutex::new(None),
        }
    }

    pub fn failing(failure: fn() -> ProviderError) -> Self {
        Self { failure: Some(failure), ..Self::replying("") }
    }

    pub fn unconfigured() -> Self {
        Self { configured: false, failure: Some(|| ProviderError::MissingApiKey("OPENROUTER_API_KEY")), ..Self::replying("") }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for FakeClient {
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions
    ) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        *self.last_options.lock().unwrap() = Some(options.clone());
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(Completion { content: self.reply.clone(), model: TEST_MODEL.to_string(), tokens_used: 42 })
    }

    async fn check(&self) -> Result<(), ProviderError> {
        if !self.configured {
            return Err(ProviderError::MissingApiKey("OPENROUTER_API_KEY"));
        }
        if let Some(delay) = self.check_delay {
            tokio::time::sleep(delay).await;
        }
        match self.check_failure {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }

    fn get_provider(&self) -> LlmType {
        LlmType::OpenRouter
    }

    fn get_model(&self) -> String {
        TEST_MODEL.to_string()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

pub struct AppOptions {
    pub creator: Option<String>,
    pub rate_limit_per_second: u32,
    pub max_upload_bytes: usize,
    pub health_timeout: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            creator: None,
            rate_limit_per_second: 0,
            max_upload_bytes: 64 * 1024,
            health_timeout: Duration::from_secs(6),
        }
    }
}

pub fn app_with(client: Arc<dyn ChatClient>, options: AppOptions) -> Router {
    let relay = Arc::new(ChatRelay::new(client, Arc::new(PromptConfig::default()), options.creator));
    let settings = ServerSettings {
        max_upload_bytes: options.max_upload_bytes,
        health_timeout: options.health_timeout,
        ..ServerSettings::default()
    };
    router(AppState::new(relay, settings, options.rate_limit_per_second))
}

pub fn app(client: Arc<dyn ChatClient>) -> Router {
    app_with(client, AppOptions::default())
}

pub fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_post(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes()
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name,
                        filename
                    ).as_bytes()
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

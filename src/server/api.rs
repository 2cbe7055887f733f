use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ DefaultBodyLimit, Multipart, State },
    extract::multipart::MultipartRejection,
    extract::rejection::JsonRejection,
    middleware,
    http::StatusCode,
};
use bytes::Bytes;
use futures::future::try_join_all;
use governor::{ DefaultDirectRateLimiter, Quota, RateLimiter };
use log::{ debug, info, warn };
use serde_json::{ json, Value };
use tower::ServiceBuilder;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::docs::ApiDoc;
use super::error::ApiError;
use super::middleware::{ cors_layer, log_requests, rate_limit };
use crate::extract::{ extract_document, DocumentFormat };
use crate::models::chat::{ ChatRequest, ChatResponse };
use crate::models::health::{ HealthStatus, ServiceStatus, UpstreamHealth, UpstreamState };
use crate::models::upload::{ FileSummary, UploadForm, UploadResponse, UploadResult };
use crate::relay::ChatRelay;

pub const SERVICE_NAME: &str = "NERA Chat Service";

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
    /// Upper bound on the upstream credential check behind `/health`.
    pub health_timeout: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            cors_origins: vec![
                "https://nera-ai.netlify.app".to_string(),
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string()
            ],
            max_upload_bytes: 10 * 1024 * 1024,
            health_timeout: Duration::from_secs(6),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ChatRelay>,
    pub limiter: Option<Arc<DefaultDirectRateLimiter>>,
    pub settings: Arc<ServerSettings>,
}

impl AppState {
    /// `rate_limit_per_second == 0` disables the inbound limiter.
    pub fn new(relay: Arc<ChatRelay>, settings: ServerSettings, rate_limit_per_second: u32) -> Self {
        let limiter = NonZeroU32::new(rate_limit_per_second)
            .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate))));
        Self { relay, limiter, settings: Arc::new(settings) }
    }
}

pub fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.settings.max_upload_bytes);

    let api = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/upload", post(upload_handler).layer(upload_limit))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&state.settings.cors_origins))
                .layer(middleware::from_fn(log_requests))
        )
        .with_state(state)
}

/// Service name, version and a directory of the endpoints.
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Service index", body = serde_json::Value))
)]
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chat": {
                "url": "/api/chat",
                "method": "POST",
                "description": "Send chat messages"
            },
            "file_upload": {
                "url": "/api/chat/upload",
                "method": "POST",
                "description": "Upload files with chat messages"
            },
            "health": {
                "url": "/health",
                "method": "GET",
                "description": "Check service health"
            }
        },
        "documentation": "/docs",
        "openapi": "/openapi.json"
    }))
}

/// Liveness plus an upstream credential check.
///
/// Returns 200 when the provider accepted the key, 503 with `"degraded"`
/// when the key is missing or the provider could not be reached.
#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses(
        (status = 200, description = "Upstream reachable", body = serde_json::Value),
        (status = 503, description = "Upstream unconfigured or unreachable", body = serde_json::Value)
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let client = state.relay.client();
    let provider = client.get_provider();

    let (upstream_state, message) = if !client.is_configured() {
        (
            UpstreamState::Unconfigured,
            Some(format!("{} is not configured in environment variables", provider.api_key_env())),
        )
    } else {
        match tokio::time::timeout(state.settings.health_timeout, client.check()).await {
            Ok(Ok(())) => (UpstreamState::Connected, None),
            Ok(Err(e)) => (UpstreamState::Unreachable, Some(format!("Failed to connect to {} API: {}", provider, e))),
            Err(_) => (UpstreamState::Unreachable, Some(format!("{} health check timed out", provider))),
        }
    };

    let status = if upstream_state == UpstreamState::Connected {
        ServiceStatus::Healthy
    } else {
        warn!("Health check degraded: {}", message.as_deref().unwrap_or("unknown"));
        ServiceStatus::Degraded
    };

    let health = HealthStatus {
        status,
        provider,
        upstream: UpstreamHealth { status: upstream_state, model: client.get_model() },
        message,
    };
    let code = if health.is_healthy() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(health))
}

/// Relays a conversation upstream and returns the assistant's reply.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Invalid conversation"),
        (status = 429, description = "Rate limited"),
        (status = 502, description = "Upstream error"),
        (status = 503, description = "Upstream not configured"),
        (status = 504, description = "Upstream timed out")
    )
)]
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::Validation)?;

    debug!("Chat request with {} message(s)", request.messages.len());
    let message = state.relay.reply(&request.messages).await?;

    Ok(Json(ChatResponse { message }))
}

/// Extracts text from the uploaded files and asks the provider to analyse it.
#[utoipa::path(
    post,
    path = "/api/chat/upload",
    tag = "chat",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Analysis of the files", body = UploadResponse),
        (status = 400, description = "Missing files or message"),
        (status = 413, description = "Upload too large"),
        (status = 415, description = "Unsupported file type"),
        (status = 422, description = "File could not be read"),
        (status = 502, description = "Upstream error")
    )
)]
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut message: Option<String> = None;
    let mut files: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("files") | Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await?;
                files.push((filename, data));
            }
            Some("message") => {
                message = Some(field.text().await?);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("No files provided. Use /api/chat for text-only messages.".into()));
    }
    let message = message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("A non-empty 'message' field is required".into()))?;

    // Reject the whole request before any parsing when one file is unsupported.
    for (filename, _) in &files {
        DocumentFormat::from_filename(filename)?;
    }

    info!(
        "Processing {} file(s): {}",
        files.len(),
        files
            .iter()
            .map(|(name, data)| format!("{} ({} bytes)", name, data.len()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let documents = try_join_all(
        files.into_iter().map(|(filename, data)| extract_document(filename, data))
    ).await?;

    let completion = state.relay.analyse_documents(&message, &documents).await?;

    let summaries = documents
        .iter()
        .map(|doc| FileSummary {
            filename: doc.filename.clone(),
            format: doc.format.as_str().to_string(),
            characters: doc.text.chars().count(),
        })
        .collect();

    Ok(Json(UploadResponse::success(UploadResult {
        response: completion.content,
        model: completion.model,
        tokens_used: completion.tokens_used,
        files: summaries,
    })))
}

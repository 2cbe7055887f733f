//! Error type returned by every handler.
//!
//! Each variant maps to a status code and a `{"error": "..."}` JSON body.
//! Upstream failures keep the provider's diagnostic so callers can tell a
//! bad key from a rate limit or a data-policy rejection.

use axum::extract::multipart::{ MultipartError, MultipartRejection };
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{ IntoResponse, Response };
use axum::Json;
use log::{ error, warn };
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::llm::chat::ProviderError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Well-formed JSON that breaks a request rule.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Too many requests, please retry shortly")]
    RateLimited,

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Extract(ExtractError::Unsupported { .. }) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Extract(ExtractError::Corrupt { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Provider(e) =>
                match e {
                    ProviderError::MissingApiKey(_) | ProviderError::InvalidConfig(_) =>
                        StatusCode::SERVICE_UNAVAILABLE,
                    ProviderError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                    ProviderError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    ProviderError::Unauthorized { .. } |
                    ProviderError::Transport(_) |
                    ProviderError::Status { .. } |
                    ProviderError::Schema(_) => StatusCode::BAD_GATEWAY,
                }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(rejection.body_text()),
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            ApiError::BadRequest(e.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Provider(e) => error!("Upstream error: {}", e),
            ApiError::Extract(e) => warn!("Extraction error: {}", e),
            _ => warn!("Rejected request ({}): {}", status.as_u16(), self),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

use std::time::Instant;

use axum::extract::{ Request, State };
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{ IntoResponse, Response };
use log::{ info, warn };
use tower_http::cors::{ AllowHeaders, AllowMethods, AllowOrigin, CorsLayer };
use uuid::Uuid;

use super::api::AppState;
use super::error::ApiError;

/// Only the listed origins are allowed. Credentials are allowed, so methods
/// and headers are mirrored from the request rather than wildcarded.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| {
            // A wildcard cannot be combined with credentials.
            if origin.trim() == "*" {
                warn!("Ignoring wildcard CORS origin '*'; list the allowed origins explicitly");
                return false;
            }
            true
        })
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Some(limiter) = &state.limiter {
        if limiter.check().is_err() {
            return ApiError::RateLimited.into_response();
        }
    }
    next.run(req).await
}

pub async fn log_requests(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(req).await;

    info!(
        "[{}] {} {} -> {} in {} ms",
        request_id,
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

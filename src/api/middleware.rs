//! API middleware layers.
//!
//! - `X-Process-Time` header on every response
//! - API key enforcement for protected `/api/v1` routes

use std::time::Instant;

use axum::http::header::HeaderName;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use super::auth::ApiKey;
use crate::config::defaults;

/// Adds `X-Process-Time` (seconds, as a decimal string) to the response.
pub async fn add_process_time_header(request: axum::extract::Request, next: Next) -> Response {
    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = started.elapsed().as_secs_f64();

    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.6}")) {
        response.headers_mut().insert(
            HeaderName::from_static(defaults::PROCESS_TIME_HEADER),
            value,
        );
    }
    response
}

/// Rejects the request unless the [`ApiKey`] extractor accepts it.
pub async fn require_api_key(_key: ApiKey, request: axum::extract::Request, next: Next) -> Response {
    next.run(request).await
}

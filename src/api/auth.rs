//! API key authentication extractor

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use super::envelope::ApiErrorResponse;
use super::AppState;
use crate::config::defaults;

/// Proof that the request passed the API key check. Holds the presented
/// key, or `None` when keys are not required.
#[derive(Debug, Clone)]
pub struct ApiKey(pub Option<String>);

fn extract_key(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(defaults::API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for ApiKey {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = &state.config.auth;
        if !auth.require_api_key {
            return Ok(Self(extract_key(parts)));
        }

        let key = extract_key(parts).ok_or_else(|| ApiErrorResponse::unauthorized("API key required"))?;
        if !auth.accepts(&key) {
            tracing::warn!(path = %parts.uri.path(), "Rejected request with invalid API key");
            return Err(ApiErrorResponse::forbidden("Invalid API key"));
        }
        Ok(Self(Some(key)))
    }
}

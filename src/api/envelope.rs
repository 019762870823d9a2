//! Consistent response envelope for all `/api/v1` endpoints.
//!
//! Every response is wrapped in either [`ApiResponse`] (success) or
//! [`ApiErrorResponse`] (error), ensuring a uniform JSON shape. Domain
//! errors are mapped to status codes in [`ApiError`].

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;

use crate::config::defaults;
use crate::interchange::InterchangeError;
use crate::storage::StorageError;
use crate::trajectory::CalculationError;
use crate::types::ModelError;

/// Metadata included in every response.
#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: String,
    pub version: &'static str,
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            version: defaults::VERSION,
        }
    }
}

/// Successful response:
/// `{ "success": true, "data": T, "message": ..., "calculation_time": ..., "meta": { ... } }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_time: Option<f64>,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    fn with(success: bool, data: T, message: Option<String>, calculation_time: Option<f64>) -> Self {
        Self {
            success,
            data,
            message,
            calculation_time,
            meta: ResponseMeta::default(),
        }
    }

    pub fn ok(data: T) -> Response {
        (StatusCode::OK, axum::Json(Self::with(true, data, None, None))).into_response()
    }

    pub fn created(data: T) -> Response {
        (StatusCode::CREATED, axum::Json(Self::with(true, data, None, None))).into_response()
    }

    pub fn calculated(data: T, message: impl Into<String>, calculation_time: f64) -> Response {
        let body = Self::with(true, data, Some(message.into()), Some(calculation_time));
        (StatusCode::OK, axum::Json(body)).into_response()
    }

    /// 200 with `success = false`, for outcomes that are answers rather
    /// than request errors (a survey that fails validation).
    pub fn unsuccessful(data: T, message: impl Into<String>) -> Response {
        (StatusCode::OK, axum::Json(Self::with(false, data, Some(message.into()), None))).into_response()
    }
}

/// Error detail inside [`ApiErrorResponse`].
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Error response: `{ "success": false, "error": { "code", "message" }, "meta": { ... } }`
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
    pub meta: ResponseMeta,
}

impl ApiErrorResponse {
    pub(crate) fn build(status: StatusCode, code: &str, msg: impl Into<String>) -> Response {
        let body = Self {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: msg.into(),
            },
            meta: ResponseMeta::default(),
        };
        (status, axum::Json(body)).into_response()
    }

    pub fn not_found(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::NOT_FOUND, "NOT_FOUND", msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
    }

    pub fn conflict(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::CONFLICT, "CONFLICT", msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::FORBIDDEN, "FORBIDDEN", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Handler error. Converts into an enveloped error response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Logged in full, reported generically
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => ApiErrorResponse::bad_request(msg),
            Self::NotFound(msg) => ApiErrorResponse::not_found(msg),
            Self::Conflict(msg) => ApiErrorResponse::conflict(msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                ApiErrorResponse::internal("Internal server error")
            }
        }
    }
}

impl From<CalculationError> for ApiError {
    fn from(e: CalculationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { .. } => Self::NotFound(e.to_string()),
            StorageError::Conflict(msg) => Self::Conflict(msg),
            StorageError::Invalid(inner) => Self::BadRequest(inner.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<InterchangeError> for ApiError {
    fn from(e: InterchangeError) -> Self {
        match e {
            InterchangeError::Io(_) => Self::Internal(e.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

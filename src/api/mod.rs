//! REST API module using Axum
//!
//! Exposes the trajectory engine and project data over HTTP:
//! - `/healthz`, `/health`, `/`, `/api/info`: liveness and service info
//! - `/api/v1/calculations/*`: stateless trajectory calculations
//! - `/api/v1/{projects,wells,surveys,bhas}/*`: stored data, CSV and reports
//!
//! All `/api/v1` responses use the envelope in [`envelope`].

mod auth;
pub mod envelope;
pub mod handlers;
pub mod middleware;
mod routes;

pub use auth::ApiKey;

use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware as axum_mw;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::{defaults, ServiceConfig};
use crate::storage::{InMemoryRepository, ProjectRepository};
use crate::trajectory::TrajectoryEngine;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ProjectRepository>,
    pub engine: Arc<TrajectoryEngine>,
    pub config: Arc<ServiceConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(repo: Arc<dyn ProjectRepository>, config: ServiceConfig) -> Self {
        Self {
            repo,
            engine: Arc::new(TrajectoryEngine::from_config(&config.engine)),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// State over a fresh in-memory repository.
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::new(Arc::new(InMemoryRepository::new()), config)
    }
}

/// Build the CORS layer from configured origins. An empty list allows
/// same-origin only; `"*"` allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let api_key = HeaderName::from_static(defaults::API_KEY_HEADER);
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, api_key])
        .expose_headers([HeaderName::from_static(defaults::PROCESS_TIME_HEADER)]);

    if origins.iter().any(|o| o == "*") {
        tracing::info!("CORS: allowing any origin");
        return base.allow_origin(tower_http::cors::Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if !allowed.is_empty() {
        tracing::info!(count = allowed.len(), "CORS: allowing configured origins");
    }
    base.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.allowed_origins);
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .merge(routes::info_routes(state))
        .layer(axum_mw::from_fn(middleware::add_process_time_header))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

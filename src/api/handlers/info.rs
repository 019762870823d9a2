//! Liveness, health and service information

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::AppState;
use crate::config::defaults;
use crate::types::{CalculationMethod, UnitSystem};

/// GET /healthz - container liveness probe
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
    pub environment: String,
    pub uptime_seconds: u64,
    pub storage_backend: &'static str,
}

/// GET /health - service health with uptime and storage backend
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: state.config.service.name.clone(),
        version: defaults::VERSION,
        environment: state.config.service.environment.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        storage_backend: state.repo.backend_name(),
    })
}

/// GET / - service summary
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": state.config.service.name,
        "version": defaults::VERSION,
        "description": "Directional drilling trajectory calculations and project data",
        "features": [
            "Wellpath calculation (minimum curvature, radius of curvature, tangential, balanced tangential)",
            "Dogleg severity, build and turn rates",
            "Wellpath projection",
            "Survey validation",
            "Project, well, survey and BHA storage",
            "CSV import and export",
            "Survey, BHA, trajectory, daily and final well reports",
        ],
        "health_check": "/health",
        "api_info": "/api/info",
    }))
}

/// GET /api/info - API description
pub async fn api_info(State(state): State<AppState>) -> Json<Value> {
    let methods: Vec<&str> = CalculationMethod::ALL.iter().map(|m| m.as_str()).collect();
    let units: Vec<&str> = UnitSystem::ALL.iter().map(|u| u.as_str()).collect();

    Json(json!({
        "api_version": defaults::VERSION,
        "service_name": state.config.service.name,
        "environment": state.config.service.environment,
        "debug_mode": state.config.service.debug,
        "features": {
            "directional_drilling": {
                "methods": methods,
                "unit_systems": units,
                "calculations": ["wellpath", "dogleg_severity", "build_turn_rates", "closure", "vertical_section", "projection"],
                "validation": ["survey_data", "quality_metrics"],
            },
            "data_processing": {
                "formats": ["CSV", "JSON"],
                "export": ["CSV", "JSON", "HTML reports"],
            },
            "project_management": {
                "entities": ["projects", "wells", "surveys", "bhas", "drilling_parameters"],
                "persistence": state.repo.backend_name(),
            },
        },
        "endpoints": {
            "calculations": "/api/v1/calculations/*",
            "projects": "/api/v1/projects",
            "wells": "/api/v1/wells/:id",
            "surveys": "/api/v1/surveys/:id",
            "bhas": "/api/v1/bhas/:id",
            "health": "/health",
            "liveness": "/healthz",
        },
        "authentication": {
            "type": "API Key",
            "header": "X-API-Key",
            "required": state.config.auth.require_api_key,
        },
    }))
}

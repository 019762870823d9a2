//! Stateless trajectory calculations: /api/v1/calculations/*

use std::time::Instant;

use axum::extract::State;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::envelope::{ApiError, ApiJson, ApiResponse};
use crate::api::AppState;
use crate::trajectory::ProjectionInput;
use crate::types::{CalculationMethod, SurveyStation, UnitSystem, WellpathPoint};

// ============================================================================
// Wellpath
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WellpathRequest {
    pub survey_points: Vec<SurveyStation>,
    #[serde(default)]
    pub method: Option<CalculationMethod>,
    #[serde(default)]
    pub unit_system: Option<UnitSystem>,
    #[serde(default)]
    pub reference_azimuth: Option<f64>,
}

/// POST /api/v1/calculations/wellpath
pub async fn calculate_wellpath(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WellpathRequest>,
) -> Result<Response, ApiError> {
    let units = req.unit_system.unwrap_or(state.engine.default_unit_system);
    info!(points = req.survey_points.len(), method = ?req.method, "Calculating wellpath");

    let result = state.engine.calculate_wellpath(
        &req.survey_points,
        req.method,
        units,
        req.reference_azimuth.unwrap_or(0.0),
    )?;

    let elapsed = result.calculation_time;
    let message = format!(
        "Wellpath calculated successfully using {}",
        result.method.as_str()
    );
    Ok(ApiResponse::calculated(result, message, elapsed))
}

// ============================================================================
// Dogleg severity
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DoglegRequest {
    pub inc1: f64,
    pub azi1: f64,
    pub inc2: f64,
    pub azi2: f64,
    pub md_diff: f64,
    #[serde(default)]
    pub unit_system: Option<UnitSystem>,
}

#[derive(Debug, Serialize)]
pub struct DoglegResponse {
    pub dogleg_severity: f64,
    pub unit: &'static str,
    pub inc1: f64,
    pub azi1: f64,
    pub inc2: f64,
    pub azi2: f64,
    pub md_diff: f64,
}

fn check_attitude(label: &str, inc: f64, azi: f64) -> Result<(), ApiError> {
    if !(0.0..=180.0).contains(&inc) {
        return Err(ApiError::BadRequest(format!("{label}: inclination must be in [0, 180]: {inc}")));
    }
    if !(0.0..360.0).contains(&azi) {
        return Err(ApiError::BadRequest(format!("{label}: azimuth must be in [0, 360): {azi}")));
    }
    Ok(())
}

/// POST /api/v1/calculations/dogleg-severity
pub async fn calculate_dogleg_severity(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DoglegRequest>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    check_attitude("first point", req.inc1, req.azi1)?;
    check_attitude("second point", req.inc2, req.azi2)?;
    if !req.md_diff.is_finite() || req.md_diff <= 0.0 {
        return Err(ApiError::BadRequest(format!(
            "Measured depth difference must be positive: {}",
            req.md_diff
        )));
    }

    let units = req.unit_system.unwrap_or(state.engine.default_unit_system);
    let dls = state
        .engine
        .calculate_dogleg_severity((req.inc1, req.azi1), (req.inc2, req.azi2), req.md_diff, units);
    let unit = units.rate_label();

    let body = DoglegResponse {
        dogleg_severity: dls,
        unit,
        inc1: req.inc1,
        azi1: req.azi1,
        inc2: req.inc2,
        azi2: req.azi2,
        md_diff: req.md_diff,
    };
    Ok(ApiResponse::calculated(
        body,
        format!("Dogleg severity calculated: {dls:.2} {unit}"),
        started.elapsed().as_secs_f64(),
    ))
}

// ============================================================================
// Projection
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProjectionRequest {
    pub start_point: SurveyStation,
    pub build_rate: f64,
    pub turn_rate: f64,
    pub step_size: f64,
    pub num_steps: usize,
    #[serde(default)]
    pub unit_system: Option<UnitSystem>,
}

#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub projected_points: Vec<WellpathPoint>,
    pub start_point: SurveyStation,
    pub build_rate: f64,
    pub turn_rate: f64,
    pub step_size: f64,
    pub num_steps: usize,
    pub unit_system: UnitSystem,
    pub total_projected_md: f64,
}

/// POST /api/v1/calculations/project-wellpath
pub async fn project_wellpath(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ProjectionRequest>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let units = req.unit_system.unwrap_or(state.engine.default_unit_system);
    let input = ProjectionInput {
        start: req.start_point,
        build_rate: req.build_rate,
        turn_rate: req.turn_rate,
        step_size: req.step_size,
        num_steps: req.num_steps,
        unit_system: units,
    };

    let points = state.engine.project_wellpath(&input)?;
    let total_projected_md = match (points.first(), points.last()) {
        (Some(first), Some(last)) => last.md - first.md,
        _ => 0.0,
    };

    let body = ProjectionResponse {
        projected_points: points,
        start_point: req.start_point,
        build_rate: req.build_rate,
        turn_rate: req.turn_rate,
        step_size: req.step_size,
        num_steps: req.num_steps,
        unit_system: units,
        total_projected_md,
    };
    Ok(ApiResponse::calculated(
        body,
        format!("Wellpath projected {} steps successfully", req.num_steps),
        started.elapsed().as_secs_f64(),
    ))
}

// ============================================================================
// Methods and validation
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Described {
    pub value: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MethodsResponse {
    pub calculation_methods: Vec<Described>,
    pub unit_systems: Vec<Described>,
    pub default_method: CalculationMethod,
    pub tolerance: f64,
    pub max_projection_steps: usize,
}

/// GET /api/v1/calculations/methods
pub async fn get_methods(State(state): State<AppState>) -> Response {
    let body = MethodsResponse {
        calculation_methods: CalculationMethod::ALL
            .iter()
            .map(|m| Described {
                value: m.as_str(),
                name: m.display_name(),
                description: m.description(),
            })
            .collect(),
        unit_systems: UnitSystem::ALL
            .iter()
            .map(|u| Described {
                value: u.as_str(),
                name: u.display_name(),
                description: u.description(),
            })
            .collect(),
        default_method: state.engine.default_method,
        tolerance: state.engine.tolerance,
        max_projection_steps: state.engine.max_projection_steps,
    };
    ApiResponse::ok(body)
}

/// POST /api/v1/calculations/validate-survey
///
/// A survey that fails validation is a successful request with
/// `success = false` and `data.valid = false`.
pub async fn validate_survey(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WellpathRequest>,
) -> Response {
    let started = Instant::now();
    match state.engine.survey_report(&req.survey_points) {
        Ok(report) => ApiResponse::calculated(
            report,
            "Survey data validation completed successfully",
            started.elapsed().as_secs_f64(),
        ),
        Err(e) => {
            info!(error = %e, "Survey failed validation");
            ApiResponse::unsuccessful(
                serde_json::json!({ "valid": false, "error": e.to_string() }),
                format!("Survey data validation failed: {e}"),
            )
        }
    }
}

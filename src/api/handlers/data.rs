//! Stored project data: projects, wells, surveys, BHAs, drilling parameters

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::api::envelope::{ApiError, ApiJson, ApiResponse};
use crate::api::AppState;
use crate::interchange;
use crate::types::{
    Bha, BhaComponent, CalculationMethod, DrillingParameters, Project, Survey, SurveyStation,
    UnitSystem, Well,
};

// ============================================================================
// Projects
// ============================================================================

/// POST /api/v1/projects
pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(mut project): ApiJson<Project>,
) -> Result<Response, ApiError> {
    // Wells are attached through /projects/:id/wells
    project.well_ids.clear();
    state.repo.create_project(&project)?;
    info!(project_id = %project.project_id, name = %project.name, "Project created");
    Ok(ApiResponse::created(project))
}

pub async fn list_projects(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(ApiResponse::ok(state.repo.list_projects()?))
}

pub async fn get_project(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    Ok(ApiResponse::ok(state.repo.get_project(&id)?))
}

/// DELETE /api/v1/projects/:id - removes the project and its wells
pub async fn delete_project(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    state.repo.delete_project(&id)?;
    info!(project_id = %id, "Project deleted");
    Ok(ApiResponse::ok(json!({ "deleted": id })))
}

// ============================================================================
// Wells
// ============================================================================

/// POST /api/v1/projects/:id/wells
pub async fn create_well(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    ApiJson(well): ApiJson<Well>,
) -> Result<Response, ApiError> {
    state.repo.create_well(&project_id, &well)?;
    info!(project_id = %project_id, well_id = %well.well_id, "Well created");
    Ok(ApiResponse::created(well))
}

pub async fn list_wells(State(state): State<AppState>, Path(project_id): Path<String>) -> Result<Response, ApiError> {
    Ok(ApiResponse::ok(state.repo.list_wells(&project_id)?))
}

pub async fn get_well(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    Ok(ApiResponse::ok(state.repo.get_well(&id)?))
}

/// DELETE /api/v1/wells/:id - removes surveys, BHAs and the drilling log too
pub async fn delete_well(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    state.repo.delete_well(&id)?;
    info!(well_id = %id, "Well deleted");
    Ok(ApiResponse::ok(json!({ "deleted": id })))
}

// ============================================================================
// Surveys
// ============================================================================

/// Survey body for `POST /wells/:id/surveys`. Unit system and method
/// default to the well's settings and the engine default.
#[derive(Debug, Deserialize)]
pub struct NewSurvey {
    #[serde(default)]
    pub survey_name: Option<String>,
    #[serde(default)]
    pub unit_system: Option<UnitSystem>,
    #[serde(default)]
    pub stations: Vec<SurveyStation>,
    #[serde(default)]
    pub calculation_method: Option<CalculationMethod>,
    #[serde(default)]
    pub reference_azimuth: f64,
    #[serde(default)]
    pub magnetic_declination: f64,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

pub async fn create_survey(
    State(state): State<AppState>,
    Path(well_id): Path<String>,
    ApiJson(req): ApiJson<NewSurvey>,
) -> Result<Response, ApiError> {
    let well = state.repo.get_well(&well_id)?;

    let mut survey = Survey::new(&well_id, req.unit_system.unwrap_or(well.unit_system));
    survey.survey_name = req.survey_name;
    survey.calculation_method = req.calculation_method.unwrap_or(state.engine.default_method);
    survey.reference_azimuth = req.reference_azimuth;
    survey.magnetic_declination = req.magnetic_declination;
    survey.created_by = req.created_by;
    survey.comments = req.comments;
    for station in req.stations {
        survey.add_station(station);
    }

    state.repo.save_survey(&survey)?;
    info!(well_id = %well_id, survey_id = %survey.survey_id, stations = survey.stations.len(), "Survey created");
    Ok(ApiResponse::created(survey))
}

pub async fn list_surveys(State(state): State<AppState>, Path(well_id): Path<String>) -> Result<Response, ApiError> {
    state.repo.get_well(&well_id)?;
    Ok(ApiResponse::ok(state.repo.list_surveys(&well_id)?))
}

pub async fn get_survey(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    Ok(ApiResponse::ok(state.repo.get_survey(&id)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub unit_system: Option<UnitSystem>,
    #[serde(default)]
    pub survey_name: Option<String>,
}

/// POST /api/v1/wells/:id/surveys/import - CSV body with md, inc, azi columns
pub async fn import_survey(
    State(state): State<AppState>,
    Path(well_id): Path<String>,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let well = state.repo.get_well(&well_id)?;
    let units = query.unit_system.unwrap_or(well.unit_system);

    let mut survey = interchange::import_survey_csv(body.as_ref(), &well_id, units)?;
    survey.survey_name = query.survey_name;
    survey.calculation_method = state.engine.default_method;
    state.repo.save_survey(&survey)?;
    Ok(ApiResponse::created(survey))
}

/// POST /api/v1/surveys/:id/calculate - wellpath with the survey's own settings
pub async fn calculate_survey(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let survey = state.repo.get_survey(&id)?;
    let result = state.engine.calculate_wellpath(
        &survey.stations,
        Some(survey.calculation_method),
        survey.unit_system,
        survey.reference_azimuth,
    )?;
    let elapsed = result.calculation_time;
    Ok(ApiResponse::calculated(
        result,
        format!("Survey {id} calculated"),
        elapsed,
    ))
}

/// GET /api/v1/surveys/:id/export.csv - calculated wellpath as CSV
pub async fn export_survey(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let survey = state.repo.get_survey(&id)?;
    if survey.stations.is_empty() {
        return Err(interchange::InterchangeError::NoData.into());
    }
    let result = state.engine.calculate_wellpath(
        &survey.stations,
        Some(survey.calculation_method),
        survey.unit_system,
        survey.reference_azimuth,
    )?;

    let mut buf = Vec::new();
    interchange::export_survey_csv(&result.wellpath, &mut buf)?;
    Ok(csv_attachment(format!("survey_{id}.csv"), buf))
}

fn csv_attachment(file_name: String, body: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

// ============================================================================
// BHAs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NewBha {
    pub name: String,
    #[serde(default)]
    pub unit_system: Option<UnitSystem>,
    #[serde(default)]
    pub components: Vec<BhaComponent>,
    #[serde(default)]
    pub recommended_wob: Option<f64>,
    #[serde(default)]
    pub recommended_rpm: Option<f64>,
    #[serde(default)]
    pub recommended_flow_rate: Option<f64>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

pub async fn create_bha(
    State(state): State<AppState>,
    Path(well_id): Path<String>,
    ApiJson(req): ApiJson<NewBha>,
) -> Result<Response, ApiError> {
    let well = state.repo.get_well(&well_id)?;

    let mut bha = Bha::new(&well_id, req.name, req.unit_system.unwrap_or(well.unit_system));
    bha.recommended_wob = req.recommended_wob;
    bha.recommended_rpm = req.recommended_rpm;
    bha.recommended_flow_rate = req.recommended_flow_rate;
    bha.created_by = req.created_by;
    bha.comments = req.comments;
    for component in req.components {
        bha.add_component(component);
    }

    state.repo.save_bha(&bha)?;
    info!(well_id = %well_id, bha_id = %bha.bha_id, components = bha.components.len(), "BHA created");
    Ok(ApiResponse::created(bha))
}

pub async fn list_bhas(State(state): State<AppState>, Path(well_id): Path<String>) -> Result<Response, ApiError> {
    state.repo.get_well(&well_id)?;
    Ok(ApiResponse::ok(state.repo.list_bhas(&well_id)?))
}

pub async fn get_bha(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    Ok(ApiResponse::ok(state.repo.get_bha(&id)?))
}

/// GET /api/v1/bhas/:id/export.csv
pub async fn export_bha(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let bha = state.repo.get_bha(&id)?;
    let mut buf = Vec::new();
    interchange::export_bha_csv(&bha, &mut buf)?;
    Ok(csv_attachment(format!("bha_{id}.csv"), buf))
}

// ============================================================================
// Drilling parameters
// ============================================================================

/// POST /api/v1/wells/:id/parameters - append one record
pub async fn append_parameters(
    State(state): State<AppState>,
    Path(well_id): Path<String>,
    ApiJson(params): ApiJson<DrillingParameters>,
) -> Result<Response, ApiError> {
    let log = state.repo.append_parameters(&well_id, params)?;
    Ok(ApiResponse::created(json!({
        "well_id": well_id,
        "entries": log.entries.len(),
    })))
}

/// GET /api/v1/wells/:id/parameters - the full log (empty when none recorded)
pub async fn list_parameters(State(state): State<AppState>, Path(well_id): Path<String>) -> Result<Response, ApiError> {
    let well = state.repo.get_well(&well_id)?;
    let entries = state
        .repo
        .get_drilling_log(&well_id)?
        .map(|log| log.entries)
        .unwrap_or_default();
    Ok(ApiResponse::ok(json!({
        "well_id": well_id,
        "unit_system": well.unit_system,
        "entries": entries,
    })))
}

/// GET /api/v1/wells/:id/parameters/latest
pub async fn latest_parameters(State(state): State<AppState>, Path(well_id): Path<String>) -> Result<Response, ApiError> {
    state.repo.get_well(&well_id)?;
    let log = state.repo.get_drilling_log(&well_id)?;
    match log.as_ref().and_then(|l| l.latest()) {
        Some(latest) => Ok(ApiResponse::ok(latest.clone())),
        None => Err(ApiError::NotFound(format!("No drilling parameters recorded for well {well_id}"))),
    }
}

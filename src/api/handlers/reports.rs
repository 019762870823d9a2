//! Report endpoints: survey, trajectory analysis, BHA, daily and final well

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::api::envelope::{ApiError, ApiJson, ApiResponse};
use crate::api::AppState;
use crate::reporting::{self, DailyReportInput, Report, ReportFormat};
use crate::trajectory::CalculationResult;
use crate::types::{Survey, WellpathPoint};

/// Query parameters for report endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// `json` (default) or `html`
    #[serde(default)]
    pub format: Option<String>,
    /// Survey of the same well holding the planned trajectory
    #[serde(default)]
    pub planned_survey_id: Option<String>,
}

impl ReportQuery {
    fn format(&self) -> Result<ReportFormat, ApiError> {
        self.format
            .as_deref()
            .map_or(Ok(ReportFormat::Json), str::parse)
            .map_err(ApiError::BadRequest)
    }
}

fn respond(report: Report, format: ReportFormat) -> Result<Response, ApiError> {
    tracing::debug!(kind = ?report.kind, signature = %report.signature, "Report generated");
    match format {
        ReportFormat::Json => Ok(ApiResponse::ok(report)),
        ReportFormat::Html => {
            let html = reporting::render_html(&report)
                .map_err(|e| ApiError::Internal(format!("report template failed: {e}")))?;
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                html,
            )
                .into_response())
        }
    }
}

fn calculate(state: &AppState, survey: &Survey) -> Result<CalculationResult, ApiError> {
    Ok(state.engine.calculate_wellpath(
        &survey.stations,
        Some(survey.calculation_method),
        survey.unit_system,
        survey.reference_azimuth,
    )?)
}

/// Calculated plan for `survey`, when the query names one. The plan must
/// belong to the same well and is recalculated in the actual survey's unit
/// system and reference azimuth.
fn planned_wellpath(
    state: &AppState,
    survey: &Survey,
    query: &ReportQuery,
) -> Result<Option<Vec<WellpathPoint>>, ApiError> {
    let Some(plan_id) = query.planned_survey_id.as_deref() else {
        return Ok(None);
    };
    let plan = state.repo.get_survey(plan_id)?;
    if plan.well_id != survey.well_id {
        return Err(ApiError::BadRequest(format!(
            "planned survey {plan_id} belongs to a different well"
        )));
    }
    let result = state.engine.calculate_wellpath(
        &plan.stations,
        Some(plan.calculation_method),
        survey.unit_system,
        survey.reference_azimuth,
    )?;
    Ok(Some(result.wellpath))
}

/// GET /api/v1/surveys/:id/report?format=json|html&planned_survey_id=...
pub async fn survey_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let survey = state.repo.get_survey(&id)?;
    let well = state.repo.get_well(&survey.well_id)?;
    let summary = state.engine.survey_report(&survey.stations)?;
    let deviations = match planned_wellpath(&state, &survey, &query)? {
        Some(plan) => Some(reporting::compare_to_plan(&calculate(&state, &survey)?.wellpath, &plan)),
        None => None,
    };
    respond(
        reporting::survey_report(&well, &survey, &summary, deviations.as_deref()),
        format,
    )
}

/// GET /api/v1/surveys/:id/charts?planned_survey_id=...
///
/// Plan, section, DLS and inclination/azimuth series for the survey, plus
/// drilling-parameter series from the well's log.
pub async fn trajectory_charts(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let survey = state.repo.get_survey(&id)?;
    let result = calculate(&state, &survey)?;
    let plan = planned_wellpath(&state, &survey, &query)?;
    let log = state.repo.get_drilling_log(&survey.well_id)?;
    Ok(ApiResponse::ok(reporting::trajectory_charts(
        &result.wellpath,
        survey.unit_system,
        plan.as_deref(),
        log.as_ref(),
    )))
}

/// GET /api/v1/surveys/:id/analysis?format=json|html
///
/// JSON returns the analysis figures; HTML returns the full report.
pub async fn trajectory_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let survey = state.repo.get_survey(&id)?;
    let result = calculate(&state, &survey)?;
    let threshold = state.engine.high_dls_threshold;

    match format {
        ReportFormat::Json => Ok(ApiResponse::ok(reporting::analyze_trajectory(
            &result.wellpath,
            survey.unit_system,
            threshold,
        ))),
        ReportFormat::Html => {
            let well = state.repo.get_well(&survey.well_id)?;
            let report = reporting::trajectory_analysis_report(&well, &result.wellpath, survey.unit_system, threshold);
            respond(report, format)
        }
    }
}

/// GET /api/v1/surveys/:id/wellpath-report?format=json|html
pub async fn wellpath_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let survey = state.repo.get_survey(&id)?;
    let well = state.repo.get_well(&survey.well_id)?;
    let result = calculate(&state, &survey)?;
    respond(reporting::wellpath_report(&well, &survey, &result), format)
}

/// GET /api/v1/bhas/:id/report?format=json|html
pub async fn bha_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let bha = state.repo.get_bha(&id)?;
    let well = state.repo.get_well(&bha.well_id)?;
    respond(reporting::bha_report(&well, &bha), format)
}

/// Latest survey of a well, calculated. Empty when the well has no usable
/// survey.
fn latest_wellpath(state: &AppState, well_id: &str) -> Result<Vec<WellpathPoint>, ApiError> {
    let surveys = state.repo.list_surveys(well_id)?;
    let Some(survey) = surveys.last() else {
        return Ok(Vec::new());
    };
    match calculate(state, survey) {
        Ok(result) => Ok(result.wellpath),
        Err(ApiError::BadRequest(reason)) => {
            tracing::warn!(survey_id = %survey.survey_id, %reason, "Latest survey could not be calculated");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// POST /api/v1/wells/:id/reports/daily?format=json|html
pub async fn daily_report(
    State(state): State<AppState>,
    Path(well_id): Path<String>,
    Query(query): Query<ReportQuery>,
    ApiJson(input): ApiJson<DailyReportInput>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let well = state.repo.get_well(&well_id)?;
    let log = state.repo.get_drilling_log(&well_id)?;
    let points = latest_wellpath(&state, &well_id)?;
    respond(
        reporting::daily_drilling_report(&well, &input, log.as_ref(), &points),
        format,
    )
}

/// GET /api/v1/wells/:id/reports/final?format=json|html
pub async fn final_well_report(
    State(state): State<AppState>,
    Path(well_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let well = state.repo.get_well(&well_id)?;
    let points = latest_wellpath(&state, &well_id)?;
    let bhas = state.repo.list_bhas(&well_id)?;
    respond(
        reporting::final_well_report(&well, &points, well.unit_system, bhas.last()),
        format,
    )
}

//! API route definitions
//!
//! - /healthz, /health, /, /api/info - unauthenticated service routes
//! - /api/v1/calculations/* - trajectory calculations
//! - /api/v1/projects, /wells, /surveys, /bhas - stored data and reports
//!
//! Everything under /api/v1 except `GET /calculations/methods` passes the
//! API key check.

use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, calculations, data, reports};
use super::{middleware, AppState};

fn calculation_routes() -> Router<AppState> {
    Router::new()
        .route("/calculations/wellpath", post(calculations::calculate_wellpath))
        .route("/calculations/dogleg-severity", post(calculations::calculate_dogleg_severity))
        .route("/calculations/project-wellpath", post(calculations::project_wellpath))
        .route("/calculations/validate-survey", post(calculations::validate_survey))
}

fn data_routes() -> Router<AppState> {
    Router::new()
        // Projects
        .route("/projects", post(data::create_project).get(data::list_projects))
        .route("/projects/:id", get(data::get_project).delete(data::delete_project))
        // Wells
        .route("/projects/:id/wells", post(data::create_well).get(data::list_wells))
        .route("/wells/:id", get(data::get_well).delete(data::delete_well))
        // Surveys
        .route("/wells/:id/surveys", post(data::create_survey).get(data::list_surveys))
        .route("/wells/:id/surveys/import", post(data::import_survey))
        .route("/surveys/:id", get(data::get_survey))
        .route("/surveys/:id/calculate", post(data::calculate_survey))
        .route("/surveys/:id/export.csv", get(data::export_survey))
        // BHAs
        .route("/wells/:id/bhas", post(data::create_bha).get(data::list_bhas))
        .route("/bhas/:id", get(data::get_bha))
        .route("/bhas/:id/export.csv", get(data::export_bha))
        // Drilling parameters
        .route("/wells/:id/parameters", post(data::append_parameters).get(data::list_parameters))
        .route("/wells/:id/parameters/latest", get(data::latest_parameters))
        // Reports
        .route("/surveys/:id/report", get(reports::survey_report))
        .route("/surveys/:id/analysis", get(reports::trajectory_analysis))
        .route("/surveys/:id/wellpath-report", get(reports::wellpath_report))
        .route("/surveys/:id/charts", get(reports::trajectory_charts))
        .route("/bhas/:id/report", get(reports::bha_report))
        .route("/wells/:id/reports/daily", post(reports::daily_report))
        .route("/wells/:id/reports/final", get(reports::final_well_report))
}

/// Create all `/api/v1` routes
pub fn api_routes(state: AppState) -> Router {
    let protected = Router::new()
        .merge(calculation_routes())
        .merge(data_routes())
        .route_layer(axum_mw::from_fn_with_state(state.clone(), middleware::require_api_key));

    Router::new()
        .route("/calculations/methods", get(calculations::get_methods))
        .merge(protected)
        .with_state(state)
}

/// Liveness, health and service information
pub fn info_routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/health", get(handlers::health))
        .route("/", get(handlers::root))
        .route("/api/info", get(handlers::api_info))
        .with_state(state)
}

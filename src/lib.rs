//! WormDriller: Directional Drilling Trajectory Engine
//!
//! Survey-to-wellpath calculations, project data storage, reporting and an
//! HTTP API for directional drilling work.
//!
//! ## Architecture
//!
//! - **Trajectory Engine**: minimum curvature, tangential, balanced tangential
//!   and radius of curvature, plus dogleg severity, closure, vertical section
//!   and build/turn projections
//! - **Storage**: projects, wells, surveys, BHAs and drilling logs in sled
//!   (or memory), with zip backup/restore
//! - **Reporting**: signed survey, BHA, wellpath, analysis, daily and final
//!   well reports as JSON or HTML
//! - **API**: axum service under `/api/v1` with optional API key auth
//! - **Client**: reqwest client for the calculation endpoints

pub mod api;
pub mod client;
pub mod config;
pub mod interchange;
pub mod reporting;
pub mod storage;
pub mod trajectory;
pub mod types;

// Re-export service configuration
pub use config::ServiceConfig;

// Re-export the engine
pub use trajectory::{CalculationError, CalculationResult, SurveyReport, TrajectoryEngine};

// Re-export commonly used types
pub use types::{
    Bha, BhaComponent, CalculationMethod, DrillingParameters, Project, Survey, SurveyStation,
    UnitSystem, Well, WellpathPoint,
};

// Re-export storage
pub use storage::{ProjectRepository, StorageError};

// Re-export API and client entry points
pub use api::{create_app, AppState};
pub use client::{ApiClient, ClientError};

//! Trajectory Engine
//!
//! Deterministic wellbore position calculations from directional surveys.
//!
//! ## Methods
//! - Minimum curvature (default): circular arc per course with ratio factor
//! - Radius of curvature: independent constant build and turn arcs
//! - Tangential: straight line along the upper station
//! - Balanced tangential: straight line along the averaged attitude
//!
//! ## Derived quantities
//! Dogleg and dogleg severity, build and turn rates, closure, vertical
//! section and toolface, plus per-wellpath quality metrics.

pub mod geometry;
pub mod methods;
pub mod projection;
pub mod quality;
pub mod validation;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use geometry::{
    closure, closure_azimuth, dogleg_angle, dogleg_severity, toolface, vertical_section,
    wrap_azimuth_delta, Toolface,
};
pub use projection::ProjectionInput;
pub use quality::QualityMetrics;
pub use validation::{azimuth_range, validate_stations, SurveyReport, SurveyStatistics};

use crate::config::{defaults, EngineConfig};
use crate::types::{CalculationMethod, SurveyStation, UnitSystem, WellpathPoint};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalculationError {
    #[error("Survey data cannot be empty")]
    EmptySurvey,

    #[error("At least two survey points are required")]
    TooFewStations,

    #[error("Invalid measured depth at point {index}: {value}")]
    InvalidDepth { index: usize, value: f64 },

    #[error("Invalid inclination at point {index}: {value}")]
    InvalidInclination { index: usize, value: f64 },

    #[error("Invalid azimuth at point {index}: {value}")]
    InvalidAzimuth { index: usize, value: f64 },

    #[error("Measured depth must be monotonically increasing at point {index}")]
    NonMonotonicDepth { index: usize },

    #[error("{0}")]
    InvalidInput(String),
}

/// A calculated wellpath with summary figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    pub wellpath: Vec<WellpathPoint>,
    pub method: CalculationMethod,
    pub unit_system: UnitSystem,
    pub total_md: f64,
    pub total_tvd: f64,
    pub max_inc: f64,
    pub max_dls: f64,
    /// Seconds spent calculating
    pub calculation_time: f64,
    pub quality_metrics: QualityMetrics,
}

/// Stateless calculator configured with thresholds and defaults.
#[derive(Debug, Clone)]
pub struct TrajectoryEngine {
    pub default_method: CalculationMethod,
    pub default_unit_system: UnitSystem,
    pub tolerance: f64,
    pub high_dls_threshold: f64,
    pub close_station_warning: f64,
    pub large_inc_range_warning: f64,
    pub max_projection_steps: usize,
}

impl Default for TrajectoryEngine {
    fn default() -> Self {
        Self {
            default_method: CalculationMethod::default(),
            default_unit_system: UnitSystem::default(),
            tolerance: defaults::TOLERANCE,
            high_dls_threshold: defaults::HIGH_DLS_THRESHOLD,
            close_station_warning: defaults::CLOSE_STATION_WARNING,
            large_inc_range_warning: defaults::LARGE_INC_RANGE_WARNING,
            max_projection_steps: defaults::MAX_PROJECTION_STEPS,
        }
    }
}

impl TrajectoryEngine {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            default_method: cfg.default_method,
            default_unit_system: cfg.default_unit_system,
            tolerance: cfg.tolerance,
            high_dls_threshold: cfg.high_dls_threshold,
            close_station_warning: cfg.close_station_warning,
            large_inc_range_warning: cfg.large_inc_range_warning,
            max_projection_steps: cfg.max_projection_steps,
        }
    }

    /// Validate stations and compute the full wellpath.
    pub fn calculate_wellpath(
        &self,
        stations: &[SurveyStation],
        method: Option<CalculationMethod>,
        unit_system: UnitSystem,
        reference_azimuth: f64,
    ) -> Result<CalculationResult, CalculationError> {
        let started = Instant::now();
        let method = method.unwrap_or(self.default_method);

        validate_stations(stations)?;
        if !reference_azimuth.is_finite() || !(0.0..360.0).contains(&reference_azimuth) {
            return Err(CalculationError::InvalidInput(format!(
                "Reference azimuth must be in [0, 360): {reference_azimuth}"
            )));
        }

        let mut wellpath = methods::calculate(method, stations, unit_system, self.tolerance);
        geometry::apply_build_turn_rates(&mut wellpath, unit_system);
        geometry::apply_closure(&mut wellpath);
        geometry::apply_vertical_section(&mut wellpath, reference_azimuth);

        let quality_metrics = QualityMetrics::from_points(&wellpath, self.high_dls_threshold);
        let last = wellpath.last().copied().unwrap_or_default();
        let max_inc = wellpath.iter().map(|p| p.inc).fold(0.0, f64::max);
        let max_dls = wellpath.iter().map(|p| p.dls).fold(0.0, f64::max);
        let calculation_time = started.elapsed().as_secs_f64();

        debug!(
            method = %method,
            stations = stations.len(),
            total_md = last.md,
            max_dls,
            "Wellpath calculated"
        );

        Ok(CalculationResult {
            wellpath,
            method,
            unit_system,
            total_md: last.md,
            total_tvd: last.tvd,
            max_inc,
            max_dls,
            calculation_time,
            quality_metrics,
        })
    }

    /// Dogleg severity between two attitudes separated by `md_diff`.
    pub fn calculate_dogleg_severity(
        &self,
        from: (f64, f64),
        to: (f64, f64),
        md_diff: f64,
        unit_system: UnitSystem,
    ) -> f64 {
        dogleg_severity(from.0, from.1, to.0, to.1, md_diff, unit_system)
    }

    pub fn project_wellpath(
        &self,
        input: &ProjectionInput,
    ) -> Result<Vec<WellpathPoint>, CalculationError> {
        projection::project(input, self.max_projection_steps, self.tolerance)
    }

    pub fn validate_survey(&self, stations: &[SurveyStation]) -> Result<(), CalculationError> {
        validate_stations(stations)
    }

    /// Validate and summarise a survey without calculating positions.
    pub fn survey_report(&self, stations: &[SurveyStation]) -> Result<SurveyReport, CalculationError> {
        validation::build_report(stations, self.close_station_warning, self.large_inc_range_warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stations() -> Vec<SurveyStation> {
        vec![
            SurveyStation::new(0.0, 0.0, 0.0),
            SurveyStation::new(1000.0, 2.0, 45.0),
            SurveyStation::new(2000.0, 8.0, 47.0),
            SurveyStation::new(3000.0, 15.0, 50.0),
        ]
    }

    #[test]
    fn test_calculate_wellpath_defaults_to_minimum_curvature() {
        let engine = TrajectoryEngine::default();
        let result = engine
            .calculate_wellpath(&stations(), None, UnitSystem::Imperial, 0.0)
            .unwrap();

        assert_eq!(result.method, CalculationMethod::MinimumCurvature);
        assert_eq!(result.wellpath.len(), 4);
        assert_eq!(result.total_md, 3000.0);
        assert!(result.total_tvd < 3000.0 && result.total_tvd > 2900.0);
        assert_eq!(result.max_inc, 15.0);
        assert!((result.wellpath[1].dls - 0.2).abs() < 1e-9);
        assert!((result.wellpath[1].build_rate - 0.2).abs() < 1e-9);
        assert_eq!(result.quality_metrics.calculation_points, 4);
        assert_eq!(result.quality_metrics.total_closure, result.wellpath[3].closure);
    }

    #[test]
    fn test_vertical_section_uses_reference_azimuth() {
        let engine = TrajectoryEngine::default();
        let result = engine
            .calculate_wellpath(&stations(), None, UnitSystem::Imperial, 45.0)
            .unwrap();
        let end = result.wellpath[3];
        // Hole heads roughly NE so VS is close to closure
        assert!(end.vertical_section > 0.99 * end.closure);
    }

    #[test]
    fn test_all_methods_close_on_gentle_curve() {
        let engine = TrajectoryEngine::default();
        let mc = engine
            .calculate_wellpath(&stations(), Some(CalculationMethod::MinimumCurvature), UnitSystem::Imperial, 0.0)
            .unwrap();
        for method in [CalculationMethod::RadiusOfCurvature, CalculationMethod::BalancedTangential] {
            let r = engine
                .calculate_wellpath(&stations(), Some(method), UnitSystem::Imperial, 0.0)
                .unwrap();
            assert!((r.total_tvd - mc.total_tvd).abs() < 5.0, "{method}");
        }
    }

    #[test]
    fn test_invalid_reference_azimuth() {
        let engine = TrajectoryEngine::default();
        let err = engine
            .calculate_wellpath(&stations(), None, UnitSystem::Imperial, 360.0)
            .unwrap_err();
        assert!(matches!(err, CalculationError::InvalidInput(_)));
    }

    #[test]
    fn test_validation_runs_first() {
        let engine = TrajectoryEngine::default();
        let err = engine
            .calculate_wellpath(&stations()[..1], None, UnitSystem::Metric, 0.0)
            .unwrap_err();
        assert_eq!(err, CalculationError::TooFewStations);
    }

    #[test]
    fn test_dogleg_severity_helper() {
        let engine = TrajectoryEngine::default();
        let dls = engine.calculate_dogleg_severity((10.0, 45.0), (12.0, 50.0), 100.0, UnitSystem::Imperial);
        assert!(dls > 2.0 && dls < 2.5);
    }
}

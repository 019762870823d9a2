//! Wellpath quality metrics

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::types::WellpathPoint;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub max_dls: f64,
    pub avg_dls: f64,
    /// Sample standard deviation of the non-zero DLS values
    pub dls_std_dev: f64,
    pub num_high_dls: usize,
    pub total_dogleg: f64,
    pub max_inclination: f64,
    pub total_closure: f64,
    pub calculation_points: usize,
}

impl QualityMetrics {
    /// Summarise a calculated wellpath. DLS statistics only consider
    /// courses that actually bend.
    pub fn from_points(points: &[WellpathPoint], high_dls_threshold: f64) -> Self {
        let Some(last) = points.last() else {
            return Self::default();
        };

        let dls: Vec<f64> = points.iter().map(|p| p.dls).filter(|d| *d > 0.0).collect();

        let (max_dls, avg_dls) = if dls.is_empty() {
            (0.0, 0.0)
        } else {
            (Statistics::max(&dls), dls.iter().mean())
        };
        // statrs yields NaN below two samples
        let dls_std_dev = if dls.len() >= 2 { dls.iter().std_dev() } else { 0.0 };

        Self {
            max_dls,
            avg_dls,
            dls_std_dev,
            num_high_dls: dls.iter().filter(|d| **d > high_dls_threshold).count(),
            total_dogleg: points.iter().map(|p| p.dogleg).sum(),
            max_inclination: points.iter().map(|p| p.inc).fold(f64::NEG_INFINITY, f64::max),
            total_closure: last.closure,
            calculation_points: points.len(),
        }
    }
}

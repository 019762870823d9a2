//! Survey validation and the pre-calculation survey report

use serde::{Deserialize, Serialize};

use crate::types::{normalize_azimuth, SurveyStation};

use super::CalculationError;

/// Check a station list for completeness, bounds and depth ordering.
///
/// Stops at the first problem found.
pub fn validate_stations(stations: &[SurveyStation]) -> Result<(), CalculationError> {
    if stations.is_empty() {
        return Err(CalculationError::EmptySurvey);
    }
    if stations.len() < 2 {
        return Err(CalculationError::TooFewStations);
    }

    for (index, s) in stations.iter().enumerate() {
        if !s.md.is_finite() || s.md < 0.0 {
            return Err(CalculationError::InvalidDepth { index, value: s.md });
        }
        if !s.inc.is_finite() || !(0.0..=180.0).contains(&s.inc) {
            return Err(CalculationError::InvalidInclination { index, value: s.inc });
        }
        if !s.azi.is_finite() || !(0.0..360.0).contains(&s.azi) {
            return Err(CalculationError::InvalidAzimuth { index, value: s.azi });
        }
        if index > 0 && s.md <= stations[index - 1].md {
            return Err(CalculationError::NonMonotonicDepth { index });
        }
    }

    Ok(())
}

/// Smallest azimuth spread, accounting for wrap-around at north.
///
/// Rotates the azimuths through 0, 30, …, 330 degrees and keeps the
/// narrowest max − min.
pub fn azimuth_range(stations: &[SurveyStation]) -> f64 {
    if stations.len() < 2 {
        return 0.0;
    }
    (0..360)
        .step_by(30)
        .map(|offset| {
            let (lo, hi) = stations
                .iter()
                .map(|s| normalize_azimuth(s.azi + offset as f64))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), a| (lo.min(a), hi.max(a)));
            hi - lo
        })
        .fold(f64::INFINITY, f64::min)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyStatistics {
    pub start_md: f64,
    pub end_md: f64,
    pub min_inc: f64,
    pub max_inc: f64,
    pub min_azi: f64,
    pub max_azi: f64,
}

/// Summary of a validated survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyReport {
    pub valid: bool,
    pub num_points: usize,
    pub md_range: f64,
    pub inc_range: f64,
    pub azi_range: f64,
    pub warnings: Vec<String>,
    pub statistics: SurveyStatistics,
}

pub const WARN_CLOSE_STATIONS: &str = "Some survey points are very close together (< 1 unit)";
pub const WARN_LARGE_INC_RANGE: &str = "Large inclination changes detected";

/// Validate then summarise a survey.
pub(crate) fn build_report(
    stations: &[SurveyStation],
    close_station_warning: f64,
    large_inc_range_warning: f64,
) -> Result<SurveyReport, CalculationError> {
    validate_stations(stations)?;

    let first = stations[0];
    let last = stations[stations.len() - 1];
    let min_of = |f: fn(&SurveyStation) -> f64| stations.iter().map(f).fold(f64::INFINITY, f64::min);
    let max_of = |f: fn(&SurveyStation) -> f64| stations.iter().map(f).fold(f64::NEG_INFINITY, f64::max);

    let statistics = SurveyStatistics {
        start_md: first.md,
        end_md: last.md,
        min_inc: min_of(|s| s.inc),
        max_inc: max_of(|s| s.inc),
        min_azi: min_of(|s| s.azi),
        max_azi: max_of(|s| s.azi),
    };
    let inc_range = statistics.max_inc - statistics.min_inc;

    let mut warnings = Vec::new();
    if stations
        .windows(2)
        .any(|w| (w[1].md - w[0].md).abs() < close_station_warning)
    {
        warnings.push(WARN_CLOSE_STATIONS.to_string());
    }
    if inc_range > large_inc_range_warning {
        warnings.push(WARN_LARGE_INC_RANGE.to_string());
    }

    Ok(SurveyReport {
        valid: true,
        num_points: stations.len(),
        md_range: last.md - first.md,
        inc_range,
        azi_range: azimuth_range(stations),
        warnings,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(md: f64, inc: f64, azi: f64) -> SurveyStation {
        SurveyStation::new(md, inc, azi)
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(
            validate_stations(&[]).unwrap_err().to_string(),
            "Survey data cannot be empty"
        );
        assert_eq!(
            validate_stations(&[st(0.0, 0.0, 0.0)]).unwrap_err().to_string(),
            "At least two survey points are required"
        );
    }

    #[test]
    fn test_bounds_messages() {
        let err = validate_stations(&[st(0.0, 0.0, 0.0), st(100.0, 181.0, 0.0)]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid inclination at point 1: 181");

        let err = validate_stations(&[st(-5.0, 0.0, 0.0), st(100.0, 1.0, 0.0)]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid measured depth at point 0: -5");

        let err = validate_stations(&[st(0.0, 0.0, 0.0), st(100.0, 1.0, 360.0)]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid azimuth at point 1: 360");
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = validate_stations(&[st(0.0, 0.0, 0.0), st(100.0, f64::NAN, 0.0)]).unwrap_err();
        assert!(matches!(err, CalculationError::InvalidInclination { index: 1, .. }));
    }

    #[test]
    fn test_depth_must_increase() {
        let err = validate_stations(&[st(0.0, 0.0, 0.0), st(100.0, 1.0, 0.0), st(100.0, 2.0, 0.0)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Measured depth must be monotonically increasing at point 2"
        );
    }

    #[test]
    fn test_azimuth_range_wraps_north() {
        let stations = [st(0.0, 10.0, 350.0), st(100.0, 10.0, 10.0)];
        assert!((azimuth_range(&stations) - 20.0).abs() < 1e-9);

        let stations = [st(0.0, 10.0, 40.0), st(100.0, 10.0, 100.0)];
        assert!((azimuth_range(&stations) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_warnings() {
        let stations = [st(0.0, 0.0, 0.0), st(0.5, 0.0, 0.0), st(1000.0, 95.0, 90.0)];
        let report = build_report(&stations, 1.0, 90.0).unwrap();
        assert!(report.valid);
        assert_eq!(report.num_points, 3);
        assert_eq!(report.md_range, 1000.0);
        assert_eq!(report.warnings, vec![WARN_CLOSE_STATIONS, WARN_LARGE_INC_RANGE]);
        assert_eq!(report.statistics.max_azi, 90.0);
    }

    #[test]
    fn test_clean_report_has_no_warnings() {
        let stations = [st(0.0, 0.0, 0.0), st(1000.0, 2.0, 45.0), st(2000.0, 8.0, 47.0)];
        let report = build_report(&stations, 1.0, 90.0).unwrap();
        assert!(report.warnings.is_empty());
        assert!((report.inc_range - 8.0).abs() < 1e-12);
    }
}

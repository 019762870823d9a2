//! Look-ahead projection at constant build and turn rates

use crate::types::{normalize_azimuth, CalculationMethod, SurveyStation, UnitSystem, WellpathPoint};

use super::{methods, CalculationError};

/// Projection request parameters. Rates are in degrees per course length.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionInput {
    pub start: SurveyStation,
    pub build_rate: f64,
    pub turn_rate: f64,
    pub step_size: f64,
    pub num_steps: usize,
    pub unit_system: UnitSystem,
}

/// Generate the stations of a projection, start station included.
pub fn project_stations(input: &ProjectionInput) -> Vec<SurveyStation> {
    let factor = input.step_size / input.unit_system.course_length();
    let mut stations = Vec::with_capacity(input.num_steps + 1);
    stations.push(input.start);

    let mut current = input.start;
    for _ in 0..input.num_steps {
        current = SurveyStation {
            md: current.md + input.step_size,
            inc: (current.inc + input.build_rate * factor).clamp(0.0, 180.0),
            azi: normalize_azimuth(current.azi + input.turn_rate * factor),
        };
        stations.push(current);
    }
    stations
}

/// Check inputs, generate stations, and position them with minimum curvature.
pub(crate) fn project(
    input: &ProjectionInput,
    max_steps: usize,
    tolerance: f64,
) -> Result<Vec<WellpathPoint>, CalculationError> {
    let start = input.start;
    if !start.md.is_finite() || start.md < 0.0 {
        return Err(CalculationError::InvalidDepth { index: 0, value: start.md });
    }
    if !start.inc.is_finite() || !(0.0..=180.0).contains(&start.inc) {
        return Err(CalculationError::InvalidInclination { index: 0, value: start.inc });
    }
    if !start.azi.is_finite() || !(0.0..360.0).contains(&start.azi) {
        return Err(CalculationError::InvalidAzimuth { index: 0, value: start.azi });
    }
    if !input.step_size.is_finite() || input.step_size <= 0.0 {
        return Err(CalculationError::InvalidInput(format!(
            "Step size must be positive: {}",
            input.step_size
        )));
    }
    if input.num_steps == 0 || input.num_steps > max_steps {
        return Err(CalculationError::InvalidInput(format!(
            "Number of steps must be between 1 and {max_steps}"
        )));
    }
    if !input.build_rate.is_finite() || !input.turn_rate.is_finite() {
        return Err(CalculationError::InvalidInput(
            "Build and turn rates must be finite".to_string(),
        ));
    }

    let stations = project_stations(input);
    Ok(methods::calculate(
        CalculationMethod::MinimumCurvature,
        &stations,
        input.unit_system,
        tolerance,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(build: f64, turn: f64, steps: usize) -> ProjectionInput {
        ProjectionInput {
            start: SurveyStation::new(5_000.0, 10.0, 350.0),
            build_rate: build,
            turn_rate: turn,
            step_size: 100.0,
            num_steps: steps,
            unit_system: UnitSystem::Imperial,
        }
    }

    #[test]
    fn test_projection_stations() {
        let stations = project_stations(&input(2.0, 5.0, 3));
        assert_eq!(stations.len(), 4);
        assert_eq!(stations[3].md, 5_300.0);
        assert!((stations[3].inc - 16.0).abs() < 1e-9);
        // 350 + 15 wraps past north
        assert!((stations[3].azi - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_left_turn_from_north_stays_in_range() {
        let mut from_north = input(0.0, -1e-20, 1);
        from_north.start.azi = 0.0;
        let stations = project_stations(&from_north);
        assert_eq!(stations[1].azi, 0.0);
    }

    #[test]
    fn test_inclination_clamped() {
        let stations = project_stations(&input(-20.0, 0.0, 2));
        assert_eq!(stations[1].inc, 0.0);
        assert_eq!(stations[2].inc, 0.0);
    }

    #[test]
    fn test_project_positions_with_minimum_curvature() {
        let pts = project(&input(3.0, 0.0, 10), 1_000, 1e-10).unwrap();
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[0].tvd, 0.0);
        assert!(pts[10].tvd > 0.0 && pts[10].tvd < 1_000.0);
        assert!((pts[10].dls - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_limits() {
        assert!(matches!(
            project(&input(1.0, 0.0, 0), 1_000, 1e-10),
            Err(CalculationError::InvalidInput(_))
        ));
        assert!(project(&input(1.0, 0.0, 1_001), 1_000, 1e-10).is_err());
        let mut bad = input(1.0, 0.0, 5);
        bad.step_size = 0.0;
        assert!(project(&bad, 1_000, 1e-10).is_err());
    }
}

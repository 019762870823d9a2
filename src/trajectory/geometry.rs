//! Wellbore geometry primitives: dogleg, rates, closure, vertical section
//! and toolface.
//!
//! All angles are taken and returned in degrees unless the name says
//! otherwise.

use crate::types::{normalize_azimuth, UnitSystem, WellpathPoint};

/// Dogleg angle between two stations (degrees).
///
/// `cos β = cos i1·cos i2 + sin i1·sin i2·cos(a2 − a1)`
pub fn dogleg_angle(inc1: f64, azi1: f64, inc2: f64, azi2: f64) -> f64 {
    dogleg_angle_rad(inc1.to_radians(), azi1.to_radians(), inc2.to_radians(), azi2.to_radians())
        .to_degrees()
}

/// Dogleg angle in radians from angles in radians.
pub(crate) fn dogleg_angle_rad(i1: f64, a1: f64, i2: f64, a2: f64) -> f64 {
    let cos_dogleg = i1.cos() * i2.cos() + i1.sin() * i2.sin() * (a2 - a1).cos();
    // Rounding can push the cosine just outside [-1, 1]
    cos_dogleg.clamp(-1.0, 1.0).acos()
}

/// Dogleg severity in degrees per course length (100 ft or 30 m).
///
/// Returns 0 when `md_diff` is not positive.
pub fn dogleg_severity(
    inc1: f64,
    azi1: f64,
    inc2: f64,
    azi2: f64,
    md_diff: f64,
    units: UnitSystem,
) -> f64 {
    severity(dogleg_angle(inc1, azi1, inc2, azi2), md_diff, units)
}

/// Normalise an angle change (degrees) per course length.
pub(crate) fn severity(angle_deg: f64, md_diff: f64, units: UnitSystem) -> f64 {
    if md_diff > 0.0 {
        angle_deg * units.course_length() / md_diff
    } else {
        0.0
    }
}

/// Wrap an azimuth difference into `(-180, 180]`.
pub fn wrap_azimuth_delta(delta: f64) -> f64 {
    let d = delta.rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Minimum curvature ratio factor `2/β · tan(β/2)`; 1 for a straight course.
pub(crate) fn ratio_factor(dogleg_rad: f64, tolerance: f64) -> f64 {
    if dogleg_rad < tolerance {
        1.0
    } else {
        2.0 * (dogleg_rad / 2.0).tan() / dogleg_rad
    }
}

/// Fill build and turn rates in place. The first point keeps zero rates.
pub fn apply_build_turn_rates(points: &mut [WellpathPoint], units: UnitSystem) {
    for i in 1..points.len() {
        let (prev_inc, prev_azi, prev_md) = (points[i - 1].inc, points[i - 1].azi, points[i - 1].md);
        let curr = &mut points[i];
        let md_diff = curr.md - prev_md;
        curr.build_rate = severity(curr.inc - prev_inc, md_diff, units);
        curr.turn_rate = severity(wrap_azimuth_delta(curr.azi - prev_azi), md_diff, units);
    }
}

/// Horizontal distance from the wellhead.
pub fn closure(northing: f64, easting: f64) -> f64 {
    northing.hypot(easting)
}

/// Direction of the closure line from north, in `[0, 360)`.
pub fn closure_azimuth(northing: f64, easting: f64) -> f64 {
    if northing == 0.0 && easting == 0.0 {
        return 0.0;
    }
    normalize_azimuth(easting.atan2(northing).to_degrees())
}

/// Projection of the horizontal displacement onto the reference azimuth.
pub fn vertical_section(northing: f64, easting: f64, reference_azimuth: f64) -> f64 {
    let r = reference_azimuth.to_radians();
    northing * r.cos() + easting * r.sin()
}

pub fn apply_closure(points: &mut [WellpathPoint]) {
    for p in points.iter_mut() {
        p.closure = closure(p.northing, p.easting);
    }
}

pub fn apply_vertical_section(points: &mut [WellpathPoint], reference_azimuth: f64) {
    for p in points.iter_mut() {
        p.vertical_section = vertical_section(p.northing, p.easting, reference_azimuth);
    }
}

/// Below this inclination (degrees) gravity toolface is undefined.
pub const GRAVITY_TOOLFACE_MIN_INC: f64 = 3.0;

/// Gravity and magnetic toolface angles (degrees).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Toolface {
    pub gravity: f64,
    pub magnetic: f64,
}

/// Resolve toolface readings for the current hole attitude.
///
/// Near vertical the gravity toolface is reported as 0; the magnetic
/// toolface is referenced to north by adding the hole azimuth.
pub fn toolface(inc: f64, azi: f64, gravity_reading: f64, magnetic_reading: f64) -> Toolface {
    let gravity = if inc < GRAVITY_TOOLFACE_MIN_INC {
        0.0
    } else {
        gravity_reading
    };
    Toolface {
        gravity,
        magnetic: normalize_azimuth(magnetic_reading + azi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dogleg_vertical_to_horizontal() {
        assert!((dogleg_angle(0.0, 0.0, 90.0, 123.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_dogleg_pure_inclination_change() {
        assert!((dogleg_angle(10.0, 45.0, 12.0, 45.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_dogleg_identical_stations_is_zero() {
        // cos rounds slightly above 1.0 here without the clamp
        let d = dogleg_angle(33.3, 271.7, 33.3, 271.7);
        assert!(d.is_finite());
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_dogleg_severity_units() {
        let imperial = dogleg_severity(0.0, 0.0, 3.0, 0.0, 100.0, UnitSystem::Imperial);
        assert!((imperial - 3.0).abs() < 1e-9);
        let metric = dogleg_severity(0.0, 0.0, 3.0, 0.0, 30.0, UnitSystem::Metric);
        assert!((metric - 3.0).abs() < 1e-9);
        assert_eq!(dogleg_severity(0.0, 0.0, 3.0, 0.0, 0.0, UnitSystem::Metric), 0.0);
    }

    #[test]
    fn test_wrap_azimuth_delta() {
        assert!((wrap_azimuth_delta(350.0) - -10.0).abs() < 1e-9);
        assert!((wrap_azimuth_delta(-350.0) - 10.0).abs() < 1e-9);
        assert!((wrap_azimuth_delta(45.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_turn_rate_across_north() {
        let mut pts = vec![
            WellpathPoint { md: 1000.0, inc: 30.0, azi: 355.0, ..Default::default() },
            WellpathPoint { md: 1100.0, inc: 32.0, azi: 5.0, ..Default::default() },
        ];
        apply_build_turn_rates(&mut pts, UnitSystem::Imperial);
        assert_eq!(pts[0].build_rate, 0.0);
        assert!((pts[1].build_rate - 2.0).abs() < 1e-9);
        assert!((pts[1].turn_rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_closure_and_vertical_section() {
        assert!((closure(3.0, 4.0) - 5.0).abs() < 1e-12);
        assert!((closure_azimuth(0.0, 10.0) - 90.0).abs() < 1e-9);
        assert!((closure_azimuth(-10.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((vertical_section(100.0, 50.0, 0.0) - 100.0).abs() < 1e-9);
        assert!((vertical_section(100.0, 50.0, 90.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_toolface() {
        let near_vertical = toolface(2.0, 90.0, 45.0, 300.0);
        assert_eq!(near_vertical.gravity, 0.0);
        assert!((near_vertical.magnetic - 30.0).abs() < 1e-9);

        let inclined = toolface(15.0, 90.0, 45.0, 10.0);
        assert_eq!(inclined.gravity, 45.0);
        assert!((inclined.magnetic - 100.0).abs() < 1e-9);
    }
}

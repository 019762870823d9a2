//! Course-by-course position methods
//!
//! Each method turns a pair of stations into a (ΔTVD, ΔN, ΔE) step; the
//! shared accumulator sums the steps and records dogleg / DLS per course.

use crate::types::{normalize_azimuth, CalculationMethod, SurveyStation, UnitSystem, WellpathPoint};

use super::geometry::{dogleg_angle_rad, ratio_factor, severity, wrap_azimuth_delta};

/// Angle changes (radians) below this are treated as a straight or
/// constant-azimuth course by radius of curvature.
const ROC_EPSILON: f64 = 1e-7;

/// Position change over one course.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseDelta {
    pub tvd: f64,
    pub northing: f64,
    pub easting: f64,
}

/// Calculate positions along the stations using `method`.
///
/// The first station sits at the origin with zero dogleg. Stations are
/// assumed validated.
pub fn calculate(
    method: CalculationMethod,
    stations: &[SurveyStation],
    units: UnitSystem,
    tolerance: f64,
) -> Vec<WellpathPoint> {
    let Some(first) = stations.first() else {
        return Vec::new();
    };

    let mut points = Vec::with_capacity(stations.len());
    points.push(WellpathPoint::from(*first));

    for pair in stations.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let delta = course_delta(method, prev, curr, tolerance);
        let dogleg_deg = dogleg_angle_rad(
            prev.inc.to_radians(),
            prev.azi.to_radians(),
            curr.inc.to_radians(),
            curr.azi.to_radians(),
        )
        .to_degrees();

        let last = points[points.len() - 1];
        points.push(WellpathPoint {
            tvd: last.tvd + delta.tvd,
            northing: last.northing + delta.northing,
            easting: last.easting + delta.easting,
            dogleg: dogleg_deg,
            dls: severity(dogleg_deg, curr.md - prev.md, units),
            ..WellpathPoint::from(*curr)
        });
    }

    points
}

/// Position change between two stations for the given method.
pub fn course_delta(
    method: CalculationMethod,
    prev: &SurveyStation,
    curr: &SurveyStation,
    tolerance: f64,
) -> CourseDelta {
    match method {
        CalculationMethod::MinimumCurvature => minimum_curvature(prev, curr, tolerance),
        CalculationMethod::RadiusOfCurvature => radius_of_curvature(prev, curr),
        CalculationMethod::Tangential => tangential(prev, curr),
        CalculationMethod::BalancedTangential => balanced_tangential(prev, curr),
    }
}

fn minimum_curvature(prev: &SurveyStation, curr: &SurveyStation, tolerance: f64) -> CourseDelta {
    let (i1, a1) = (prev.inc.to_radians(), prev.azi.to_radians());
    let (i2, a2) = (curr.inc.to_radians(), curr.azi.to_radians());
    let half_md = (curr.md - prev.md) / 2.0;
    let rf = ratio_factor(dogleg_angle_rad(i1, a1, i2, a2), tolerance);

    CourseDelta {
        tvd: half_md * (i1.cos() + i2.cos()) * rf,
        northing: half_md * (i1.sin() * a1.cos() + i2.sin() * a2.cos()) * rf,
        easting: half_md * (i1.sin() * a1.sin() + i2.sin() * a2.sin()) * rf,
    }
}

/// Straight segment along a single attitude.
fn straight(md: f64, inc_rad: f64, azi_rad: f64) -> CourseDelta {
    CourseDelta {
        tvd: md * inc_rad.cos(),
        northing: md * inc_rad.sin() * azi_rad.cos(),
        easting: md * inc_rad.sin() * azi_rad.sin(),
    }
}

fn tangential(prev: &SurveyStation, curr: &SurveyStation) -> CourseDelta {
    straight(curr.md - prev.md, prev.inc.to_radians(), prev.azi.to_radians())
}

fn balanced_tangential(prev: &SurveyStation, curr: &SurveyStation) -> CourseDelta {
    let avg_inc = (prev.inc + curr.inc) / 2.0;
    // Average along the short arc so 350° and 10° average to 0°, not 180°
    let avg_azi = normalize_azimuth(prev.azi + wrap_azimuth_delta(curr.azi - prev.azi) / 2.0);
    straight(curr.md - prev.md, avg_inc.to_radians(), avg_azi.to_radians())
}

fn radius_of_curvature(prev: &SurveyStation, curr: &SurveyStation) -> CourseDelta {
    let md = curr.md - prev.md;
    let (i1, i2) = (prev.inc.to_radians(), curr.inc.to_radians());
    let a1 = prev.azi.to_radians();
    let d_inc = i2 - i1;
    let d_azi = wrap_azimuth_delta(curr.azi - prev.azi).to_radians();
    let a2 = a1 + d_azi;

    let (tvd, horizontal) = if d_inc.abs() < ROC_EPSILON {
        (md * i1.cos(), md * i1.sin())
    } else {
        (
            md * (i2.sin() - i1.sin()) / d_inc,
            md * (i1.cos() - i2.cos()) / d_inc,
        )
    };

    let (northing, easting) = if d_azi.abs() < ROC_EPSILON {
        (horizontal * a1.cos(), horizontal * a1.sin())
    } else {
        (
            horizontal * (a2.sin() - a1.sin()) / d_azi,
            horizontal * (a1.cos() - a2.cos()) / d_azi,
        )
    };

    CourseDelta { tvd, northing, easting }
}

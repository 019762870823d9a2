//! Planned versus actual trajectory comparison

use serde::Serialize;

use crate::types::{normalize_azimuth, WellpathPoint};

/// Offset of one actual station from the plan at the same measured depth.
/// Deltas are actual minus planned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDeviation {
    pub md: f64,
    pub tvd_delta: f64,
    pub north_delta: f64,
    pub east_delta: f64,
    /// Distance in the horizontal plane
    pub horizontal_offset: f64,
    /// 3-D distance between actual and planned positions
    pub total_offset: f64,
    pub inc_delta: f64,
    /// Signed, in [-180, 180)
    pub azi_delta: f64,
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn wrap_degrees(delta: f64) -> f64 {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}

/// Planned point at `md`, interpolated linearly between plan stations.
/// `None` outside the planned depth range.
fn planned_at(plan: &[WellpathPoint], md: f64) -> Option<WellpathPoint> {
    let first = plan.first()?;
    if md < first.md {
        return None;
    }
    if md == first.md {
        return Some(*first);
    }
    let w = plan.windows(2).find(|w| md > w[0].md && md <= w[1].md)?;
    let (a, b) = (&w[0], &w[1]);
    let t = (md - a.md) / (b.md - a.md);
    Some(WellpathPoint {
        md,
        inc: lerp(a.inc, b.inc, t),
        azi: normalize_azimuth(a.azi + wrap_degrees(b.azi - a.azi) * t),
        tvd: lerp(a.tvd, b.tvd, t),
        northing: lerp(a.northing, b.northing, t),
        easting: lerp(a.easting, b.easting, t),
        ..WellpathPoint::default()
    })
}

/// Compare each actual station against the plan. Stations deeper or
/// shallower than the plan are skipped.
pub fn compare_to_plan(actual: &[WellpathPoint], plan: &[WellpathPoint]) -> Vec<PlanDeviation> {
    actual
        .iter()
        .filter_map(|p| {
            let planned = planned_at(plan, p.md)?;
            let north_delta = p.northing - planned.northing;
            let east_delta = p.easting - planned.easting;
            let tvd_delta = p.tvd - planned.tvd;
            let horizontal_offset = north_delta.hypot(east_delta);
            Some(PlanDeviation {
                md: p.md,
                tvd_delta,
                north_delta,
                east_delta,
                horizontal_offset,
                total_offset: horizontal_offset.hypot(tvd_delta),
                inc_delta: p.inc - planned.inc,
                azi_delta: wrap_degrees(p.azi - planned.azi),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(md: f64, inc: f64, azi: f64, tvd: f64, northing: f64, easting: f64) -> WellpathPoint {
        WellpathPoint {
            md,
            inc,
            azi,
            tvd,
            northing,
            easting,
            ..WellpathPoint::default()
        }
    }

    #[test]
    fn test_on_plan_has_no_offset() {
        let plan = vec![point(0.0, 0.0, 0.0, 0.0, 0.0, 0.0), point(1000.0, 10.0, 90.0, 990.0, 0.0, 80.0)];
        let deviations = compare_to_plan(&plan, &plan);
        assert_eq!(deviations.len(), 2);
        assert!(deviations.iter().all(|d| d.total_offset.abs() < 1e-12));
    }

    #[test]
    fn test_interpolates_between_plan_stations() {
        let plan = vec![point(0.0, 0.0, 0.0, 0.0, 0.0, 0.0), point(1000.0, 10.0, 90.0, 1000.0, 0.0, 100.0)];
        let actual = vec![point(500.0, 6.0, 95.0, 497.0, 4.0, 50.0)];
        let d = &compare_to_plan(&actual, &plan)[0];
        assert!((d.tvd_delta - (-3.0)).abs() < 1e-9);
        assert!((d.north_delta - 4.0).abs() < 1e-9);
        assert!(d.east_delta.abs() < 1e-9);
        assert!((d.horizontal_offset - 4.0).abs() < 1e-9);
        assert!((d.total_offset - 5.0).abs() < 1e-9);
        assert!((d.inc_delta - 1.0).abs() < 1e-9);
        assert!((d.azi_delta - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_azimuth_delta_wraps_north() {
        let plan = vec![point(0.0, 5.0, 355.0, 0.0, 0.0, 0.0), point(100.0, 5.0, 5.0, 100.0, 0.0, 0.0)];
        let actual = vec![point(50.0, 5.0, 2.0, 50.0, 0.0, 0.0)];
        let d = &compare_to_plan(&actual, &plan)[0];
        // Plan azimuth at 50 is 0/360
        assert!((d.azi_delta - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_stations_outside_plan_skipped() {
        let plan = vec![point(100.0, 0.0, 0.0, 100.0, 0.0, 0.0), point(200.0, 0.0, 0.0, 200.0, 0.0, 0.0)];
        let actual = vec![point(50.0, 0.0, 0.0, 50.0, 0.0, 0.0), point(150.0, 0.0, 0.0, 150.0, 0.0, 0.0), point(250.0, 0.0, 0.0, 250.0, 0.0, 0.0)];
        let deviations = compare_to_plan(&actual, &plan);
        assert_eq!(deviations.len(), 1);
        assert_eq!(deviations[0].md, 150.0);
        assert!(compare_to_plan(&actual, &[]).is_empty());
    }
}

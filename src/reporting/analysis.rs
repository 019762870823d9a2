//! Trajectory analysis over a calculated wellpath

use serde::Serialize;
use statrs::statistics::Statistics;

use super::{fmt_num, Report, ReportKind, Section};
use crate::trajectory::{closure, closure_azimuth};
use crate::types::{UnitSystem, Well, WellpathPoint};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighDlsStation {
    pub md: f64,
    pub inc: f64,
    pub azi: f64,
    pub dls: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryAnalysis {
    pub unit_system: UnitSystem,
    pub total_md: f64,
    pub final_tvd: f64,
    pub max_dls: f64,
    pub avg_dls: f64,
    pub high_dls_threshold: f64,
    pub high_dls_stations: Vec<HighDlsStation>,
    pub max_build_rate: f64,
    pub min_build_rate: f64,
    pub max_turn_rate: f64,
    pub min_turn_rate: f64,
    pub final_closure: f64,
    /// Degrees from north, [0, 360)
    pub closure_azimuth: f64,
}

/// Summarise a calculated wellpath. The first point carries no course and
/// is excluded from the DLS and rate figures.
pub fn analyze_trajectory(points: &[WellpathPoint], units: UnitSystem, high_dls_threshold: f64) -> TrajectoryAnalysis {
    let courses = points.get(1..).unwrap_or_default();

    let dls: Vec<f64> = courses.iter().map(|p| p.dls).collect();
    let build: Vec<f64> = courses.iter().map(|p| p.build_rate).collect();
    let turn: Vec<f64> = courses.iter().map(|p| p.turn_rate).collect();

    let or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };

    let high_dls_stations = courses
        .iter()
        .filter(|p| p.dls > high_dls_threshold)
        .map(|p| HighDlsStation {
            md: p.md,
            inc: p.inc,
            azi: p.azi,
            dls: p.dls,
        })
        .collect();

    let (final_closure, final_azimuth, total_md, final_tvd) = points.last().map_or((0.0, 0.0, 0.0, 0.0), |p| {
        (closure(p.northing, p.easting), closure_azimuth(p.northing, p.easting), p.md, p.tvd)
    });

    TrajectoryAnalysis {
        unit_system: units,
        total_md,
        final_tvd,
        max_dls: or_zero(Statistics::max(&dls)),
        avg_dls: or_zero(dls.iter().mean()),
        high_dls_threshold,
        high_dls_stations,
        max_build_rate: or_zero(Statistics::max(&build)),
        min_build_rate: or_zero(Statistics::min(&build)),
        max_turn_rate: or_zero(Statistics::max(&turn)),
        min_turn_rate: or_zero(Statistics::min(&turn)),
        final_closure,
        closure_azimuth: final_azimuth,
    }
}

/// Trajectory analysis report: DLS per course, build/turn rates by
/// interval and the closure summary.
pub fn trajectory_analysis_report(well: &Well, points: &[WellpathPoint], units: UnitSystem, high_dls_threshold: f64) -> Report {
    let analysis = analyze_trajectory(points, units, high_dls_threshold);
    let rate = units.rate_label();
    let len = units.length_label();

    let summary = Section::summary(
        "Summary",
        vec![
            ("Total MD", format!("{} {len}", fmt_num(analysis.total_md, 2))),
            ("Final TVD", format!("{} {len}", fmt_num(analysis.final_tvd, 2))),
            ("Max DLS", format!("{} {rate}", fmt_num(analysis.max_dls, 2))),
            ("Average DLS", format!("{} {rate}", fmt_num(analysis.avg_dls, 2))),
            (
                "High DLS Stations",
                format!("{} (> {} {rate})", analysis.high_dls_stations.len(), fmt_num(high_dls_threshold, 1)),
            ),
            ("Final Closure", format!("{} {len}", fmt_num(analysis.final_closure, 2))),
            ("Closure Azimuth", format!("{}°", fmt_num(analysis.closure_azimuth, 2))),
        ],
    );

    let dls_rows = points
        .iter()
        .skip(1)
        .map(|p| {
            vec![
                fmt_num(p.md, 2),
                format!("{}°", fmt_num(p.inc, 2)),
                format!("{}°", fmt_num(p.azi, 2)),
                format!("{}°", fmt_num(p.dogleg, 2)),
                format!("{} {rate}", fmt_num(p.dls, 2)),
            ]
        })
        .collect();

    let rate_rows = points
        .windows(2)
        .map(|w| {
            vec![
                format!("{} - {}", fmt_num(w[0].md, 2), fmt_num(w[1].md, 2)),
                format!("{} {rate}", fmt_num(w[1].build_rate, 2)),
                format!("{} {rate}", fmt_num(w[1].turn_rate, 2)),
            ]
        })
        .collect();

    let rates = Section::summary(
        "Rate Extremes",
        vec![
            ("Max Build Rate", format!("{} {rate}", fmt_num(analysis.max_build_rate, 2))),
            ("Min Build Rate", format!("{} {rate}", fmt_num(analysis.min_build_rate, 2))),
            ("Max Turn Rate", format!("{} {rate}", fmt_num(analysis.max_turn_rate, 2))),
            ("Min Turn Rate", format!("{} {rate}", fmt_num(analysis.min_turn_rate, 2))),
        ],
    );

    let high_rows = analysis
        .high_dls_stations
        .iter()
        .map(|s| vec![fmt_num(s.md, 2), fmt_num(s.inc, 2), fmt_num(s.azi, 2), fmt_num(s.dls, 2)])
        .collect();

    Report::new(
        ReportKind::TrajectoryAnalysis,
        well,
        vec![
            summary,
            Section::table("Dogleg Severity Analysis", &["MD", "Inc", "Azi", "Dogleg", "DLS"], dls_rows),
            Section::table("Build and Turn Rates", &["MD Interval", "Build Rate", "Turn Rate"], rate_rows),
            rates,
            Section::table("High DLS Stations", &["MD", "Inc", "Azi", "DLS"], high_rows),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::TrajectoryEngine;
    use crate::types::SurveyStation;

    fn build_section() -> Vec<WellpathPoint> {
        let stations = vec![
            SurveyStation::new(0.0, 0.0, 0.0),
            SurveyStation::new(1000.0, 0.0, 0.0),
            SurveyStation::new(1100.0, 5.0, 90.0),
            SurveyStation::new(1200.0, 10.0, 90.0),
            SurveyStation::new(1300.0, 10.0, 90.0),
        ];
        TrajectoryEngine::default()
            .calculate_wellpath(&stations, None, UnitSystem::Imperial, 0.0)
            .unwrap()
            .wellpath
    }

    #[test]
    fn test_high_dls_and_extremes() {
        let points = build_section();
        let analysis = analyze_trajectory(&points, UnitSystem::Imperial, 3.0);

        assert!((analysis.max_dls - 5.0).abs() < 1e-6);
        assert_eq!(analysis.high_dls_stations.len(), 2);
        assert_eq!(analysis.high_dls_stations[0].md, 1100.0);
        assert!((analysis.max_build_rate - 5.0).abs() < 1e-9);
        assert_eq!(analysis.min_build_rate, 0.0);
        assert_eq!(analysis.total_md, 1300.0);
    }

    #[test]
    fn test_closure_azimuth_points_east() {
        let points = build_section();
        let analysis = analyze_trajectory(&points, UnitSystem::Imperial, 3.0);
        assert!((analysis.closure_azimuth - 90.0).abs() < 1e-6);
        assert!(analysis.final_closure > 0.0);
    }

    #[test]
    fn test_single_point_is_all_zero() {
        let points = vec![WellpathPoint::default()];
        let analysis = analyze_trajectory(&points, UnitSystem::Metric, 3.0);
        assert_eq!(analysis.max_dls, 0.0);
        assert_eq!(analysis.avg_dls, 0.0);
        assert!(analysis.high_dls_stations.is_empty());
    }

    #[test]
    fn test_report_sections() {
        let well = Well::new("H-2", "Operator");
        let points = build_section();
        let report = trajectory_analysis_report(&well, &points, UnitSystem::Imperial, 3.0);
        assert_eq!(report.kind, ReportKind::TrajectoryAnalysis);

        match report.section("Dogleg Severity Analysis") {
            Some(Section::Table { rows, .. }) => assert_eq!(rows.len(), points.len() - 1),
            other => panic!("unexpected section: {other:?}"),
        }
        match report.section("Build and Turn Rates") {
            Some(Section::Table { rows, .. }) => assert_eq!(rows[0][0], "0.00 - 1000.00"),
            other => panic!("unexpected section: {other:?}"),
        }
    }
}

//! Chart data series for trajectory and drilling-parameter plots
//!
//! Series are plain `[x, y]` pairs so any front end can draw them. The plan
//! view plots easting against northing, the section view vertical section
//! against TVD (TVD grows downward; flipping the axis is left to the
//! renderer).

use serde::Serialize;

use crate::types::{DrillingLog, DrillingParameters, UnitSystem, WellpathPoint};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<[f64; 2]>,
}

impl ChartSeries {
    fn new(name: &str, x_label: String, y_label: String, points: Vec<[f64; 2]>) -> Self {
        Self {
            name: name.to_string(),
            x_label,
            y_label,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryCharts {
    pub unit_system: UnitSystem,
    pub plan_view: ChartSeries,
    pub section_view: ChartSeries,
    pub dls: ChartSeries,
    pub inclination: ChartSeries,
    pub azimuth: ChartSeries,
    /// Planned trajectory on the same axes, when a plan was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_plan_view: Option<ChartSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_section_view: Option<ChartSeries>,
    /// One series per logged parameter that has at least one sample
    pub parameters: Vec<ChartSeries>,
}

fn plan_view(name: &str, points: &[WellpathPoint], len: &str) -> ChartSeries {
    ChartSeries::new(
        name,
        format!("Easting ({len})"),
        format!("Northing ({len})"),
        points.iter().map(|p| [p.easting, p.northing]).collect(),
    )
}

fn section_view(name: &str, points: &[WellpathPoint], len: &str) -> ChartSeries {
    ChartSeries::new(
        name,
        format!("Vertical Section ({len})"),
        format!("TVD ({len})"),
        points.iter().map(|p| [p.vertical_section, p.tvd]).collect(),
    )
}

type Accessor = fn(&DrillingParameters) -> Option<f64>;

const PARAMETER_SERIES: [(&str, Accessor); 6] = [
    ("WOB", |p| p.wob),
    ("Torque", |p| p.torque),
    ("RPM", |p| p.rpm),
    ("Flow Rate", |p| p.flow_rate),
    ("SPP", |p| p.spp),
    ("ROP", |p| p.rop),
];

/// Parameter-vs-MD series, ordered by depth. Parameters never logged are
/// omitted.
pub fn parameter_series(log: &DrillingLog, units: UnitSystem) -> Vec<ChartSeries> {
    let mut entries: Vec<&DrillingParameters> = log.entries.iter().collect();
    entries.sort_by(|a, b| a.md.total_cmp(&b.md));
    let md_label = format!("MD ({})", units.length_label());

    PARAMETER_SERIES
        .iter()
        .map(|(name, value)| {
            let points = entries
                .iter()
                .filter_map(|p| value(*p).map(|v| [p.md, v]))
                .collect();
            ChartSeries::new(name, md_label.clone(), (*name).to_string(), points)
        })
        .filter(|series| !series.is_empty())
        .collect()
}

/// Build every chart series for a calculated wellpath.
pub fn trajectory_charts(
    points: &[WellpathPoint],
    units: UnitSystem,
    planned: Option<&[WellpathPoint]>,
    log: Option<&DrillingLog>,
) -> TrajectoryCharts {
    let len = units.length_label();
    let md_label = format!("MD ({len})");
    let courses = points.get(1..).unwrap_or_default();

    TrajectoryCharts {
        unit_system: units,
        plan_view: plan_view("Actual", points, len),
        section_view: section_view("Actual", points, len),
        dls: ChartSeries::new(
            "DLS",
            md_label.clone(),
            format!("DLS ({})", units.rate_label()),
            courses.iter().map(|p| [p.md, p.dls]).collect(),
        ),
        inclination: ChartSeries::new(
            "Inclination",
            md_label.clone(),
            "Inclination (°)".to_string(),
            points.iter().map(|p| [p.md, p.inc]).collect(),
        ),
        azimuth: ChartSeries::new(
            "Azimuth",
            md_label,
            "Azimuth (°)".to_string(),
            points.iter().map(|p| [p.md, p.azi]).collect(),
        ),
        planned_plan_view: planned.map(|plan| plan_view("Planned", plan, len)),
        planned_section_view: planned.map(|plan| section_view("Planned", plan, len)),
        parameters: log.map(|l| parameter_series(l, units)).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::TrajectoryEngine;
    use crate::types::SurveyStation;

    fn wellpath() -> Vec<WellpathPoint> {
        let stations = vec![
            SurveyStation::new(0.0, 0.0, 0.0),
            SurveyStation::new(1000.0, 0.0, 0.0),
            SurveyStation::new(1100.0, 5.0, 90.0),
            SurveyStation::new(1200.0, 10.0, 90.0),
        ];
        TrajectoryEngine::default()
            .calculate_wellpath(&stations, None, UnitSystem::Imperial, 90.0)
            .unwrap()
            .wellpath
    }

    #[test]
    fn test_trajectory_series() {
        let points = wellpath();
        let charts = trajectory_charts(&points, UnitSystem::Imperial, None, None);

        assert_eq!(charts.plan_view.points.len(), 4);
        assert_eq!(charts.plan_view.x_label, "Easting (ft)");
        let last = points.last().unwrap();
        assert_eq!(charts.plan_view.points[3], [last.easting, last.northing]);
        assert_eq!(charts.section_view.points[3], [last.vertical_section, last.tvd]);
        // The surface point has no course, so no DLS sample
        assert_eq!(charts.dls.points.len(), 3);
        assert_eq!(charts.inclination.points[2], [1100.0, 5.0]);
        assert!(charts.planned_plan_view.is_none());
        assert!(charts.parameters.is_empty());
    }

    #[test]
    fn test_planned_series_share_axes() {
        let points = wellpath();
        let plan = wellpath();
        let charts = trajectory_charts(&points, UnitSystem::Metric, Some(&plan), None);
        let planned = charts.planned_section_view.unwrap();
        assert_eq!(planned.name, "Planned");
        assert_eq!(planned.x_label, charts.section_view.x_label);
        assert_eq!(planned.points.len(), plan.len());
    }

    #[test]
    fn test_parameter_series_sorted_and_sparse() {
        let mut log = DrillingLog::new("w", UnitSystem::Imperial);
        let mut deep = DrillingParameters::at_depth(5200.0);
        deep.wob = Some(28.0);
        deep.rpm = Some(120.0);
        let mut shallow = DrillingParameters::at_depth(5100.0);
        shallow.wob = Some(22.0);
        log.push(deep);
        log.push(shallow);

        let series = parameter_series(&log, UnitSystem::Imperial);
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["WOB", "RPM"]);
        assert_eq!(series[0].points, vec![[5100.0, 22.0], [5200.0, 28.0]]);
        assert_eq!(series[1].x_label, "MD (ft)");
    }
}

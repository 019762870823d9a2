//! Builders for the per-well report kinds

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use super::{fmt_num, fmt_opt, PlanDeviation, Report, ReportKind, Section};
use crate::trajectory::{CalculationResult, SurveyReport};
use crate::types::{Bha, DrillingLog, DrillingParameters, Survey, UnitSystem, Well, WellpathPoint};

fn station_rows(points: &[WellpathPoint]) -> Vec<Vec<String>> {
    points
        .iter()
        .map(|p| {
            vec![
                fmt_num(p.md, 2),
                fmt_num(p.inc, 2),
                fmt_num(p.azi, 2),
                fmt_num(p.tvd, 2),
                fmt_num(p.northing, 2),
                fmt_num(p.easting, 2),
            ]
        })
        .collect()
}

fn well_information(well: &Well) -> Section {
    let location = well.location.clone().unwrap_or_default();
    Section::summary(
        "Well Information",
        vec![
            ("Well Name", well.name.clone()),
            ("Operator", well.operator.clone()),
            ("Field", well.field.clone().unwrap_or_else(|| "N/A".to_string())),
            ("Rig Name", well.rig_name.clone().unwrap_or_else(|| "N/A".to_string())),
            ("Latitude", fmt_opt(location.latitude, 6)),
            ("Longitude", fmt_opt(location.longitude, 6)),
            ("Target Depth", fmt_opt(well.target_depth, 1)),
        ],
    )
}

fn plan_comparison(deviations: &[PlanDeviation], len: &str) -> Vec<Section> {
    if deviations.is_empty() {
        return vec![Section::text(
            "Planned vs Actual",
            "No actual stations fall within the planned depth range.",
        )];
    }
    let max = deviations
        .iter()
        .max_by(|a, b| a.total_offset.total_cmp(&b.total_offset));
    let final_offset = deviations.last().map_or(0.0, |d| d.total_offset);
    let rows = deviations
        .iter()
        .map(|d| {
            vec![
                fmt_num(d.md, 2),
                fmt_num(d.tvd_delta, 2),
                fmt_num(d.north_delta, 2),
                fmt_num(d.east_delta, 2),
                fmt_num(d.total_offset, 2),
                fmt_num(d.inc_delta, 2),
                fmt_num(d.azi_delta, 2),
            ]
        })
        .collect();
    vec![
        Section::summary(
            "Plan Deviation Summary",
            vec![
                ("Compared Stations", deviations.len().to_string()),
                (
                    "Max Offset",
                    max.map_or_else(
                        || "N/A".to_string(),
                        |d| format!("{} {len} at {} {len} MD", fmt_num(d.total_offset, 2), fmt_num(d.md, 2)),
                    ),
                ),
                ("Final Offset", format!("{} {len}", fmt_num(final_offset, 2))),
            ],
        ),
        Section::table(
            "Planned vs Actual",
            &["MD", "dTVD", "dNorth", "dEast", "Offset", "dInc", "dAzi"],
            rows,
        ),
    ]
}

/// Raw stations with the validation summary, plus the per-station offset
/// from a planned trajectory when one is supplied.
pub fn survey_report(
    well: &Well,
    survey: &Survey,
    summary: &SurveyReport,
    plan: Option<&[PlanDeviation]>,
) -> Report {
    let stats = &summary.statistics;
    let len = survey.unit_system.length_label();

    let mut sections = vec![
        Section::summary(
            "Survey Information",
            vec![
                ("Survey", survey.survey_name.clone().unwrap_or_else(|| survey.survey_id.clone())),
                ("Unit System", survey.unit_system.display_name().to_string()),
                ("Calculation Method", survey.calculation_method.display_name().to_string()),
                ("Stations", summary.num_points.to_string()),
                ("MD Range", format!("{} - {} {len}", fmt_num(stats.start_md, 2), fmt_num(stats.end_md, 2))),
                ("Inclination Range", format!("{}° - {}°", fmt_num(stats.min_inc, 2), fmt_num(stats.max_inc, 2))),
                ("Azimuth Spread", format!("{}°", fmt_num(summary.azi_range, 2))),
            ],
        ),
        Section::table(
            "Survey Stations",
            &["MD", "Inc", "Azi"],
            survey
                .stations
                .iter()
                .map(|s| vec![fmt_num(s.md, 2), fmt_num(s.inc, 2), fmt_num(s.azi, 2)])
                .collect(),
        ),
    ];
    if let Some(deviations) = plan {
        sections.extend(plan_comparison(deviations, len));
    }
    if !summary.warnings.is_empty() {
        sections.push(Section::text("Warnings", summary.warnings.join("\n")));
    }
    if let Some(comments) = &survey.comments {
        sections.push(Section::text("Comments", comments.clone()));
    }
    Report::new(ReportKind::Survey, well, sections)
}

/// Component stack from the bit up with totals.
pub fn bha_report(well: &Well, bha: &Bha) -> Report {
    let len = bha.unit_system.length_label();
    let mut components: Vec<_> = bha.components.iter().collect();
    components.sort_by(|a, b| a.position_from_bit.total_cmp(&b.position_from_bit));

    let rows = components
        .iter()
        .enumerate()
        .map(|(i, c)| {
            vec![
                (i + 1).to_string(),
                c.name.clone(),
                c.component_type.as_str().to_string(),
                fmt_num(c.length, 2),
                fmt_num(c.outer_diameter, 3),
                fmt_opt(c.inner_diameter, 3),
                fmt_opt(c.weight, 1),
                fmt_num(c.position_from_bit, 2),
            ]
        })
        .collect();

    let mut sections = vec![
        Section::summary(
            "BHA Information",
            vec![
                ("Name", bha.name.clone()),
                ("Components", bha.components.len().to_string()),
                ("Total Length", format!("{} {len}", fmt_num(bha.total_length(), 2))),
                ("Total Weight", fmt_num(bha.total_weight(), 1)),
                ("Recommended WOB", fmt_opt(bha.recommended_wob, 1)),
                ("Recommended RPM", fmt_opt(bha.recommended_rpm, 0)),
                ("Recommended Flow Rate", fmt_opt(bha.recommended_flow_rate, 0)),
            ],
        ),
        Section::table(
            "Components",
            &["Position", "Name", "Type", "Length", "OD", "ID", "Weight", "From Bit"],
            rows,
        ),
    ];
    if let Some(comments) = &bha.comments {
        sections.push(Section::text("Comments", comments.clone()));
    }
    Report::new(ReportKind::Bha, well, sections)
}

/// Calculated positions for a survey.
pub fn wellpath_report(well: &Well, survey: &Survey, result: &CalculationResult) -> Report {
    let len = result.unit_system.length_label();
    let rate = result.unit_system.rate_label();
    let q = &result.quality_metrics;

    let rows = result
        .wellpath
        .iter()
        .map(|p| {
            vec![
                fmt_num(p.md, 2),
                fmt_num(p.inc, 2),
                fmt_num(p.azi, 2),
                fmt_num(p.tvd, 2),
                fmt_num(p.northing, 2),
                fmt_num(p.easting, 2),
                fmt_num(p.dls, 2),
                fmt_num(p.vertical_section, 2),
            ]
        })
        .collect();

    Report::new(
        ReportKind::Wellpath,
        well,
        vec![
            Section::summary(
                "Calculation Summary",
                vec![
                    ("Survey", survey.survey_name.clone().unwrap_or_else(|| survey.survey_id.clone())),
                    ("Method", result.method.display_name().to_string()),
                    ("Reference Azimuth", format!("{}°", fmt_num(survey.reference_azimuth, 2))),
                    ("Total MD", format!("{} {len}", fmt_num(result.total_md, 2))),
                    ("Total TVD", format!("{} {len}", fmt_num(result.total_tvd, 2))),
                    ("Max Inclination", format!("{}°", fmt_num(result.max_inc, 2))),
                    ("Max DLS", format!("{} {rate}", fmt_num(result.max_dls, 2))),
                    ("Total Dogleg", format!("{}°", fmt_num(q.total_dogleg, 2))),
                ],
            ),
            Section::table(
                "Wellpath",
                &["MD", "Inc", "Azi", "TVD", "NS", "EW", "DLS", "VS"],
                rows,
            ),
        ],
    )
}

/// Operator-supplied content of a daily drilling report.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyReportInput {
    pub date: NaiveDate,
    #[serde(default = "default_report_number")]
    pub report_number: u32,
    #[serde(default)]
    pub operations: String,
    #[serde(default)]
    pub mud_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub comments: Option<String>,
}

fn default_report_number() -> u32 {
    1
}

fn parameter_rows(p: &DrillingParameters) -> Vec<(&'static str, String)> {
    vec![
        ("MD", fmt_num(p.md, 1)),
        ("WOB", fmt_opt(p.wob, 1)),
        ("RPM", fmt_opt(p.rpm, 0)),
        ("Torque", fmt_opt(p.torque, 1)),
        ("Flow Rate", fmt_opt(p.flow_rate, 0)),
        ("SPP", fmt_opt(p.spp, 0)),
        ("ROP", fmt_opt(p.rop, 1)),
        ("Hookload", fmt_opt(p.hookload, 1)),
    ]
}

/// Status, parameters and surveys for the day in `input.date`.
///
/// Current depth is the deepest logged entry up to the end of that day,
/// falling back to the last calculated station. Footage is measured from
/// the deepest entry logged before the day started.
pub fn daily_drilling_report(
    well: &Well,
    input: &DailyReportInput,
    log: Option<&DrillingLog>,
    points: &[WellpathPoint],
) -> Report {
    let entries: &[DrillingParameters] = log.map_or(&[], |l| l.entries.as_slice());
    let depths = |pred: &dyn Fn(NaiveDate) -> bool| {
        entries
            .iter()
            .filter(|p| pred(p.timestamp.date_naive()))
            .map(|p| p.md)
            .collect::<Vec<_>>()
    };

    let current_depth = depths(&|d| d <= input.date)
        .into_iter()
        .reduce(f64::max)
        .or_else(|| points.last().map(|p| p.md))
        .unwrap_or(0.0);
    let day_start = depths(&|d| d < input.date)
        .into_iter()
        .reduce(f64::max)
        .or_else(|| depths(&|d| d == input.date).into_iter().reduce(f64::min))
        .unwrap_or(current_depth);
    let footage = (current_depth - day_start).max(0.0);

    let days_since_spud = well
        .spud_date
        .map_or_else(|| "N/A".to_string(), |spud| (input.date - spud.date_naive()).num_days().to_string());

    let len = well.unit_system.length_label();
    let mut sections = vec![
        Section::summary(
            "General",
            vec![
                ("Date", input.date.format("%Y-%m-%d").to_string()),
                ("Well", well.name.clone()),
                ("Operator", well.operator.clone()),
                ("Rig", well.rig_name.clone().unwrap_or_else(|| "N/A".to_string())),
                ("Report Number", input.report_number.to_string()),
                ("Days Since Spud", days_since_spud),
            ],
        ),
        Section::summary(
            "Current Status",
            vec![
                ("Current Depth", format!("{} {len}", fmt_num(current_depth, 1))),
                ("Footage Today", format!("{} {len}", fmt_num(footage, 1))),
            ],
        ),
        Section::text("Operations", input.operations.clone()),
    ];

    let latest_today = entries
        .iter()
        .filter(|p| p.timestamp.date_naive() == input.date)
        .max_by_key(|p| p.timestamp);
    if let Some(params) = latest_today {
        sections.push(Section::summary("Drilling Parameters", parameter_rows(params)));
    }
    if !input.mud_properties.is_empty() {
        sections.push(Section::Summary {
            title: "Mud Properties".to_string(),
            rows: input.mud_properties.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        });
    }
    sections.push(Section::table(
        "Surveys",
        &["MD", "Inc", "Azi", "TVD", "NS", "EW"],
        station_rows(points),
    ));
    sections.push(Section::text("Comments", input.comments.clone().unwrap_or_default()));

    Report::new(ReportKind::DailyDrilling, well, sections)
}

/// Well data, final wellbore position and the final BHA.
pub fn final_well_report(well: &Well, points: &[WellpathPoint], units: UnitSystem, bha: Option<&Bha>) -> Report {
    let len = units.length_label();
    let mut sections = vec![well_information(well)];

    match points.last() {
        Some(last) => sections.push(Section::summary(
            "Final Wellbore Data",
            vec![
                ("Total Measured Depth", format!("{} {len}", fmt_num(last.md, 2))),
                ("Total True Vertical Depth", format!("{} {len}", fmt_num(last.tvd, 2))),
                ("Final Inclination", format!("{}°", fmt_num(last.inc, 2))),
                ("Final Azimuth", format!("{}°", fmt_num(last.azi, 2))),
                ("Final Northing", format!("{} {len}", fmt_num(last.northing, 2))),
                ("Final Easting", format!("{} {len}", fmt_num(last.easting, 2))),
                ("Final Closure", format!("{} {len}", fmt_num(last.closure, 2))),
            ],
        )),
        None => sections.push(Section::text("Final Wellbore Data", "No survey data")),
    }

    if let Some(bha) = bha.filter(|b| !b.components.is_empty()) {
        let mut components: Vec<_> = bha.components.iter().collect();
        components.sort_by(|a, b| a.position_from_bit.total_cmp(&b.position_from_bit));
        sections.push(Section::table(
            &format!("Final BHA: {}", bha.name),
            &["Position", "Name", "Type", "Length", "OD"],
            components
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    vec![
                        (i + 1).to_string(),
                        c.name.clone(),
                        c.component_type.as_str().to_string(),
                        fmt_num(c.length, 2),
                        fmt_num(c.outer_diameter, 3),
                    ]
                })
                .collect(),
        ));
    }

    Report::new(ReportKind::FinalWell, well, sections)
}

//! Report generation
//!
//! Reports are assembled as typed [`Report`] values made of titled
//! sections, signed with an MD5 digest of their body and rendered to JSON
//! or HTML.
//!
//! ## Kinds
//! - Survey: raw stations with statistics
//! - BHA: component stack and totals
//! - Wellpath: calculated positions
//! - Trajectory analysis: DLS, build/turn and closure review
//! - Daily drilling: status, parameters and surveys for one day
//! - Final well: well data, final wellbore position and final BHA
//!
//! Chart series (plan, section, DLS and parameter plots) and the
//! planned-versus-actual comparison are exposed as data for the front end.

mod analysis;
mod builders;
mod charts;
mod comparison;
mod html;

pub use analysis::{analyze_trajectory, trajectory_analysis_report, HighDlsStation, TrajectoryAnalysis};
pub use builders::{
    bha_report, daily_drilling_report, final_well_report, survey_report, wellpath_report,
    DailyReportInput,
};
pub use charts::{parameter_series, trajectory_charts, ChartSeries, TrajectoryCharts};
pub use comparison::{compare_to_plan, PlanDeviation};
pub use html::render_html;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{UnitSystem, Well};

// ============================================================================
// Report model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Survey,
    Bha,
    Wellpath,
    TrajectoryAnalysis,
    DailyDrilling,
    FinalWell,
}

impl ReportKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Survey => "Survey Report",
            Self::Bha => "BHA Report",
            Self::Wellpath => "Wellpath Report",
            Self::TrajectoryAnalysis => "Trajectory Analysis",
            Self::DailyDrilling => "Daily Drilling Report",
            Self::FinalWell => "Final Well Report",
        }
    }
}

/// Output format accepted by the report endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Html,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(format!("Unsupported report format: {other}")),
        }
    }
}

/// Well header printed on every report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellSummary {
    pub well_id: String,
    pub name: String,
    pub operator: String,
    pub field: Option<String>,
    pub rig_name: Option<String>,
    pub unit_system: UnitSystem,
}

impl From<&Well> for WellSummary {
    fn from(well: &Well) -> Self {
        Self {
            well_id: well.well_id.clone(),
            name: well.name.clone(),
            operator: well.operator.clone(),
            field: well.field.clone(),
            rig_name: well.rig_name.clone(),
            unit_system: well.unit_system,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    /// Label/value pairs
    Summary {
        title: String,
        rows: Vec<(String, String)>,
    },
    Table {
        title: String,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Text {
        title: String,
        body: String,
    },
}

impl Section {
    pub fn title(&self) -> &str {
        match self {
            Self::Summary { title, .. } | Self::Table { title, .. } | Self::Text { title, .. } => title,
        }
    }

    pub(crate) fn summary(title: &str, rows: Vec<(&str, String)>) -> Self {
        Self::Summary {
            title: title.to_string(),
            rows: rows.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub(crate) fn table(title: &str, columns: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self::Table {
            title: title.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
        }
    }

    pub(crate) fn text(title: &str, body: impl Into<String>) -> Self {
        Self::Text {
            title: title.to_string(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub well: WellSummary,
    pub sections: Vec<Section>,
    /// `MD5-<hex>` over the serialised body
    pub signature: String,
}

#[derive(Serialize)]
struct SignedBody<'a> {
    kind: ReportKind,
    title: &'a str,
    generated_at: &'a DateTime<Utc>,
    well: &'a WellSummary,
    sections: &'a [Section],
}

impl Report {
    pub(crate) fn new(kind: ReportKind, well: &Well, sections: Vec<Section>) -> Self {
        let mut report = Self {
            kind,
            title: format!("{} - {}", kind.title(), well.name),
            generated_at: Utc::now(),
            well: WellSummary::from(well),
            sections,
            signature: String::new(),
        };
        report.signature = report.compute_signature();
        report
    }

    pub fn compute_signature(&self) -> String {
        let body = SignedBody {
            kind: self.kind,
            title: &self.title,
            generated_at: &self.generated_at,
            well: &self.well,
            sections: &self.sections,
        };
        // Serialising plain data to a Vec cannot fail
        let bytes = serde_json::to_vec(&body).unwrap_or_default();
        format!("MD5-{:x}", md5::compute(bytes))
    }

    /// True when the body still matches its signature.
    pub fn verify(&self) -> bool {
        self.signature == self.compute_signature()
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title() == title)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} sections, {})", self.title, self.sections.len(), self.signature)
    }
}

pub(crate) fn fmt_num(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

pub(crate) fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| fmt_num(v, decimals))
}

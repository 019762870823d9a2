//! CSV interchange for surveys, calculated wellpaths and BHAs

mod bha_csv;
mod survey_csv;

pub use bha_csv::export_bha_csv;
pub use survey_csv::{export_survey_csv, import_survey_csv, read_stations, SURVEY_EXPORT_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Invalid {column} value '{value}' on line {line}")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("No survey stations found in CSV")]
    NoStations,

    #[error("Survey has no data to export")]
    NoData,

    #[error("BHA has no components to export")]
    NoComponents,
}

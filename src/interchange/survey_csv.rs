//! Survey CSV import and wellpath CSV export

use std::io::{Read, Write};

use crate::types::{Survey, SurveyStation, UnitSystem, WellpathPoint};

use super::InterchangeError;

const REQUIRED_COLUMNS: [&str; 3] = ["md", "inc", "azi"];

/// Column order of exported wellpaths. Matches `WellpathPoint` field order.
pub const SURVEY_EXPORT_COLUMNS: [&str; 12] = [
    "md",
    "inc",
    "azi",
    "tvd",
    "northing",
    "easting",
    "dogleg",
    "dls",
    "build_rate",
    "turn_rate",
    "closure",
    "vertical_section",
];

/// Read `md`, `inc`, `azi` stations from CSV.
///
/// Headers are matched case-insensitively after trimming; other columns
/// are ignored. Rows with an empty required field are skipped, while
/// non-numeric values are an error.
pub fn read_stations<R: Read>(reader: R) -> Result<Vec<SurveyStation>, InterchangeError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| position(c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(InterchangeError::MissingColumns(missing));
    }
    let idx: Vec<usize> = REQUIRED_COLUMNS.iter().filter_map(|c| position(c)).collect();

    let mut stations = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        let fields: Vec<&str> = idx.iter().map(|&i| record.get(i).unwrap_or("")).collect();
        if fields.iter().any(|f| f.is_empty()) {
            skipped += 1;
            continue;
        }

        let mut values = [0.0; 3];
        for (k, raw) in fields.iter().enumerate() {
            values[k] = raw.parse::<f64>().map_err(|_| InterchangeError::InvalidValue {
                line,
                column: REQUIRED_COLUMNS[k],
                value: raw.to_string(),
            })?;
        }
        stations.push(SurveyStation::new(values[0], values[1], values[2]));
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped CSV rows with missing md/inc/azi");
    }
    Ok(stations)
}

/// Build a survey for `well_id` from CSV text.
pub fn import_survey_csv<R: Read>(
    reader: R,
    well_id: &str,
    unit_system: UnitSystem,
) -> Result<Survey, InterchangeError> {
    let stations = read_stations(reader)?;
    if stations.is_empty() {
        return Err(InterchangeError::NoStations);
    }

    let mut survey = Survey::new(well_id, unit_system);
    for station in stations {
        survey.add_station(station);
    }
    tracing::info!(well_id, stations = survey.stations.len(), "Survey imported from CSV");
    Ok(survey)
}

/// Write calculated points with a header row.
pub fn export_survey_csv<W: Write>(points: &[WellpathPoint], writer: W) -> Result<(), InterchangeError> {
    if points.is_empty() {
        return Err(InterchangeError::NoData);
    }
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for point in points {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_case_insensitive_headers_and_extra_columns() {
        let csv = "MD , Inc,AZI,tvd,comment\n0,0,0,0,tie-in\n1000,2,45,,\n2000,8,360,,wraps\n";
        let survey = import_survey_csv(csv.as_bytes(), "well-1", UnitSystem::Imperial).unwrap();
        assert_eq!(survey.well_id, "well-1");
        assert_eq!(survey.stations.len(), 3);
        assert_eq!(survey.stations[1], SurveyStation::new(1000.0, 2.0, 45.0));
        // 360 is normalised to 0
        assert_eq!(survey.stations[2].azi, 0.0);
    }

    #[test]
    fn test_rows_with_missing_fields_are_skipped() {
        let csv = "md,inc,azi\n0,0,0\n500,,10\n1000,2\n1500,3,20\n";
        let stations = read_stations(csv.as_bytes()).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[1].md, 1500.0);
    }

    #[test]
    fn test_missing_columns() {
        let err = read_stations("md,incl\n0,0\n".as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "CSV is missing required columns: inc, azi");
    }

    #[test]
    fn test_non_numeric_value() {
        let err = read_stations("md,inc,azi\n0,0,0\n100,abc,0\n".as_bytes()).unwrap_err();
        match err {
            InterchangeError::InvalidValue { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "inc");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_has_no_stations() {
        let err = import_survey_csv("md,inc,azi\n".as_bytes(), "w", UnitSystem::Metric).unwrap_err();
        assert!(matches!(err, InterchangeError::NoStations));
    }

    #[test]
    fn test_export_columns() {
        let points = vec![
            WellpathPoint { md: 0.0, ..Default::default() },
            WellpathPoint { md: 100.0, inc: 1.5, azi: 30.0, tvd: 99.99, dls: 1.5, ..Default::default() },
        ];
        let mut out = Vec::new();
        export_survey_csv(&points, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), SURVEY_EXPORT_COLUMNS.join(","));
        assert!(lines.nth(1).unwrap().starts_with("100.0,1.5,30.0,99.99"));
    }

    #[test]
    fn test_export_empty_is_error() {
        let err = export_survey_csv(&[], Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Survey has no data to export");
    }
}

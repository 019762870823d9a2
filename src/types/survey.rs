//! Survey stations, calculated wellpath points and survey records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, CalculationMethod, ModelError, UnitSystem};

/// Normalise an azimuth into `[0, 360)`.
///
/// `rem_euclid` rounds tiny negative inputs up to exactly `360.0`, which is
/// folded back to north.
pub fn normalize_azimuth(azi: f64) -> f64 {
    let azi = azi.rem_euclid(360.0);
    if azi >= 360.0 {
        0.0
    } else {
        azi
    }
}

/// A single directional survey measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyStation {
    /// Measured depth
    pub md: f64,
    /// Inclination (degrees)
    pub inc: f64,
    /// Azimuth (degrees)
    pub azi: f64,
}

impl SurveyStation {
    pub fn new(md: f64, inc: f64, azi: f64) -> Self {
        Self { md, inc, azi }
    }
}

/// A survey station with its calculated position and curvature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WellpathPoint {
    pub md: f64,
    pub inc: f64,
    pub azi: f64,
    #[serde(default)]
    pub tvd: f64,
    #[serde(default)]
    pub northing: f64,
    #[serde(default)]
    pub easting: f64,
    /// Course dogleg angle (degrees)
    #[serde(default)]
    pub dogleg: f64,
    /// Dogleg severity (degrees per course length)
    #[serde(default)]
    pub dls: f64,
    #[serde(default)]
    pub build_rate: f64,
    #[serde(default)]
    pub turn_rate: f64,
    /// Horizontal distance from the wellhead
    #[serde(default)]
    pub closure: f64,
    #[serde(default)]
    pub vertical_section: f64,
}

impl WellpathPoint {
    pub fn station(&self) -> SurveyStation {
        SurveyStation::new(self.md, self.inc, self.azi)
    }
}

impl From<SurveyStation> for WellpathPoint {
    fn from(s: SurveyStation) -> Self {
        Self {
            md: s.md,
            inc: s.inc,
            azi: s.azi,
            ..Self::default()
        }
    }
}

fn default_method() -> CalculationMethod {
    CalculationMethod::MinimumCurvature
}

/// A named set of survey stations belonging to a well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    #[serde(default = "new_id")]
    pub survey_id: String,
    pub well_id: String,
    #[serde(default)]
    pub survey_name: Option<String>,
    #[serde(default)]
    pub unit_system: UnitSystem,
    #[serde(default)]
    pub stations: Vec<SurveyStation>,
    #[serde(default = "default_method")]
    pub calculation_method: CalculationMethod,
    /// Reference azimuth for vertical section (degrees)
    #[serde(default)]
    pub reference_azimuth: f64,
    /// Magnetic declination correction (degrees)
    #[serde(default)]
    pub magnetic_declination: f64,
    #[serde(default = "Utc::now")]
    pub created_date: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_date: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl Survey {
    pub fn new(well_id: impl Into<String>, unit_system: UnitSystem) -> Self {
        let now = Utc::now();
        Self {
            survey_id: new_id(),
            well_id: well_id.into(),
            survey_name: None,
            unit_system,
            stations: Vec::new(),
            calculation_method: CalculationMethod::MinimumCurvature,
            reference_azimuth: 0.0,
            magnetic_declination: 0.0,
            created_date: now,
            updated_date: now,
            created_by: None,
            comments: None,
        }
    }

    /// Append a station, normalising its azimuth into `[0, 360)`.
    pub fn add_station(&mut self, mut station: SurveyStation) {
        station.azi = normalize_azimuth(station.azi);
        self.stations.push(station);
        self.updated_date = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.well_id.trim().is_empty() {
            return Err(ModelError::invalid("well_id", "must not be empty"));
        }
        if !(0.0..360.0).contains(&self.reference_azimuth) {
            return Err(ModelError::invalid(
                "reference_azimuth",
                format!("must be in [0, 360) (got {})", self.reference_azimuth),
            ));
        }
        for (i, s) in self.stations.iter().enumerate() {
            if !s.md.is_finite() || s.md < 0.0 {
                return Err(ModelError::invalid("md", format!("invalid at point {i}: {}", s.md)));
            }
            if !(0.0..=180.0).contains(&s.inc) {
                return Err(ModelError::invalid("inc", format!("invalid at point {i}: {}", s.inc)));
            }
            if !(0.0..360.0).contains(&s.azi) {
                return Err(ModelError::invalid("azi", format!("invalid at point {i}: {}", s.azi)));
            }
            if i > 0 && s.md <= self.stations[i - 1].md {
                return Err(ModelError::NonMonotonicDepth { index: i });
            }
        }
        Ok(())
    }
}

//! Well records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{check_name, check_positive, new_id, ModelError, UnitSystem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellType {
    Vertical,
    #[default]
    Directional,
    Horizontal,
    Multilateral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellStatus {
    #[default]
    Planned,
    Drilling,
    Completed,
    Suspended,
    Abandoned,
}

fn default_coordinate_system() -> Option<String> {
    Some("WGS84".to_string())
}

/// Geographic surface location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Elevation above sea level
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default = "default_coordinate_system")]
    pub coordinate_system: Option<String>,
    #[serde(default)]
    pub utm_zone: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            elevation: None,
            coordinate_system: default_coordinate_system(),
            utm_zone: None,
        }
    }
}

impl Location {
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ModelError::invalid("location.latitude", format!("must be in [-90, 90] (got {lat})")));
            }
        }
        if let Some(lon) = self.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(ModelError::invalid("location.longitude", format!("must be in [-180, 180] (got {lon})")));
            }
        }
        Ok(())
    }
}

/// Well information and planning depths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Well {
    #[serde(default = "new_id")]
    pub well_id: String,
    pub name: String,
    pub operator: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub rig_name: Option<String>,
    #[serde(default)]
    pub well_type: WellType,
    #[serde(default)]
    pub status: WellStatus,
    #[serde(default)]
    pub unit_system: UnitSystem,

    #[serde(default)]
    pub target_depth: Option<f64>,
    #[serde(default)]
    pub surface_casing_depth: Option<f64>,
    #[serde(default)]
    pub intermediate_casing_depth: Option<f64>,
    #[serde(default)]
    pub production_casing_depth: Option<f64>,

    #[serde(default)]
    pub spud_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_date: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_date: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Well {
    pub fn new(name: impl Into<String>, operator: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            well_id: new_id(),
            name: name.into(),
            operator: operator.into(),
            field: None,
            location: None,
            rig_name: None,
            well_type: WellType::default(),
            status: WellStatus::default(),
            unit_system: UnitSystem::default(),
            target_depth: None,
            surface_casing_depth: None,
            intermediate_casing_depth: None,
            production_casing_depth: None,
            spud_date: None,
            completion_date: None,
            created_date: now,
            updated_date: now,
            metadata: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_name("name", &self.name)?;
        check_name("operator", &self.operator)?;
        if let Some(field) = &self.field {
            if field.chars().count() > 100 {
                return Err(ModelError::invalid("field", "must be at most 100 characters"));
            }
        }
        if let Some(loc) = &self.location {
            loc.validate()?;
        }
        check_positive("target_depth", self.target_depth)?;
        check_positive("surface_casing_depth", self.surface_casing_depth)?;
        check_positive("intermediate_casing_depth", self.intermediate_casing_depth)?;
        check_positive("production_casing_depth", self.production_casing_depth)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_validation() {
        let mut well = Well::new("Well-001", "ABC Energy");
        assert!(well.validate().is_ok());

        well.target_depth = Some(-5.0);
        assert!(well.validate().is_err());

        well.target_depth = Some(15_000.0);
        well.location = Some(Location {
            latitude: Some(95.0),
            ..Location::default()
        });
        assert!(well.validate().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let well = Well::new("  ", "ABC Energy");
        let err = well.validate().unwrap_err();
        assert!(err.to_string().starts_with("name:"));
    }

    #[test]
    fn test_well_json_defaults() {
        let well: Well = serde_json::from_str(r#"{"name":"W","operator":"Op"}"#).unwrap();
        assert_eq!(well.well_type, WellType::Directional);
        assert_eq!(well.status, WellStatus::Planned);
        assert_eq!(well.unit_system, UnitSystem::Imperial);
    }
}

//! Projects group wells under a shared operator and defaults

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_name, new_id, CalculationMethod, ModelError, UnitSystem};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "new_id")]
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub operator: String,
    #[serde(default)]
    pub field: Option<String>,

    #[serde(default)]
    pub default_unit_system: UnitSystem,
    #[serde(default)]
    pub default_calculation_method: CalculationMethod,

    #[serde(default)]
    pub well_ids: Vec<String>,

    #[serde(default = "Utc::now")]
    pub created_date: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_date: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, operator: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            project_id: new_id(),
            name: name.into(),
            description: None,
            operator: operator.into(),
            field: None,
            default_unit_system: UnitSystem::default(),
            default_calculation_method: CalculationMethod::default(),
            well_ids: Vec::new(),
            created_date: now,
            updated_date: now,
            created_by: None,
        }
    }

    /// Register a well, ignoring duplicates.
    pub fn add_well(&mut self, well_id: &str) {
        if !self.well_ids.iter().any(|w| w == well_id) {
            self.well_ids.push(well_id.to_string());
        }
        self.updated_date = Utc::now();
    }

    pub fn remove_well(&mut self, well_id: &str) {
        self.well_ids.retain(|w| w != well_id);
        self.updated_date = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_name("name", &self.name)?;
        check_name("operator", &self.operator)?;
        Ok(())
    }
}

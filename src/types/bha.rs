//! Bottom-hole assembly models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_name, check_positive, new_id, ModelError, UnitSystem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Bit,
    Motor,
    Mwd,
    Lwd,
    Stabilizer,
    DrillCollar,
    Hwdp,
    DrillPipe,
    Crossover,
    Other,
}

impl ComponentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bit => "bit",
            Self::Motor => "motor",
            Self::Mwd => "mwd",
            Self::Lwd => "lwd",
            Self::Stabilizer => "stabilizer",
            Self::DrillCollar => "drill_collar",
            Self::Hwdp => "hwdp",
            Self::DrillPipe => "drill_pipe",
            Self::Crossover => "crossover",
            Self::Other => "other",
        }
    }
}

/// A single BHA component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BhaComponent {
    #[serde(default = "new_id")]
    pub component_id: String,
    pub name: String,
    pub component_type: ComponentType,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,

    pub length: f64,
    pub outer_diameter: f64,
    #[serde(default)]
    pub inner_diameter: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,

    /// Distance from the bit (0 = bit)
    pub position_from_bit: f64,

    #[serde(default)]
    pub max_wob: Option<f64>,
    #[serde(default)]
    pub max_torque: Option<f64>,
    #[serde(default)]
    pub max_flow_rate: Option<f64>,

    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl BhaComponent {
    pub fn new(
        name: impl Into<String>,
        component_type: ComponentType,
        length: f64,
        outer_diameter: f64,
        position_from_bit: f64,
    ) -> Self {
        Self {
            component_id: new_id(),
            name: name.into(),
            component_type,
            manufacturer: None,
            model: None,
            length,
            outer_diameter,
            inner_diameter: None,
            weight: None,
            position_from_bit,
            max_wob: None,
            max_torque: None,
            max_flow_rate: None,
            serial_number: None,
            comments: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_name("name", &self.name)?;
        check_positive("length", Some(self.length))?;
        check_positive("outer_diameter", Some(self.outer_diameter))?;
        check_positive("inner_diameter", self.inner_diameter)?;
        if let Some(id) = self.inner_diameter {
            if id >= self.outer_diameter {
                return Err(ModelError::invalid(
                    "inner_diameter",
                    "Inner diameter must be less than outer diameter",
                ));
            }
        }
        check_positive("weight", self.weight)?;
        if !self.position_from_bit.is_finite() || self.position_from_bit < 0.0 {
            return Err(ModelError::invalid("position_from_bit", "must be >= 0"));
        }
        check_positive("max_wob", self.max_wob)?;
        check_positive("max_torque", self.max_torque)?;
        check_positive("max_flow_rate", self.max_flow_rate)?;
        Ok(())
    }
}

/// Bottom-hole assembly: an ordered stack of components for a well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bha {
    #[serde(default = "new_id")]
    pub bha_id: String,
    pub well_id: String,
    pub name: String,
    #[serde(default)]
    pub unit_system: UnitSystem,
    #[serde(default)]
    pub components: Vec<BhaComponent>,

    #[serde(default)]
    pub recommended_wob: Option<f64>,
    #[serde(default)]
    pub recommended_rpm: Option<f64>,
    #[serde(default)]
    pub recommended_flow_rate: Option<f64>,

    #[serde(default = "Utc::now")]
    pub created_date: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_date: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl Bha {
    pub fn new(well_id: impl Into<String>, name: impl Into<String>, unit_system: UnitSystem) -> Self {
        let now = Utc::now();
        Self {
            bha_id: new_id(),
            well_id: well_id.into(),
            name: name.into(),
            unit_system,
            components: Vec::new(),
            recommended_wob: None,
            recommended_rpm: None,
            recommended_flow_rate: None,
            created_date: now,
            updated_date: now,
            created_by: None,
            comments: None,
        }
    }

    /// Insert a component, keeping the stack ordered from the bit up.
    pub fn add_component(&mut self, component: BhaComponent) {
        let idx = self
            .components
            .partition_point(|c| c.position_from_bit <= component.position_from_bit);
        self.components.insert(idx, component);
        self.updated_date = Utc::now();
    }

    /// Re-establish bit-up ordering after deserialisation.
    pub fn sort_components(&mut self) {
        self.components
            .sort_by(|a, b| a.position_from_bit.total_cmp(&b.position_from_bit));
    }

    pub fn total_length(&self) -> f64 {
        self.components.iter().map(|c| c.length).sum()
    }

    pub fn total_weight(&self) -> f64 {
        self.components.iter().filter_map(|c| c.weight).sum()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_name("name", &self.name)?;
        if self.well_id.trim().is_empty() {
            return Err(ModelError::invalid("well_id", "must not be empty"));
        }
        check_positive("recommended_wob", self.recommended_wob)?;
        check_positive("recommended_rpm", self.recommended_rpm)?;
        check_positive("recommended_flow_rate", self.recommended_flow_rate)?;
        for c in &self.components {
            c.validate()?;
        }
        Ok(())
    }
}

//! Drilling parameter records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_non_negative, ModelError, UnitSystem};

/// Drilling parameters sampled at a measured depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillingParameters {
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub md: f64,

    /// Weight on bit
    #[serde(default)]
    pub wob: Option<f64>,
    /// Surface torque
    #[serde(default)]
    pub torque: Option<f64>,
    /// Rotary speed
    #[serde(default)]
    pub rpm: Option<f64>,
    #[serde(default)]
    pub flow_rate: Option<f64>,
    /// Standpipe pressure
    #[serde(default)]
    pub spp: Option<f64>,
    /// Rate of penetration
    #[serde(default)]
    pub rop: Option<f64>,

    #[serde(default)]
    pub hookload: Option<f64>,
    #[serde(default)]
    pub block_height: Option<f64>,
    #[serde(default)]
    pub pump_pressure: Option<f64>,

    #[serde(default)]
    pub gamma_ray: Option<f64>,
    #[serde(default)]
    pub resistivity: Option<f64>,

    #[serde(default)]
    pub data_quality: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl DrillingParameters {
    pub fn at_depth(md: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            md,
            wob: None,
            torque: None,
            rpm: None,
            flow_rate: None,
            spp: None,
            rop: None,
            hookload: None,
            block_height: None,
            pump_pressure: None,
            gamma_ray: None,
            resistivity: None,
            data_quality: None,
            comments: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_non_negative("md", Some(self.md))?;
        check_non_negative("wob", self.wob)?;
        check_non_negative("torque", self.torque)?;
        check_non_negative("rpm", self.rpm)?;
        check_non_negative("flow_rate", self.flow_rate)?;
        check_non_negative("spp", self.spp)?;
        check_non_negative("rop", self.rop)?;
        check_non_negative("hookload", self.hookload)?;
        check_non_negative("pump_pressure", self.pump_pressure)?;
        check_non_negative("gamma_ray", self.gamma_ray)?;
        check_non_negative("resistivity", self.resistivity)?;
        Ok(())
    }
}

/// Chronological drilling parameter log for one well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillingLog {
    pub well_id: String,
    #[serde(default)]
    pub unit_system: UnitSystem,
    #[serde(default)]
    pub entries: Vec<DrillingParameters>,
    #[serde(default = "Utc::now")]
    pub created_date: DateTime<Utc>,
}

impl DrillingLog {
    pub fn new(well_id: impl Into<String>, unit_system: UnitSystem) -> Self {
        Self {
            well_id: well_id.into(),
            unit_system,
            entries: Vec::new(),
            created_date: Utc::now(),
        }
    }

    pub fn push(&mut self, params: DrillingParameters) {
        self.entries.push(params);
    }

    /// Entry with the newest timestamp.
    pub fn latest(&self) -> Option<&DrillingParameters> {
        self.entries.iter().max_by_key(|p| p.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_latest_uses_timestamp_not_insertion_order() {
        let mut log = DrillingLog::new("well-1", UnitSystem::Imperial);
        let now = Utc::now();

        let mut newer = DrillingParameters::at_depth(5_000.0);
        newer.timestamp = now;
        newer.rop = Some(45.5);
        let mut older = DrillingParameters::at_depth(5_100.0);
        older.timestamp = now - Duration::minutes(10);

        log.push(newer);
        log.push(older);

        let latest = log.latest().unwrap();
        assert_eq!(latest.rop, Some(45.5));
    }

    #[test]
    fn test_empty_log_has_no_latest() {
        let log = DrillingLog::new("well-1", UnitSystem::Metric);
        assert!(log.latest().is_none());
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut p = DrillingParameters::at_depth(1_000.0);
        p.wob = Some(-1.0);
        assert!(p.validate().is_err());
        p.wob = Some(25_000.0);
        p.block_height = Some(-3.0);
        assert!(p.validate().is_ok());
    }
}

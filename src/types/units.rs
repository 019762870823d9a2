//! Unit systems and trajectory calculation methods

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit system used for depths and dogleg normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    #[default]
    Imperial,
}

impl UnitSystem {
    pub const ALL: [Self; 2] = [Self::Imperial, Self::Metric];

    /// Course length that dogleg severity and build/turn rates are
    /// normalised to: 30 m or 100 ft.
    pub fn course_length(self) -> f64 {
        match self {
            Self::Metric => 30.0,
            Self::Imperial => 100.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Rate label, e.g. `°/100ft`.
    pub fn rate_label(self) -> &'static str {
        match self {
            Self::Metric => "°/30m",
            Self::Imperial => "°/100ft",
        }
    }

    pub fn length_label(self) -> &'static str {
        match self {
            Self::Metric => "m",
            Self::Imperial => "ft",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Metric => "Metric",
            Self::Imperial => "Imperial",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Imperial => "Feet and degrees per 100ft for dogleg severity",
            Self::Metric => "Meters and degrees per 30m for dogleg severity",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(format!(
                "Unit system must be one of: [\"imperial\", \"metric\"] (got \"{other}\")"
            )),
        }
    }
}

/// Trajectory calculation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    #[default]
    MinimumCurvature,
    RadiusOfCurvature,
    Tangential,
    BalancedTangential,
}

impl CalculationMethod {
    pub const ALL: [Self; 4] = [
        Self::MinimumCurvature,
        Self::RadiusOfCurvature,
        Self::Tangential,
        Self::BalancedTangential,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MinimumCurvature => "minimum_curvature",
            Self::RadiusOfCurvature => "radius_of_curvature",
            Self::Tangential => "tangential",
            Self::BalancedTangential => "balanced_tangential",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::MinimumCurvature => "Minimum Curvature",
            Self::RadiusOfCurvature => "Radius Of Curvature",
            Self::Tangential => "Tangential",
            Self::BalancedTangential => "Balanced Tangential",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::MinimumCurvature => "Industry standard method providing highest accuracy",
            Self::RadiusOfCurvature => "Alternative method using radius of curvature assumptions",
            Self::Tangential => "Simple method using upper survey point angles",
            Self::BalancedTangential => "Improved tangential method using averaged angles",
        }
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown method: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_lengths() {
        assert_eq!(UnitSystem::Imperial.course_length(), 100.0);
        assert_eq!(UnitSystem::Metric.course_length(), 30.0);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(
            "balanced_tangential".parse::<CalculationMethod>(),
            Ok(CalculationMethod::BalancedTangential)
        );
        let err = "spline".parse::<CalculationMethod>().unwrap_err();
        assert_eq!(err, "Unknown method: spline");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&CalculationMethod::RadiusOfCurvature).unwrap();
        assert_eq!(json, "\"radius_of_curvature\"");
        let units: UnitSystem = serde_json::from_str("\"metric\"").unwrap();
        assert_eq!(units, UnitSystem::Metric);
    }
}

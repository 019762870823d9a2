//! Shared data structures for directional drilling
//!
//! This module defines the domain model used by the trajectory engine,
//! storage, reporting and the HTTP API:
//! - Units and calculation methods
//! - Survey stations and calculated wellpath points
//! - Wells, projects, BHAs and drilling parameter logs

mod units;
mod survey;
mod well;
mod bha;
mod params;
mod project;

pub use units::*;
pub use survey::*;
pub use well::*;
pub use bha::*;
pub use params::*;
pub use project::*;

/// Validation failure on a domain model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("{field}: {message}")]
    Invalid { field: String, message: String },
    #[error("Measured depth must be monotonically increasing at point {index}")]
    NonMonotonicDepth { index: usize },
}

impl ModelError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Check a required display name (1..=100 characters after trimming).
pub(crate) fn check_name(field: &str, value: &str) -> Result<(), ModelError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(ModelError::invalid(field, "must not be empty"));
    }
    if len > 100 {
        return Err(ModelError::invalid(field, "must be at most 100 characters"));
    }
    Ok(())
}

/// Check an optional value that must be strictly positive when present.
pub(crate) fn check_positive(field: &str, value: Option<f64>) -> Result<(), ModelError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => {
            Err(ModelError::invalid(field, format!("must be > 0 (got {v})")))
        }
        _ => Ok(()),
    }
}

/// Check an optional value that must be zero or positive when present.
pub(crate) fn check_non_negative(field: &str, value: Option<f64>) -> Result<(), ModelError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(ModelError::invalid(field, format!("must be >= 0 (got {v})")))
        }
        _ => Ok(()),
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

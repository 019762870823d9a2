//! API route handlers
//!
//! - `info`: liveness, health and service description
//! - `calculations`: stateless trajectory calculations
//! - `data`: projects, wells, surveys, BHAs and drilling parameters
//! - `reports`: survey, BHA, trajectory, daily and final well reports

pub mod calculations;
pub mod data;
mod info;
pub mod reports;

pub use info::*;

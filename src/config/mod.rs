//! Service Configuration Module
//!
//! Provides the service configuration loaded from TOML, covering the HTTP
//! server, API key auth, trajectory engine thresholds and storage.
//!
//! ## Loading Order
//!
//! 1. `WORMDRILLER_CONFIG` environment variable (path to TOML file)
//! 2. `wormdriller.toml` in the current working directory
//! 3. Built-in defaults
//!
//! `WORMDRILLER_ADDR` and `WORMDRILLER_API_KEY` are applied on top.
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(ServiceConfig::load());
//!
//! // Anywhere in the codebase:
//! let threshold = config::get().engine.high_dls_threshold;
//! ```

mod service_config;
pub mod defaults;
pub mod validation;

pub use service_config::*;

use std::sync::OnceLock;

/// Global service configuration, initialized once at startup.
static SERVICE_CONFIG: OnceLock<ServiceConfig> = OnceLock::new();

/// Initialize the global service configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: ServiceConfig) {
    if SERVICE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get the global service configuration, or the built-in defaults when
/// `init()` has not run (library use and tests).
pub fn get() -> &'static ServiceConfig {
    SERVICE_CONFIG.get_or_init(ServiceConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    SERVICE_CONFIG.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_falls_back_to_defaults() {
        // Nothing in the library test suite calls init()
        let cfg = get();
        assert!(is_initialized());
        assert_eq!(cfg.server.addr, defaults::SERVER_ADDR);
        assert!(!cfg.auth.require_api_key);
    }
}

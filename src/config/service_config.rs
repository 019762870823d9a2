//! Service Configuration - server, auth, engine and storage settings as TOML
//!
//! Every section implements `Default`, so a missing file or a partial file
//! always yields a usable configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::defaults;
use crate::types::{CalculationMethod, UnitSystem};

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "WORMDRILLER_CONFIG";
/// Environment override for `server.addr`.
pub const ADDR_ENV: &str = "WORMDRILLER_ADDR";
/// Environment override adding an API key and turning auth on.
pub const API_KEY_ENV: &str = "WORMDRILLER_API_KEY";

const LOCAL_CONFIG_FILE: &str = "wormdriller.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a service deployment.
///
/// Load with `ServiceConfig::load()` which searches:
/// 1. `$WORMDRILLER_CONFIG` env var
/// 2. `./wormdriller.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub service: ServiceInfo,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Trajectory engine defaults and thresholds
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl ServiceConfig {
    /// Load configuration using the standard search order, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_file_or_default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn load_file_or_default() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded service config from {CONFIG_ENV}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV} points to non-existent file, falling back");
            }
        }

        // 2. Check ./wormdriller.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded service config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged, not rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;

        for w in super::validation::validate_ranges(&config) {
            warn!("{}", w);
        }
        Ok(config)
    }

    /// Apply `WORMDRILLER_ADDR` / `WORMDRILLER_API_KEY` style overrides.
    ///
    /// `lookup` maps a variable name to its value; `load()` passes the
    /// process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ADDR_ENV).filter(|v| !v.trim().is_empty()) {
            info!(addr = %addr, "Server address overridden from {ADDR_ENV}");
            self.server.addr = addr.trim().to_string();
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            let key = key.trim().to_string();
            if !self.auth.api_keys.contains(&key) {
                self.auth.api_keys.push(key);
            }
            self.auth.require_api_key = true;
        }
    }

    /// Validate the whole configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.service.name.trim().is_empty() {
            errors.push("service.name must not be empty".to_string());
        }

        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr = '{}' is not a valid socket address",
                self.server.addr
            ));
        }
        if self.server.max_body_bytes == 0 {
            errors.push("server.max_body_bytes must be > 0".to_string());
        }

        if self.auth.require_api_key && self.auth.api_keys.iter().all(|k| k.trim().is_empty()) {
            errors.push("auth.require_api_key is set but auth.api_keys is empty".to_string());
        }

        let e = &self.engine;
        Self::check_positive(e.tolerance, "engine.tolerance", &mut errors);
        Self::check_positive(e.high_dls_threshold, "engine.high_dls_threshold", &mut errors);
        Self::check_positive(e.close_station_warning, "engine.close_station_warning", &mut errors);
        if !e.large_inc_range_warning.is_finite()
            || e.large_inc_range_warning <= 0.0
            || e.large_inc_range_warning > 180.0
        {
            errors.push(format!(
                "engine.large_inc_range_warning = {} must be in (0, 180]",
                e.large_inc_range_warning
            ));
        }
        if e.max_projection_steps == 0 {
            errors.push("engine.max_projection_steps must be >= 1".to_string());
        }

        if self.storage.data_dir.as_os_str().is_empty() {
            errors.push("storage.data_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, so check finiteness first
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} = {value} must be a finite value > 0"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({path}): {1}", path = .0.display())]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config parse error ({path}): {1}", path = .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Config validation failed:\n{}", format_errors(.0))]
    Validation(Vec<String>),
}

fn format_errors(errors: &[String]) -> String {
    errors.iter().map(|e| format!("  - {e}\n")).collect()
}

// ============================================================================
// Service Info
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Identification and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Deployment environment label (development, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Enables debug-level logging when `RUST_LOG` is unset
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_service_name() -> String {
    defaults::SERVICE_NAME.to_string()
}
fn default_environment() -> String {
    defaults::ENVIRONMENT.to_string()
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            environment: default_environment(),
            debug: false,
            log_format: LogFormat::default(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `WORMDRILLER_ADDR` or the `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// CORS origins. Empty means same-origin only; `"*"` allows any.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}
fn default_max_body_bytes() -> usize {
    defaults::MAX_BODY_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            allowed_origins: Vec::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require `X-API-Key` on `/api/v1` routes
    #[serde(default)]
    pub require_api_key: bool,

    #[serde(default)]
    pub api_keys: Vec<String>,
}

impl AuthConfig {
    pub fn accepts(&self, key: &str) -> bool {
        self.api_keys.iter().any(|k| k == key)
    }
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub default_method: CalculationMethod,

    #[serde(default)]
    pub default_unit_system: UnitSystem,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default = "default_high_dls")]
    pub high_dls_threshold: f64,

    #[serde(default = "default_close_station")]
    pub close_station_warning: f64,

    #[serde(default = "default_large_inc_range")]
    pub large_inc_range_warning: f64,

    #[serde(default = "default_max_projection_steps")]
    pub max_projection_steps: usize,
}

fn default_tolerance() -> f64 { defaults::TOLERANCE }
fn default_high_dls() -> f64 { defaults::HIGH_DLS_THRESHOLD }
fn default_close_station() -> f64 { defaults::CLOSE_STATION_WARNING }
fn default_large_inc_range() -> f64 { defaults::LARGE_INC_RANGE_WARNING }
fn default_max_projection_steps() -> usize { defaults::MAX_PROJECTION_STEPS }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_method: CalculationMethod::default(),
            default_unit_system: UnitSystem::default(),
            tolerance: default_tolerance(),
            high_dls_threshold: default_high_dls(),
            close_station_warning: default_close_station(),
            large_inc_range_warning: default_large_inc_range(),
            max_projection_steps: default_max_projection_steps(),
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sled,
    Memory,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sled => "sled",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub backend: StorageBackend,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(defaults::DATA_DIR)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: StorageBackend::default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.addr, "0.0.0.0:8000");
        assert_eq!(config.engine.default_method, CalculationMethod::MinimumCurvature);
        assert_eq!(config.storage.backend, StorageBackend::Sled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = ServiceConfig::from_toml_str(
            r#"
[engine]
default_unit_system = "metric"
high_dls_threshold = 4.5

[storage]
backend = "memory"
"#,
        )
        .unwrap();
        assert_eq!(config.engine.default_unit_system, UnitSystem::Metric);
        assert_eq!(config.engine.high_dls_threshold, 4.5);
        assert_eq!(config.engine.max_projection_steps, 1_000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.service.log_format, LogFormat::Text);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.server.addr = "not-an-address".to_string();
        config.engine.tolerance = f64::NAN;
        config.auth.require_api_key = true;

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 3, "{errors:?}");
                assert!(errors.iter().any(|e| e.contains("server.addr")));
                assert!(errors.iter().any(|e| e.contains("engine.tolerance")));
                assert!(errors.iter().any(|e| e.contains("auth.api_keys")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = ServiceConfig::from_toml_str("[server\naddr = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(..)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ADDR_ENV, "127.0.0.1:9000"),
            (API_KEY_ENV, "secret-key"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert!(config.auth.require_api_key);
        assert!(config.auth.accepts("secret-key"));
        assert!(!config.auth.accepts("other"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wormdriller.toml");
        std::fs::write(&path, "[server]\naddr = \"127.0.0.1:8100\"\n").unwrap();
        let config = ServiceConfig::load_from_file(&path).unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:8100");

        let missing = ServiceConfig::load_from_file(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(..))));
    }
}

//! Config Validation Tests
//!
//! Typo detection, range warnings and hard validation of the service
//! configuration, exercised independently from the server.

use wormdriller::config::validation::{known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys};
use wormdriller::config::{ConfigError, LogFormat, ServiceConfig, StorageBackend};
use wormdriller::types::{CalculationMethod, UnitSystem};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_engine_section_warns_with_suggestion() {
    let toml_str = r#"
[engine]
tolerence = 1e-9
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("tolerence"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("engine.tolerance"));
}

#[test]
fn unknown_section_warns_without_close_match() {
    let warnings = validate_unknown_keys("[telemetry]\nendpoint = \"x\"\n");
    assert!(!warnings.is_empty());
    assert!(warnings.iter().any(|w| w.field == "telemetry"));
}

#[test]
fn far_off_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("server.completely_unrelated", &known).is_none());
}

#[test]
fn shipped_sample_config_is_clean() {
    let contents = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/wormdriller.toml")).unwrap();
    assert!(validate_unknown_keys(&contents).is_empty());

    let cfg = ServiceConfig::from_toml_str(&contents).unwrap();
    assert_eq!(cfg.server.addr, "0.0.0.0:8000");
    assert_eq!(cfg.engine.default_method, CalculationMethod::MinimumCurvature);
    assert_eq!(cfg.engine.default_unit_system, UnitSystem::Imperial);
    assert_eq!(cfg.storage.backend, StorageBackend::Sled);
    assert_eq!(cfg.service.log_format, LogFormat::Text);
}

// ============================================================================
// Range Warnings and Validation
// ============================================================================

#[test]
fn production_without_auth_warns() {
    let cfg = ServiceConfig::from_toml_str("[service]\nenvironment = \"production\"\n").unwrap();
    let warnings = validate_ranges(&cfg);
    assert!(warnings.iter().any(|w| w.field == "auth.require_api_key"));
}

#[test]
fn auth_required_without_keys_is_rejected() {
    let err = ServiceConfig::from_toml_str("[auth]\nrequire_api_key = true\n").unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("auth.api_keys is empty")));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn every_problem_is_reported_at_once() {
    let toml_str = r#"
[server]
addr = "not-an-address"

[engine]
tolerance = -1.0
max_projection_steps = 0
"#;
    let Err(ConfigError::Validation(errors)) = ServiceConfig::from_toml_str(toml_str) else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 3, "{errors:?}");
}

#[test]
fn env_overrides_turn_on_auth() {
    let mut cfg = ServiceConfig::default();
    cfg.apply_overrides(|key| match key {
        "WORMDRILLER_ADDR" => Some("127.0.0.1:9000".to_string()),
        "WORMDRILLER_API_KEY" => Some(" token ".to_string()),
        _ => None,
    });
    assert_eq!(cfg.server.addr, "127.0.0.1:9000");
    assert!(cfg.auth.require_api_key);
    assert!(cfg.auth.accepts("token"));
    assert!(cfg.validate().is_ok());
}

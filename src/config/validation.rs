//! Config validation: unknown-key detection with Levenshtein suggestions
//! and suspicious-value warnings.
//!
//! Raw TOML is walked as `toml::Value` before serde deserialization so that
//! typos surface as warnings with "did you mean" hints instead of being
//! silently dropped.

use std::collections::HashSet;

use super::ServiceConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of `ServiceConfig`.
///
/// Kept in step with the structs in service_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [service]
        "service",
        "service.name",
        "service.environment",
        "service.debug",
        "service.log_format",
        // [server]
        "server",
        "server.addr",
        "server.allowed_origins",
        "server.max_body_bytes",
        // [auth]
        "auth",
        "auth.require_api_key",
        "auth.api_keys",
        // [engine]
        "engine",
        "engine.default_method",
        "engine.default_unit_system",
        "engine.tolerance",
        "engine.high_dls_threshold",
        "engine.close_station_warning",
        "engine.large_inc_range_warning",
        "engine.max_projection_steps",
        // [storage]
        "storage",
        "storage.data_dir",
        "storage.backend",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect the dotted key paths of a TOML table.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        // Tie-break on the key so the suggestion is deterministic
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation
// ============================================================================

/// Warnings for unknown keys in raw TOML. Never fails; parse errors are
/// left to serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Warnings
// ============================================================================

/// Values that are valid but unusual enough to flag at startup.
pub fn validate_ranges(config: &ServiceConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let dls = config.engine.high_dls_threshold;
    if dls > 30.0 {
        warnings.push(ValidationWarning {
            field: "engine.high_dls_threshold".to_string(),
            message: format!("high_dls_threshold = {dls:.1} is above typical range (0-30 deg/course)"),
            suggestion: None,
        });
    }

    if config.engine.tolerance > 1e-4 {
        warnings.push(ValidationWarning {
            field: "engine.tolerance".to_string(),
            message: format!(
                "tolerance = {:e} is large enough to treat real doglegs as straight",
                config.engine.tolerance
            ),
            suggestion: None,
        });
    }

    if config.service.environment == "production" && !config.auth.require_api_key {
        warnings.push(ValidationWarning {
            field: "auth.require_api_key".to_string(),
            message: "production environment without API key authentication".to_string(),
            suggestion: None,
        });
    }

    if config.service.environment == "production" && config.service.debug {
        warnings.push(ValidationWarning {
            field: "service.debug".to_string(),
            message: "debug logging enabled in production".to_string(),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("hello", "hello"), 0);
        assert_eq!(levenshtein("tolerence", "tolerance"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [engine]
            tolerance = 1e-10
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"engine".to_string()));
        assert!(keys.contains(&"engine.tolerance".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys("[engine]\nhigh_dls_treshold = 4.0\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "engine.high_dls_treshold");
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("engine.high_dls_threshold")
        );
        assert!(warnings[0].to_string().contains("did you mean"));
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[service]
name = "WormDriller"
log_format = "json"

[server]
addr = "0.0.0.0:8000"
allowed_origins = ["http://localhost:3000"]

[auth]
require_api_key = true
api_keys = ["abc"]

[storage]
backend = "sled"
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");
    }

    #[test]
    fn test_garbage_key_has_no_suggestion() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_range_warnings() {
        let mut config = ServiceConfig::default();
        assert!(validate_ranges(&config).is_empty());

        config.service.environment = "production".to_string();
        config.engine.high_dls_threshold = 45.0;
        let warnings = validate_ranges(&config);
        assert!(warnings.iter().any(|w| w.field == "engine.high_dls_threshold"));
        assert!(warnings.iter().any(|w| w.field == "auth.require_api_key"));
    }
}

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::config::defaults;

#[derive(Debug, Clone)]
struct CachedEntry {
    value: Value,
    stored_at: Instant,
}

/// Keyed cache of API responses with per-entry age checks.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: HashMap<String, CachedEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_max_age() -> Duration {
        Duration::from_secs(defaults::CACHE_MAX_AGE_SECS)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(
            key.into(),
            CachedEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Cached value regardless of age.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// True when `key` is cached and younger than `max_age`.
    pub fn is_valid(&self, key: &str, max_age: Duration) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.stored_at.elapsed() < max_age)
    }

    /// Cached value if still younger than `max_age`.
    pub fn get_fresh(&self, key: &str, max_age: Duration) -> Option<&Value> {
        if self.is_valid(key, max_age) {
            self.get(key)
        } else {
            None
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key).map(|e| e.value)
    }

    /// Drop entries older than `max_age`, returning how many were removed.
    pub fn evict_expired(&mut self, max_age: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.stored_at.elapsed() < max_age);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_entry_is_valid() {
        let mut cache = ResponseCache::new();
        cache.insert("methods", json!({"default_method": "minimum_curvature"}));
        assert!(cache.is_valid("methods", ResponseCache::default_max_age()));
        assert!(!cache.is_valid("missing", ResponseCache::default_max_age()));
        assert_eq!(
            cache.get_fresh("methods", Duration::from_secs(60)).unwrap()["default_method"],
            "minimum_curvature"
        );
    }

    #[test]
    fn test_zero_max_age_expires_everything() {
        let mut cache = ResponseCache::new();
        cache.insert("a", json!(1));
        cache.insert("b", json!(2));
        assert!(!cache.is_valid("a", Duration::ZERO));
        assert!(cache.get_fresh("a", Duration::ZERO).is_none());
        assert_eq!(cache.get("a"), Some(&json!(1)));

        assert_eq!(cache.evict_expired(Duration::ZERO), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut cache = ResponseCache::new();
        cache.insert("k", json!("v"));
        assert_eq!(cache.remove("k"), Some(json!("v")));
        assert_eq!(cache.len(), 0);
    }
}

//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`AurisSettings::default()`]
//! 2. If `~/.auris/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::AurisSettings;

/// Resolve the path to the settings file (`~/.auris/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".auris").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<AurisSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<AurisSettings> {
    let defaults = serde_json::to_value(AurisSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: AurisSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules; invalid values are logged and
/// ignored (fall back to file/default).
pub fn apply_env_overrides(settings: &mut AurisSettings) {
    if let Some(v) = read_env_string("AURIS_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16("AURIS_PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = read_env_string("AURIS_CORS_ORIGIN") {
        settings.server.cors_origin = v;
    }
    if let Some(v) = read_env_usize("AURIS_MAX_UPLOAD_BYTES", 1024, 1_073_741_824) {
        settings.server.max_upload_bytes = v;
    }
    if let Some(v) = read_env_u64("AURIS_REQUEST_TIMEOUT_MS", 1000, 3_600_000) {
        settings.server.request_timeout_ms = v;
    }
    if let Some(v) = read_env_string("AURIS_MODEL_DIR") {
        settings.model.dir = Some(v);
    }
    if let Some(v) = read_env_bool("AURIS_AUTO_DOWNLOAD") {
        settings.model.auto_download = v;
    }
    if let Some(v) = read_env_string("AURIS_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_scalar() {
        let merged = deep_merge(
            serde_json::json!({"a": 1, "b": 2}),
            serde_json::json!({"b": 3}),
        );
        assert_eq!(merged, serde_json::json!({"a": 1, "b": 3}));
    }

    #[test]
    fn merge_recurses_into_objects() {
        let merged = deep_merge(
            serde_json::json!({"server": {"host": "127.0.0.1", "port": 8490}}),
            serde_json::json!({"server": {"port": 9000}}),
        );
        assert_eq!(merged["server"]["host"], "127.0.0.1");
        assert_eq!(merged["server"]["port"], 9000);
    }

    #[test]
    fn merge_skips_nulls() {
        let merged = deep_merge(
            serde_json::json!({"a": 1}),
            serde_json::json!({"a": null, "b": 2}),
        );
        assert_eq!(merged, serde_json::json!({"a": 1, "b": 2}));
    }

    #[test]
    fn merge_replaces_arrays() {
        let merged = deep_merge(
            serde_json::json!({"xs": [1, 2, 3]}),
            serde_json::json!({"xs": [9]}),
        );
        assert_eq!(merged, serde_json::json!({"xs": [9]}));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(settings.server.port, AurisSettings::default().server.port);
    }

    #[test]
    fn file_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server":{"port":9999,"corsOrigin":"http://example.com"}}"#,
        )
        .unwrap();
        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.server.port, 9999);
        assert_eq!(settings.server.cors_origin, "http://example.com");
        // Untouched keys keep their defaults
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn invalid_json_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn parse_bool_accepted_spellings() {
        for v in ["true", "1", "yes", "on", "TRUE", "On"] {
            assert_eq!(parse_bool(v), Some(true), "value: {v}");
        }
        for v in ["false", "0", "no", "off", "False"] {
            assert_eq!(parse_bool(v), Some(false), "value: {v}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn parse_u16_range_bounds() {
        assert_eq!(parse_u16_range("80", 1, 65535), Some(80));
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u16_range("notanumber", 1, 65535), None);
    }

    #[test]
    fn parse_u64_range_bounds() {
        assert_eq!(parse_u64_range("5000", 1000, 3_600_000), Some(5000));
        assert_eq!(parse_u64_range("1", 1000, 3_600_000), None);
    }

    #[test]
    fn parse_usize_range_bounds() {
        assert_eq!(parse_usize_range("2048", 1024, 1_073_741_824), Some(2048));
        assert_eq!(parse_usize_range("10", 1024, 1_073_741_824), None);
    }

    #[test]
    fn settings_path_under_auris_dir() {
        let path = settings_path();
        let s = path.to_string_lossy();
        assert!(s.contains(".auris"), "got: {s}");
        assert!(s.ends_with("settings.json"), "got: {s}");
    }
}

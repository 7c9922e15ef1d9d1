//! Settings schema with per-section defaults.

use serde::{Deserialize, Serialize};

/// Root settings document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AurisSettings {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Transcription model settings.
    pub model: ModelSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Server network and request-handling settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Port to bind (0 for auto-assign).
    pub port: u16,
    /// The single frontend origin allowed by the CORS policy.
    pub cors_origin: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Deadline for decoding + analysis + transcription of one request.
    pub request_timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8490,
            cors_origin: "http://localhost:3000".into(),
            max_upload_bytes: 50 * 1024 * 1024, // 50 MB
            request_timeout_ms: 120_000,
        }
    }
}

/// Transcription model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Model directory. `None` uses the default cache under `~/.auris`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Whether to download missing model files at startup.
    pub auto_download: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            dir: None,
            auto_download: true,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = AurisSettings::default();
        assert_eq!(s.server.host, "127.0.0.1");
        assert_eq!(s.server.port, 8490);
        assert_eq!(s.server.cors_origin, "http://localhost:3000");
        assert_eq!(s.server.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(s.server.request_timeout_ms, 120_000);
        assert!(s.model.dir.is_none());
        assert!(s.model.auto_download);
        assert_eq!(s.logging.level, "info");
    }

    #[test]
    fn serde_roundtrip() {
        let s = AurisSettings::default();
        let json = serde_json::to_string(&s).unwrap();
        let back: AurisSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.server.port, s.server.port);
        assert_eq!(back.server.cors_origin, s.server.cors_origin);
        assert_eq!(back.model.auto_download, s.model.auto_download);
    }

    #[test]
    fn camel_case_on_disk() {
        let s = AurisSettings::default();
        let json = serde_json::to_value(&s).unwrap();
        assert!(json["server"].get("corsOrigin").is_some());
        assert!(json["server"].get("maxUploadBytes").is_some());
        assert!(json["model"].get("autoDownload").is_some());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let s: AurisSettings = serde_json::from_str(r#"{"server":{"port":9000}}"#).unwrap();
        assert_eq!(s.server.port, 9000);
        assert_eq!(s.server.host, "127.0.0.1");
        assert!(s.model.auto_download);
    }
}

//! Server configuration.

use auris_settings::ServerSettings;
use serde::{Deserialize, Serialize};

/// Configuration for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// The single frontend origin allowed by the CORS policy.
    pub cors_origin: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Deadline for one request's decode + analysis + transcription.
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origin: "http://localhost:3000".into(),
            max_upload_bytes: 50 * 1024 * 1024, // 50 MB
            request_timeout_ms: 120_000,
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            cors_origin: settings.cors_origin.clone(),
            max_upload_bytes: settings.max_upload_bytes,
            request_timeout_ms: settings.request_timeout_ms,
        }
    }
}

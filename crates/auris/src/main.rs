//! # auris
//!
//! Audio analysis server binary — loads settings, bootstraps the
//! transcription model, and serves the HTTP API until ctrl-c.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use auris_server::{AurisServer, ServerConfig};
use auris_transcription::{model, SpeechRecognizer, TranscriptionEngine};
use clap::Parser;
use tracing::{info, warn};

/// Audio analysis server: transcription + noise level.
#[derive(Parser, Debug)]
#[command(name = "auris", about = "Audio analysis server: transcription + noise level")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Model directory (overrides settings).
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Path to the settings file (default `~/.auris/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Never download model files, even if settings allow it.
    #[arg(long)]
    no_download: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(auris_settings::settings_path);
    let settings = auris_settings::load_settings_from_path(&settings_path)
        .context("Failed to load settings")?;

    init_tracing(&settings.logging.level);

    let mut config = ServerConfig::from(&settings.server);
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let model_dir = args
        .model_dir
        .or_else(|| settings.model.dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(model::default_model_dir);
    let auto_download = settings.model.auto_download && !args.no_download;

    let recognizer = load_recognizer(&model_dir, auto_download).await;

    let server = AurisServer::new(config, recognizer);
    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    info!("auris listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("shutting down...");
    server.shutdown().shutdown();
    let _ = handle.await;
    info!("shutdown complete");
    Ok(())
}

/// Bootstrap the transcription engine, downloading model files if allowed.
///
/// Returns `None` when the model cannot be made available; the server still
/// starts and `/analyze` reports 503 until a restart with the model present.
async fn load_recognizer(
    model_dir: &Path,
    auto_download: bool,
) -> Option<Arc<dyn SpeechRecognizer>> {
    if !model::is_model_cached(model_dir) {
        if !auto_download {
            warn!(
                "model not cached at {} and downloads are disabled — transcription unavailable",
                model_dir.display()
            );
            return None;
        }
        if let Err(e) = model::ensure_model(model_dir).await {
            warn!(error = %e, "model download failed — transcription unavailable");
            return None;
        }
    }

    match TranscriptionEngine::load(model_dir.to_path_buf()).await {
        Ok(engine) => {
            info!("transcription engine ready");
            Some(Arc::new(engine))
        }
        Err(e) => {
            warn!(error = %e, "failed to load transcription engine");
            None
        }
    }
}

/// Install the fmt subscriber; `RUST_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_settings_values() {
        let cli = Cli::parse_from(["auris"]);
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.model_dir.is_none());
        assert!(cli.settings.is_none());
        assert!(!cli.no_download);
    }

    #[test]
    fn cli_custom_host_and_port() {
        let cli = Cli::parse_from(["auris", "--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(8080));
    }

    #[test]
    fn cli_model_dir() {
        let cli = Cli::parse_from(["auris", "--model-dir", "/tmp/models"]);
        assert_eq!(cli.model_dir, Some(PathBuf::from("/tmp/models")));
    }

    #[test]
    fn cli_no_download_flag() {
        let cli = Cli::parse_from(["auris", "--no-download"]);
        assert!(cli.no_download);
    }

    #[tokio::test]
    async fn recognizer_absent_without_model_or_download() {
        let tmp = std::env::temp_dir().join("auris-test-empty-model-dir");
        let recognizer = load_recognizer(&tmp, false).await;
        assert!(recognizer.is_none());
    }
}

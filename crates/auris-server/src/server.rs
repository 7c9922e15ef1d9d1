//! `AurisServer` — router construction, CORS policy, and the listen loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use auris_transcription::SpeechRecognizer;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderValue;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::analyze;
use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Allowance on top of the upload cap for multipart framing bytes.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide speech recognizer, absent when no model is loaded.
    pub recognizer: Option<Arc<dyn SpeechRecognizer>>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// When the server started.
    pub start_time: Instant,
}

/// The audio analysis HTTP server.
pub struct AurisServer {
    config: ServerConfig,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl AurisServer {
    /// Create a new server around an optional recognizer.
    pub fn new(config: ServerConfig, recognizer: Option<Arc<dyn SpeechRecognizer>>) -> Self {
        Self {
            config,
            recognizer,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes and layers.
    pub fn router(&self) -> Router {
        let state = AppState {
            recognizer: self.recognizer.clone(),
            config: Arc::new(self.config.clone()),
            start_time: self.start_time,
        };

        Router::new()
            .route("/analyze", post(analyze::analyze_handler))
            .route("/health", get(health_handler))
            .layer(DefaultBodyLimit::max(
                self.config.max_upload_bytes + MULTIPART_OVERHEAD,
            ))
            .layer(cors_layer(&self.config.cors_origin))
            .with_state(state)
    }

    /// Bind the configured address and serve until shutdown.
    ///
    /// Returns the bound address (useful with port 0) and the join handle of
    /// the serving task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "server error");
            }
        });

        info!(%addr, "auris server listening");
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// CORS policy: only the configured frontend origin, all methods and headers.
fn cors_layer(origin: &str) -> CorsLayer {
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!(origin, "invalid CORS origin, cross-origin requests disabled");
            CorsLayer::new()
        }
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.recognizer.is_some(),
    ))
}

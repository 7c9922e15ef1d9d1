//! # auris-server
//!
//! Axum HTTP server for the audio analysis service.
//!
//! - `POST /analyze` — multipart audio upload → transcription + noise report
//! - `GET /health` — liveness, uptime, model status
//! - CORS restricted to the single configured frontend origin
//! - Upload size cap and per-request processing deadline
//! - Graceful shutdown via `CancellationToken`

pub mod analyze;
pub mod config;
pub mod error;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, AurisServer};
pub use shutdown::ShutdownCoordinator;

//! `POST /analyze` — the upload → transcription + noise pipeline.

use std::time::Duration;

use auris_audio::{decode_waveform, Waveform};
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::response::Json;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::server::AppState;

/// Success body of `POST /analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    /// Text produced by the speech-recognition model.
    pub transcription: String,
    /// RMS amplitude over the maximum representable RMS.
    pub noise_level: f64,
    /// Whether `noise_level` exceeds the noise threshold.
    pub is_noisy: bool,
}

/// One uploaded audio file, as extracted from the multipart body.
struct Upload {
    bytes: Bytes,
    mime_type: String,
}

/// `POST /analyze` handler.
pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let upload = read_upload(multipart, state.config.max_upload_bytes).await?;

    let deadline = Duration::from_millis(state.config.request_timeout_ms);
    let response = tokio::time::timeout(deadline, run_pipeline(&state, upload))
        .await
        .map_err(|_| ApiError::Timeout)??;

    Ok(Json(response))
}

/// Pull the audio file out of the multipart body.
///
/// Accepts the field named `file` or `audio`, or the first field carrying a
/// filename. Anything else in the form is ignored.
async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<Upload, ApiError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidUpload(format!("multipart: {e}")))?;
        let Some(field) = field else {
            return Err(ApiError::InvalidUpload("no audio file field in upload".into()));
        };

        let named_audio = matches!(field.name(), Some("file" | "audio"));
        if !named_audio && field.file_name().is_none() {
            continue;
        }

        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidUpload(format!("read upload: {e}")))?;

        if bytes.len() > max_bytes {
            return Err(ApiError::PayloadTooLarge { limit: max_bytes });
        }
        if bytes.is_empty() {
            return Err(ApiError::InvalidUpload("uploaded file is empty".into()));
        }

        return Ok(Upload { bytes, mime_type });
    }
}

/// Decode once, then feed the same waveform to the noise estimator and the
/// recognizer. The waveform is request-owned and dropped on return.
async fn run_pipeline(state: &AppState, upload: Upload) -> Result<AnalyzeResponse, ApiError> {
    let recognizer = state.recognizer.clone().ok_or(ApiError::ModelNotLoaded)?;

    let waveform = decode_upload(upload).await?;
    debug!(
        "decoded {:.1}s of audio ({} samples)",
        waveform.duration_seconds(),
        waveform.len()
    );

    let noise = auris_analysis::noise_report(&waveform)?;
    let transcription = recognizer.transcribe(&waveform).await?;

    Ok(AnalyzeResponse {
        transcription: transcription.text,
        noise_level: noise.noise_level,
        is_noisy: noise.is_noisy,
    })
}

/// Run the decoder adapter on a blocking thread.
async fn decode_upload(upload: Upload) -> Result<Waveform, ApiError> {
    let waveform =
        tokio::task::spawn_blocking(move || decode_waveform(&upload.bytes, &upload.mime_type))
            .await
            .map_err(|e| ApiError::Internal(format!("decode task join: {e}")))??;
    Ok(waveform)
}

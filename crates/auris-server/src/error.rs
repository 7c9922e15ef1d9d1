//! Request error taxonomy and its HTTP mapping.
//!
//! Every failure surfaces directly to the caller; nothing is retried or
//! degraded to a partial response.

use auris_analysis::AnalysisError;
use auris_audio::DecodeError;
use auris_transcription::TranscriptionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

// ── Error code constants ────────────────────────────────────────────

/// Multipart body malformed or missing the audio file field.
pub const INVALID_UPLOAD: &str = "INVALID_UPLOAD";
/// Uploaded bytes are not a recognized/parseable audio container.
pub const UNSUPPORTED_AUDIO: &str = "UNSUPPORTED_AUDIO";
/// Decoded waveform has zero samples.
pub const EMPTY_AUDIO: &str = "EMPTY_AUDIO";
/// Upload exceeds the configured size cap.
pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
/// The transcription model is not loaded.
pub const NOT_AVAILABLE: &str = "NOT_AVAILABLE";
/// The request missed its processing deadline.
pub const TIMEOUT: &str = "TIMEOUT";
/// The transcription model failed.
pub const TRANSCRIPTION_ERROR: &str = "TRANSCRIPTION_ERROR";
/// Unexpected internal error.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Error returned by the analysis endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The multipart body could not be read or held no audio field.
    #[error("{0}")]
    InvalidUpload(String),

    /// Decoding the uploaded container failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Noise analysis rejected the waveform.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The upload exceeds the configured cap.
    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge {
        /// The configured cap in bytes.
        limit: usize,
    },

    /// No transcription model is loaded into this process.
    #[error("transcription model is not loaded")]
    ModelNotLoaded,

    /// The decode/analyze/transcribe pipeline missed its deadline.
    #[error("request processing deadline exceeded")]
    Timeout,

    /// The transcription engine failed.
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    /// Anything unexpected (task join failures, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUpload(_) => INVALID_UPLOAD,
            Self::Decode(DecodeError::EmptyStream) => EMPTY_AUDIO,
            Self::Decode(_) => UNSUPPORTED_AUDIO,
            Self::Analysis(AnalysisError::EmptyWaveform) => EMPTY_AUDIO,
            Self::PayloadTooLarge { .. } => PAYLOAD_TOO_LARGE,
            Self::ModelNotLoaded => NOT_AVAILABLE,
            Self::Timeout => TIMEOUT,
            Self::Transcription(TranscriptionError::ModelNotAvailable(_)) => NOT_AVAILABLE,
            Self::Transcription(_) => TRANSCRIPTION_ERROR,
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            Self::Decode(DecodeError::EmptyStream) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Analysis(AnalysisError::EmptyWaveform) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ModelNotLoaded
            | Self::Timeout
            | Self::Transcription(TranscriptionError::ModelNotAvailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Transcription(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape of a failed request: `{"error": {"code", "message"}}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_upload_is_bad_request() {
        let e = ApiError::InvalidUpload("no field".into());
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.code(), INVALID_UPLOAD);
    }

    #[test]
    fn unsupported_container_is_bad_request() {
        let e = ApiError::from(DecodeError::UnsupportedFormat("probe failed".into()));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.code(), UNSUPPORTED_AUDIO);
    }

    #[test]
    fn empty_stream_is_unprocessable() {
        let e = ApiError::from(DecodeError::EmptyStream);
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.code(), EMPTY_AUDIO);
    }

    #[test]
    fn empty_waveform_is_unprocessable() {
        let e = ApiError::from(AnalysisError::EmptyWaveform);
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.code(), EMPTY_AUDIO);
    }

    #[test]
    fn oversized_upload_maps_to_413() {
        let e = ApiError::PayloadTooLarge { limit: 1024 };
        assert_eq!(e.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(e.to_string().contains("1024"));
    }

    #[test]
    fn missing_model_is_service_unavailable() {
        assert_eq!(ApiError::ModelNotLoaded.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::ModelNotLoaded.code(), NOT_AVAILABLE);
    }

    #[test]
    fn timeout_is_service_unavailable() {
        assert_eq!(ApiError::Timeout.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::Timeout.code(), TIMEOUT);
    }

    #[test]
    fn inference_failure_is_internal() {
        let e = ApiError::from(TranscriptionError::Inference("boom".into()));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.code(), TRANSCRIPTION_ERROR);
    }

    #[test]
    fn error_body_shape() {
        let resp = ApiError::InvalidUpload("no audio file field".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

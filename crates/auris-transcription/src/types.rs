//! Core types and the recognizer trait.

use async_trait::async_trait;
use auris_audio::Waveform;

/// Result of transcribing one waveform.
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    /// The transcribed text.
    pub text: String,
    /// Language code of the transcription (e.g. "en").
    pub language: String,
    /// Duration of the audio in seconds.
    pub duration_seconds: f64,
}

/// Errors that can occur during transcription.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    /// Model files not found or failed to download.
    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    /// ONNX Runtime session creation or inference failure.
    #[error("inference error: {0}")]
    Inference(String),

    /// I/O error (file read/write).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A pretrained speech-recognition capability.
///
/// One synchronous call per request; no retry, chunking or streaming. The
/// server holds the recognizer as `Arc<dyn SpeechRecognizer>` so tests can
/// substitute a fake.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe a canonical waveform into text.
    async fn transcribe(&self, waveform: &Waveform)
        -> Result<TranscriptionResult, TranscriptionError>;
}

/// Extension trait to reduce `.map_err()` boilerplate when wrapping errors
/// into `TranscriptionError`.
pub trait ResultExt<T> {
    /// Wrap the error as [`TranscriptionError::Inference`] with `context` prefix.
    fn inference(self, context: &str) -> Result<T, TranscriptionError>;
    /// Wrap the error as [`TranscriptionError::ModelNotAvailable`] with `context` prefix.
    fn model(self, context: &str) -> Result<T, TranscriptionError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn inference(self, context: &str) -> Result<T, TranscriptionError> {
        self.map_err(|e| TranscriptionError::Inference(format!("{context}: {e}")))
    }
    fn model(self, context: &str) -> Result<T, TranscriptionError> {
        self.map_err(|e| TranscriptionError::ModelNotAvailable(format!("{context}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcription_result_fields() {
        let r = TranscriptionResult {
            text: "Hello world".into(),
            language: "en".into(),
            duration_seconds: 2.5,
        };
        assert_eq!(r.text, "Hello world");
        assert_eq!(r.language, "en");
        assert_eq!(r.duration_seconds, 2.5);
    }

    #[test]
    fn transcription_error_display() {
        let e = TranscriptionError::ModelNotAvailable("missing encoder".into());
        assert!(e.to_string().contains("missing encoder"));
    }

    #[test]
    fn result_ext_inference_context() {
        let err: Result<(), &str> = Err("onnx failure");
        let mapped = err.inference("encoder run");
        assert!(
            matches!(mapped, Err(TranscriptionError::Inference(s)) if s == "encoder run: onnx failure")
        );
    }

    #[test]
    fn result_ext_model_context() {
        let err: Result<(), &str> = Err("download failed");
        let mapped = err.model("ensure_model");
        assert!(
            matches!(mapped, Err(TranscriptionError::ModelNotAvailable(s)) if s == "ensure_model: download failed")
        );
    }

    #[test]
    fn result_ext_ok_passthrough() {
        let ok: Result<i32, &str> = Ok(42);
        assert_eq!(ok.inference("ctx").unwrap(), 42);
    }
}

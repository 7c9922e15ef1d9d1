//! ONNX session management and the inference pipeline.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use auris_audio::Waveform;
use ort::session::Session;
use tracing::{debug, info};

use crate::decoder;
use crate::model;
use crate::types::{ResultExt, SpeechRecognizer, TranscriptionError, TranscriptionResult};

/// Intra-op thread count for preprocessor and encoder ONNX sessions.
const PARALLEL_THREADS: usize = 4;
/// Decoder is sequential — single thread is sufficient.
const DECODER_THREADS: usize = 1;

/// Process-wide transcription engine backed by the parakeet-tdt ONNX model.
///
/// Holds 3 ONNX sessions (preprocessor, encoder, decoder+joint) and the
/// vocabulary. Sessions sit behind `Mutex` since `Session::run` requires
/// `&mut self`, which also serializes inference across requests. All
/// inference runs on `spawn_blocking` to keep the async runtime responsive.
///
/// Cheap to clone; clones share the loaded sessions.
#[derive(Clone)]
pub struct TranscriptionEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    preprocessor: Mutex<Session>,
    encoder: Mutex<Session>,
    decoder_joint: Mutex<Session>,
    vocab: Vec<String>,
    blank_idx: usize,
}

impl TranscriptionEngine {
    /// Load the engine from `model_dir`.
    ///
    /// CPU-intensive (reads ~600MB of model weights); call once at startup.
    pub async fn load(model_dir: PathBuf) -> Result<Self, TranscriptionError> {
        let inner = tokio::task::spawn_blocking(move || EngineInner::load(&model_dir))
            .await
            .inference("load task join")??;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for TranscriptionEngine {
    async fn transcribe(
        &self,
        waveform: &Waveform,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let samples = waveform.samples_f32();
        let duration_seconds = waveform.duration_seconds();
        debug!(
            "transcribing {:.1}s of audio ({} samples)",
            duration_seconds,
            samples.len()
        );

        let inner = Arc::clone(&self.inner);
        let text = tokio::task::spawn_blocking(move || inner.run_inference(&samples))
            .await
            .inference("inference task")??;

        Ok(TranscriptionResult {
            text,
            language: "en".into(), // parakeet-tdt v3 reports English
            duration_seconds,
        })
    }
}

impl EngineInner {
    fn load(model_dir: &Path) -> Result<Self, TranscriptionError> {
        info!("loading transcription model from {}...", model_dir.display());
        let paths = model::ModelPaths::from_dir(model_dir);

        let preprocessor = Session::builder()
            .inference("session builder")?
            .with_intra_threads(PARALLEL_THREADS)
            .inference("set threads")?
            .commit_from_file(&paths.preprocessor)
            .inference("load preprocessor")?;
        debug!("loaded preprocessor");

        let encoder = Session::builder()
            .inference("session builder")?
            .with_intra_threads(PARALLEL_THREADS)
            .inference("set threads")?
            .commit_from_file(&paths.encoder)
            .inference("load encoder")?;
        debug!("loaded encoder");

        let decoder_joint = Session::builder()
            .inference("session builder")?
            .with_intra_threads(DECODER_THREADS)
            .inference("set threads")?
            .commit_from_file(&paths.decoder_joint)
            .inference("load decoder")?;
        debug!("loaded decoder_joint");

        let vocab = model::load_vocab(&paths.vocab)?;
        let blank_idx = vocab.len(); // blank token sits at index == vocab_size

        info!(
            "transcription engine ready: vocab_size={}, blank_idx={}",
            vocab.len(),
            blank_idx
        );

        Ok(Self {
            preprocessor: Mutex::new(preprocessor),
            encoder: Mutex::new(encoder),
            decoder_joint: Mutex::new(decoder_joint),
            vocab,
            blank_idx,
        })
    }

    /// Full inference pipeline (CPU-bound, must run on a blocking thread).
    fn run_inference(&self, samples: &[f32]) -> Result<String, TranscriptionError> {
        let (features, features_len) = {
            let mut preprocessor = self.preprocessor.lock().inference("preprocessor lock")?;
            decoder::mel_features(&mut preprocessor, samples)?
        };
        debug!("mel features: {:?}, len={}", features.shape(), features_len);

        let encoder_out = {
            let mut encoder = self.encoder.lock().inference("encoder lock")?;
            decoder::encode(&mut encoder, &features, features_len)?
        };
        debug!("encoder output: {:?}", encoder_out.shape());

        let mut decoder_joint = self.decoder_joint.lock().inference("decoder lock")?;
        decoder::decode_text(&encoder_out, &mut decoder_joint, &self.vocab, self.blank_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auris_audio::CANONICAL_SAMPLE_RATE;

    #[tokio::test]
    async fn engine_requires_model_files() {
        let tmp = tempfile::tempdir().unwrap();
        let result = TranscriptionEngine::load(tmp.path().to_path_buf()).await;
        assert!(result.is_err());
    }

    // Integration test requiring the downloaded model — run with
    // `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn transcribe_silence_produces_near_empty_text() {
        let model_dir = model::default_model_dir();
        model::ensure_model(&model_dir).await.unwrap();
        let engine = TranscriptionEngine::load(model_dir).await.unwrap();

        let silence = Waveform::new(vec![0; 16_000], CANONICAL_SAMPLE_RATE);
        let result = engine.transcribe(&silence).await.unwrap();
        assert!(result.text.len() < 16, "got: {:?}", result.text);
    }
}

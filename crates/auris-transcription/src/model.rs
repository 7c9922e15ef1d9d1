//! Model file management — `HuggingFace` download and path resolution.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::types::{ResultExt, TranscriptionError};

/// `HuggingFace` repository holding the ONNX export of the model.
const HF_REPO: &str = "istupakov/parakeet-tdt-0.6b-v3-onnx";

/// Files the engine needs on disk.
const MODEL_FILES: &[&str] = &[
    "nemo128.onnx",
    "encoder-model.onnx",
    "encoder-model.onnx.data",
    "decoder_joint-model.onnx",
    "vocab.txt",
];

/// Resolved paths to the individual model files inside a model directory.
pub struct ModelPaths {
    /// Mel preprocessor network.
    pub preprocessor: PathBuf,
    /// Acoustic encoder network.
    pub encoder: PathBuf,
    /// Combined decoder + joint network.
    pub decoder_joint: PathBuf,
    /// Token vocabulary, one entry per line.
    pub vocab: PathBuf,
}

impl ModelPaths {
    /// Build paths for every model file under `dir`.
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            preprocessor: dir.join("nemo128.onnx"),
            encoder: dir.join("encoder-model.onnx"),
            decoder_joint: dir.join("decoder_joint-model.onnx"),
            vocab: dir.join("vocab.txt"),
        }
    }
}

/// Default model cache directory under `~/.auris/models/onnx/`.
pub fn default_model_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".auris").join("models").join("onnx")
}

/// Whether all required model files exist locally.
pub fn is_model_cached(model_dir: impl AsRef<Path>) -> bool {
    let dir = model_dir.as_ref();
    MODEL_FILES.iter().all(|name| dir.join(name).exists())
}

/// Download model files from `HuggingFace` if not already cached.
///
/// Files land in `HuggingFace`'s own cache first and are then copied into
/// `model_dir` so the engine has a stable layout to load from.
pub async fn ensure_model(model_dir: impl AsRef<Path>) -> Result<(), TranscriptionError> {
    let model_dir = model_dir.as_ref().to_path_buf();

    if is_model_cached(&model_dir) {
        debug!("model files already cached at {}", model_dir.display());
        return Ok(());
    }

    info!("downloading transcription model from HuggingFace...");
    std::fs::create_dir_all(&model_dir).map_err(TranscriptionError::Io)?;

    // hf-hub uses sync HTTP, keep it off the async runtime
    tokio::task::spawn_blocking(move || fetch_model_files(&model_dir))
        .await
        .model("download task join")?
}

fn fetch_model_files(model_dir: &Path) -> Result<(), TranscriptionError> {
    let api = hf_hub::api::sync::Api::new().model("HF API init")?;
    let repo = api.model(HF_REPO.to_string());

    for &filename in MODEL_FILES {
        let target = model_dir.join(filename);
        if target.exists() {
            debug!("skipping {filename} (already exists)");
            continue;
        }

        info!("downloading {filename}...");
        match repo.get(filename) {
            Ok(cached) => {
                if cached != target {
                    let _ = std::fs::copy(&cached, &target)
                        .model(&format!("copy {filename} into model dir"))?;
                }
                debug!("downloaded {filename}");
            }
            Err(e) => {
                warn!("failed to download {filename}: {e}");
                return Err(TranscriptionError::ModelNotAvailable(format!(
                    "download failed for {filename}: {e}"
                )));
            }
        }
    }

    info!("all model files ready at {}", model_dir.display());
    Ok(())
}

/// Load the vocabulary (one token per line).
pub fn load_vocab(vocab_path: &Path) -> Result<Vec<String>, TranscriptionError> {
    let content = std::fs::read_to_string(vocab_path).model("read vocab.txt")?;
    Ok(content.lines().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_dir_under_auris() {
        let dir = default_model_dir();
        let s = dir.to_string_lossy();
        assert!(s.contains(".auris"), "got: {s}");
        assert!(s.ends_with("models/onnx"), "got: {s}");
    }

    #[test]
    fn empty_dir_is_not_cached() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!is_model_cached(tmp.path()));
    }

    #[test]
    fn paths_resolve_under_dir() {
        let paths = ModelPaths::from_dir(Path::new("/tmp/models"));
        assert_eq!(paths.preprocessor, Path::new("/tmp/models/nemo128.onnx"));
        assert_eq!(paths.vocab, Path::new("/tmp/models/vocab.txt"));
    }

    #[test]
    fn missing_vocab_fails_to_load() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_vocab(&tmp.path().join("vocab.txt")).unwrap_err();
        assert!(matches!(err, TranscriptionError::ModelNotAvailable(_)));
    }

    #[test]
    fn vocab_loads_line_per_token() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("vocab.txt");
        std::fs::write(&path, "▁the\n▁a\ns\n").unwrap();
        let vocab = load_vocab(&path).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab[2], "s");
    }
}

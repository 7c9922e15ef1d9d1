//! # auris-transcription
//!
//! Speech recognition over the canonical waveform, delegated to the
//! pretrained parakeet-tdt-0.6b-v3 ONNX model.
//!
//! # Architecture
//!
//! ```text
//! canonical waveform (16kHz mono i16) → f32
//! → nemo128.onnx (preprocessor) → mel features [1, 128, T]
//! → encoder-model.onnx → encoder output [1, T', 1024]
//! → TDT greedy decode (decoder_joint-model.onnx in loop) → token IDs
//! → vocab.txt lookup → text string
//! ```
//!
//! The server talks to the [`SpeechRecognizer`] trait; the concrete
//! [`TranscriptionEngine`] is built once at startup and shared by every
//! request.

pub mod decoder;
pub mod engine;
pub mod model;
pub mod types;

pub use engine::TranscriptionEngine;
pub use types::{ResultExt, SpeechRecognizer, TranscriptionError, TranscriptionResult};

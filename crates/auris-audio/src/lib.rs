//! # auris-audio
//!
//! Decoder adapter: turns an uploaded audio container (WAV, M4A/AAC, MP3,
//! OGG, FLAC, ...) into the canonical waveform every downstream consumer
//! reads — mono, 16 kHz, 16-bit signed PCM.
//!
//! ```text
//! container bytes → symphonia probe + decode → mono f32 mixdown
//! → rubato resample to 16kHz → i16 quantization → Waveform
//! ```
//!
//! The waveform lives in memory and is owned by the request that decoded it;
//! there is no file-backed intermediate.

pub mod decode;
pub mod waveform;

pub use decode::{decode_waveform, DecodeError};
pub use waveform::{Waveform, CANONICAL_SAMPLE_RATE};

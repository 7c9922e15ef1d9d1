//! # auris-analysis
//!
//! Noise estimation over the canonical waveform: root-mean-square amplitude
//! normalized against the largest magnitude a 16-bit sample can hold.

pub mod noise;

pub use noise::{noise_report, AnalysisError, NoiseReport, NOISE_THRESHOLD};

//! RMS loudness ratio and the noisy/quiet verdict.

use auris_audio::Waveform;

/// Ratio above which a signal is reported as noisy. Opaque constant; it has
/// no perceptual calibration.
pub const NOISE_THRESHOLD: f64 = 0.5;

/// Largest magnitude representable in a 16-bit signed sample. The reference
/// RMS of a constant full-scale signal is the constant itself, so the
/// normalization divides by this value directly.
const MAX_AMPLITUDE: f64 = i16::MAX as f64;

/// Loudness verdict for one waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseReport {
    /// RMS amplitude over the maximum representable RMS. Zero for silence,
    /// near 1.0 for full-scale signals, slightly above 1.0 only for streams
    /// that clip at `i16::MIN`.
    pub noise_level: f64,
    /// Strictly `noise_level > 0.5`; exactly 0.5 is quiet.
    pub is_noisy: bool,
}

/// Errors from the noise estimator.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The waveform holds zero samples, so the mean square is undefined.
    #[error("waveform contains no samples")]
    EmptyWaveform,
}

/// Compute the noise report for a waveform.
///
/// Deterministic: the same samples always produce the same report.
pub fn noise_report(waveform: &Waveform) -> Result<NoiseReport, AnalysisError> {
    if waveform.is_empty() {
        return Err(AnalysisError::EmptyWaveform);
    }

    let sum_squares: f64 = waveform
        .samples()
        .iter()
        .map(|&s| {
            let s = f64::from(s);
            s * s
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let rms = (sum_squares / waveform.len() as f64).sqrt();
    let noise_level = rms / MAX_AMPLITUDE;

    Ok(NoiseReport {
        noise_level,
        is_noisy: noise_level > NOISE_THRESHOLD,
    })
}

//! Container decoding and resampling into the canonical waveform.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::waveform::{Waveform, CANONICAL_SAMPLE_RATE};

/// Errors produced while turning container bytes into a canonical waveform.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The bytes are not a recognized audio container, or the codec could
    /// not be initialized.
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// The container was recognized but a packet failed to decode.
    #[error("malformed audio stream: {0}")]
    Malformed(String),

    /// Decoding succeeded but produced zero samples.
    #[error("decoded stream contains no samples")]
    EmptyStream,

    /// Resampling to the canonical rate failed.
    #[error("resample error: {0}")]
    Resample(String),
}

/// Decode container bytes into the canonical waveform (mono, 16 kHz, i16).
///
/// The MIME type, when provided by the upload, seeds the format probe with
/// an extension hint; an unknown or empty MIME type still decodes if the
/// container is self-describing.
pub fn decode_waveform(data: &[u8], mime_type: &str) -> Result<Waveform, DecodeError> {
    let cursor = Cursor::new(data.to_vec());
    let stream = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_for_mime(mime_type) {
        let _ = hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::UnsupportedFormat(format!("probe failed: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::UnsupportedFormat("no audio track found".into()))?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let source_rate = codec_params.sample_rate.unwrap_or(CANONICAL_SAMPLE_RATE);
    let channels = codec_params.channels.map_or(1, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedFormat(format!("codec init failed: {e}")))?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(DecodeError::Malformed(format!("packet read: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| DecodeError::Malformed(format!("decode: {e}")))?;

        let spec = *decoded.spec();
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        mix_to_mono(buf.samples(), channels, &mut mono);
    }

    if mono.is_empty() {
        return Err(DecodeError::EmptyStream);
    }

    if source_rate != CANONICAL_SAMPLE_RATE {
        debug!(source_rate, "resampling to canonical rate");
        mono = resample(&mono, source_rate, CANONICAL_SAMPLE_RATE)?;
    }

    Ok(Waveform::new(quantize(&mono), CANONICAL_SAMPLE_RATE))
}

/// Fold interleaved frames down to a single averaged channel.
fn mix_to_mono(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / channels as f32;
    for frame in interleaved.chunks(channels) {
        out.push(frame.iter().sum::<f32>() * scale);
    }
}

/// Quantize unit-range f32 samples to i16 PCM.
fn quantize(samples: &[f32]) -> Vec<i16> {
    #[allow(clippy::cast_possible_truncation)]
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16)
        .collect()
}

/// Resample mono audio from `from_rate` to `to_rate` using rubato.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, DecodeError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| DecodeError::Resample(format!("init: {e}")))?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + chunk_size);

    for chunk in samples.chunks(chunk_size) {
        let input = if chunk.len() < chunk_size {
            // Pad the final partial chunk with zeros
            let mut padded = chunk.to_vec();
            padded.resize(chunk_size, 0.0);
            vec![padded]
        } else {
            vec![chunk.to_vec()]
        };

        let resampled = resampler
            .process(&input, None)
            .map_err(|e| DecodeError::Resample(format!("process: {e}")))?;

        if let Some(channel) = resampled.first() {
            output.extend_from_slice(channel);
        }
    }

    Ok(output)
}

/// Map an upload MIME type to a probe extension hint.
fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "audio/wav" | "audio/wave" | "audio/x-wav" => Some("wav"),
        "audio/m4a" | "audio/mp4" | "audio/x-m4a" | "audio/aac" => Some("m4a"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/ogg" | "audio/vorbis" => Some("ogg"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        _ => None,
    }
}

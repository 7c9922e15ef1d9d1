//! TDT greedy decoding loop for the parakeet-tdt model.
//!
//! ONNX tensor shapes use `i64` dimensions while Rust indexing needs `usize`.
//! These casts are safe because tensor dimensions are always small positive
//! values.
#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]

use ndarray::{Array2, Array3};
use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use crate::types::{ResultExt, TranscriptionError};

/// TDT duration buckets: how many encoder frames to advance per step.
const DURATIONS: [usize; 5] = [0, 1, 2, 3, 4];

/// LSTM state width of the decoder network.
const STATE_DIM: usize = 640;

/// Run the mel preprocessor on raw waveform samples.
///
/// Input: waveform `[1, N]` (16kHz mono f32).
/// Output: mel features `[1, 128, T]` plus the valid feature length.
pub fn mel_features(
    preprocessor: &mut Session,
    samples: &[f32],
) -> Result<(Array3<f32>, i64), TranscriptionError> {
    let n = samples.len();
    let waveform =
        Tensor::from_array(([1i64, n as i64], samples.to_vec())).inference("waveform tensor")?;
    let waveform_lens =
        Tensor::from_array(([1i64], vec![n as i64])).inference("waveform_lens tensor")?;

    let outputs = preprocessor
        .run(ort::inputs![
            "waveforms" => waveform,
            "waveforms_lens" => waveform_lens,
        ])
        .inference("preprocessor run")?;

    let (shape, data) = outputs["features"]
        .try_extract_tensor::<f32>()
        .inference("extract features")?;
    let (_, len_data) = outputs["features_lens"]
        .try_extract_tensor::<i64>()
        .inference("extract features_lens")?;
    let features_len = len_data[0];

    let features = Array3::from_shape_vec(
        (shape[0] as usize, shape[1] as usize, shape[2] as usize),
        data.to_vec(),
    )
    .inference("reshape features")?;

    Ok((features, features_len))
}

/// Run the acoustic encoder on mel features.
///
/// Input: mel features `[1, 128, T]`.
/// Output: encoder output `[T', hidden]` (batch dimension squeezed away).
pub fn encode(
    encoder: &mut Session,
    features: &Array3<f32>,
    features_len: i64,
) -> Result<Array2<f32>, TranscriptionError> {
    let shape = features.shape();
    let flat: Vec<f32> = features.iter().copied().collect();
    let audio_signal =
        Tensor::from_array(([shape[0] as i64, shape[1] as i64, shape[2] as i64], flat))
            .inference("encoder audio_signal tensor")?;
    let length = Tensor::from_array(([1i64], vec![features_len])).inference("encoder length tensor")?;

    let outputs = encoder
        .run(ort::inputs![
            "audio_signal" => audio_signal,
            "length" => length,
        ])
        .inference("encoder run")?;

    let (enc_shape, enc_data) = outputs["outputs"]
        .try_extract_tensor::<f32>()
        .inference("extract encoder output")?;

    let t_prime = enc_shape[1] as usize;
    let hidden = enc_shape[2] as usize;

    Array2::from_shape_vec((t_prime, hidden), enc_data.to_vec()).inference("reshape encoder")
}

/// Greedy TDT decoding: walk encoder output frame-by-frame through the
/// `decoder_joint` network.
///
/// The network takes one encoder frame, the previous token, and the LSTM
/// states; it returns token logits and duration logits. The best non-blank
/// token is emitted and the frame cursor advances by the predicted duration.
pub fn decode_text(
    encoder_out: &Array2<f32>,
    decoder_joint: &mut Session,
    vocab: &[String],
    blank_idx: usize,
) -> Result<String, TranscriptionError> {
    let time_steps = encoder_out.shape()[0];
    let hidden = encoder_out.shape()[1];

    let mut step = 0usize;
    let mut tokens: Vec<usize> = Vec::new();
    let mut prev_token = blank_idx;
    let mut state1 = vec![0.0f32; STATE_DIM];
    let mut state2 = vec![0.0f32; STATE_DIM];

    // Each frame can emit at most one token per visit; cap total visits so a
    // degenerate duration prediction cannot loop forever.
    let max_steps = time_steps * DURATIONS.len();
    let mut total_steps = 0;

    while step < time_steps {
        total_steps += 1;
        if total_steps > max_steps {
            debug!("TDT decode hit step limit at frame {step}/{time_steps}");
            break;
        }

        let frame: Vec<f32> = encoder_out.row(step).to_vec();
        let encoder_input = Tensor::from_array(([1i64, 1, hidden as i64], frame))
            .inference("encoder frame tensor")?;
        let target =
            Tensor::from_array(([1i64, 1], vec![prev_token as i64])).inference("target tensor")?;
        let target_length =
            Tensor::from_array(([1i64], vec![1i64])).inference("target_length tensor")?;
        let s1 = Tensor::from_array(([1i64, 1, STATE_DIM as i64], state1.clone()))
            .inference("state1 tensor")?;
        let s2 = Tensor::from_array(([1i64, 1, STATE_DIM as i64], state2.clone()))
            .inference("state2 tensor")?;

        let outputs = decoder_joint
            .run(ort::inputs![
                "encoder_outputs" => encoder_input,
                "targets" => target,
                "target_length" => target_length,
                "input_states_1" => s1,
                "input_states_2" => s2,
            ])
            .inference("decoder_joint run")?;

        let (_, logits) = outputs["outputs"]
            .try_extract_tensor::<f32>()
            .inference("extract logits")?;
        let (_, s1_data) = outputs["output_states_1"]
            .try_extract_tensor::<f32>()
            .inference("extract state1")?;
        state1 = s1_data.to_vec();
        let (_, s2_data) = outputs["output_states_2"]
            .try_extract_tensor::<f32>()
            .inference("extract state2")?;
        state2 = s2_data.to_vec();

        let vocab_size = vocab.len();
        if logits.len() < vocab_size + DURATIONS.len() {
            return Err(TranscriptionError::Inference(format!(
                "logits too short: {} < {} + {}",
                logits.len(),
                vocab_size,
                DURATIONS.len()
            )));
        }

        let token = argmax(&logits[..vocab_size]);
        let duration_idx = argmax(&logits[vocab_size..vocab_size + DURATIONS.len()]);
        let advance = DURATIONS[duration_idx];

        if token != blank_idx {
            tokens.push(token);
            prev_token = token;
        }

        let prev_step = step;
        step += advance;
        // Anti-stuck: a predicted duration of 0 still advances one frame
        if step == prev_step {
            step += 1;
        }
    }

    let text = render_tokens(&tokens, vocab);
    debug!(
        "decoded {} tokens from {} frames → {} chars",
        tokens.len(),
        time_steps,
        text.len()
    );

    Ok(text)
}

/// Join token IDs into text, resolving SentencePiece word boundaries.
fn render_tokens(tokens: &[usize], vocab: &[String]) -> String {
    tokens
        .iter()
        .filter_map(|&t| vocab.get(t).map(String::as_str))
        .collect::<String>()
        .replace('\u{2581}', " ") // SentencePiece ▁ → space
        .trim()
        .to_string()
}

/// Find the index of the maximum value in a slice.
fn argmax(slice: &[f32]) -> usize {
    slice
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map_or(0, |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_basic() {
        assert_eq!(argmax(&[1.0, 3.0, 2.0]), 1);
        assert_eq!(argmax(&[5.0, 1.0, 2.0]), 0);
        assert_eq!(argmax(&[0.0, 0.0, 1.0]), 2);
    }

    #[test]
    fn argmax_single() {
        assert_eq!(argmax(&[42.0]), 0);
    }

    #[test]
    fn argmax_negative() {
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), 1);
    }

    #[test]
    fn sentencepiece_boundaries_become_spaces() {
        let vocab: Vec<String> = ["▁Hello", "▁world", "!"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(render_tokens(&[0, 1, 2], &vocab), "Hello world!");
    }

    #[test]
    fn out_of_range_tokens_are_skipped() {
        let vocab: Vec<String> = ["▁ok"].iter().map(ToString::to_string).collect();
        assert_eq!(render_tokens(&[0, 99], &vocab), "ok");
    }

    #[test]
    fn empty_tokens_render_empty() {
        let vocab: Vec<String> = vec!["▁a".into()];
        assert_eq!(render_tokens(&[], &vocab), "");
    }
}

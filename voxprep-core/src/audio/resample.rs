//! Sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! ## Design
//!
//! Recording tools capture at whatever rate the device offers (commonly
//! 44.1 or 48 kHz). The corpus is 22.05 kHz, so each clip is converted
//! once, whole-buffer, before any other stage runs.
//!
//! When the native rate already equals the target, the input is returned
//! unchanged — no rubato session is created at all.
//!
//! The converter compensates rubato's output delay and trims the result to
//! `round(len · target/native)` frames, so a 1.0 s clip stays 1.0 s at the
//! new rate.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::audio::buffer::AudioBuffer;
use crate::error::{PrepError, Result};

/// Input frames fed to rubato per process call.
const CHUNK_SIZE: usize = 1024;

/// Convert `buffer` to `target_rate`.
pub fn resample(buffer: AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if buffer.sample_rate == target_rate {
        return Ok(buffer);
    }
    if buffer.is_empty() {
        return Ok(AudioBuffer::new(Vec::new(), target_rate));
    }

    let ratio = target_rate as f64 / buffer.sample_rate as f64;
    let expected = (buffer.samples.len() as f64 * ratio).round() as usize;

    let mut resampler =
        FastFixedIn::<f32>::new(ratio, 1.0, PolynomialDegree::Cubic, CHUNK_SIZE, 1)
            .map_err(|e| PrepError::Resample(format!("init: {e}")))?;

    let delay = resampler.output_delay();
    let mut output_buf = vec![vec![0f32; resampler.output_frames_max()]; 1];
    let mut out: Vec<f32> = Vec::with_capacity(expected + delay + CHUNK_SIZE);

    let mut pos = 0;
    while pos + CHUNK_SIZE <= buffer.samples.len() {
        let (_, produced) = resampler
            .process_into_buffer(
                &[&buffer.samples[pos..pos + CHUNK_SIZE]],
                &mut output_buf,
                None,
            )
            .map_err(|e| PrepError::Resample(e.to_string()))?;
        out.extend_from_slice(&output_buf[0][..produced]);
        pos += CHUNK_SIZE;
    }

    // Tail shorter than a full chunk, then flush the internal delay line.
    let tail = &buffer.samples[pos..];
    if !tail.is_empty() {
        let (_, produced) = resampler
            .process_partial_into_buffer(Some(&[tail]), &mut output_buf, None)
            .map_err(|e| PrepError::Resample(e.to_string()))?;
        out.extend_from_slice(&output_buf[0][..produced]);
    }
    while out.len() < expected + delay {
        let (_, produced) = resampler
            .process_partial_into_buffer(None::<&[&[f32]]>, &mut output_buf, None)
            .map_err(|e| PrepError::Resample(e.to_string()))?;
        if produced == 0 {
            break;
        }
        out.extend_from_slice(&output_buf[0][..produced]);
    }

    out.drain(..delay.min(out.len()));
    out.truncate(expected);
    Ok(AudioBuffer::new(out, target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_identity_when_rates_match() {
        let samples: Vec<f32> = (0..480).map(|i| i as f32 * 0.001).collect();
        let buf = AudioBuffer::new(samples.clone(), 22_050);
        let out = resample(buf, 22_050).expect("resample");
        assert_eq!(out.sample_rate, 22_050);
        assert_eq!(out.samples, samples);
    }

    #[test]
    fn one_second_44k_to_22k_keeps_duration() {
        let samples = vec![0.1f32; 44_100];
        let buf = AudioBuffer::new(samples, 44_100);
        let out = resample(buf, 22_050).expect("resample");
        assert_eq!(out.sample_rate, 22_050);
        assert!(
            (out.samples.len() as i64 - 22_050).abs() <= 1,
            "length {} expected ≈ 22050",
            out.samples.len()
        );
    }

    #[test]
    fn upsampling_keeps_duration() {
        let buf = AudioBuffer::new(vec![0.0f32; 16_000], 16_000);
        let out = resample(buf, 22_050).expect("resample");
        assert!(
            (out.samples.len() as i64 - 22_050).abs() <= 1,
            "length {} expected ≈ 22050",
            out.samples.len()
        );
    }

    #[test]
    fn odd_length_48k_input_keeps_duration() {
        // 0.7 s at 48 kHz → 0.7 s at 22.05 kHz; not a multiple of the chunk size
        let buf = AudioBuffer::new(vec![0.05f32; 33_600], 48_000);
        let out = resample(buf, 22_050).expect("resample");
        let expected = (33_600f64 * 22_050.0 / 48_000.0).round() as i64;
        assert!(
            (out.samples.len() as i64 - expected).abs() <= 1,
            "length {} expected ≈ {expected}",
            out.samples.len()
        );
    }

    #[test]
    fn tone_survives_resampling() {
        // 440 Hz sine at 44.1 kHz should keep its RMS at 22.05 kHz
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (std::f32::consts::TAU * 440.0 * i as f32 / 44_100.0).sin() * 0.5)
            .collect();
        let buf = AudioBuffer::new(samples, 44_100);
        let out = resample(buf, 22_050).expect("resample");

        let rms = |s: &[f32]| {
            (s.iter().map(|v| (*v as f64) * (*v as f64)).sum::<f64>() / s.len() as f64).sqrt()
        };
        let out_rms = rms(&out.samples);
        let expected = 0.5f64 / std::f64::consts::SQRT_2;
        assert!(
            (out_rms - expected).abs() / expected < 0.05,
            "rms {out_rms} expected ≈ {expected}"
        );
    }

    #[test]
    fn empty_input_yields_empty_output_at_target_rate() {
        let buf = AudioBuffer::new(vec![], 44_100);
        let out = resample(buf, 22_050).expect("resample");
        assert!(out.is_empty());
        assert_eq!(out.sample_rate, 22_050);
    }
}

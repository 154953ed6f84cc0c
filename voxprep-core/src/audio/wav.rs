//! WAV decode/encode via hound.
//!
//! Inputs may use any standard PCM encoding (integer or float) and any
//! channel count; decoding reduces multi-channel sources to mono by
//! averaging channels per frame. Output is always 16-bit PCM mono.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::audio::buffer::AudioBuffer;
use crate::error::{PrepError, Result};

fn malformed(path: &Path, reason: impl ToString) -> PrepError {
    PrepError::MalformedAudio {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Decode a WAV file into a mono `AudioBuffer` at its native rate.
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    let mut reader = WavReader::open(path).map_err(|e| malformed(path, e))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(malformed(path, "zero channels"));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| malformed(path, e))?,
        SampleFormat::Int => {
            let max = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| malformed(path, e))?
        }
    };

    if channels == 1 {
        return Ok(AudioBuffer::new(interleaved, spec.sample_rate));
    }

    let frames = interleaved.len() / channels;
    let mut mono = Vec::with_capacity(frames);
    for f in 0..frames {
        let base = f * channels;
        let sum: f32 = interleaved[base..base + channels].iter().sum();
        mono.push(sum / channels as f32);
    }
    Ok(AudioBuffer::new(mono, spec.sample_rate))
}

/// Encode a buffer as 16-bit PCM mono WAV at its own sample rate.
pub fn write_wav_16bit(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(|e| PrepError::Encode(e.to_string()))?;
    for &value in &buffer.samples {
        let scaled = (value.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer
            .write_sample(scaled)
            .map_err(|e| PrepError::Encode(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| PrepError::Encode(e.to_string()))?;
    Ok(())
}

//! Per-clip metadata sidecars.
//!
//! Every written output WAV gets a companion `<output>.json` describing
//! the processed clip. The field set is the contract the synthesis-side
//! tooling reads; a record never changes after creation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audio::buffer::AudioBuffer;
use crate::error::{PrepError, Result};
use crate::loudness;

/// Metadata describing one processed output clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipMetadata {
    /// Output WAV filename (no directory).
    pub filename: String,
    /// Source WAV filename (no directory).
    pub orig_file: String,
    /// Sample rate of the output in Hz.
    pub sr: u32,
    /// Output duration in seconds.
    pub duration_s: f64,
    /// Measured RMS level of the output in dBFS.
    pub rms_db: f32,
    /// Largest absolute sample value in the output, 0..1.
    pub peak: f32,
}

impl ClipMetadata {
    /// Measure a finished buffer about to be written to `out_path`.
    pub fn measure(buffer: &AudioBuffer, in_path: &Path, out_path: &Path) -> Self {
        Self {
            filename: file_name(out_path),
            orig_file: file_name(in_path),
            sr: buffer.sample_rate,
            duration_s: buffer.duration_secs(),
            rms_db: loudness::rms_db(&buffer.samples),
            peak: buffer.peak(),
        }
    }

    /// Sidecar path for an output WAV: the audio path plus a `.json` suffix.
    pub fn sidecar_path(audio_path: &Path) -> PathBuf {
        let mut os = audio_path.as_os_str().to_os_string();
        os.push(".json");
        PathBuf::from(os)
    }

    /// Write the sidecar next to `audio_path`, returning its path.
    pub fn write_sidecar(&self, audio_path: &Path) -> Result<PathBuf> {
        let path = Self::sidecar_path(audio_path);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PrepError::Other(anyhow::Error::from(e)))?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> ClipMetadata {
        ClipMetadata {
            filename: "utt_001.wav".into(),
            orig_file: "utt_001.wav".into(),
            sr: 22_050,
            duration_s: 1.25,
            rms_db: -25.0,
            peak: 0.42,
        }
    }

    #[test]
    fn sidecar_fields_serialize_with_exact_names() {
        let json = serde_json::to_value(sample_metadata()).expect("serialize metadata");
        let object = json.as_object().expect("metadata is an object");
        assert_eq!(object.len(), 6);
        for key in ["filename", "orig_file", "sr", "duration_s", "rms_db", "peak"] {
            assert!(object.contains_key(key), "missing field {key}");
        }
        assert_eq!(json["filename"], "utt_001.wav");
        assert_eq!(json["sr"], 22_050);

        let round_trip: ClipMetadata =
            serde_json::from_value(json).expect("deserialize metadata");
        assert_eq!(round_trip.orig_file, "utt_001.wav");
        assert!((round_trip.duration_s - 1.25).abs() < 1e-9);
    }

    #[test]
    fn sidecar_path_appends_json_suffix() {
        let path = ClipMetadata::sidecar_path(Path::new("data/processed/utt_001.wav"));
        assert_eq!(path, PathBuf::from("data/processed/utt_001.wav.json"));
    }

    #[test]
    fn measure_reads_buffer_properties() {
        let buffer = AudioBuffer::new(vec![0.5, -0.5, 0.5, -0.5], 22_050);
        let meta = ClipMetadata::measure(
            &buffer,
            Path::new("data/raw/in.wav"),
            Path::new("data/processed/out.wav"),
        );
        assert_eq!(meta.filename, "out.wav");
        assert_eq!(meta.orig_file, "in.wav");
        assert_eq!(meta.sr, 22_050);
        assert!((meta.peak - 0.5).abs() < 1e-6);
        assert!((meta.rms_db - (-6.02)).abs() < 0.05);
    }
}

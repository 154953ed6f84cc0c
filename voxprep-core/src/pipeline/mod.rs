//! Pipeline orchestration: per-file stage sequencing and the batch driver.
//!
//! ## Stages (per input file)
//!
//! ```text
//! 1. Decode WAV → mono f32 at native rate
//! 2. Resample to the canonical rate
//! 3. Remove DC offset
//! 4. Zero-phase high-pass (pass-through when not applicable)
//! 5. Voiced-segment trim → NoSpeech when nothing survives
//! 6. RMS normalize to target
//! 7. Peak limit
//! 8. Write 16-bit PCM WAV + JSON sidecar
//! ```
//!
//! Per-file failures are contained: the batch driver logs them with the
//! offending filename, counts them, and moves on to the next file.

pub mod metadata;

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::audio::{buffer::AudioBuffer, resample, wav};
use crate::error::Result;
use crate::filter::{self, HighPassFilter};
use crate::loudness;
use crate::vad::EnergySegmenter;

pub use metadata::ClipMetadata;

/// Configuration for the preprocessing pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Canonical corpus sample rate in Hz. Default: 22050.
    pub sample_rate: u32,
    /// High-pass corner frequency in Hz. Default: 80.0.
    pub highpass_cutoff_hz: f32,
    /// Butterworth high-pass order. Default: 6.
    pub highpass_order: usize,
    /// Segmentation threshold in dB below peak. Default: 30.0.
    pub silence_threshold_db: f32,
    /// Minimum voiced segment duration in seconds. Default: 0.5.
    pub min_segment_s: f32,
    /// Target RMS loudness in dBFS. Default: -25.0.
    pub target_rms_db: f32,
    /// Peak level above which limiting engages. Default: 0.99.
    pub peak_ceiling: f32,
    /// Peak level after limiting. Default: 0.98.
    pub peak_target: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            highpass_cutoff_hz: 80.0,
            highpass_order: 6,
            silence_threshold_db: 30.0,
            min_segment_s: 0.5,
            target_rms_db: -25.0,
            peak_ceiling: 0.99,
            peak_target: 0.98,
        }
    }
}

/// Outcome of one file's run through the pipeline.
#[derive(Debug, Clone)]
pub enum ClipOutcome {
    /// The clip was cleaned and written; metadata describes the output.
    Processed(ClipMetadata),
    /// Nothing survived segmentation — the file is skipped, not failed.
    NoSpeech,
}

/// Totals for one batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Metadata for every clip written.
    pub processed: Vec<ClipMetadata>,
    /// Inputs skipped because nothing survived segmentation.
    pub no_speech: Vec<PathBuf>,
    /// Inputs whose processing failed (malformed audio, I/O errors).
    pub failed: Vec<PathBuf>,
}

impl BatchSummary {
    /// Total number of input files seen.
    pub fn total(&self) -> usize {
        self.processed.len() + self.no_speech.len() + self.failed.len()
    }
}

/// The preprocessing pipeline. Holds the stage configuration and the
/// designed filter; stateless across files.
pub struct Pipeline {
    config: PipelineConfig,
    highpass: Option<HighPassFilter>,
    segmenter: EnergySegmenter,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let highpass = HighPassFilter::new(
            config.highpass_cutoff_hz,
            config.sample_rate,
            config.highpass_order,
        );
        if highpass.is_none() {
            debug!(
                cutoff = config.highpass_cutoff_hz,
                order = config.highpass_order,
                "high-pass design not realisable, stage will pass through"
            );
        }
        let segmenter = EnergySegmenter::new(config.silence_threshold_db, config.min_segment_s);
        Self {
            config,
            highpass,
            segmenter,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the in-memory stages on a decoded buffer.
    ///
    /// Returns `None` when no voiced content survives segmentation.
    pub fn process_buffer(&self, buffer: AudioBuffer) -> Result<Option<AudioBuffer>> {
        let resampled = resample::resample(buffer, self.config.sample_rate)?;

        let mut samples = resampled.samples;
        filter::remove_dc_offset(&mut samples);
        if let Some(ref hp) = self.highpass {
            samples = hp.apply(&samples);
        }
        let filtered = AudioBuffer::new(samples, self.config.sample_rate);

        let Some(mut voiced) = self.segmenter.trim(&filtered) else {
            return Ok(None);
        };

        loudness::normalize_rms(&mut voiced.samples, self.config.target_rms_db);
        loudness::limit_peak(
            &mut voiced.samples,
            self.config.peak_ceiling,
            self.config.peak_target,
        );
        Ok(Some(voiced))
    }

    /// Process one file end to end: decode, clean, write audio + sidecar.
    pub fn process_file(&self, in_path: &Path, out_path: &Path) -> Result<ClipOutcome> {
        let raw = wav::read_wav(in_path)?;
        debug!(
            file = %in_path.display(),
            rate = raw.sample_rate,
            samples = raw.samples.len(),
            "decoded input"
        );

        let Some(cleaned) = self.process_buffer(raw)? else {
            return Ok(ClipOutcome::NoSpeech);
        };

        wav::write_wav_16bit(out_path, &cleaned)?;
        let meta = ClipMetadata::measure(&cleaned, in_path, out_path);
        meta.write_sidecar(out_path)?;
        info!(
            file = %meta.filename,
            duration_s = format_args!("{:.2}", meta.duration_s),
            rms_db = format_args!("{:.1}", meta.rms_db),
            "processed clip"
        );
        Ok(ClipOutcome::Processed(meta))
    }

    /// Process every WAV under `raw_dir` into `out_dir`.
    ///
    /// Files are handled independently in lexicographic order; a failure in
    /// one file is logged and counted but never aborts the batch. An empty
    /// raw directory is a no-op, not an error.
    pub fn process_dir(&self, raw_dir: &Path, out_dir: &Path) -> Result<BatchSummary> {
        let inputs = list_wav_files(raw_dir)?;
        if inputs.is_empty() {
            info!(dir = %raw_dir.display(), "no wav files found — nothing to do");
            return Ok(BatchSummary::default());
        }

        std::fs::create_dir_all(out_dir)?;

        let mut summary = BatchSummary::default();
        for in_path in inputs {
            let out_path = out_dir.join(in_path.file_name().unwrap_or_default());
            match self.process_file(&in_path, &out_path) {
                Ok(ClipOutcome::Processed(meta)) => summary.processed.push(meta),
                Ok(ClipOutcome::NoSpeech) => {
                    warn!(file = %in_path.display(), "no speech detected, skipping");
                    summary.no_speech.push(in_path);
                }
                Err(e) => {
                    error!(file = %in_path.display(), error = %e, "failed to process file");
                    summary.failed.push(in_path);
                }
            }
        }

        info!(
            processed = summary.processed.len(),
            no_speech = summary.no_speech.len(),
            failed = summary.failed.len(),
            "batch complete"
        );
        Ok(summary)
    }
}

/// WAV files under `dir` in lexicographic order. A missing directory is
/// treated as empty.
fn list_wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("wav"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Reference clips for the synthesis tool: processed WAVs in lexicographic
/// order, capped at `max_refs`.
pub fn collect_references(processed_dir: &Path, max_refs: usize) -> Result<Vec<PathBuf>> {
    let mut files = list_wav_files(processed_dir)?;
    files.truncate(max_refs);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    fn tone(freq: f32, amp: f32, secs: f32, rate: u32) -> Vec<f32> {
        let len = (secs * rate as f32) as usize;
        (0..len)
            .map(|i| (std::f32::consts::TAU * freq * i as f32 / rate as f32).sin() * amp)
            .collect()
    }

    #[test]
    fn buffer_with_tone_is_cleaned_to_target_loudness() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let mut samples = vec![0.0f32; 2 * RATE as usize];
        samples.extend(tone(440.0, 0.5, 1.0, RATE));
        samples.extend(vec![0.0f32; 2 * RATE as usize]);

        let out = pipeline
            .process_buffer(AudioBuffer::new(samples, RATE))
            .expect("pipeline run")
            .expect("tone should survive");

        assert_eq!(out.sample_rate, 22_050);
        let dur = out.duration_secs();
        assert!((0.75..=1.4).contains(&dur), "kept duration {dur}");
        let level = loudness::rms_db(&out.samples);
        assert!((level + 25.0).abs() < 0.1, "rms {level} dBFS");
        assert!(out.peak() <= 0.98 + 1e-4);
    }

    #[test]
    fn silent_buffer_reports_no_speech() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let out = pipeline
            .process_buffer(AudioBuffer::new(vec![0.0; RATE as usize], RATE))
            .expect("pipeline run");
        assert!(out.is_none());
    }

    #[test]
    fn rumble_alone_reports_no_speech() {
        // 20 Hz rumble is stripped by the high-pass; the residual carries no
        // segment long enough to survive the minimum-duration filter.
        let pipeline = Pipeline::new(PipelineConfig::default());
        let samples = tone(20.0, 0.4, 2.0, 22_050);
        let out = pipeline
            .process_buffer(AudioBuffer::new(samples, 22_050))
            .expect("pipeline run");
        assert!(out.is_none());
    }

    #[test]
    fn hot_input_is_peak_limited() {
        let mut config = PipelineConfig::default();
        config.target_rms_db = -1.0;
        let pipeline = Pipeline::new(config);

        let samples = tone(440.0, 0.5, 1.5, 22_050);
        let out = pipeline
            .process_buffer(AudioBuffer::new(samples, 22_050))
            .expect("pipeline run")
            .expect("tone should survive");

        assert!(out.peak() <= 0.98 + 1e-4, "peak {}", out.peak());
    }
}

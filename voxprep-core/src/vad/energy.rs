//! Frame-energy voiced/silent splitting.
//!
//! ## Algorithm
//!
//! 1. Compute RMS per `frame_size` window, advancing by `hop_size`.
//! 2. A frame is voiced when its RMS exceeds the buffer's peak frame RMS
//!    attenuated by `threshold_db`.
//! 3. Contiguous voiced frame runs become sample intervals; intervals
//!    shorter than `min_segment_s` are discarded.
//! 4. Survivors are concatenated in original temporal order, no
//!    cross-fade or gap insertion.

use tracing::debug;

use super::VoicedInterval;
use crate::audio::buffer::AudioBuffer;

/// Energy-threshold segmenter for silence trimming.
#[derive(Debug, Clone)]
pub struct EnergySegmenter {
    /// Threshold in dB below the peak frame energy. Default: 30.0.
    pub threshold_db: f32,
    /// Minimum surviving segment duration in seconds. Default: 0.5.
    pub min_segment_s: f32,
    /// Analysis frame size in samples. Default: 2048.
    pub frame_size: usize,
    /// Hop between frames in samples. Default: 512.
    pub hop_size: usize,
}

impl Default for EnergySegmenter {
    fn default() -> Self {
        Self {
            threshold_db: 30.0,
            min_segment_s: 0.5,
            frame_size: 2048,
            hop_size: 512,
        }
    }
}

impl EnergySegmenter {
    /// Create a segmenter with the given thresholds and default frame sizing.
    pub fn new(threshold_db: f32, min_segment_s: f32) -> Self {
        Self {
            threshold_db,
            min_segment_s,
            ..Default::default()
        }
    }

    /// Per-frame RMS; the tail frame is clamped to the buffer end.
    fn frame_rms(&self, samples: &[f32]) -> Vec<f32> {
        let mut rms = Vec::new();
        let mut start = 0;
        while start < samples.len() {
            let end = (start + self.frame_size).min(samples.len());
            let frame = &samples[start..end];
            let sum_sq: f64 = frame.iter().map(|s| (*s as f64) * (*s as f64)).sum();
            rms.push((sum_sq / frame.len() as f64).sqrt() as f32);
            start += self.hop_size;
        }
        rms
    }

    /// Detect voiced intervals that survive the minimum-duration filter.
    ///
    /// A buffer with no energy at all (empty, or entirely zero) yields an
    /// empty list — the no-speech path, not an error.
    pub fn split(&self, buffer: &AudioBuffer) -> Vec<VoicedInterval> {
        let rms = self.frame_rms(&buffer.samples);
        let peak = rms.iter().copied().fold(0.0f32, f32::max);
        if peak <= 0.0 {
            return Vec::new();
        }
        let threshold = peak * 10f32.powf(-self.threshold_db / 20.0);

        let mut intervals = Vec::new();
        let mut run_start: Option<usize> = None;
        for (idx, &level) in rms.iter().enumerate() {
            match (level > threshold, run_start) {
                (true, None) => run_start = Some(idx),
                (false, Some(first)) => {
                    intervals.push(self.to_interval(first, idx - 1, buffer.samples.len()));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(first) = run_start {
            intervals.push(self.to_interval(first, rms.len() - 1, buffer.samples.len()));
        }

        intervals
            .retain(|iv| iv.duration_secs(buffer.sample_rate) >= f64::from(self.min_segment_s));
        intervals
    }

    /// Convert an inclusive frame run to a sample interval. Edges sit on hop
    /// boundaries, so intervals from distinct runs never overlap.
    fn to_interval(&self, first_frame: usize, last_frame: usize, len: usize) -> VoicedInterval {
        VoicedInterval {
            start: first_frame * self.hop_size,
            end: ((last_frame + 1) * self.hop_size).min(len),
        }
    }

    /// Concatenate surviving intervals into a new buffer.
    ///
    /// Returns `None` when nothing survives — the caller reports that as
    /// "no speech detected" and skips the file.
    pub fn trim(&self, buffer: &AudioBuffer) -> Option<AudioBuffer> {
        let intervals = self.split(buffer);
        if intervals.is_empty() {
            return None;
        }
        let total: usize = intervals.iter().map(VoicedInterval::len).sum();
        let mut samples = Vec::with_capacity(total);
        for iv in &intervals {
            samples.extend_from_slice(&buffer.samples[iv.start..iv.end]);
        }
        debug!(
            intervals = intervals.len(),
            kept = samples.len(),
            total = buffer.samples.len(),
            "voiced trim"
        );
        Some(AudioBuffer::new(samples, buffer.sample_rate))
    }
}

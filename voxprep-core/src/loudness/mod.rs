//! RMS measurement, target-loudness gain, and peak limiting.
//!
//! Loudness is expressed in dBFS, where 0 dB corresponds to a full-scale
//! amplitude of 1.0. Silent buffers measure at [`DB_FLOOR`] rather than
//! −∞ so downstream arithmetic stays finite.

use tracing::debug;

/// Clamped loudness floor reported for silent or empty buffers.
pub const DB_FLOOR: f32 = -999.0;

/// Measured levels at or below this are treated as silence by the gain
/// stage; such buffers are never boosted.
const GAIN_GATE_DB: f32 = -900.0;

/// RMS at or below this counts as silence when converting to dB.
const SILENCE_RMS: f64 = 1e-9;

/// Root-mean-square amplitude of `samples`; 0.0 for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|s| (*s as f64) * (*s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// RMS level in dBFS, floored at [`DB_FLOOR`] for silent input.
pub fn rms_db(samples: &[f32]) -> f32 {
    let level = rms(samples) as f64;
    if level <= SILENCE_RMS {
        return DB_FLOOR;
    }
    (20.0 * level.log10()) as f32
}

/// Apply gain so the buffer's RMS reaches `target_db`.
///
/// A buffer measuring at the silence floor is left unchanged.
pub fn normalize_rms(samples: &mut [f32], target_db: f32) {
    let measured = rms_db(samples);
    if measured <= GAIN_GATE_DB {
        debug!(measured, "buffer at silence floor, skipping gain");
        return;
    }
    let gain = 10f32.powf((target_db - measured) / 20.0);
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}

/// Scale the buffer down when its absolute peak exceeds `ceiling`, leaving
/// the peak at `target`. Runs after the gain stage as the final safety step.
pub fn limit_peak(samples: &mut [f32], ceiling: f32, target: f32) {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > ceiling {
        let scale = target / peak;
        for sample in samples.iter_mut() {
            *sample *= scale;
        }
        debug!(peak, scale, "peak limited");
    }
}

//! DC-offset removal and zero-phase high-pass filtering.
//!
//! The high-pass strips rumble below the voice band before segmentation.
//! It is an order-6 Butterworth realised as cascaded biquad sections and
//! applied forward-then-backward, so the filtered signal keeps its
//! original phase and segment boundaries are not time-shifted.

use tracing::debug;

/// Subtract the arithmetic mean from every sample.
///
/// An empty buffer is left untouched.
pub fn remove_dc_offset(samples: &mut [f32]) {
    if samples.is_empty() {
        return;
    }
    let mean = (samples.iter().map(|s| *s as f64).sum::<f64>() / samples.len() as f64) as f32;
    for sample in samples.iter_mut() {
        *sample -= mean;
    }
}

/// One biquad section, normalized so a0 = 1.
#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    /// RBJ-cookbook high-pass section for a given corner and Q.
    fn highpass(cutoff_hz: f64, sample_rate: f64, q: f64) -> Self {
        let w0 = std::f64::consts::TAU * cutoff_hz / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);
        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 + cos_w0) / 2.0) / a0,
            b1: -(1.0 + cos_w0) / a0,
            b2: ((1.0 + cos_w0) / 2.0) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Run the section over `samples` in place (direct form II transposed).
    fn run(&self, samples: &mut [f64]) {
        let (mut z1, mut z2) = (0.0f64, 0.0f64);
        for x in samples.iter_mut() {
            let y = self.b0 * *x + z1;
            z1 = self.b1 * *x - self.a1 * y + z2;
            z2 = self.b2 * *x - self.a2 * y;
            *x = y;
        }
    }
}

/// Zero-phase Butterworth high-pass filter.
///
/// The order-n Butterworth response is built as n/2 high-pass biquads with
/// the Butterworth Q ladder, Q_k = 1 / (2·cos((2k+1)π / 2n)).
#[derive(Debug, Clone)]
pub struct HighPassFilter {
    sections: Vec<Biquad>,
    /// Odd-reflection padding added on each side before the forward pass.
    pad_len: usize,
}

impl HighPassFilter {
    /// Design an order-`order` Butterworth high-pass at `cutoff_hz`.
    ///
    /// Returns `None` when the design is not realisable (cutoff at or above
    /// Nyquist, zero or odd order); callers treat that as a pass-through.
    pub fn new(cutoff_hz: f32, sample_rate: u32, order: usize) -> Option<Self> {
        let nyquist = sample_rate as f64 / 2.0;
        let cutoff = cutoff_hz as f64;
        if cutoff <= 0.0 || cutoff >= nyquist || order == 0 || order % 2 != 0 {
            return None;
        }
        let n = order as f64;
        let sections = (0..order / 2)
            .map(|k| {
                let phi = std::f64::consts::PI * (2 * k + 1) as f64 / (2.0 * n);
                Biquad::highpass(cutoff, sample_rate as f64, 1.0 / (2.0 * phi.cos()))
            })
            .collect();
        Some(Self {
            sections,
            pad_len: 3 * (order + 1),
        })
    }

    /// Shortest input the zero-phase pass accepts; anything shorter is
    /// passed through unmodified by [`apply`](Self::apply).
    pub fn min_input_len(&self) -> usize {
        self.pad_len + 1
    }

    /// Filter `samples` forward and backward, cancelling phase distortion.
    ///
    /// Buffers too short for the reflection padding are returned unchanged
    /// rather than failing the pipeline run.
    pub fn apply(&self, samples: &[f32]) -> Vec<f32> {
        if samples.len() < self.min_input_len() {
            debug!(
                len = samples.len(),
                min = self.min_input_len(),
                "buffer too short for zero-phase filtering, passing through"
            );
            return samples.to_vec();
        }

        let pad = self.pad_len;
        let n = samples.len();
        let mut extended = Vec::with_capacity(n + 2 * pad);
        // Odd reflection at both ends keeps the edges continuous
        let first = samples[0] as f64;
        for i in (1..=pad).rev() {
            extended.push(2.0 * first - samples[i] as f64);
        }
        extended.extend(samples.iter().map(|s| *s as f64));
        let last = samples[n - 1] as f64;
        for i in 1..=pad {
            extended.push(2.0 * last - samples[n - 1 - i] as f64);
        }

        for section in &self.sections {
            section.run(&mut extended);
        }
        extended.reverse();
        for section in &self.sections {
            section.run(&mut extended);
        }
        extended.reverse();

        extended[pad..pad + n].iter().map(|s| *s as f32).collect()
    }
}

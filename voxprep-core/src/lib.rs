//! # voxprep-core
//!
//! Preprocessing engine for voice-cloning datasets: raw speech recordings
//! in, normalized silence-trimmed training clips out.
//!
//! ## Pipeline
//!
//! ```text
//! raw WAV → decode (mono mixdown) → resample (22.05 kHz) → DC removal
//!         → zero-phase high-pass (80 Hz) → voiced-segment trim
//!         → RMS normalize (−25 dBFS) → peak limit → 16-bit PCM + sidecar
//! ```
//!
//! Each stage consumes its predecessor's buffer. Nothing is shared across
//! files, and a failure in one file never aborts a batch.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod error;
pub mod filter;
pub mod loudness;
pub mod pipeline;
pub mod vad;

// Convenience re-exports for downstream crates
pub use audio::buffer::AudioBuffer;
pub use error::PrepError;
pub use pipeline::{
    collect_references, BatchSummary, ClipMetadata, ClipOutcome, Pipeline, PipelineConfig,
};
pub use vad::{EnergySegmenter, VoicedInterval};

//! `voxprep` batch entry point.
//!
//! Reads every WAV under `data/raw`, runs the preprocessing pipeline, and
//! writes cleaned clips plus metadata sidecars to `data/processed`. The
//! directories are fixed conventions shared with the recording and
//! synthesis tools; there are no flags.

use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voxprep_core::{Pipeline, PipelineConfig};

const RAW_DIR: &str = "data/raw";
const PROCESSED_DIR: &str = "data/processed";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pipeline = Pipeline::new(PipelineConfig::default());
    let summary = pipeline.process_dir(Path::new(RAW_DIR), Path::new(PROCESSED_DIR))?;

    if summary.total() == 0 {
        info!("no recordings in {RAW_DIR} — record or copy WAV files there first");
    } else {
        info!(
            processed = summary.processed.len(),
            no_speech = summary.no_speech.len(),
            failed = summary.failed.len(),
            "preprocessing finished — clips in {PROCESSED_DIR}"
        );
    }
    Ok(())
}

//! Replay: serialize/deserialize sweep logs for offline re-tuning.

use crate::sweep_sim::SweepFrame;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use targeting_core::TargetingConfig;

/// A full recorded run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayLog {
    pub scenario_name: String,
    pub seed: u64,
    pub sweep_period_us: u32,
    /// Configuration the log was recorded with
    #[serde(default)]
    pub config: TargetingConfig,
    /// All sweeps in chronological order
    pub frames: Vec<SweepFrame>,
}

/// Save a replay log to a JSON file.
pub fn save_replay(log: &ReplayLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, log)?;
    Ok(())
}

/// Load a replay log from a JSON file.
pub fn load_replay(path: &Path) -> anyhow::Result<ReplayLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: ReplayLog = serde_json::from_reader(reader)?;
    tracing::debug!(scenario = %log.scenario_name, sweeps = log.frames.len(), "replay loaded");
    Ok(log)
}

//! Closed-loop evaluation: feed recorded or synthesised sweeps through the
//! targeting pipeline and score the track against ground truth.

use crate::sweep_sim::SweepFrame;
use targeting_core::{gyro::OmegaZCell, metrics::TrackingMetrics, Pipeline, TargetingConfig};

/// Run `frames` through a fresh pipeline built from `config`.
pub fn evaluate(config: &TargetingConfig, frames: &[SweepFrame]) -> TrackingMetrics {
    let mut metrics = TrackingMetrics::default();
    let Some(first) = frames.first() else {
        return metrics;
    };

    // Stands in for the IMU interrupt handing samples to the sweep handler
    let gyro = OmegaZCell::new();
    let mut pipeline = Pipeline::new(config.clone(), first.time);

    for frame in frames {
        if let Some(sample) = frame.omega_z {
            gyro.write(sample);
        }
        let out = pipeline.process_sweep(&frame.sweep(), frame.time, gyro.read());
        metrics.accumulate(
            out.action,
            out.tracking.valid,
            out.fire,
            pipeline.track.position_mm(),
            frame.truth_mm.map(|[x, y]| (x, y)),
        );
    }

    tracing::debug!(
        sweeps = metrics.n_sweeps,
        valid = metrics.n_valid,
        rmse = metrics.rmse_position(),
        "evaluation finished"
    );
    metrics
}

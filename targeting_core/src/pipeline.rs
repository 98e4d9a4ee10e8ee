//! Pipeline orchestrator: the full targeting cycle for one completed sweep.
//!
//! # Processing steps per sweep
//! 1. Segment the detections into objects (size-gated)
//! 2. Emit the object list to telemetry
//! 3. No objects → coast the track on rotation alone
//! 4. Otherwise predict the track to the sweep time (stale tracks hold)
//! 5. Associate: nearest to prediction (active) or nearest to us (stale)
//! 6. Gate: correct / reset on acceptance, coast on rejection
//! 7. Emit the tracking summary and the firing decision

use crate::{
    association::{select_object, Selection},
    autofire::AutofireParams,
    config::TargetingConfig,
    error::TargetingResult,
    segmentation::{ObjectList, SegmentationParams, Segmenter},
    store::ParameterStore,
    telemetry::{NullSink, ObjectsTelemetry, TelemetrySink, TrackingTelemetry},
    track::{Correction, Track},
    types::{Micros, Sweep},
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// What happened to the track this sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepAction {
    /// Alpha-beta correction toward the selected object
    Corrected,
    /// Stale track re-initialised on the selected object
    Reset,
    /// No acceptable object; prediction only
    Coasted,
}

impl From<Correction> for SweepAction {
    fn from(c: Correction) -> Self {
        match c {
            Correction::Filtered => SweepAction::Corrected,
            Correction::Reset => SweepAction::Reset,
        }
    }
}

/// Outputs of one pipeline step.
#[derive(Clone, Debug)]
pub struct SweepOutput {
    /// Objects called out this sweep
    pub objects: ObjectList,
    /// Best association candidate, whether or not it passed the gate
    pub selected: Option<Selection>,
    pub action: SweepAction,
    pub tracking: TrackingTelemetry,
    /// Autofire decision for the external weapon sequencer
    pub fire: bool,
    /// Wall-clock processing time
    pub total_time_us: u64,
}

/// Owns the segmenter, the single track and the parameter store.
pub struct Pipeline {
    segmenter: Segmenter,
    pub track: Track,
    pub autofire: AutofireParams,
    store: Box<dyn ParameterStore>,
    sink: Box<dyn TelemetrySink>,
}

impl Pipeline {
    /// Create a pipeline with a stale track at `now`, an in-memory store and
    /// no telemetry.
    pub fn new(config: TargetingConfig, now: Micros) -> Self {
        Self {
            segmenter: Segmenter::new(config.segmentation, config.geometry),
            track: Track::with_params(now, config.tracking),
            autofire: config.autofire,
            store: Box::new(crate::store::MemoryStore::new()),
            sink: Box::new(NullSink),
        }
    }

    /// Create a pipeline whose segmentation thresholds come from `store`,
    /// falling back to `config.segmentation` if nothing was ever saved.
    pub fn restore(
        config: TargetingConfig,
        now: Micros,
        store: Box<dyn ParameterStore>,
    ) -> TargetingResult<Self> {
        let mut pipeline = Self::new(config, now);
        if let Some(params) = store.restore()? {
            tracing::info!(?params, "restored segmentation parameters");
            pipeline.segmenter.set_params(params);
        }
        pipeline.store = store;
        Ok(pipeline)
    }

    pub fn with_sink(mut self, sink: Box<dyn TelemetrySink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    /// Replace the segmentation thresholds and persist them. Invalid values
    /// are rejected and neither applied nor saved.
    pub fn set_segmentation_params(
        &mut self,
        min_object_size: i16,
        max_object_size: i16,
        edge_call_threshold: i16,
    ) -> TargetingResult<()> {
        let params = SegmentationParams {
            min_object_size: min_object_size as i32,
            max_object_size: max_object_size as i32,
            edge_call_threshold: edge_call_threshold as i32,
        };
        params.validate()?;
        self.segmenter.set_params(params);
        tracing::info!(?params, "segmentation parameters set");
        self.store.save(&params)
    }

    /// Replace the tracking filter parameters (gates in mm, stored squared).
    pub fn set_tracking_filter_params(
        &mut self,
        alpha: i16,
        beta: i16,
        min_num_updates: i8,
        track_lost_dt: u32,
        max_off_track: i16,
        max_start_distance: i16,
    ) {
        self.track.set_tracking_filter_params(
            alpha,
            beta,
            min_num_updates,
            track_lost_dt,
            max_off_track,
            max_start_distance,
        );
    }

    /// Process one sweep. `omega_z` is the latest raw gyro sample, `None`
    /// if the IMU has not produced one (read as zero rate).
    pub fn process_sweep(
        &mut self,
        detections: &Sweep,
        now: Micros,
        omega_z: Option<i16>,
    ) -> SweepOutput {
        let start = Instant::now();
        let omega_z = omega_z.unwrap_or(0);

        // Steps 1-2
        let objects = self.segmenter.segment(detections, now);
        self.sink
            .send_objects(&ObjectsTelemetry::from_objects(now, &objects));

        // Steps 3-6
        let (selected, action) = if objects.is_empty() {
            self.track.update_no_obs(now, omega_z);
            (None, SweepAction::Coasted)
        } else {
            self.track.advance(now, omega_z);
            match select_object(&objects, &self.track) {
                Some(sel) => {
                    let best = &objects[sel.index];
                    let action = if self.track.wants_update(best.time, sel.distance_sq) {
                        self.track.update(best, omega_z).into()
                    } else {
                        tracing::trace!(distance_sq = sel.distance_sq, "association outside gate");
                        self.track.update_no_obs(best.time, omega_z);
                        SweepAction::Coasted
                    };
                    (Some(sel), action)
                }
                None => (None, SweepAction::Coasted),
            }
        };

        // Step 7
        let tracking = TrackingTelemetry::new(
            now,
            selected.map(|sel| &objects[sel.index]),
            &self.track,
        );
        self.sink.send_tracking(&tracking);
        let fire = self.autofire.should_fire(&self.track, now, omega_z);

        SweepOutput {
            objects,
            selected,
            action,
            tracking,
            fire,
            total_time_us: start.elapsed().as_micros() as u64,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

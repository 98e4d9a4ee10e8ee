//! `targeting_core` — Weapon-targeting object segmentation and tracking.
//!
//! All per-sweep arithmetic is fixed-point integer; no floating-point trig.
//!
//! # Module layout
//! - [`fixed`]        — Q11 angles, track scale, integer sin/cos/atan
//! - [`types`]        — Detections, sweeps, sensor geometry
//! - [`object`]       — Object spans and their derived geometry
//! - [`segmentation`] — Edge-detection pass with size gate
//! - [`track`]        — Fixed-point alpha-beta track with yaw compensation
//! - [`association`]  — Per-sweep object selection
//! - [`gyro`]         — Lock-free latest-sample cell for the yaw rate
//! - [`autofire`]     — Strike-zone firing decision
//! - [`telemetry`]    — Per-sweep payloads and sinks
//! - [`store`]        — Segmentation record persistence
//! - [`config`]       — JSON-loadable configuration bundle
//! - [`pipeline`]     — Per-sweep orchestrator
//! - [`metrics`]      — RMSE / time-on-target against ground truth

pub mod association;
pub mod autofire;
pub mod config;
pub mod error;
pub mod fixed;
pub mod gyro;
pub mod metrics;
pub mod object;
pub mod pipeline;
pub mod segmentation;
pub mod store;
pub mod telemetry;
pub mod track;
pub mod types;

pub use config::TargetingConfig;
pub use error::{TargetingError, TargetingResult};
pub use object::Object;
pub use pipeline::{Pipeline, SweepAction, SweepOutput};
pub use segmentation::{ObjectList, SegmentationParams, Segmenter};
pub use track::{Track, TrackParams};
pub use types::{Detection, Micros, SensorGeometry, Sweep, MAX_OBJECTS, SEGMENT_COUNT};

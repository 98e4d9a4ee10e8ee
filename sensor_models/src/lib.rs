//! `sensor_models` — Floating-point arena geometry and the multi-beam range
//! sensor model used to synthesise sweeps.

pub mod geometry;
pub mod range_sensor;

pub use geometry::{Arena, Disc};
pub use range_sensor::{RangeSensor, RangeSensorParams};

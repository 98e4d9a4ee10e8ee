//! Fundamental types used across the entire workspace.

use crate::fixed::{ANGLE_SCALE, PI};
use serde::{Deserialize, Serialize};

/// Number of angular segments in one sweep.
pub const SEGMENT_COUNT: usize = 16;

/// Maximum number of objects produced by one segmentation pass.
pub const MAX_OBJECTS: usize = 8;

/// Sensor-clock timestamp in microseconds. Wraps after ~71 minutes; all
/// interval arithmetic uses `wrapping_sub`.
pub type Micros = u32;

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Range return for one angular segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Detection {
    /// Segment index, 0 is the rightmost slice of the field of view
    pub segment: u8,
    /// Measured distance in sensor units (cm). Values outside the
    /// configured detection window are "no return" sentinels.
    pub distance: i16,
}

impl Detection {
    pub fn new(segment: u8, distance: i16) -> Self {
        Self { segment, distance }
    }
}

/// One full sweep, indexed by segment.
pub type Sweep = [Detection; SEGMENT_COUNT];

/// Build a sweep from raw per-segment distances.
pub fn sweep_from_distances(distances: &[i16; SEGMENT_COUNT]) -> Sweep {
    let mut sweep = [Detection::default(); SEGMENT_COUNT];
    for (i, (det, &d)) in sweep.iter_mut().zip(distances.iter()).enumerate() {
        *det = Detection::new(i as u8, d);
    }
    sweep
}

// ---------------------------------------------------------------------------
// SensorGeometry
// ---------------------------------------------------------------------------

/// Calibration of the segment → bearing and distance → millimetre mapping.
///
/// Segment `i` covers bearings `[(i − N/2)·w, (i + 1 − N/2)·w)` where
/// `w = field_of_view / N`; bearing 0 is straight ahead (+x) and positive
/// bearings are to the left (+y).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorGeometry {
    /// Total horizontal field of view, radians in Q11
    pub field_of_view: i32,
    /// Millimetres per sensor distance unit
    pub mm_per_unit: i32,
    /// Shortest distance (sensor units) accepted as a real return
    pub min_detection_distance: i32,
    /// Longest distance accepted; also the value substituted for no-return
    pub max_detection_distance: i32,
}

impl Default for SensorGeometry {
    fn default() -> Self {
        Self {
            field_of_view: PI, // 180°
            mm_per_unit: 10,   // sensor reports cm
            min_detection_distance: 1,
            max_detection_distance: 1500,
        }
    }
}

impl SensorGeometry {
    /// Angular width of one segment (Q11 radians).
    pub fn segment_width(&self) -> i32 {
        self.field_of_view / SEGMENT_COUNT as i32
    }

    /// Bearing (Q11 radians) of the centre of the span `[left, right)`.
    pub fn bearing(&self, left: u8, right: u8) -> i32 {
        let doubled_center = left as i32 + right as i32 - SEGMENT_COUNT as i32;
        doubled_center * self.field_of_view / (2 * SEGMENT_COUNT as i32)
    }

    /// Angular extent (Q11 radians) of `span` segments.
    pub fn span_angle(&self, span: u8) -> i32 {
        span as i32 * self.field_of_view / SEGMENT_COUNT as i32
    }

    /// Mean radial distance in millimetres.
    pub fn radius_mm(&self, sum_distance: i32, span: u8) -> i32 {
        if span == 0 {
            return 0;
        }
        sum_distance * self.mm_per_unit / span as i32
    }

    /// Raw distance with no-return sentinels replaced by the far limit.
    pub fn effective_distance(&self, raw: i16) -> i32 {
        let d = raw as i32;
        if d < self.min_detection_distance || d > self.max_detection_distance {
            self.max_detection_distance
        } else {
            d
        }
    }

    /// Circumferential length (mm) subtended by `span` segments at `radius_mm`.
    pub fn arc_length_mm(&self, radius_mm: i32, span: u8) -> i32 {
        (radius_mm as i64 * self.span_angle(span) as i64 / ANGLE_SCALE as i64) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_is_symmetric_about_boresight() {
        let g = SensorGeometry::default();
        assert_eq!(g.bearing(0, 16), 0);
        assert_eq!(g.bearing(7, 9), 0);
        assert_eq!(g.bearing(0, 1), -g.bearing(15, 16));
        assert!(g.bearing(12, 14) > 0, "high segments look left");
    }

    #[test]
    fn sentinels_read_as_far_background() {
        let g = SensorGeometry::default();
        assert_eq!(g.effective_distance(0), 1500);
        assert_eq!(g.effective_distance(-3), 1500);
        assert_eq!(g.effective_distance(10_000), 1500);
        assert_eq!(g.effective_distance(250), 250);
    }

    #[test]
    fn sweep_builder_numbers_segments() {
        let sweep = sweep_from_distances(&[7; SEGMENT_COUNT]);
        for (i, d) in sweep.iter().enumerate() {
            assert_eq!(d.segment as usize, i);
            assert_eq!(d.distance, 7);
        }
    }
}

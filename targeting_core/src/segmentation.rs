//! Object segmentation: single left-to-right edge-detection pass over a sweep.
//!
//! # Edges
//! A delta exactly equal to `edge_call_threshold` calls an edge.
//!
//! - A drop of at least `edge_call_threshold` between adjacent segments opens
//!   a **left edge** (a nearer surface starts).
//! - A rise of at least the threshold closes a **right edge**, but only while
//!   a left edge is open (`left_edge >= right_edge`). The start of the field
//!   of view counts as an open left edge.
//!
//! Each closed span is admitted only if its circumferential size lies
//! strictly between `min_object_size` and `max_object_size`. A left edge still
//! open at the end of the sweep is closed at the field-of-view boundary; a
//! sweep with no edges at all yields nothing.

use crate::{
    error::{TargetingError, TargetingResult},
    object::Object,
    types::{Micros, SensorGeometry, Sweep, MAX_OBJECTS, SEGMENT_COUNT},
};
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Bounded list of objects from one sweep.
pub type ObjectList = ArrayVec<Object, MAX_OBJECTS>;

/// Segmentation thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationParams {
    /// Smallest accepted circumferential size (mm, exclusive)
    pub min_object_size: i32,
    /// Largest accepted circumferential size (mm, exclusive)
    pub max_object_size: i32,
    /// Minimum distance step between adjacent segments that calls an edge (cm)
    pub edge_call_threshold: i32,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            min_object_size: 200,
            max_object_size: 1800,
            edge_call_threshold: 60,
        }
    }
}

impl SegmentationParams {
    /// Reject an empty size window or a non-positive edge threshold.
    pub fn validate(&self) -> TargetingResult<()> {
        if self.min_object_size >= self.max_object_size {
            return Err(TargetingError::InvalidParameter(format!(
                "object size window {}..{} is empty",
                self.min_object_size, self.max_object_size
            )));
        }
        if self.edge_call_threshold <= 0 {
            return Err(TargetingError::InvalidParameter(
                "edge_call_threshold must be positive".into(),
            ));
        }
        Ok(())
    }

    fn admits(&self, size: i32) -> bool {
        size > self.min_object_size && size < self.max_object_size
    }
}

/// Turns sweeps into object lists using the current thresholds.
#[derive(Clone, Debug)]
pub struct Segmenter {
    params: SegmentationParams,
    geometry: SensorGeometry,
}

impl Segmenter {
    pub fn new(params: SegmentationParams, geometry: SensorGeometry) -> Self {
        Self { params, geometry }
    }

    pub fn params(&self) -> &SegmentationParams {
        &self.params
    }

    /// Replace the thresholds; takes effect on the next sweep.
    pub fn set_params(&mut self, params: SegmentationParams) {
        self.params = params;
    }

    pub fn geometry(&self) -> &SensorGeometry {
        &self.geometry
    }

    /// Segment one sweep taken at `now`.
    pub fn segment(&self, detections: &Sweep, now: Micros) -> ObjectList {
        let geometry = &self.geometry;
        let threshold = self.params.edge_call_threshold;
        let mut objects = ObjectList::new();

        let mut left_edge = 0u8;
        let mut right_edge = 0u8;
        let mut last_distance = geometry.effective_distance(detections[0].distance);
        let mut sum_distance = last_distance;

        // A nearer object partly hiding a farther one only yields the nearer one.
        for (i, detection) in detections.iter().enumerate().skip(1) {
            let i = i as u8;
            let distance = geometry.effective_distance(detection.distance);
            let delta = distance - last_distance;
            if delta <= -threshold {
                left_edge = i;
                sum_distance = 0;
            } else if delta >= threshold && left_edge >= right_edge {
                right_edge = i;
                self.admit(
                    &mut objects,
                    Object::new(left_edge, right_edge, sum_distance, now, *geometry),
                );
                sum_distance = 0;
            }
            sum_distance += distance;
            last_distance = distance;
        }

        if left_edge > right_edge {
            self.admit(
                &mut objects,
                Object::new(left_edge, SEGMENT_COUNT as u8, sum_distance, now, *geometry),
            );
        }

        objects
    }

    fn admit(&self, objects: &mut ObjectList, object: Object) {
        let size = object.size();
        if !self.params.admits(size) {
            tracing::trace!(
                left = object.left_edge,
                right = object.right_edge,
                size,
                "span rejected by size gate"
            );
            return;
        }
        if objects.try_push(object).is_err() {
            tracing::trace!("object list full, dropping span");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sweep_from_distances;

    fn segmenter() -> Segmenter {
        Segmenter::new(SegmentationParams::default(), SensorGeometry::default())
    }

    fn check_invariants(seg: &Segmenter, objects: &ObjectList) {
        let p = seg.params();
        for o in objects {
            assert!(o.left_edge < o.right_edge);
            assert!(o.right_edge as usize <= SEGMENT_COUNT);
            assert!(o.size() > p.min_object_size && o.size() < p.max_object_size);
        }
    }

    #[test]
    fn single_object_between_two_edges() {
        let sweep = sweep_from_distances(&[
            100, 100, 100, 40, 40, 40, 100, 100, 100, 100, 100, 100, 100, 100, 100, 100,
        ]);
        let seg = segmenter();
        let objects = seg.segment(&sweep, 1234);
        assert_eq!(objects.len(), 1);
        let o = &objects[0];
        assert_eq!((o.left_edge, o.right_edge), (3, 6));
        assert_eq!(o.sum_distance, 120);
        assert_eq!(o.radius(), 400);
        assert_eq!(o.time, 1234);
        assert!((200..=1800).contains(&o.size()));
        check_invariants(&seg, &objects);
    }

    #[test]
    fn same_input_same_output() {
        let sweep = sweep_from_distances(&[
            300, 300, 90, 90, 90, 300, 300, 300, 120, 120, 120, 120, 300, 300, 300, 300,
        ]);
        let seg = segmenter();
        assert_eq!(seg.segment(&sweep, 5), seg.segment(&sweep, 5));
    }

    #[test]
    fn flat_sweep_produces_nothing() {
        let seg = segmenter();
        assert!(seg.segment(&sweep_from_distances(&[80; SEGMENT_COUNT]), 0).is_empty());
        assert!(seg.segment(&sweep_from_distances(&[0; SEGMENT_COUNT]), 0).is_empty());
    }

    #[test]
    fn gentle_slope_produces_nothing() {
        let mut distances = [0i16; SEGMENT_COUNT];
        for (i, d) in distances.iter_mut().enumerate() {
            *d = 100 + 30 * i as i16;
        }
        assert!(segmenter().segment(&sweep_from_distances(&distances), 0).is_empty());
    }

    #[test]
    fn open_left_edge_closes_at_boundary() {
        let sweep = sweep_from_distances(&[
            300, 300, 300, 300, 300, 300, 300, 300, 300, 300, 300, 300, 50, 50, 50, 50,
        ]);
        let objects = segmenter().segment(&sweep, 0);
        assert_eq!(objects.len(), 1);
        assert_eq!((objects[0].left_edge, objects[0].right_edge), (12, 16));
        assert_eq!(objects[0].radius(), 500);
    }

    #[test]
    fn object_at_start_of_field_of_view() {
        let sweep = sweep_from_distances(&[
            50, 50, 50, 300, 300, 300, 300, 300, 300, 300, 300, 300, 300, 300, 300, 300,
        ]);
        let objects = segmenter().segment(&sweep, 0);
        assert_eq!(objects.len(), 1);
        assert_eq!((objects[0].left_edge, objects[0].right_edge), (0, 3));
        assert_eq!(objects[0].radius(), 500);
    }

    #[test]
    fn two_objects_are_both_reported() {
        let sweep = sweep_from_distances(&[
            300, 60, 60, 60, 300, 300, 300, 300, 300, 300, 70, 70, 70, 300, 300, 300,
        ]);
        let seg = segmenter();
        let objects = seg.segment(&sweep, 0);
        let spans: Vec<_> = objects.iter().map(|o| (o.left_edge, o.right_edge)).collect();
        assert_eq!(spans, vec![(1, 4), (10, 13)]);
        check_invariants(&seg, &objects);
    }

    #[test]
    fn oversized_and_undersized_spans_are_dropped() {
        // One segment at 40 cm is ~78 mm across.
        let narrow = sweep_from_distances(&[
            200, 200, 200, 200, 40, 200, 200, 200, 200, 200, 200, 200, 200, 200, 200, 200,
        ]);
        assert!(segmenter().segment(&narrow, 0).is_empty());

        // Twelve segments at 5 m is several metres of wall.
        let wall = sweep_from_distances(&[
            1000, 1000, 500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 1000, 1000,
        ]);
        assert!(segmenter().segment(&wall, 0).is_empty());
    }

    #[test]
    fn rise_without_open_left_edge_is_ignored() {
        let sweep = sweep_from_distances(&[
            300, 60, 60, 60, 300, 300, 400, 500, 600, 700, 800, 900, 1000, 1100, 1200, 1300,
        ]);
        let objects = segmenter().segment(&sweep, 0);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].right_edge, 4);
    }

    #[test]
    fn threshold_changes_apply_to_next_sweep() {
        let sweep = sweep_from_distances(&[
            100, 100, 100, 40, 40, 40, 100, 100, 100, 100, 100, 100, 100, 100, 100, 100,
        ]);
        let mut seg = segmenter();
        seg.set_params(SegmentationParams {
            edge_call_threshold: 61,
            ..Default::default()
        });
        assert!(seg.segment(&sweep, 0).is_empty());
    }

    #[test]
    fn validate_rejects_unusable_thresholds() {
        assert!(SegmentationParams::default().validate().is_ok());
        let zero_edge = SegmentationParams {
            edge_call_threshold: 0,
            ..Default::default()
        };
        assert!(zero_edge.validate().is_err());
        let empty_window = SegmentationParams {
            min_object_size: 1800,
            max_object_size: 200,
            ..Default::default()
        };
        assert!(empty_window.validate().is_err());
    }

    #[test]
    fn missing_returns_do_not_form_objects() {
        let sweep = sweep_from_distances(&[
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ]);
        assert!(segmenter().segment(&sweep, 0).is_empty());

        // Dropouts around a real object read as background.
        let sweep = sweep_from_distances(&[
            0, 0, 0, 0, 0, 0, 60, 60, 60, 0, 0, 0, 0, 0, 0, 0,
        ]);
        let objects = segmenter().segment(&sweep, 0);
        assert_eq!(objects.len(), 1);
        assert_eq!((objects[0].left_edge, objects[0].right_edge), (6, 9));
    }
}

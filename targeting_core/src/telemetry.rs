//! Telemetry payloads produced once per sweep. Encoding them for the radio
//! link is up to the [`TelemetrySink`] implementation.

use crate::{
    object::Object,
    track::Track,
    types::{Micros, MAX_OBJECTS},
};
use serde::{Deserialize, Serialize};

/// Diagnostic view of one object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReport {
    pub left_edge: u8,
    pub right_edge: u8,
    /// mm
    pub radius: i32,
    /// Q11 radians
    pub angle: i32,
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

impl From<&Object> for ObjectReport {
    fn from(o: &Object) -> Self {
        Self {
            left_edge: o.left_edge,
            right_edge: o.right_edge,
            radius: o.radius(),
            angle: o.angle(),
            x: o.xcoord(),
            y: o.ycoord(),
            size: o.size(),
        }
    }
}

/// Every object called out in one sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectsTelemetry {
    pub time: Micros,
    pub objects: Vec<ObjectReport>,
}

impl ObjectsTelemetry {
    pub fn from_objects(time: Micros, objects: &[Object]) -> Self {
        debug_assert!(objects.len() <= MAX_OBJECTS);
        Self {
            time,
            objects: objects.iter().map(ObjectReport::from).collect(),
        }
    }
}

/// Selected object (zeros if none) plus the track state, descaled to mm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingTelemetry {
    pub time: Micros,
    pub object_x: i32,
    pub object_y: i32,
    pub object_angle: i32,
    pub object_radius: i32,
    pub track_x: i32,
    pub track_vx: i32,
    pub track_y: i32,
    pub track_vy: i32,
    pub valid: bool,
}

impl TrackingTelemetry {
    pub fn new(time: Micros, selected: Option<&Object>, track: &Track) -> Self {
        let (track_x, track_y) = track.position_mm();
        let (track_vx, track_vy) = track.velocity_mm_s();
        let mut out = Self {
            time,
            track_x,
            track_vx,
            track_y,
            track_vy,
            valid: track.valid(time),
            ..Default::default()
        };
        if let Some(o) = selected {
            out.object_x = o.xcoord();
            out.object_y = o.ycoord();
            out.object_angle = o.angle();
            out.object_radius = o.radius();
        }
        out
    }
}

/// Consumer of per-sweep telemetry.
pub trait TelemetrySink {
    fn send_objects(&mut self, objects: &ObjectsTelemetry);
    fn send_tracking(&mut self, tracking: &TrackingTelemetry);
}

/// Drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn send_objects(&mut self, _objects: &ObjectsTelemetry) {}
    fn send_tracking(&mut self, _tracking: &TrackingTelemetry) {}
}

/// Keeps every payload in memory (replay, tests).
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub objects: Vec<ObjectsTelemetry>,
    pub tracking: Vec<TrackingTelemetry>,
}

impl TelemetrySink for RecordingSink {
    fn send_objects(&mut self, objects: &ObjectsTelemetry) {
        self.objects.push(objects.clone());
    }

    fn send_tracking(&mut self, tracking: &TrackingTelemetry) {
        self.tracking.push(*tracking);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorGeometry;

    #[test]
    fn tracking_without_selection_zeroes_object_fields() {
        let track = Track::new(0);
        let t = TrackingTelemetry::new(0, None, &track);
        assert_eq!((t.object_x, t.object_y, t.object_radius), (0, 0, 0));
        assert!(!t.valid);
    }

    #[test]
    fn reports_are_serialisable() {
        let o = Object::new(7, 9, 200, 42, SensorGeometry::default());
        let payload = ObjectsTelemetry::from_objects(42, &[o]);
        let json = serde_json::to_string(&payload).unwrap();
        let back: ObjectsTelemetry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
        assert_eq!(back.objects[0].radius, 1000);
    }
}

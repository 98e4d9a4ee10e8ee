//! Object: a contiguous run of segments called out by the segmentation pass.

use crate::{
    fixed::{cos_q11, sin_q11, ANGLE_SCALE},
    types::{Micros, SensorGeometry},
};

/// A candidate physical obstruction spanning `[left_edge, right_edge)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Object {
    /// First segment of the span
    pub left_edge: u8,
    /// One past the last segment of the span
    pub right_edge: u8,
    /// Sum of the effective distances over the span (sensor units)
    pub sum_distance: i32,
    /// Sweep timestamp
    pub time: Micros,
    geometry: SensorGeometry,
}

impl Object {
    pub fn new(
        left_edge: u8,
        right_edge: u8,
        sum_distance: i32,
        time: Micros,
        geometry: SensorGeometry,
    ) -> Self {
        debug_assert!(left_edge < right_edge, "empty span {left_edge}..{right_edge}");
        Self {
            left_edge,
            right_edge,
            sum_distance,
            time,
            geometry,
        }
    }

    /// Number of segments covered.
    pub fn span(&self) -> u8 {
        self.right_edge - self.left_edge
    }

    /// Mean radial distance (mm).
    pub fn radius(&self) -> i32 {
        self.geometry.radius_mm(self.sum_distance, self.span())
    }

    /// Bearing of the span centre (Q11 radians, positive to the left).
    pub fn angle(&self) -> i32 {
        self.geometry.bearing(self.left_edge, self.right_edge)
    }

    /// Forward coordinate in the chassis frame (mm).
    pub fn xcoord(&self) -> i32 {
        (self.radius() as i64 * cos_q11(self.angle()) as i64 / ANGLE_SCALE as i64) as i32
    }

    /// Lateral coordinate in the chassis frame (mm).
    pub fn ycoord(&self) -> i32 {
        (self.radius() as i64 * sin_q11(self.angle()) as i64 / ANGLE_SCALE as i64) as i32
    }

    /// Approximate circumferential extent (mm).
    pub fn size(&self) -> i32 {
        self.geometry.arc_length_mm(self.radius(), self.span())
    }
}

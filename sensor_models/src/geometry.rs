//! Arena primitives and ray intersection.
//!
//! World frame: millimetres, origin at one corner of the arena floor, x along
//! the width and y along the height.

use nalgebra::{Point2, Unit, Vector2};
use serde::{Deserialize, Serialize};

/// A circular body (the opponent's footprint).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Disc {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: Point2::new(x, y),
            radius,
        }
    }

    /// Distance along the ray to the first surface crossing. A ray starting
    /// inside the disc hits at 0.
    pub fn ray_intersection(&self, origin: &Point2<f64>, dir: &Unit<Vector2<f64>>) -> Option<f64> {
        let oc = origin - self.center;
        let b = oc.dot(&dir.into_inner());
        let c = oc.norm_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let (near, far) = (-b - sq, -b + sq);
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(0.0)
        } else {
            None
        }
    }

    /// Surface point closest to `from`.
    pub fn nearest_point(&self, from: &Point2<f64>) -> Point2<f64> {
        let d = from - self.center;
        let n = d.norm();
        if n <= f64::EPSILON {
            return self.center;
        }
        self.center + d * (self.radius / n)
    }
}

/// Rectangular walled arena `[0, width] × [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 3600.0,
            height: 3600.0,
        }
    }
}

impl Arena {
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// Distance along the ray to the wall it leaves the arena through.
    /// `None` if the origin is outside.
    pub fn ray_exit(&self, origin: &Point2<f64>, dir: &Unit<Vector2<f64>>) -> Option<f64> {
        if !self.contains(origin) {
            return None;
        }
        let axis = |o: f64, d: f64, hi: f64| {
            if d > f64::EPSILON {
                (hi - o) / d
            } else if d < -f64::EPSILON {
                -o / d
            } else {
                f64::INFINITY
            }
        };
        let t = axis(origin.x, dir.x, self.width).min(axis(origin.y, dir.y, self.height));
        t.is_finite().then_some(t)
    }

    /// Keep a body of `radius` fully inside the walls; returns the per-axis
    /// flags of which coordinates had to be clamped.
    pub fn confine(&self, p: &mut Point2<f64>, radius: f64) -> (bool, bool) {
        let clamp = |v: &mut f64, hi: f64| {
            let c = v.clamp(radius, (hi - radius).max(radius));
            let hit = c != *v;
            *v = c;
            hit
        };
        (clamp(&mut p.x, self.width), clamp(&mut p.y, self.height))
    }
}

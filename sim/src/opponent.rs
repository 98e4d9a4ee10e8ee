//! Opponent trajectory models and state propagation.
//!
//! The opponent is a disc with a true state `[px, py, vx, vy]` (mm, mm/s) in
//! the arena frame and a `MotionSpec` describing how it moves. It never
//! leaves the arena.

use nalgebra::{Point2, Rotation2, Vector2};
use sensor_models::{Arena, Disc};
use serde::{Deserialize, Serialize};

/// Describes opponent motion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    Stationary,
    /// Constant velocity, bouncing off the walls.
    ConstantVelocity,
    /// Circle `center` at `rate` rad/s (counter-clockwise when positive);
    /// the orbit radius is the starting distance from `center`.
    Orbit { center: [f64; 2], rate: f64 },
    /// Drive at `speed` toward each waypoint in turn. With `cyclic` the list
    /// restarts after the last point, otherwise the opponent parks there.
    Waypoints {
        waypoints: Vec<[f64; 2]>,
        speed: f64,
        cyclic: bool,
    },
}

/// A simulated opponent with ground-truth state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Opponent {
    /// True state [px, py, vx, vy]
    pub state: [f64; 4],
    /// Footprint radius (mm)
    pub radius: f64,
    pub motion: MotionSpec,
    #[serde(default)]
    next_waypoint: usize,
}

impl Opponent {
    pub fn new(position: [f64; 2], velocity: [f64; 2], radius: f64, motion: MotionSpec) -> Self {
        Self {
            state: [position[0], position[1], velocity[0], velocity[1]],
            radius,
            motion,
            next_waypoint: 0,
        }
    }

    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.state[0], self.state[1])
    }

    pub fn disc(&self) -> Disc {
        Disc::new(self.state[0], self.state[1], self.radius)
    }

    /// Propagate the true state by `dt` seconds.
    pub fn step(&mut self, dt: f64, arena: &Arena) {
        match &self.motion {
            MotionSpec::Stationary => {
                self.state[2] = 0.0;
                self.state[3] = 0.0;
            }
            MotionSpec::ConstantVelocity => {
                self.state[0] += self.state[2] * dt;
                self.state[1] += self.state[3] * dt;
            }
            MotionSpec::Orbit { center, rate } => {
                let c = Vector2::new(center[0], center[1]);
                let rel = Vector2::new(self.state[0], self.state[1]) - c;
                let rel = Rotation2::new(rate * dt) * rel;
                self.state[0] = c.x + rel.x;
                self.state[1] = c.y + rel.y;
                self.state[2] = -rate * rel.y;
                self.state[3] = rate * rel.x;
            }
            MotionSpec::Waypoints {
                waypoints,
                speed,
                cyclic,
            } => {
                let (waypoints, speed, cyclic) = (waypoints.clone(), *speed, *cyclic);
                self.follow_waypoints(&waypoints, speed, cyclic, dt);
            }
        }

        let mut p = self.position();
        let (hit_x, hit_y) = arena.confine(&mut p, self.radius);
        self.state[0] = p.x;
        self.state[1] = p.y;
        if matches!(self.motion, MotionSpec::ConstantVelocity) {
            if hit_x {
                self.state[2] = -self.state[2];
            }
            if hit_y {
                self.state[3] = -self.state[3];
            }
        }
    }

    fn follow_waypoints(&mut self, waypoints: &[[f64; 2]], speed: f64, cyclic: bool, dt: f64) {
        let mut budget = speed * dt;
        let mut p = Vector2::new(self.state[0], self.state[1]);
        let mut heading = Vector2::zeros();
        let mut idle = 0;
        while budget > 0.0 && self.next_waypoint < waypoints.len() {
            let wp = waypoints[self.next_waypoint];
            let to = Vector2::new(wp[0], wp[1]) - p;
            let dist = to.norm();
            if dist > budget {
                heading = to / dist;
                p += heading * budget;
                budget = 0.0;
            } else {
                p += to;
                budget -= dist;
                self.next_waypoint += 1;
                if cyclic && self.next_waypoint == waypoints.len() {
                    self.next_waypoint = 0;
                }
                // A full lap of coincident points goes nowhere
                idle = if dist <= f64::EPSILON { idle + 1 } else { 0 };
                if idle > waypoints.len() {
                    break;
                }
            }
        }
        let moving = budget <= 0.0;
        self.state[0] = p.x;
        self.state[1] = p.y;
        let v = if moving { heading * speed } else { Vector2::zeros() };
        self.state[2] = v.x;
        self.state[3] = v.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_velocity_bounces_off_walls() {
        let arena = Arena::default();
        let mut o = Opponent::new([200.0, 1500.0], [-1000.0, 0.0], 150.0, MotionSpec::ConstantVelocity);
        o.step(0.1, &arena);
        assert_abs_diff_eq!(o.state[0], 150.0);
        assert!(o.state[2] > 0.0);
        o.step(0.1, &arena);
        assert_abs_diff_eq!(o.state[0], 250.0);
    }

    #[test]
    fn orbit_keeps_its_radius() {
        let arena = Arena::default();
        let center = [1800.0, 1500.0];
        let mut o = Opponent::new([2400.0, 1500.0], [0.0, 0.0], 150.0, MotionSpec::Orbit { center, rate: 1.0 });
        for _ in 0..50 {
            o.step(0.02, &arena);
        }
        let r = (o.position() - Point2::new(center[0], center[1])).norm();
        assert_abs_diff_eq!(r, 600.0, epsilon = 1e-6);
        // One radian counter-clockwise
        assert_abs_diff_eq!(o.state[1], 1500.0 + 600.0 * 1f64.sin(), epsilon = 1e-6);
        let speed = (o.state[2].powi(2) + o.state[3].powi(2)).sqrt();
        assert_abs_diff_eq!(speed, 600.0, epsilon = 1e-6);
    }

    #[test]
    fn waypoints_park_at_the_last_point() {
        let arena = Arena::default();
        let motion = MotionSpec::Waypoints {
            waypoints: vec![[1800.0, 1000.0]],
            speed: 1000.0,
            cyclic: false,
        };
        let mut o = Opponent::new([1800.0, 2000.0], [0.0, 0.0], 150.0, motion);
        o.step(0.5, &arena);
        assert_abs_diff_eq!(o.state[1], 1500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(o.state[3], -1000.0, epsilon = 1e-9);
        o.step(1.0, &arena);
        assert_abs_diff_eq!(o.state[1], 1000.0, epsilon = 1e-9);
        assert_eq!((o.state[2], o.state[3]), (0.0, 0.0));
    }

    #[test]
    fn cyclic_waypoints_turn_around() {
        let arena = Arena::default();
        let motion = MotionSpec::Waypoints {
            waypoints: vec![[2400.0, 1500.0], [1200.0, 1500.0]],
            speed: 800.0,
            cyclic: true,
        };
        let mut o = Opponent::new([1800.0, 1500.0], [0.0, 0.0], 150.0, motion);
        o.step(1.0, &arena);
        // 600 mm to the first point, then 200 mm back
        assert_abs_diff_eq!(o.state[0], 2200.0, epsilon = 1e-9);
        assert!(o.state[2] < 0.0);
    }

    #[test]
    fn stationary_does_not_move() {
        let arena = Arena::default();
        let mut o = Opponent::new([1800.0, 1400.0], [300.0, 0.0], 150.0, MotionSpec::Stationary);
        o.step(1.0, &arena);
        assert_eq!(o.position(), Point2::new(1800.0, 1400.0));
    }
}

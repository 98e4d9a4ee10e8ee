//! Firing decision from the track state. This is the input to the weapon
//! sequencer, which owns the actual valve timing.

use crate::{track::Track, types::Micros};
use serde::{Deserialize, Serialize};

/// Strike-zone and stability limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutofireParams {
    /// Forward tolerance (mm) around `reach`
    pub xtol: i16,
    /// Lateral half-width (mm) of the strike zone
    pub ytol: i16,
    /// Largest yaw rate (gyro counts) at which a swing is allowed
    pub max_omega_z: i16,
    /// Forward distance (mm) of the hammer impact point
    pub reach: i16,
}

impl Default for AutofireParams {
    fn default() -> Self {
        Self {
            xtol: 200,
            ytol: 200,
            max_omega_z: 2000,
            reach: 500,
        }
    }
}

impl AutofireParams {
    /// True if a swing now would land on the tracked target.
    pub fn should_fire(&self, track: &Track, now: Micros, omega_z: i16) -> bool {
        if !track.valid(now) || (omega_z as i32).abs() >= self.max_omega_z as i32 {
            return false;
        }
        let (x, y) = track.position_mm();
        (x - self.reach as i32).abs() < self.xtol as i32 && y.abs() < self.ytol as i32
    }
}

//! Track: the single persistent fixed-point alpha-beta estimate of the target.
//!
//! # State
//! Position `(x, y)` in mm and velocity `(vx, vy)` in mm/s, all scaled by
//! [`POS_SCALE`], in the chassis frame (x forward, y left).
//!
//! # Predict
//! Linear extrapolation plus a small-angle rotation of the whole frame by
//! `dθ`, the gyro rate integrated over the step:
//!
//! ```text
//! x' = x + vx·dt − (x·dθ²/2 + y·dθ)
//! y' = y + vy·dt − (y·dθ²/2 − x·dθ)
//! ```
//!
//! which is `x·(cos dθ − 1) − y·sin dθ` to second order, so no trig is needed.
//! A positive `omega_z` sample sweeps stationary points counter-clockwise.
//!
//! # Correct
//! Residual `r = z − x̂` (clamped to ±[`MAX_RESIDUAL`]), then
//! `x += alpha·r/32767`, `v += beta·r/16384`.

use crate::{
    fixed::{atan2_q11, saturate_i32, GYRO_COUNTS_TO_Q15, MAX_RESIDUAL, POS_SCALE},
    object::Object,
    types::Micros,
};
use serde::{Deserialize, Serialize};

/// Divisor for the position gain.
pub const ALPHA_SCALE: i64 = 32_767;
/// Divisor for the velocity gain.
pub const BETA_SCALE: i64 = 16_384;

/// Tunable filter parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackParams {
    /// Position gain, divided by 32767
    pub alpha: i16,
    /// Velocity gain, divided by 16384
    pub beta: i16,
    /// `valid()` needs strictly more corrections than this
    pub min_num_updates: i8,
    /// Staleness timeout (µs)
    pub track_lost_dt: u32,
    /// Squared gate (mm²) for continuing an active track
    pub max_off_track: i32,
    /// Squared gate (mm²) for starting a track from scratch
    pub max_start_distance: i32,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            alpha: 10_000,
            beta: 16_384,
            min_num_updates: 3,
            track_lost_dt: 100_000,
            max_off_track: 600 * 600,
            max_start_distance: 6000 * 6000,
        }
    }
}

/// Outcome of [`Track::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Correction {
    /// Track was stale; state replaced by the observation
    Reset,
    /// Alpha-beta correction applied
    Filtered,
}

/// The single tracked target.
#[derive(Clone, Debug)]
pub struct Track {
    pub x: i32,
    pub y: i32,
    pub vx: i32,
    pub vy: i32,
    /// Time of the last accepted correction, `None` until the first one
    pub last_update: Option<Micros>,
    /// Time the state was last propagated to
    pub last_predict: Micros,
    /// Corrections since the last reset
    pub num_updates: u32,
    /// Previous gyro rate (rad/s, Q15) for the two-sample average
    last_omega_z: i32,
    pub params: TrackParams,
}

impl Track {
    /// An uninitialised track at the origin with default gains.
    pub fn new(now: Micros) -> Self {
        Self::with_params(now, TrackParams::default())
    }

    pub fn with_params(now: Micros, params: TrackParams) -> Self {
        Self {
            x: 0,
            y: 0,
            vx: 0,
            vy: 0,
            last_update: None,
            last_predict: now,
            num_updates: 0,
            last_omega_z: 0,
            params,
        }
    }

    /// True while the last correction is younger than `track_lost_dt`.
    /// Never true before the first correction.
    pub fn recent_update(&self, now: Micros) -> bool {
        self.last_update
            .is_some_and(|t| now.wrapping_sub(t) < self.params.track_lost_dt)
    }

    /// Squared distance (mm²) from the track position to an object.
    pub fn distance_sq(&self, object: &Object) -> i64 {
        let dx = (self.x / POS_SCALE - object.xcoord()) as i64;
        let dy = (self.y / POS_SCALE - object.ycoord()) as i64;
        dx * dx + dy * dy
    }

    /// Low-pass the gyro rate and integrate it over `dt` µs.
    /// Returns the rotation in Q11 radians.
    fn update_omega_z(&mut self, dt: i32, omega_z: i16) -> i32 {
        let converted = omega_z as i32 * GYRO_COUNTS_TO_Q15;
        let average = (self.last_omega_z + converted) / 2;
        self.last_omega_z = converted;
        // Q15 / 16 = Q11; µs → ms → s
        saturate_i32((average / 16) as i64 * (dt / 1000) as i64 / 1000)
    }

    /// Propagate the state to `now`. Returns the step in µs; timestamps
    /// older than `last_predict` propagate by zero.
    pub fn predict(&mut self, now: Micros, omega_z: i16) -> i32 {
        let dt = (now.wrapping_sub(self.last_predict) as i32).max(0);
        if dt > 0 {
            self.last_predict = now;
        }
        let dtheta = self.update_omega_z(dt, omega_z) as i64;

        let (x, y) = (self.x as i64, self.y as i64);
        let dt_ms = (dt / 1000) as i64;
        self.x = saturate_i32(
            x + dt_ms * self.vx as i64 / 1000 - (x * dtheta * dtheta / 4096 + y * dtheta) / 2048,
        );
        self.y = saturate_i32(
            y + dt_ms * self.vy as i64 / 1000 - (y * dtheta * dtheta / 4096 - x * dtheta) / 2048,
        );
        dt
    }

    /// Correct toward an accepted observation.
    pub fn update(&mut self, observation: &Object, omega_z: i16) -> Correction {
        let mx = observation.xcoord() * POS_SCALE;
        let my = observation.ycoord() * POS_SCALE;
        let correction = if !self.recent_update(observation.time) {
            self.x = mx;
            self.y = my;
            self.vx = 0;
            self.vy = 0;
            self.num_updates = 0;
            self.last_predict = observation.time;
            tracing::debug!(x = mx / POS_SCALE, y = my / POS_SCALE, "track reset");
            Correction::Reset
        } else {
            self.predict(observation.time, omega_z);
            let alpha = self.params.alpha as i64;
            let beta = self.params.beta as i64;
            let rx = (mx as i64 - self.x as i64).clamp(-MAX_RESIDUAL, MAX_RESIDUAL);
            let ry = (my as i64 - self.y as i64).clamp(-MAX_RESIDUAL, MAX_RESIDUAL);
            self.x = saturate_i32(self.x as i64 + alpha * rx / ALPHA_SCALE);
            self.y = saturate_i32(self.y as i64 + alpha * ry / ALPHA_SCALE);
            self.vx = saturate_i32(self.vx as i64 + beta * rx / BETA_SCALE);
            self.vy = saturate_i32(self.vy as i64 + beta * ry / BETA_SCALE);
            Correction::Filtered
        };
        self.num_updates = self.num_updates.saturating_add(1);
        self.last_update = Some(observation.time);
        correction
    }

    /// Predict to `now` while active. A stale track holds its last state;
    /// only the clock and the rate sample move on.
    pub fn advance(&mut self, now: Micros, omega_z: i16) {
        if self.recent_update(now) {
            self.predict(now, omega_z);
        } else {
            if (now.wrapping_sub(self.last_predict) as i32) > 0 {
                self.last_predict = now;
            }
            self.last_omega_z = omega_z as i32 * GYRO_COUNTS_TO_Q15;
        }
    }

    /// Coast: propagate only, no correction.
    pub fn update_no_obs(&mut self, now: Micros, omega_z: i16) {
        self.advance(now, omega_z);
    }

    /// Whether an association at squared distance `best_distance` should
    /// be accepted as a correction.
    pub fn wants_update(&self, now: Micros, best_distance: i64) -> bool {
        if self.recent_update(now) {
            best_distance < self.params.max_off_track as i64
        } else {
            best_distance < self.params.max_start_distance as i64
        }
    }

    /// Active and corrected often enough to be trusted downstream.
    pub fn valid(&self, now: Micros) -> bool {
        let min_updates = self.params.min_num_updates.max(0) as u32;
        self.recent_update(now) && self.num_updates > min_updates
    }

    /// Bearing of the track (Q11 radians), 0 when not valid.
    pub fn bearing(&self, now: Micros) -> i32 {
        if self.valid(now) {
            atan2_q11(self.y, self.x)
        } else {
            0
        }
    }

    /// Position in mm.
    pub fn position_mm(&self) -> (i32, i32) {
        (self.x / POS_SCALE, self.y / POS_SCALE)
    }

    /// Velocity in mm/s.
    pub fn velocity_mm_s(&self) -> (i32, i32) {
        (self.vx / POS_SCALE, self.vy / POS_SCALE)
    }

    /// Replace the filter parameters. Gates are given in mm and stored squared.
    pub fn set_tracking_filter_params(
        &mut self,
        alpha: i16,
        beta: i16,
        min_num_updates: i8,
        track_lost_dt: u32,
        max_off_track: i16,
        max_start_distance: i16,
    ) {
        self.params = TrackParams {
            alpha,
            beta,
            min_num_updates,
            track_lost_dt,
            max_off_track: max_off_track as i32 * max_off_track as i32,
            max_start_distance: max_start_distance as i32 * max_start_distance as i32,
        };
        tracing::info!(params = ?self.params, "tracking filter parameters set");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Own robot: fixed position in the arena, yawing according to a profile,
//! carrying the range sensor and the rate gyro.

use nalgebra::{Isometry2, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Gyro counts per rad/s (16-bit, ±2000 °/s full scale).
pub const COUNTS_PER_RAD_S: f64 = 32_768.0 / 35.0;

/// Commanded yaw rate over time. Rates in rad/s, counter-clockwise positive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum YawProfile {
    Still,
    Constant { rate: f64 },
    /// `amplitude · sin(2π t / period)`
    Sinusoid { amplitude: f64, period: f64 },
    /// Piecewise constant: `(t_start, rate)` sorted by time; zero before the
    /// first step.
    Steps { steps: Vec<(f64, f64)> },
}

impl YawProfile {
    pub fn rate(&self, t: f64) -> f64 {
        match self {
            YawProfile::Still => 0.0,
            YawProfile::Constant { rate } => *rate,
            YawProfile::Sinusoid { amplitude, period } => {
                if *period <= 0.0 {
                    0.0
                } else {
                    amplitude * (std::f64::consts::TAU * t / period).sin()
                }
            }
            YawProfile::Steps { steps } => steps
                .iter()
                .filter(|(t_start, _)| *t_start <= t)
                .last()
                .map_or(0.0, |&(_, rate)| rate),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chassis {
    /// Arena position (mm)
    pub position: [f64; 2],
    /// Heading (rad), counter-clockwise from the arena x axis
    pub heading: f64,
    pub yaw: YawProfile,
    #[serde(default)]
    yaw_rate: f64,
}

impl Chassis {
    pub fn new(position: [f64; 2], heading: f64, yaw: YawProfile) -> Self {
        let yaw_rate = yaw.rate(0.0);
        Self {
            position,
            heading,
            yaw,
            yaw_rate,
        }
    }

    /// Advance from `t` to `t + dt` (trapezoidal heading integration).
    pub fn step(&mut self, t: f64, dt: f64) {
        let r0 = self.yaw.rate(t);
        let r1 = self.yaw.rate(t + dt);
        self.heading += 0.5 * (r0 + r1) * dt;
        self.yaw_rate = r1;
    }

    pub fn yaw_rate(&self) -> f64 {
        self.yaw_rate
    }

    pub fn pose(&self) -> Isometry2<f64> {
        Isometry2::new(Vector2::new(self.position[0], self.position[1]), self.heading)
    }

    /// Arena point expressed in the chassis frame (x forward, y left).
    pub fn to_body(&self, p: &Point2<f64>) -> Point2<f64> {
        self.pose().inverse_transform_point(p)
    }

    /// Raw gyro sample for the current yaw rate. The IMU is mounted so that
    /// a counter-clockwise chassis yaw reads negative.
    pub fn gyro_counts(&self) -> i16 {
        (-self.yaw_rate * COUNTS_PER_RAD_S)
            .round()
            .clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }
}

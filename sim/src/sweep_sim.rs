//! Sweep synthesiser.
//!
//! Every sweep period the simulator moves the opponent and the chassis,
//! casts the sensor beams, samples the gyro and records the ground truth
//! the tracker should be reporting: the opponent's surface point nearest to
//! the sensor, in the chassis frame, when it is inside the field of view.

use crate::{chassis::Chassis, opponent::Opponent};
use nalgebra::Point2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sensor_models::{Arena, RangeSensor};
use serde::{Deserialize, Serialize};
use targeting_core::types::{sweep_from_distances, Micros, Sweep, SEGMENT_COUNT};

/// One completed sweep as seen by the targeting core, plus ground truth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepFrame {
    /// Sensor clock at sweep completion
    pub time: Micros,
    /// Raw per-segment distances (sensor units, 0 = no return)
    pub distances: [i16; SEGMENT_COUNT],
    /// Latest gyro sample, if the IMU has produced one
    pub omega_z: Option<i16>,
    /// True target point (mm, chassis frame)
    pub truth_mm: Option<[f64; 2]>,
}

impl SweepFrame {
    pub fn sweep(&self) -> Sweep {
        sweep_from_distances(&self.distances)
    }
}

/// Generates sweeps at a fixed period.
pub struct SweepSimulator {
    pub sensor: RangeSensor,
    pub arena: Arena,
    pub sweep_period_us: u32,
    /// Sensor clock of the next sweep
    clock: Micros,
    /// Elapsed simulated time (s)
    elapsed: f64,
    rng: ChaCha8Rng,
}

impl SweepSimulator {
    pub fn new(sensor: RangeSensor, arena: Arena, sweep_period_us: u32, start_time: Micros, seed: u64) -> Self {
        Self {
            sensor,
            arena,
            sweep_period_us,
            clock: start_time,
            elapsed: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advance one sweep period and produce the sweep completed at its end.
    pub fn next_frame(&mut self, chassis: &mut Chassis, mut opponent: Option<&mut Opponent>) -> SweepFrame {
        let dt = self.sweep_period_us as f64 * 1e-6;
        chassis.step(self.elapsed, dt);
        if let Some(o) = opponent.as_deref_mut() {
            o.step(dt, &self.arena);
        }
        self.elapsed += dt;
        self.clock = self.clock.wrapping_add(self.sweep_period_us);

        let bodies: Vec<_> = opponent.iter().map(|o| o.disc()).collect();
        let readings = self
            .sensor
            .measure(&chassis.pose(), &bodies, &self.arena, &mut self.rng);
        let mut distances = [0i16; SEGMENT_COUNT];
        for (d, r) in distances.iter_mut().zip(readings) {
            *d = r;
        }

        let truth_mm = opponent.as_deref().and_then(|o| {
            let sensor_at = Point2::new(chassis.position[0], chassis.position[1]);
            let p = chassis.to_body(&o.disc().nearest_point(&sensor_at));
            self.sensor.in_view(p.y.atan2(p.x)).then_some([p.x, p.y])
        });

        SweepFrame {
            time: self.clock,
            distances,
            omega_z: Some(chassis.gyro_counts()),
            truth_mm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chassis::YawProfile, opponent::MotionSpec};
    use approx::assert_abs_diff_eq;
    use sensor_models::RangeSensorParams;
    use std::f64::consts::FRAC_PI_2;

    fn simulator(seed: u64) -> SweepSimulator {
        let arena = Arena {
            width: 3600.0,
            height: 3000.0,
        };
        SweepSimulator::new(RangeSensor::default(), arena, 20_000, 0, seed)
    }

    #[test]
    fn frame_clock_advances_by_the_period() {
        let mut sim = SweepSimulator::new(RangeSensor::default(), Arena::default(), 20_000, u32::MAX - 10_000, 1);
        let mut chassis = Chassis::new([1800.0, 600.0], FRAC_PI_2, YawProfile::Still);
        let a = sim.next_frame(&mut chassis, None);
        let b = sim.next_frame(&mut chassis, None);
        assert_eq!(a.time, 9_999);
        assert_eq!(b.time.wrapping_sub(a.time), 20_000);
        assert_abs_diff_eq!(sim.elapsed(), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn opponent_ahead_appears_in_centre_segments() {
        let mut sim = simulator(5);
        let mut chassis = Chassis::new([1800.0, 600.0], FRAC_PI_2, YawProfile::Still);
        let mut opponent = Opponent::new([1800.0, 1500.0], [0.0, 0.0], 150.0, MotionSpec::Stationary);
        let frame = sim.next_frame(&mut chassis, Some(&mut opponent));
        // ~750 mm to the near surface, background beyond 2 m
        for s in [7, 8] {
            assert!((72..=78).contains(&frame.distances[s]), "{:?}", frame.distances);
        }
        assert!(frame.distances[5] > 200);
        let truth = frame.truth_mm.unwrap();
        assert_abs_diff_eq!(truth[0], 750.0, epsilon = 1e-6);
        assert_abs_diff_eq!(truth[1], 0.0, epsilon = 1e-6);
        assert_eq!(frame.omega_z, Some(0));
    }

    #[test]
    fn opponent_behind_has_no_truth() {
        let mut sim = simulator(5);
        let mut chassis = Chassis::new([1800.0, 1500.0], FRAC_PI_2, YawProfile::Still);
        let mut opponent = Opponent::new([1800.0, 600.0], [0.0, 0.0], 150.0, MotionSpec::Stationary);
        let frame = sim.next_frame(&mut chassis, Some(&mut opponent));
        assert_eq!(frame.truth_mm, None);
    }

    #[test]
    fn yawing_chassis_reports_gyro() {
        let mut sim = simulator(5);
        let mut chassis = Chassis::new([1800.0, 600.0], FRAC_PI_2, YawProfile::Constant { rate: 2.0 });
        let frame = sim.next_frame(&mut chassis, None);
        assert_eq!(frame.omega_z, Some(-1872));
        assert_eq!(frame.truth_mm, None);
    }

    #[test]
    fn dropouts_read_zero() {
        let sensor = RangeSensor::new(RangeSensorParams {
            p_return: 0.0,
            ..Default::default()
        });
        let mut sim = SweepSimulator::new(sensor, Arena::default(), 20_000, 0, 9);
        let mut chassis = Chassis::new([1800.0, 600.0], FRAC_PI_2, YawProfile::Still);
        let frame = sim.next_frame(&mut chassis, None);
        assert_eq!(frame.distances, [0; SEGMENT_COUNT]);
        assert!(frame.sweep().iter().all(|d| d.distance == 0));
    }
}

//! Multi-beam time-of-flight range sensor.
//!
//! The sensor splits its horizontal field of view into equal segments and
//! reports one distance per segment: the nearest return among a few rays
//! spread across the segment. Segment 0 is the rightmost; bearings are
//! measured counter-clockwise from the chassis heading.
//!
//! Imperfections:
//! - Uniform range noise
//! - Lost returns with probability `1 − p_return`, reported as 0
//! - Nothing beyond `max_range`, also reported as 0

use crate::geometry::{Arena, Disc};
use nalgebra::{Isometry2, Point2, Unit, Vector2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Physical configuration of the range sensor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RangeSensorParams {
    /// Number of angular segments per sweep
    pub segments: usize,
    /// Total horizontal field of view (radians)
    pub field_of_view: f64,
    /// Rays cast per segment; the segment reads the nearest hit
    pub rays_per_segment: usize,
    /// Longest measurable range (mm)
    pub max_range: f64,
    /// Millimetres per reported unit
    pub mm_per_unit: f64,
    /// Half-width of the uniform range noise (mm)
    pub range_noise: f64,
    /// Probability that a segment returns a measurement
    pub p_return: f64,
}

impl Default for RangeSensorParams {
    fn default() -> Self {
        Self {
            segments: 16,
            field_of_view: std::f64::consts::PI,
            rays_per_segment: 3,
            max_range: 5000.0,
            mm_per_unit: 10.0, // reports cm
            range_noise: 20.0,
            p_return: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RangeSensor {
    pub params: RangeSensorParams,
}

impl RangeSensor {
    pub fn new(params: RangeSensorParams) -> Self {
        Self { params }
    }

    fn segment_width(&self) -> f64 {
        self.params.field_of_view / self.params.segments as f64
    }

    /// Bearing of the centre of segment `i` relative to the heading.
    pub fn segment_bearing(&self, i: usize) -> f64 {
        (i as f64 + 0.5 - self.params.segments as f64 / 2.0) * self.segment_width()
    }

    /// Whether a body-frame bearing lies inside the field of view.
    pub fn in_view(&self, bearing: f64) -> bool {
        bearing.abs() < self.params.field_of_view / 2.0
    }

    fn ray_bearings(&self, i: usize) -> impl Iterator<Item = f64> + '_ {
        let n = self.params.rays_per_segment.max(1);
        let start = (i as f64 - self.params.segments as f64 / 2.0) * self.segment_width();
        (0..n).map(move |k| start + (k as f64 + 0.5) / n as f64 * self.segment_width())
    }

    /// Noise-free range (mm) per segment from `pose`, `None` when nothing is
    /// within `max_range`.
    pub fn true_ranges(&self, pose: &Isometry2<f64>, bodies: &[Disc], arena: &Arena) -> Vec<Option<f64>> {
        let origin = Point2::from(pose.translation.vector);
        (0..self.params.segments)
            .map(|i| {
                self.ray_bearings(i)
                    .filter_map(|bearing| {
                        let dir = Unit::new_normalize(
                            pose.rotation * Vector2::new(bearing.cos(), bearing.sin()),
                        );
                        bodies
                            .iter()
                            .filter_map(|b| b.ray_intersection(&origin, &dir))
                            .chain(arena.ray_exit(&origin, &dir))
                            .min_by(f64::total_cmp)
                    })
                    .min_by(f64::total_cmp)
                    .filter(|&r| r <= self.params.max_range)
            })
            .collect()
    }

    /// One sweep of raw readings in sensor units, 0 meaning no return.
    pub fn measure<R: Rng>(
        &self,
        pose: &Isometry2<f64>,
        bodies: &[Disc],
        arena: &Arena,
        rng: &mut R,
    ) -> Vec<i16> {
        let p_return = self.params.p_return.clamp(0.0, 1.0);
        let noise = self.params.range_noise.abs();
        self.true_ranges(pose, bodies, arena)
            .into_iter()
            .map(|range| match range {
                Some(r) if rng.gen_bool(p_return) => {
                    let noisy = (r + rng.gen_range(-noise..=noise)).max(0.0);
                    (noisy / self.params.mm_per_unit)
                        .round()
                        .clamp(1.0, i16::MAX as f64) as i16
                }
                _ => 0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pose() -> Isometry2<f64> {
        Isometry2::new(Vector2::new(2000.0, 500.0), 0.0)
    }

    fn arena() -> Arena {
        Arena {
            width: 4000.0,
            height: 4000.0,
        }
    }

    #[test]
    fn segment_bearings_are_symmetric() {
        let sensor = RangeSensor::default();
        assert_abs_diff_eq!(sensor.segment_bearing(0), -sensor.segment_bearing(15), epsilon = 1e-12);
        assert!(sensor.segment_bearing(0) < 0.0);
        assert_abs_diff_eq!(
            sensor.segment_bearing(8),
            std::f64::consts::PI / 32.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn disc_ahead_shows_in_centre_segments() {
        let sensor = RangeSensor::default();
        let opponent = Disc::new(3000.0, 500.0, 150.0);
        let ranges = sensor.true_ranges(&pose(), &[opponent], &arena());
        // Innermost ray at 1.875° off the line of centres
        assert_abs_diff_eq!(ranges[7].unwrap(), 853.07, epsilon = 0.5);
        assert_abs_diff_eq!(ranges[8].unwrap(), 853.07, epsilon = 0.5);
        // Just left of the disc the beams reach the far wall, 2 m ahead
        assert!(ranges[9].unwrap() > 1900.0);
    }

    #[test]
    fn heading_rotates_the_beams() {
        let sensor = RangeSensor::default();
        let opponent = Disc::new(2000.0, 1500.0, 150.0);
        let facing_left = Isometry2::new(Vector2::new(2000.0, 500.0), std::f64::consts::FRAC_PI_2);
        let ranges = sensor.true_ranges(&facing_left, &[opponent], &arena());
        assert!(ranges[7].unwrap() < 900.0);
        assert!(ranges[0].unwrap() > 1500.0);
    }

    #[test]
    fn out_of_range_reads_zero() {
        let sensor = RangeSensor::new(RangeSensorParams {
            max_range: 1000.0,
            range_noise: 0.0,
            ..Default::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let readings = sensor.measure(&pose(), &[], &arena(), &mut rng);
        assert_eq!(readings.len(), 16);
        // Only the rightmost beams reach the near wall at y = 0
        assert!(readings[0] > 0);
        assert_eq!(readings[8], 0);
    }

    #[test]
    fn no_returns_when_every_beam_drops() {
        let sensor = RangeSensor::new(RangeSensorParams {
            p_return: 0.0,
            ..Default::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let readings = sensor.measure(&pose(), &[], &arena(), &mut rng);
        assert!(readings.iter().all(|&r| r == 0));
    }

    #[test]
    fn same_seed_same_sweep() {
        let sensor = RangeSensor::default();
        let opponent = [Disc::new(3000.0, 700.0, 150.0)];
        let a = sensor.measure(&pose(), &opponent, &arena(), &mut ChaCha8Rng::seed_from_u64(3));
        let b = sensor.measure(&pose(), &opponent, &arena(), &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}

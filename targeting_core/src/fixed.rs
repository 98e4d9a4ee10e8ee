//! Integer-only math used by the segmentation and tracking code.
//!
//! # Scales
//! - Angles are radians scaled by [`ANGLE_SCALE`] (Q11).
//! - Track position/velocity are millimetres (per second) scaled by [`POS_SCALE`].
//! - Gyro rates are converted to radians/second scaled by 32768 (Q15).
//!
//! The trig helpers are truncated power series and are only accurate on
//! `|a| <= π/2`, which covers any sensor field of view up to 180°.

/// One radian in Q11 fixed point.
pub const ANGLE_SCALE: i32 = 2048;

/// π/2 in Q11.
pub const HALF_PI: i32 = 3217;

/// π in Q11.
pub const PI: i32 = 6434;

/// Track state scale factor (sub-millimetre precision).
pub const POS_SCALE: i32 = 16;

/// Gyro counts → rad/s in Q15.
/// (2000 °/s full scale / 32768 counts) · π/180 · 32768 ≈ 34.9
pub const GYRO_COUNTS_TO_Q15: i32 = 35;

/// Residual magnitude limit (POS_SCALE units) applied before correction.
pub const MAX_RESIDUAL: i64 = 65_535;

/// Saturating narrowing from i64.
#[inline]
pub fn saturate_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// cos(a) in Q11 for `a` in Q11: 1 − a²/2 + a⁴/24.
pub fn cos_q11(a: i32) -> i32 {
    let a = a.clamp(-HALF_PI, HALF_PI);
    let a2 = a * a / ANGLE_SCALE;
    let a4 = a2 * a2 / ANGLE_SCALE;
    ANGLE_SCALE - a2 / 2 + a4 / 24
}

/// sin(a) in Q11 for `a` in Q11: a − a³/6 + a⁵/120.
pub fn sin_q11(a: i32) -> i32 {
    let a = a.clamp(-HALF_PI, HALF_PI);
    let a2 = a * a / ANGLE_SCALE;
    let a3 = a2 * a / ANGLE_SCALE;
    let a5 = a3 * a2 / ANGLE_SCALE;
    a - a3 / 6 + a5 / 120
}

/// atan(y / x) in Q11, for `x > 0`.
///
/// Uses atan(t) ≈ π/4·t + 0.273·t·(1 − |t|) on |t| ≤ 1 and the reflection
/// atan(t) = ±π/2 − atan(1/t) outside it.
pub fn atan2_q11(y: i32, x: i32) -> i32 {
    if x <= 0 {
        return 0;
    }
    let (y, x) = (y as i64, x as i64);
    if y.abs() <= x {
        atan_unit(saturate_i32(y * ANGLE_SCALE as i64 / x))
    } else {
        let inv = saturate_i32(x * ANGLE_SCALE as i64 / y);
        let half_pi = if y > 0 { HALF_PI } else { -HALF_PI };
        half_pi - atan_unit(inv)
    }
}

fn atan_unit(t: i32) -> i32 {
    let t = t.clamp(-ANGLE_SCALE, ANGLE_SCALE) as i64;
    let scale = ANGLE_SCALE as i64;
    let quarter_pi = 1608;
    let k = 559; // 0.273 in Q11
    ((quarter_pi * t + k * t * (scale - t.abs()) / scale) / scale) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn to_f64(q: i32) -> f64 {
        q as f64 / ANGLE_SCALE as f64
    }

    #[test]
    fn series_track_float_trig_over_half_circle() {
        for deg in (-90..=90).step_by(5) {
            let rad = (deg as f64).to_radians();
            let q = (rad * ANGLE_SCALE as f64).round() as i32;
            assert_abs_diff_eq!(to_f64(cos_q11(q)), rad.cos(), epsilon = 0.03);
            assert_abs_diff_eq!(to_f64(sin_q11(q)), rad.sin(), epsilon = 0.01);
        }
    }

    #[test]
    fn atan_matches_within_a_few_milliradians() {
        for &(y, x) in &[(0, 100), (100, 100), (-50, 200), (300, 100), (-400, 50)] {
            let expected = (y as f64).atan2(x as f64);
            assert_abs_diff_eq!(to_f64(atan2_q11(y, x)), expected, epsilon = 0.01);
        }
    }

    #[test]
    fn atan_rejects_points_behind() {
        assert_eq!(atan2_q11(10, 0), 0);
        assert_eq!(atan2_q11(10, -5), 0);
    }

    #[test]
    fn saturate_clamps_both_ends() {
        assert_eq!(saturate_i32(i64::MAX), i32::MAX);
        assert_eq!(saturate_i32(i64::MIN), i32::MIN);
        assert_eq!(saturate_i32(-7), -7);
    }
}

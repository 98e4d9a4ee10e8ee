//! Tracking metrics against ground truth: RMSE of the reported position,
//! time-on-target and reacquisition counts.

use crate::pipeline::SweepAction;
use serde::{Deserialize, Serialize};

/// Accumulated metric statistics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrackingMetrics {
    /// Sweeps evaluated
    pub n_sweeps: u64,
    /// Sweeps on which the track was valid
    pub n_valid: u64,
    /// Valid sweeps with a ground-truth target to compare against
    pub n_matched: u64,
    /// Sum of squared position errors (mm²) over matched sweeps
    pub sum_sq_pos_err: f64,
    pub corrections: u64,
    pub resets: u64,
    pub coasts: u64,
    /// Sweeps on which the autofire decision was raised
    pub fire_sweeps: u64,
}

impl TrackingMetrics {
    /// Root-mean-square position error (mm) while the track was valid.
    pub fn rmse_position(&self) -> f64 {
        if self.n_matched == 0 {
            return 0.0;
        }
        (self.sum_sq_pos_err / self.n_matched as f64).sqrt()
    }

    /// Fraction of sweeps with a valid track.
    pub fn valid_fraction(&self) -> f64 {
        if self.n_sweeps == 0 {
            0.0
        } else {
            self.n_valid as f64 / self.n_sweeps as f64
        }
    }

    /// Accumulate one sweep. `track_mm` is the reported track position,
    /// `truth_mm` the true target position in the same chassis frame.
    pub fn accumulate(
        &mut self,
        action: SweepAction,
        valid: bool,
        fire: bool,
        track_mm: (i32, i32),
        truth_mm: Option<(f64, f64)>,
    ) {
        self.n_sweeps += 1;
        match action {
            SweepAction::Corrected => self.corrections += 1,
            SweepAction::Reset => self.resets += 1,
            SweepAction::Coasted => self.coasts += 1,
        }
        if fire {
            self.fire_sweeps += 1;
        }
        if !valid {
            return;
        }
        self.n_valid += 1;
        if let Some((tx, ty)) = truth_mm {
            let dx = track_mm.0 as f64 - tx;
            let dy = track_mm.1 as f64 - ty;
            self.sum_sq_pos_err += dx * dx + dy * dy;
            self.n_matched += 1;
        }
    }

    /// Fold another run's statistics into this one.
    pub fn merge(&mut self, other: &TrackingMetrics) {
        self.n_sweeps += other.n_sweeps;
        self.n_valid += other.n_valid;
        self.n_matched += other.n_matched;
        self.sum_sq_pos_err += other.sum_sq_pos_err;
        self.corrections += other.corrections;
        self.resets += other.resets;
        self.coasts += other.coasts;
        self.fire_sweeps += other.fire_sweeps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rmse_only_counts_valid_sweeps() {
        let mut m = TrackingMetrics::default();
        m.accumulate(SweepAction::Reset, false, false, (0, 0), Some((500.0, 0.0)));
        m.accumulate(SweepAction::Corrected, true, false, (1030, 0), Some((1000.0, 0.0)));
        m.accumulate(SweepAction::Corrected, true, true, (1000, 40), Some((1000.0, 0.0)));
        assert_abs_diff_eq!(m.rmse_position(), (2500.0f64 / 2.0).sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(m.valid_fraction(), 2.0 / 3.0, epsilon = 1e-9);
        assert_eq!((m.resets, m.corrections, m.coasts, m.fire_sweeps), (1, 2, 0, 1));
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = TrackingMetrics::default();
        a.accumulate(SweepAction::Coasted, false, false, (0, 0), None);
        let mut b = a.clone();
        b.accumulate(SweepAction::Corrected, true, false, (10, 0), Some((0.0, 0.0)));
        a.merge(&b);
        assert_eq!(a.n_sweeps, 3);
        assert_eq!(a.coasts, 2);
        assert_abs_diff_eq!(a.rmse_position(), 10.0, epsilon = 1e-9);
    }
}

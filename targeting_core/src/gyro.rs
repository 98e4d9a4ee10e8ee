//! Latest yaw-rate sample shared between the gyro writer and the sweep loop.
//!
//! One writer (sampling interrupt or IMU task), one reader (the tracker,
//! once per sweep). The sample is a single atomic word, so a read never
//! sees a torn value; it may be one sample old, which the filter tolerates.

use std::sync::atomic::{AtomicI32, Ordering};

const NO_SAMPLE: i32 = i32::MIN;

/// Single-word cell holding the most recent raw gyro z sample.
#[derive(Debug)]
pub struct OmegaZCell {
    sample: AtomicI32,
}

impl Default for OmegaZCell {
    fn default() -> Self {
        Self::new()
    }
}

impl OmegaZCell {
    pub const fn new() -> Self {
        Self {
            sample: AtomicI32::new(NO_SAMPLE),
        }
    }

    /// Publish a new raw sample (gyro counts).
    pub fn write(&self, omega_z: i16) {
        self.sample.store(omega_z as i32, Ordering::Release);
    }

    /// Latest sample, `None` until the first write.
    pub fn read(&self) -> Option<i16> {
        match self.sample.load(Ordering::Acquire) {
            NO_SAMPLE => None,
            v => Some(v as i16),
        }
    }

    /// Latest sample with a missing one read as zero rate.
    pub fn read_or_zero(&self) -> i16 {
        self.read().unwrap_or(0)
    }

    /// Forget the current sample (e.g. IMU reinitialised).
    pub fn clear(&self) {
        self.sample.store(NO_SAMPLE, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn empty_until_written() {
        let cell = OmegaZCell::new();
        assert_eq!(cell.read(), None);
        assert_eq!(cell.read_or_zero(), 0);
        cell.write(-1234);
        assert_eq!(cell.read(), Some(-1234));
        cell.clear();
        assert_eq!(cell.read(), None);
    }

    #[test]
    fn extreme_samples_round_trip() {
        let cell = OmegaZCell::new();
        cell.write(i16::MIN);
        assert_eq!(cell.read(), Some(i16::MIN));
        cell.write(i16::MAX);
        assert_eq!(cell.read(), Some(i16::MAX));
    }

    #[test]
    fn reader_sees_writer_thread() {
        let cell = Arc::new(OmegaZCell::new());
        let writer = {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || {
                for v in 0..1000i16 {
                    cell.write(v);
                }
            })
        };
        writer.join().unwrap();
        assert_eq!(cell.read(), Some(999));
    }
}

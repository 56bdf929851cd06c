//! Frame-duration estimation.
//! Predicts how long the next tick will take from the last few measured
//! tick-to-tick intervals, so that each tick's recording window stays in step
//! with wall-clock time.

use std::collections::VecDeque;
use crate::core::time::{self, Time};

/// Frame rate assumed before any tick has been measured
pub const DESIRED_FRAME_RATE: f64 = 60.0;

/// Default number of recent intervals the average is taken over
pub const DEFAULT_WINDOW: usize = 5;

/// Moving average of recent tick durations (microseconds) with outlier rejection.
///
/// The single largest sample is left out of the average, so one delayed tick
/// cannot drag the estimate up for the whole window.
#[derive(Debug, Clone)]
pub struct FrameDurationEstimator {
    samples: VecDeque<Time>,
    capacity: usize,
    average: f64,
}

impl FrameDurationEstimator {
    /// Create an estimator keeping the last `capacity` samples (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.max(1) + 1),
            capacity: capacity.max(1),
            average: time::frame_duration(DESIRED_FRAME_RATE).round(),
        }
    }

    /// Current estimate in microseconds
    pub fn average(&self) -> f64 {
        self.average
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no interval has been measured since the last reset
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Feed one measured tick-to-tick duration and return the updated estimate.
    ///
    /// Zero-length (or negative) durations are not recorded. With no samples
    /// held, the previous estimate is returned unchanged.
    pub fn measure(&mut self, duration: Time) -> f64 {
        if duration > 0 {
            self.samples.push_back(duration);
        }
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }

        if let Some(average) = Self::trimmed_mean(&self.samples) {
            self.average = average;
        }
        self.average
    }

    /// Drop all history, optionally seeding it with one sample that also
    /// becomes the current estimate.
    pub fn reset(&mut self, seed: Option<f64>) {
        self.samples.clear();
        if let Some(seed) = seed {
            let sample = seed.round() as Time;
            if sample > 0 {
                self.samples.push_back(sample);
            }
            self.average = seed;
        }
    }

    /// Estimated frames per second
    pub fn fps(&self) -> f64 {
        time::constants::MICROS_PER_SECOND as f64 / self.average
    }

    fn trimmed_mean(samples: &VecDeque<Time>) -> Option<f64> {
        match samples.len() {
            0 => None,
            1 => samples.front().map(|&s| s as f64),
            n => {
                let total: Time = samples.iter().sum();
                let largest = samples.iter().copied().max().unwrap_or(0);
                Some((total - largest) as f64 / (n - 1) as f64)
            }
        }
    }
}

impl Default for FrameDurationEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

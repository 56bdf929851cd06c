//! Keyframe index: the immutable, time-sorted recording and pure lookups over it.

use std::ops::Range;
use crate::core::keyframe::Keyframe;
use crate::core::time::{self, Time};

/// Error type for building an index
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndexError {
    #[error("keyframes must be a non-empty collection")]
    Empty,
    #[error("keyframe {index} has no finite numeric `{key}` field")]
    MissingTime { index: usize, key: String },
}

/// Sorted keyframes with their times pulled out once at construction.
///
/// Nothing mutates the index after `new`, so lookups only ever need `&self`.
#[derive(Debug, Clone)]
pub struct KeyframeIndex<K> {
    keyframes: Vec<K>,
    times: Vec<f64>, // milliseconds, ascending, parallel to `keyframes`
}

impl<K: Keyframe> KeyframeIndex<K> {
    /// Build the index, reading each keyframe's time from the field `key`.
    ///
    /// Sorting is stable: keyframes sharing a time keep their input order.
    pub fn new(keyframes: Vec<K>, key: &str) -> Result<Self, IndexError> {
        if keyframes.is_empty() {
            return Err(IndexError::Empty);
        }

        let mut entries = Vec::with_capacity(keyframes.len());
        for (index, keyframe) in keyframes.into_iter().enumerate() {
            match keyframe.time(key) {
                Some(t) if t.is_finite() => entries.push((t, keyframe)),
                _ => {
                    return Err(IndexError::MissingTime {
                        index,
                        key: key.to_string(),
                    })
                }
            }
        }
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (times, keyframes) = entries.into_iter().unzip();
        Ok(Self { keyframes, times })
    }
}

impl<K> KeyframeIndex<K> {
    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Keyframes in ascending time order
    pub fn keyframes(&self) -> &[K] {
        &self.keyframes
    }

    /// Time (milliseconds) of the keyframe at `position`
    pub fn time_at(&self, position: usize) -> Option<f64> {
        self.times.get(position).copied()
    }

    /// Time (milliseconds) of the last keyframe
    pub fn last_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Keyframes whose time falls in the window between `start` and `end`
    /// (microseconds), in playback order.
    ///
    /// Forward: `start <= t < end`, ascending.
    /// Backward: `end < t <= start`, descending.
    pub fn window_for(&self, start: Time, end: Time, forward: bool) -> Vec<&K> {
        let range = self.window_range(start, end, forward);
        if forward {
            self.keyframes[range].iter().collect()
        } else {
            self.keyframes[range].iter().rev().collect()
        }
    }

    /// Positions (ascending) of the keyframes `window_for` returns
    pub fn window_range(&self, start: Time, end: Time, forward: bool) -> Range<usize> {
        let start_ms = time::to_millis(start);
        let end_ms = time::to_millis(end);

        let (lo, hi) = if forward {
            (
                self.times.partition_point(|&t| t < start_ms),
                self.times.partition_point(|&t| t < end_ms),
            )
        } else {
            (
                self.times.partition_point(|&t| t <= end_ms),
                self.times.partition_point(|&t| t <= start_ms),
            )
        };
        lo..hi.max(lo)
    }

    /// First keyframe strictly beyond `at` (microseconds) in the direction of travel.
    pub fn next_after(&self, at: Time, forward: bool) -> Option<&K> {
        let at_ms = time::to_millis(at);

        if forward {
            let position = self.times.partition_point(|&t| t <= at_ms);
            self.keyframes.get(position)
        } else {
            let position = self.times.partition_point(|&t| t < at_ms);
            position.checked_sub(1).map(|p| &self.keyframes[p])
        }
    }
}

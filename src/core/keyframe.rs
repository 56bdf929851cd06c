//! Keyframe records.
//!
//! The scheduler never looks inside a keyframe except to read its time
//! (milliseconds, recording-relative). Which field carries the time is
//! configurable through `PlayerOptions::time_key`.

use serde_json::Value;

/// An application record with a recording-relative timestamp.
pub trait Keyframe {
    /// Time of this keyframe in milliseconds, read from the field named `key`.
    ///
    /// Types with a fixed layout are free to ignore `key`. Returning `None`
    /// (or a non-finite value) rejects the record at construction.
    fn time(&self, key: &str) -> Option<f64>;
}

impl Keyframe for Value {
    fn time(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }
}

impl<K: Keyframe + ?Sized> Keyframe for Box<K> {
    fn time(&self, key: &str) -> Option<f64> {
        (**self).time(key)
    }
}

//! Time representation for the recording timeline.
//! Keyframe times arrive in milliseconds; internally everything is tracked in
//! whole microseconds so that many small per-tick advances never drift.

/// Time in microseconds (recording-relative or wall-clock, depending on context)
pub type Time = i64;

/// Time constants for conversions
pub mod constants {
    use super::Time;

    pub const MICROS_PER_SECOND: Time = 1_000_000;
    pub const MICROS_PER_MILLI: Time = 1_000;
}

/// Sentinel for "recording time not set yet" (never played, or stopped).
///
/// One unit below zero so that a forward window starting here still includes
/// a keyframe stamped at exactly 0.
pub const UNSET: Time = -1;

/// Convert milliseconds (f64) to microseconds, rounding to the nearest unit
#[inline]
pub fn from_millis(millis: f64) -> Time {
    (millis * constants::MICROS_PER_MILLI as f64).round() as Time
}

/// Convert microseconds to milliseconds (f64)
#[inline]
pub fn to_millis(micros: Time) -> f64 {
    micros as f64 / constants::MICROS_PER_MILLI as f64
}

/// Average frame duration (microseconds) corresponding to a frame rate
#[inline]
pub fn frame_duration(fps: f64) -> f64 {
    constants::MICROS_PER_SECOND as f64 / fps
}

/// Format recording time (milliseconds) as HH:MM:SS.mmm
pub fn format_time(millis: f64) -> String {
    let total_millis = millis.max(0.0).round() as i64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let seconds = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

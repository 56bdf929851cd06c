//! Core types for the playback scheduler.
//!
//! This module provides the recording-side data: the time unit, the keyframe
//! abstraction, and the sorted keyframe index the tick loop reads from.
//! Recording time is tracked in microseconds (i64) internally.

pub mod index;
pub mod keyframe;
pub mod time;

// Re-export core data structures for easier access.
pub use index::{IndexError, KeyframeIndex};
pub use keyframe::Keyframe;
pub use time::{Time, UNSET};

//! Recording playback scheduler.
//!
//! Plays back a recording of time-stamped keyframes in sync with a host's
//! refresh ticks: every tick, the keyframes whose time falls inside the
//! elapsed slice of recording time are handed to a render callback.

pub mod core;
pub mod driver;
pub mod playback;

pub use crate::core::{Keyframe, KeyframeIndex, Time};
pub use driver::IntervalDriver;
pub use playback::{
    Direction, ManualTicks, PlaybackInfo, PlaybackState, Player, PlayerError, PlayerEvent,
    PlayerOptions, Render, RenderError, RenderFrame, SeekingMode, SeekingSpeed, TickSource,
};

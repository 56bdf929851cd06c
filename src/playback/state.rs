//! Playback state machine types.

use std::fmt;
use std::str::FromStr;
use serde::Deserialize;
use crate::core::time::Time;
use crate::playback::error::PlayerError;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// Stopped - no recording position, nothing scheduled
    Stopped,
    /// Playing - advancing through the recording on every tick
    Playing,
    /// Paused - holding an addressable position
    Paused,
}

impl PlaybackState {
    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        matches!(self, PlaybackState::Paused)
    }

    /// Check if stopped
    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackState::Stopped)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Stopped
    }
}

/// Direction of travel along the recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the first keyframe towards the last
    Forward,
    /// From the last keyframe towards the first
    Backward,
}

impl Direction {
    pub fn is_forward(&self) -> bool {
        matches!(self, Direction::Forward)
    }

    /// +1 going forward, -1 going backward
    pub fn sign(&self) -> Time {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Forward
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

impl FromStr for Direction {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" | "fwd" => Ok(Direction::Forward),
            "backward" | "back" | "bwd" => Ok(Direction::Backward),
            _ => Err(PlayerError::invalid_enum("direction", s)),
        }
    }
}

/// How a seek travels to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekingMode {
    /// Deliver every keyframe between current and target position at seeking speed
    PlayFrames,
    /// Jump straight to the target; only the keyframe at the target is delivered
    OmitFrames,
}

impl Default for SeekingMode {
    fn default() -> Self {
        SeekingMode::OmitFrames
    }
}

impl fmt::Display for SeekingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeekingMode::PlayFrames => write!(f, "play-frames"),
            SeekingMode::OmitFrames => write!(f, "omit-frames"),
        }
    }
}

impl FromStr for SeekingMode {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "play-frames" | "play" => Ok(SeekingMode::PlayFrames),
            "omit-frames" | "omit" => Ok(SeekingMode::OmitFrames),
            _ => Err(PlayerError::invalid_enum("seeking mode", s)),
        }
    }
}

/// Normal-playback settings put aside while a play-through seek runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekSnapshot {
    /// Estimator output before the seek (microseconds)
    pub average_frame_duration: f64,
    pub direction: Direction,
    /// Boundary normal playback was heading for (microseconds)
    pub recording_end: Time,
}

/// Seek in progress, if any. Orthogonal to `PlaybackState`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Seek {
    #[default]
    Idle,
    /// Jumped to the target; one more tick delivers the keyframe there
    Omitting,
    /// Playing through to the target at seeking speed
    PlayingThrough(SeekSnapshot),
}

impl Seek {
    pub fn is_active(&self) -> bool {
        !matches!(self, Seek::Idle)
    }

    pub fn snapshot(&self) -> Option<&SeekSnapshot> {
        match self {
            Seek::PlayingThrough(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Read-only view of a player, handed to seeking-speed resolvers and hosts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackInfo {
    pub state: PlaybackState,
    pub direction: Direction,
    pub is_seeking: bool,
    pub seeking_mode: SeekingMode,
    pub speed: f64,
    /// Current recording time in milliseconds, `None` until positioned
    pub recording_time: Option<f64>,
    pub fps: f64,
    pub last_keyframe_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(PlaybackState::Stopped.is_stopped());
        assert!(PlaybackState::Playing.is_playing());
        assert!(PlaybackState::Paused.is_paused());
        assert!(!PlaybackState::Paused.is_playing());
        assert_eq!(PlaybackState::default(), PlaybackState::Stopped);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("Backward".parse::<Direction>().unwrap(), Direction::Backward);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(PlayerError::InvalidEnum { .. })
        ));
        assert_eq!(Direction::Backward.sign(), -1);
    }

    #[test]
    fn test_seeking_mode_parse() {
        assert_eq!("play_frames".parse::<SeekingMode>().unwrap(), SeekingMode::PlayFrames);
        assert_eq!("omit-frames".parse::<SeekingMode>().unwrap(), SeekingMode::OmitFrames);
        assert!("f4nCy M0d3".parse::<SeekingMode>().is_err());
        assert_eq!(SeekingMode::default(), SeekingMode::OmitFrames);
    }

    #[test]
    fn test_seek_snapshot_only_when_playing_through() {
        assert!(!Seek::Idle.is_active());
        assert!(Seek::Omitting.is_active());
        assert!(Seek::Omitting.snapshot().is_none());

        let snapshot = SeekSnapshot {
            average_frame_duration: 20_000.0,
            direction: Direction::Backward,
            recording_end: 0,
        };
        let seek = Seek::PlayingThrough(snapshot);
        assert!(seek.is_active());
        assert_eq!(seek.snapshot(), Some(&snapshot));
    }
}

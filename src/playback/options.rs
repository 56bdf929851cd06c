//! Player configuration and the shared validation routines behind every setter.

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Deserializer};
use crate::playback::error::PlayerError;
use crate::playback::state::{PlaybackInfo, SeekingMode};
use crate::playback::sync::DEFAULT_WINDOW;

/// Seeking speed used when none is configured
pub const DEFAULT_SEEKING_SPEED: f64 = 100.0;

/// Resolver computing the seeking speed from the player's current state
pub type SpeedResolver = Arc<dyn Fn(&PlaybackInfo) -> f64 + Send + Sync>;

/// Seeking speed: a fixed rate, or a resolver re-evaluated on every seeking tick
#[derive(Clone)]
pub enum SeekingSpeed {
    Fixed(f64),
    Resolver(SpeedResolver),
}

impl SeekingSpeed {
    /// Wrap a resolver closure
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&PlaybackInfo) -> f64 + Send + Sync + 'static,
    {
        SeekingSpeed::Resolver(Arc::new(f))
    }

    /// Fixed rates must pass `validate_speed`; resolvers are checked per call
    pub fn validate(self) -> Result<Self, PlayerError> {
        match self {
            SeekingSpeed::Fixed(value) => {
                validate_speed("seeking speed", value).map(SeekingSpeed::Fixed)
            }
            resolver => Ok(resolver),
        }
    }

    /// The fixed rate, if this is not a resolver
    pub fn fixed(&self) -> Option<f64> {
        match self {
            SeekingSpeed::Fixed(value) => Some(*value),
            SeekingSpeed::Resolver(_) => None,
        }
    }

    /// Evaluate against `info`, validating what a resolver returns
    pub fn resolve(&self, info: &PlaybackInfo) -> Result<f64, PlayerError> {
        match self {
            SeekingSpeed::Fixed(value) => Ok(*value),
            SeekingSpeed::Resolver(f) => validate_speed("seeking speed", f(info)),
        }
    }
}

impl fmt::Debug for SeekingSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeekingSpeed::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            SeekingSpeed::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<f64> for SeekingSpeed {
    fn from(value: f64) -> Self {
        SeekingSpeed::Fixed(value)
    }
}

impl Default for SeekingSpeed {
    fn default() -> Self {
        SeekingSpeed::Fixed(DEFAULT_SEEKING_SPEED)
    }
}

impl<'de> Deserialize<'de> for SeekingSpeed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(SeekingSpeed::Fixed)
    }
}

/// Construction-time configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerOptions {
    /// Initial playback rate
    pub speed: f64,
    /// Rate used by play-through seeks
    pub seeking_speed: SeekingSpeed,
    pub seeking_mode: SeekingMode,
    /// How many recent tick intervals the frame-duration estimate averages
    pub last_frames_for_average: usize,
    /// Name of the keyframe field holding its time in milliseconds
    pub time_key: String,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            seeking_speed: SeekingSpeed::default(),
            seeking_mode: SeekingMode::default(),
            last_frames_for_average: DEFAULT_WINDOW,
            time_key: "time".to_string(),
        }
    }
}

impl PlayerOptions {
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_seeking_speed(mut self, seeking_speed: impl Into<SeekingSpeed>) -> Self {
        self.seeking_speed = seeking_speed.into();
        self
    }

    pub fn with_seeking_mode(mut self, seeking_mode: SeekingMode) -> Self {
        self.seeking_mode = seeking_mode;
        self
    }

    pub fn with_last_frames_for_average(mut self, count: usize) -> Self {
        self.last_frames_for_average = count;
        self
    }

    pub fn with_time_key(mut self, key: impl Into<String>) -> Self {
        self.time_key = key.into();
        self
    }

    /// Parse options from JSON; absent keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, PlayerError> {
        let options: Self = serde_json::from_str(json).map_err(|e| PlayerError::InvalidOption {
            name: "options",
            reason: e.to_string(),
        })?;
        options.validate()
    }

    /// Check every field with the same routines the setters use
    pub fn validate(self) -> Result<Self, PlayerError> {
        validate_speed("speed", self.speed)?;
        let seeking_speed = self.seeking_speed.validate()?;
        validate_window(self.last_frames_for_average)?;
        if self.time_key.is_empty() {
            return Err(PlayerError::InvalidOption {
                name: "time_key",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(Self {
            seeking_speed,
            ..self
        })
    }
}

/// Accept only positive, finite rates
pub fn validate_speed(name: &'static str, value: f64) -> Result<f64, PlayerError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PlayerError::InvalidSpeed { name, value })
    }
}

/// Accept only finite times (milliseconds)
pub fn validate_time(value: f64) -> Result<f64, PlayerError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PlayerError::InvalidTime(value))
    }
}

/// The estimator needs room for at least one sample
pub fn validate_window(count: usize) -> Result<usize, PlayerError> {
    if count >= 1 {
        Ok(count)
    } else {
        Err(PlayerError::InvalidOption {
            name: "last_frames_for_average",
            reason: "must be at least 1".to_string(),
        })
    }
}

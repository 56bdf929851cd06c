//! Error types for the player.

use std::fmt::Display;
use crate::core::index::IndexError;

/// Error a render callback may hand back; it is reported, never propagated
pub type RenderError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for player construction and public operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlayerError {
    #[error("invalid keyframes: {0}")]
    Keyframes(#[from] IndexError),
    #[error("{name} must be a positive, finite number (got {value})")]
    InvalidSpeed { name: &'static str, value: f64 },
    #[error("{name} must be one of its enum values (got {value})")]
    InvalidEnum { name: &'static str, value: String },
    #[error("time must be a finite number of milliseconds (got {0})")]
    InvalidTime(f64),
    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },
    #[error("speed can not be changed while seeking")]
    SpeedLockedWhileSeeking,
    #[error("seeking mode can not be changed while seeking")]
    ModeLockedWhileSeeking,
    #[error("instance was destroyed and can not be used anymore")]
    Destroyed,
}

impl PlayerError {
    pub(crate) fn invalid_enum(name: &'static str, value: impl Display) -> Self {
        PlayerError::InvalidEnum {
            name,
            value: value.to_string(),
        }
    }

    /// True for precondition failures on a setter or argument
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlayerError::InvalidSpeed { .. }
                | PlayerError::InvalidEnum { .. }
                | PlayerError::InvalidTime(_)
                | PlayerError::InvalidOption { .. }
                | PlayerError::SpeedLockedWhileSeeking
                | PlayerError::ModeLockedWhileSeeking
        )
    }
}

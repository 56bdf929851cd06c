//! Player notifications.
//! Uses crossbeam channels for delivery: every subscriber gets its own
//! unbounded receiver, and events arrive in exactly the order they were emitted.

use std::sync::Arc;
use crossbeam::channel::{self, Receiver, Sender};
use crate::playback::error::RenderError;

/// Notification emitted by a player
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// First real tick of a playing run (wall-clock milliseconds)
    Playing { wall_time: f64 },
    /// `play()` resumed a paused player
    Play,
    /// Playback paused
    Pause,
    /// Playback stopped by `stop()`/`abort()`/`destroy()`
    Abort,
    /// `play()` was given a start time and is about to seek there
    Waiting,
    /// A seek started (or its target moved)
    Seeking,
    /// A seek resolved at this recording time (milliseconds)
    Seeked { recording_time: f64 },
    /// Recording position after a delivered window (milliseconds)
    TimeUpdate { recording_time: f64 },
    /// The last keyframe in the direction of travel was delivered
    Ended,
    /// `speed` changed
    RateChange { speed: f64 },
    /// The render callback failed; the tick loop carried on
    Error(Arc<RenderError>),
}

impl PlayerEvent {
    /// Short name, handy for logs and assertions
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::Playing { .. } => "playing",
            PlayerEvent::Play => "play",
            PlayerEvent::Pause => "pause",
            PlayerEvent::Abort => "abort",
            PlayerEvent::Waiting => "waiting",
            PlayerEvent::Seeking => "seeking",
            PlayerEvent::Seeked { .. } => "seeked",
            PlayerEvent::TimeUpdate { .. } => "timeupdate",
            PlayerEvent::Ended => "ended",
            PlayerEvent::RateChange { .. } => "ratechange",
            PlayerEvent::Error(_) => "error",
        }
    }
}

/// Fan-out of player events to any number of subscribers
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Vec<Sender<PlayerEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber, forgetting dropped ones
    pub fn emit(&mut self, event: PlayerEvent) {
        log::trace!("event: {}", event.name());
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Drop every subscriber; their receivers see a disconnected channel
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

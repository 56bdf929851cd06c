//! Timer-driven host for a player.
//!
//! Stands in for a display refresh: a tokio interval fires at the configured
//! cadence and each firing is handed to `Player::frame` with the elapsed
//! wall-clock time, for as long as the player keeps a tick pending.

use std::time::Duration;
use log::debug;
use tokio::time::{self, Instant, MissedTickBehavior};
use crate::playback::error::PlayerError;
use crate::playback::options::validate_speed;
use crate::playback::Player;

/// Default refresh cadence
pub const DEFAULT_FPS: f64 = 60.0;

/// Pumps ticks into a player at a fixed refresh rate
#[derive(Debug, Clone, Copy)]
pub struct IntervalDriver {
    period: Duration,
}

impl IntervalDriver {
    /// Create a driver firing `fps` times per second
    pub fn new(fps: f64) -> Result<Self, PlayerError> {
        let fps = validate_speed("fps", fps)?;
        Ok(Self {
            period: Duration::from_secs_f64(1.0 / fps),
        })
    }

    /// Time between firings
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Deliver ticks until the player stops asking for them.
    ///
    /// Returns the number of ticks delivered. Late firings are delayed rather
    /// than bunched, so the player sees the real gap and catches up itself.
    pub async fn run<K>(&self, player: &mut Player<K>) -> usize {
        let origin = Instant::now();
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut delivered = 0;
        while player.has_pending_tick() {
            interval.tick().await;
            let wall_time = origin.elapsed().as_secs_f64() * 1000.0;
            player.frame(wall_time);
            delivered += 1;
        }
        debug!("driver idle after {} ticks", delivered);
        delivered
    }
}

impl Default for IntervalDriver {
    fn default() -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / DEFAULT_FPS),
        }
    }
}

//! Main playback engine: maps wall-clock ticks onto the recording timeline
//! and hands each tick's window of keyframes to the render callback.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use crossbeam::channel::Receiver;
use log::{debug, trace, warn};
use crate::core::index::KeyframeIndex;
use crate::core::keyframe::Keyframe;
use crate::core::time::{self, Time, UNSET};
use crate::playback::error::{PlayerError, RenderError};
use crate::playback::events::{EventHub, PlayerEvent};
use crate::playback::options::{
    validate_speed, validate_time, validate_window, PlayerOptions, SeekingSpeed,
    DEFAULT_SEEKING_SPEED,
};
use crate::playback::state::{
    Direction, PlaybackInfo, PlaybackState, Seek, SeekSnapshot, SeekingMode,
};
use crate::playback::sync::FrameDurationEstimator;
use crate::playback::tick::{TickId, TickSource};

/// What the render callback receives on each tick
#[derive(Debug)]
pub struct RenderFrame<'a, K> {
    /// Keyframes reached during this tick, in playback order
    pub keyframes: Vec<&'a K>,
    /// First keyframe beyond this tick in the direction of travel
    pub next: Option<&'a K>,
    /// Recording time at the end of this tick (milliseconds)
    pub recording_time: f64,
    /// Wall-clock time of the tick (milliseconds)
    pub wall_time: f64,
}

/// Draws a window of keyframes. Implemented for any matching `FnMut`.
pub trait Render<K> {
    fn render(&mut self, frame: &RenderFrame<'_, K>) -> Result<(), RenderError>;
}

impl<K, F> Render<K> for F
where
    F: FnMut(&RenderFrame<'_, K>) -> Result<(), RenderError>,
{
    fn render(&mut self, frame: &RenderFrame<'_, K>) -> Result<(), RenderError> {
        self(frame)
    }
}

/// Recording playback scheduler
pub struct Player<K> {
    index: KeyframeIndex<K>,
    renderer: Box<dyn Render<K>>,
    ticks: Box<dyn TickSource>,
    pending_tick: Option<TickId>,
    events: EventHub,

    speed: f64,
    seeking_speed: SeekingSpeed,
    resolved_seeking_speed: f64,
    seeking_mode: SeekingMode,

    estimator: FrameDurationEstimator,
    state: PlaybackState,
    direction: Direction,
    seek: Seek,

    // Recording-side cursor and the boundary it is heading for (microseconds)
    last_recording_time: Time,
    recording_end: Time,
    current_recording_time: Option<f64>,

    // Wall-clock bookkeeping (microseconds); `None` means the next tick warms up
    last_frame_time: Option<Time>,
    next_frame_time: f64,
    playing_announced: bool,

    destroyed: bool,
}

impl<K: Keyframe> Player<K> {
    /// Create a player over `keyframes`, drawing through the closure `render`
    pub fn new<F, T>(
        keyframes: Vec<K>,
        render: F,
        ticks: T,
        options: PlayerOptions,
    ) -> Result<Self, PlayerError>
    where
        F: FnMut(&RenderFrame<'_, K>) -> Result<(), RenderError> + 'static,
        T: TickSource + 'static,
    {
        Self::with_renderer(keyframes, render, ticks, options)
    }

    /// Create a player drawing through any `Render` implementation
    pub fn with_renderer<R, T>(
        keyframes: Vec<K>,
        renderer: R,
        ticks: T,
        options: PlayerOptions,
    ) -> Result<Self, PlayerError>
    where
        R: Render<K> + 'static,
        T: TickSource + 'static,
    {
        let options = options.validate()?;
        let index = KeyframeIndex::new(keyframes, &options.time_key)?;
        let recording_end = time::from_millis(index.last_time());
        let resolved_seeking_speed = options.seeking_speed.fixed().unwrap_or(DEFAULT_SEEKING_SPEED);

        debug!(
            "player created: {} keyframes, last at {} ms, speed {}, {} seeking",
            index.len(),
            index.last_time(),
            options.speed,
            options.seeking_mode
        );

        Ok(Self {
            index,
            renderer: Box::new(renderer),
            ticks: Box::new(ticks),
            pending_tick: None,
            events: EventHub::new(),
            speed: options.speed,
            seeking_speed: options.seeking_speed,
            resolved_seeking_speed,
            seeking_mode: options.seeking_mode,
            estimator: FrameDurationEstimator::new(options.last_frames_for_average),
            state: PlaybackState::Stopped,
            direction: Direction::Forward,
            seek: Seek::Idle,
            last_recording_time: UNSET,
            recording_end,
            current_recording_time: None,
            last_frame_time: None,
            next_frame_time: 0.0,
            playing_announced: false,
            destroyed: false,
        })
    }
}

impl<K> Player<K> {
    // ========== Public operations ==========

    /// Start playing, or resume when paused.
    ///
    /// `direction` switches the direction of travel. `from_time` (milliseconds)
    /// seeks there first, announced by a `Waiting` event.
    pub fn play(
        &mut self,
        from_time: Option<f64>,
        direction: Option<Direction>,
    ) -> Result<(), PlayerError> {
        self.ensure_available()?;
        let from_time = from_time.map(validate_time).transpose()?;

        if let Some(direction) = direction {
            self.change_direction(direction);
        }

        if !self.state.is_playing() {
            let resumed = self.state.is_paused();
            if self.seek.is_active() {
                self.finish_seeking(time::to_millis(self.last_recording_time));
            }
            if self.state.is_stopped() {
                self.last_recording_time = self.start_boundary(self.direction);
            }

            self.state = PlaybackState::Playing;
            self.playing_announced = false;
            self.recording_end = self.end_boundary(self.direction);
            debug!("playing {} from {} us", self.direction, self.last_recording_time);

            if resumed {
                self.events.emit(PlayerEvent::Play);
            }
        }

        self.start_ticking_if_idle();

        if let Some(from_time) = from_time {
            // Starting a never-played recording at 0 is not a seek
            if !(self.last_recording_time == UNSET && from_time == 0.0) {
                self.events.emit(PlayerEvent::Waiting);
                self.seek(from_time)?;
            }
        }
        Ok(())
    }

    /// Pause if playing; no-op otherwise
    pub fn pause(&mut self) -> Result<(), PlayerError> {
        self.ensure_available()?;

        if self.state.is_playing() {
            self.state = PlaybackState::Paused;
            debug!("paused at {} us", self.last_recording_time);
            self.events.emit(PlayerEvent::Pause);
        }
        Ok(())
    }

    /// Stop playback, cancel the pending tick and forget the position.
    ///
    /// A seek still in flight is finished first (`Seeked`, `TimeUpdate`),
    /// then `Abort` is emitted.
    pub fn stop(&mut self) -> Result<(), PlayerError> {
        self.ensure_available()?;

        self.cancel_pending_tick();

        if !self.state.is_stopped() {
            if self.seek.is_active() {
                self.finish_seeking(time::to_millis(self.last_recording_time));
            }
            self.state = PlaybackState::Stopped;
            self.last_recording_time = UNSET;
            self.current_recording_time = None;
            debug!("stopped");
            self.events.emit(PlayerEvent::Abort);
        }
        Ok(())
    }

    /// Alias of `stop`
    pub fn abort(&mut self) -> Result<(), PlayerError> {
        self.stop()
    }

    /// Move the recording position to `to_time` (milliseconds).
    ///
    /// A stopped player becomes paused at the new position. How the position
    /// is reached depends on the seeking mode.
    ///
    /// In omit-frames mode a paused player renders only the keyframes stamped
    /// exactly at the target. A target falling between keyframes renders an
    /// empty window, so hosts must not assume a keyframe always arrives.
    pub fn seek(&mut self, to_time: f64) -> Result<(), PlayerError> {
        self.ensure_available()?;
        let target = time::from_millis(validate_time(to_time)?);

        let direction = match target.cmp(&self.last_recording_time) {
            std::cmp::Ordering::Less => Direction::Backward,
            std::cmp::Ordering::Greater => Direction::Forward,
            // Already there; there is no direction to travel in
            std::cmp::Ordering::Equal => return Ok(()),
        };

        if self.state.is_stopped() {
            self.state = PlaybackState::Paused;
        }

        match self.seeking_mode {
            SeekingMode::PlayFrames => {
                if !matches!(self.seek, Seek::PlayingThrough(_)) {
                    self.seek = Seek::PlayingThrough(SeekSnapshot {
                        average_frame_duration: self.estimator.average(),
                        direction: self.direction,
                        recording_end: self.recording_end,
                    });
                    self.estimator.reset(None);
                }
                self.direction = direction;
                self.recording_end = target;
            }
            SeekingMode::OmitFrames => {
                self.seek = Seek::Omitting;
                self.last_recording_time = target;
            }
        }
        debug!("seeking {} to {} us ({})", direction, target, self.seeking_mode);

        self.start_ticking_if_idle();
        self.events.emit(PlayerEvent::Seeking);
        Ok(())
    }

    /// Alias of `seek`
    pub fn fast_seek(&mut self, to_time: f64) -> Result<(), PlayerError> {
        self.seek(to_time)
    }

    /// Stop, drop every subscriber, and make the instance unusable
    pub fn destroy(&mut self) -> Result<(), PlayerError> {
        self.ensure_available()?;

        self.stop()?;
        self.cancel_pending_tick();
        self.events.clear();
        self.destroyed = true;
        debug!("destroyed");
        Ok(())
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&mut self) -> Result<Receiver<PlayerEvent>, PlayerError> {
        self.ensure_available()?;
        Ok(self.events.subscribe())
    }

    // ========== Properties ==========

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Change the playback rate; refused while a seek is in progress
    pub fn set_speed(&mut self, speed: f64) -> Result<(), PlayerError> {
        self.ensure_available()?;
        if self.seek.is_active() {
            return Err(PlayerError::SpeedLockedWhileSeeking);
        }
        self.speed = validate_speed("speed", speed)?;
        debug!("speed set to {}", self.speed);
        self.events.emit(PlayerEvent::RateChange { speed: self.speed });
        Ok(())
    }

    pub fn seeking_speed(&self) -> &SeekingSpeed {
        &self.seeking_speed
    }

    /// Change the seeking rate; allowed mid-seek, applies from the next tick
    pub fn set_seeking_speed(&mut self, seeking_speed: impl Into<SeekingSpeed>) -> Result<(), PlayerError> {
        self.ensure_available()?;
        let seeking_speed = seeking_speed.into().validate()?;
        if let Some(fixed) = seeking_speed.fixed() {
            self.resolved_seeking_speed = fixed;
        }
        self.seeking_speed = seeking_speed;
        Ok(())
    }

    pub fn seeking_mode(&self) -> SeekingMode {
        self.seeking_mode
    }

    /// Change the seeking mode; refused while a seek is in progress
    pub fn set_seeking_mode(&mut self, seeking_mode: SeekingMode) -> Result<(), PlayerError> {
        self.ensure_available()?;
        if self.seek.is_active() {
            return Err(PlayerError::ModeLockedWhileSeeking);
        }
        self.seeking_mode = seeking_mode;
        Ok(())
    }

    /// Resize the estimator's averaging window, discarding its history
    pub fn set_last_frames_for_average(&mut self, count: usize) -> Result<(), PlayerError> {
        self.ensure_available()?;
        let count = validate_window(count)?;
        let average = self.estimator.average();
        self.estimator = FrameDurationEstimator::new(count);
        self.estimator.reset(Some(average));
        Ok(())
    }

    /// Rate the recording currently advances at: the seeking speed during a
    /// play-through seek, `speed` otherwise
    pub fn current_speed(&self) -> f64 {
        match self.seek {
            Seek::PlayingThrough(_) => self.resolved_seeking_speed,
            _ => self.speed,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.is_stopped()
    }

    pub fn is_seeking(&self) -> bool {
        self.seek.is_active()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Estimated host frame rate; the pre-seek estimate during a play-through seek
    pub fn fps(&self) -> f64 {
        match self.seek.snapshot() {
            Some(snapshot) => {
                time::constants::MICROS_PER_SECOND as f64 / snapshot.average_frame_duration
            }
            None => self.estimator.fps(),
        }
    }

    /// Time of the last keyframe (milliseconds)
    pub fn last_keyframe_time(&self) -> f64 {
        self.index.last_time()
    }

    /// Recording time reached by the last delivered tick (milliseconds)
    pub fn recording_time(&self) -> Option<f64> {
        self.current_recording_time
    }

    /// Keyframes in ascending time order
    pub fn keyframes(&self) -> &[K] {
        self.index.keyframes()
    }

    /// True while the player waits for a tick it requested
    pub fn has_pending_tick(&self) -> bool {
        self.pending_tick.is_some()
    }

    /// Read-only snapshot of the player's state
    pub fn info(&self) -> PlaybackInfo {
        PlaybackInfo {
            state: self.state,
            direction: self.direction,
            is_seeking: self.seek.is_active(),
            seeking_mode: self.seeking_mode,
            speed: self.current_speed(),
            recording_time: self.current_recording_time,
            fps: self.fps(),
            last_keyframe_time: self.index.last_time(),
        }
    }

    // ========== Tick loop ==========

    /// Run one tick at wall-clock time `wall_time` (milliseconds).
    ///
    /// Called by the host when a requested tick fires. Ignored when no tick
    /// is pending (never requested, cancelled, or the player was destroyed).
    pub fn frame(&mut self, wall_time: f64) {
        if self.destroyed || self.pending_tick.take().is_none() {
            return;
        }
        if self.state.is_paused() && !self.seek.is_active() {
            trace!("tick while paused, idling");
            return;
        }
        if matches!(self.seek, Seek::PlayingThrough(_)) {
            self.resolve_seeking_speed();
        }

        let now = time::from_millis(wall_time);
        let Some(last_frame_time) = self.last_frame_time else {
            // Warm-up tick: only establishes the time origin
            self.last_frame_time = Some(now);
            self.next_frame_time = now as f64 + self.estimator.average();
            self.request_tick();
            return;
        };

        let forward = self.direction.is_forward();
        let seeking = self.seek.is_active();
        let omitting = matches!(self.seek, Seek::Omitting);

        if !self.playing_announced
            && self.state.is_playing()
            && !matches!(self.seek, Seek::PlayingThrough(_))
        {
            self.playing_announced = true;
            self.events.emit(PlayerEvent::Playing { wall_time });
        }

        let average = self.estimator.measure(now.saturating_sub(last_frame_time));
        let frame_duration = (now as f64 - self.next_frame_time).max(average.round());

        let start = self.last_recording_time;
        let mut end = if omitting && !self.state.is_playing() {
            // Paused jump: land on the target keyframe only
            start.saturating_add(self.direction.sign())
        } else {
            // `as` saturates, so huge speeds pin to the time range instead of wrapping
            let delta = (frame_duration * self.current_speed()).round() as Time;
            start.saturating_add(delta.saturating_mul(self.direction.sign()))
        };
        // One unit past the boundary marks "this tick reaches the end"
        if forward && end > self.recording_end {
            end = self.recording_end.saturating_add(1);
        } else if !forward && end < self.recording_end {
            end = self.recording_end.saturating_sub(1);
        }

        let range = self.index.window_range(start, end, forward);
        let last_delivered = if range.is_empty() {
            None
        } else if forward {
            self.index.time_at(range.end - 1)
        } else {
            self.index.time_at(range.start)
        };
        let recording_time = time::to_millis(end);
        self.current_recording_time = Some(recording_time);
        trace!(
            "tick {} us: window {}..{} us, {} keyframes",
            now,
            start,
            end,
            range.len()
        );

        let failure = {
            let frame = RenderFrame {
                keyframes: self.index.window_for(start, end, forward),
                next: self.index.next_after(end, forward),
                recording_time,
                wall_time,
            };
            let renderer = &mut self.renderer;
            match panic::catch_unwind(AssertUnwindSafe(|| renderer.render(&frame))) {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(payload) => Some(panic_message(payload)),
            }
        };
        if let Some(err) = failure {
            warn!("render callback failed: {}", err);
            self.events.emit(PlayerEvent::Error(Arc::new(err)));
        }

        self.next_frame_time = now as f64 + frame_duration;
        self.last_frame_time = Some(now);

        if !seeking {
            self.events.emit(PlayerEvent::TimeUpdate { recording_time });
        }

        let before_end = match last_delivered {
            Some(t) => {
                let t = time::from_millis(t);
                if forward {
                    t < self.recording_end
                } else {
                    t > self.recording_end
                }
            }
            None => self.last_recording_time != end,
        };

        if before_end {
            if omitting {
                self.finish_seeking(recording_time);
            }
            if self.state.is_playing() || self.seek.is_active() {
                self.request_tick();
            } else {
                self.events.emit(PlayerEvent::Pause);
            }
        } else if self.seek.is_active() {
            self.finish_seeking(recording_time);
            if self.state.is_playing() {
                self.request_tick();
            }
            // Seeking-speed timings must not leak into normal playback
            self.last_frame_time = None;
        } else {
            self.state = PlaybackState::Stopped;
            debug!("reached the end at {} ms", recording_time);
            self.events.emit(PlayerEvent::Ended);
        }

        self.last_recording_time = end;
    }

    // ========== Internals ==========

    fn ensure_available(&self) -> Result<(), PlayerError> {
        if self.destroyed {
            Err(PlayerError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn request_tick(&mut self) {
        self.pending_tick = Some(self.ticks.request());
    }

    fn cancel_pending_tick(&mut self) {
        if let Some(id) = self.pending_tick.take() {
            self.ticks.cancel(id);
        }
    }

    fn start_ticking_if_idle(&mut self) {
        if self.pending_tick.is_none() {
            self.last_frame_time = None;
            self.next_frame_time = 0.0;
            self.request_tick();
        }
    }

    /// Where a playing run from the stopped state begins
    fn start_boundary(&self, direction: Direction) -> Time {
        match direction {
            Direction::Forward => UNSET,
            Direction::Backward => time::from_millis(self.index.last_time()).saturating_add(1),
        }
    }

    /// Where a playing run in `direction` ends
    fn end_boundary(&self, direction: Direction) -> Time {
        match direction {
            Direction::Forward => time::from_millis(self.index.last_time()),
            Direction::Backward => 0,
        }
    }

    fn change_direction(&mut self, direction: Direction) {
        let end = self.end_boundary(direction);
        match &mut self.seek {
            // The seek owns the live direction; redirect what it restores
            Seek::PlayingThrough(snapshot) => {
                snapshot.direction = direction;
                snapshot.recording_end = end;
            }
            _ => {
                self.direction = direction;
                if self.state.is_playing() {
                    self.recording_end = end;
                }
            }
        }
    }

    fn resolve_seeking_speed(&mut self) {
        let info = self.info();
        match self.seeking_speed.resolve(&info) {
            Ok(speed) => self.resolved_seeking_speed = speed,
            Err(err) => {
                warn!("seeking speed resolver failed, keeping {}: {}", self.resolved_seeking_speed, err);
                let err: RenderError = Box::new(err);
                self.events.emit(PlayerEvent::Error(Arc::new(err)));
            }
        }
    }

    fn restore_snapshot(&mut self) {
        if let Seek::PlayingThrough(snapshot) = std::mem::take(&mut self.seek) {
            self.estimator.reset(Some(snapshot.average_frame_duration));
            self.direction = snapshot.direction;
            self.recording_end = snapshot.recording_end;
        }
    }

    fn finish_seeking(&mut self, recording_time: f64) {
        self.restore_snapshot();
        debug!("seek finished at {} ms", recording_time);
        self.events.emit(PlayerEvent::Seeked { recording_time });
        self.events.emit(PlayerEvent::TimeUpdate { recording_time });
    }

}

impl<K> Drop for Player<K> {
    fn drop(&mut self) {
        self.cancel_pending_tick();
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> RenderError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "render callback panicked".to_string()
    };
    message.into()
}

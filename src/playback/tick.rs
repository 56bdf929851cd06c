//! Tick sources: whatever fires the player's per-frame callback.
//!
//! The player asks for one tick at a time and may cancel it. The host then
//! calls `Player::frame` with a wall-clock timestamp when the tick arrives.

use std::cell::Cell;
use std::rc::Rc;

/// Identifies one requested tick
pub type TickId = u64;

/// External scheduler of future ticks (vsync, redraw requests, a timer, ...)
pub trait TickSource {
    /// Ask for one future tick
    fn request(&mut self) -> TickId;

    /// Withdraw a tick previously handed out by `request`
    fn cancel(&mut self, id: TickId);
}

/// Tick source for hosts that pump frames themselves, and for tests.
///
/// Clones share counters, so a host can keep a handle after giving one to
/// the player.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    requested: Rc<Cell<u64>>,
    cancelled: Rc<Cell<u64>>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total ticks requested so far
    pub fn requested(&self) -> u64 {
        self.requested.get()
    }

    /// Total ticks cancelled so far
    pub fn cancelled(&self) -> u64 {
        self.cancelled.get()
    }
}

impl TickSource for ManualTicks {
    fn request(&mut self) -> TickId {
        let id = self.requested.get() + 1;
        self.requested.set(id);
        id
    }

    fn cancel(&mut self, _id: TickId) {
        self.cancelled.set(self.cancelled.get() + 1);
    }
}

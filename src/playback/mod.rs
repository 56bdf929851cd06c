pub mod engine;
pub mod error;
pub mod events;
pub mod options;
pub mod state;
pub mod sync;
pub mod tick;


pub use engine::{Player, Render, RenderFrame};
pub use error::{PlayerError, RenderError};
pub use events::{EventHub, PlayerEvent};
pub use options::{PlayerOptions, SeekingSpeed};
pub use state::{Direction, PlaybackInfo, PlaybackState, SeekingMode};
pub use sync::FrameDurationEstimator;
pub use tick::{ManualTicks, TickId, TickSource};

use clap::Parser;
use std::path::PathBuf;
use keyframe_player::{Direction, SeekingMode};

/// Play a JSON keyframe recording at a steady refresh rate
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON file holding an array of keyframe objects
    #[arg(value_name = "RECORDING")]
    pub recording: PathBuf,

    /// JSON file with player options (any subset of the option keys)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Playback rate
    #[arg(short = 's', long = "speed", value_name = "RATE")]
    pub speed: Option<f64>,

    /// Rate used when seeking in play-frames mode
    #[arg(long = "seeking-speed", value_name = "RATE")]
    pub seeking_speed: Option<f64>,

    /// Seeking mode (play-frames | omit-frames)
    #[arg(short = 'm', long = "seek-mode", value_name = "MODE")]
    pub seek_mode: Option<SeekingMode>,

    /// Number of recent ticks the frame-duration estimate averages
    #[arg(long = "average-window", value_name = "N")]
    pub average_window: Option<usize>,

    /// Name of the keyframe field holding its time in milliseconds
    #[arg(short = 'k', long = "time-key", value_name = "KEY")]
    pub time_key: Option<String>,

    /// Refresh rate the recording is driven at
    #[arg(long = "fps", value_name = "FPS", default_value_t = 60.0)]
    pub fps: f64,

    /// Start playing from this recording time (milliseconds)
    #[arg(short = 'f', long = "from", value_name = "MS")]
    pub from: Option<f64>,

    /// Direction of play (forward | backward)
    #[arg(short = 'd', long = "direction", value_name = "DIR")]
    pub direction: Option<Direction>,

    /// Do not play; seek to this recording time (milliseconds) and show what lands there
    #[arg(long = "seek-to", value_name = "MS", conflicts_with_all = ["from", "direction"])]
    pub seek_to: Option<f64>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

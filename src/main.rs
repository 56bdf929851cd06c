//! Command-line host: plays a JSON keyframe recording through the interval
//! driver and prints every delivered window as one JSON line.

mod cli;

use std::fs;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use serde_json::{json, Value};
use keyframe_player::core::time::format_time;
use keyframe_player::{
    IntervalDriver, ManualTicks, Player, PlayerEvent, PlayerOptions, RenderError,
    RenderFrame,
};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_logging(args.verbosity);
    debug!("Command-line args: {:?}", args);

    let options = load_options(&args)?;
    let time_key = options.time_key.clone();

    let text = fs::read_to_string(&args.recording)
        .with_context(|| format!("reading {}", args.recording.display()))?;
    let keyframes: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of keyframes", args.recording.display()))?;

    let mut player = Player::new(
        keyframes,
        move |frame: &RenderFrame<'_, Value>| -> Result<(), RenderError> {
            let line = json!({
                "recording_time": frame.recording_time,
                "keyframes": frame.keyframes,
                "next": frame.next.and_then(|k| k.get(&time_key)),
            });
            println!("{}", line);
            Ok(())
        },
        ManualTicks::new(),
        options,
    )
    .context("creating player")?;
    let events = player.subscribe()?;

    info!(
        "Loaded {} keyframes ({} long)",
        player.keyframes().len(),
        format_time(player.last_keyframe_time())
    );

    match args.seek_to {
        Some(to) => player.seek(to)?,
        None => player.play(args.from, args.direction)?,
    }

    let driver = IntervalDriver::new(args.fps).context("invalid --fps")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("starting runtime")?;
    let ticks = runtime.block_on(driver.run(&mut player));

    for event in events.try_iter() {
        match event {
            PlayerEvent::Error(err) => warn!("render failed: {}", err),
            other => debug!("event: {:?}", other),
        }
    }
    info!(
        "Finished after {} ticks at {} ({:?})",
        ticks,
        format_time(player.recording_time().unwrap_or(0.0)),
        player.state()
    );
    Ok(())
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

/// Options file first, then command-line overrides
fn load_options(args: &cli::Args) -> Result<PlayerOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            PlayerOptions::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => PlayerOptions::default(),
    };

    if let Some(speed) = args.speed {
        options = options.with_speed(speed);
    }
    if let Some(seeking_speed) = args.seeking_speed {
        options = options.with_seeking_speed(seeking_speed);
    }
    if let Some(mode) = args.seek_mode {
        options = options.with_seeking_mode(mode);
    }
    if let Some(count) = args.average_window {
        options = options.with_last_frames_for_average(count);
    }
    if let Some(key) = &args.time_key {
        options = options.with_time_key(key.clone());
    }
    Ok(options)
}

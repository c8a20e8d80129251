//! # Example: frame_loop
//!
//! Drives the timer engine from a real clock with [`FrameLoop`].
//!
//! Shows how to:
//! - Run repeating timers on different phases and time scales.
//! - Pause scaled time while unscaled timers keep ticking.
//! - Stop the loop from a command via a [`CancellationToken`].
//!
//! ## Flow
//! ```text
//! FrameLoop::run(token)
//!   every 16ms ─► FixedUpdate (20ms steps) ─► Update ─► LateUpdate
//!
//! "physics"   repeating 100ms, FixedUpdate/Scaled
//! "ui-blink"  repeating 250ms, Update/Unscaled
//! "session"   Sequence: Delay 1s ─► pause ─► Delay 1s (unscaled) ─► cancel token
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example frame_loop
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use cmdtick::{
    Action, Config, Delay, FrameLoop, Sequence, TimeScale, TimerSpec, Timers, UpdatePhase,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config {
        prewarm: 4,
        ..Config::default()
    };
    let timers = Timers::with_config(&cfg, Default::default());
    let driver = Rc::new(FrameLoop::new(timers.clone(), cfg));
    let token = CancellationToken::new();

    let physics_steps = Rc::new(Cell::new(0u32));
    let steps = physics_steps.clone();
    let physics = timers.acquire(
        TimerSpec::repeating(Duration::from_millis(100)).with_phase(UpdatePhase::FixedUpdate),
        move || steps.set(steps.get() + 1),
    );
    timers.start(physics)?;

    let blink = timers.acquire(
        TimerSpec::repeating(Duration::from_millis(250)).with_scale(TimeScale::Unscaled),
        || println!("[ui] blink"),
    );
    timers.start(blink)?;

    let pause = driver.clone();
    let resume = driver.clone();
    let stop = token.clone();
    let session = Sequence::new("session");
    session
        .push(Delay::command(&timers, "play", Duration::from_secs(1)))
        .push(Action::command("pause", move || {
            println!("[session] pausing scaled time");
            pause.set_time_scale(0.0);
        }))
        .push(
            Delay::new(&timers, Duration::from_secs(1))
                .with_scale(TimeScale::Unscaled)
                .into_command("paused"),
        )
        .push(Action::command("quit", move || {
            resume.set_time_scale(1.0);
            stop.cancel();
        }));
    session.start();

    let frames = driver.run(token).await;
    println!(
        "ran {frames} frames; physics stepped {} times",
        physics_steps.get()
    );

    timers.release(physics)?;
    timers.release(blink)?;
    Ok(())
}

//! # FrameLoop: reference host driver for the timer engine.
//!
//! Turns a monotonic clock into per-phase tick deltas and feeds them to [`Timers`].
//!
//! ## Frame
//! ```text
//! tick (every Config::frame) ──► real_dt = now - last
//!                                scaled  = real_dt * time_scale
//!      │
//!      ├─► FixedUpdate  accumulator += scaled
//!      │                while accumulator >= fixed_step (capped):
//!      │                    update(FixedUpdate, fixed_step, fixed_step)
//!      ├─► Update       update(Update,     scaled, real_dt)
//!      └─► LateUpdate   update(LateUpdate, scaled, real_dt)
//! ```
//!
//! ## Rules
//! - Runs on the current thread; the future is `!Send` because every handle is `Rc`-based.
//! - Stops at the next frame boundary once the [`CancellationToken`] is cancelled.
//! - With `fixed_step = 0`, FixedUpdate runs once per frame with the frame deltas.
//! - Fixed ticks pass `fixed_step` to both time scales.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use cmdtick::{Config, Delay, FrameLoop, Timers};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let timers = Timers::new();
//!     let token = CancellationToken::new();
//!
//!     let stop = token.clone();
//!     let wait = Delay::command(&timers, "wait", Duration::from_millis(50))
//!         .with_on_finished(move || stop.cancel());
//!     wait.start();
//!
//!     let frames = FrameLoop::new(timers, Config::default()).run(token).await;
//!     assert!(frames > 0);
//!     assert!(wait.is_finished());
//! }
//! ```

use std::cell::Cell;
use std::time::Duration;

use tokio::select;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::{scale_delta, Config};
use crate::timers::{Timers, UpdatePhase};

pub struct FrameLoop {
    timers: Timers,
    config: Config,
    time_scale: Cell<f64>,
    accumulator: Cell<Duration>,
}

impl FrameLoop {
    pub fn new(timers: Timers, config: Config) -> Self {
        let time_scale = Cell::new(config.time_scale_clamped());
        Self {
            timers,
            config,
            time_scale,
            accumulator: Cell::new(Duration::ZERO),
        }
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale.get()
    }

    /// Changes the scale applied to `Scaled` buckets from the next frame on.
    ///
    /// Negative values clamp to `0.0` (paused); non-finite values reset to `1.0`.
    pub fn set_time_scale(&self, scale: f64) {
        let scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
        self.time_scale.set(scale);
    }

    /// Runs one frame for a real elapsed time of `real_dt`.
    /// Returns the number of FixedUpdate ticks run.
    pub fn step(&self, real_dt: Duration) -> u32 {
        let scaled = scale_delta(real_dt, self.time_scale.get());
        let fixed = self.fixed_update(scaled, real_dt);
        self.timers.update(UpdatePhase::Update, scaled, real_dt);
        self.timers.update(UpdatePhase::LateUpdate, scaled, real_dt);
        fixed
    }

    fn fixed_update(&self, scaled: Duration, real_dt: Duration) -> u32 {
        let Some(step) = self.config.fixed_step() else {
            self.timers.update(UpdatePhase::FixedUpdate, scaled, real_dt);
            return 1;
        };

        let mut acc = self.accumulator.get().saturating_add(scaled);
        let mut steps = 0u32;
        while acc >= step {
            if self.config.max_fixed_steps().is_some_and(|max| steps >= max) {
                tracing::debug!(steps, backlog = ?acc, "fixed-step backlog dropped");
                acc = Duration::ZERO;
                break;
            }
            acc -= step;
            self.timers.update(UpdatePhase::FixedUpdate, step, step);
            steps += 1;
        }
        self.accumulator.set(acc);
        steps
    }

    /// Drives frames every `Config::frame` until `token` is cancelled.
    /// Returns the number of frames run.
    pub async fn run(&self, token: CancellationToken) -> u64 {
        let mut ticker = time::interval(self.config.frame_clamped());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        let mut last = Instant::now();
        let mut frames: u64 = 0;
        tracing::debug!(frame = ?self.config.frame_clamped(), "frame loop started");

        loop {
            if token.is_cancelled() {
                break;
            }
            select! {
                _ = ticker.tick() => {}
                _ = token.cancelled() => { break; }
            }

            let now = Instant::now();
            let real_dt = now.duration_since(last);
            last = now;

            self.step(real_dt);
            frames += 1;
        }

        tracing::debug!(frames, "frame loop stopped");
        frames
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("frame", &self.config.frame_clamped())
            .field("fixed_step", &self.config.fixed_step())
            .field("time_scale", &self.time_scale.get())
            .finish()
    }
}

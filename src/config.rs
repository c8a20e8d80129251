//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the timer engine and the
//! reference frame driver.
//!
//! Config is used in two ways:
//! 1. **Timer pools**: `Timers::with_config(config, subscribers)` pre-allocates timers
//! 2. **Frame driver**: `FrameLoop::new(timers, config)` derives per-phase deltas
//!
//! ## Sentinel values
//! - `prewarm = 0` → pools grow on demand
//! - `fixed_step = 0s` → FixedUpdate runs once per frame with the frame delta
//! - `max_fixed_steps = 0` → no cap on FixedUpdate catch-up ticks per frame

use std::time::Duration;

/// Global configuration for timers and the frame driver.
///
/// ## Field semantics
/// - `prewarm`: Timers created up front in every bucket pool (`0` = none)
/// - `frame`: Period between Update/LateUpdate ticks (min 1ms; clamped)
/// - `fixed_step`: Simulation step for FixedUpdate (`0s` = follow `frame`)
/// - `max_fixed_steps`: Cap on FixedUpdate ticks per frame (`0` = unlimited)
/// - `time_scale`: Multiplier applied to `Scaled` buckets (`>= 0`)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of timers allocated per (phase, scale) pool at construction.
    pub prewarm: usize,

    /// Period between frames driven by [`FrameLoop`](crate::FrameLoop).
    pub frame: Duration,

    /// Fixed simulation step for the FixedUpdate phase.
    ///
    /// - `Duration::ZERO` = one FixedUpdate per frame with the frame delta
    /// - `> 0` = accumulated; several FixedUpdate ticks may run in one frame
    pub fixed_step: Duration,

    /// Maximum FixedUpdate ticks run in one frame; the backlog beyond it is dropped.
    ///
    /// - `0` = unlimited
    pub max_fixed_steps: u32,

    /// Multiplier applied to the delta of `Scaled` buckets.
    ///
    /// `0.0` pauses scaled timers; `Unscaled` buckets are unaffected.
    pub time_scale: f64,
}

impl Config {
    /// Returns the frame period clamped to a minimum of 1ms.
    #[inline]
    pub fn frame_clamped(&self) -> Duration {
        self.frame.max(Duration::from_millis(1))
    }

    /// Returns the FixedUpdate step as an `Option`.
    ///
    /// - `None` → FixedUpdate follows the frame
    /// - `Some(d)` → fixed step of `d`
    #[inline]
    pub fn fixed_step(&self) -> Option<Duration> {
        if self.fixed_step == Duration::ZERO {
            None
        } else {
            Some(self.fixed_step)
        }
    }

    /// Returns the FixedUpdate cap as an `Option` (`None` = unlimited).
    #[inline]
    pub fn max_fixed_steps(&self) -> Option<u32> {
        if self.max_fixed_steps == 0 {
            None
        } else {
            Some(self.max_fixed_steps)
        }
    }

    /// Returns a usable time scale: negative values clamp to `0.0`,
    /// non-finite values fall back to `1.0`.
    #[inline]
    pub fn time_scale_clamped(&self) -> f64 {
        if !self.time_scale.is_finite() {
            1.0
        } else {
            self.time_scale.max(0.0)
        }
    }

    /// Applies the time scale to an unscaled delta.
    #[inline]
    pub fn scaled(&self, dt: Duration) -> Duration {
        scale_delta(dt, self.time_scale_clamped())
    }
}

/// Multiplies `dt` by a non-negative factor, saturating at `Duration::MAX`.
pub(crate) fn scale_delta(dt: Duration, factor: f64) -> Duration {
    if factor == 1.0 {
        return dt;
    }
    Duration::try_from_secs_f64(dt.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `prewarm = 0` (allocate on demand)
    /// - `frame = 16ms` (~60 frames per second)
    /// - `fixed_step = 20ms` (50 fixed steps per second)
    /// - `max_fixed_steps = 5`
    /// - `time_scale = 1.0` (real time)
    fn default() -> Self {
        Self {
            prewarm: 0,
            frame: Duration::from_millis(16),
            fixed_step: Duration::from_millis(20),
            max_fixed_steps: 5,
            time_scale: 1.0,
        }
    }
}

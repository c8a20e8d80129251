//! # Timer engine: pooled interval timers batched per (phase, scale) bucket.
//!
//! This module provides:
//! - [`Timers`] - pool + batch scheduler handle (acquire, start, stop, release, tick)
//! - [`TimerSpec`] - interval, loop budget, bucket and catch-up mode for an acquisition
//! - [`TimerId`] - generational handle, stale after release
//! - [`TimerState`] - point-in-time snapshot of a timer
//! - [`Loops`], [`UpdatePhase`], [`TimeScale`], [`BucketKey`] - timer affinity and budget
//!
//! ## Lifecycle
//! ```text
//! acquire(spec, cb) ──► start() ──► tick()* ──► stop() ──► release()
//!        ▲                │           │           │            │
//!        │                ▼           ▼           ▼            │
//!        │            pending ──► live list ──► sweep          │
//!        └──────────────────── free list ◄─────────────────────┘
//! ```

mod bucket;
mod pool;
mod scheduler;
mod timer;

pub use scheduler::{Timers, WeakTimers};
pub use timer::{BucketKey, Loops, TimeScale, TimerId, TimerSpec, TimerState, UpdatePhase};

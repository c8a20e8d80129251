//! # cmdtick
//!
//! **cmdtick** composes cooperative, cancellable units of work ("commands") into
//! trees and drives them forward with a pooled, batched interval-timer engine
//! ticked once per frame.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────────────┐
//!   │ FrameLoop (tokio)    │  monotonic clock ─► per-phase deltas
//!   └──────────┬───────────┘
//!              │ update(phase, scaled_dt, unscaled_dt)
//!              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Timers                                                           │
//! │  - Pool: generational slots, LIFO free list per bucket            │
//! │  - 6 buckets = {Update, FixedUpdate, LateUpdate} x {Scaled, Unsc.}│
//! │  - per bucket: live list + pending list + deferred sweep          │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ timer callback                                   │ Event
//!        ▼                                                  ▼
//!   ┌──────────────┐  finished   ┌──────────────┐   ┌────────────────┐
//!   │ Delay leaf   │ ──────────► │  Sequence /  │   │ SubscriberSet  │
//!   │ Dynamic leaf │             │  Group / Any │   │  └─ LogWriter  │
//!   │ Action leaf  │             │  Lazy / Wrap │   └────────────────┘
//!   └──────────────┘             └──────┬───────┘
//!                                       │ finished / stopped
//!                                       ▼
//!                                ┌──────────────┐
//!                                │ CommandHeap  │ ─► state_changed(bool)
//!                                └──────────────┘
//! ```
//!
//! ### Command lifecycle
//! ```text
//! Idle ──start()──► Executing ──Completion::complete()──► Finished
//!                       │
//!                       └──stop()──► Stopped
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                              |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------------|
//! | **Commands**      | Lifecycle state machine, signals, completion hooks.          | [`Command`], [`Behavior`], [`Completion`]       |
//! | **Leaves**        | Immediate, callback-defined and timer-driven work.           | [`Action`], [`Dynamic`], [`Delay`]              |
//! | **Composites**    | Sequence, parallel-all, parallel-any and single-child proxies.| [`Sequence`], [`Group`], [`Any`], [`Lazy`], [`Wrap`] |
//! | **Collection**    | Bag of top-level commands with an aggregate busy flag.       | [`CommandHeap`]                                 |
//! | **Timers**        | Pooled interval timers batched per phase and time scale.     | [`Timers`], [`TimerSpec`], [`TimerId`]          |
//! | **Subscriber API**| Observe timer and command events.                            | [`Subscribe`], [`SubscriberSet`], [`Event`]     |
//! | **Driver**        | Reference frame loop on tokio.                               | [`FrameLoop`], [`Config`]                       |
//! | **Errors**        | Typed timer contract violations.                             | [`TimerError`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Threading
//! Everything is single-threaded: handles are `Rc`-based and no interior borrow is
//! held while user callbacks run, so callbacks may freely start, stop, add or
//! release anything, including themselves.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use cmdtick::{Action, Delay, Group, Sequence, Timers, UpdatePhase};
//!
//! let timers = Timers::new();
//!
//! let intro = Sequence::new("intro");
//! intro
//!     .push(Delay::command(&timers, "fade", Duration::from_millis(30)))
//!     .push(
//!         Group::new("load")
//!             .with(Action::command("textures", || {}))
//!             .with(Delay::command(&timers, "sounds", Duration::from_millis(20))),
//!     );
//! intro.start();
//!
//! let dt = Duration::from_millis(10);
//! for _ in 0..10 {
//!     timers.update(UpdatePhase::Update, dt, dt);
//! }
//! assert!(intro.command().is_finished());
//! ```

mod commands;
mod config;
mod driver;
mod error;
mod events;
mod subscribers;
mod timers;

// ---- Public re-exports ----

pub use commands::{
    Action, AddMode, Any, Behavior, Command, CommandHeap, CommandId, CommandState, Completion,
    Delay, Dynamic, Group, Lazy, Sequence, Signal, SubscriptionId, Wrap,
};
pub use config::Config;
pub use driver::FrameLoop;
pub use error::TimerError;
pub use events::{Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use timers::{
    BucketKey, Loops, TimeScale, TimerId, TimerSpec, TimerState, Timers, UpdatePhase, WeakTimers,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

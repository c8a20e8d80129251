//! # Runtime events emitted by commands and timers.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Command lifecycle**: started, finished, stopped
//! - **Timer engine**: registration, rejection, stop, exhaustion, release, bucket sweeps
//!
//! The [`Event`] struct carries additional metadata such as timestamps, command
//! name, timer handle, bucket and loop counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Within one thread, `seq` order equals emission order.
//!
//! ## Example
//! ```rust
//! use cmdtick::{BucketKey, Event, EventKind, TimeScale, UpdatePhase};
//!
//! let ev = Event::new(EventKind::CommandFinished)
//!     .with_command("intro")
//!     .with_reason("done");
//!
//! assert_eq!(ev.kind, EventKind::CommandFinished);
//! assert_eq!(ev.command.as_deref(), Some("intro"));
//!
//! let swept = Event::new(EventKind::BucketSwept)
//!     .with_bucket(BucketKey::new(UpdatePhase::Update, TimeScale::Scaled))
//!     .with_swept(3);
//! assert_eq!(swept.swept, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::timers::{BucketKey, TimerId};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Command lifecycle ===
    /// Command transitioned Idle → Executing.
    ///
    /// Sets:
    /// - `command`: command name
    CommandStarted,

    /// Command reported completion.
    ///
    /// Sets:
    /// - `command`: command name
    CommandFinished,

    /// Command was aborted while executing.
    ///
    /// Sets:
    /// - `command`: command name
    CommandStopped,

    // === Timer engine ===
    /// Timer joined its bucket (pending until the next tick) or was re-activated in place.
    ///
    /// Sets:
    /// - `timer`, `bucket`
    TimerStarted,

    /// Bounded timer was refused at registration because its loops were spent.
    ///
    /// Sets:
    /// - `timer`, `bucket`
    /// - `loops`: completed loops
    /// - `reason`: error label
    TimerRejected,

    /// Timer was deactivated by its owner; removal is deferred to the next sweep.
    ///
    /// Sets:
    /// - `timer`, `bucket`
    TimerStopped,

    /// Bounded timer completed its last loop and deactivated itself.
    ///
    /// Sets:
    /// - `timer`, `bucket`
    /// - `loops`: completed loops
    TimerExhausted,

    /// Timer was returned to its pool.
    ///
    /// Sets:
    /// - `timer`, `bucket`
    TimerReleased,

    /// A cleanup pass evicted inactive timers from a bucket.
    ///
    /// Sets:
    /// - `bucket`
    /// - `swept`: number of evicted timers
    BucketSwept,

    /// A bucket's live list became empty; ticks are skipped until a timer is added.
    ///
    /// Sets:
    /// - `bucket`
    BucketDormant,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the command, if applicable.
    pub command: Option<Arc<str>>,
    /// Timer handle, if applicable.
    pub timer: Option<TimerId>,
    /// Bucket the timer belongs to.
    pub bucket: Option<BucketKey>,
    /// Completed loop count.
    pub loops: Option<u32>,
    /// Number of timers evicted by a sweep.
    pub swept: Option<u32>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            command: None,
            timer: None,
            bucket: None,
            loops: None,
            swept: None,
            reason: None,
        }
    }

    /// Attaches a command name.
    #[inline]
    pub fn with_command(mut self, command: impl Into<Arc<str>>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attaches a timer handle and its bucket.
    #[inline]
    pub fn with_timer(mut self, timer: TimerId, bucket: BucketKey) -> Self {
        self.timer = Some(timer);
        self.bucket = Some(bucket);
        self
    }

    /// Attaches a bucket.
    #[inline]
    pub fn with_bucket(mut self, bucket: BucketKey) -> Self {
        self.bucket = Some(bucket);
        self
    }

    /// Attaches a completed loop count.
    #[inline]
    pub fn with_loops(mut self, loops: u32) -> Self {
        self.loops = Some(loops);
        self
    }

    /// Attaches the number of timers evicted by a sweep.
    #[inline]
    pub fn with_swept(mut self, swept: u32) -> Self {
        self.swept = Some(swept);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn is_command_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::CommandStarted | EventKind::CommandFinished | EventKind::CommandStopped
        )
    }
}

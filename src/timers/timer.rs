//! # Interval timer data model.
//!
//! A timer counts elapsed time against an `interval` and fires its callback
//! once per completed loop. It belongs to exactly one bucket, chosen at
//! acquisition from the pool:
//!
//! ```text
//!            ┌──────────── BucketKey ────────────┐
//!            │  UpdatePhase × TimeScale          │
//!            │  {Update, FixedUpdate, LateUpdate}│
//!            │  × {Scaled, Unscaled}  = 6 buckets│
//!            └───────────────────────────────────┘
//! ```
//!
//! Handles ([`TimerId`]) are generational: releasing a timer bumps its slot's
//! generation, so a handle kept after release is detected as stale.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

pub(crate) type Callback = Rc<dyn Fn()>;

/// Handle to a pooled timer.
///
/// Copyable; valid until the timer is released back to the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.slot, self.generation)
    }
}

/// Loop budget of a timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Loops {
    /// Fires forever until stopped.
    #[default]
    Infinite,
    /// Fires `n` times, then deactivates itself.
    Times(u32),
}

impl Loops {
    /// True when a bounded budget is spent by `completed` loops.
    #[inline]
    pub fn is_exhausted(&self, completed: u32) -> bool {
        match *self {
            Loops::Infinite => false,
            Loops::Times(total) => completed >= total,
        }
    }

    /// Returns the bound, if any.
    #[inline]
    pub fn total(&self) -> Option<u32> {
        match *self {
            Loops::Infinite => None,
            Loops::Times(total) => Some(total),
        }
    }
}

/// Host update phase a timer is advanced in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdatePhase {
    /// Regular per-frame update.
    #[default]
    Update,
    /// Fixed-step simulation update.
    FixedUpdate,
    /// Late per-frame update, after `Update`.
    LateUpdate,
}

impl UpdatePhase {
    pub const ALL: [UpdatePhase; 3] = [
        UpdatePhase::Update,
        UpdatePhase::FixedUpdate,
        UpdatePhase::LateUpdate,
    ];
}

/// Clock a timer reads its delta from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeScale {
    /// Delta multiplied by the host's time scale.
    #[default]
    Scaled,
    /// Real elapsed time.
    Unscaled,
}

/// Bucket affinity: the (phase, scale) pair a timer is batched under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub phase: UpdatePhase,
    pub scale: TimeScale,
}

impl BucketKey {
    /// Number of distinct buckets.
    pub const COUNT: usize = 6;

    pub const fn new(phase: UpdatePhase, scale: TimeScale) -> Self {
        Self { phase, scale }
    }

    /// Dense index in `0..COUNT`.
    #[inline]
    pub(crate) fn index(&self) -> usize {
        let phase = match self.phase {
            UpdatePhase::Update => 0,
            UpdatePhase::FixedUpdate => 1,
            UpdatePhase::LateUpdate => 2,
        };
        let scale = match self.scale {
            TimeScale::Scaled => 0,
            TimeScale::Unscaled => 1,
        };
        phase * 2 + scale
    }

    /// All buckets, in index order.
    pub fn all() -> impl Iterator<Item = BucketKey> {
        UpdatePhase::ALL.into_iter().flat_map(|phase| {
            [TimeScale::Scaled, TimeScale::Unscaled]
                .into_iter()
                .map(move |scale| BucketKey::new(phase, scale))
        })
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.phase, self.scale)
    }
}

/// Configuration applied to a timer when it is acquired from the pool.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use cmdtick::{Loops, TimeScale, TimerSpec, UpdatePhase};
///
/// let spec = TimerSpec::new(Duration::from_millis(250), Loops::Times(4))
///     .with_phase(UpdatePhase::FixedUpdate)
///     .with_scale(TimeScale::Unscaled)
///     .with_multi_invoke(true);
///
/// assert_eq!(spec.bucket().phase, UpdatePhase::FixedUpdate);
/// assert!(spec.multi_invoke());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSpec {
    interval: Duration,
    loops: Loops,
    bucket: BucketKey,
    multi_invoke: bool,
}

impl TimerSpec {
    /// Creates a spec for the default bucket (`Update`, `Scaled`) with single-fire semantics.
    pub fn new(interval: Duration, loops: Loops) -> Self {
        Self {
            interval,
            loops,
            bucket: BucketKey::default(),
            multi_invoke: false,
        }
    }

    /// Fires once after `interval`.
    pub fn once(interval: Duration) -> Self {
        Self::new(interval, Loops::Times(1))
    }

    /// Fires every `interval` until stopped.
    pub fn repeating(interval: Duration) -> Self {
        Self::new(interval, Loops::Infinite)
    }

    /// Returns a new spec advanced in the given phase.
    pub fn with_phase(mut self, phase: UpdatePhase) -> Self {
        self.bucket.phase = phase;
        self
    }

    /// Returns a new spec reading the given clock.
    pub fn with_scale(mut self, scale: TimeScale) -> Self {
        self.bucket.scale = scale;
        self
    }

    /// Returns a new spec with catch-up (`true`) or single-fire (`false`) semantics.
    pub fn with_multi_invoke(mut self, multi_invoke: bool) -> Self {
        self.multi_invoke = multi_invoke;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn loops(&self) -> Loops {
        self.loops
    }

    pub fn bucket(&self) -> BucketKey {
        self.bucket
    }

    pub fn multi_invoke(&self) -> bool {
        self.multi_invoke
    }
}

/// Point-in-time view of a timer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimerState {
    pub interval: Duration,
    pub elapsed: Duration,
    pub loops: Loops,
    pub completed_loops: u32,
    pub bucket: BucketKey,
    pub active: bool,
    pub multi_invoke: bool,
}

impl TimerState {
    /// Progress through the current loop, `elapsed / interval`.
    ///
    /// A zero interval reports `1.0`.
    pub fn elapsed_ratio(&self) -> f64 {
        if self.interval.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f64() / self.interval.as_secs_f64()
        }
    }
}

/// Pooled timer storage.
pub(crate) struct Timer {
    pub(crate) bucket: BucketKey,
    pub(crate) interval: Duration,
    pub(crate) elapsed: Duration,
    pub(crate) loops: Loops,
    pub(crate) completed: u32,
    pub(crate) multi_invoke: bool,
    /// Participates in scheduling.
    pub(crate) active: bool,
    /// Present in its bucket's live or pending list.
    pub(crate) in_bucket: bool,
    /// Re-activated in place during a pass; skipped until the pass ends.
    pub(crate) fresh: bool,
    pub(crate) callback: Option<Callback>,
}

impl Timer {
    pub(crate) fn new(bucket: BucketKey) -> Self {
        Self {
            bucket,
            interval: Duration::from_secs(1),
            elapsed: Duration::ZERO,
            loops: Loops::Infinite,
            completed: 0,
            multi_invoke: false,
            active: false,
            in_bucket: false,
            fresh: false,
            callback: None,
        }
    }

    #[inline]
    pub(crate) fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.completed = 0;
    }

    pub(crate) fn configure(&mut self, spec: &TimerSpec, callback: Callback) {
        debug_assert_eq!(self.bucket, spec.bucket);
        self.interval = spec.interval;
        self.loops = spec.loops;
        self.multi_invoke = spec.multi_invoke;
        self.callback = Some(callback);
    }

    #[inline]
    pub(crate) fn is_exhausted(&self) -> bool {
        self.loops.is_exhausted(self.completed)
    }

    pub(crate) fn state(&self) -> TimerState {
        TimerState {
            interval: self.interval,
            elapsed: self.elapsed,
            loops: self.loops,
            completed_loops: self.completed,
            bucket: self.bucket,
            active: self.active,
            multi_invoke: self.multi_invoke,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_indices_are_dense_and_unique() {
        let mut seen: Vec<usize> = BucketKey::all().map(|k| k.index()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..BucketKey::COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn test_loops_exhaustion() {
        assert!(!Loops::Infinite.is_exhausted(u32::MAX));
        assert!(!Loops::Times(3).is_exhausted(2));
        assert!(Loops::Times(3).is_exhausted(3));
        assert!(Loops::Times(0).is_exhausted(0));
    }

    #[test]
    fn test_elapsed_ratio() {
        let mut timer = Timer::new(BucketKey::default());
        timer.interval = Duration::from_secs(2);
        timer.elapsed = Duration::from_millis(500);
        assert_eq!(timer.state().elapsed_ratio(), 0.25);

        timer.interval = Duration::ZERO;
        assert_eq!(timer.state().elapsed_ratio(), 1.0);
    }
}

//! # Timers: pooled interval timers batched per bucket.
//!
//! [`Timers`] owns the timer pool and the six buckets. The host calls
//! [`Timers::tick`] (or [`Timers::update`]) once per tick per bucket with the
//! elapsed delta; everything else happens inside those calls.
//!
//! ## Tick algorithm
//! ```text
//! tick(bucket, dt)
//!   ├─► dormant? ─► return
//!   ├─► live = take(bucket.live)                 (snapshot, immutable for the pass)
//!   ├─► for slot in live:
//!   │     ├─ inactive            ─► mark removal, skip
//!   │     ├─ fresh (re-activated this pass) ─► skip
//!   │     ├─ elapsed += dt
//!   │     ├─ elapsed < interval  ─► next
//!   │     ├─ single-fire: elapsed -= max(dt, interval); loops += 1; callback()
//!   │     ├─ catch-up:    while elapsed >= interval && budget left:
//!   │     │                 elapsed -= interval; loops += 1; callback()
//!   │     └─ budget spent        ─► deactivate, mark removal, TimerExhausted
//!   ├─► bucket.live = live; merge pending        (timers added mid-pass run next tick)
//!   └─► removal marked ─► sweep inactive ─► empty? ─► dormant
//! ```
//!
//! ## Rules
//! - No `RefCell` borrow is held while a callback or subscriber runs, so callbacks may
//!   acquire, start, stop and release timers (including their own).
//! - A timer stopped or released by a callback receives no further callbacks in the pass.
//! - Nested `tick` calls for a bucket already being ticked are ignored.
//!
//! ## Example
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use cmdtick::{BucketKey, TimerSpec, Timers};
//!
//! let timers = Timers::default();
//! let fired = Rc::new(Cell::new(0));
//!
//! let counter = fired.clone();
//! let id = timers.acquire(TimerSpec::repeating(Duration::from_secs(1)), move || {
//!     counter.set(counter.get() + 1);
//! });
//! timers.start(id).unwrap();
//!
//! let bucket = BucketKey::default();
//! timers.tick(bucket, Duration::from_secs(5)); // registration becomes visible
//! timers.tick(bucket, Duration::from_millis(1500));
//! assert_eq!(fired.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::config::Config;
use crate::error::TimerError;
use crate::events::{Event, EventKind};
use crate::subscribers::SubscriberSet;

use super::bucket::Bucket;
use super::pool::Pool;
use super::timer::{BucketKey, Loops, TimeScale, TimerSpec, TimerState, UpdatePhase};
use super::TimerId;

struct Inner {
    pool: RefCell<Pool>,
    buckets: RefCell<[Bucket; BucketKey::COUNT]>,
    subscribers: SubscriberSet,
}

/// Shared handle to the timer pool and its batch scheduler.
///
/// Cheap to clone; all clones refer to the same timers. Not `Send`: the
/// engine is driven from a single thread.
#[derive(Clone)]
pub struct Timers {
    inner: Rc<Inner>,
}

/// Non-owning handle to [`Timers`], for callbacks that must not keep the engine alive.
#[derive(Clone)]
pub struct WeakTimers {
    inner: Weak<Inner>,
}

impl WeakTimers {
    pub fn upgrade(&self) -> Option<Timers> {
        self.inner.upgrade().map(|inner| Timers { inner })
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::with_config(&Config::default(), SubscriberSet::default())
    }
}

impl fmt::Debug for Timers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buckets = self.inner.buckets.borrow();
        f.debug_struct("Timers")
            .field(
                "live",
                &buckets.iter().map(|b| b.live.len()).collect::<Vec<_>>(),
            )
            .field("subscribers", &self.inner.subscribers)
            .finish()
    }
}

impl Timers {
    /// Creates an engine with default configuration and no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine whose pools are pre-warmed per `cfg.prewarm` and which
    /// publishes timer events to `subscribers`.
    pub fn with_config(cfg: &Config, subscribers: SubscriberSet) -> Self {
        Self {
            inner: Rc::new(Inner {
                pool: RefCell::new(Pool::with_prewarm(cfg.prewarm)),
                buckets: RefCell::new(Default::default()),
                subscribers,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakTimers {
        WeakTimers {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ---------------------------
    // Pool
    // ---------------------------

    /// Takes a timer from the pool of `spec.bucket()`, resets its counters and
    /// configures it. The timer is inactive until [`start`](Self::start).
    pub fn acquire(&self, spec: TimerSpec, callback: impl Fn() + 'static) -> TimerId {
        let id = self.inner.pool.borrow_mut().acquire(&spec, Rc::new(callback));
        tracing::trace!(timer = %id, bucket = %spec.bucket(), "timer acquired");
        id
    }

    /// Stops the timer and returns it to its pool. The handle becomes stale.
    pub fn release(&self, id: TimerId) -> Result<(), TimerError> {
        self.stop(id)?;
        let key = self.inner.pool.borrow_mut().release(id)?;
        tracing::trace!(timer = %id, bucket = %key, "timer released");
        self.publish(Event::new(EventKind::TimerReleased).with_timer(id, key));
        Ok(())
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Activates the timer and registers it with its bucket.
    ///
    /// - Already active: no-op.
    /// - Bounded timer with its loops spent: rejected with [`TimerError::Exhausted`].
    /// - Still present in the bucket (stopped or released before the last sweep):
    ///   re-activated in place, keeping its position. During a tick of that bucket
    ///   it is skipped for the rest of the pass.
    /// - Otherwise queued; first advanced on the bucket's next tick.
    pub fn start(&self, id: TimerId) -> Result<(), TimerError> {
        let key = {
            let mut pool = self.inner.pool.borrow_mut();
            let timer = pool.get_mut(id)?;
            if timer.active {
                return Ok(());
            }
            if let Loops::Times(total) = timer.loops {
                if timer.completed >= total {
                    let err = TimerError::Exhausted {
                        id,
                        completed: timer.completed,
                        total,
                    };
                    let (key, completed) = (timer.bucket, timer.completed);
                    drop(pool);
                    tracing::debug!(timer = %id, bucket = %key, "{}", err.as_message());
                    self.publish(
                        Event::new(EventKind::TimerRejected)
                            .with_timer(id, key)
                            .with_loops(completed)
                            .with_reason(err.as_label()),
                    );
                    return Err(err);
                }
            }

            timer.active = true;
            let key = timer.bucket;
            let mut buckets = self.inner.buckets.borrow_mut();
            let bucket = &mut buckets[key.index()];
            if !timer.in_bucket {
                timer.in_bucket = true;
                bucket.register(id.slot);
            } else if bucket.ticking && !timer.fresh {
                timer.fresh = true;
                bucket.refresh(id.slot);
            }
            key
        };
        tracing::trace!(timer = %id, bucket = %key, "timer started");
        self.publish(Event::new(EventKind::TimerStarted).with_timer(id, key));
        Ok(())
    }

    /// Deactivates the timer. Its removal from the bucket is deferred to the next sweep.
    pub fn stop(&self, id: TimerId) -> Result<(), TimerError> {
        let key = {
            let mut pool = self.inner.pool.borrow_mut();
            let timer = pool.get_mut(id)?;
            if !timer.active {
                return Ok(());
            }
            timer.active = false;
            let key = timer.bucket;
            if timer.in_bucket {
                self.inner.buckets.borrow_mut()[key.index()].schedule_removal();
            }
            key
        };
        tracing::trace!(timer = %id, bucket = %key, "timer stopped");
        self.publish(Event::new(EventKind::TimerStopped).with_timer(id, key));
        Ok(())
    }

    /// Clears elapsed time and completed loops.
    pub fn reset(&self, id: TimerId) -> Result<(), TimerError> {
        self.inner.pool.borrow_mut().get_mut(id)?.reset();
        Ok(())
    }

    // ---------------------------
    // Configuration
    // ---------------------------

    pub fn set_interval(&self, id: TimerId, interval: Duration) -> Result<(), TimerError> {
        self.inner.pool.borrow_mut().get_mut(id)?.interval = interval;
        Ok(())
    }

    pub fn set_loops(&self, id: TimerId, loops: Loops) -> Result<(), TimerError> {
        self.inner.pool.borrow_mut().get_mut(id)?.loops = loops;
        Ok(())
    }

    pub fn set_multi_invoke(&self, id: TimerId, multi_invoke: bool) -> Result<(), TimerError> {
        self.inner.pool.borrow_mut().get_mut(id)?.multi_invoke = multi_invoke;
        Ok(())
    }

    pub fn set_callback(
        &self,
        id: TimerId,
        callback: impl Fn() + 'static,
    ) -> Result<(), TimerError> {
        self.inner.pool.borrow_mut().get_mut(id)?.callback = Some(Rc::new(callback));
        Ok(())
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    /// Returns a snapshot of the timer.
    pub fn state(&self, id: TimerId) -> Result<TimerState, TimerError> {
        self.inner.pool.borrow().get(id).map(|t| t.state())
    }

    /// True if the handle is live and the timer participates in scheduling.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.inner
            .pool
            .borrow()
            .get(id)
            .map(|t| t.active)
            .unwrap_or(false)
    }

    /// Number of timers in the bucket's live list (pending registrations excluded).
    pub fn live_len(&self, key: BucketKey) -> usize {
        self.inner.buckets.borrow()[key.index()].live.len()
    }

    /// Number of registrations waiting for the bucket's next merge.
    pub fn pending_len(&self, key: BucketKey) -> usize {
        self.inner.buckets.borrow()[key.index()].pending.len()
    }

    /// True if ticks of this bucket are currently skipped.
    pub fn is_dormant(&self, key: BucketKey) -> bool {
        self.inner.buckets.borrow()[key.index()].is_dormant()
    }

    /// Number of released timers ready for reuse in the bucket's pool.
    pub fn idle_len(&self, key: BucketKey) -> usize {
        self.inner.pool.borrow().idle(key)
    }

    // ---------------------------
    // Ticking
    // ---------------------------

    /// Ticks both time-scale buckets of a phase, scaled first.
    pub fn update(&self, phase: UpdatePhase, scaled: Duration, unscaled: Duration) {
        self.tick(BucketKey::new(phase, TimeScale::Scaled), scaled);
        self.tick(BucketKey::new(phase, TimeScale::Unscaled), unscaled);
    }

    /// Advances every live timer of `key` by `dt`, then merges pending
    /// registrations and sweeps inactive timers if needed.
    pub fn tick(&self, key: BucketKey, dt: Duration) {
        let live = {
            let mut buckets = self.inner.buckets.borrow_mut();
            let bucket = &mut buckets[key.index()];
            if bucket.is_dormant() {
                return;
            }
            if bucket.ticking {
                tracing::debug!(bucket = %key, "nested tick ignored");
                return;
            }
            bucket.ticking = true;
            std::mem::take(&mut bucket.live)
        };

        let mut removal = false;
        for &slot in &live {
            removal |= self.advance(slot, dt);
        }

        let (swept, dormant) = {
            let mut buckets = self.inner.buckets.borrow_mut();
            let mut pool = self.inner.pool.borrow_mut();
            let bucket = &mut buckets[key.index()];
            bucket.live = live;
            bucket.ticking = false;
            bucket.merge_pending(&mut pool);
            if removal {
                bucket.schedule_removal();
            }
            if bucket.removal_scheduled {
                (bucket.sweep(&mut pool), bucket.is_dormant())
            } else {
                (0, false)
            }
        };

        if swept > 0 {
            tracing::trace!(bucket = %key, swept, "bucket swept");
            self.publish(
                Event::new(EventKind::BucketSwept)
                    .with_bucket(key)
                    .with_swept(swept),
            );
        }
        if dormant {
            tracing::trace!(bucket = %key, "bucket dormant");
            self.publish(Event::new(EventKind::BucketDormant).with_bucket(key));
        }
    }

    /// Advances one slot. Returns `true` if the bucket needs a removal pass.
    fn advance(&self, slot: u32, dt: Duration) -> bool {
        let (generation, catch_up, first) = {
            let mut pool = self.inner.pool.borrow_mut();
            let entry = pool.slot_mut(slot);
            let timer = &mut entry.timer;
            if !timer.active {
                return true;
            }
            if timer.fresh {
                return false;
            }
            timer.elapsed = timer.elapsed.saturating_add(dt);
            if timer.elapsed < timer.interval {
                return false;
            }

            let catch_up = timer.multi_invoke && !timer.interval.is_zero();
            let first = if catch_up {
                None
            } else {
                let step = dt.max(timer.interval);
                timer.elapsed = timer.elapsed.saturating_sub(step);
                timer.completed = timer.completed.saturating_add(1);
                timer.callback.clone()
            };
            (entry.generation, catch_up, first)
        };

        if let Some(callback) = first {
            callback();
        }

        if catch_up {
            loop {
                let callback = {
                    let mut pool = self.inner.pool.borrow_mut();
                    let entry = pool.slot_mut(slot);
                    if entry.generation != generation || !entry.timer.active {
                        break;
                    }
                    let timer = &mut entry.timer;
                    if timer.interval.is_zero()
                        || timer.elapsed < timer.interval
                        || timer.is_exhausted()
                    {
                        break;
                    }
                    timer.elapsed -= timer.interval;
                    timer.completed = timer.completed.saturating_add(1);
                    timer.callback.clone()
                };
                if let Some(callback) = callback {
                    callback();
                }
            }
        }

        self.settle(slot, generation)
    }

    /// Deactivates a timer whose loop budget is spent. Returns `true` if the
    /// bucket needs a removal pass.
    fn settle(&self, slot: u32, generation: u32) -> bool {
        let exhausted = {
            let mut pool = self.inner.pool.borrow_mut();
            let entry = pool.slot_mut(slot);
            if entry.generation != generation || !entry.timer.active {
                return true;
            }
            if !entry.timer.is_exhausted() {
                return false;
            }
            entry.timer.active = false;
            (
                TimerId { slot, generation },
                entry.timer.bucket,
                entry.timer.completed,
            )
        };

        let (id, key, loops) = exhausted;
        tracing::trace!(timer = %id, bucket = %key, loops, "timer exhausted");
        self.publish(
            Event::new(EventKind::TimerExhausted)
                .with_timer(id, key)
                .with_loops(loops),
        );
        true
    }

    fn publish(&self, event: Event) {
        if !self.inner.subscribers.is_empty() {
            self.inner.subscribers.emit(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::Subscribe;
    use std::cell::{Cell, RefCell};

    const BUCKET: BucketKey = BucketKey::new(UpdatePhase::Update, TimeScale::Scaled);

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    /// Starts a timer and runs an empty tick so it joins the live list.
    fn started(timers: &Timers, spec: TimerSpec, f: impl Fn() + 'static) -> TimerId {
        let id = timers.acquire(spec, f);
        timers.start(id).unwrap();
        timers.tick(spec.bucket(), Duration::ZERO);
        assert_eq!(timers.state(id).unwrap().elapsed, Duration::ZERO);
        id
    }

    #[test]
    fn test_single_fire_coalesces_to_one_loop() {
        let timers = Timers::default();
        let (count, f) = counter();
        let id = started(&timers, TimerSpec::repeating(secs(1.0)), f);

        timers.tick(BUCKET, secs(2.5));

        let state = timers.state(id).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(state.completed_loops, 1);
        // 2.5 - max(2.5, 1.0)
        assert_eq!(state.elapsed, Duration::ZERO);
    }

    #[test]
    fn test_single_fire_subtracts_interval_when_dt_is_small() {
        let timers = Timers::default();
        let (count, f) = counter();
        let id = started(&timers, TimerSpec::repeating(secs(1.0)), f);

        timers.tick(BUCKET, secs(0.75));
        assert_eq!(count.get(), 0);
        timers.tick(BUCKET, secs(0.5));

        assert_eq!(count.get(), 1);
        assert_eq!(timers.state(id).unwrap().elapsed, secs(0.25));
    }

    #[test]
    fn test_catch_up_fires_once_per_interval() {
        let timers = Timers::default();
        let (count, f) = counter();
        let spec = TimerSpec::repeating(secs(1.0)).with_multi_invoke(true);
        let id = started(&timers, spec, f);

        timers.tick(BUCKET, secs(2.5));

        let state = timers.state(id).unwrap();
        assert_eq!(count.get(), 2);
        assert_eq!(state.completed_loops, 2);
        assert_eq!(state.elapsed, secs(0.5));
    }

    #[test]
    fn test_catch_up_respects_loop_budget() {
        let timers = Timers::default();
        let (count, f) = counter();
        let spec = TimerSpec::new(secs(1.0), Loops::Times(2)).with_multi_invoke(true);
        let id = started(&timers, spec, f);

        timers.tick(BUCKET, secs(5.0));

        assert_eq!(count.get(), 2);
        assert!(!timers.is_active(id));
        assert_eq!(timers.live_len(BUCKET), 0);
        assert!(timers.is_dormant(BUCKET));
    }

    #[test]
    fn test_bounded_timer_deactivates_and_is_evicted() {
        let timers = Timers::default();
        let (count, f) = counter();
        let id = started(&timers, TimerSpec::new(secs(1.0), Loops::Times(3)), f);

        timers.tick(BUCKET, secs(1.0));
        timers.tick(BUCKET, secs(1.0));
        assert!(timers.is_active(id));
        timers.tick(BUCKET, secs(1.0));

        assert_eq!(count.get(), 3);
        assert!(!timers.is_active(id));
        assert_eq!(timers.live_len(BUCKET), 0);

        timers.tick(BUCKET, secs(1.0));
        assert_eq!(count.get(), 3);
        assert_eq!(timers.state(id).unwrap().completed_loops, 3);
    }

    #[test]
    fn test_exhausted_timer_is_rejected_at_registration() {
        let timers = Timers::default();
        let (count, f) = counter();
        let id = started(&timers, TimerSpec::once(secs(1.0)), f);
        timers.tick(BUCKET, secs(1.0));
        assert_eq!(count.get(), 1);

        let err = timers.start(id).unwrap_err();
        assert_eq!(
            err,
            TimerError::Exhausted {
                id,
                completed: 1,
                total: 1
            }
        );
        assert!(!timers.is_active(id));
        assert_eq!(timers.pending_len(BUCKET), 0);

        let zero = timers.acquire(TimerSpec::new(secs(1.0), Loops::Times(0)), || {});
        assert!(matches!(
            timers.start(zero),
            Err(TimerError::Exhausted { total: 0, .. })
        ));
    }

    #[test]
    fn test_reset_allows_restart_after_exhaustion() {
        let timers = Timers::default();
        let (count, f) = counter();
        let id = started(&timers, TimerSpec::once(secs(1.0)), f);
        timers.tick(BUCKET, secs(1.0));

        timers.reset(id).unwrap();
        timers.start(id).unwrap();
        timers.tick(BUCKET, Duration::ZERO);
        timers.tick(BUCKET, secs(1.0));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_timer_added_mid_tick_waits_for_next_tick() {
        let timers = Timers::default();
        let (late_count, late_f) = counter();
        let late_f = Rc::new(late_f);
        let late_id: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));

        let handle = timers.clone();
        let slot = late_id.clone();
        started(&timers, TimerSpec::once(secs(1.0)), move || {
            let f = late_f.clone();
            let id = handle.acquire(TimerSpec::repeating(secs(0.5)), move || f());
            handle.start(id).unwrap();
            slot.set(Some(id));
        });

        timers.tick(BUCKET, secs(1.0));
        let id = late_id.get().unwrap();
        assert_eq!(late_count.get(), 0);
        assert_eq!(timers.state(id).unwrap().elapsed, Duration::ZERO);
        assert_eq!(timers.live_len(BUCKET), 1);

        timers.tick(BUCKET, secs(0.5));
        assert_eq!(late_count.get(), 1);
    }

    #[test]
    fn test_reused_slot_started_mid_tick_waits_for_next_tick() {
        let timers = Timers::default();
        let (late_count, late_f) = counter();
        let late_f = Rc::new(late_f);
        let late_id: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));

        let handle = timers.clone();
        let slot = late_id.clone();
        started(&timers, TimerSpec::once(secs(1.0)), move || {
            let f = late_f.clone();
            let id = handle.acquire(TimerSpec::repeating(secs(0.5)), move || f());
            handle.start(id).unwrap();
            slot.set(Some(id));
        });
        let gone = started(&timers, TimerSpec::repeating(secs(1.0)), || {});
        timers.release(gone).unwrap();
        assert_eq!(timers.live_len(BUCKET), 2);

        timers.tick(BUCKET, secs(1.0));
        let id = late_id.get().unwrap();
        assert_eq!(id.slot, gone.slot);
        assert_eq!(late_count.get(), 0);
        let state = timers.state(id).unwrap();
        assert_eq!(state.elapsed, Duration::ZERO);
        assert_eq!(state.completed_loops, 0);
        assert!(state.active);

        timers.tick(BUCKET, secs(0.5));
        assert_eq!(late_count.get(), 1);
    }

    #[test]
    fn test_stop_skips_accumulation_and_defers_removal() {
        let timers = Timers::default();
        let (count, f) = counter();
        let (other_count, g) = counter();
        let a = started(&timers, TimerSpec::repeating(secs(1.0)), f);
        let _b = started(&timers, TimerSpec::repeating(secs(1.0)), g);
        assert_eq!(timers.live_len(BUCKET), 2);

        timers.stop(a).unwrap();
        assert_eq!(timers.live_len(BUCKET), 2);

        timers.tick(BUCKET, secs(1.0));
        assert_eq!(count.get(), 0);
        assert_eq!(other_count.get(), 1);
        assert_eq!(timers.live_len(BUCKET), 1);
        assert_eq!(timers.state(a).unwrap().elapsed, Duration::ZERO);
    }

    #[test]
    fn test_callback_stopping_itself_halts_catch_up() {
        let timers = Timers::default();
        let (count, f) = counter();
        let own: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));

        let handle = timers.clone();
        let slot = own.clone();
        let spec = TimerSpec::repeating(secs(1.0)).with_multi_invoke(true);
        let id = started(&timers, spec, move || {
            f();
            if let Some(id) = slot.get() {
                handle.stop(id).unwrap();
            }
        });
        own.set(Some(id));

        timers.tick(BUCKET, secs(5.0));
        assert_eq!(count.get(), 1);
        assert_eq!(timers.live_len(BUCKET), 0);
    }

    #[test]
    fn test_release_in_own_callback() {
        let timers = Timers::default();
        let (count, f) = counter();
        let own: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));

        let handle = timers.clone();
        let slot = own.clone();
        let id = started(&timers, TimerSpec::repeating(secs(1.0)), move || {
            f();
            if let Some(id) = slot.get() {
                handle.release(id).unwrap();
            }
        });
        own.set(Some(id));

        timers.tick(BUCKET, secs(1.0));
        assert_eq!(count.get(), 1);
        assert_eq!(timers.state(id), Err(TimerError::Released { id }));
        assert_eq!(timers.live_len(BUCKET), 0);
        assert_eq!(timers.idle_len(BUCKET), 1);
        assert!(timers.is_dormant(BUCKET));
    }

    #[test]
    fn test_reacquired_before_sweep_keeps_its_place() {
        let timers = Timers::default();
        let first = started(&timers, TimerSpec::repeating(secs(1.0)), || {});
        timers.release(first).unwrap();

        let (count, f) = counter();
        let second = timers.acquire(TimerSpec::repeating(secs(1.0)), f);
        assert_eq!(second.slot, first.slot);
        timers.start(second).unwrap();
        assert_eq!(timers.pending_len(BUCKET), 0);
        assert_eq!(timers.live_len(BUCKET), 1);

        timers.tick(BUCKET, secs(1.0));
        assert_eq!(count.get(), 1);
        assert_eq!(timers.live_len(BUCKET), 1);
    }

    #[test]
    fn test_callbacks_fire_in_registration_order() {
        let timers = Timers::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let order = order.clone();
            let id = timers.acquire(TimerSpec::once(secs(1.0)), move || {
                order.borrow_mut().push(tag)
            });
            timers.start(id).unwrap();
        }
        timers.tick(BUCKET, Duration::ZERO);
        timers.tick(BUCKET, secs(1.0));
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_buckets_are_independent() {
        let timers = Timers::default();
        let (scaled, f) = counter();
        let (unscaled, g) = counter();
        started(&timers, TimerSpec::repeating(secs(1.0)), f);
        started(
            &timers,
            TimerSpec::repeating(secs(1.0)).with_scale(TimeScale::Unscaled),
            g,
        );

        timers.update(UpdatePhase::Update, Duration::ZERO, secs(1.0));
        assert_eq!((scaled.get(), unscaled.get()), (0, 1));

        timers.tick(
            BucketKey::new(UpdatePhase::LateUpdate, TimeScale::Scaled),
            secs(10.0),
        );
        assert_eq!(scaled.get(), 0);
    }

    #[test]
    fn test_zero_interval_catch_up_fires_once_per_tick() {
        let timers = Timers::default();
        let (count, f) = counter();
        let spec = TimerSpec::repeating(Duration::ZERO).with_multi_invoke(true);
        started(&timers, spec, f);

        timers.tick(BUCKET, secs(1.0));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_stale_handle_operations_fail() {
        let timers = Timers::default();
        let id = timers.acquire(TimerSpec::once(secs(1.0)), || {});
        timers.release(id).unwrap();

        assert_eq!(timers.start(id), Err(TimerError::Released { id }));
        assert_eq!(timers.stop(id), Err(TimerError::Released { id }));
        assert_eq!(timers.set_interval(id, secs(2.0)), Err(TimerError::Released { id }));
        assert!(!timers.is_active(id));
    }

    #[test]
    fn test_dormant_bucket_wakes_on_registration() {
        let timers = Timers::default();
        assert!(timers.is_dormant(BUCKET));

        let id = timers.acquire(TimerSpec::once(secs(1.0)), || {});
        timers.start(id).unwrap();
        assert!(!timers.is_dormant(BUCKET));
        assert_eq!(timers.pending_len(BUCKET), 1);
    }

    #[derive(Default)]
    struct Kinds(RefCell<Vec<EventKind>>);

    impl Subscribe for Rc<Kinds> {
        fn on_event(&self, event: &Event) {
            self.0.borrow_mut().push(event.kind);
        }
    }

    #[test]
    fn test_events_published_for_timer_lifecycle() {
        let kinds = Rc::new(Kinds::default());
        let subs = SubscriberSet::new(vec![Rc::new(kinds.clone()) as Rc<dyn Subscribe>]);
        let timers = Timers::with_config(&Config::default(), subs);

        let id = timers.acquire(TimerSpec::once(secs(1.0)), || {});
        timers.start(id).unwrap();
        timers.tick(BUCKET, Duration::ZERO);
        timers.tick(BUCKET, secs(1.0));
        let _ = timers.start(id);
        timers.release(id).unwrap();

        assert_eq!(
            *kinds.0.borrow(),
            vec![
                EventKind::TimerStarted,
                EventKind::TimerExhausted,
                EventKind::BucketSwept,
                EventKind::BucketDormant,
                EventKind::TimerRejected,
                EventKind::TimerReleased,
            ]
        );
    }
}

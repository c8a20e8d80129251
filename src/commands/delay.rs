//! Leaf command that finishes after a timer interval.
//!
//! The timer is acquired on start and released when it fires or when the command
//! is stopped, so an idle `Delay` holds no pool slot.

use std::borrow::Cow;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::timers::{TimeScale, TimerId, TimerSpec, Timers, UpdatePhase};

use super::command::{Behavior, Command, Completion};

/// Waits one interval on a timer bucket, then completes.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use cmdtick::{Delay, TimeScale, Timers, UpdatePhase};
///
/// let timers = Timers::new();
/// let wait = Delay::command(&timers, "wait", Duration::from_millis(100));
/// wait.start();
///
/// let dt = Duration::from_millis(60);
/// timers.update(UpdatePhase::Update, dt, dt); // registration lands
/// timers.update(UpdatePhase::Update, dt, dt);
/// assert!(wait.is_executing());
/// timers.update(UpdatePhase::Update, dt, dt);
/// assert!(wait.is_finished());
/// ```
pub struct Delay {
    timers: Timers,
    spec: TimerSpec,
    timer: Rc<Cell<Option<TimerId>>>,
}

impl Delay {
    /// Delay on the scaled `Update` bucket.
    pub fn new(timers: &Timers, interval: Duration) -> Self {
        Self {
            timers: timers.clone(),
            spec: TimerSpec::once(interval),
            timer: Rc::new(Cell::new(None)),
        }
    }

    #[must_use]
    pub fn with_phase(mut self, phase: UpdatePhase) -> Self {
        self.spec = self.spec.with_phase(phase);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: TimeScale) -> Self {
        self.spec = self.spec.with_scale(scale);
        self
    }

    pub fn command(
        timers: &Timers,
        name: impl Into<Cow<'static, str>>,
        interval: Duration,
    ) -> Command {
        Command::new(name, Self::new(timers, interval))
    }

    pub fn into_command(self, name: impl Into<Cow<'static, str>>) -> Command {
        Command::new(name, self)
    }

    pub fn interval(&self) -> Duration {
        self.spec.interval()
    }

    fn release(&self) {
        if let Some(id) = self.timer.take() {
            if let Err(err) = self.timers.release(id) {
                tracing::debug!(timer = %id, "delay timer already gone: {}", err.as_message());
            }
        }
    }
}

impl Behavior for Delay {
    fn on_start(&self, done: Completion) {
        let weak = self.timers.downgrade();
        let slot = Rc::clone(&self.timer);
        let id = self.timers.acquire(self.spec, move || {
            if let (Some(timers), Some(id)) = (weak.upgrade(), slot.take()) {
                if let Err(err) = timers.release(id) {
                    tracing::debug!(timer = %id, "delay timer already gone: {}", err.as_message());
                }
            }
            done.complete();
        });
        self.timer.set(Some(id));

        if let Err(err) = self.timers.start(id) {
            tracing::warn!(timer = %id, "delay timer rejected: {}", err.as_message());
            self.release();
        }
    }

    fn on_stop(&self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Sequence;
    use crate::timers::BucketKey;

    const FRAME: Duration = Duration::from_millis(50);

    fn frame(timers: &Timers) {
        timers.update(UpdatePhase::Update, FRAME, FRAME);
    }

    #[test]
    fn test_finishes_after_interval_and_releases() {
        let timers = Timers::new();
        let key = BucketKey::new(UpdatePhase::Update, TimeScale::Scaled);
        let wait = Delay::command(&timers, "wait", Duration::from_millis(100));

        assert_eq!(timers.idle_len(key), 0);
        wait.start();
        frame(&timers); // registers
        frame(&timers);
        assert!(wait.is_executing());
        frame(&timers);
        assert!(wait.is_finished());
        assert_eq!(timers.idle_len(key), 1);
    }

    #[test]
    fn test_stop_releases_timer_without_finishing() {
        let timers = Timers::new();
        let key = BucketKey::new(UpdatePhase::Update, TimeScale::Scaled);
        let wait = Delay::command(&timers, "wait", Duration::from_millis(100));

        wait.start();
        frame(&timers);
        wait.stop();
        assert_eq!(timers.idle_len(key), 1);
        for _ in 0..5 {
            frame(&timers);
        }
        assert!(wait.is_stopped());
    }

    #[test]
    fn test_unscaled_delay_ignores_scaled_delta() {
        let timers = Timers::new();
        let wait = Delay::new(&timers, Duration::from_millis(100))
            .with_scale(TimeScale::Unscaled)
            .into_command("real-time");
        wait.start();
        for _ in 0..10 {
            timers.update(UpdatePhase::Update, Duration::ZERO, FRAME);
        }
        assert!(wait.is_finished());
    }

    #[test]
    fn test_late_update_delay_needs_late_phase() {
        let timers = Timers::new();
        let wait = Delay::new(&timers, FRAME)
            .with_phase(UpdatePhase::LateUpdate)
            .into_command("late");
        wait.start();
        for _ in 0..4 {
            frame(&timers);
        }
        assert!(wait.is_executing());
        timers.update(UpdatePhase::LateUpdate, FRAME, FRAME);
        timers.update(UpdatePhase::LateUpdate, FRAME, FRAME);
        assert!(wait.is_finished());
    }

    #[test]
    fn test_delays_in_sequence_reuse_slot() {
        let timers = Timers::new();
        let key = BucketKey::new(UpdatePhase::Update, TimeScale::Scaled);
        let seq = Sequence::new("two-waits");
        seq.push(Delay::command(&timers, "a", FRAME))
            .push(Delay::command(&timers, "b", FRAME));
        seq.start();

        for _ in 0..6 {
            frame(&timers);
        }
        assert!(seq.command().is_finished());
        assert_eq!(timers.idle_len(key), 1);
    }
}

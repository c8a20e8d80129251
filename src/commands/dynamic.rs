//! Leaf command with a caller-supplied start routine and optional teardown.

use std::borrow::Cow;
use std::cell::RefCell;

use super::command::{Behavior, Command, Completion};

type StartFn = Box<dyn FnOnce(Completion)>;
type StopFn = Box<dyn FnOnce()>;

/// Leaf whose start routine receives the [`Completion`] and decides when to finish.
///
/// Without a start routine the command finishes immediately. The stop routine runs
/// at most once, only if the command is stopped while executing.
///
/// # Example
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use cmdtick::Dynamic;
///
/// let parked = Rc::new(RefCell::new(None));
/// let p = parked.clone();
/// let cmd = Dynamic::new()
///     .with_start(move |done| *p.borrow_mut() = Some(done))
///     .command("wait-for-input");
///
/// cmd.start();
/// assert!(cmd.is_executing());
///
/// if let Some(done) = parked.borrow_mut().take() {
///     done.complete();
/// }
/// assert!(cmd.is_finished());
/// ```
#[derive(Default)]
pub struct Dynamic {
    start: RefCell<Option<StartFn>>,
    stop: RefCell<Option<StopFn>>,
}

impl Dynamic {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_start(self, f: impl FnOnce(Completion) + 'static) -> Self {
        *self.start.borrow_mut() = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn with_stop(self, f: impl FnOnce() + 'static) -> Self {
        *self.stop.borrow_mut() = Some(Box::new(f));
        self
    }

    pub fn command(self, name: impl Into<Cow<'static, str>>) -> Command {
        Command::new(name, self)
    }
}

impl Behavior for Dynamic {
    fn on_start(&self, done: Completion) {
        let start = self.start.borrow_mut().take();
        match start {
            Some(start) => start(done),
            None => done.complete(),
        }
    }

    fn on_stop(&self) {
        let stop = self.stop.borrow_mut().take();
        if let Some(stop) = stop {
            stop();
        }
    }
}

//! Leaf command running a one-shot closure and finishing synchronously.

use std::borrow::Cow;
use std::cell::RefCell;

use super::command::{Behavior, Command, Completion};

type Job = Box<dyn FnOnce()>;

/// Runs its closure once on start, then completes in the same call.
///
/// # Example
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use cmdtick::Action;
///
/// let hits = Rc::new(Cell::new(0));
/// let h = hits.clone();
/// let cmd = Action::command("hit", move || h.set(h.get() + 1));
///
/// cmd.start();
/// assert!(cmd.is_finished());
/// assert_eq!(hits.get(), 1);
/// ```
pub struct Action {
    job: RefCell<Option<Job>>,
}

impl Action {
    pub fn new(job: impl FnOnce() + 'static) -> Self {
        Self {
            job: RefCell::new(Some(Box::new(job))),
        }
    }

    /// An action with nothing to run; finishes immediately.
    pub fn noop() -> Self {
        Self {
            job: RefCell::new(None),
        }
    }

    pub fn command(name: impl Into<Cow<'static, str>>, job: impl FnOnce() + 'static) -> Command {
        Command::new(name, Self::new(job))
    }
}

impl Behavior for Action {
    fn on_start(&self, done: Completion) {
        let job = self.job.borrow_mut().take();
        if let Some(job) = job {
            job();
        }
        done.complete();
    }
}

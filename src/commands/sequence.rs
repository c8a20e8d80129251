//! # Sequence: run children one at a time, in order.
//!
//! ```text
//!   pending: [c2, c3, c4]          current: c1 (executing)
//!
//!   c1 finished ─► detach ─► (retain?) ─► pop c2 ─► attach ─► c2.start()
//!   pending empty ───────────────────────────────► sequence finishes
//! ```
//!
//! ## Rules
//! - Children may be added at any time. [`AddMode::Next`] inserts ahead of the
//!   pending children, behind the running one.
//! - With `start_on_add`, adding to an idle sequence starts it.
//! - Synchronously finishing children are drained in a loop, not by recursion.
//! - A child that is already terminal when its turn comes is skipped.
//! - Stopping aborts the running child only; pending children are discarded.
//! - Children added after the sequence reached a terminal state are dropped.

use std::borrow::Cow;
use std::cell::{Cell, OnceCell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::command::{Behavior, Command, CommandState, Completion};
use super::edge::Edge;

/// Where [`Sequence::add`] inserts a child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddMode {
    /// Back of the pending list.
    #[default]
    Last,
    /// Front of the pending list; runs right after the current child.
    Next,
}

#[derive(Default)]
struct Queue {
    pending: RefCell<VecDeque<Command>>,
    current: RefCell<Option<Edge>>,
    finished: RefCell<Vec<Command>>,
    start_on_add: Cell<bool>,
    retain_finished: Cell<bool>,
    advancing: Cell<bool>,
    done: OnceCell<Completion>,
}

impl Queue {
    fn advance(self: &Rc<Self>) {
        if self.advancing.replace(true) {
            return;
        }
        loop {
            let Some(done) = self.done.get() else { break };
            if !done.is_pending() || self.current.borrow().is_some() {
                break;
            }

            let next = self.pending.borrow_mut().pop_front();
            let Some(child) = next else {
                done.complete();
                break;
            };
            if child.is_terminal() {
                tracing::trace!(child = child.name(), state = child.state().as_label(), "skipping terminal child");
                continue;
            }

            let edge = Edge::new(child.clone());
            let weak = Rc::downgrade(self);
            edge.attach(move || {
                if let Some(queue) = weak.upgrade() {
                    queue.on_child_finished();
                }
            });
            *self.current.borrow_mut() = Some(edge);
            child.start();
        }
        self.advancing.set(false);
    }

    fn on_child_finished(self: &Rc<Self>) {
        let edge = self.current.borrow_mut().take();
        if let Some(edge) = edge {
            edge.detach();
            if self.retain_finished.get() {
                self.finished.borrow_mut().push(edge.child().clone());
            }
        }
        self.advance();
    }

    fn abort(&self) {
        let edge = self.current.borrow_mut().take();
        let discarded = std::mem::take(&mut *self.pending.borrow_mut());
        if !discarded.is_empty() {
            tracing::trace!(discarded = discarded.len(), "sequence stopped with pending children");
        }
        if let Some(edge) = edge {
            edge.detach();
            edge.child().stop();
        }
    }
}

struct Runner(Rc<Queue>);

impl Behavior for Runner {
    fn on_start(&self, done: Completion) {
        let _ = self.0.done.set(done);
        self.0.advance();
    }

    fn on_stop(&self) {
        self.0.abort();
    }
}

/// FIFO composite. Clones share the same queue and command.
///
/// # Example
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use cmdtick::{Action, AddMode, Sequence};
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let step = |tag: &'static str| {
///     let log = log.clone();
///     Action::command(tag, move || log.borrow_mut().push(tag))
/// };
///
/// let seq = Sequence::new("intro");
/// seq.push(step("fade-in")).push(step("title"));
/// seq.add(step("logo"), AddMode::Next);
///
/// seq.start();
/// assert!(seq.command().is_finished());
/// assert_eq!(*log.borrow(), vec!["logo", "fade-in", "title"]);
/// ```
#[derive(Clone)]
pub struct Sequence {
    command: Command,
    queue: Rc<Queue>,
}

impl Sequence {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let queue = Rc::new(Queue::default());
        let command = Command::new(name, Runner(Rc::clone(&queue)));
        Self { command, queue }
    }

    /// Starts the sequence whenever a child is added while it is idle.
    #[must_use]
    pub fn with_start_on_add(self, enabled: bool) -> Self {
        self.queue.start_on_add.set(enabled);
        self
    }

    /// Keeps finished children in an ordered log, see [`Sequence::finished`].
    #[must_use]
    pub fn with_retain_finished(self, enabled: bool) -> Self {
        self.queue.retain_finished.set(enabled);
        self
    }

    pub fn set_start_on_add(&self, enabled: bool) {
        self.queue.start_on_add.set(enabled);
    }

    /// Appends a child.
    pub fn push(&self, child: impl Into<Command>) -> &Self {
        self.add(child, AddMode::Last)
    }

    /// Inserts a child ahead of the pending ones.
    pub fn push_next(&self, child: impl Into<Command>) -> &Self {
        self.add(child, AddMode::Next)
    }

    pub fn add(&self, child: impl Into<Command>, mode: AddMode) -> &Self {
        let child = child.into();
        if self.command.is_terminal() {
            tracing::debug!(
                sequence = self.command.name(),
                child = child.name(),
                "sequence already {}; child dropped",
                self.command.state().as_label()
            );
            return self;
        }

        {
            let mut pending = self.queue.pending.borrow_mut();
            match mode {
                AddMode::Last => pending.push_back(child),
                AddMode::Next => pending.push_front(child),
            }
        }

        if self.queue.start_on_add.get() {
            self.command.start();
        }
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn start(&self) {
        self.command.start();
    }

    pub fn stop(&self) {
        self.command.stop();
    }

    pub fn state(&self) -> CommandState {
        self.command.state()
    }

    /// The running child, if any.
    pub fn executing(&self) -> Option<Command> {
        self.queue.current.borrow().as_ref().map(|e| e.child().clone())
    }

    /// Children waiting to run, in run order.
    pub fn pending(&self) -> Vec<Command> {
        self.queue.pending.borrow().iter().cloned().collect()
    }

    /// Children that finished, in finish order. Empty unless `retain_finished` is set.
    pub fn finished(&self) -> Vec<Command> {
        self.queue.finished.borrow().clone()
    }
}

impl From<Sequence> for Command {
    fn from(sequence: Sequence) -> Self {
        sequence.command
    }
}

impl From<&Sequence> for Command {
    fn from(sequence: &Sequence) -> Self {
        sequence.command.clone()
    }
}

//! # Any: run every child concurrently, finish with the first one.
//!
//! ```text
//!   start() ─► start every child ─► attach every edge ─► any finished? ─► resolve
//!                                       │
//!                                       └── first child finished ─────► resolve
//!
//!   resolve: detach all ─► disposition(unfinished child)* ─► complete
//! ```
//!
//! The disposition decides what happens to the losers. The default stops them;
//! [`Any::leave_unfinished`] keeps them running, and a custom handler may hand them
//! to another owner (for example a [`CommandHeap`](crate::CommandHeap)).
//! Resolution happens exactly once.

use std::borrow::Cow;
use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use super::command::{Behavior, Command, CommandState, Completion};
use super::edge::Edge;

type Disposition = Rc<dyn Fn(&Command)>;

struct Race {
    edges: RefCell<Vec<Edge>>,
    disposition: RefCell<Disposition>,
    resolved: Cell<bool>,
    done: OnceCell<Completion>,
}

impl Default for Race {
    fn default() -> Self {
        Self {
            edges: RefCell::new(Vec::new()),
            disposition: RefCell::new(Rc::new(Command::stop) as Disposition),
            resolved: Cell::new(false),
            done: OnceCell::new(),
        }
    }
}

impl Race {
    fn listen(self: &Rc<Self>, edge: &Edge) {
        let weak = Rc::downgrade(self);
        edge.attach(move || {
            if let Some(race) = weak.upgrade() {
                race.resolve();
            }
        });
    }

    fn launch(self: &Rc<Self>) {
        let children = self.children();
        if children.is_empty() {
            self.resolve();
            return;
        }
        for child in &children {
            child.start();
        }
        for edge in self.edges.borrow().iter() {
            self.listen(edge);
        }
        if children.iter().any(Command::is_finished) {
            self.resolve();
        }
    }

    fn adopt(self: &Rc<Self>, child: Command) {
        let edge = Edge::new(child.clone());
        self.listen(&edge);
        self.edges.borrow_mut().push(edge);
        child.start();
    }

    fn resolve(&self) {
        let Some(done) = self.done.get() else { return };
        if !done.is_pending() || self.resolved.replace(true) {
            return;
        }
        self.detach_all();

        let disposition = Rc::clone(&self.disposition.borrow());
        for child in self.children() {
            if !child.is_finished() {
                disposition(&child);
            }
        }
        done.complete();
    }

    fn detach_all(&self) {
        for edge in self.edges.borrow().iter() {
            edge.detach();
        }
    }

    fn abort(&self) {
        self.resolved.set(true);
        self.detach_all();
        for child in self.children() {
            child.stop();
        }
    }

    fn children(&self) -> Vec<Command> {
        self.edges.borrow().iter().map(|e| e.child().clone()).collect()
    }
}

struct Runner(Rc<Race>);

impl Behavior for Runner {
    fn on_start(&self, done: Completion) {
        let _ = self.0.done.set(done);
        self.0.launch();
    }

    fn on_stop(&self) {
        self.0.abort();
    }
}

/// Parallel-any composite. Clones share the same members and command.
///
/// # Example
/// ```rust
/// use cmdtick::{Action, Any, Dynamic};
///
/// let slow = Dynamic::new().with_start(|_done| {}).command("slow");
/// let race = Any::new("race")
///     .with(slow.clone())
///     .with(Action::command("fast", || {}));
///
/// race.start();
/// assert!(race.command().is_finished());
/// assert!(slow.is_stopped());
/// ```
#[derive(Clone)]
pub struct Any {
    command: Command,
    race: Rc<Race>,
}

impl Any {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let race = Rc::new(Race::default());
        let command = Command::new(name, Runner(Rc::clone(&race)));
        Self { command, race }
    }

    /// Builder form of [`Any::push`].
    #[must_use]
    pub fn with(self, child: impl Into<Command>) -> Self {
        self.push(child);
        self
    }

    /// Adds a child. While the race is running, the child starts immediately.
    pub fn push(&self, child: impl Into<Command>) -> &Self {
        let child = child.into();
        match self.command.state() {
            CommandState::Idle => self.race.edges.borrow_mut().push(Edge::new(child)),
            CommandState::Executing => self.race.adopt(child),
            state => tracing::debug!(
                any = self.command.name(),
                child = child.name(),
                "race already {}; child dropped",
                state.as_label()
            ),
        }
        self
    }

    /// Replaces the handler applied to each unfinished child on resolution.
    pub fn on_unfinished(&self, disposition: impl Fn(&Command) + 'static) -> &Self {
        *self.race.disposition.borrow_mut() = Rc::new(disposition);
        self
    }

    /// Builder form of [`Any::on_unfinished`].
    #[must_use]
    pub fn with_on_unfinished(self, disposition: impl Fn(&Command) + 'static) -> Self {
        self.on_unfinished(disposition);
        self
    }

    /// Leaves unfinished children running after the race resolves.
    #[must_use]
    pub fn leave_unfinished(self) -> Self {
        self.with_on_unfinished(|_| {})
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

    pub fn children(&self) -> Vec<Command> {
        self.race.children()
    }
}

impl From<Any> for Command {
    fn from(any: Any) -> Self {
        any.command
    }
}

impl From<&Any> for Command {
    fn from(any: &Any) -> Self {
        any.command.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Action, CommandHeap, Dynamic};

    fn held(parked: &Rc<RefCell<Vec<Completion>>>, name: &'static str) -> Command {
        let p = parked.clone();
        Dynamic::new()
            .with_start(move |done| p.borrow_mut().push(done))
            .command(name)
    }

    fn counted_stops(name: &'static str, stops: &Rc<Cell<u32>>) -> Command {
        let s = stops.clone();
        Dynamic::new()
            .with_start(|_done| {})
            .with_stop(move || s.set(s.get() + 1))
            .command(name)
    }

    #[test]
    fn test_sync_winner_stops_every_other_child_once() {
        let stops = Rc::new(Cell::new(0));
        let race = Any::new("race")
            .with(counted_stops("a", &stops))
            .with(Action::command("winner", || {}))
            .with(counted_stops("b", &stops));
        race.start();
        assert!(race.command().is_finished());
        assert_eq!(stops.get(), 2);
        assert!(race.children().iter().all(|c| c.finished().is_empty()));
    }

    #[test]
    fn test_first_async_finisher_wins() {
        let parked = Rc::new(RefCell::new(Vec::new()));
        let race = Any::new("race")
            .with(held(&parked, "a"))
            .with(held(&parked, "b"));
        race.start();
        assert!(race.command().is_executing());

        parked.borrow()[1].complete();
        assert!(race.command().is_finished());
        let children = race.children();
        assert!(children[0].is_stopped());
        assert!(children[1].is_finished());

        // The loser's late completion is ignored.
        parked.borrow()[0].complete();
        assert!(children[0].is_stopped());
    }

    #[test]
    fn test_leave_unfinished_keeps_losers_running() {
        let parked = Rc::new(RefCell::new(Vec::new()));
        let race = Any::new("race")
            .with(held(&parked, "a"))
            .with(held(&parked, "b"))
            .leave_unfinished();
        race.start();
        parked.borrow()[0].complete();
        assert!(race.command().is_finished());
        assert!(race.children()[1].is_executing());
    }

    #[test]
    fn test_disposition_can_reparent_into_heap() {
        let heap = CommandHeap::new();
        let parked = Rc::new(RefCell::new(Vec::new()));
        let h = heap.clone();
        let race = Any::new("race")
            .with(held(&parked, "a"))
            .with(held(&parked, "b"))
            .with_on_unfinished(move |child| h.add_and_execute(child.clone()));
        race.start();
        parked.borrow()[0].complete();

        assert!(heap.is_executing());
        assert_eq!(heap.len(), 1);
        parked.borrow()[1].complete();
        assert!(!heap.is_executing());
    }

    #[test]
    fn test_empty_any_finishes_on_start() {
        let race = Any::new("empty");
        race.start();
        assert!(race.command().is_finished());
    }

    #[test]
    fn test_stop_stops_all_without_disposition() {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let parked = Rc::new(RefCell::new(Vec::new()));
        let race = Any::new("race")
            .with(held(&parked, "a"))
            .with(held(&parked, "b"))
            .with_on_unfinished(move |_| c.set(c.get() + 1));
        race.start();
        race.stop();
        assert!(race.command().is_stopped());
        assert!(race.children().iter().all(Command::is_stopped));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_two_sync_winners_resolve_once() {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let race = Any::new("race")
            .with(Action::command("a", || {}))
            .with(Action::command("b", || {}))
            .with_on_unfinished(move |_| c.set(c.get() + 1));
        let finished = Rc::new(Cell::new(0));
        let f = finished.clone();
        race.command().on_finished(move || f.set(f.get() + 1));
        race.start();
        assert_eq!(finished.get(), 1);
        assert_eq!(calls.get(), 0);
    }
}

//! # Group: run every child concurrently, finish when all have finished.
//!
//! ```text
//!   start() ─► attach every edge ─► start every child ─► all finished? ─► complete
//!                  │
//!                  └── child finished ─► all finished? ─► detach all ─► complete
//! ```
//!
//! Children finishing synchronously inside `start()` count; a group whose children
//! all finish synchronously finishes within its own `start()` call.

use std::borrow::Cow;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use super::command::{Behavior, Command, CommandState, Completion};
use super::edge::Edge;

#[derive(Default)]
struct Members {
    edges: RefCell<Vec<Edge>>,
    done: OnceCell<Completion>,
}

impl Members {
    fn listen(self: &Rc<Self>, edge: &Edge) {
        let weak = Rc::downgrade(self);
        edge.attach(move || {
            if let Some(members) = weak.upgrade() {
                members.check();
            }
        });
    }

    fn launch(self: &Rc<Self>) {
        let children: Vec<Command> = {
            let edges = self.edges.borrow();
            for edge in edges.iter() {
                self.listen(edge);
            }
            edges.iter().map(|e| e.child().clone()).collect()
        };
        for child in &children {
            child.start();
        }
        self.check();
    }

    fn adopt(self: &Rc<Self>, child: Command) {
        let edge = Edge::new(child.clone());
        self.listen(&edge);
        self.edges.borrow_mut().push(edge);
        child.start();
        self.check();
    }

    fn check(&self) {
        let Some(done) = self.done.get() else { return };
        if !done.is_pending() {
            return;
        }
        let all_finished = self.edges.borrow().iter().all(|e| e.child().is_finished());
        if all_finished {
            self.detach_all();
            done.complete();
        }
    }

    fn detach_all(&self) {
        for edge in self.edges.borrow().iter() {
            edge.detach();
        }
    }

    fn abort(&self) {
        self.detach_all();
        let children: Vec<Command> = self.edges.borrow().iter().map(|e| e.child().clone()).collect();
        for child in children {
            child.stop();
        }
    }
}

struct Runner(Rc<Members>);

impl Behavior for Runner {
    fn on_start(&self, done: Completion) {
        let _ = self.0.done.set(done);
        self.0.launch();
    }

    fn on_stop(&self) {
        self.0.abort();
    }
}

/// Parallel-all composite. Clones share the same members and command.
///
/// # Example
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use cmdtick::{Dynamic, Group};
///
/// let parked = Rc::new(RefCell::new(Vec::new()));
/// let group = Group::new("load");
/// for name in ["textures", "sounds"] {
///     let p = parked.clone();
///     group.push(Dynamic::new().with_start(move |done| p.borrow_mut().push(done)).command(name));
/// }
///
/// group.start();
/// let pending: Vec<_> = parked.borrow_mut().drain(..).collect();
/// pending[1].complete();
/// assert!(group.command().is_executing());
/// pending[0].complete();
/// assert!(group.command().is_finished());
/// ```
#[derive(Clone)]
pub struct Group {
    command: Command,
    members: Rc<Members>,
}

impl Group {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let members = Rc::new(Members::default());
        let command = Command::new(name, Runner(Rc::clone(&members)));
        Self { command, members }
    }

    /// Builder form of [`Group::push`].
    #[must_use]
    pub fn with(self, child: impl Into<Command>) -> Self {
        self.push(child);
        self
    }

    /// Adds a child. While the group executes, the child starts immediately.
    pub fn push(&self, child: impl Into<Command>) -> &Self {
        let child = child.into();
        match self.command.state() {
            CommandState::Idle => self.members.edges.borrow_mut().push(Edge::new(child)),
            CommandState::Executing => self.members.adopt(child),
            state => tracing::debug!(
                group = self.command.name(),
                child = child.name(),
                "group already {}; child dropped",
                state.as_label()
            ),
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

    pub fn children(&self) -> Vec<Command> {
        self.members.edges.borrow().iter().map(|e| e.child().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.edges.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.edges.borrow().is_empty()
    }
}

impl From<Group> for Command {
    fn from(group: Group) -> Self {
        group.command
    }
}

impl From<&Group> for Command {
    fn from(group: &Group) -> Self {
        group.command.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Action, Dynamic};
    use rand::seq::SliceRandom;
    use std::cell::Cell;

    fn held(parked: &Rc<RefCell<Vec<Completion>>>, name: &'static str) -> Command {
        let p = parked.clone();
        Dynamic::new()
            .with_start(move |done| p.borrow_mut().push(done))
            .command(name)
    }

    #[test]
    fn test_all_synchronous_children_finish_within_start() {
        let hits = Rc::new(Cell::new(0));
        let group = Group::new("g");
        for _ in 0..3 {
            let h = hits.clone();
            group.push(Action::command("a", move || h.set(h.get() + 1)));
        }
        group.start();
        assert_eq!(hits.get(), 3);
        assert!(group.command().is_finished());
    }

    #[test]
    fn test_empty_group_finishes_on_start() {
        let group = Group::new("empty");
        group.start();
        assert!(group.command().is_finished());
    }

    #[test]
    fn test_finishes_after_last_child_in_any_order() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let parked = Rc::new(RefCell::new(Vec::new()));
            let group = Group::new("g");
            for _ in 0..5 {
                group.push(held(&parked, "child"));
            }
            let finished = Rc::new(Cell::new(0));
            let f = finished.clone();
            group.command().on_finished(move || f.set(f.get() + 1));

            group.start();
            let mut pending: Vec<Completion> = parked.borrow_mut().drain(..).collect();
            pending.shuffle(&mut rng);

            let last = pending.len() - 1;
            for (i, done) in pending.iter().enumerate() {
                done.complete();
                assert_eq!(group.command().is_finished(), i == last);
            }
            assert_eq!(finished.get(), 1);
        }
    }

    #[test]
    fn test_mixed_sync_and_async_children() {
        let parked = Rc::new(RefCell::new(Vec::new()));
        let group = Group::new("g")
            .with(Action::command("now", || {}))
            .with(held(&parked, "later"));
        group.start();
        assert!(group.command().is_executing());
        parked.borrow()[0].complete();
        assert!(group.command().is_finished());
    }

    #[test]
    fn test_push_while_executing_starts_child() {
        let parked = Rc::new(RefCell::new(Vec::new()));
        let group = Group::new("g").with(held(&parked, "first"));
        group.start();

        let late = held(&parked, "late");
        group.push(late.clone());
        assert!(late.is_executing());
        assert_eq!(group.len(), 2);

        parked.borrow()[0].complete();
        assert!(group.command().is_executing());
        parked.borrow()[1].complete();
        assert!(group.command().is_finished());
    }

    #[test]
    fn test_stop_stops_every_child() {
        let parked = Rc::new(RefCell::new(Vec::new()));
        let group = Group::new("g")
            .with(held(&parked, "a"))
            .with(held(&parked, "b"));
        group.start();
        group.stop();
        assert!(group.command().is_stopped());
        assert!(group.children().iter().all(Command::is_stopped));
        assert!(group.children().iter().all(|c| c.finished().is_empty()));
    }

    #[test]
    fn test_externally_stopped_child_blocks_completion() {
        let parked = Rc::new(RefCell::new(Vec::new()));
        let a = held(&parked, "a");
        let group = Group::new("g").with(a.clone()).with(held(&parked, "b"));
        group.start();
        a.stop();
        parked.borrow()[1].complete();
        assert!(group.command().is_executing());
    }
}

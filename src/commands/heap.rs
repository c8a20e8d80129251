//! # CommandHeap: unordered bag of independently running commands.
//!
//! Members are added and started in one step and evicted as soon as they finish
//! or are stopped. The heap publishes an aggregate "anything executing" flag through
//! [`CommandHeap::state_changed`], which fires only on empty ↔ non-empty edges.
//!
//! ```text
//!   add_and_execute(c) ─► subscribe(finished|stopped ─► evict) ─► insert ─► c.start()
//!                                                                    │
//!                                              0 → 1 members ─► state_changed(true)
//!   evict / stop()      ─► unsubscribe ─► remove ─► 1 → 0 ─► state_changed(false)
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::command::{Command, CommandId};
use super::signal::{Signal, SubscriptionId};

struct Member {
    command: Command,
    finished: SubscriptionId,
    stopped: SubscriptionId,
}

impl Member {
    fn unsubscribe(&self) {
        self.command.finished().unsubscribe(self.finished);
        self.command.stopped().unsubscribe(self.stopped);
    }
}

#[derive(Default)]
struct Bag {
    members: RefCell<HashMap<CommandId, Member>>,
    executing: Cell<bool>,
    state_changed: Signal<bool>,
}

impl Bag {
    fn evict(&self, id: CommandId) {
        let member = self.members.borrow_mut().remove(&id);
        if let Some(member) = member {
            member.unsubscribe();
            tracing::trace!(command = member.command.name(), "evicted from heap");
        }
        self.refresh();
    }

    fn refresh(&self) {
        let now = !self.members.borrow().is_empty();
        if self.executing.replace(now) != now {
            self.state_changed.emit(now);
        }
    }
}

/// Shared handle to a heap. Clones refer to the same bag.
///
/// # Example
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use cmdtick::{CommandHeap, Dynamic};
///
/// let heap = CommandHeap::new();
/// let edges = Rc::new(RefCell::new(Vec::new()));
/// let e = edges.clone();
/// heap.on_state_changed(move |busy| e.borrow_mut().push(busy));
///
/// let parked = Rc::new(RefCell::new(None));
/// let p = parked.clone();
/// heap.add_and_execute(Dynamic::new().with_start(move |done| *p.borrow_mut() = Some(done)).command("bg"));
/// assert!(heap.is_executing());
///
/// if let Some(done) = parked.borrow_mut().take() {
///     done.complete();
/// }
/// assert!(!heap.is_executing());
/// assert_eq!(*edges.borrow(), vec![true, false]);
/// ```
#[derive(Clone, Default)]
pub struct CommandHeap {
    bag: Rc<Bag>,
}

impl CommandHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the command, arranges its eviction on finish or stop, and starts it.
    ///
    /// Terminal commands are ignored. Adding a command that is already a member
    /// only (re)issues `start`, which is a no-op unless it is idle.
    pub fn add_and_execute(&self, command: impl Into<Command>) {
        let command = command.into();
        if command.is_terminal() {
            tracing::debug!(
                command = command.name(),
                "heap ignores {} command",
                command.state().as_label()
            );
            return;
        }

        let id = command.id();
        let known = self.bag.members.borrow().contains_key(&id);
        if !known {
            let weak = Rc::downgrade(&self.bag);
            let evict = move || {
                if let Some(bag) = weak.upgrade() {
                    bag.evict(id);
                }
            };
            let member = Member {
                finished: command.on_finished(evict.clone()),
                stopped: command.on_stopped(evict),
                command: command.clone(),
            };
            self.bag.members.borrow_mut().insert(id, member);
            self.bag.refresh();
        }
        command.start();
    }

    /// Stops and evicts every member.
    pub fn stop(&self) {
        let members: Vec<Member> = self
            .bag
            .members
            .borrow_mut()
            .drain()
            .map(|(_, member)| member)
            .collect();
        for member in &members {
            member.unsubscribe();
        }
        for member in &members {
            member.command.stop();
        }
        self.bag.refresh();
    }

    pub fn is_executing(&self) -> bool {
        self.bag.executing.get()
    }

    /// Fires with the new aggregate flag on every empty ↔ non-empty transition.
    pub fn state_changed(&self) -> &Signal<bool> {
        &self.bag.state_changed
    }

    pub fn on_state_changed(&self, f: impl Fn(bool) + 'static) -> SubscriptionId {
        self.bag.state_changed.subscribe(f)
    }

    /// Current members, in no particular order.
    pub fn executing_commands(&self) -> Vec<Command> {
        self.bag
            .members
            .borrow()
            .values()
            .map(|m| m.command.clone())
            .collect()
    }

    pub fn contains(&self, command: &Command) -> bool {
        self.bag.members.borrow().contains_key(&command.id())
    }

    pub fn len(&self) -> usize {
        self.bag.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bag.members.borrow().is_empty()
    }
}

impl std::fmt::Debug for CommandHeap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHeap")
            .field("len", &self.len())
            .field("executing", &self.is_executing())
            .finish()
    }
}

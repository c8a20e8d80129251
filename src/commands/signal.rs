//! # Signal: single-threaded observer list.
//!
//! A [`Signal`] holds handlers subscribed by anyone holding a reference to it.
//! Commands expose three of them (started, finished, stopped); the command heap
//! exposes one carrying its aggregate executing flag.
//!
//! ## Rules
//! - Handlers run in subscription order.
//! - Emission works on a snapshot: handlers subscribed during an emission are not
//!   called by it; handlers unsubscribed during an emission are skipped.
//! - No borrow is held while a handler runs, so handlers may subscribe, unsubscribe,
//!   or trigger nested emissions.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Token returned by [`Signal::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<A> = Rc<dyn Fn(A)>;

/// Observer list carrying a payload of type `A` (unit for lifecycle signals).
pub struct Signal<A = ()> {
    next: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionId, Handler<A>)>>,
}

impl<A> Default for Signal<A> {
    fn default() -> Self {
        Self {
            next: Cell::new(0),
            handlers: RefCell::new(Vec::new()),
        }
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.handlers.borrow().len())
            .finish()
    }
}

impl<A: Clone + 'static> Signal<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler; it is called on every subsequent emission until unsubscribed.
    pub fn subscribe(&self, handler: impl Fn(A) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next.get());
        self.next.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Removes a handler. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        handlers.len() != before
    }

    /// Calls every subscribed handler with a clone of `payload`.
    pub fn emit(&self, payload: A) {
        let snapshot: Vec<(SubscriptionId, Handler<A>)> = self
            .handlers
            .borrow()
            .iter()
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect();

        for (id, handler) in snapshot {
            if self.is_subscribed(id) {
                handler(payload.clone());
            }
        }
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.handlers.borrow().iter().any(|(h, _)| *h == id)
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}

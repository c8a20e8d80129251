//! Parent → child completion link used by the composites.
//!
//! An [`Edge`] owns one child and at most one subscription to its `finished`
//! signal. Composites attach when they start listening and detach on firing,
//! on stop, or when resolving.

use std::cell::Cell;

use super::command::Command;
use super::signal::SubscriptionId;

pub(crate) struct Edge {
    child: Command,
    hook: Cell<Option<SubscriptionId>>,
}

impl Edge {
    pub(crate) fn new(child: Command) -> Self {
        Self {
            child,
            hook: Cell::new(None),
        }
    }

    pub(crate) fn child(&self) -> &Command {
        &self.child
    }

    /// Replaces any previous subscription.
    pub(crate) fn attach(&self, on_finished: impl Fn() + 'static) {
        self.detach();
        let id = self.child.on_finished(on_finished);
        self.hook.set(Some(id));
    }

    pub(crate) fn detach(&self) {
        if let Some(id) = self.hook.take() {
            self.child.finished().unsubscribe(id);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_attached(&self) -> bool {
        self.hook.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Dynamic;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_detached_edge_stops_listening() {
        let parked = Rc::new(RefCell::new(None));
        let p = parked.clone();
        let child = Dynamic::new()
            .with_start(move |done| *p.borrow_mut() = Some(done))
            .command("child");

        let fired = Rc::new(Cell::new(0));
        let edge = Edge::new(child.clone());
        let f = fired.clone();
        edge.attach(move || f.set(f.get() + 1));
        assert!(edge.is_attached());
        edge.detach();
        assert!(!edge.is_attached());
        assert!(child.finished().is_empty());

        child.start();
        if let Some(done) = parked.borrow().as_ref() {
            done.complete();
        }
        assert!(child.is_finished());
        assert_eq!(fired.get(), 0);
    }
}

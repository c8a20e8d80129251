//! # Single-child proxies: [`Wrap`] and [`Lazy`].
//!
//! Both forward one child's lifecycle: the proxy starts the child on start, finishes
//! when the child finishes, and stops it when stopped. [`Wrap`] holds a child built
//! up front; [`Lazy`] builds it on start through a factory that may decline.

use std::borrow::Cow;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use super::command::{Behavior, Command, Completion};
use super::edge::Edge;

type Factory = Box<dyn FnOnce() -> Option<Command>>;

enum Source {
    Ready(Command),
    Factory(Factory),
}

struct Forward {
    source: RefCell<Option<Source>>,
    child: RefCell<Option<Edge>>,
    done: OnceCell<Completion>,
}

impl Forward {
    fn new(source: Source) -> Rc<Self> {
        Rc::new(Self {
            source: RefCell::new(Some(source)),
            child: RefCell::new(None),
            done: OnceCell::new(),
        })
    }

    fn launch(self: &Rc<Self>, done: Completion) {
        let _ = self.done.set(done.clone());

        let source = self.source.borrow_mut().take();
        let child = match source {
            Some(Source::Ready(child)) => Some(child),
            Some(Source::Factory(factory)) => factory(),
            None => None,
        };
        let Some(child) = child else {
            tracing::trace!("proxy has no child; finishing");
            done.complete();
            return;
        };

        let edge = Edge::new(child.clone());
        let weak = Rc::downgrade(self);
        edge.attach(move || {
            if let Some(forward) = weak.upgrade() {
                forward.settle();
            }
        });
        *self.child.borrow_mut() = Some(edge);

        child.start();
        if child.is_finished() {
            self.settle();
        }
    }

    fn settle(&self) {
        if let Some(edge) = self.child.borrow().as_ref() {
            edge.detach();
        }
        if let Some(done) = self.done.get() {
            done.complete();
        }
    }

    fn abort(&self) {
        let edge = self.child.borrow_mut().take();
        if let Some(edge) = edge {
            edge.detach();
            edge.child().stop();
        }
    }
}

/// Proxies the lifecycle of one existing child.
///
/// # Example
/// ```rust
/// use cmdtick::{Action, Wrap};
///
/// let inner = Action::command("inner", || {});
/// let outer = Wrap::command("outer", inner.clone());
/// outer.start();
/// assert!(inner.is_finished());
/// assert!(outer.is_finished());
/// ```
pub struct Wrap(Rc<Forward>);

impl Wrap {
    pub fn new(child: impl Into<Command>) -> Self {
        Self(Forward::new(Source::Ready(child.into())))
    }

    pub fn command(name: impl Into<Cow<'static, str>>, child: impl Into<Command>) -> Command {
        Command::new(name, Self::new(child))
    }
}

impl Behavior for Wrap {
    fn on_start(&self, done: Completion) {
        self.0.launch(done);
    }

    fn on_stop(&self) {
        self.0.abort();
    }
}

/// Builds its child on start. A factory returning `None` finishes immediately.
///
/// # Example
/// ```rust
/// use cmdtick::{Action, Lazy};
///
/// let skipped = Lazy::command("maybe", || None);
/// skipped.start();
/// assert!(skipped.is_finished());
///
/// let built = Lazy::command("built", || Some(Action::command("late", || {})));
/// built.start();
/// assert!(built.is_finished());
/// ```
pub struct Lazy(Rc<Forward>);

impl Lazy {
    pub fn new(factory: impl FnOnce() -> Option<Command> + 'static) -> Self {
        Self(Forward::new(Source::Factory(Box::new(factory))))
    }

    pub fn command(
        name: impl Into<Cow<'static, str>>,
        factory: impl FnOnce() -> Option<Command> + 'static,
    ) -> Command {
        Command::new(name, Self::new(factory))
    }
}

impl Behavior for Lazy {
    fn on_start(&self, done: Completion) {
        self.0.launch(done);
    }

    fn on_stop(&self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Dynamic;
    use std::cell::Cell;

    fn held() -> (Command, Rc<RefCell<Option<Completion>>>) {
        let parked = Rc::new(RefCell::new(None));
        let p = parked.clone();
        let cmd = Dynamic::new()
            .with_start(move |done| *p.borrow_mut() = Some(done))
            .command("held");
        (cmd, parked)
    }

    #[test]
    fn test_wrap_forwards_async_finish() {
        let (inner, parked) = held();
        let outer = Wrap::command("outer", inner.clone());
        outer.start();
        assert!(inner.is_executing());
        assert!(outer.is_executing());

        if let Some(done) = parked.borrow_mut().take() {
            done.complete();
        }
        assert!(outer.is_finished());
        assert!(inner.finished().is_empty());
    }

    #[test]
    fn test_wrap_stop_stops_child() {
        let (inner, _parked) = held();
        let outer = Wrap::command("outer", inner.clone());
        outer.start();
        outer.stop();
        assert!(inner.is_stopped());
        assert!(outer.is_stopped());
    }

    #[test]
    fn test_wrap_of_finished_child_finishes() {
        let inner = Dynamic::new().command("done");
        inner.start();
        let outer = Wrap::command("outer", inner);
        outer.start();
        assert!(outer.is_finished());
    }

    #[test]
    fn test_lazy_factory_runs_on_start_only() {
        let built = Rc::new(Cell::new(false));
        let b = built.clone();
        let lazy = Lazy::command("lazy", move || {
            b.set(true);
            Some(Dynamic::new().command("child"))
        });
        assert!(!built.get());
        lazy.start();
        assert!(built.get());
        assert!(lazy.is_finished());
    }

    #[test]
    fn test_lazy_stop_before_start_is_noop() {
        let built = Rc::new(Cell::new(false));
        let b = built.clone();
        let lazy = Lazy::command("lazy", move || {
            b.set(true);
            None
        });
        lazy.stop();
        assert!(lazy.is_idle());
        assert!(!built.get());
    }

    #[test]
    fn test_lazy_stop_aborts_created_child() {
        let (inner, _parked) = held();
        let handle = inner.clone();
        let lazy = Lazy::command("lazy", move || Some(handle));
        lazy.start();
        lazy.stop();
        assert!(inner.is_stopped());
    }
}

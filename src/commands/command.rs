//! # Command: the shared lifecycle state machine.
//!
//! Every command (leaf or composite) is a [`Command`] handle wrapping a
//! [`Behavior`]. The handle owns the state machine and the three lifecycle signals;
//! the behavior owns the work.
//!
//! ```text
//!          start()                complete()
//!   Idle ──────────► Executing ─────────────► Finished
//!                       │
//!                       │ stop()
//!                       ▼
//!                    Stopped
//! ```
//!
//! ## Rules
//! - `start` is a no-op unless the command is `Idle`.
//! - `stop` is a no-op unless the command is `Executing`.
//! - A [`Completion`] only finishes a command that is still `Executing`; late or
//!   repeated completions are ignored.
//! - `Stopped` and `Finished` are terminal. A command never restarts.
//! - `stop` records `Stopped` before [`Behavior::on_stop`] runs, so completions
//!   reported during teardown are ignored.

use std::borrow::Cow;
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::events::{Event, EventKind};
use crate::subscribers::SubscriberSet;

use super::signal::{Signal, SubscriptionId};

static COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique command identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(u64);

impl CommandId {
    fn next() -> Self {
        Self(COMMAND_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd-{}", self.0)
    }
}

/// Lifecycle state of a command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommandState {
    #[default]
    Idle,
    Executing,
    Stopped,
    Finished,
}

impl CommandState {
    /// True for `Stopped` and `Finished`.
    pub fn is_terminal(self) -> bool {
        matches!(self, CommandState::Stopped | CommandState::Finished)
    }

    pub fn as_label(self) -> &'static str {
        match self {
            CommandState::Idle => "idle",
            CommandState::Executing => "executing",
            CommandState::Stopped => "stopped",
            CommandState::Finished => "finished",
        }
    }
}

/// The work behind a command.
///
/// `on_start` runs once, right after the command enters `Executing`. It must
/// eventually call [`Completion::complete`] (synchronously or later), unless the
/// command is stopped first.
///
/// # Example
/// ```rust
/// use cmdtick::{Behavior, Command, Completion};
///
/// struct Instant;
///
/// impl Behavior for Instant {
///     fn on_start(&self, done: Completion) {
///         done.complete();
///     }
/// }
///
/// let cmd = Command::new("instant", Instant);
/// cmd.start();
/// assert!(cmd.is_finished());
/// ```
pub trait Behavior: 'static {
    fn on_start(&self, done: Completion);

    /// Called once when an executing command is stopped.
    fn on_stop(&self) {}
}

struct Inner {
    id: CommandId,
    name: Cow<'static, str>,
    state: Cell<CommandState>,
    started: Signal,
    finished: Signal,
    stopped: Signal,
    behavior: Box<dyn Behavior>,
}

/// Shared handle to a command.
///
/// Clones refer to the same command; equality is identity.
#[derive(Clone)]
pub struct Command {
    inner: Rc<Inner>,
}

impl Command {
    pub fn new(name: impl Into<Cow<'static, str>>, behavior: impl Behavior) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: CommandId::next(),
                name: name.into(),
                state: Cell::new(CommandState::Idle),
                started: Signal::new(),
                finished: Signal::new(),
                stopped: Signal::new(),
                behavior: Box::new(behavior),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> CommandId {
        self.inner.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    pub fn state(&self) -> CommandState {
        self.inner.state.get()
    }

    pub fn is_idle(&self) -> bool {
        self.state() == CommandState::Idle
    }

    pub fn is_executing(&self) -> bool {
        self.state() == CommandState::Executing
    }

    pub fn is_finished(&self) -> bool {
        self.state() == CommandState::Finished
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == CommandState::Stopped
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Idle → Executing, emits `started`, then runs the behavior.
    ///
    /// If a `started` handler stops the command, the behavior is not run.
    pub fn start(&self) {
        let inner = &self.inner;
        if inner.state.get() != CommandState::Idle {
            tracing::trace!(command = %inner.name, state = inner.state.get().as_label(), "start ignored");
            return;
        }
        inner.state.set(CommandState::Executing);
        tracing::trace!(command = %inner.name, id = inner.id.0, "command started");
        inner.started.emit(());

        if inner.state.get() != CommandState::Executing {
            return;
        }
        inner.behavior.on_start(Completion {
            inner: Rc::downgrade(inner),
        });
    }

    /// Executing → Stopped: runs the behavior's teardown, then emits `stopped`.
    pub fn stop(&self) {
        let inner = &self.inner;
        if inner.state.get() != CommandState::Executing {
            return;
        }
        inner.state.set(CommandState::Stopped);
        inner.behavior.on_stop();
        tracing::trace!(command = %inner.name, id = inner.id.0, "command stopped");
        inner.stopped.emit(());
    }

    pub fn started(&self) -> &Signal {
        &self.inner.started
    }

    pub fn finished(&self) -> &Signal {
        &self.inner.finished
    }

    pub fn stopped(&self) -> &Signal {
        &self.inner.stopped
    }

    pub fn on_started(&self, f: impl Fn() + 'static) -> SubscriptionId {
        self.inner.started.subscribe(move |()| f())
    }

    pub fn on_finished(&self, f: impl Fn() + 'static) -> SubscriptionId {
        self.inner.finished.subscribe(move |()| f())
    }

    pub fn on_stopped(&self, f: impl Fn() + 'static) -> SubscriptionId {
        self.inner.stopped.subscribe(move |()| f())
    }

    /// Builder form of [`Command::on_started`].
    #[must_use]
    pub fn with_on_started(self, f: impl Fn() + 'static) -> Self {
        self.on_started(f);
        self
    }

    /// Builder form of [`Command::on_finished`].
    #[must_use]
    pub fn with_on_finished(self, f: impl Fn() + 'static) -> Self {
        self.on_finished(f);
        self
    }

    /// Builder form of [`Command::on_stopped`].
    #[must_use]
    pub fn with_on_stopped(self, f: impl Fn() + 'static) -> Self {
        self.on_stopped(f);
        self
    }

    /// Publishes this command's lifecycle transitions as [`Event`]s.
    pub fn report_to(&self, subscribers: &SubscriberSet) {
        let name: Arc<str> = Arc::from(self.name());
        let lifecycle = [
            (&self.inner.started, EventKind::CommandStarted),
            (&self.inner.finished, EventKind::CommandFinished),
            (&self.inner.stopped, EventKind::CommandStopped),
        ];
        for (signal, kind) in lifecycle {
            let subscribers = subscribers.clone();
            let name = Arc::clone(&name);
            signal.subscribe(move |()| {
                subscribers.emit(&Event::new(kind).with_command(Arc::clone(&name)));
            });
        }
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Command {}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("state", &self.inner.state.get())
            .finish()
    }
}

/// One-shot completion handle passed to [`Behavior::on_start`].
///
/// Holds a weak reference: completing a dropped command is a no-op.
#[derive(Clone)]
pub struct Completion {
    inner: Weak<Inner>,
}

impl Completion {
    /// Executing → Finished, then emits `finished`. Ignored in any other state.
    pub fn complete(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if inner.state.get() != CommandState::Executing {
            tracing::trace!(command = %inner.name, state = inner.state.get().as_label(), "late completion ignored");
            return;
        }
        inner.state.set(CommandState::Finished);
        tracing::trace!(command = %inner.name, id = inner.id.0, "command finished");
        inner.finished.emit(());
    }

    /// True while the command is still executing.
    pub fn is_pending(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.state.get() == CommandState::Executing)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.is_pending())
            .finish()
    }
}

//! # Commands: cooperative, cancellable units of work composed into trees.
//!
//! This module provides:
//! - [`Command`] - shared handle owning the lifecycle state machine and signals
//! - [`Behavior`] / [`Completion`] - the work behind a command and its finish hook
//! - [`Signal`] - observer list behind `started` / `finished` / `stopped`
//! - leaves: [`Action`], [`Dynamic`], [`Delay`]
//! - composites: [`Sequence`], [`Group`], [`Any`], [`Lazy`], [`Wrap`]
//! - [`CommandHeap`] - bag of independently running top-level commands
//!
//! ## Control flow
//! ```text
//!              Sequence ("intro")
//!              ├── Delay 0.5s ──────── timer callback ─► complete()
//!              ├── Group ("load")                             │
//!              │   ├── Dynamic ("textures")                   ▼
//!              │   └── Dynamic ("sounds")          finished signal fires
//!              └── Action ("show menu")                       │
//!                                                             ▼
//!                                         parent edge detaches, parent advances
//! ```
//!
//! Propagation is push-based: parents subscribe to their children's `finished`
//! signal and never poll. Everything runs on one thread; handles are `Rc`-based and
//! no interior borrow is held while user code runs.

mod action;
mod any;
mod command;
mod delay;
mod dynamic;
mod edge;
mod group;
mod heap;
mod proxy;
mod sequence;
mod signal;

pub use action::Action;
pub use any::Any;
pub use command::{Behavior, Command, CommandId, CommandState, Completion};
pub use delay::Delay;
pub use dynamic::Dynamic;
pub use group::Group;
pub use heap::CommandHeap;
pub use proxy::{Lazy, Wrap};
pub use sequence::{AddMode, Sequence};
pub use signal::{Signal, SubscriptionId};

//! Runtime events: types emitted by commands and timers.
//!
//! This module groups the event **data model** delivered to
//! [`Subscribe`](crate::Subscribe) implementations through a
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publishers**: `Timers` (registration, exhaustion, sweeps), `Command::report_to`
//!   (lifecycle of the reported command).
//! - **Consumers**: any `Subscribe` in the set, e.g. `LogWriter`.

mod event;

pub use event::{Event, EventKind};

//! # SubscriberSet: synchronous fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`](crate::Event) to every subscriber
//! in registration order.
//!
//! ## What it guarantees
//! - Registration order delivery.
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │
//!        ├────────────────► S1.on_event()   (catch_unwind)
//!        ├────────────────► S2.on_event()   (catch_unwind)
//!        └────────────────► SN.on_event()   (catch_unwind)
//! ```

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::events::Event;

use super::Subscribe;

/// Ordered set of subscribers sharing one publisher.
///
/// Cheap to clone: subscribers are reference counted.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    subscribers: Vec<Rc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a new set from the given subscribers.
    #[must_use]
    pub fn new(subscribers: Vec<Rc<dyn Subscribe>>) -> Self {
        Self { subscribers }
    }

    /// Appends a subscriber; it receives events emitted after this call.
    pub fn push(&mut self, subscriber: Rc<dyn Subscribe>) {
        self.subscribers.push(subscriber);
    }

    /// Delivers one event to all subscribers.
    pub fn emit(&self, event: &Event) {
        for sub in &self.subscribers {
            if let Err(panic_err) = catch_unwind(AssertUnwindSafe(|| sub.on_event(event))) {
                tracing::error!(
                    subscriber = sub.name(),
                    seq = event.seq,
                    "subscriber panicked: {}",
                    panic_message(panic_err.as_ref())
                );
            }
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.subscribers.iter().map(|s| s.name()))
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

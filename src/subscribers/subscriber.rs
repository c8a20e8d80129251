//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers into the runtime.
//!
//! Everything in this crate runs on one thread, so delivery is synchronous:
//! the publisher calls [`Subscribe::on_event`] for each subscriber in
//! registration order before it continues.
//!
//! ## Rules
//! - Handlers run inside the publisher's call stack (a timer tick, a `start`/`stop`).
//! - A panic in one subscriber is caught and logged; other subscribers still receive the event.
//! - Handlers may call back into commands and timers; the publisher holds no borrows while emitting.
//!
//! ## Example
//! ```rust
//! use std::cell::Cell;
//! use cmdtick::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct Exhausted {
//!     count: Cell<u32>,
//! }
//!
//! impl Subscribe for Exhausted {
//!     fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::TimerExhausted) {
//!             self.count.set(self.count.get() + 1);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "exhausted" }
//! }
//! ```

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// ### Implementation requirements
/// - Keep handlers short; they run on the tick path.
/// - Handle errors internally; do not panic.
pub trait Subscribe: 'static {
    /// Processes a single event.
    ///
    /// Called synchronously by the publisher. Panics are caught by
    /// [`SubscriberSet::emit`](crate::SubscriberSet::emit).
    fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

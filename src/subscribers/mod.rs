//! # Event subscribers for the cmdtick runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and an optional built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Timers / Command::report_to ── emit(&Event) ──► SubscriberSet
//!                                                        │
//!                                              ┌─────────┼─────────┐
//!                                              ▼         ▼         ▼
//!                                          LogWriter   Metrics   Custom
//! ```

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

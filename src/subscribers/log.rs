//! # LogWriter: event printer
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing` at
//! `INFO` level. Use it for tests or demos; install a `tracing` subscriber to see output.
//!
//! ## Example output
//! ```text
//! [command-started] command="intro"
//! [timer-started] timer=#0.0 bucket=Update/Scaled
//! [timer-exhausted] timer=#0.0 loops=1
//! [bucket-swept] bucket=Update/Scaled swept=1
//! [bucket-dormant] bucket=Update/Scaled
//! [command-finished] command="intro"
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let command = e.command.as_deref().unwrap_or("unknown");
        let timer = e.timer.map(|t| t.to_string()).unwrap_or_default();
        let bucket = e.bucket.map(|b| b.to_string()).unwrap_or_default();
        match e.kind {
            EventKind::CommandStarted => {
                tracing::info!("[command-started] command={command:?}");
            }
            EventKind::CommandFinished => {
                tracing::info!("[command-finished] command={command:?}");
            }
            EventKind::CommandStopped => {
                tracing::info!("[command-stopped] command={command:?}");
            }
            EventKind::TimerStarted => {
                tracing::info!("[timer-started] timer={timer} bucket={bucket}");
            }
            EventKind::TimerRejected => {
                tracing::info!(
                    "[timer-rejected] timer={timer} loops={:?} reason={:?}",
                    e.loops,
                    e.reason
                );
            }
            EventKind::TimerStopped => {
                tracing::info!("[timer-stopped] timer={timer}");
            }
            EventKind::TimerExhausted => {
                tracing::info!("[timer-exhausted] timer={timer} loops={:?}", e.loops);
            }
            EventKind::TimerReleased => {
                tracing::info!("[timer-released] timer={timer}");
            }
            EventKind::BucketSwept => {
                tracing::info!("[bucket-swept] bucket={bucket} swept={:?}", e.swept);
            }
            EventKind::BucketDormant => {
                tracing::info!("[bucket-dormant] bucket={bucket}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

//! # Example: race
//!
//! Races a player input against a timeout and hands the loser to a background heap.
//!
//! Shows how to:
//! - Build an [`Any`] over a [`Dynamic`] leaf and a [`Delay`].
//! - Reparent the unfinished child into a [`CommandHeap`] instead of stopping it.
//! - Observe timer and command events with the built-in [`LogWriter`].
//!
//! ## Flow
//! ```text
//! Any("prompt")
//!   ├─► Dynamic "wait-for-input"   (completed by hand at frame 3)
//!   └─► Delay   "timeout" 500ms
//!
//! input wins ─► disposition(timeout) ─► heap.add_and_execute(timeout)
//!                                         └─► heap busy until the timeout fires
//! ```
//!
//! ## Run
//! Requires the `logging` feature to export [`LogWriter`].
//! ```bash
//! RUST_LOG=info cargo run --example race --features logging
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cmdtick::{
    Any, CommandHeap, Config, Delay, Dynamic, LogWriter, Subscribe, SubscriberSet, Timers,
    UpdatePhase,
};
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(100);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let subs = SubscriberSet::new(vec![Rc::new(LogWriter::new()) as Rc<dyn Subscribe>]);
    let timers = Timers::with_config(&Config::default(), subs.clone());

    let background = CommandHeap::new();
    background.on_state_changed(|busy| println!("[heap] busy={busy}"));

    let input = Rc::new(RefCell::new(None));
    let slot = input.clone();
    let wait = Dynamic::new()
        .with_start(move |done| *slot.borrow_mut() = Some(done))
        .with_stop(|| println!("[input] listener removed"))
        .command("wait-for-input");
    let timeout = Delay::command(&timers, "timeout", Duration::from_millis(500));

    let heap = background.clone();
    let prompt = Any::new("prompt")
        .with(wait.clone())
        .with(timeout.clone())
        .with_on_unfinished(move |loser| {
            println!("[prompt] {} keeps running in the background", loser.name());
            heap.add_and_execute(loser.clone());
        });

    for cmd in [prompt.command(), &wait, &timeout] {
        cmd.report_to(&subs);
    }
    prompt.start();

    for frame in 1..=8 {
        if frame == 3 {
            if let Some(done) = input.borrow_mut().take() {
                println!("[input] key pressed");
                done.complete();
            }
        }
        timers.update(UpdatePhase::Update, FRAME, FRAME);
        println!(
            "[frame {frame}] prompt={:?} timeout={:?} heap={}",
            prompt.command().state(),
            timeout.state(),
            background.len()
        );
    }
}

//! # Example: delay_sequence
//!
//! Builds a small cutscene from timed steps and ticks it by hand.
//!
//! Shows how to:
//! - Chain [`Delay`] and [`Action`] leaves in a [`Sequence`].
//! - Insert a step with [`AddMode::Next`] while the sequence is running.
//! - Advance the timer engine manually with [`Timers::update`].
//!
//! ## Flow
//! ```text
//! Sequence("cutscene")
//!   ├─► Action  "fade-in"
//!   ├─► Delay   300ms        ◄── "camera-shake" inserted here at frame 5
//!   ├─► Action  "title"
//!   └─► Delay   200ms
//!
//! frame loop: timers.update(Update, 50ms, 50ms) until the sequence finishes
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example delay_sequence
//! ```

use std::time::Duration;

use cmdtick::{Action, AddMode, Delay, Sequence, Timers, UpdatePhase};

const FRAME: Duration = Duration::from_millis(50);

fn main() {
    let timers = Timers::new();

    let cutscene = Sequence::new("cutscene").with_retain_finished(true);
    cutscene
        .push(Action::command("fade-in", || println!("[cutscene] fade in")))
        .push(Delay::command(&timers, "hold", Duration::from_millis(300)))
        .push(Action::command("title", || println!("[cutscene] title card")))
        .push(Delay::command(&timers, "linger", Duration::from_millis(200)));

    cutscene.command().on_finished(|| println!("[cutscene] done"));
    cutscene.start();

    let mut frame = 0u32;
    while !cutscene.command().is_terminal() {
        frame += 1;
        if frame == 5 {
            cutscene.add(
                Action::command("camera-shake", || println!("[cutscene] camera shake")),
                AddMode::Next,
            );
        }
        timers.update(UpdatePhase::Update, FRAME, FRAME);
        if let Some(current) = cutscene.executing() {
            println!("[frame {frame:>2}] running {}", current.name());
        }
    }

    let order: Vec<String> = cutscene
        .finished()
        .iter()
        .map(|c| c.name().to_owned())
        .collect();
    println!("finished in {frame} frames: {}", order.join(" -> "));
}

//! # Timer bucket: double-buffered live list.
//!
//! A bucket batches every timer sharing one (phase, scale) pair.
//!
//! ```text
//! start()  ─► pending ──(merge after the pass)──► live ──(sweep)──► evicted
//! start()  ─► already in live mid-pass ─► fresh until the merge
//! stop()   ─► removal_scheduled = true
//! ```
//!
//! ## Rules
//! - `live` is taken out of the bucket for the duration of a pass, so it is never
//!   mutated while iterated; registrations during the pass land in `pending`.
//! - A slot re-activated in place during a pass is marked fresh and skipped, so it
//!   waits for the next tick like any other registration.
//! - Removals only happen in [`Bucket::sweep`], after the pass and the merge.
//! - A bucket whose live list empties becomes dormant (`active = false`).

use super::pool::Pool;

#[derive(Default)]
pub(crate) struct Bucket {
    pub(crate) live: Vec<u32>,
    pub(crate) pending: Vec<u32>,
    /// Slots re-activated in place during the current pass.
    pub(crate) refreshed: Vec<u32>,
    pub(crate) removal_scheduled: bool,
    /// At least one timer registered since the bucket last went dormant.
    pub(crate) active: bool,
    /// A pass is running; `live` is checked out.
    pub(crate) ticking: bool,
}

impl Bucket {
    /// Queues a slot; it is first advanced on the tick after this one.
    pub(crate) fn register(&mut self, slot: u32) {
        self.pending.push(slot);
        self.active = true;
    }

    /// Marks an in-place re-activation made while a pass is running.
    pub(crate) fn refresh(&mut self, slot: u32) {
        self.refreshed.push(slot);
    }

    pub(crate) fn schedule_removal(&mut self) {
        self.removal_scheduled = true;
    }

    /// Ends the pass: clears fresh marks and appends queued registrations.
    pub(crate) fn merge_pending(&mut self, pool: &mut Pool) {
        for slot in self.refreshed.drain(..) {
            pool.slot_mut(slot).timer.fresh = false;
        }
        if self.pending.is_empty() {
            return;
        }
        self.live.append(&mut self.pending);
    }

    /// Evicts every inactive timer. Returns the number evicted.
    pub(crate) fn sweep(&mut self, pool: &mut Pool) -> u32 {
        let before = self.live.len();
        self.live.retain(|&slot| {
            let timer = &mut pool.slot_mut(slot).timer;
            if timer.active {
                return true;
            }
            timer.in_bucket = false;
            false
        });
        self.removal_scheduled = false;

        if self.live.is_empty() && self.pending.is_empty() {
            self.active = false;
        }
        u32::try_from(before - self.live.len()).unwrap_or(u32::MAX)
    }

    pub(crate) fn is_dormant(&self) -> bool {
        !self.active
    }
}

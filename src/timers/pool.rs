//! # Timer pool: slot arena with per-bucket free lists.
//!
//! Every timer lives in a slot of one arena. A slot is permanently bound to
//! the bucket it was created for, and released slots go back to that bucket's
//! free list.
//!
//! ```text
//! acquire(spec) ──► free[bucket].pop() ──► reset + configure ──► TimerId{slot, gen}
//!                   └─ empty → push new slot (gen 0)
//!
//! release(id)   ──► gen += 1 (old handles become stale)
//!                   callback dropped, free[bucket].push(slot)
//! ```
//!
//! ## Rules
//! - Release does **not** remove the slot from its bucket; the bucket sweeps it later.
//! - Free lists are LIFO: the most recently released slot is reused first.

use crate::error::TimerError;

use super::timer::{BucketKey, Callback, Timer, TimerSpec};
use super::TimerId;

pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) released: bool,
    pub(crate) timer: Timer,
}

pub(crate) struct Pool {
    slots: Vec<Slot>,
    free: [Vec<u32>; BucketKey::COUNT],
}

impl Pool {
    /// Creates a pool with `prewarm` released slots per bucket.
    pub(crate) fn with_prewarm(prewarm: usize) -> Self {
        let mut pool = Self {
            slots: Vec::with_capacity(prewarm * BucketKey::COUNT),
            free: Default::default(),
        };
        for key in BucketKey::all() {
            for _ in 0..prewarm {
                let slot = pool.push_slot(key, true);
                pool.free[key.index()].push(slot);
            }
        }
        pool
    }

    pub(crate) fn acquire(&mut self, spec: &TimerSpec, callback: Callback) -> TimerId {
        let key = spec.bucket();
        let slot = match self.free[key.index()].pop() {
            Some(slot) => slot,
            None => self.push_slot(key, false),
        };

        let entry = &mut self.slots[slot as usize];
        entry.released = false;
        entry.timer.reset();
        entry.timer.configure(spec, callback);

        TimerId {
            slot,
            generation: entry.generation,
        }
    }

    /// Returns the slot to its free list. The timer must already be inactive.
    pub(crate) fn release(&mut self, id: TimerId) -> Result<BucketKey, TimerError> {
        let entry = self.entry_mut(id)?;
        debug_assert!(!entry.timer.active);
        entry.released = true;
        entry.generation = entry.generation.wrapping_add(1);
        entry.timer.callback = None;

        let key = entry.timer.bucket;
        self.free[key.index()].push(id.slot);
        Ok(key)
    }

    pub(crate) fn get(&self, id: TimerId) -> Result<&Timer, TimerError> {
        match self.slots.get(id.slot as usize) {
            Some(entry) if !entry.released && entry.generation == id.generation => {
                Ok(&entry.timer)
            }
            _ => Err(TimerError::Released { id }),
        }
    }

    pub(crate) fn get_mut(&mut self, id: TimerId) -> Result<&mut Timer, TimerError> {
        self.entry_mut(id).map(|entry| &mut entry.timer)
    }

    /// Raw slot access for bucket iteration, regardless of generation.
    #[inline]
    pub(crate) fn slot_mut(&mut self, slot: u32) -> &mut Slot {
        &mut self.slots[slot as usize]
    }

    /// Number of released slots waiting for reuse in a bucket's pool.
    pub(crate) fn idle(&self, key: BucketKey) -> usize {
        self.free[key.index()].len()
    }

    fn entry_mut(&mut self, id: TimerId) -> Result<&mut Slot, TimerError> {
        match self.slots.get_mut(id.slot as usize) {
            Some(entry) if !entry.released && entry.generation == id.generation => Ok(entry),
            _ => Err(TimerError::Released { id }),
        }
    }

    fn push_slot(&mut self, key: BucketKey, released: bool) -> u32 {
        let slot = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            released,
            timer: Timer::new(key),
        });
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::{TimeScale, UpdatePhase};
    use std::rc::Rc;
    use std::time::Duration;

    fn noop() -> Callback {
        Rc::new(|| {})
    }

    #[test]
    fn test_release_invalidates_handle() {
        let mut pool = Pool::with_prewarm(0);
        let id = pool.acquire(&TimerSpec::once(Duration::from_secs(1)), noop());
        assert!(pool.get(id).is_ok());

        pool.release(id).unwrap();
        assert_eq!(pool.get(id).err(), Some(TimerError::Released { id }));
        assert_eq!(pool.release(id).err(), Some(TimerError::Released { id }));
    }

    #[test]
    fn test_reacquire_reuses_slot_and_resets_counters() {
        let mut pool = Pool::with_prewarm(0);
        let spec = TimerSpec::repeating(Duration::from_secs(1));
        let first = pool.acquire(&spec, noop());
        {
            let timer = pool.get_mut(first).unwrap();
            timer.elapsed = Duration::from_millis(700);
            timer.completed = 5;
        }
        pool.release(first).unwrap();

        let second = pool.acquire(&spec, noop());
        assert_eq!(second.slot, first.slot);
        assert_ne!(second.generation, first.generation);

        let timer = pool.get(second).unwrap();
        assert_eq!(timer.elapsed, Duration::ZERO);
        assert_eq!(timer.completed, 0);
    }

    #[test]
    fn test_free_lists_are_per_bucket() {
        let mut pool = Pool::with_prewarm(2);
        let fixed = BucketKey::new(UpdatePhase::FixedUpdate, TimeScale::Unscaled);
        assert_eq!(pool.idle(fixed), 2);

        let spec = TimerSpec::once(Duration::from_secs(1))
            .with_phase(UpdatePhase::FixedUpdate)
            .with_scale(TimeScale::Unscaled);
        let id = pool.acquire(&spec, noop());
        assert_eq!(pool.idle(fixed), 1);
        assert_eq!(pool.idle(BucketKey::default()), 2);
        assert_eq!(pool.get(id).unwrap().bucket, fixed);
    }
}

//! Single-slot acquire/release latch for crossing the producer/consumer
//! boundary without locks (§5, §9 design note).
//!
//! Replaces the source's interrupt-driven `volatile frame_available` flag
//! with an explicit `AtomicBool` guarding an `UnsafeCell` slot. Safe to
//! drive from one producer and poll from one consumer; publishing a new
//! value while the previous is unread overwrites it (the dropped value is
//! reported back to the producer so it can count the overrun).

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

/// Holds at most one `T`. `publish` always succeeds; it reports whether it
/// overwrote an unread value. `take` consumes the held value, if any.
pub struct FrameLatch<T> {
    occupied: AtomicBool,
    slot: UnsafeCell<Option<T>>,
}

// SAFETY: `occupied` provides the synchronization between the single
// producer (publish) and single consumer (take); the slot itself is only
// touched while holding the corresponding side of that protocol.
unsafe impl<T: Send> Sync for FrameLatch<T> {}

impl<T> Default for FrameLatch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameLatch<T> {
    pub const fn new() -> Self {
        Self {
            occupied: AtomicBool::new(false),
            slot: UnsafeCell::new(None),
        }
    }

    /// Writes `value` into the slot. Returns `true` iff a previously
    /// published, not-yet-taken value was overwritten (a consumer overrun).
    pub fn publish(&self, value: T) -> bool {
        // SAFETY: single producer, and the consumer only reads the slot
        // after observing `occupied` via `take`'s acquire load.
        let overwritten = unsafe {
            let slot = &mut *self.slot.get();
            let overwritten = slot.is_some();
            *slot = Some(value);
            overwritten
        };
        self.occupied.store(true, Ordering::Release);
        overwritten
    }

    /// Takes the held value, if any, clearing the slot.
    pub fn take(&self) -> Option<T> {
        if !self.occupied.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: `occupied` was observed true with acquire ordering,
        // synchronizing with the producer's release store in `publish`.
        let value = unsafe { (*self.slot.get()).take() };
        self.occupied.store(false, Ordering::Release);
        value
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }

    /// Marks any held value as taken without returning it. Used by a
    /// pipeline-level `reset()`, which is destructive by contract (§5).
    pub fn clear(&self) {
        self.occupied.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_on_empty_latch_returns_none() {
        let latch: FrameLatch<u32> = FrameLatch::new();
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn publish_then_take_round_trips_the_value() {
        let latch = FrameLatch::new();
        assert!(!latch.publish(42));
        assert!(latch.is_occupied());
        assert_eq!(latch.take(), Some(42));
        assert!(!latch.is_occupied());
    }

    #[test]
    fn publishing_over_an_unread_value_reports_overrun() {
        let latch = FrameLatch::new();
        assert!(!latch.publish(1));
        assert!(latch.publish(2));
        assert_eq!(latch.take(), Some(2));
    }

    #[test]
    fn take_after_take_returns_none() {
        let latch = FrameLatch::new();
        latch.publish(7);
        assert_eq!(latch.take(), Some(7));
        assert_eq!(latch.take(), None);
    }
}

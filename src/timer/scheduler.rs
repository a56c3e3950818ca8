//! Tick-driven scheduler for delayed one-shot timers.
//!
//! Each timer carries a purpose tag `K` that the owner dispatches on when the
//! timer fires. The scheduler itself does not care how many timers share a
//! purpose; owners that need "one per purpose" enforce it on top.

use std::time::Duration;

use bevy::prelude::*;

/// Opaque handle to a scheduled timer.
///
/// Handles are never reused, so a stale handle can never cancel a newer timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

struct Scheduled<K> {
    handle: TimerHandle,
    purpose: K,
    timer: Timer,
}

/// Cooperative one-shot timer queue.
///
/// Timers are advanced with [`Scheduler::advance`] and collected with
/// [`Scheduler::pop_due`]. Due timers come out in schedule order.
pub struct Scheduler<K> {
    next_id: u64,
    pending: Vec<Scheduled<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer that becomes due once `duration` has elapsed.
    ///
    /// Time only passes through `advance`, so a timer scheduled during a tick
    /// is first checked on the following tick, even with a zero duration.
    pub fn schedule(&mut self, purpose: K, duration: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            handle,
            purpose,
            timer: Timer::new(duration, TimerMode::Once),
        });
        handle
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(index) = self.pending.iter().position(|s| s.handle == handle) else {
            return false;
        };
        self.pending.remove(index);
        true
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|s| s.handle == handle)
    }

    /// Number of pending timers tagged with `purpose`.
    pub fn pending_for(&self, purpose: K) -> usize {
        self.pending.iter().filter(|s| s.purpose == purpose).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Let `delta` pass for every pending timer.
    pub fn advance(&mut self, delta: Duration) {
        for scheduled in &mut self.pending {
            scheduled.timer.tick(delta);
        }
    }

    /// Remove and return the oldest due timer.
    ///
    /// Call this in a loop after `advance`. Anything cancelled between two
    /// calls is gone from the queue and will not be returned.
    pub fn pop_due(&mut self) -> Option<(TimerHandle, K)> {
        let index = self.pending.iter().position(|s| s.timer.finished())?;
        let scheduled = self.pending.remove(index);
        Some((scheduled.handle, scheduled.purpose))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Tag {
        A,
        B,
    }

    const STEP: Duration = Duration::from_millis(100);

    #[test]
    fn fires_once_duration_has_elapsed() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(Tag::A, Duration::from_millis(300));

        scheduler.advance(STEP);
        scheduler.advance(STEP);
        assert_eq!(scheduler.pop_due(), None);

        scheduler.advance(STEP);
        assert_eq!(scheduler.pop_due(), Some((handle, Tag::A)));
        assert_eq!(scheduler.pop_due(), None);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn zero_duration_waits_for_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Tag::A, Duration::ZERO);
        assert_eq!(scheduler.pop_due(), None);

        scheduler.advance(Duration::ZERO);
        assert!(scheduler.pop_due().is_some());
    }

    #[test]
    fn due_timers_come_out_in_schedule_order() {
        let mut scheduler = Scheduler::new();
        let late = scheduler.schedule(Tag::B, Duration::from_millis(100));
        let early = scheduler.schedule(Tag::A, Duration::from_millis(50));

        scheduler.advance(STEP);
        assert_eq!(scheduler.pop_due(), Some((late, Tag::B)));
        assert_eq!(scheduler.pop_due(), Some((early, Tag::A)));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(Tag::A, STEP);

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));

        scheduler.advance(STEP);
        assert_eq!(scheduler.pop_due(), None);
    }

    #[test]
    fn cancel_after_fire_is_a_no_op() {
        let mut scheduler = Scheduler::new();
        let first = scheduler.schedule(Tag::A, STEP);
        scheduler.advance(STEP);
        assert_eq!(scheduler.pop_due(), Some((first, Tag::A)));

        let second = scheduler.schedule(Tag::A, STEP);
        assert!(!scheduler.cancel(first));
        assert!(scheduler.is_pending(second));
    }

    #[test]
    fn cancelling_a_due_timer_before_collection_suppresses_it() {
        let mut scheduler = Scheduler::new();
        let a = scheduler.schedule(Tag::A, STEP);
        let b = scheduler.schedule(Tag::B, STEP);
        scheduler.advance(STEP);

        // `a` fires first and its handler cancels `b` within the same tick.
        assert_eq!(scheduler.pop_due(), Some((a, Tag::A)));
        scheduler.cancel(b);
        assert_eq!(scheduler.pop_due(), None);
    }

    #[test]
    fn counts_pending_per_purpose() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Tag::A, STEP);
        scheduler.schedule(Tag::A, STEP);
        scheduler.schedule(Tag::B, STEP);

        assert_eq!(scheduler.pending_for(Tag::A), 2);
        assert_eq!(scheduler.pending_for(Tag::B), 1);
        assert_eq!(scheduler.len(), 3);
    }
}

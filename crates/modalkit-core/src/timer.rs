#![forbid(unsafe_code)]

//! Deadline-ordered timer queue with cancellation.
//!
//! Timers carry an arbitrary payload and fire in deadline order; ties fire in
//! scheduling order. Cancellation removes the payload immediately and leaves a
//! tombstone in the heap that is discarded once it reaches the top.
//!
//! # Invariants
//!
//! - `len()` counts live (scheduled, not yet fired or cancelled) timers only.
//! - The heap top, when present, is always a live timer, so
//!   [`TimerQueue::next_deadline`] never reports a cancelled deadline.
//! - A [`TimerId`] is never reused by the same queue.
//!
//! # Failure Modes
//!
//! - Cancelling an unknown or already-fired timer returns `None`.
//! - `pop_expired` on an empty queue returns `None`.

use ahash::AHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use web_time::Instant;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Get the raw sequence number.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Heap slot; the payload lives in the `live` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    deadline: Instant,
    seq: u64,
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (earliest deadline first)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A min-heap of timers ordered by deadline.
#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Slot>,
    live: AHashMap<u64, T>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: AHashMap::new(),
            next_seq: 0,
        }
    }

    /// Number of live timers.
    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no timers are pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Schedule `payload` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: Instant, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Slot { deadline, seq });
        self.live.insert(seq, payload);
        TimerId(seq)
    }

    /// Cancel a pending timer, returning its payload.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let payload = self.live.remove(&id.0)?;
        self.prune();
        Some(payload)
    }

    /// Whether the timer is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains_key(&id.0)
    }

    /// Peek at a pending timer's payload.
    pub fn get(&self, id: TimerId) -> Option<&T> {
        self.live.get(&id.0)
    }

    /// Cancel every timer whose payload fails `keep`.
    ///
    /// Returns the number of cancelled timers.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.live.len();
        self.live.retain(|_, payload| keep(payload));
        let removed = before - self.live.len();
        if removed > 0 {
            self.prune();
        }
        removed
    }

    /// The earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|slot| slot.deadline)
    }

    /// Pop the earliest timer whose deadline is `<= now`.
    ///
    /// Timers are returned one at a time so the caller can schedule or cancel
    /// other timers between fires and have those changes respected.
    pub fn pop_expired(&mut self, now: Instant) -> Option<(TimerId, T)> {
        loop {
            let top = *self.heap.peek()?;
            if top.deadline > now {
                return None;
            }
            self.heap.pop();
            let payload = self.live.remove(&top.seq);
            self.prune();
            if let Some(payload) = payload {
                return Some((TimerId(top.seq), payload));
            }
        }
    }

    /// Drop every timer.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }

    /// Discard cancelled slots sitting at the top of the heap.
    fn prune(&mut self) {
        if self.live.is_empty() {
            self.heap.clear();
            return;
        }
        while let Some(top) = self.heap.peek() {
            if self.live.contains_key(&top.seq) {
                break;
            }
            self.heap.pop();
        }
    }
}

//! Single-threaded queue of deferred callbacks
//!
//! The host pumps the queue from its UI loop with the current instant and
//! runs whatever comes due. Nothing here spawns threads or sleeps.

use std::time::{Duration, Instant};

/// Handle to a scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleId(u64);

#[derive(Debug)]
struct Entry<A> {
    id: ScheduleId,
    due: Instant,
    action: A,
}

/// Deferred callbacks ordered by due time
#[derive(Debug)]
pub struct DeferredQueue<A> {
    entries: Vec<Entry<A>>,
    next_id: u64,
}

impl<A> DeferredQueue<A> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `action` to run `delay` after `now`
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: A) -> ScheduleId {
        let id = ScheduleId(self.next_id);
        self.next_id += 1;
        let due = now + delay;
        // Keep entries sorted; equal due times stay in scheduling order.
        let pos = self.entries.partition_point(|e| e.due <= due);
        self.entries.insert(pos, Entry { id, due, action });
        id
    }

    /// Cancel an entry; returns false if it already ran or was cancelled
    pub fn cancel(&mut self, id: ScheduleId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop every pending entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove and return every entry due at or before `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<A> {
        let split = self.entries.partition_point(|e| e.due <= now);
        self.entries.drain(..split).map(|e| e.action).collect()
    }

    /// Earliest pending due time
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.first().map(|e| e.due)
    }

    /// Number of pending entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

//! The event calendar: a priority queue keyed by `(time, priority)`.
//!
//! Entries with equal keys pop in insertion order. Determinism of whole runs
//! depends on this, so every entry carries a monotonically increasing
//! sequence number as the final tie-breaker.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use lockstep_common::SimTime;

use crate::phase::Priority;

/// One scheduled entry.
#[derive(Debug)]
pub struct Entry<T> {
    /// When the entry becomes due.
    pub time: SimTime,
    /// Ordering among entries due at the same time.
    pub priority: Priority,
    /// Insertion sequence number.
    seq: u64,
    /// The scheduled payload.
    pub payload: T,
}

impl<T> Entry<T> {
    fn key(&self) -> (SimTime, Priority, u64) {
        (self.time, self.priority, self.seq)
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-heap of scheduled entries.
#[derive(Debug)]
pub struct Calendar<T> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
}

impl<T> Calendar<T> {
    /// Creates an empty calendar.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedules `payload` at `(time, priority)`.
    pub fn push(&mut self, time: SimTime, priority: Priority, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            time,
            priority,
            seq,
            payload,
        }));
    }

    /// Removes and returns the minimum entry.
    pub fn pop(&mut self) -> Option<Entry<T>> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }

    /// Returns the key of the minimum entry without removing it.
    pub fn peek(&self) -> Option<(SimTime, Priority)> {
        self.heap.peek().map(|Reverse(e)| (e.time, e.priority))
    }

    /// Returns the number of scheduled entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for Calendar<T> {
    fn default() -> Self {
        Self::new()
    }
}

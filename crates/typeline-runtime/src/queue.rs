#![forbid(unsafe_code)]

//! Deadline-ordered queue of pending wakes, shared by the bundled hosts.
//!
//! # Invariants
//!
//! 1. Wakes pop in deadline order; equal deadlines pop in registration order.
//! 2. A cancelled handle never pops.
//! 3. Handles are never reused.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::host::{TimerHandle, Wake};

/// Pending wakes keyed by absolute deadline.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), Wake>,
    deadlines: HashMap<u64, Duration>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `wake` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: Duration, wake: Wake) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((deadline, seq), wake);
        self.deadlines.insert(seq, deadline);
        TimerHandle::from_raw(seq)
    }

    /// Remove a pending wake. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let seq = handle.raw();
        match self.deadlines.remove(&seq) {
            Some(deadline) => self.pending.remove(&(deadline, seq)).is_some(),
            None => false,
        }
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Pop the earliest wake if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, Wake)> {
        if self.next_deadline()? > now {
            return None;
        }
        self.pop_next()
    }

    /// Pop the earliest wake regardless of time.
    pub fn pop_next(&mut self) -> Option<(Duration, Wake)> {
        let ((deadline, seq), wake) = self.pending.pop_first()?;
        self.deadlines.remove(&seq);
        Some((deadline, wake))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending wake.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }
}

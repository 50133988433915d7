#![forbid(unsafe_code)]

//! Deterministic host for testing.
//!
//! `SimHost` runs a [`RunController`] against a virtual clock. Time only
//! moves when the caller advances it, and due wakes are dispatched in
//! deadline order, so every run is reproducible to the nanosecond.
//!
//! # Example
//!
//! ```ignore
//! use typeline_runtime::simulator::SimHost;
//!
//! let mut host = SimHost::new();
//! let mut ctl = RunController::new(config);
//! ctl.start(&mut host);
//! host.advance(Duration::from_millis(250), &mut ctl);
//! assert_eq!(ctl.counts(), &[2]);
//! ```

use std::time::Duration;

use crate::controller::RunController;
use crate::host::{DEFAULT_FRAME_INTERVAL, Host, TimerHandle, Wake, next_frame_boundary};
use crate::queue::TimerQueue;

/// Virtual-clock host.
#[derive(Debug)]
pub struct SimHost {
    now: Duration,
    frame_interval: Duration,
    queue: TimerQueue,
    /// When set, `clear` is ignored: cancelled wakes still fire.
    lossy_cancel: bool,
    dispatched: u64,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    /// A host at time zero refreshing at 60 Hz.
    #[must_use]
    pub fn new() -> Self {
        Self::with_frame_interval(DEFAULT_FRAME_INTERVAL)
    }

    #[must_use]
    pub fn with_frame_interval(frame_interval: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            frame_interval,
            queue: TimerQueue::new(),
            lossy_cancel: false,
            dispatched: 0,
        }
    }

    /// Ignore cancellations, as a host whose timer queue cannot be cleared
    /// in time would. Stale wakes then reach the controller.
    #[must_use]
    pub fn lossy_cancellation(mut self) -> Self {
        self.lossy_cancel = true;
        self
    }

    /// Move the clock to `at` without dispatching anything. Never moves backwards.
    pub fn set_now(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Wakes waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.next_deadline()
    }

    /// Wakes delivered so far.
    #[must_use]
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Deliver the next pending wake, moving the clock to its deadline.
    ///
    /// Returns the time of delivery, or `None` when nothing is pending.
    pub fn step(&mut self, ctl: &mut RunController) -> Option<Duration> {
        let (deadline, wake) = self.queue.pop_next()?;
        self.now = self.now.max(deadline);
        self.dispatched += 1;
        ctl.on_wake(wake, self);
        Some(self.now)
    }

    /// Deliver every wake due within `dt`, then move the clock by `dt`.
    pub fn advance(&mut self, dt: Duration, ctl: &mut RunController) -> usize {
        let target = self.now.saturating_add(dt);
        self.advance_to(target, ctl)
    }

    /// Deliver every wake due at or before `target`, then move the clock there.
    pub fn advance_to(&mut self, target: Duration, ctl: &mut RunController) -> usize {
        let mut delivered = 0;
        while self.queue.next_deadline().is_some_and(|d| d <= target) {
            self.step(ctl);
            delivered += 1;
        }
        self.set_now(target);
        delivered
    }

    /// Deliver wakes until none are pending or the next one lies past `limit`.
    pub fn run_until_settled(&mut self, ctl: &mut RunController, limit: Duration) -> usize {
        let mut delivered = 0;
        while self.queue.next_deadline().is_some_and(|d| d <= limit) {
            self.step(ctl);
            delivered += 1;
        }
        delivered
    }
}

impl Host for SimHost {
    fn now(&self) -> Duration {
        self.now
    }

    fn set_timeout(&mut self, delay: Duration, wake: Wake) -> TimerHandle {
        self.queue.schedule(self.now.saturating_add(delay), wake)
    }

    fn request_frame(&mut self, wake: Wake) -> TimerHandle {
        let at = next_frame_boundary(self.now, self.frame_interval);
        self.queue.schedule(at, wake)
    }

    fn clear(&mut self, handle: TimerHandle) {
        if !self.lossy_cancel {
            self.queue.cancel(handle);
        }
    }
}

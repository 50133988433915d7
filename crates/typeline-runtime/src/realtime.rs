#![forbid(unsafe_code)]

//! Wall-clock host.
//!
//! `ClockHost` measures time with [`Instant`] and blocks the calling thread
//! until the next deadline. It suits command-line demos and benchmarks; an
//! embedding event loop should implement [`Host`] over its own timers.

use std::thread;
use std::time::{Duration, Instant};

use crate::controller::RunController;
use crate::host::{DEFAULT_FRAME_INTERVAL, Host, TimerHandle, Wake, next_frame_boundary};
use crate::queue::TimerQueue;

/// Host backed by the monotonic system clock.
#[derive(Debug)]
pub struct ClockHost {
    epoch: Instant,
    frame_interval: Duration,
    queue: TimerQueue,
}

impl Default for ClockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockHost {
    /// A host whose epoch is now, refreshing at 60 Hz.
    #[must_use]
    pub fn new() -> Self {
        Self::with_frame_interval(DEFAULT_FRAME_INTERVAL)
    }

    #[must_use]
    pub fn with_frame_interval(frame_interval: Duration) -> Self {
        Self {
            epoch: Instant::now(),
            frame_interval,
            queue: TimerQueue::new(),
        }
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deliver wakes as they come due, sleeping in between, until nothing is
    /// pending or the next deadline lies past `limit` (measured from the epoch).
    ///
    /// Returns the number of wakes delivered.
    pub fn run_until_settled(&mut self, ctl: &mut RunController, limit: Duration) -> usize {
        let mut delivered = 0;
        while let Some(deadline) = self.queue.next_deadline() {
            if deadline > limit {
                break;
            }
            let now = self.now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
            let now = self.now();
            while let Some((_, wake)) = self.queue.pop_due(now) {
                ctl.on_wake(wake, self);
                delivered += 1;
            }
        }
        tracing::debug!(delivered, pending = self.queue.len(), "clock host settled");
        delivered
    }
}

impl Host for ClockHost {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn set_timeout(&mut self, delay: Duration, wake: Wake) -> TimerHandle {
        let at = self.now().saturating_add(delay);
        self.queue.schedule(at, wake)
    }

    fn request_frame(&mut self, wake: Wake) -> TimerHandle {
        let at = next_frame_boundary(self.now(), self.frame_interval);
        self.queue.schedule(at, wake)
    }

    fn clear(&mut self, handle: TimerHandle) {
        self.queue.cancel(handle);
    }
}

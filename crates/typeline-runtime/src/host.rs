#![forbid(unsafe_code)]

//! Host facilities: a monotonic clock, one-shot timers, and frame callbacks.
//!
//! The runtime never owns a thread. A [`Host`] records what should happen
//! and when; whoever drives the host later hands each due [`Wake`] back to
//! [`RunController::on_wake`](crate::controller::RunController::on_wake).
//!
//! Every wake carries the run generation it was registered under. A wake
//! whose generation no longer matches the controller's is dropped, which
//! keeps late timers from a cancelled run from touching the new one even
//! when the host cannot cancel them in time.

use std::time::Duration;

/// What a scheduled callback does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeKind {
    /// Reveal `step + 1` cells of `line`.
    Reveal { line: usize, step: usize },
    /// The run's total duration has elapsed.
    Finish,
    /// A display refresh.
    Frame,
    /// The inter-repeat delay has elapsed.
    Repeat,
}

/// A scheduled callback tagged with the run generation that registered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wake {
    pub generation: u64,
    pub kind: WakeKind,
}

impl Wake {
    #[must_use]
    pub const fn new(generation: u64, kind: WakeKind) -> Self {
        Self { generation, kind }
    }
}

/// Opaque identifier of a pending timer or frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Timer and frame primitives provided by the embedding environment.
pub trait Host {
    /// Monotonic time since the host's epoch.
    fn now(&self) -> Duration;

    /// Deliver `wake` once, `delay` from now.
    fn set_timeout(&mut self, delay: Duration, wake: Wake) -> TimerHandle;

    /// Deliver `wake` once, at the next display refresh.
    fn request_frame(&mut self, wake: Wake) -> TimerHandle;

    /// Cancel a pending timer or frame request. Unknown handles are ignored.
    fn clear(&mut self, handle: TimerHandle);
}

/// First refresh boundary strictly after `now` for a display refreshing
/// every `interval` since the host epoch.
#[must_use]
pub fn next_frame_boundary(now: Duration, interval: Duration) -> Duration {
    let interval_ns = interval.as_nanos().max(1);
    let next = (now.as_nanos() / interval_ns + 1) * interval_ns;
    Duration::from_nanos(u64::try_from(next).unwrap_or(u64::MAX))
}

/// Default refresh interval: 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_boundary_is_strictly_after_now() {
        let interval = Duration::from_millis(16);
        assert_eq!(next_frame_boundary(Duration::ZERO, interval), interval);
        assert_eq!(
            next_frame_boundary(Duration::from_millis(16), interval),
            Duration::from_millis(32)
        );
        assert_eq!(
            next_frame_boundary(Duration::from_millis(20), interval),
            Duration::from_millis(32)
        );
    }

    #[test]
    fn zero_interval_does_not_divide_by_zero() {
        let next = next_frame_boundary(Duration::from_nanos(5), Duration::ZERO);
        assert_eq!(next, Duration::from_nanos(6));
    }

    #[test]
    fn handle_round_trips_raw() {
        assert_eq!(TimerHandle::from_raw(7).raw(), 7);
    }
}

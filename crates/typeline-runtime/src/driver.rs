#![forbid(unsafe_code)]

//! Scheduling strategies: how the passage of time becomes visible counts.
//!
//! Both drivers honor the same contract. After each wake, `counts[i]` equals
//! the number of entries in line `i`'s `when` that are at or before the
//! elapsed run time, and completion is reported exactly once, at the first
//! wake at or after `total_duration + COMPLETION_EPSILON`.
//!
//! - [`TimerDriver`]: one timer per character plus one for completion. Cost
//!   scales with the character count.
//! - [`FrameDriver`]: one frame callback that recounts every line. Cost
//!   scales with refresh rate and line count.
//!
//! # Invariants
//!
//! 1. Counts only grow within a run.
//! 2. `DriverStep::finished` is true at most once per launch.
//! 3. After `cancel`, the driver holds no pending handles and ignores wakes.

pub mod frames;
pub mod timers;

use std::fmt;
use std::time::Duration;

use typeline_core::GlobalPlan;

use crate::host::{Host, WakeKind};

pub use frames::FrameDriver;
pub use timers::TimerDriver;

/// Forward margin so a character due exactly at the end is shown before completion.
pub const COMPLETION_EPSILON: Duration = Duration::from_millis(1);

/// Run time at which completion fires.
#[must_use]
pub fn completion_at(plan: &GlobalPlan) -> Duration {
    plan.total_duration().saturating_add(COMPLETION_EPSILON)
}

/// Which driver a controller runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One timer per character.
    Timers,
    /// One callback per display refresh.
    #[default]
    Frames,
}

impl Strategy {
    /// A fresh driver for this strategy.
    #[must_use]
    pub fn driver(self) -> Box<dyn ScheduleDriver + Send> {
        match self {
            Self::Timers => Box::new(TimerDriver::new()),
            Self::Frames => Box::new(FrameDriver::new()),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timers => "timers",
            Self::Frames => "frames",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of delivering one wake to a driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverStep {
    /// Lines whose visible count grew.
    pub changed: Vec<usize>,
    /// The run reached its completion time.
    pub finished: bool,
}

/// A scheduling strategy driving one run at a time.
pub trait ScheduleDriver: fmt::Debug {
    fn strategy(&self) -> Strategy;

    /// Begin a run of `plan` starting at `host.now()`. Wakes are tagged with
    /// `generation`. Any previous run is cancelled first.
    fn launch(&mut self, plan: &GlobalPlan, generation: u64, host: &mut dyn Host);

    /// Apply a wake of the current generation to `counts`.
    fn on_wake(
        &mut self,
        plan: &GlobalPlan,
        kind: WakeKind,
        counts: &mut [usize],
        host: &mut dyn Host,
    ) -> DriverStep;

    /// Cancel every outstanding callback of the current run as one batch.
    fn cancel(&mut self, host: &mut dyn Host);

    /// Callbacks still registered with the host.
    fn pending(&self) -> usize;
}

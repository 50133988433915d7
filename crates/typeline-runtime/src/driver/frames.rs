#![forbid(unsafe_code)]

//! Continuous scheduling: one callback per display refresh.

use std::time::Duration;

use typeline_core::GlobalPlan;

use super::{DriverStep, ScheduleDriver, Strategy, completion_at};
use crate::host::{Host, TimerHandle, Wake, WakeKind};

/// Recounts every line from the elapsed run time on each frame.
#[derive(Debug, Default)]
pub struct FrameDriver {
    generation: u64,
    started_at: Duration,
    frame: Option<TimerHandle>,
    finished: bool,
    frames: u64,
}

impl FrameDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames handled since the last launch.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl ScheduleDriver for FrameDriver {
    fn strategy(&self) -> Strategy {
        Strategy::Frames
    }

    fn launch(&mut self, _plan: &GlobalPlan, generation: u64, host: &mut dyn Host) {
        self.cancel(host);
        self.generation = generation;
        self.started_at = host.now();
        self.finished = false;
        self.frames = 0;
        self.frame = Some(host.request_frame(Wake::new(generation, WakeKind::Frame)));
        tracing::trace!(generation, "frame driver launched");
    }

    fn on_wake(
        &mut self,
        plan: &GlobalPlan,
        kind: WakeKind,
        counts: &mut [usize],
        host: &mut dyn Host,
    ) -> DriverStep {
        if self.finished || kind != WakeKind::Frame {
            return DriverStep::default();
        }
        self.frame = None;
        self.frames += 1;

        let elapsed = host.now().saturating_sub(self.started_at);
        let mut changed = Vec::new();
        for (i, (line, count)) in plan.lines().iter().zip(counts.iter_mut()).enumerate() {
            let visible = line.visible_at(elapsed);
            if visible > *count {
                *count = visible;
                changed.push(i);
            }
        }

        let finished = elapsed >= completion_at(plan);
        if finished {
            self.finished = true;
        } else {
            self.frame = Some(host.request_frame(Wake::new(self.generation, WakeKind::Frame)));
        }
        DriverStep { changed, finished }
    }

    fn cancel(&mut self, host: &mut dyn Host) {
        if let Some(handle) = self.frame.take() {
            host.clear(handle);
        }
    }

    fn pending(&self) -> usize {
        usize::from(self.frame.is_some())
    }
}

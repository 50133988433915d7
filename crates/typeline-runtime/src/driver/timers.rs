#![forbid(unsafe_code)]

//! Discrete scheduling: one one-shot timer per character transition.

use typeline_core::GlobalPlan;

use super::{DriverStep, ScheduleDriver, Strategy, completion_at};
use crate::host::{Host, TimerHandle, Wake, WakeKind};

/// Registers every reveal up front and advances counts as timers fire.
#[derive(Debug, Default)]
pub struct TimerDriver {
    handles: Vec<TimerHandle>,
    fired: usize,
    finished: bool,
}

impl TimerDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleDriver for TimerDriver {
    fn strategy(&self) -> Strategy {
        Strategy::Timers
    }

    fn launch(&mut self, plan: &GlobalPlan, generation: u64, host: &mut dyn Host) {
        self.cancel(host);
        self.finished = false;
        self.handles.reserve(plan.total_chars() + 1);

        for (line, lp) in plan.lines().iter().enumerate() {
            for (step, &at) in lp.when().iter().enumerate() {
                let wake = Wake::new(generation, WakeKind::Reveal { line, step });
                self.handles.push(host.set_timeout(at, wake));
            }
        }
        let finish = Wake::new(generation, WakeKind::Finish);
        self.handles.push(host.set_timeout(completion_at(plan), finish));

        tracing::trace!(
            generation,
            timers = self.handles.len(),
            "timer driver launched"
        );
    }

    fn on_wake(
        &mut self,
        plan: &GlobalPlan,
        kind: WakeKind,
        counts: &mut [usize],
        _host: &mut dyn Host,
    ) -> DriverStep {
        if self.finished {
            return DriverStep::default();
        }
        match kind {
            WakeKind::Reveal { line, step } => {
                self.fired += 1;
                let Some(len) = plan.line(line).map(|l| l.len()) else {
                    return DriverStep::default();
                };
                let Some(count) = counts.get_mut(line) else {
                    return DriverStep::default();
                };
                let target = (step + 1).min(len);
                if *count < target {
                    *count = target;
                    DriverStep {
                        changed: vec![line],
                        finished: false,
                    }
                } else {
                    DriverStep::default()
                }
            }
            WakeKind::Finish => {
                self.finished = true;
                self.handles.clear();
                self.fired = 0;
                DriverStep {
                    changed: Vec::new(),
                    finished: true,
                }
            }
            WakeKind::Frame | WakeKind::Repeat => DriverStep::default(),
        }
    }

    fn cancel(&mut self, host: &mut dyn Host) {
        for handle in self.handles.drain(..) {
            host.clear(handle);
        }
        self.fired = 0;
    }

    fn pending(&self) -> usize {
        self.handles.len().saturating_sub(self.fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SimHost;
    use std::time::Duration;
    use typeline_core::{CaretStyle, LineDescriptor, Segmenter, TimingConfig};

    fn plan(lines: &[&str]) -> GlobalPlan {
        let lines: Vec<LineDescriptor> = lines.iter().map(|&l| l.into()).collect();
        GlobalPlan::compile(
            &lines,
            &TimingConfig::default().ms_per_char(100),
            &CaretStyle::default(),
            Segmenter::Scalars,
        )
    }

    #[test]
    fn registers_one_timer_per_char_plus_finish() {
        let plan = plan(&["Hi", "abc"]);
        let mut host = SimHost::new();
        let mut driver = TimerDriver::new();
        driver.launch(&plan, 1, &mut host);
        assert_eq!(driver.pending(), 6);
        assert_eq!(host.pending(), 6);
    }

    #[test]
    fn reveal_is_monotonic_and_idempotent() {
        let plan = plan(&["abc"]);
        let mut host = SimHost::new();
        let mut driver = TimerDriver::new();
        driver.launch(&plan, 1, &mut host);
        let mut counts = vec![0];

        let step = driver.on_wake(&plan, WakeKind::Reveal { line: 0, step: 1 }, &mut counts, &mut host);
        assert_eq!(counts, vec![2]);
        assert_eq!(step.changed, vec![0]);

        // An earlier step arriving late never lowers the count.
        let step = driver.on_wake(&plan, WakeKind::Reveal { line: 0, step: 0 }, &mut counts, &mut host);
        assert_eq!(counts, vec![2]);
        assert!(step.changed.is_empty());

        // Re-applying the same step is a no-op.
        driver.on_wake(&plan, WakeKind::Reveal { line: 0, step: 1 }, &mut counts, &mut host);
        assert_eq!(counts, vec![2]);
    }

    #[test]
    fn finish_reports_once() {
        let plan = plan(&["a"]);
        let mut host = SimHost::new();
        let mut driver = TimerDriver::new();
        driver.launch(&plan, 1, &mut host);
        let mut counts = vec![0];
        assert!(driver.on_wake(&plan, WakeKind::Finish, &mut counts, &mut host).finished);
        assert!(!driver.on_wake(&plan, WakeKind::Finish, &mut counts, &mut host).finished);
    }

    #[test]
    fn out_of_range_reveal_is_ignored() {
        let plan = plan(&["a"]);
        let mut host = SimHost::new();
        let mut driver = TimerDriver::new();
        driver.launch(&plan, 1, &mut host);
        let mut counts = vec![0];
        let step = driver.on_wake(&plan, WakeKind::Reveal { line: 4, step: 0 }, &mut counts, &mut host);
        assert_eq!(step, DriverStep::default());
        assert_eq!(counts, vec![0]);
    }

    #[test]
    fn cancel_clears_host_timers() {
        let plan = plan(&["abcdef"]);
        let mut host = SimHost::new();
        let mut driver = TimerDriver::new();
        driver.launch(&plan, 1, &mut host);
        driver.cancel(&mut host);
        assert_eq!(driver.pending(), 0);
        assert_eq!(host.pending(), 0);
    }

    #[test]
    fn timers_use_absolute_offsets() {
        let plan = plan(&["ab"]);
        let mut host = SimHost::new();
        let mut driver = TimerDriver::new();
        driver.launch(&plan, 1, &mut host);
        assert_eq!(host.next_deadline(), Some(Duration::from_millis(100)));
    }
}

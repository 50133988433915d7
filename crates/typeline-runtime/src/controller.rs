#![forbid(unsafe_code)]

//! Run controller: the state machine behind `start`, `stop`, `reset` and
//! `replay`.
//!
//! The controller owns the visible-count vector and the repeat budget. It
//! delegates the passage of time to a [`ScheduleDriver`] and reacts to the
//! wakes a [`Host`] hands back.
//!
//! ```text
//!            start / replay / reconfigure(autoplay)
//!   Idle ──────────────────────────────────────────► Running
//!    ▲                                                 │ finished
//!    │ stop / reset                                    ▼
//!    └──────────── any ◄─────────── WaitingToRepeat ◄──┤ repeats left
//!                                         │ Repeat wake │
//!                                         └──► Running  └──► Done
//! ```
//!
//! # Invariants
//!
//! 1. Every operation that cancels or launches a run bumps the generation.
//!    A wake whose generation differs from the current one is dropped before
//!    it can touch counts or fire completion.
//! 2. Within a run, each line's count never decreases. Counts drop to zero
//!    only at a run boundary.
//! 3. The completion callback fires exactly once per finished run, before
//!    the repeat decision, and never from inside another callback.
//! 4. `counts().len() == plan().line_count()` at all times.
//!
//! # Failure Modes
//!
//! - A host that cannot cancel timers in time still delivers wakes of
//!   superseded runs. These are counted in [`RunController::stale_wakes_dropped`]
//!   and reported as [`ControllerEvent::StaleWakeDropped`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use typeline_core::{CaretState, GlobalPlan, LineView, LiveRegion};

use crate::config::{Repeat, TypedTextConfig};
use crate::diagnostics::{Diagnostics, NoopDiagnostics};
use crate::driver::{ScheduleDriver, Strategy};
use crate::host::{Host, TimerHandle, Wake, WakeKind};

/// Oldest events are discarded past this many undrained entries.
const MAX_PENDING_EVENTS: usize = 256;

/// Lifecycle phase of a [`RunController`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Never started, stopped, or reset. Counts are zero.
    #[default]
    Idle,
    /// A driver is revealing characters.
    Running,
    /// A run finished and the repeat delay is elapsing. Counts hold their
    /// final values.
    WaitingToRepeat,
    /// Finished with no repeats left. Counts hold their final values.
    Done,
}

impl RunPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::WaitingToRepeat => "waiting_to_repeat",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notable transitions, queued for polling with
/// [`RunController::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A run was launched by `start`, `replay` or `reconfigure`.
    Started { generation: u64 },
    /// A run finished. `run` counts finished runs since construction.
    Completed { run: u64 },
    /// Another run will follow after the repeat delay.
    RepeatScheduled { remaining: Repeat },
    /// The repeat delay elapsed and a new run began.
    Repeated { generation: u64 },
    /// No repeats left.
    Done,
    /// A wake from a superseded run arrived and was ignored.
    StaleWakeDropped { wake: Wake },
}

/// Owns the run state of one typed-text animation.
pub struct RunController {
    config: TypedTextConfig,
    plan: Arc<GlobalPlan>,
    counts: Vec<usize>,
    phase: RunPhase,
    generation: u64,
    remaining: Repeat,
    run_started_at: Option<Duration>,
    runs_completed: u64,
    stale_dropped: u64,
    mounted: bool,
    driver: Box<dyn ScheduleDriver + Send>,
    repeat_timer: Option<TimerHandle>,
    on_complete: Option<Box<dyn FnMut() + Send>>,
    diagnostics: Box<dyn Diagnostics + Send>,
    events: VecDeque<ControllerEvent>,
}

impl fmt::Debug for RunController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunController")
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("counts", &self.counts)
            .field("remaining", &self.remaining)
            .field("runs_completed", &self.runs_completed)
            .field("strategy", &self.driver.strategy())
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl RunController {
    /// Compile `config` into a plan. Nothing is scheduled until
    /// [`mount`](Self::mount) or [`start`](Self::start).
    #[must_use]
    pub fn new(config: TypedTextConfig) -> Self {
        let plan = Arc::new(config.compile());
        let counts = vec![0; plan.line_count()];
        Self {
            remaining: config.repeat,
            driver: config.strategy.driver(),
            config,
            plan,
            counts,
            phase: RunPhase::Idle,
            generation: 0,
            run_started_at: None,
            runs_completed: 0,
            stale_dropped: 0,
            mounted: false,
            repeat_timer: None,
            on_complete: None,
            diagnostics: Box::new(NoopDiagnostics),
            events: VecDeque::new(),
        }
    }

    /// Called with no arguments once per finished run.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.set_on_complete(callback);
        self
    }

    pub fn set_on_complete(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + Send + 'static) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    // --- lifecycle -------------------------------------------------------

    /// Attach to a host. Starts a run when autoplay is on.
    pub fn mount(&mut self, host: &mut dyn Host) {
        self.mounted = true;
        if self.config.autoplay {
            self.start(host);
        }
    }

    /// Detach: cancel everything and discard the run state.
    pub fn unmount(&mut self, host: &mut dyn Host) {
        self.invalidate(host);
        self.zero_counts();
        self.remaining = self.config.repeat;
        self.phase = RunPhase::Idle;
        self.mounted = false;
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Cancel any active run and begin a fresh one with the configured
    /// repeat budget.
    pub fn start(&mut self, host: &mut dyn Host) {
        self.invalidate(host);
        self.zero_counts();
        self.remaining = self.config.repeat;
        self.launch(host);
    }

    /// Cancel any active run and go idle with zeroed counts. The remaining
    /// repeat budget is kept.
    pub fn stop(&mut self, host: &mut dyn Host) {
        self.invalidate(host);
        self.zero_counts();
        self.phase = RunPhase::Idle;
        tracing::debug!(generation = self.generation, "typed text stopped");
    }

    /// Cancel any active run, zero counts and restore the configured repeat
    /// budget. Idempotent.
    pub fn reset(&mut self, host: &mut dyn Host) {
        self.invalidate(host);
        self.zero_counts();
        self.remaining = self.config.repeat;
        self.phase = RunPhase::Idle;
    }

    /// Reset, then start a fresh run with `times` repeats, or the configured
    /// budget when `None`.
    pub fn replay(&mut self, times: Option<Repeat>, host: &mut dyn Host) {
        self.reset(host);
        self.remaining = times.unwrap_or(self.config.repeat);
        self.launch(host);
    }

    /// Swap in a new configuration.
    ///
    /// When the compiled plan, strategy and autoplay flag are unchanged the
    /// active run continues untouched. Otherwise the run is cancelled, the
    /// plan replaced, counts zeroed and the repeat budget restored. A new
    /// run starts immediately only while mounted with autoplay on; an
    /// unmounted controller settles idle.
    pub fn reconfigure(&mut self, config: TypedTextConfig, host: &mut dyn Host) {
        let plan = config.compile();
        let unchanged = plan == *self.plan
            && config.autoplay == self.config.autoplay
            && config.strategy == self.config.strategy;
        if unchanged {
            self.config = config;
            return;
        }

        self.invalidate(host);
        if config.strategy != self.driver.strategy() {
            self.driver = config.strategy.driver();
        }
        self.plan = Arc::new(plan);
        self.config = config;
        self.counts = vec![0; self.plan.line_count()];
        self.remaining = self.config.repeat;
        tracing::debug!(
            lines = self.plan.line_count(),
            autoplay = self.config.autoplay,
            mounted = self.mounted,
            "typed text reconfigured"
        );

        if self.mounted && self.config.autoplay {
            self.launch(host);
        } else {
            self.phase = RunPhase::Idle;
        }
    }

    /// Deliver a wake from the host.
    ///
    /// Returns `true` when the wake changed observable state.
    pub fn on_wake(&mut self, wake: Wake, host: &mut dyn Host) -> bool {
        if wake.generation != self.generation {
            self.stale_dropped += 1;
            self.diagnostics.stale_wake(wake);
            self.push_event(ControllerEvent::StaleWakeDropped { wake });
            tracing::trace!(
                wake_generation = wake.generation,
                generation = self.generation,
                "dropped stale wake"
            );
            return false;
        }

        match (wake.kind, self.phase) {
            (WakeKind::Repeat, RunPhase::WaitingToRepeat) => {
                self.repeat_timer = None;
                self.invalidate(host);
                self.zero_counts();
                self.launch_as(host, true);
                true
            }
            (WakeKind::Repeat, _) => false,
            (kind, RunPhase::Running) => {
                let step = self.driver.on_wake(&self.plan, kind, &mut self.counts, host);
                let changed = !step.changed.is_empty();
                if changed {
                    let now = host.now();
                    self.diagnostics.tick(self.generation, now, &step.changed, &self.counts);
                    tracing::trace!(lines = ?step.changed, counts = ?self.counts, "reveal");
                }
                if step.finished {
                    self.complete(host);
                }
                changed || step.finished
            }
            _ => false,
        }
    }

    // --- observation -----------------------------------------------------

    /// Visible cells per line.
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    #[must_use]
    pub fn plan(&self) -> &GlobalPlan {
        &self.plan
    }

    /// Shared handle to the current plan. Survives later reconfiguration.
    #[must_use]
    pub fn plan_handle(&self) -> Arc<GlobalPlan> {
        Arc::clone(&self.plan)
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn remaining_repeats(&self) -> Repeat {
        self.remaining
    }

    #[must_use]
    pub fn runs_completed(&self) -> u64 {
        self.runs_completed
    }

    #[must_use]
    pub fn stale_wakes_dropped(&self) -> u64 {
        self.stale_dropped
    }

    /// Host time at which the current or last run began.
    #[must_use]
    pub fn run_started_at(&self) -> Option<Duration> {
        self.run_started_at
    }

    #[must_use]
    pub fn config(&self) -> &TypedTextConfig {
        &self.config
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.driver.strategy()
    }

    /// Callbacks the active driver still has registered with the host.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.driver.pending() + usize::from(self.repeat_timer.is_some())
    }

    /// Caret state of line `index`, or `None` past the last line.
    #[must_use]
    pub fn caret(&self, index: usize) -> Option<CaretState> {
        self.plan.caret_state(index, &self.counts)
    }

    /// Renderable view of line `index`, or `None` past the last line.
    #[must_use]
    pub fn line_view(&self, index: usize) -> Option<LineView> {
        typeline_core::line_view(&self.plan, index, &self.counts)
    }

    #[must_use]
    pub fn live_region(&self) -> LiveRegion {
        self.config.live_region
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.events.drain(..).collect()
    }

    // --- internals -------------------------------------------------------

    /// Cancel all outstanding callbacks and move to a new generation.
    fn invalidate(&mut self, host: &mut dyn Host) {
        self.driver.cancel(host);
        if let Some(handle) = self.repeat_timer.take() {
            host.clear(handle);
        }
        self.generation += 1;
    }

    fn launch(&mut self, host: &mut dyn Host) {
        self.launch_as(host, false);
    }

    fn launch_as(&mut self, host: &mut dyn Host, repeat: bool) {
        let now = host.now();
        self.phase = RunPhase::Running;
        self.run_started_at = Some(now);
        self.driver.launch(&self.plan, self.generation, host);
        self.diagnostics
            .run_started(self.generation, now, self.plan.total_chars());
        self.push_event(if repeat {
            ControllerEvent::Repeated {
                generation: self.generation,
            }
        } else {
            ControllerEvent::Started {
                generation: self.generation,
            }
        });
        tracing::debug!(
            generation = self.generation,
            strategy = %self.driver.strategy(),
            total_ms = self.plan.total_duration().as_millis() as u64,
            remaining = %self.remaining,
            repeat,
            "typed text run started"
        );
    }

    fn complete(&mut self, host: &mut dyn Host) {
        let now = host.now();
        self.runs_completed += 1;
        self.diagnostics.run_finished(self.generation, now);
        self.push_event(ControllerEvent::Completed {
            run: self.runs_completed,
        });
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }

        match self.remaining.consume() {
            Some(next) => {
                self.remaining = next;
                self.phase = RunPhase::WaitingToRepeat;
                let wake = Wake::new(self.generation, WakeKind::Repeat);
                self.repeat_timer = Some(host.set_timeout(self.config.repeat_delay, wake));
                self.push_event(ControllerEvent::RepeatScheduled { remaining: next });
                tracing::debug!(
                    generation = self.generation,
                    remaining = %next,
                    delay_ms = self.config.repeat_delay.as_millis() as u64,
                    "typed text repeat scheduled"
                );
            }
            None => {
                self.phase = RunPhase::Done;
                self.push_event(ControllerEvent::Done);
                tracing::debug!(
                    generation = self.generation,
                    runs = self.runs_completed,
                    "typed text done"
                );
            }
        }
    }

    fn zero_counts(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    fn push_event(&mut self, event: ControllerEvent) {
        if self.events.len() == MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

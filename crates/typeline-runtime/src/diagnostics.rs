#![forbid(unsafe_code)]

//! Diagnostics: an injectable sink for run timings and tick counts.
//!
//! A benchmarking harness can attach a [`BenchRecorder`] to each controller
//! it races and read the shared timings afterwards, without any ambient
//! global registry.
//!
//! # Invariants
//!
//! - A [`BenchRecorder`] holds at most [`MAX_RECORDED_RUNS`] runs. Older runs
//!   are evicted oldest first and only survive in the aggregate counters, so
//!   an unbounded repeat cannot grow memory without limit.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::host::Wake;

/// Observer of controller activity. All methods default to no-ops.
pub trait Diagnostics: fmt::Debug {
    /// A run began at host time `at`.
    fn run_started(&mut self, _generation: u64, _at: Duration, _total_chars: usize) {}

    /// Visible counts of run `generation` grew on the lines in `changed`.
    fn tick(
        &mut self,
        _generation: u64,
        _at: Duration,
        _changed: &[usize],
        _counts: &[usize],
    ) {
    }

    /// The run reached its completion time.
    fn run_finished(&mut self, _generation: u64, _at: Duration) {}

    /// A wake from a superseded run was dropped.
    fn stale_wake(&mut self, _wake: Wake) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}

/// Timings of one run, in host time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTimings {
    pub generation: u64,
    pub started_at: Duration,
    pub first_reveal_at: Option<Duration>,
    pub finished_at: Option<Duration>,
    pub total_chars: usize,
    /// Updates that changed at least one visible count.
    pub ticks: u64,
}

impl RunTimings {
    /// Start to completion, if the run completed.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.finished_at.map(|end| end.saturating_sub(self.started_at))
    }

    /// Start to first visible character.
    #[must_use]
    pub fn time_to_first_reveal(&self) -> Option<Duration> {
        self.first_reveal_at.map(|at| at.saturating_sub(self.started_at))
    }
}

/// Runs kept by a [`BenchRecorder`] before the oldest is evicted.
pub const MAX_RECORDED_RUNS: usize = 256;

#[derive(Debug, Default)]
struct Recorded {
    recent: VecDeque<RunTimings>,
    /// Runs started since construction, evicted ones included.
    started: u64,
    /// Runs that reached completion, evicted ones included.
    finished: u64,
    /// Count-changing updates across all runs.
    ticks: u64,
}

/// Records [`RunTimings`] for the most recent runs into shared storage.
///
/// Clones share the same storage, so keep one clone and hand another to the
/// controller.
#[derive(Debug, Clone, Default)]
pub struct BenchRecorder {
    runs: Arc<Mutex<Recorded>>,
    stale: Arc<AtomicU64>,
}

impl BenchRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the retained runs, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RunTimings> {
        self.lock().recent.iter().cloned().collect()
    }

    /// The most recent run.
    #[must_use]
    pub fn latest(&self) -> Option<RunTimings> {
        self.lock().recent.back().cloned()
    }

    /// Runs started since construction, including evicted ones.
    #[must_use]
    pub fn runs_started(&self) -> u64 {
        self.lock().started
    }

    /// Runs completed since construction, including evicted ones.
    #[must_use]
    pub fn runs_finished(&self) -> u64 {
        self.lock().finished
    }

    /// Count-changing updates across every run.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.lock().ticks
    }

    /// Stale wakes dropped across all runs.
    #[must_use]
    pub fn stale_wakes(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Recorded {
    fn run_mut(&mut self, generation: u64) -> Option<&mut RunTimings> {
        self.recent.iter_mut().rev().find(|r| r.generation == generation)
    }
}

impl Diagnostics for BenchRecorder {
    fn run_started(&mut self, generation: u64, at: Duration, total_chars: usize) {
        let mut runs = self.lock();
        if runs.recent.len() == MAX_RECORDED_RUNS {
            runs.recent.pop_front();
        }
        runs.recent.push_back(RunTimings {
            generation,
            started_at: at,
            total_chars,
            ..RunTimings::default()
        });
        runs.started += 1;
    }

    fn tick(&mut self, generation: u64, at: Duration, _changed: &[usize], _counts: &[usize]) {
        let mut runs = self.lock();
        let Some(run) = runs.run_mut(generation) else {
            return;
        };
        run.ticks += 1;
        run.first_reveal_at.get_or_insert(at);
        runs.ticks += 1;
    }

    fn run_finished(&mut self, generation: u64, at: Duration) {
        let mut runs = self.lock();
        let Some(run) = runs.run_mut(generation) else {
            return;
        };
        run.finished_at = Some(at);
        runs.finished += 1;
    }

    fn stale_wake(&mut self, _wake: Wake) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }
}

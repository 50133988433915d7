#![forbid(unsafe_code)]

//! Timeline compilation: absolute reveal timestamps for every line.
//!
//! [`GlobalPlan::compile`] runs the character-plan builder over each line
//! and lays the lines end to end on one clock measured from the run's start.
//!
//! # Invariants
//!
//! 1. Each line's `when` is non-decreasing and as long as its cells.
//! 2. Line 0 starts at `start_delay + line_delay.unwrap_or(0)`.
//! 3. Line N+1 starts at `end(N) + line_delay.unwrap_or(inter_line_delay)`.
//! 4. `end(i)` is the last `when` value, or `start(i)` for an empty line.
//! 5. `total_duration()` is the maximum end offset; zero for no lines.
//! 6. Compiling identical inputs yields an equal plan.
//!
//! # Failure Modes
//!
//! - Empty line list: empty plan with zero duration.
//! - Empty line: no cells, contributes its gap but no reveal time.

use std::time::Duration;

use crate::caret::{CaretState, CaretStyle, caret_visibility};
use crate::char_plan::{CharacterCell, build_char_plan};
use crate::grapheme::Segmenter;
use crate::line::LineDescriptor;

/// Global pacing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    #[cfg_attr(feature = "serde", serde(with = "crate::millis"))]
    pub ms_per_char: Duration,
    #[cfg_attr(feature = "serde", serde(with = "crate::millis"))]
    pub inter_line_delay: Duration,
    #[cfg_attr(feature = "serde", serde(with = "crate::millis"))]
    pub start_delay: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ms_per_char: Duration::from_millis(140),
            inter_line_delay: Duration::ZERO,
            start_delay: Duration::ZERO,
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn ms_per_char(mut self, ms: u64) -> Self {
        self.ms_per_char = Duration::from_millis(ms);
        self
    }

    #[must_use]
    pub fn inter_line_delay(mut self, ms: u64) -> Self {
        self.inter_line_delay = Duration::from_millis(ms);
        self
    }

    #[must_use]
    pub fn start_delay(mut self, ms: u64) -> Self {
        self.start_delay = Duration::from_millis(ms);
        self
    }
}

/// The compiled schedule of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePlan {
    cells: Vec<CharacterCell>,
    when: Vec<Duration>,
    start: Duration,
    keep_caret: bool,
    caret: CaretStyle,
    class: Option<String>,
}

impl LinePlan {
    #[must_use]
    pub fn cells(&self) -> &[CharacterCell] {
        &self.cells
    }

    /// `when[i]`: time since run start at which `cells[..=i]` are visible.
    #[must_use]
    pub fn when(&self) -> &[Duration] {
        &self.when
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Absolute start offset.
    #[must_use]
    pub fn start(&self) -> Duration {
        self.start
    }

    /// Absolute end offset.
    #[must_use]
    pub fn end(&self) -> Duration {
        self.when.last().copied().unwrap_or(self.start)
    }

    #[must_use]
    pub fn keep_caret(&self) -> bool {
        self.keep_caret
    }

    #[must_use]
    pub fn caret(&self) -> &CaretStyle {
        &self.caret
    }

    /// Wrapping style tag.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Number of cells visible at `elapsed`.
    #[must_use]
    pub fn visible_at(&self, elapsed: Duration) -> usize {
        self.when.partition_point(|&w| w <= elapsed)
    }
}

/// The full multi-line schedule. Immutable once compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalPlan {
    lines: Vec<LinePlan>,
    total: Duration,
}

impl GlobalPlan {
    /// Compile line descriptors into a plan.
    #[must_use]
    pub fn compile(
        lines: &[LineDescriptor],
        timing: &TimingConfig,
        caret: &CaretStyle,
        segmenter: Segmenter,
    ) -> Self {
        let mut plans = Vec::with_capacity(lines.len());
        let mut offset = timing.start_delay;
        let last = lines.len().saturating_sub(1);

        for (idx, line) in lines.iter().enumerate() {
            let gap = match (idx, line.line_delay) {
                (_, Some(own)) => own,
                (0, None) => Duration::ZERO,
                (_, None) => timing.inter_line_delay,
            };
            let start = offset.saturating_add(gap);
            let chars = build_char_plan(line, timing.ms_per_char, segmenter);

            let mut acc = start;
            let when: Vec<Duration> = chars
                .delays
                .iter()
                .map(|&d| {
                    acc = acc.saturating_add(d);
                    acc
                })
                .collect();

            let plan = LinePlan {
                cells: chars.cells,
                when,
                start,
                keep_caret: line.keep_caret.unwrap_or(idx == last),
                caret: caret.resolve(&line.caret),
                class: line.class.clone(),
            };
            offset = plan.end();
            plans.push(plan);
        }

        let total = plans
            .iter()
            .map(LinePlan::end)
            .max()
            .unwrap_or(Duration::ZERO);

        crate::logging::debug!(
            lines = plans.len(),
            total_ms = total.as_millis() as u64,
            "compiled typed-text timeline"
        );

        Self {
            lines: plans,
            total,
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[LinePlan] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, index: usize) -> Option<&LinePlan> {
        self.lines.get(index)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn start(&self, index: usize) -> Option<Duration> {
        self.lines.get(index).map(LinePlan::start)
    }

    #[must_use]
    pub fn end(&self, index: usize) -> Option<Duration> {
        self.lines.get(index).map(LinePlan::end)
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.total
    }

    /// Total reveal steps across all lines.
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.lines.iter().map(LinePlan::len).sum()
    }

    /// Cell count per line: the final visible-count vector of a run.
    #[must_use]
    pub fn lengths(&self) -> Vec<usize> {
        self.lines.iter().map(LinePlan::len).collect()
    }

    /// Visible-count vector at `elapsed` since run start.
    #[must_use]
    pub fn visible_counts_at(&self, elapsed: Duration) -> Vec<usize> {
        self.lines.iter().map(|l| l.visible_at(elapsed)).collect()
    }

    /// Caret state of line `index` given the current visible counts.
    ///
    /// Returns `None` when `index` is out of range.
    #[must_use]
    pub fn caret_state(&self, index: usize, counts: &[usize]) -> Option<CaretState> {
        let line = self.lines.get(index)?;
        let count = counts.get(index).copied().unwrap_or(0);
        let next_started = counts.get(index + 1).is_some_and(|&c| c > 0);
        Some(caret_visibility(
            count,
            line.len(),
            line.keep_caret,
            next_started,
            line.caret.blink_period,
        ))
    }
}

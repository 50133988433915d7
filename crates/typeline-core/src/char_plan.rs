#![forbid(unsafe_code)]

//! Character plans: one line's reveal units and per-character delays.
//!
//! [`build_char_plan`] flattens a line's styled runs into [`CharacterCell`]s
//! and assigns each cell the delay that elapses before it appears.
//!
//! # Invariants
//!
//! 1. `cells.len() == delays.len()`.
//! 2. Concatenating every cell's grapheme reproduces the flattened line text.
//! 3. `delays[i] == ms_per_char` plus every pause directive with `index == i + 1`.
//!
//! # Failure Modes
//!
//! - Pause at index 0 or past the last character: ignored.
//! - Several pauses at one index: their delays add up.

use std::time::Duration;

use crate::grapheme::Segmenter;
use crate::line::LineDescriptor;

/// One revealed unit: a grapheme with its style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCell {
    grapheme: Box<str>,
    bold: bool,
    color: Option<Box<str>>,
    class: Option<Box<str>>,
}

impl CharacterCell {
    /// A cell with no styling.
    #[must_use]
    pub fn plain(grapheme: &str) -> Self {
        Self {
            grapheme: grapheme.into(),
            bold: false,
            color: None,
            class: None,
        }
    }

    #[must_use]
    pub fn grapheme(&self) -> &str {
        &self.grapheme
    }

    #[must_use]
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Whether two cells render with identical style.
    #[must_use]
    pub fn same_style(&self, other: &Self) -> bool {
        self.bold == other.bold && self.color == other.color && self.class == other.class
    }
}

/// The cells of one line and the delay charged before each appears.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharPlan {
    pub cells: Vec<CharacterCell>,
    pub delays: Vec<Duration>,
}

impl CharPlan {
    /// Number of reveal steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.cells.len()
    }
}

/// Build the character plan for one line.
///
/// `default_ms_per_char` applies when the line carries no rate override.
#[must_use]
pub fn build_char_plan(
    line: &LineDescriptor,
    default_ms_per_char: Duration,
    segmenter: Segmenter,
) -> CharPlan {
    let mut cells = Vec::new();
    for run in line.text.runs() {
        let color: Option<Box<str>> = run.color.map(Into::into);
        let class: Option<Box<str>> = run.class.map(Into::into);
        cells.extend(segmenter.split(run.text).map(|g| CharacterCell {
            grapheme: g.into(),
            bold: run.bold,
            color: color.clone(),
            class: class.clone(),
        }));
    }

    let steps = cells.len();
    let per_char = line.ms_per_char.unwrap_or(default_ms_per_char);
    let mut delays = vec![per_char; steps];
    for pause in &line.pauses {
        // Charged to the preceding character: delays the appearance of `index`.
        if pause.index > 0 && pause.index <= steps {
            let slot = &mut delays[pause.index - 1];
            *slot = slot.saturating_add(pause.extra_delay);
        } else {
            crate::logging::trace!(
                index = pause.index,
                steps,
                "pause directive out of range, ignored"
            );
        }
    }

    CharPlan { cells, delays }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::TextSegment;

    const MS_100: Duration = Duration::from_millis(100);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn uniform_delays_without_pauses() {
        let plan = build_char_plan(&LineDescriptor::plain("Hi"), MS_100, Segmenter::Scalars);
        assert_eq!(plan.steps(), 2);
        assert_eq!(plan.delays, vec![MS_100, MS_100]);
    }

    #[test]
    fn pause_charged_to_preceding_character() {
        let line = LineDescriptor::plain("Hi").pause_at(1, 500);
        let plan = build_char_plan(&line, MS_100, Segmenter::Scalars);
        assert_eq!(plan.delays, vec![ms(600), MS_100]);
    }

    #[test]
    fn pause_at_end_delays_last_step() {
        let line = LineDescriptor::plain("Hi").pause_at(2, 50);
        let plan = build_char_plan(&line, MS_100, Segmenter::Scalars);
        assert_eq!(plan.delays, vec![MS_100, ms(150)]);
    }

    #[test]
    fn out_of_range_pauses_ignored() {
        let line = LineDescriptor::plain("Hi").pause_at(0, 500).pause_at(3, 500);
        let plan = build_char_plan(&line, MS_100, Segmenter::Scalars);
        assert_eq!(plan.delays, vec![MS_100, MS_100]);
    }

    #[test]
    fn pauses_on_same_index_accumulate() {
        let line = LineDescriptor::plain("abc").pause_at(2, 100).pause_at(2, 250);
        let plan = build_char_plan(&line, MS_100, Segmenter::Scalars);
        assert_eq!(plan.delays, vec![MS_100, ms(450), MS_100]);
    }

    #[test]
    fn unsorted_pauses_apply() {
        let line = LineDescriptor::plain("abc").pause_at(3, 10).pause_at(1, 20);
        let plan = build_char_plan(&line, MS_100, Segmenter::Scalars);
        assert_eq!(plan.delays, vec![ms(120), MS_100, ms(110)]);
    }

    #[test]
    fn line_rate_overrides_default() {
        let line = LineDescriptor::plain("ab").ms_per_char(30);
        let plan = build_char_plan(&line, MS_100, Segmenter::Scalars);
        assert_eq!(plan.delays, vec![ms(30), ms(30)]);
    }

    #[test]
    fn empty_line_has_empty_plan() {
        let line = LineDescriptor::plain("").pause_at(0, 100);
        let plan = build_char_plan(&line, MS_100, Segmenter::Scalars);
        assert!(plan.cells.is_empty());
        assert!(plan.delays.is_empty());
    }

    #[test]
    fn segments_preserve_style_per_cell() {
        let line = LineDescriptor::segments([
            TextSegment::new("a"),
            TextSegment::new("bc").bold().color("#22d3ee").class("accent"),
        ]);
        let plan = build_char_plan(&line, MS_100, Segmenter::Scalars);
        assert_eq!(plan.steps(), 3);
        assert!(!plan.cells[0].is_bold());
        assert!(plan.cells[1].is_bold());
        assert_eq!(plan.cells[2].color(), Some("#22d3ee"));
        assert_eq!(plan.cells[2].class(), Some("accent"));
        assert!(plan.cells[1].same_style(&plan.cells[2]));
        assert!(!plan.cells[0].same_style(&plan.cells[1]));
    }

    #[test]
    fn cells_concatenate_to_flattened_text() {
        let line = LineDescriptor::segments([
            TextSegment::new("na\u{ef}ve "),
            TextSegment::new("caf\u{e9}").bold(),
        ]);
        let plan = build_char_plan(&line, MS_100, Segmenter::detect());
        let joined: String = plan.cells.iter().map(CharacterCell::grapheme).collect();
        assert_eq!(joined, line.text.flattened());
    }
}

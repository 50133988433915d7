#![forbid(unsafe_code)]

//! View helpers for rendering sinks.
//!
//! Rendering is outside this crate; these helpers only turn "how many cells
//! are visible" into the minimal set of styled runs a sink has to draw.

use crate::caret::{CaretState, CaretStyle};
use crate::char_plan::CharacterCell;
use crate::timeline::GlobalPlan;

/// Non-breaking space used for visible ordinary spaces.
pub const NBSP: char = '\u{00A0}';

/// Adjacent visible cells sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub bold: bool,
    pub color: Option<String>,
    pub class: Option<String>,
}

/// Merge the first `count` cells into styled runs.
///
/// Ordinary spaces become [`NBSP`] so leading and trailing whitespace
/// survives layout. `count` past the end is clamped.
#[must_use]
pub fn visible_runs(cells: &[CharacterCell], count: usize) -> Vec<StyledRun> {
    let visible = &cells[..count.min(cells.len())];
    let mut runs: Vec<StyledRun> = Vec::new();
    let mut prev: Option<&CharacterCell> = None;

    for cell in visible {
        let text = if cell.grapheme() == " " {
            std::borrow::Cow::Owned(NBSP.to_string())
        } else {
            std::borrow::Cow::Borrowed(cell.grapheme())
        };
        match (prev, runs.last_mut()) {
            (Some(p), Some(run)) if p.same_style(cell) => run.text.push_str(&text),
            _ => runs.push(StyledRun {
                text: text.into_owned(),
                bold: cell.is_bold(),
                color: cell.color().map(str::to_owned),
                class: cell.class().map(str::to_owned),
            }),
        }
        prev = Some(cell);
    }
    runs
}

/// Everything a sink needs to draw one line at a given moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineView {
    pub runs: Vec<StyledRun>,
    pub caret: CaretState,
    /// Caret presentation with the line's overrides applied.
    pub caret_style: CaretStyle,
    /// Wrapping style tag of the line.
    pub class: Option<String>,
    pub visible: usize,
    pub len: usize,
}

impl LineView {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.visible >= self.len
    }

    /// Visible text with ordinary spaces as [`NBSP`].
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Build the view of line `index` for the visible-count vector `counts`.
///
/// Returns `None` when `index` is out of range.
#[must_use]
pub fn line_view(plan: &GlobalPlan, index: usize, counts: &[usize]) -> Option<LineView> {
    let line = plan.line(index)?;
    let caret = plan.caret_state(index, counts)?;
    let visible = counts.get(index).copied().unwrap_or(0).min(line.len());
    Some(LineView {
        runs: visible_runs(line.cells(), visible),
        caret,
        caret_style: line.caret().clone(),
        class: line.class().map(str::to_owned),
        visible,
        len: line.len(),
    })
}

/// Screen-reader announcement hint for the typed region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LiveRegion {
    #[default]
    Polite,
    Assertive,
    Off,
}

impl LiveRegion {
    /// The ARIA attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
            Self::Off => "off",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::char_plan::build_char_plan;
    use crate::grapheme::Segmenter;
    use crate::line::{LineDescriptor, TextSegment};
    use crate::timeline::TimingConfig;
    use std::time::Duration;

    fn cells(line: &LineDescriptor) -> Vec<CharacterCell> {
        build_char_plan(line, Duration::from_millis(10), Segmenter::Scalars).cells
    }

    #[test]
    fn nothing_visible_yields_no_runs() {
        assert!(visible_runs(&cells(&"abc".into()), 0).is_empty());
    }

    #[test]
    fn same_style_merges() {
        let runs = visible_runs(&cells(&"abc".into()), 2);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "ab");
    }

    #[test]
    fn style_change_splits_runs() {
        let line = LineDescriptor::segments([
            TextSegment::new("ab"),
            TextSegment::new("cd").bold().color("#22d3ee"),
            TextSegment::new("e"),
        ]);
        let runs = visible_runs(&cells(&line), 5);
        let texts: Vec<_> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["ab", "cd", "e"]);
        assert!(runs[1].bold);
        assert_eq!(runs[1].color.as_deref(), Some("#22d3ee"));
    }

    #[test]
    fn spaces_become_nbsp() {
        let runs = visible_runs(&cells(&"a b ".into()), 4);
        assert_eq!(runs[0].text, "a\u{a0}b\u{a0}");
    }

    #[test]
    fn count_is_clamped() {
        let runs = visible_runs(&cells(&"ab".into()), 99);
        assert_eq!(runs[0].text, "ab");
    }

    fn two_line_plan() -> GlobalPlan {
        GlobalPlan::compile(
            &[
                LineDescriptor::plain("Hi").class("title").caret_color("red"),
                LineDescriptor::plain("ok"),
            ],
            &TimingConfig::default().ms_per_char(100),
            &CaretStyle::default(),
            Segmenter::Scalars,
        )
    }

    #[test]
    fn line_view_reports_partial_line() {
        let plan = two_line_plan();
        let view = line_view(&plan, 0, &[1, 0]).expect("line 0 exists");
        assert_eq!(view.text(), "H");
        assert!(!view.is_complete());
        assert!(view.caret.is_visible());
        assert_eq!(view.class.as_deref(), Some("title"));
        assert_eq!(view.caret_style.color.as_deref(), Some("red"));
    }

    #[test]
    fn line_view_hides_caret_of_finished_line() {
        let plan = two_line_plan();
        let first = line_view(&plan, 0, &[2, 1]).expect("line 0 exists");
        assert!(first.is_complete());
        assert_eq!(first.caret, CaretState::Hidden);

        let last = line_view(&plan, 1, &[2, 2]).expect("line 1 exists");
        assert!(last.caret.is_visible());
    }

    #[test]
    fn line_view_out_of_range() {
        assert!(line_view(&two_line_plan(), 2, &[0, 0]).is_none());
    }

    #[test]
    fn live_region_strings() {
        assert_eq!(LiveRegion::default().as_str(), "polite");
        assert_eq!(LiveRegion::Assertive.as_str(), "assertive");
        assert_eq!(LiveRegion::Off.as_str(), "off");
    }
}

#![forbid(unsafe_code)]

//! Caret presentation and the visibility rule consumed by renderers.

use std::time::Duration;

use crate::line::CaretOverrides;

/// Resolved caret presentation for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CaretStyle {
    pub width_px: u16,
    #[cfg_attr(feature = "serde", serde(rename = "blink_ms", with = "crate::millis"))]
    pub blink_period: Duration,
    /// Trim applied to the caret's top and bottom.
    pub inset_px: u16,
    /// Gap between the last glyph and the caret.
    pub gap_px: u16,
    /// `None` means the current text color.
    pub color: Option<String>,
    pub class: Option<String>,
}

impl Default for CaretStyle {
    fn default() -> Self {
        Self {
            width_px: 10,
            blink_period: Duration::from_millis(1000),
            inset_px: 5,
            gap_px: 0,
            color: None,
            class: None,
        }
    }
}

impl CaretStyle {
    #[must_use]
    pub fn width_px(mut self, width: u16) -> Self {
        self.width_px = width;
        self
    }

    #[must_use]
    pub fn blink_ms(mut self, ms: u64) -> Self {
        self.blink_period = Duration::from_millis(ms);
        self
    }

    #[must_use]
    pub fn inset_px(mut self, inset: u16) -> Self {
        self.inset_px = inset;
        self
    }

    #[must_use]
    pub fn gap_px(mut self, gap: u16) -> Self {
        self.gap_px = gap;
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Apply a line's overrides on top of these defaults.
    #[must_use]
    pub fn resolve(&self, overrides: &CaretOverrides) -> Self {
        Self {
            color: overrides.color.clone().or_else(|| self.color.clone()),
            class: overrides.class.clone().or_else(|| self.class.clone()),
            ..self.clone()
        }
    }
}

/// What the renderer should draw for a line's caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretState {
    Hidden,
    Blinking { period: Duration },
}

impl CaretState {
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Blinking { .. })
    }
}

/// Caret visibility for one line.
///
/// Hidden before the line starts. Hidden once the line is fully shown, the
/// line does not keep its caret, and the next line has started. Otherwise
/// visible and blinking at `blink_period`.
#[must_use]
pub fn caret_visibility(
    count: usize,
    len: usize,
    keep_caret: bool,
    next_line_started: bool,
    blink_period: Duration,
) -> CaretState {
    let started = count > 0;
    let done = count >= len;
    if !started || (done && !keep_caret && next_line_started) {
        CaretState::Hidden
    } else {
        CaretState::Blinking {
            period: blink_period,
        }
    }
}

#![forbid(unsafe_code)]

//! Controller configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use typeline_core::{
    CaretStyle, GlobalPlan, LineDescriptor, LiveRegion, Segmenter, TimingConfig,
};

use crate::driver::Strategy;

/// How many extra runs follow the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repeat {
    Times(u32),
    Unbounded,
}

impl Default for Repeat {
    fn default() -> Self {
        Self::Times(0)
    }
}

impl From<u32> for Repeat {
    fn from(times: u32) -> Self {
        Self::Times(times)
    }
}

impl Repeat {
    /// The budget left after spending one repeat, or `None` when exhausted.
    #[must_use]
    pub const fn consume(self) -> Option<Self> {
        match self {
            Self::Unbounded => Some(Self::Unbounded),
            Self::Times(0) => None,
            Self::Times(n) => Some(Self::Times(n - 1)),
        }
    }

    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        matches!(self, Self::Times(0))
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Times(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Error returned when a repeat count cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRepeatError {
    input: String,
}

impl fmt::Display for ParseRepeatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid repeat count {:?}: expected a non-negative integer or \"unbounded\"",
            self.input
        )
    }
}

impl std::error::Error for ParseRepeatError {}

impl FromStr for Repeat {
    type Err = ParseRepeatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("unbounded") || trimmed.eq_ignore_ascii_case("infinite") {
            return Ok(Self::Unbounded);
        }
        trimmed.parse::<u32>().map(Self::Times).map_err(|_| ParseRepeatError {
            input: s.to_owned(),
        })
    }
}

/// Everything a [`RunController`](crate::controller::RunController) needs
/// besides its completion callback and diagnostics sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedTextConfig {
    pub lines: Vec<LineDescriptor>,
    pub timing: TimingConfig,
    /// Global caret presentation; lines override color and class.
    pub caret: CaretStyle,
    pub repeat: Repeat,
    pub repeat_delay: Duration,
    /// Start a run on mount and whenever the plan changes.
    pub autoplay: bool,
    pub live_region: LiveRegion,
    pub strategy: Strategy,
    pub segmenter: Segmenter,
}

impl Default for TypedTextConfig {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            timing: TimingConfig::default(),
            caret: CaretStyle::default(),
            repeat: Repeat::default(),
            repeat_delay: Duration::from_millis(1000),
            autoplay: true,
            live_region: LiveRegion::default(),
            strategy: Strategy::default(),
            segmenter: Segmenter::detect(),
        }
    }
}

impl TypedTextConfig {
    #[must_use]
    pub fn new(lines: impl IntoIterator<Item = impl Into<LineDescriptor>>) -> Self {
        Self::default().lines(lines)
    }

    /// Replace all lines.
    #[must_use]
    pub fn lines(mut self, lines: impl IntoIterator<Item = impl Into<LineDescriptor>>) -> Self {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Append one line.
    #[must_use]
    pub fn line(mut self, line: impl Into<LineDescriptor>) -> Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn caret(mut self, caret: CaretStyle) -> Self {
        self.caret = caret;
        self
    }

    #[must_use]
    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    #[must_use]
    pub fn repeat_delay(mut self, ms: u64) -> Self {
        self.repeat_delay = Duration::from_millis(ms);
        self
    }

    #[must_use]
    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    #[must_use]
    pub fn live_region(mut self, live_region: LiveRegion) -> Self {
        self.live_region = live_region;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Compile the lines into a plan.
    #[must_use]
    pub fn compile(&self) -> GlobalPlan {
        GlobalPlan::compile(&self.lines, &self.timing, &self.caret, self.segmenter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_parses_numbers_and_unbounded() {
        assert_eq!("3".parse::<Repeat>(), Ok(Repeat::Times(3)));
        assert_eq!(" 0 ".parse::<Repeat>(), Ok(Repeat::Times(0)));
        assert_eq!("unbounded".parse::<Repeat>(), Ok(Repeat::Unbounded));
        assert_eq!("Infinite".parse::<Repeat>(), Ok(Repeat::Unbounded));
    }

    #[test]
    fn repeat_rejects_garbage() {
        let err = "-1".parse::<Repeat>().unwrap_err();
        assert!(err.to_string().contains("\"-1\""));
        assert!("often".parse::<Repeat>().is_err());
    }

    #[test]
    fn repeat_consume_counts_down() {
        assert_eq!(Repeat::Times(2).consume(), Some(Repeat::Times(1)));
        assert_eq!(Repeat::Times(1).consume(), Some(Repeat::Times(0)));
        assert_eq!(Repeat::Times(0).consume(), None);
        assert_eq!(Repeat::Unbounded.consume(), Some(Repeat::Unbounded));
        assert!(Repeat::Times(0).is_exhausted());
        assert!(!Repeat::Unbounded.is_exhausted());
    }

    #[test]
    fn repeat_display_round_trips() {
        for repeat in [Repeat::Times(4), Repeat::Unbounded] {
            assert_eq!(repeat.to_string().parse::<Repeat>(), Ok(repeat));
        }
    }

    #[test]
    fn defaults() {
        let config = TypedTextConfig::default();
        assert!(config.lines.is_empty());
        assert_eq!(config.timing.ms_per_char, Duration::from_millis(140));
        assert_eq!(config.repeat, Repeat::Times(0));
        assert_eq!(config.repeat_delay, Duration::from_millis(1000));
        assert!(config.autoplay);
        assert_eq!(config.live_region, LiveRegion::Polite);
        assert_eq!(config.strategy, Strategy::Frames);
    }

    #[test]
    fn builder_collects_lines() {
        let config = TypedTextConfig::new(["a", "b"]).line("c").repeat(Repeat::Times(2));
        assert_eq!(config.lines.len(), 3);
        assert_eq!(config.repeat, Repeat::Times(2));
        assert_eq!(config.compile().line_count(), 3);
    }
}

#![forbid(unsafe_code)]

//! Line descriptors: what a typed line says and how it is paced.
//!
//! A [`LineDescriptor`] is the input unit of the timeline. It carries either
//! plain text or styled [`TextSegment`]s, optional pacing overrides, pause
//! points, and caret presentation overrides.

use std::time::Duration;

/// A styled piece of text inside a line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextSegment {
    pub text: String,
    pub bold: bool,
    /// Explicit color, e.g. `"#22d3ee"` or `"cadetblue"`.
    pub color: Option<String>,
    /// Style-class tag forwarded to the rendering sink.
    pub class: Option<String>,
}

impl TextSegment {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

/// The text content of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineText {
    /// Unstyled text; one run with no bold, color or class.
    Plain(String),
    /// Ordered styled segments.
    Segments(Vec<TextSegment>),
}

impl Default for LineText {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl LineText {
    /// Iterate the styled runs of this text. Plain text yields one unstyled run.
    pub fn runs(&self) -> impl Iterator<Item = RunRef<'_>> {
        let (plain, segments) = match self {
            Self::Plain(text) => (Some(text.as_str()), &[][..]),
            Self::Segments(segments) => (None, segments.as_slice()),
        };
        plain
            .map(|text| RunRef {
                text,
                bold: false,
                color: None,
                class: None,
            })
            .into_iter()
            .chain(segments.iter().map(|s| RunRef {
                text: &s.text,
                bold: s.bold,
                color: s.color.as_deref(),
                class: s.class.as_deref(),
            }))
    }

    /// The flattened text, segments concatenated in order.
    #[must_use]
    pub fn flattened(&self) -> String {
        self.runs().map(|r| r.text).collect()
    }
}

/// Borrowed view of one styled run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRef<'a> {
    pub text: &'a str,
    pub bold: bool,
    pub color: Option<&'a str>,
    pub class: Option<&'a str>,
}

/// Extra delay inserted before the character at `index` appears.
///
/// `index` is a zero-based position in the flattened character sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PauseDirective {
    pub index: usize,
    #[cfg_attr(feature = "serde", serde(rename = "delay_ms", with = "crate::millis"))]
    pub extra_delay: Duration,
}

impl PauseDirective {
    #[must_use]
    pub const fn new(index: usize, extra_delay: Duration) -> Self {
        Self { index, extra_delay }
    }

    #[must_use]
    pub const fn millis(index: usize, extra_ms: u64) -> Self {
        Self::new(index, Duration::from_millis(extra_ms))
    }
}

/// Per-line caret presentation overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CaretOverrides {
    pub color: Option<String>,
    pub class: Option<String>,
}

/// One animated line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineDescriptor {
    pub text: LineText,
    /// Per-line pacing; falls back to the global rate.
    #[cfg_attr(feature = "serde", serde(with = "crate::millis::option"))]
    pub ms_per_char: Option<Duration>,
    /// Gap before this line starts. For the first line it is added to the
    /// start delay; for later lines it replaces the global inter-line delay.
    #[cfg_attr(feature = "serde", serde(with = "crate::millis::option"))]
    pub line_delay: Option<Duration>,
    /// Keep the caret after the line finishes. Defaults to true on the last line only.
    pub keep_caret: Option<bool>,
    pub caret: CaretOverrides,
    pub pauses: Vec<PauseDirective>,
    /// Wrapping style tag for the line container.
    pub class: Option<String>,
}

impl LineDescriptor {
    /// A line of plain text.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: LineText::Plain(text.into()),
            ..Self::default()
        }
    }

    /// A line built from styled segments.
    #[must_use]
    pub fn segments(segments: impl IntoIterator<Item = TextSegment>) -> Self {
        Self {
            text: LineText::Segments(segments.into_iter().collect()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ms_per_char(mut self, ms: u64) -> Self {
        self.ms_per_char = Some(Duration::from_millis(ms));
        self
    }

    #[must_use]
    pub fn line_delay(mut self, ms: u64) -> Self {
        self.line_delay = Some(Duration::from_millis(ms));
        self
    }

    #[must_use]
    pub fn keep_caret(mut self, keep: bool) -> Self {
        self.keep_caret = Some(keep);
        self
    }

    #[must_use]
    pub fn caret_color(mut self, color: impl Into<String>) -> Self {
        self.caret.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn caret_class(mut self, class: impl Into<String>) -> Self {
        self.caret.class = Some(class.into());
        self
    }

    /// Add a pause of `extra_ms` before the character at `index`.
    #[must_use]
    pub fn pause_at(mut self, index: usize, extra_ms: u64) -> Self {
        self.pauses.push(PauseDirective::millis(index, extra_ms));
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl From<&str> for LineDescriptor {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for LineDescriptor {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

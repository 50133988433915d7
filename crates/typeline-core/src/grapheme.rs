#![forbid(unsafe_code)]

//! Grapheme splitting: the unit of one reveal step.
//!
//! A typed line advances one user-perceived character at a time, so an
//! emoji with modifiers or a letter with combining marks must count as a
//! single step. [`Segmenter`] yields those units lazily.
//!
//! # Invariants
//!
//! 1. Concatenating every item of [`Segmenter::split`] reproduces the input.
//! 2. The iterator is `Clone`, so a split can be restarted from any point.
//! 3. The empty string yields no items.
//!
//! # Failure Modes
//!
//! - Built without the `grapheme-clusters` feature: [`Segmenter::detect`]
//!   returns [`Segmenter::Scalars`] and logs the degraded mode once. Step
//!   counts then differ from cluster-aware builds for composed characters.

use std::str::CharIndices;
use std::sync::Once;

#[cfg(feature = "grapheme-clusters")]
use unicode_segmentation::UnicodeSegmentation;

static DEGRADED_NOTICE: Once = Once::new();

/// How a line's text is broken into reveal steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segmenter {
    /// Extended grapheme clusters (UAX #29).
    Graphemes,
    /// One step per Unicode scalar value.
    Scalars,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::detect()
    }
}

impl Segmenter {
    /// The best segmenter this build supports.
    #[must_use]
    pub fn detect() -> Self {
        if cfg!(feature = "grapheme-clusters") {
            Self::Graphemes
        } else {
            DEGRADED_NOTICE.call_once(|| {
                crate::logging::warn!(
                    "grapheme cluster segmentation unavailable; reveal steps fall back to code points"
                );
            });
            Self::Scalars
        }
    }

    /// Whether this segmenter is the code-point fallback.
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::Scalars)
    }

    /// Lazily split `text` into reveal units.
    #[must_use]
    pub fn split(self, text: &str) -> GraphemeIter<'_> {
        let inner = match self {
            #[cfg(feature = "grapheme-clusters")]
            Self::Graphemes => Inner::Clusters(text.graphemes(true)),
            #[cfg(not(feature = "grapheme-clusters"))]
            Self::Graphemes => Inner::Scalars(text, text.char_indices()),
            Self::Scalars => Inner::Scalars(text, text.char_indices()),
        };
        GraphemeIter { inner }
    }

    /// Number of reveal units in `text`.
    #[must_use]
    pub fn count(self, text: &str) -> usize {
        self.split(text).count()
    }
}

/// Iterator over the reveal units of a string.
#[derive(Debug, Clone)]
pub struct GraphemeIter<'a> {
    inner: Inner<'a>,
}

#[derive(Debug, Clone)]
enum Inner<'a> {
    #[cfg(feature = "grapheme-clusters")]
    Clusters(unicode_segmentation::Graphemes<'a>),
    Scalars(&'a str, CharIndices<'a>),
}

impl<'a> Iterator for GraphemeIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            #[cfg(feature = "grapheme-clusters")]
            Inner::Clusters(it) => it.next(),
            Inner::Scalars(text, it) => {
                let (start, ch) = it.next()?;
                Some(&text[start..start + ch.len_utf8()])
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            #[cfg(feature = "grapheme-clusters")]
            Inner::Clusters(it) => it.size_hint(),
            Inner::Scalars(_, it) => it.size_hint(),
        }
    }
}

impl std::iter::FusedIterator for GraphemeIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_splits_per_byte() {
        let parts: Vec<_> = Segmenter::Scalars.split("Hi!").collect();
        assert_eq!(parts, vec!["H", "i", "!"]);
    }

    #[test]
    fn empty_yields_nothing() {
        assert_eq!(Segmenter::detect().split("").count(), 0);
        assert_eq!(Segmenter::Scalars.split("").count(), 0);
    }

    #[test]
    fn scalars_concatenate_back() {
        let text = "e\u{301}t\u{e9} \u{1F44B}\u{1F3FD}";
        let joined: String = Segmenter::Scalars.split(text).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn scalars_count_code_points() {
        // "e" + combining acute is two code points.
        assert_eq!(Segmenter::Scalars.count("e\u{301}"), 2);
    }

    #[test]
    fn iterator_restarts_from_clone() {
        let mut it = Segmenter::detect().split("abc");
        assert_eq!(it.next(), Some("a"));
        let rest = it.clone();
        assert_eq!(it.collect::<String>(), "bc");
        assert_eq!(rest.collect::<String>(), "bc");
    }

    #[cfg(feature = "grapheme-clusters")]
    mod clusters {
        use super::*;

        #[test]
        fn detect_prefers_clusters() {
            assert_eq!(Segmenter::detect(), Segmenter::Graphemes);
            assert!(!Segmenter::detect().is_degraded());
        }

        #[test]
        fn combining_mark_is_one_step() {
            assert_eq!(Segmenter::Graphemes.count("e\u{301}"), 1);
        }

        #[test]
        fn emoji_with_skin_tone_is_one_step() {
            let parts: Vec<_> = Segmenter::Graphemes.split("\u{1F44B}\u{1F3FD}!").collect();
            assert_eq!(parts, vec!["\u{1F44B}\u{1F3FD}", "!"]);
        }

        #[test]
        fn zwj_family_is_one_step() {
            let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
            assert_eq!(Segmenter::Graphemes.count(family), 1);
        }

        #[test]
        fn flag_pair_is_one_step() {
            assert_eq!(Segmenter::Graphemes.count("\u{1F1FA}\u{1F1F8}"), 1);
        }
    }
}

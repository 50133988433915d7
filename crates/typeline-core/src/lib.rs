#![forbid(unsafe_code)]

//! Core: reveal units, character plans, and timeline compilation for
//! typed-text animations.
//!
//! Everything here is pure data. Scheduling against a clock lives in
//! `typeline-runtime`.

pub mod caret;
pub mod char_plan;
pub mod grapheme;
pub mod line;
pub mod logging;
pub mod timeline;
pub mod view;

#[cfg(feature = "serde")]
mod millis;

pub use caret::{CaretState, CaretStyle, caret_visibility};
pub use char_plan::{CharPlan, CharacterCell, build_char_plan};
pub use grapheme::{GraphemeIter, Segmenter};
pub use line::{CaretOverrides, LineDescriptor, LineText, PauseDirective, TextSegment};
pub use timeline::{GlobalPlan, LinePlan, TimingConfig};
pub use view::{LineView, LiveRegion, StyledRun, line_view, visible_runs};

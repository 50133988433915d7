#![forbid(unsafe_code)]

//! Typeline public facade crate.
//!
//! Re-exports the plan types from `typeline-core` and, with the default
//! `runtime` feature, the controller and hosts from `typeline-runtime`.
//!
//! ```ignore
//! use typeline::prelude::*;
//!
//! let config = TypedTextConfig::new(["Hello,", "world"])
//!     .timing(TimingConfig::default().ms_per_char(80))
//!     .repeat(Repeat::Times(1));
//! let mut host = SimHost::new();
//! let mut ctl = RunController::new(config);
//! ctl.mount(&mut host);
//! host.run_until_settled(&mut ctl, Duration::from_secs(60));
//! assert_eq!(ctl.phase(), RunPhase::Done);
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use typeline_core::{
    CaretOverrides, CaretState, CaretStyle, CharPlan, CharacterCell, GlobalPlan, LineDescriptor,
    LinePlan, LineText, LineView, LiveRegion, PauseDirective, Segmenter, StyledRun, TextSegment,
    TimingConfig, build_char_plan, caret_visibility, line_view, visible_runs,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use typeline_runtime::{
    BenchRecorder, ClockHost, ControllerEvent, Diagnostics, Host, ParseRepeatError, Repeat,
    RunController, RunPhase, RunTimings, SimHost, Strategy, TypedTextConfig, Wake, WakeKind,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for typeline APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A repeat count string was neither an integer nor "unbounded".
    #[cfg(feature = "runtime")]
    Repeat(ParseRepeatError),
    /// A strategy name was not recognized.
    UnknownStrategy(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "runtime")]
            Self::Repeat(err) => write!(f, "{err}"),
            Self::UnknownStrategy(name) => {
                write!(f, "unknown strategy {name:?}: expected \"timers\" or \"frames\"")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "runtime")]
            Self::Repeat(err) => Some(err),
            Self::UnknownStrategy(_) => None,
        }
    }
}

#[cfg(feature = "runtime")]
impl From<ParseRepeatError> for Error {
    fn from(err: ParseRepeatError) -> Self {
        Self::Repeat(err)
    }
}

/// Standard result type for typeline APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Parse a strategy name as used in configuration files and benchmarks.
#[cfg(feature = "runtime")]
pub fn parse_strategy(name: &str) -> Result<Strategy> {
    match name.trim().to_ascii_lowercase().as_str() {
        "timers" | "timer" | "discrete" => Ok(Strategy::Timers),
        "frames" | "frame" | "raf" | "continuous" => Ok(Strategy::Frames),
        _ => Err(Error::UnknownStrategy(name.to_owned())),
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CaretState, CaretStyle, Error, GlobalPlan, LineDescriptor, LiveRegion, Result,
        TextSegment, TimingConfig,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        ClockHost, ControllerEvent, Host, Repeat, RunController, RunPhase, SimHost, Strategy,
        TypedTextConfig,
    };

    pub use std::time::Duration;

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use typeline_core as core;
#[cfg(feature = "runtime")]
pub use typeline_runtime as runtime;

#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports the tracing macros used by this crate when the `tracing`
//! feature is enabled. Without it, the same macro names expand to nothing so
//! call sites compile unchanged.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, trace, warn};

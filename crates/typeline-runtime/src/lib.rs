#![forbid(unsafe_code)]

//! Typeline Runtime
//!
//! Drives a compiled [`GlobalPlan`](typeline_core::GlobalPlan) against a
//! clock and exposes the imperative control surface of a typed-text effect.
//!
//! # Key Components
//!
//! - [`RunController`] - State machine owning visible counts and repeats
//! - [`Host`] - Clock, one-shot timers, and frame callbacks from the embedder
//! - [`ScheduleDriver`] - Per-character timers ([`TimerDriver`]) or
//!   per-refresh polling ([`FrameDriver`])
//! - [`SimHost`] - Deterministic virtual-clock host for tests and benches
//! - [`ClockHost`] - Wall-clock host that sleeps between deadlines
//! - [`Diagnostics`] - Injectable sink for run timings
//!
//! # How it fits together
//! The controller never owns a thread. Operations such as `start` only
//! register wakes with the host; the embedder later hands each due wake back
//! through [`RunController::on_wake`] and re-reads the visible counts.

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod driver;
pub mod host;
pub mod queue;
pub mod realtime;
pub mod simulator;

pub use config::{ParseRepeatError, Repeat, TypedTextConfig};
pub use controller::{ControllerEvent, RunController, RunPhase};
pub use diagnostics::{BenchRecorder, Diagnostics, MAX_RECORDED_RUNS, NoopDiagnostics, RunTimings};
pub use driver::{
    COMPLETION_EPSILON, DriverStep, FrameDriver, ScheduleDriver, Strategy, TimerDriver,
    completion_at,
};
pub use host::{DEFAULT_FRAME_INTERVAL, Host, TimerHandle, Wake, WakeKind};
pub use queue::TimerQueue;
pub use realtime::ClockHost;
pub use simulator::SimHost;

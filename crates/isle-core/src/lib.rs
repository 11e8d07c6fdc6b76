//! World clock, day cycle, and engine orchestration for the island simulation.
//!
//! This crate owns the [`WorldEngine`]: the single object holding all
//! mutable island state, the day rollover that refreshes it, and the
//! validated mutation operations agents invoke.
//!
//! # Modules
//!
//! - [`clock`] -- Day counter, market-cycle position, and calendar date.
//! - [`config`] -- Configuration loading from `isle-config.yaml` into
//!   strongly-typed structs.
//! - [`decision`] -- [`DecisionSource`] trait, [`IdleDecisionSource`], and
//!   [`ScriptedDecisionSource`].
//! - [`engine`] -- [`WorldEngine`], its errors, and [`DaySummary`].
//! - [`runner`] -- [`run_days`], the bounded day loop.
//!
//! [`DecisionSource`]: decision::DecisionSource
//! [`IdleDecisionSource`]: decision::IdleDecisionSource
//! [`ScriptedDecisionSource`]: decision::ScriptedDecisionSource

pub mod clock;
pub mod config;
pub mod decision;
pub mod engine;
pub mod runner;

pub use clock::{ClockError, WorldClock};
pub use config::{ConfigError, LogFormat, SimulationConfig};
pub use decision::{DecisionError, DecisionSource, IdleDecisionSource, ScriptedDecisionSource};
pub use engine::{ActionError, DaySummary, EngineError, WorldEngine};
pub use runner::{RunSummary, RunnerError, run_days};

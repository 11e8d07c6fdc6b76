//! Bounded day loop.
//!
//! [`run_days`] drives the engine: advance one day, show the decision source
//! a snapshot, apply the returned actions in order. Rejected actions are
//! logged and counted; only engine and decision-source failures stop the
//! run.

use tracing::{debug, info, warn};

use crate::decision::{DecisionError, DecisionSource};
use crate::engine::{DaySummary, EngineError, WorldEngine};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The engine failed to advance.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },

    /// The decision source failed.
    #[error("decision error: {source}")]
    Decision {
        /// The underlying decision error.
        #[from]
        source: DecisionError,
    },
}

/// Result of a bounded run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Days advanced during this run.
    pub days_run: u64,
    /// Day number at the end of the run.
    pub final_day: u64,
    /// Actions applied successfully.
    pub actions_applied: u64,
    /// Actions rejected by the engine.
    pub actions_rejected: u64,
    /// Population at the end of the run.
    pub population: usize,
    /// Summary of the last day, if any day ran.
    pub last_day: Option<DaySummary>,
    /// Bells held by all agents together.
    pub total_bells: u64,
    /// Miles held by all agents together.
    pub total_miles: u64,
}

/// Advance `engine` by `days` days, applying the decisions of `source`.
///
/// # Errors
///
/// Returns [`RunnerError`] if the day rollover or the decision source fails.
pub fn run_days(
    engine: &mut WorldEngine,
    days: u64,
    source: &mut dyn DecisionSource,
) -> Result<RunSummary, RunnerError> {
    info!(days, start_day = engine.day(), "simulation starting");

    let mut last_day = None;
    let mut days_run: u64 = 0;
    let mut actions_applied: u64 = 0;
    let mut actions_rejected: u64 = 0;

    for _ in 0..days {
        let summary = engine.advance_day()?;
        let snapshot = engine.snapshot();
        let actions = source.decide(&snapshot)?;
        for action in &actions {
            match engine.apply(action) {
                Ok(_) => actions_applied = actions_applied.saturating_add(1),
                Err(err) => {
                    actions_rejected = actions_rejected.saturating_add(1);
                    debug!(
                        day = summary.day,
                        agent = %action.actor(),
                        action = action.label(),
                        %err,
                        "action rejected"
                    );
                }
            }
        }
        days_run = days_run.saturating_add(1);
        last_day = Some(summary);
    }

    let result = RunSummary {
        days_run,
        final_day: engine.day(),
        actions_applied,
        actions_rejected,
        population: engine.population(),
        last_day,
        total_bells: engine
            .agents()
            .fold(0_u64, |sum, a| sum.saturating_add(a.bells())),
        total_miles: engine
            .agents()
            .fold(0_u64, |sum, a| sum.saturating_add(a.miles())),
    };
    log_run_end(&result);
    Ok(result)
}

/// Log the end-of-run summary.
pub fn log_run_end(result: &RunSummary) {
    info!(
        days_run = result.days_run,
        final_day = result.final_day,
        population = result.population,
        actions_applied = result.actions_applied,
        actions_rejected = result.actions_rejected,
        total_bells = result.total_bells,
        total_miles = result.total_miles,
        "simulation ended"
    );
    if result.last_day.is_none() {
        warn!("simulation ended with no days advanced");
    }
}

//! Decision source trait and simple implementations.
//!
//! Each day the runner shows the decision source a [`WorldSnapshot`] and
//! applies the [`AgentAction`] values it returns, in order. The
//! [`DecisionSource`] trait abstracts where those actions come from: a
//! scripted plan, a policy, a human, or nothing at all.
//!
//! [`IdleDecisionSource`] never acts, which lets the day cycle run
//! end-to-end on its own. [`ScriptedDecisionSource`] replays fixed actions
//! on fixed days.

use std::collections::BTreeMap;

use isle_types::{AgentAction, WorldSnapshot};

/// Errors that can occur during the decision phase.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// An internal error in the decision source.
    #[error("decision source error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// A source of agent decisions.
pub trait DecisionSource {
    /// Produce the actions to apply on the snapshot's day.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError`] if the decision process fails entirely.
    /// The runner stops on such an error.
    fn decide(&mut self, snapshot: &WorldSnapshot) -> Result<Vec<AgentAction>, DecisionError>;
}

/// A decision source that never acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleDecisionSource;

impl IdleDecisionSource {
    /// Create a new idle decision source.
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionSource for IdleDecisionSource {
    fn decide(&mut self, _snapshot: &WorldSnapshot) -> Result<Vec<AgentAction>, DecisionError> {
        Ok(Vec::new())
    }
}

/// A decision source that replays actions planned for specific days.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisionSource {
    plan: BTreeMap<u64, Vec<AgentAction>>,
}

impl ScriptedDecisionSource {
    /// Create an empty script.
    pub const fn new() -> Self {
        Self {
            plan: BTreeMap::new(),
        }
    }

    /// Queue `action` for `day`, after any actions already queued for it.
    #[must_use]
    pub fn on_day(mut self, day: u64, action: AgentAction) -> Self {
        self.plan.entry(day).or_default().push(action);
        self
    }

    /// Days that still have queued actions.
    pub fn pending_days(&self) -> usize {
        self.plan.len()
    }
}

impl DecisionSource for ScriptedDecisionSource {
    fn decide(&mut self, snapshot: &WorldSnapshot) -> Result<Vec<AgentAction>, DecisionError> {
        Ok(self.plan.remove(&snapshot.day).unwrap_or_default())
    }
}

//! Error types for the isle-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Every error is raised before any state is touched, so a failed call
//! leaves the roster exactly as it was.

use isle_types::{AgentName, ItemId};

/// Errors that can occur during agent state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// Attempted to remove more of an item than the agent holds.
    #[error("insufficient inventory: wanted {requested} of {item} but only have {available}")]
    InsufficientInventory {
        /// The item being removed.
        item: ItemId,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity the agent actually holds.
        available: u32,
    },

    /// The agent cannot afford a purchase.
    #[error("insufficient funds: {agent} needs {required} bells but has {available}")]
    InsufficientFunds {
        /// The paying agent.
        agent: AgentName,
        /// Bells required.
        required: u64,
        /// Bells held.
        available: u64,
    },

    /// The recipient already accepted a gift or conversation today.
    #[error("{agent} already had an interaction on day {day}")]
    AlreadyInteractedToday {
        /// The agent that cannot accept another interaction.
        agent: AgentName,
        /// The current day.
        day: u64,
    },

    /// An agent tried to gift or talk to itself.
    #[error("{0} cannot interact with itself")]
    SelfInteraction(AgentName),

    /// Agent with the given name is not on the island.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentName),

    /// Agent name already exists in the roster.
    #[error("duplicate agent name: {0}")]
    DuplicateName(AgentName),

    /// An arithmetic overflow occurred while updating a balance.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

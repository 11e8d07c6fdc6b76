//! Error types for the `isle-world` crate.
//!
//! Every variant is raised before any state is touched, so callers can treat
//! a failed operation as a no-op.

use isle_types::{AgentName, ItemId};

/// Errors that can occur during world operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// Tried to plant in a plot that already holds a crop.
    #[error("plot {0} is already occupied")]
    PlotOccupied(usize),

    /// Tried to harvest a plot that is not ready.
    #[error("plot {0} is not ready to harvest")]
    NotReady(usize),

    /// The plot index is out of range.
    #[error("plot not found: {0}")]
    PlotNotFound(usize),

    /// Only the agent that planted a plot may harvest it.
    #[error("{agent} does not own plot {plot}")]
    NotPlotOwner {
        /// The plot.
        plot: usize,
        /// The agent that tried to harvest.
        agent: AgentName,
    },

    /// The commodity has no sell price yet in the current cycle.
    #[error("commodity market is not open for selling on day {day}")]
    MarketNotReady {
        /// The current day.
        day: u64,
    },

    /// The commodity can only be bought on the acquisition day.
    #[error("{item} cannot be bought on cycle day {cycle_day}")]
    MarketClosed {
        /// The commodity.
        item: ItemId,
        /// Position within the weekly cycle.
        cycle_day: u64,
    },

    /// The item has no buy price.
    #[error("{0} is not for sale")]
    NotForSale(ItemId),

    /// The item has no friendship value.
    #[error("{0} cannot be given as a gift")]
    NotGiftable(ItemId),

    /// The item is not in the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    /// The crop is not in the catalog.
    #[error("unknown crop: {0}")]
    UnknownCrop(ItemId),

    /// The task index is out of range.
    #[error("task not found: {0}")]
    TaskNotFound(usize),

    /// The task is already complete and waits for the next refresh.
    #[error("task {0} is already completed")]
    TaskAlreadyCompleted(usize),

    /// An arithmetic overflow occurred in a price or day computation.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

impl WorldError {
    /// Build an [`WorldError::ArithmeticOverflow`] from a static description.
    pub fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: String::from(context),
        }
    }
}

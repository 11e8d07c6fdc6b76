//! Per-day activity records kept in each agent's daily log.
//!
//! The log is the raw material the decision collaborator uses to decide
//! whether a task's criteria have been met (for example "sell 5 fish today").
//! It is cleared at every day rollover.

use serde::{Deserialize, Serialize};

use crate::enums::ItemCategory;
use crate::ids::{AgentName, ItemId, TemplateId};

/// One action an agent performed during the current day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activity {
    /// Items sold for bells.
    Sold {
        /// Item sold.
        item: ItemId,
        /// Category of the item at the time of sale.
        category: ItemCategory,
        /// Units sold.
        quantity: u32,
        /// Bells received.
        proceeds: u64,
    },
    /// Items bought with bells.
    Bought {
        /// Item bought.
        item: ItemId,
        /// Units bought.
        quantity: u32,
        /// Bells spent.
        cost: u64,
    },
    /// A gift handed to another villager.
    GaveGift {
        /// Recipient of the gift.
        recipient: AgentName,
        /// Item given.
        item: ItemId,
    },
    /// A conversation with another villager.
    Talked {
        /// Villager talked to.
        target: AgentName,
    },
    /// A crop planted in a farm plot.
    Planted {
        /// Plot index.
        plot: usize,
        /// Crop planted.
        crop: ItemId,
    },
    /// A crop harvested from a farm plot.
    Harvested {
        /// Plot index.
        plot: usize,
        /// Crop harvested.
        crop: ItemId,
        /// Units added to the inventory.
        quantity: u32,
    },
    /// A fishing attempt.
    Fished {
        /// Fish caught, or `None` when the line came back empty.
        caught: Option<ItemId>,
    },
    /// Progress recorded towards a board task.
    TaskProgress {
        /// Template of the task.
        template: TemplateId,
        /// Units of progress added.
        delta: u32,
        /// Whether this progress completed the task.
        completed: bool,
    },
}

impl Activity {
    /// Short label for logging.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Sold { .. } => "sold",
            Self::Bought { .. } => "bought",
            Self::GaveGift { .. } => "gave_gift",
            Self::Talked { .. } => "talked",
            Self::Planted { .. } => "planted",
            Self::Harvested { .. } => "harvested",
            Self::Fished { .. } => "fished",
            Self::TaskProgress { .. } => "task_progress",
        }
    }
}

/// Total units of a given category sold in a daily log.
pub fn units_sold_in_category(log: &[Activity], category: ItemCategory) -> u64 {
    log.iter()
        .filter_map(|activity| match activity {
            Activity::Sold {
                category: sold, quantity, ..
            } if *sold == category => Some(u64::from(*quantity)),
            _ => None,
        })
        .fold(0_u64, u64::saturating_add)
}

/// Total bells earned from sales in a daily log.
pub fn bells_earned(log: &[Activity]) -> u64 {
    log.iter()
        .filter_map(|activity| match activity {
            Activity::Sold { proceeds, .. } => Some(*proceeds),
            _ => None,
        })
        .fold(0_u64, u64::saturating_add)
}

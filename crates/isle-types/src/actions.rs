//! Action requests and receipts for agent-engine communication.
//!
//! The decision collaborator expresses what an agent wants to do as an
//! [`AgentAction`]. The engine applies it and answers with an
//! [`ActionReceipt`] describing the resulting balances, or a typed error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{AgentName, ItemId, TemplateId};

/// A single mutation requested by the decision collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentAction {
    /// Buy `quantity` units of an item.
    Buy {
        /// Buying agent.
        agent: AgentName,
        /// Item to buy.
        item: ItemId,
        /// Units to buy.
        quantity: u32,
    },
    /// Sell `quantity` units of an item.
    Sell {
        /// Selling agent.
        agent: AgentName,
        /// Item to sell.
        item: ItemId,
        /// Units to sell.
        quantity: u32,
    },
    /// Give one unit of an item to another villager.
    Gift {
        /// Agent handing over the item.
        giver: AgentName,
        /// Agent receiving the item.
        recipient: AgentName,
        /// Item given.
        item: ItemId,
    },
    /// Chat with another villager.
    Talk {
        /// Agent starting the conversation.
        actor: AgentName,
        /// Agent being talked to.
        target: AgentName,
    },
    /// Plant a crop in an empty plot.
    Plant {
        /// Planting agent (pays the seed cost and owns the plot).
        agent: AgentName,
        /// Plot index.
        plot: usize,
        /// Crop to plant.
        crop: ItemId,
    },
    /// Harvest a ready plot.
    Harvest {
        /// Harvesting agent (must own the plot).
        agent: AgentName,
        /// Plot index.
        plot: usize,
    },
    /// Cast a line once.
    Fish {
        /// Fishing agent.
        agent: AgentName,
    },
    /// Record progress towards a task on the board.
    RecordTaskProgress {
        /// Agent credited with the progress.
        agent: AgentName,
        /// Slot index on the task board.
        task_index: usize,
        /// Units of progress.
        delta: u32,
    },
}

impl AgentAction {
    /// The agent performing the action.
    pub const fn actor(&self) -> &AgentName {
        match self {
            Self::Buy { agent, .. }
            | Self::Sell { agent, .. }
            | Self::Plant { agent, .. }
            | Self::Harvest { agent, .. }
            | Self::Fish { agent }
            | Self::RecordTaskProgress { agent, .. } => agent,
            Self::Gift { giver, .. } => giver,
            Self::Talk { actor, .. } => actor,
        }
    }

    /// Short label for logging.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Buy { .. } => "buy",
            Self::Sell { .. } => "sell",
            Self::Gift { .. } => "gift",
            Self::Talk { .. } => "talk",
            Self::Plant { .. } => "plant",
            Self::Harvest { .. } => "harvest",
            Self::Fish { .. } => "fish",
            Self::RecordTaskProgress { .. } => "record_task_progress",
        }
    }
}

/// Result of a successful buy or sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    /// Trading agent.
    pub agent: AgentName,
    /// Item traded.
    pub item: ItemId,
    /// Units traded.
    pub quantity: u32,
    /// Price per unit applied to this trade.
    pub unit_price: u64,
    /// Total bells moved (`unit_price * quantity`).
    pub total: u64,
    /// Agent's bell balance after the trade.
    pub bells_after: u64,
    /// Units of the item the agent holds after the trade.
    pub held_after: u32,
}

/// Result of a successful gift or conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionReceipt {
    /// Agent who initiated the interaction.
    pub actor: AgentName,
    /// Agent whose relationship score changed.
    pub recipient: AgentName,
    /// Item given, `None` for a conversation.
    pub item: Option<ItemId>,
    /// Points added to the recipient's relationship score.
    pub friendship_gained: u32,
    /// Recipient's relationship score afterwards.
    pub relationship_after: u32,
}

/// Result of a successful planting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantReceipt {
    /// Planting agent.
    pub agent: AgentName,
    /// Plot index.
    pub plot: usize,
    /// Crop planted.
    pub crop: ItemId,
    /// Day the crop becomes ready.
    pub ready_day: u64,
    /// Bells paid for seeds.
    pub seed_cost: u64,
    /// Agent's bell balance afterwards.
    pub bells_after: u64,
}

/// Result of a successful harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReceipt {
    /// Harvesting agent.
    pub agent: AgentName,
    /// Plot index.
    pub plot: usize,
    /// Crop harvested.
    pub crop: ItemId,
    /// Units added to the inventory.
    pub quantity: u32,
    /// Units of the crop held afterwards.
    pub held_after: u32,
}

/// Result of a fishing attempt (a miss is still a successful action).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishingReceipt {
    /// Fishing agent.
    pub agent: AgentName,
    /// Fish caught, if any.
    pub caught: Option<ItemId>,
    /// Catch probability that applied to this attempt.
    pub catch_chance: Decimal,
    /// Attempts made today including this one.
    pub attempts_today: u32,
}

/// Result of recording task progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgressReceipt {
    /// Agent credited with the progress.
    pub agent: AgentName,
    /// Slot index on the board.
    pub task_index: usize,
    /// Template of the task.
    pub template: TemplateId,
    /// Progress after this call.
    pub progress: u32,
    /// Target quantity.
    pub target: u32,
    /// Whether this call completed the task.
    pub completed_now: bool,
    /// Miles credited by this call (non-zero only on completion).
    pub miles_awarded: u64,
    /// Agent's miles balance afterwards.
    pub miles_after: u64,
}

/// Receipt for any successfully applied [`AgentAction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionReceipt {
    /// A buy or sell.
    Trade(TradeReceipt),
    /// A gift or conversation.
    Interaction(InteractionReceipt),
    /// A planting.
    Plant(PlantReceipt),
    /// A harvest.
    Harvest(HarvestReceipt),
    /// A fishing attempt.
    Fishing(FishingReceipt),
    /// Task progress.
    TaskProgress(TaskProgressReceipt),
}

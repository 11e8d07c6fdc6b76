//! Read-only world snapshot handed to the decision collaborator.
//!
//! A [`WorldSnapshot`] is a plain serializable copy of everything an agent
//! policy might want to look at. It holds no references into the engine, so
//! a collaborator can keep it around, log it as JSON, or ship it elsewhere.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::enums::PlotState;
use crate::ids::{AgentName, ItemId, TemplateId};

/// Complete view of the world at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Days elapsed since the world started.
    pub day: u64,
    /// Position within the weekly market cycle.
    pub cycle_day: u64,
    /// Calendar date of the current day.
    pub date: NaiveDate,
    /// Every resident, in arrival order.
    pub agents: Vec<AgentView>,
    /// Commodity market state.
    pub market: MarketView,
    /// Active task slots.
    pub tasks: Vec<TaskView>,
    /// Farm plots.
    pub plots: Vec<PlotView>,
}

impl WorldSnapshot {
    /// Find an agent by name.
    pub fn agent(&self, name: &str) -> Option<&AgentView> {
        self.agents.iter().find(|a| a.name.as_str() == name)
    }

    /// Indexes of plots that are ready to harvest.
    pub fn ready_plots(&self) -> impl Iterator<Item = usize> + '_ {
        self.plots
            .iter()
            .filter(|p| p.state == PlotState::Ready)
            .map(|p| p.index)
    }

    /// Indexes of tasks that are still open.
    pub fn open_tasks(&self) -> impl Iterator<Item = usize> + '_ {
        self.tasks.iter().filter(|t| !t.completed).map(|t| t.index)
    }
}

/// Snapshot of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentView {
    /// Agent name.
    pub name: AgentName,
    /// Bell balance.
    pub bells: u64,
    /// Miles balance.
    pub miles: u64,
    /// Relationship score.
    pub relationship_score: u32,
    /// Held items (absent keys mean zero).
    pub inventory: BTreeMap<ItemId, u32>,
    /// Last day the agent accepted a gift or conversation.
    pub last_interaction_day: Option<u64>,
    /// Day the agent arrived.
    pub joined_day: u64,
    /// Activities performed today.
    pub daily_log: Vec<Activity>,
}

/// Snapshot of the commodity market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketView {
    /// Tracked commodity.
    pub commodity: ItemId,
    /// Acquisition price for the current cycle, once drawn.
    pub buy_price: Option<u64>,
    /// Undiscounted sell price for today, on vending days.
    pub daily_sell_price: Option<u64>,
    /// Price a seller of one unit would receive right now.
    pub quoted_sell_price: Option<u64>,
    /// Decaying commodity sale-volume counter.
    pub recent_sale_volume: Decimal,
    /// Whether the commodity can be bought today.
    pub acquisition_open: bool,
}

/// Snapshot of one task slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    /// Slot index, used with `record_task_progress`.
    pub index: usize,
    /// Template the task was drawn from.
    pub template: TemplateId,
    /// Objective text.
    pub description: String,
    /// Progress so far.
    pub progress: u32,
    /// Target quantity.
    pub target: u32,
    /// Whether the task is complete.
    pub completed: bool,
    /// Day the task was issued.
    pub assigned_day: u64,
    /// First day on which the task is replaced.
    pub expires_on_day: u64,
    /// Miles paid on completion.
    pub miles_reward: u32,
}

/// Snapshot of one farm plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotView {
    /// Plot index.
    pub index: usize,
    /// Lifecycle state.
    pub state: PlotState,
    /// Crop planted, if any.
    pub crop: Option<ItemId>,
    /// Agent that planted the crop.
    pub owner: Option<AgentName>,
    /// Day the crop was planted.
    pub plant_day: Option<u64>,
    /// Day the crop becomes ready.
    pub ready_day: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_plot(index: usize) -> PlotView {
        PlotView {
            index,
            state: PlotState::Empty,
            crop: None,
            owner: None,
            plant_day: None,
            ready_day: None,
        }
    }

    #[test]
    fn ready_plots_filters_by_state() {
        let mut ready = empty_plot(1);
        ready.state = PlotState::Ready;
        ready.crop = Some(ItemId::from("Tomato"));
        let snapshot = WorldSnapshot {
            day: 4,
            cycle_day: 4,
            date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap_or_default(),
            agents: Vec::new(),
            market: MarketView {
                commodity: ItemId::from("turnip"),
                buy_price: Some(100),
                daily_sell_price: Some(120),
                quoted_sell_price: Some(120),
                recent_sale_volume: Decimal::ZERO,
                acquisition_open: false,
            },
            tasks: Vec::new(),
            plots: vec![empty_plot(0), ready, empty_plot(2)],
        };
        assert_eq!(snapshot.ready_plots().collect::<Vec<_>>(), vec![1]);
        assert!(snapshot.agent("Nobody").is_none());
    }
}

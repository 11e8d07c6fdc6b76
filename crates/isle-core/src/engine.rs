//! The world engine: owner of every piece of mutable island state.
//!
//! [`WorldEngine`] holds the calendar, the agent roster, the market, the task
//! board, the farm plots and the fishing stream. It exposes the single
//! day-advance operation and the mutation operations agents invoke.
//!
//! # Atomicity
//!
//! Every mutation runs all of its checks before the first write. A rejected
//! action returns a typed [`ActionError`] and leaves the world exactly as it
//! was.
//!
//! # Day rollover
//!
//! [`WorldEngine::advance_day`] runs, in order: clock, market refresh, task
//! refresh, farm update, daily-log reset, fishing reset, immigration.

use std::sync::Arc;

use chrono::NaiveDate;
use isle_agents::{Agent, AgentError, AgentRoster};
use isle_types::{
    ActionReceipt, Activity, AgentAction, AgentName, FishingReceipt, HarvestReceipt,
    InteractionReceipt, ItemCategory, ItemId, PlantReceipt, TaskProgressReceipt, TradeReceipt,
    WorldSnapshot,
};
use isle_world::{FarmPlots, FishingGround, MarketModel, StaticCatalog, TaskBoard, WorldError};
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::{ClockError, WorldClock};
use crate::config::{ConfigError, SimulationConfig};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that stop the engine (configuration problems and day rollover
/// failures).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The configuration file failed validation.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The configuration does not fit the catalog.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is wrong.
        reason: String,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A world subsystem failed during rollover.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// An agent could not be created.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// Reasons an agent action is rejected. The world is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// An agent-level rule was violated.
    #[error("{source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A world-level rule was violated.
    #[error("{source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The island is full.
    #[error("population cap of {max} reached")]
    PopulationCap {
        /// Configured maximum population.
        max: usize,
    },
}

fn configuration(reason: String) -> EngineError {
    EngineError::Configuration { reason }
}

fn overflow(context: &str) -> ActionError {
    ActionError::World {
        source: WorldError::overflow(context),
    }
}

// ---------------------------------------------------------------------------
// DaySummary
// ---------------------------------------------------------------------------

/// What happened during one day rollover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    /// The new day number.
    pub day: u64,
    /// Position within the market cycle.
    pub cycle_day: u64,
    /// Calendar date of the new day.
    pub date: NaiveDate,
    /// Commodity acquisition price for the cycle, if drawn.
    pub buy_price: Option<u64>,
    /// Undiscounted commodity sell price, on vending days.
    pub daily_sell_price: Option<u64>,
    /// Plots that became ready.
    pub ripened: Vec<usize>,
    /// Task slots that received a new instance.
    pub tasks_replaced: Vec<usize>,
    /// Villagers who moved in.
    pub immigrants: Vec<AgentName>,
    /// Population after immigration.
    pub population: usize,
}

// ---------------------------------------------------------------------------
// WorldEngine
// ---------------------------------------------------------------------------

/// The island world.
#[derive(Debug, Clone)]
pub struct WorldEngine {
    catalog: Arc<StaticCatalog>,
    config: SimulationConfig,
    initial_agents: usize,
    clock: WorldClock,
    roster: AgentRoster,
    market: MarketModel,
    tasks: TaskBoard,
    plots: FarmPlots,
    fishing: FishingGround,
}

impl WorldEngine {
    /// Build a world at day 0 with `agent_count` villagers.
    ///
    /// Villagers take the first `agent_count` names of the catalog's
    /// villager table. The market is priced for day 0 and the task board is
    /// filled.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config fails validation,
    /// `agent_count` exceeds `world.max_agents` or the number of villager
    /// names, the commodity is not a catalog commodity, or the catalog has
    /// no task templates.
    pub fn initialize(
        agent_count: usize,
        catalog: Arc<StaticCatalog>,
        config: SimulationConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if agent_count > config.world.max_agents {
            return Err(configuration(format!(
                "agent count {agent_count} exceeds max_agents {}",
                config.world.max_agents
            )));
        }
        if agent_count > catalog.villagers().len() {
            return Err(configuration(format!(
                "agent count {agent_count} exceeds the {} villager names in the catalog",
                catalog.villagers().len()
            )));
        }
        let commodity = &config.market.commodity;
        if catalog.category_of(commodity.as_str()) != Some(ItemCategory::Commodity) {
            return Err(configuration(format!(
                "market commodity {commodity} is not a commodity in the catalog"
            )));
        }
        if catalog.tasks().is_empty() {
            return Err(configuration(String::from(
                "catalog has no task templates to fill the board",
            )));
        }

        let mut engine = Self {
            clock: WorldClock::new(config.world.start_date),
            roster: AgentRoster::new(config.agents.clone()),
            market: MarketModel::new(config.market.clone(), config.world.seed),
            tasks: TaskBoard::new(config.tasks.slots),
            plots: FarmPlots::new(config.farm.plots),
            fishing: FishingGround::new(config.fishing.clone(), config.world.seed),
            catalog,
            config,
            initial_agents: agent_count,
        };
        engine.populate()?;
        info!(
            agents = engine.roster.len(),
            seed = engine.config.world.seed,
            slots = engine.tasks.slot_count(),
            plots = engine.plots.len(),
            "world initialized"
        );
        Ok(engine)
    }

    /// Discard all state and start again at day 0 with the original
    /// population. The seed is unchanged, so the run replays identically.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.clock.reset();
        self.roster = AgentRoster::new(self.config.agents.clone());
        self.market = MarketModel::new(self.config.market.clone(), self.config.world.seed);
        self.tasks = TaskBoard::new(self.config.tasks.slots);
        self.plots = FarmPlots::new(self.config.farm.plots);
        self.fishing = FishingGround::new(self.config.fishing.clone(), self.config.world.seed);
        self.populate()?;
        info!(agents = self.roster.len(), "world reset to day 0");
        Ok(())
    }

    fn populate(&mut self) -> Result<(), EngineError> {
        for villager in self.catalog.villagers().iter().take(self.initial_agents) {
            self.roster.add(villager.name.clone(), 0)?;
        }
        self.market.refresh(0)?;
        self.tasks.refresh(0, self.catalog.tasks());
        Ok(())
    }

    /// Advance the world by one day.
    ///
    /// Calling twice advances two days.
    pub fn advance_day(&mut self) -> Result<DaySummary, EngineError> {
        let day = self.clock.advance()?;
        self.market.refresh(day)?;
        let tasks_replaced = self.tasks.refresh(day, self.catalog.tasks());
        let ripened = self.plots.update(day);
        self.roster.reset_daily_logs();
        self.fishing.reset_day();
        let immigrants = self.immigrate(day)?;

        let summary = DaySummary {
            day,
            cycle_day: self.clock.cycle_day(),
            date: self.clock.date(),
            buy_price: self.market.buy_price(),
            daily_sell_price: self.market.daily_sell_price(),
            ripened,
            tasks_replaced,
            immigrants,
            population: self.roster.len(),
        };
        info!(
            day,
            cycle_day = summary.cycle_day,
            buy_price = summary.buy_price,
            daily_sell_price = summary.daily_sell_price,
            ripened = summary.ripened.len(),
            tasks_replaced = summary.tasks_replaced.len(),
            population = summary.population,
            "day started"
        );
        Ok(summary)
    }

    /// Move new villagers in on immigration days.
    ///
    /// Arrivals are `ceil(population * percent / 100)`, at least one unless
    /// `percent` is zero, capped by `max_agents` and by the villager names
    /// still unused.
    fn immigrate(&mut self, day: u64) -> Result<Vec<AgentName>, EngineError> {
        let schedule = &self.config.immigration;
        if schedule.interval_days == 0 || day.checked_rem(schedule.interval_days) != Some(0) {
            return Ok(Vec::new());
        }
        let population = self.roster.len();
        let scaled = u64::try_from(population)
            .unwrap_or(u64::MAX)
            .saturating_mul(schedule.percent)
            .div_ceil(100);
        let scaled = if schedule.percent > 0 {
            scaled.max(1)
        } else {
            0
        };
        let wanted = usize::try_from(scaled).unwrap_or(usize::MAX);
        let room = self.config.world.max_agents.saturating_sub(population);

        let arrivals: Vec<AgentName> = self
            .catalog
            .villagers()
            .iter()
            .filter(|v| !self.roster.contains(v.name.as_str()))
            .take(wanted.min(room))
            .map(|v| v.name.clone())
            .collect();
        for name in &arrivals {
            self.roster.add(name.clone(), day)?;
        }
        if !arrivals.is_empty() {
            info!(
                day,
                arrivals = arrivals.len(),
                population = self.roster.len(),
                "villagers moved in"
            );
        }
        Ok(arrivals)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Add a villager on demand.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::PopulationCap`] when the island is full and
    /// [`AgentError::DuplicateName`] when the name is taken.
    pub fn add_agent(&mut self, name: AgentName) -> Result<&Agent, ActionError> {
        let max = self.config.world.max_agents;
        if self.roster.len() >= max {
            return Err(ActionError::PopulationCap { max });
        }
        let day = self.clock.day();
        Ok(self.roster.add(name, day)?)
    }

    /// Buy `quantity` units of `item`.
    ///
    /// The commodity is bought at the cycle's acquisition price on the
    /// acquisition day only; other items at their catalog buy price.
    pub fn buy(
        &mut self,
        agent: &AgentName,
        item: &ItemId,
        quantity: u32,
    ) -> Result<TradeReceipt, ActionError> {
        self.roster.get(agent.as_str())?;
        let unit_price = if self.market.is_commodity(item) {
            self.market.commodity_buy_price()?
        } else {
            if !self.catalog.contains(item.as_str()) {
                return Err(WorldError::UnknownItem(item.clone()).into());
            }
            self.catalog
                .buy_price_of(item.as_str())
                .map(u64::from)
                .ok_or_else(|| WorldError::NotForSale(item.clone()))?
        };
        let total = unit_price
            .checked_mul(u64::from(quantity))
            .ok_or_else(|| overflow("purchase total"))?;

        let buyer = self.roster.get_mut(agent.as_str())?;
        let (bells_after, held_after) = buyer.settle_purchase(item, quantity, total)?;
        buyer.record(Activity::Bought {
            item: item.clone(),
            quantity,
            cost: total,
        });
        debug!(agent = %agent, item = %item, quantity, total, "bought");
        Ok(TradeReceipt {
            agent: agent.clone(),
            item: item.clone(),
            quantity,
            unit_price,
            total,
            bells_after,
            held_after,
        })
    }

    /// Sell `quantity` units of `item` at the current quote.
    ///
    /// The whole batch is priced at the quote before the sale, then the sale
    /// volume is added so later sales see a lower quote.
    pub fn sell(
        &mut self,
        agent: &AgentName,
        item: &ItemId,
        quantity: u32,
    ) -> Result<TradeReceipt, ActionError> {
        let seller = self.roster.get(agent.as_str())?;
        let (category, catalog_price) = self
            .catalog
            .category_of(item.as_str())
            .zip(self.catalog.sell_price_of(item.as_str()))
            .ok_or_else(|| WorldError::UnknownItem(item.clone()))?;
        seller.ensure_holds(item, quantity)?;
        let unit_price = self.market.sell_quote(item, category, catalog_price)?;
        let proceeds = unit_price
            .checked_mul(u64::from(quantity))
            .ok_or_else(|| overflow("sale proceeds"))?;

        let seller = self.roster.get_mut(agent.as_str())?;
        let (bells_after, held_after) = seller.settle_sale(item, quantity, proceeds)?;
        seller.record(Activity::Sold {
            item: item.clone(),
            category,
            quantity,
            proceeds,
        });
        self.market.record_sale(item, category, quantity)?;
        debug!(agent = %agent, item = %item, quantity, proceeds, "sold");
        Ok(TradeReceipt {
            agent: agent.clone(),
            item: item.clone(),
            quantity,
            unit_price,
            total: proceeds,
            bells_after,
            held_after,
        })
    }

    /// Give one unit of `item` from `giver` to `recipient`.
    ///
    /// The recipient gains `friendship_value * preference` points, where the
    /// preference comes from the recipient's villager record.
    pub fn gift(
        &mut self,
        giver: &AgentName,
        recipient: &AgentName,
        item: &ItemId,
    ) -> Result<InteractionReceipt, ActionError> {
        let day = self.clock.day();
        self.roster.check_gift(giver, recipient, item, day)?;
        let value = match self.catalog.friendship_value_of(item.as_str()) {
            None => return Err(WorldError::UnknownItem(item.clone()).into()),
            Some(None) => return Err(WorldError::NotGiftable(item.clone()).into()),
            Some(Some(value)) => value,
        };
        let preference = self.catalog.preference(recipient.as_str(), item);
        let points = value
            .checked_mul(preference.multiplier())
            .ok_or_else(|| overflow("gift friendship points"))?;
        let receipt = self.roster.give_gift(giver, recipient, item, points, day)?;
        debug!(
            giver = %giver,
            recipient = %recipient,
            item = %item,
            points,
            relationship_after = receipt.relationship_after,
            "gift accepted"
        );
        Ok(receipt)
    }

    /// Have `actor` chat with `target`.
    pub fn talk(
        &mut self,
        actor: &AgentName,
        target: &AgentName,
    ) -> Result<InteractionReceipt, ActionError> {
        let day = self.clock.day();
        Ok(self.roster.talk(actor, target, day)?)
    }

    /// Plant `crop` on an empty plot, paying the seed cost.
    pub fn plant(
        &mut self,
        agent: &AgentName,
        plot: usize,
        crop: &ItemId,
    ) -> Result<PlantReceipt, ActionError> {
        let day = self.clock.day();
        let planter = self.roster.get(agent.as_str())?;
        let record = self
            .catalog
            .crop(crop.as_str())
            .ok_or_else(|| WorldError::UnknownCrop(crop.clone()))?;
        if self.plots.get(plot)?.is_some() {
            return Err(WorldError::PlotOccupied(plot).into());
        }
        let seed_cost = u64::from(record.seed_cost);
        planter.ensure_funds(seed_cost)?;

        let ready_day = self.plots.plant(plot, record, day, agent.clone())?;
        let planter = self.roster.get_mut(agent.as_str())?;
        let bells_after = planter.debit_bells(seed_cost)?;
        planter.record(Activity::Planted {
            plot,
            crop: crop.clone(),
        });
        debug!(agent = %agent, plot, crop = %crop, ready_day, "planted");
        Ok(PlantReceipt {
            agent: agent.clone(),
            plot,
            crop: crop.clone(),
            ready_day,
            seed_cost,
            bells_after,
        })
    }

    /// Harvest a ready plot the agent planted.
    pub fn harvest(&mut self, agent: &AgentName, plot: usize) -> Result<HarvestReceipt, ActionError> {
        let harvester = self.roster.get(agent.as_str())?;
        let growth = match self.plots.get(plot)? {
            Some(growth) if growth.ready => growth,
            _ => return Err(WorldError::NotReady(plot).into()),
        };
        if growth.owner != *agent {
            return Err(WorldError::NotPlotOwner {
                plot,
                agent: agent.clone(),
            }
            .into());
        }
        harvester
            .held(&growth.crop)
            .checked_add(growth.yield_quantity)
            .ok_or_else(|| overflow("inventory overflow on harvest"))?;

        let growth = self.plots.harvest(plot)?;
        let harvester = self.roster.get_mut(agent.as_str())?;
        let held_after = harvester.add_item(&growth.crop, growth.yield_quantity)?;
        harvester.record(Activity::Harvested {
            plot,
            crop: growth.crop.clone(),
            quantity: growth.yield_quantity,
        });
        debug!(agent = %agent, plot, crop = %growth.crop, quantity = growth.yield_quantity, "harvested");
        Ok(HarvestReceipt {
            agent: agent.clone(),
            plot,
            crop: growth.crop,
            quantity: growth.yield_quantity,
            held_after,
        })
    }

    /// Cast a line once. A miss is still a successful action.
    pub fn fish(&mut self, agent: &AgentName) -> Result<FishingReceipt, ActionError> {
        let angler = self.roster.get(agent.as_str())?;
        let full = self
            .catalog
            .fish_ids()
            .iter()
            .find(|fish| angler.held(fish) == u32::MAX);
        if let Some(fish) = full {
            return Err(overflow(&format!("inventory of {fish} full before cast")));
        }
        let cast = self.fishing.cast(agent, self.catalog.fish_ids());
        let angler = self.roster.get_mut(agent.as_str())?;
        if let Some(fish) = &cast.caught {
            angler.add_item(fish, 1)?;
        }
        angler.record(Activity::Fished {
            caught: cast.caught.clone(),
        });
        debug!(
            agent = %agent,
            caught = ?cast.caught,
            chance = %cast.chance,
            attempts = cast.attempts_today,
            "cast"
        );
        Ok(FishingReceipt {
            agent: agent.clone(),
            caught: cast.caught,
            catch_chance: cast.chance,
            attempts_today: cast.attempts_today,
        })
    }

    /// Add progress to a board task, crediting its miles reward to `agent`
    /// when this call completes it.
    pub fn record_task_progress(
        &mut self,
        agent: &AgentName,
        task_index: usize,
        delta: u32,
    ) -> Result<TaskProgressReceipt, ActionError> {
        let worker = self.roster.get(agent.as_str())?;
        let task = self.tasks.get(task_index)?;
        if task.is_completed() {
            return Err(WorldError::TaskAlreadyCompleted(task_index).into());
        }
        let reward = u64::from(task.miles_reward());
        worker
            .miles()
            .checked_add(reward)
            .ok_or_else(|| overflow("miles balance overflow"))?;

        let completed_now = self.tasks.record_progress(task_index, delta)?;
        let task = self.tasks.get(task_index)?;
        let template = task.template().clone();
        let progress = task.progress();
        let target = task.target_quantity();

        let worker = self.roster.get_mut(agent.as_str())?;
        let (miles_awarded, miles_after) = if completed_now {
            (reward, worker.credit_miles(reward)?)
        } else {
            (0, worker.miles())
        };
        worker.record(Activity::TaskProgress {
            template: template.clone(),
            delta,
            completed: completed_now,
        });
        if completed_now {
            info!(agent = %agent, task = %template, miles = reward, "task completed");
        }
        Ok(TaskProgressReceipt {
            agent: agent.clone(),
            task_index,
            template,
            progress,
            target,
            completed_now,
            miles_awarded,
            miles_after,
        })
    }

    /// Dispatch an action to the matching operation.
    pub fn apply(&mut self, action: &AgentAction) -> Result<ActionReceipt, ActionError> {
        match action {
            AgentAction::Buy {
                agent,
                item,
                quantity,
            } => self.buy(agent, item, *quantity).map(ActionReceipt::Trade),
            AgentAction::Sell {
                agent,
                item,
                quantity,
            } => self.sell(agent, item, *quantity).map(ActionReceipt::Trade),
            AgentAction::Gift {
                giver,
                recipient,
                item,
            } => self
                .gift(giver, recipient, item)
                .map(ActionReceipt::Interaction),
            AgentAction::Talk { actor, target } => {
                self.talk(actor, target).map(ActionReceipt::Interaction)
            }
            AgentAction::Plant { agent, plot, crop } => {
                self.plant(agent, *plot, crop).map(ActionReceipt::Plant)
            }
            AgentAction::Harvest { agent, plot } => {
                self.harvest(agent, *plot).map(ActionReceipt::Harvest)
            }
            AgentAction::Fish { agent } => self.fish(agent).map(ActionReceipt::Fishing),
            AgentAction::RecordTaskProgress {
                agent,
                task_index,
                delta,
            } => self
                .record_task_progress(agent, *task_index, *delta)
                .map(ActionReceipt::TaskProgress),
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Current day number.
    pub const fn day(&self) -> u64 {
        self.clock.day()
    }

    /// Position within the market cycle.
    pub fn cycle_day(&self) -> u64 {
        self.clock.cycle_day()
    }

    /// Calendar date of the current day.
    pub fn date(&self) -> NaiveDate {
        self.clock.date()
    }

    /// Look up an agent.
    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.roster.get(name).ok()
    }

    /// All agents in arrival order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.roster.iter()
    }

    /// Current population.
    pub fn population(&self) -> usize {
        self.roster.len()
    }

    /// The market.
    pub const fn market(&self) -> &MarketModel {
        &self.market
    }

    /// The task board.
    pub const fn tasks(&self) -> &TaskBoard {
        &self.tasks
    }

    /// The farm.
    pub const fn plots(&self) -> &FarmPlots {
        &self.plots
    }

    /// The shared catalog.
    pub const fn catalog(&self) -> &Arc<StaticCatalog> {
        &self.catalog
    }

    /// The configuration the world was built with.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Serializable picture of the whole world for the decision source.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            day: self.clock.day(),
            cycle_day: self.clock.cycle_day(),
            date: self.clock.date(),
            agents: self.roster.views(),
            market: self.market.view(),
            tasks: self.tasks.views(),
            plots: self.plots.views(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use isle_world::default_catalog;

    use super::*;

    fn engine(agent_count: usize) -> WorldEngine {
        WorldEngine::initialize(
            agent_count,
            Arc::new(default_catalog()),
            SimulationConfig::default(),
        )
        .unwrap()
    }

    fn name(s: &str) -> AgentName {
        AgentName::from(s)
    }

    #[test]
    fn initialize_uses_catalog_order() {
        let world = engine(3);
        let names: Vec<&str> = world.agents().map(|a| a.name().as_str()).collect();
        assert_eq!(names, vec!["Audie", "Raymond", "Marshal"]);
        assert_eq!(world.day(), 0);
        assert_eq!(world.tasks().slots().len(), 3);
        assert_eq!(world.plots().occupied_count(), 0);
        assert!(world.market().buy_price().is_some());
    }

    #[test]
    fn initialize_rejects_too_many_agents() {
        let result = WorldEngine::initialize(
            11,
            Arc::new(default_catalog()),
            SimulationConfig::default(),
        );
        assert!(matches!(result, Err(EngineError::Configuration { .. })));
    }

    #[test]
    fn initialize_rejects_unknown_commodity() {
        let mut config = SimulationConfig::default();
        config.market.commodity = ItemId::from("Apple");
        let result = WorldEngine::initialize(2, Arc::new(default_catalog()), config);
        assert!(matches!(result, Err(EngineError::Configuration { .. })));
    }

    #[test]
    fn initialize_rejects_invalid_config() {
        let mut config = SimulationConfig::default();
        config.tasks.slots = 0;
        let result = WorldEngine::initialize(2, Arc::new(default_catalog()), config);
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }

    #[test]
    fn buy_shop_item_and_reject_unsold_items() {
        let mut world = engine(2);
        let receipt = world
            .buy(&name("Audie"), &ItemId::from("Wrapped Fruit"), 2)
            .unwrap();
        assert_eq!(receipt.unit_price, 100);
        assert_eq!(receipt.total, 200);
        assert_eq!(receipt.bells_after, 800);
        assert_eq!(receipt.held_after, 2);

        assert_eq!(
            world.buy(&name("Audie"), &ItemId::from("Apple"), 1),
            Err(WorldError::NotForSale(ItemId::from("Apple")).into())
        );
        assert_eq!(
            world.buy(&name("Audie"), &ItemId::from("Moon Rock"), 1),
            Err(WorldError::UnknownItem(ItemId::from("Moon Rock")).into())
        );
        assert!(matches!(
            world.buy(&name("Audie"), &ItemId::from("Wooden Chair"), 1),
            Err(ActionError::Agent {
                source: AgentError::InsufficientFunds { .. }
            })
        ));
    }

    #[test]
    fn gift_uses_preference_multiplier() {
        let mut world = engine(2);
        world.roster.get_mut("Raymond").unwrap().add_item(&ItemId::from("Pear"), 1).unwrap();

        // Audie loves pears: 2 * 2.
        let receipt = world
            .gift(&name("Raymond"), &name("Audie"), &ItemId::from("Pear"))
            .unwrap();
        assert_eq!(receipt.friendship_gained, 4);
        assert_eq!(world.agent("Audie").unwrap().relationship_score(), 4);
    }

    #[test]
    fn ungiftable_item_rejected_without_changes() {
        let mut world = engine(2);
        world.roster.get_mut("Audie").unwrap().add_item(&ItemId::from("turnip"), 1).unwrap();
        let before = world.snapshot();
        assert_eq!(
            world.gift(&name("Audie"), &name("Raymond"), &ItemId::from("turnip")),
            Err(WorldError::NotGiftable(ItemId::from("turnip")).into())
        );
        assert_eq!(world.snapshot(), before);
    }

    #[test]
    fn plant_charges_seed_cost_and_only_owner_harvests() {
        let mut world = engine(2);
        let receipt = world
            .plant(&name("Audie"), 0, &ItemId::from("Wheat"))
            .unwrap();
        assert_eq!(receipt.ready_day, 2);
        assert_eq!(receipt.bells_after, 990);

        world.advance_day().unwrap();
        world.advance_day().unwrap();
        assert_eq!(
            world.harvest(&name("Raymond"), 0),
            Err(WorldError::NotPlotOwner {
                plot: 0,
                agent: name("Raymond"),
            }
            .into())
        );
        let harvest = world.harvest(&name("Audie"), 0).unwrap();
        assert_eq!(harvest.quantity, 3);
        assert_eq!(harvest.held_after, 3);
    }

    #[test]
    fn plant_rejects_unknown_crop_and_occupied_plot() {
        let mut world = engine(1);
        assert_eq!(
            world.plant(&name("Audie"), 0, &ItemId::from("Apple")),
            Err(WorldError::UnknownCrop(ItemId::from("Apple")).into())
        );
        world.plant(&name("Audie"), 0, &ItemId::from("Wheat")).unwrap();
        assert_eq!(
            world.plant(&name("Audie"), 0, &ItemId::from("Carrot")),
            Err(WorldError::PlotOccupied(0).into())
        );
        assert_eq!(
            world.plant(&name("Audie"), 99, &ItemId::from("Carrot")),
            Err(WorldError::PlotNotFound(99).into())
        );
        assert_eq!(world.agent("Audie").unwrap().bells(), 990);
    }

    #[test]
    fn task_completion_credits_miles_once() {
        let mut world = engine(1);
        let target = world.tasks().get(0).unwrap().target_quantity();
        let reward = u64::from(world.tasks().get(0).unwrap().miles_reward());
        let receipt = world
            .record_task_progress(&name("Audie"), 0, target)
            .unwrap();
        assert!(receipt.completed_now);
        assert_eq!(receipt.miles_after, 500_u64.saturating_add(reward));
        assert_eq!(
            world.record_task_progress(&name("Audie"), 0, 1),
            Err(WorldError::TaskAlreadyCompleted(0).into())
        );
        assert_eq!(
            world.record_task_progress(&name("Audie"), 7, 1),
            Err(WorldError::TaskNotFound(7).into())
        );
    }

    #[test]
    fn add_agent_respects_cap() {
        let mut config = SimulationConfig::default();
        config.world.agent_count = 1;
        config.world.max_agents = 2;
        let mut world = WorldEngine::initialize(1, Arc::new(default_catalog()), config).unwrap();
        world.add_agent(name("Visitor")).unwrap();
        assert_eq!(
            world.add_agent(name("Another")).err(),
            Some(ActionError::PopulationCap { max: 2 })
        );
    }

    #[test]
    fn full_fish_stack_rejects_cast_before_rolling() {
        let mut world = engine(1);
        let fish = world.catalog().fish_ids().first().unwrap().clone();
        world
            .roster
            .get_mut("Audie")
            .unwrap()
            .add_item(&fish, u32::MAX)
            .unwrap();

        let result = world.fish(&name("Audie"));
        assert!(matches!(result, Err(ActionError::World { .. })));
        assert_eq!(world.fishing.attempts_today("Audie"), 0);
        assert!(world.agent("Audie").unwrap().daily_log().is_empty());
    }

    #[test]
    fn apply_dispatches_actions() {
        let mut world = engine(2);
        let receipt = world
            .apply(&AgentAction::Talk {
                actor: name("Audie"),
                target: name("Raymond"),
            })
            .unwrap();
        assert!(matches!(receipt, ActionReceipt::Interaction(_)));
        let fished = world.apply(&AgentAction::Fish { agent: name("Audie") }).unwrap();
        assert!(matches!(fished, ActionReceipt::Fishing(_)));
        assert_eq!(world.agent("Audie").unwrap().daily_log().len(), 2);
    }
}

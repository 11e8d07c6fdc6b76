//! Agent records and the roster that owns them.
//!
//! An [`Agent`] is one villager: identity, relationship score, inventory,
//! currency balances, and the activity log for the current day. The
//! [`AgentRoster`] enforces name uniqueness and implements the agent-only
//! operations (gifting, talking, settling trades) with validate-then-commit
//! semantics: every check runs before the first field is written.

use std::collections::{BTreeMap, BTreeSet};

use isle_types::{Activity, AgentName, AgentView, InteractionReceipt, ItemId};
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::inventory;

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A single villager living on the island.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    name: AgentName,
    relationship_score: u32,
    inventory: BTreeMap<ItemId, u32>,
    bells: u64,
    miles: u64,
    last_interaction_day: Option<u64>,
    joined_day: u64,
    daily_log: Vec<Activity>,
}

impl Agent {
    /// Create an agent with starting balances from `config`.
    pub fn new(name: AgentName, joined_day: u64, config: &AgentConfig) -> Self {
        Self {
            name,
            relationship_score: config.starting_score(),
            inventory: config
                .starting_inventory
                .iter()
                .filter(|(_, qty)| **qty > 0)
                .map(|(item, qty)| (item.clone(), *qty))
                .collect(),
            bells: config.starting_bells,
            miles: config.starting_miles,
            last_interaction_day: None,
            joined_day,
            daily_log: Vec::new(),
        }
    }

    /// The agent's unique name.
    pub const fn name(&self) -> &AgentName {
        &self.name
    }

    /// Current relationship score.
    pub const fn relationship_score(&self) -> u32 {
        self.relationship_score
    }

    /// Held items.
    pub const fn inventory(&self) -> &BTreeMap<ItemId, u32> {
        &self.inventory
    }

    /// Units of `item` held.
    pub fn held(&self, item: &ItemId) -> u32 {
        inventory::held(&self.inventory, item)
    }

    /// Bell balance.
    pub const fn bells(&self) -> u64 {
        self.bells
    }

    /// Miles balance.
    pub const fn miles(&self) -> u64 {
        self.miles
    }

    /// Last day a gift or conversation was accepted.
    pub const fn last_interaction_day(&self) -> Option<u64> {
        self.last_interaction_day
    }

    /// Day the agent arrived on the island.
    pub const fn joined_day(&self) -> u64 {
        self.joined_day
    }

    /// Activities performed today, in order.
    pub fn daily_log(&self) -> &[Activity] {
        &self.daily_log
    }

    /// Fail unless the agent holds at least `quantity` of `item`.
    pub fn ensure_holds(&self, item: &ItemId, quantity: u32) -> Result<(), AgentError> {
        if inventory::has_item(&self.inventory, item, quantity) {
            return Ok(());
        }
        Err(AgentError::InsufficientInventory {
            item: item.clone(),
            requested: quantity,
            available: self.held(item),
        })
    }

    /// Fail unless the agent can pay `amount` bells.
    pub fn ensure_funds(&self, amount: u64) -> Result<(), AgentError> {
        if self.bells < amount {
            return Err(AgentError::InsufficientFunds {
                agent: self.name.clone(),
                required: amount,
                available: self.bells,
            });
        }
        Ok(())
    }

    /// Fail if the agent already accepted an interaction on `day`.
    pub fn ensure_can_interact(&self, day: u64) -> Result<(), AgentError> {
        if self.last_interaction_day == Some(day) {
            return Err(AgentError::AlreadyInteractedToday {
                agent: self.name.clone(),
                day,
            });
        }
        Ok(())
    }

    /// Add items to the inventory, returning the new quantity held.
    pub fn add_item(&mut self, item: &ItemId, quantity: u32) -> Result<u32, AgentError> {
        inventory::add_item(&mut self.inventory, item, quantity)
    }

    /// Remove items from the inventory, returning the quantity left.
    pub fn remove_item(&mut self, item: &ItemId, quantity: u32) -> Result<u32, AgentError> {
        inventory::remove_item(&mut self.inventory, item, quantity)
    }

    /// Pay `amount` bells, returning the new balance.
    pub fn debit_bells(&mut self, amount: u64) -> Result<u64, AgentError> {
        self.ensure_funds(amount)?;
        self.bells = self
            .bells
            .checked_sub(amount)
            .ok_or_else(|| overflow("bell balance underflow"))?;
        Ok(self.bells)
    }

    /// Receive `amount` bells, returning the new balance.
    pub fn credit_bells(&mut self, amount: u64) -> Result<u64, AgentError> {
        self.bells = self
            .bells
            .checked_add(amount)
            .ok_or_else(|| overflow("bell balance overflow"))?;
        Ok(self.bells)
    }

    /// Receive `amount` miles, returning the new balance.
    pub fn credit_miles(&mut self, amount: u64) -> Result<u64, AgentError> {
        self.miles = self
            .miles
            .checked_add(amount)
            .ok_or_else(|| overflow("miles balance overflow"))?;
        Ok(self.miles)
    }

    /// Hand over `quantity` of `item` for `proceeds` bells.
    ///
    /// Returns `(bells_after, held_after)`. Nothing changes on error.
    pub fn settle_sale(
        &mut self,
        item: &ItemId,
        quantity: u32,
        proceeds: u64,
    ) -> Result<(u64, u32), AgentError> {
        self.ensure_holds(item, quantity)?;
        let bells_after = self
            .bells
            .checked_add(proceeds)
            .ok_or_else(|| overflow("bell balance overflow on sale"))?;
        let held_after = self.remove_item(item, quantity)?;
        self.bells = bells_after;
        Ok((bells_after, held_after))
    }

    /// Pay `cost` bells for `quantity` of `item`.
    ///
    /// Returns `(bells_after, held_after)`. Nothing changes on error.
    pub fn settle_purchase(
        &mut self,
        item: &ItemId,
        quantity: u32,
        cost: u64,
    ) -> Result<(u64, u32), AgentError> {
        self.ensure_funds(cost)?;
        self.held(item)
            .checked_add(quantity)
            .ok_or_else(|| overflow("inventory overflow on purchase"))?;
        let bells_after = self.debit_bells(cost)?;
        let held_after = self.add_item(item, quantity)?;
        Ok((bells_after, held_after))
    }

    /// Accept a gift or conversation worth `points`, returning the new score.
    fn accept_interaction(&mut self, points: u32, day: u64, config: &AgentConfig) -> u32 {
        self.relationship_score = config.raise_score(self.relationship_score, points);
        self.last_interaction_day = Some(day);
        self.relationship_score
    }

    /// Append an entry to today's activity log.
    pub fn record(&mut self, activity: Activity) {
        self.daily_log.push(activity);
    }

    /// Clear today's activity log.
    pub fn clear_daily_log(&mut self) {
        self.daily_log.clear();
    }

    /// Serializable copy of the agent's state.
    pub fn view(&self) -> AgentView {
        AgentView {
            name: self.name.clone(),
            bells: self.bells,
            miles: self.miles,
            relationship_score: self.relationship_score,
            inventory: self.inventory.clone(),
            last_interaction_day: self.last_interaction_day,
            joined_day: self.joined_day,
            daily_log: self.daily_log.clone(),
        }
    }
}

fn overflow(context: &str) -> AgentError {
    AgentError::ArithmeticOverflow {
        context: String::from(context),
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Owns every agent on the island, in arrival order.
#[derive(Debug, Clone)]
pub struct AgentRoster {
    config: AgentConfig,
    agents: Vec<Agent>,
    /// Set of all agent names currently in use (for uniqueness checks).
    names_in_use: BTreeSet<AgentName>,
}

impl AgentRoster {
    /// Create an empty roster.
    pub const fn new(config: AgentConfig) -> Self {
        Self {
            config,
            agents: Vec::new(),
            names_in_use: BTreeSet::new(),
        }
    }

    /// The configuration new agents are created with.
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Add a new agent arriving on `day`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateName`] if the name is already taken.
    pub fn add(&mut self, name: AgentName, day: u64) -> Result<&Agent, AgentError> {
        if self.names_in_use.contains(&name) {
            return Err(AgentError::DuplicateName(name));
        }
        self.names_in_use.insert(name.clone());
        debug!(agent = %name, day, "agent joined the island");
        self.agents.push(Agent::new(name, day, &self.config));
        self.agents
            .last()
            .ok_or_else(|| overflow("roster push did not retain the agent"))
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Whether `name` is on the island.
    pub fn contains(&self, name: &str) -> bool {
        self.names_in_use.contains(name)
    }

    /// All agents in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Look up an agent.
    pub fn get(&self, name: &str) -> Result<&Agent, AgentError> {
        self.agents
            .iter()
            .find(|a| a.name.as_str() == name)
            .ok_or_else(|| AgentError::AgentNotFound(AgentName::from(name)))
    }

    /// Look up an agent for mutation.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Agent, AgentError> {
        self.agents
            .iter_mut()
            .find(|a| a.name.as_str() == name)
            .ok_or_else(|| AgentError::AgentNotFound(AgentName::from(name)))
    }

    /// Run every agent-side check for a gift without changing anything.
    ///
    /// Checks, in order: self-gift, both agents exist, the recipient has
    /// not interacted today, the giver holds the item.
    pub fn check_gift(
        &self,
        giver: &AgentName,
        recipient: &AgentName,
        item: &ItemId,
        day: u64,
    ) -> Result<(), AgentError> {
        let (from, _) = self.check_interaction(giver, recipient, day)?;
        from.ensure_holds(item, 1)
    }

    /// Move one unit of `item` from `giver` to `recipient` and raise the
    /// recipient's score by `points`.
    pub fn give_gift(
        &mut self,
        giver: &AgentName,
        recipient: &AgentName,
        item: &ItemId,
        points: u32,
        day: u64,
    ) -> Result<InteractionReceipt, AgentError> {
        self.check_gift(giver, recipient, item, day)?;
        let (from, to) = pair_mut(&mut self.agents, giver, recipient)?;
        from.remove_item(item, 1)?;
        let relationship_after = to.accept_interaction(points, day, &self.config);
        from.record(Activity::GaveGift {
            recipient: recipient.clone(),
            item: item.clone(),
        });
        Ok(InteractionReceipt {
            actor: giver.clone(),
            recipient: recipient.clone(),
            item: Some(item.clone()),
            friendship_gained: points,
            relationship_after,
        })
    }

    /// Have `actor` chat with `target`, raising the target's score by the
    /// configured conversation value.
    pub fn talk(
        &mut self,
        actor: &AgentName,
        target: &AgentName,
        day: u64,
    ) -> Result<InteractionReceipt, AgentError> {
        self.check_interaction(actor, target, day)?;
        let points = self.config.talk_friendship;
        let (speaker, listener) = pair_mut(&mut self.agents, actor, target)?;
        let relationship_after = listener.accept_interaction(points, day, &self.config);
        speaker.record(Activity::Talked {
            target: target.clone(),
        });
        Ok(InteractionReceipt {
            actor: actor.clone(),
            recipient: target.clone(),
            item: None,
            friendship_gained: points,
            relationship_after,
        })
    }

    /// Clear every agent's daily log.
    pub fn reset_daily_logs(&mut self) {
        for agent in &mut self.agents {
            agent.clear_daily_log();
        }
    }

    /// Serializable copies of every agent.
    pub fn views(&self) -> Vec<AgentView> {
        self.agents.iter().map(Agent::view).collect()
    }

    fn check_interaction(
        &self,
        actor: &AgentName,
        target: &AgentName,
        day: u64,
    ) -> Result<(&Agent, &Agent), AgentError> {
        if actor == target {
            return Err(AgentError::SelfInteraction(actor.clone()));
        }
        let from = self.get(actor.as_str())?;
        let to = self.get(target.as_str())?;
        to.ensure_can_interact(day)?;
        Ok((from, to))
    }
}

/// Borrow two distinct agents mutably at once.
fn pair_mut<'a>(
    agents: &'a mut [Agent],
    first: &AgentName,
    second: &AgentName,
) -> Result<(&'a mut Agent, &'a mut Agent), AgentError> {
    if first == second {
        return Err(AgentError::SelfInteraction(first.clone()));
    }
    let mut a = None;
    let mut b = None;
    for agent in agents.iter_mut() {
        if agent.name == *first {
            a = Some(agent);
        } else if agent.name == *second {
            b = Some(agent);
        }
    }
    match (a, b) {
        (Some(a), Some(b)) => Ok((a, b)),
        (None, _) => Err(AgentError::AgentNotFound(first.clone())),
        (_, None) => Err(AgentError::AgentNotFound(second.clone())),
    }
}

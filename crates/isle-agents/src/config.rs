//! Configuration defaults for villager balances and relationships.
//!
//! These values correspond to the `agents` section of `isle-config.yaml`.
//! The [`AgentConfig`] struct bundles every tunable so that callers (the
//! engine, tests) can override defaults.

use std::collections::BTreeMap;

use isle_types::ItemId;
use serde::{Deserialize, Serialize};

/// Configuration for new agents and for relationship arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Bells every new agent starts with (default: 1000).
    pub starting_bells: u64,

    /// Miles every new agent starts with (default: 500).
    pub starting_miles: u64,

    /// Relationship score of a new agent (default: 0).
    pub relationship_baseline: u32,

    /// Upper bound of the relationship score (default: 255).
    pub relationship_max: u32,

    /// Points a conversation adds to the listener's score (default: 5).
    pub talk_friendship: u32,

    /// Items every new agent arrives with (default: none).
    pub starting_inventory: BTreeMap<ItemId, u32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            starting_bells: 1000,
            starting_miles: 500,
            relationship_baseline: 0,
            relationship_max: 255,
            talk_friendship: 5,
            starting_inventory: BTreeMap::new(),
        }
    }
}

impl AgentConfig {
    /// Starting relationship score, clamped to the configured maximum.
    pub fn starting_score(&self) -> u32 {
        self.relationship_baseline.min(self.relationship_max)
    }

    /// Add `points` to `score`, saturating at the configured maximum.
    pub fn raise_score(&self, score: u32, points: u32) -> u32 {
        score.saturating_add(points).min(self.relationship_max)
    }
}

//! Catalog record types.
//!
//! These are the rows of the static catalog: immutable reference data that
//! the engine reads but never writes. Each record deserializes directly from
//! the catalog YAML document. Optional fields mean "feature unavailable for
//! this record" (an item with no `buy_price` cannot be bought, an item with
//! no `friendship_value` cannot be gifted).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{GiftPreference, ItemCategory};
use crate::ids::{AgentName, ItemId, TemplateId};

/// Friendship value of a crop when none is given in the catalog.
pub const DEFAULT_CROP_FRIENDSHIP: u32 = 2;

/// A general item that can be held, sold, and possibly bought or gifted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Unique item name.
    pub id: ItemId,
    /// Pricing category.
    pub category: ItemCategory,
    /// Undiscounted price paid to the seller, in bells.
    pub sell_price: u32,
    /// Price to buy one unit, if the item is sold in shops.
    #[serde(default)]
    pub buy_price: Option<u32>,
    /// Friendship points granted when gifted, if the item is giftable.
    #[serde(default)]
    pub friendship_value: Option<u32>,
}

/// A fish species that can be caught and sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishRecord {
    /// Unique fish name.
    pub id: ItemId,
    /// Undiscounted sell price in bells.
    pub sell_price: u32,
    /// Where the fish lives (river, sea, pond), informational only.
    #[serde(default)]
    pub location: Option<String>,
    /// Friendship points when gifted, if giftable.
    #[serde(default)]
    pub friendship_value: Option<u32>,
}

/// A crop that can be planted in a farm plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRecord {
    /// Unique crop name (also the item id of the harvested produce).
    pub id: ItemId,
    /// Days between planting and readiness. Must be at least 1.
    pub growth_duration_days: u64,
    /// Sell price of one harvested unit.
    pub sell_price: u32,
    /// Bells charged when planting.
    pub seed_cost: u32,
    /// Units yielded by one harvest.
    #[serde(default = "default_yield")]
    pub yield_quantity: u32,
    /// Friendship points when the produce is gifted.
    #[serde(default = "default_crop_friendship")]
    pub friendship_value: Option<u32>,
}

/// A villager that can live on the island.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillagerRecord {
    /// Unique villager name.
    pub name: AgentName,
    /// Gift preferences for specific items; unlisted items are neutral.
    #[serde(default)]
    pub preferences: BTreeMap<ItemId, GiftPreference>,
}

impl VillagerRecord {
    /// Return the villager's preference for an item.
    pub fn preference_for(&self, item: &ItemId) -> GiftPreference {
        self.preferences.get(item).copied().unwrap_or_default()
    }
}

/// Template for a daily task (an objective with a countable target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Unique template id.
    pub id: TemplateId,
    /// Human-readable description of the objective.
    pub description: String,
    /// Units of progress needed to complete the task. Must be at least 1.
    pub target_quantity: u32,
    /// Miles credited to the agent whose progress completes the task.
    pub miles_reward: u32,
    /// Days an instance stays on the board before it expires.
    #[serde(default = "default_duration_days")]
    pub duration_days: u64,
}

const fn default_yield() -> u32 {
    1
}

#[allow(clippy::unnecessary_wraps)]
const fn default_crop_friendship() -> Option<u32> {
    Some(DEFAULT_CROP_FRIENDSHIP)
}

const fn default_duration_days() -> u64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_defaults_apply() {
        let json = r#"{"id":"Tomato","growth_duration_days":4,"sell_price":35,"seed_cost":20}"#;
        let crop: Result<CropRecord, _> = serde_json::from_str(json);
        let crop = crop.ok();
        assert_eq!(crop.as_ref().map(|c| c.yield_quantity), Some(1));
        assert_eq!(
            crop.and_then(|c| c.friendship_value),
            Some(DEFAULT_CROP_FRIENDSHIP)
        );
    }

    #[test]
    fn villager_preference_defaults_to_neutral() {
        let mut preferences = BTreeMap::new();
        preferences.insert(ItemId::from("Pear"), GiftPreference::Loved);
        let villager = VillagerRecord {
            name: AgentName::from("Audie"),
            preferences,
        };
        assert_eq!(
            villager.preference_for(&ItemId::from("Pear")),
            GiftPreference::Loved
        );
        assert_eq!(
            villager.preference_for(&ItemId::from("Stone")),
            GiftPreference::Neutral
        );
    }
}

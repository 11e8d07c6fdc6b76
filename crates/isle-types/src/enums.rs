//! Enumeration types shared across the island simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Item categories
// ---------------------------------------------------------------------------

/// Broad category of a catalog item.
///
/// The category decides which pricing rule applies when the item is sold:
/// the tracked commodity follows the weekly market cycle, saturating
/// categories (fish by default) lose value as they are sold, and every
/// other category sells at its flat catalog price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Furniture, clothing, tools and other general goods.
    General,
    /// Fish caught from the river or the sea.
    Fish,
    /// Insects caught around the island.
    Bug,
    /// Harvested crops.
    Crop,
    /// Fossils dug up from the ground.
    Fossil,
    /// Wrapped presents and fruit baskets bought for gifting.
    Gift,
    /// The weekly-cycle commodity (turnips).
    Commodity,
}

impl ItemCategory {
    /// Stable lowercase label, used for logging and catalog documents.
    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Fish => "fish",
            Self::Bug => "bug",
            Self::Crop => "crop",
            Self::Fossil => "fossil",
            Self::Gift => "gift",
            Self::Commodity => "commodity",
        }
    }
}

// ---------------------------------------------------------------------------
// Farm plots
// ---------------------------------------------------------------------------

/// Lifecycle state of a single farm plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotState {
    /// Nothing planted.
    Empty,
    /// A crop is planted and has not yet reached its ready day.
    Growing,
    /// The crop is mature and can be harvested.
    Ready,
}

// ---------------------------------------------------------------------------
// Gift preferences
// ---------------------------------------------------------------------------

/// How much a villager likes a particular gift.
///
/// The preference scales the catalog friendship value of the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftPreference {
    /// Double friendship.
    Loved,
    /// Normal friendship.
    Liked,
    /// Normal friendship (the default for unlisted items).
    #[default]
    Neutral,
    /// No friendship gained, the gift is still consumed.
    Disliked,
}

impl GiftPreference {
    /// Multiplier applied to the item's friendship value.
    pub const fn multiplier(self) -> u32 {
        match self {
            Self::Loved => 2,
            Self::Liked | Self::Neutral => 1,
            Self::Disliked => 0,
        }
    }
}

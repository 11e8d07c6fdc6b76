//! Static catalog: read-only reference tables for the island.
//!
//! The catalog holds every item, fish, crop, villager and task template the
//! world knows about. It is built once (from a YAML document or from
//! [`default_catalog`]), validated, and then shared between engines behind an
//! `Arc`. Nothing in the simulation mutates it.
//!
//! Items, fish and crops share a single id namespace, so an id resolves to
//! exactly one record whatever table it came from.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use isle_types::{
    AgentName, CropRecord, FishRecord, GiftPreference, ItemCategory, ItemId, ItemRecord,
    TaskTemplate, TemplateId, VillagerRecord,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Failed to read the catalog file from disk.
    #[error("failed to read catalog file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse catalog YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A required table is absent or empty.
    #[error("catalog is missing the required `{0}` table")]
    MissingTable(&'static str),

    /// The same id appears twice.
    #[error("duplicate id `{id}` in the {table} table")]
    DuplicateId {
        /// Table where the duplicate was found.
        table: &'static str,
        /// The repeated id.
        id: String,
    },

    /// A crop would never ripen.
    #[error("crop `{0}` has a zero growth duration")]
    ZeroGrowth(ItemId),

    /// A task template could never be completed.
    #[error("task template `{0}` has a zero target quantity")]
    ZeroTarget(TemplateId),

    /// An item could be bought below its own sell price.
    #[error("item `{item}` buys for {buy_price} but sells for {sell_price}")]
    InvertedPrice {
        /// The offending item.
        item: ItemId,
        /// Catalog buy price.
        buy_price: u32,
        /// Catalog sell price.
        sell_price: u32,
    },
}

impl From<serde_yml::Error> for CatalogError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Raw catalog document as written in YAML.
///
/// Every table is optional at the parse level so that a missing table is
/// reported as [`CatalogError::MissingTable`] rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// General goods, gifts and the tracked commodity.
    #[serde(default)]
    pub items: Option<Vec<ItemRecord>>,
    /// Villagers, in arrival order.
    #[serde(default)]
    pub villagers: Option<Vec<VillagerRecord>>,
    /// Catchable fish.
    #[serde(default)]
    pub fish: Option<Vec<FishRecord>>,
    /// Plantable crops.
    #[serde(default)]
    pub crops: Option<Vec<CropRecord>>,
    /// Daily task templates, in selection order.
    #[serde(default)]
    pub tasks: Option<Vec<TaskTemplate>>,
}

// ---------------------------------------------------------------------------
// StaticCatalog
// ---------------------------------------------------------------------------

/// Validated, immutable catalog tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCatalog {
    items: BTreeMap<ItemId, ItemRecord>,
    fish: BTreeMap<ItemId, FishRecord>,
    /// Fish ids in document order, for uniform catch selection.
    fish_order: Vec<ItemId>,
    crops: BTreeMap<ItemId, CropRecord>,
    villagers: Vec<VillagerRecord>,
    tasks: Vec<TaskTemplate>,
}

impl StaticCatalog {
    /// Validate a parsed document and build the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingTable`] for an absent or empty table,
    /// [`CatalogError::DuplicateId`] for repeated ids (across items, fish
    /// and crops, or within villagers and tasks), and the record-level
    /// errors for zero growth, zero targets or inverted prices.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let items = required(document.items, "items")?;
        let villagers = required(document.villagers, "villagers")?;
        let fish = required(document.fish, "fish")?;
        let crops = required(document.crops, "crops")?;
        let tasks = required(document.tasks, "tasks")?;

        let mut ids: BTreeSet<ItemId> = BTreeSet::new();

        let mut item_map = BTreeMap::new();
        for item in items {
            claim(&mut ids, &item.id, "items")?;
            match item.buy_price {
                Some(buy_price) if buy_price < item.sell_price => {
                    return Err(CatalogError::InvertedPrice {
                        item: item.id,
                        buy_price,
                        sell_price: item.sell_price,
                    });
                }
                _ => {}
            }
            item_map.insert(item.id.clone(), item);
        }

        let mut fish_map = BTreeMap::new();
        let mut fish_order = Vec::with_capacity(fish.len());
        for record in fish {
            claim(&mut ids, &record.id, "fish")?;
            fish_order.push(record.id.clone());
            fish_map.insert(record.id.clone(), record);
        }

        let mut crop_map = BTreeMap::new();
        for crop in crops {
            claim(&mut ids, &crop.id, "crops")?;
            if crop.growth_duration_days == 0 {
                return Err(CatalogError::ZeroGrowth(crop.id));
            }
            crop_map.insert(crop.id.clone(), crop);
        }

        let mut names: BTreeSet<&AgentName> = BTreeSet::new();
        for villager in &villagers {
            if !names.insert(&villager.name) {
                return Err(CatalogError::DuplicateId {
                    table: "villagers",
                    id: villager.name.to_string(),
                });
            }
        }

        let mut template_ids: BTreeSet<&TemplateId> = BTreeSet::new();
        for task in &tasks {
            if !template_ids.insert(&task.id) {
                return Err(CatalogError::DuplicateId {
                    table: "tasks",
                    id: task.id.to_string(),
                });
            }
            if task.target_quantity == 0 {
                return Err(CatalogError::ZeroTarget(task.id.clone()));
            }
        }

        Ok(Self {
            items: item_map,
            fish: fish_map,
            fish_order,
            crops: crop_map,
            villagers,
            tasks,
        })
    }

    /// Parse and validate a catalog from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Yaml`] if the string is not valid YAML, or
    /// any validation error from [`StaticCatalog::from_document`].
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_yml::from_str(yaml)?;
        Self::from_document(document)
    }

    /// Load and validate a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, plus every
    /// error [`StaticCatalog::from_yaml`] can return.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Look up a general item.
    pub fn item(&self, id: &str) -> Option<&ItemRecord> {
        self.items.get(id)
    }

    /// Look up a fish.
    pub fn fish(&self, id: &str) -> Option<&FishRecord> {
        self.fish.get(id)
    }

    /// Look up a crop.
    pub fn crop(&self, id: &str) -> Option<&CropRecord> {
        self.crops.get(id)
    }

    /// Look up a villager by name.
    pub fn villager(&self, name: &str) -> Option<&VillagerRecord> {
        self.villagers.iter().find(|v| v.name.as_str() == name)
    }

    /// All villagers in document order.
    pub fn villagers(&self) -> &[VillagerRecord] {
        &self.villagers
    }

    /// All task templates in document order.
    pub fn tasks(&self) -> &[TaskTemplate] {
        &self.tasks
    }

    /// Fish ids in document order.
    pub fn fish_ids(&self) -> &[ItemId] {
        &self.fish_order
    }

    /// Whether the id names any item, fish or crop.
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id) || self.fish.contains_key(id) || self.crops.contains_key(id)
    }

    /// Pricing category of any known item.
    pub fn category_of(&self, id: &str) -> Option<ItemCategory> {
        if let Some(item) = self.items.get(id) {
            return Some(item.category);
        }
        if self.fish.contains_key(id) {
            return Some(ItemCategory::Fish);
        }
        self.crops.get(id).map(|_| ItemCategory::Crop)
    }

    /// Undiscounted sell price of any known item.
    pub fn sell_price_of(&self, id: &str) -> Option<u32> {
        self.items
            .get(id)
            .map(|i| i.sell_price)
            .or_else(|| self.fish.get(id).map(|f| f.sell_price))
            .or_else(|| self.crops.get(id).map(|c| c.sell_price))
    }

    /// Catalog buy price. `None` when the item is unknown or not sold in
    /// shops; only general items can carry one.
    pub fn buy_price_of(&self, id: &str) -> Option<u32> {
        self.items.get(id).and_then(|i| i.buy_price)
    }

    /// Friendship value of any known item.
    ///
    /// The outer `Option` is `None` for unknown ids; the inner one is `None`
    /// for items that cannot be gifted.
    pub fn friendship_value_of(&self, id: &str) -> Option<Option<u32>> {
        self.items
            .get(id)
            .map(|i| i.friendship_value)
            .or_else(|| self.fish.get(id).map(|f| f.friendship_value))
            .or_else(|| self.crops.get(id).map(|c| c.friendship_value))
    }

    /// A villager's preference for an item, neutral for unknown villagers.
    pub fn preference(&self, villager: &str, item: &ItemId) -> GiftPreference {
        self.villager(villager)
            .map(|v| v.preference_for(item))
            .unwrap_or_default()
    }
}

fn required<T>(table: Option<Vec<T>>, name: &'static str) -> Result<Vec<T>, CatalogError> {
    match table {
        Some(rows) if !rows.is_empty() => Ok(rows),
        _ => Err(CatalogError::MissingTable(name)),
    }
}

fn claim(ids: &mut BTreeSet<ItemId>, id: &ItemId, table: &'static str) -> Result<(), CatalogError> {
    if ids.insert(id.clone()) {
        Ok(())
    } else {
        Err(CatalogError::DuplicateId {
            table,
            id: id.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Built-in island
// ---------------------------------------------------------------------------

fn item(
    id: &str,
    category: ItemCategory,
    sell_price: u32,
    buy_price: Option<u32>,
    friendship_value: Option<u32>,
) -> ItemRecord {
    ItemRecord {
        id: ItemId::from(id),
        category,
        sell_price,
        buy_price,
        friendship_value,
    }
}

fn fish(id: &str, sell_price: u32, location: &str) -> FishRecord {
    FishRecord {
        id: ItemId::from(id),
        sell_price,
        location: Some(location.to_owned()),
        friendship_value: Some(2),
    }
}

fn crop(id: &str, days: u64, sell_price: u32, seed_cost: u32, yield_quantity: u32) -> CropRecord {
    CropRecord {
        id: ItemId::from(id),
        growth_duration_days: days,
        sell_price,
        seed_cost,
        yield_quantity,
        friendship_value: Some(isle_types::DEFAULT_CROP_FRIENDSHIP),
    }
}

fn villager(name: &str, preferences: &[(&str, GiftPreference)]) -> VillagerRecord {
    VillagerRecord {
        name: AgentName::from(name),
        preferences: preferences
            .iter()
            .map(|(item, pref)| (ItemId::from(*item), *pref))
            .collect(),
    }
}

fn task(id: &str, description: &str, target: u32, miles: u32, days: u64) -> TaskTemplate {
    TaskTemplate {
        id: TemplateId::from(id),
        description: description.to_owned(),
        target_quantity: target,
        miles_reward: miles,
        duration_days: days,
    }
}

/// The built-in island used when no catalog file is configured.
///
/// Ten villagers, a handful of shop goods, six fish, five crops and seven
/// task templates. The tracked commodity is `turnip`.
pub fn default_catalog() -> StaticCatalog {
    use GiftPreference::{Disliked, Liked, Loved};
    use ItemCategory::{Bug, Commodity, Fossil, General, Gift};

    StaticCatalog::assemble(
        vec![
            item("turnip", Commodity, 100, None, None),
            item("Wrapped Fruit", Gift, 100, Some(100), Some(3)),
            item("Apple", General, 100, None, Some(2)),
            item("Pear", General, 100, None, Some(2)),
            item("Cherry", General, 100, None, Some(2)),
            item("Wooden Chair", General, 300, Some(1200), Some(4)),
            item("Paper Lantern", General, 400, Some(1600), Some(5)),
            item("Amber", Fossil, 1200, None, None),
            item("Common Butterfly", Bug, 160, None, Some(1)),
        ],
        vec![
            fish("Sea Bass", 400, "Sea"),
            fish("Horse Mackerel", 150, "Sea"),
            fish("Squid", 500, "Sea"),
            fish("Crucian Carp", 160, "River"),
            fish("Black Bass", 400, "River"),
            fish("Koi", 4000, "Pond"),
        ],
        vec![
            crop("Tomato", 4, 35, 20, 3),
            crop("Carrot", 3, 30, 15, 2),
            crop("Potato", 5, 40, 25, 4),
            crop("Pumpkin", 6, 60, 40, 2),
            crop("Wheat", 2, 20, 10, 3),
        ],
        vec![
            villager("Audie", &[("Pear", Loved), ("Wooden Chair", Liked)]),
            villager("Raymond", &[("Paper Lantern", Loved), ("Squid", Disliked)]),
            villager("Marshal", &[("Cherry", Loved)]),
            villager("Judy", &[("Wrapped Fruit", Loved), ("Tomato", Liked)]),
            villager("Sherb", &[("Apple", Liked)]),
            villager("Stitches", &[("Pumpkin", Loved)]),
            villager("Zucker", &[("Sea Bass", Loved), ("Koi", Liked)]),
            villager("Ankha", &[("Amber", Liked), ("Wheat", Disliked)]),
            villager("Lolly", &[("Common Butterfly", Loved)]),
            villager("Fauna", &[("Carrot", Liked)]),
        ],
        vec![
            task("catch-fish", "Catch 5 fish", 5, 150, 1),
            task("sell-fish", "Sell 3 fish", 3, 200, 1),
            task("plant-crops", "Plant 2 crops", 2, 100, 1),
            task("give-gift", "Give a gift to a neighbour", 1, 100, 1),
            task("chat", "Talk to 3 villagers", 3, 50, 1),
            task("harvest", "Harvest a crop", 1, 120, 2),
            task("turnip-trader", "Sell 50 turnips", 50, 300, 3),
        ],
    )
}

impl StaticCatalog {
    /// Build the catalog directly from trusted tables, skipping validation.
    fn assemble(
        items: Vec<ItemRecord>,
        fish: Vec<FishRecord>,
        crops: Vec<CropRecord>,
        villagers: Vec<VillagerRecord>,
        tasks: Vec<TaskTemplate>,
    ) -> Self {
        let fish_order = fish.iter().map(|f| f.id.clone()).collect();
        Self {
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
            fish: fish.into_iter().map(|f| (f.id.clone(), f)).collect(),
            fish_order,
            crops: crops.into_iter().map(|c| (c.id.clone(), c)).collect(),
            villagers,
            tasks,
        }
    }

    /// Export the catalog back into a document (useful for writing a
    /// starter `catalog.yaml`).
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            items: Some(self.items.values().cloned().collect()),
            villagers: Some(self.villagers.clone()),
            fish: Some(
                self.fish_order
                    .iter()
                    .filter_map(|id| self.fish.get(id).cloned())
                    .collect(),
            ),
            crops: Some(self.crops.values().cloned().collect()),
            tasks: Some(self.tasks.clone()),
        }
    }
}

//! Commodity market with a weekly price cycle and sale saturation.
//!
//! The market runs on a fixed seven-day cycle with two phases:
//!
//! - **Acquisition day** (cycle day `acquisition_day`): the commodity can be
//!   bought at a price drawn uniformly from `[buy_price_min, buy_price_max]`.
//!   The draw uses a `SmallRng` seeded from `(world_seed, cycle_index)`, so
//!   the same world seed always yields the same weekly prices regardless of
//!   any other randomness in the run.
//! - **Vending days** (every later cycle day): the commodity sells at
//!   `buy_price * sell_multipliers[cycle_day]`, discounted by recent sale
//!   volume.
//!
//! # Saturation
//!
//! Every sale adds its units to a volume counter. A quote is
//!
//! ```text
//! floor(base * max(floor_factor, 1 - k * volume))
//! ```
//!
//! and the counter decays by a constant factor at every daily refresh.
//! Items in a saturating category (fish by default) follow the same rule per
//! item, using their catalog sell price as the base. The tracked commodity's
//! quote is additionally clamped to `min_sell_price`.

use std::collections::BTreeMap;

use isle_types::{ItemCategory, ItemId, MarketView};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::WorldError;

/// Number of days in one market cycle.
pub const CYCLE_LENGTH: u64 = 7;

/// Odd constant used to spread cycle indexes across the seed space.
const CYCLE_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Decimal places kept on decayed volume counters.
const VOLUME_SCALE: u32 = 6;

// ---------------------------------------------------------------------------
// MarketConfig
// ---------------------------------------------------------------------------

/// Tunable market parameters (the `market` section of `isle-config.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Item id of the tracked commodity.
    #[serde(default = "default_commodity")]
    pub commodity: ItemId,

    /// Cycle day on which the commodity is sold to villagers.
    #[serde(default)]
    pub acquisition_day: u64,

    /// Lowest possible acquisition price.
    #[serde(default = "default_buy_price_min")]
    pub buy_price_min: u64,

    /// Highest possible acquisition price.
    #[serde(default = "default_buy_price_max")]
    pub buy_price_max: u64,

    /// Sell multiplier for each cycle day (one entry per day of the cycle).
    #[serde(default = "default_sell_multipliers")]
    pub sell_multipliers: Vec<Decimal>,

    /// Discount per unit of recent commodity sale volume.
    #[serde(default = "default_saturation_k")]
    pub saturation_k: Decimal,

    /// Lowest saturation factor applied to the commodity.
    #[serde(default = "default_saturation_floor")]
    pub saturation_floor: Decimal,

    /// Factor applied to every volume counter at each daily refresh.
    #[serde(default = "default_volume_decay")]
    pub volume_decay: Decimal,

    /// Lowest commodity quote, in bells.
    #[serde(default = "default_min_sell_price")]
    pub min_sell_price: u64,

    /// Categories whose items saturate individually.
    #[serde(default = "default_saturating_categories")]
    pub saturating_categories: Vec<ItemCategory>,

    /// Discount per unit of recent sale volume for saturating items.
    #[serde(default = "default_secondary_k")]
    pub secondary_k: Decimal,

    /// Lowest saturation factor for saturating items.
    #[serde(default = "default_secondary_floor")]
    pub secondary_floor: Decimal,

    /// Decay factor for saturating items' volume counters.
    #[serde(default = "default_volume_decay")]
    pub secondary_decay: Decimal,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            commodity: default_commodity(),
            acquisition_day: 0,
            buy_price_min: default_buy_price_min(),
            buy_price_max: default_buy_price_max(),
            sell_multipliers: default_sell_multipliers(),
            saturation_k: default_saturation_k(),
            saturation_floor: default_saturation_floor(),
            volume_decay: default_volume_decay(),
            min_sell_price: default_min_sell_price(),
            saturating_categories: default_saturating_categories(),
            secondary_k: default_secondary_k(),
            secondary_floor: default_secondary_floor(),
            secondary_decay: default_volume_decay(),
        }
    }
}

fn default_commodity() -> ItemId {
    ItemId::from("turnip")
}

const fn default_buy_price_min() -> u64 {
    90
}

const fn default_buy_price_max() -> u64 {
    110
}

fn default_sell_multipliers() -> Vec<Decimal> {
    vec![
        Decimal::ONE,
        Decimal::new(9, 1),
        Decimal::new(12, 1),
        Decimal::new(15, 1),
        Decimal::new(11, 1),
        Decimal::new(8, 1),
        Decimal::new(6, 1),
    ]
}

fn default_saturation_k() -> Decimal {
    Decimal::new(5, 4)
}

fn default_saturation_floor() -> Decimal {
    Decimal::new(2, 1)
}

fn default_volume_decay() -> Decimal {
    Decimal::new(5, 1)
}

const fn default_min_sell_price() -> u64 {
    10
}

fn default_saturating_categories() -> Vec<ItemCategory> {
    vec![ItemCategory::Fish]
}

fn default_secondary_k() -> Decimal {
    Decimal::new(3, 2)
}

fn default_secondary_floor() -> Decimal {
    Decimal::new(2, 1)
}

// ---------------------------------------------------------------------------
// MarketModel
// ---------------------------------------------------------------------------

/// Live market state for one world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketModel {
    config: MarketConfig,
    world_seed: u64,
    day: u64,
    /// Cycle whose acquisition price is held in `buy_price`.
    priced_cycle: Option<u64>,
    buy_price: Option<u64>,
    daily_sell_price: Option<u64>,
    recent_sale_volume: Decimal,
    secondary_volume: BTreeMap<ItemId, Decimal>,
}

impl MarketModel {
    /// Create a market with no prices set. Call [`MarketModel::refresh`]
    /// for the starting day before quoting.
    pub const fn new(config: MarketConfig, world_seed: u64) -> Self {
        Self {
            config,
            world_seed,
            day: 0,
            priced_cycle: None,
            buy_price: None,
            daily_sell_price: None,
            recent_sale_volume: Decimal::ZERO,
            secondary_volume: BTreeMap::new(),
        }
    }

    /// Market configuration.
    pub const fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Tracked commodity.
    pub const fn commodity(&self) -> &ItemId {
        &self.config.commodity
    }

    /// Position of `day` within the cycle.
    pub fn cycle_day_of(day: u64) -> u64 {
        day.checked_rem(CYCLE_LENGTH).unwrap_or(0)
    }

    /// Current position within the cycle.
    pub fn cycle_day(&self) -> u64 {
        Self::cycle_day_of(self.day)
    }

    /// Acquisition price for the current cycle, once drawn.
    pub const fn buy_price(&self) -> Option<u64> {
        self.buy_price
    }

    /// Undiscounted commodity sell price for today, on vending days.
    pub const fn daily_sell_price(&self) -> Option<u64> {
        self.daily_sell_price
    }

    /// Decaying commodity sale-volume counter.
    pub const fn recent_sale_volume(&self) -> Decimal {
        self.recent_sale_volume
    }

    /// Decaying sale-volume counter for a saturating item.
    pub fn secondary_volume(&self, item: &str) -> Decimal {
        self.secondary_volume
            .get(item)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether `item` is the tracked commodity.
    pub fn is_commodity(&self, item: &ItemId) -> bool {
        *item == self.config.commodity
    }

    /// Whether items of `category` saturate individually.
    pub fn saturates(&self, category: ItemCategory) -> bool {
        self.config.saturating_categories.contains(&category)
    }

    /// Whether the commodity can be bought today.
    pub fn acquisition_open(&self) -> bool {
        self.cycle_day() == self.config.acquisition_day && self.buy_price.is_some()
    }

    /// Advance the market to `day`.
    ///
    /// Decays every volume counter, draws the cycle's acquisition price on
    /// (or, when days were skipped, after) the acquisition day, and sets the
    /// daily sell price on vending days.
    pub fn refresh(&mut self, day: u64) -> Result<(), WorldError> {
        self.recent_sale_volume = decay(self.recent_sale_volume, self.config.volume_decay)?;
        let secondary_decay = self.config.secondary_decay;
        let mut decayed = BTreeMap::new();
        for (item, volume) in &self.secondary_volume {
            let next = decay(*volume, secondary_decay)?;
            if next > Decimal::ZERO {
                decayed.insert(item.clone(), next);
            }
        }
        self.secondary_volume = decayed;

        self.day = day;
        let cycle_day = Self::cycle_day_of(day);
        let cycle_index = day.checked_div(CYCLE_LENGTH).unwrap_or(0);

        if cycle_day < self.config.acquisition_day {
            self.buy_price = None;
            self.daily_sell_price = None;
            self.priced_cycle = None;
            return Ok(());
        }

        if self.priced_cycle != Some(cycle_index) {
            let price = self.draw_buy_price(cycle_index);
            info!(
                day,
                cycle_index,
                buy_price = price,
                "commodity acquisition price drawn"
            );
            self.buy_price = Some(price);
            self.priced_cycle = Some(cycle_index);
        }

        if cycle_day == self.config.acquisition_day {
            self.daily_sell_price = None;
        } else {
            let multiplier = self
                .config
                .sell_multipliers
                .get(usize::try_from(cycle_day).unwrap_or(usize::MAX))
                .copied()
                .unwrap_or(Decimal::ONE);
            let base = self.buy_price.map(Decimal::from).unwrap_or_default();
            let price = base
                .checked_mul(multiplier)
                .and_then(|p| p.floor().to_u64())
                .ok_or_else(|| WorldError::overflow("daily sell price"))?;
            debug!(day, cycle_day, daily_sell_price = price, "commodity sell price set");
            self.daily_sell_price = Some(price);
        }
        Ok(())
    }

    /// Acquisition price, available only on the acquisition day.
    pub fn commodity_buy_price(&self) -> Result<u64, WorldError> {
        match self.buy_price {
            Some(price) if self.cycle_day() == self.config.acquisition_day => Ok(price),
            _ => Err(WorldError::MarketClosed {
                item: self.config.commodity.clone(),
                cycle_day: self.cycle_day(),
            }),
        }
    }

    /// Price a seller of one commodity unit receives right now.
    pub fn commodity_quote(&self) -> Result<u64, WorldError> {
        let base = self
            .daily_sell_price
            .ok_or(WorldError::MarketNotReady { day: self.day })?;
        let factor = saturation_factor(
            self.config.saturation_k,
            self.recent_sale_volume,
            self.config.saturation_floor,
        )?;
        let quote = discount(base, factor)?;
        Ok(quote.max(self.config.min_sell_price))
    }

    /// Price a seller of one unit of a saturating item receives right now.
    pub fn secondary_quote(&self, item: &ItemId, base_price: u32) -> Result<u64, WorldError> {
        let factor = saturation_factor(
            self.config.secondary_k,
            self.secondary_volume(item.as_str()),
            self.config.secondary_floor,
        )?;
        discount(u64::from(base_price), factor)
    }

    /// Per-unit sell quote for any item.
    ///
    /// The commodity follows the weekly cycle, saturating categories use
    /// their own discounted quote, and everything else sells at its catalog
    /// price.
    pub fn sell_quote(
        &self,
        item: &ItemId,
        category: ItemCategory,
        catalog_price: u32,
    ) -> Result<u64, WorldError> {
        if self.is_commodity(item) {
            self.commodity_quote()
        } else if self.saturates(category) {
            self.secondary_quote(item, catalog_price)
        } else {
            Ok(u64::from(catalog_price))
        }
    }

    /// Record a completed sale so later quotes see the added volume.
    pub fn record_sale(
        &mut self,
        item: &ItemId,
        category: ItemCategory,
        quantity: u32,
    ) -> Result<(), WorldError> {
        let units = Decimal::from(quantity);
        if self.is_commodity(item) {
            self.recent_sale_volume = self
                .recent_sale_volume
                .checked_add(units)
                .ok_or_else(|| WorldError::overflow("commodity sale volume"))?;
        } else if self.saturates(category) {
            let entry = self
                .secondary_volume
                .entry(item.clone())
                .or_insert(Decimal::ZERO);
            *entry = entry
                .checked_add(units)
                .ok_or_else(|| WorldError::overflow("secondary sale volume"))?;
        }
        Ok(())
    }

    /// Serializable copy of the commodity market state.
    pub fn view(&self) -> MarketView {
        MarketView {
            commodity: self.config.commodity.clone(),
            buy_price: self.buy_price,
            daily_sell_price: self.daily_sell_price,
            quoted_sell_price: self.commodity_quote().ok(),
            recent_sale_volume: self.recent_sale_volume,
            acquisition_open: self.acquisition_open(),
        }
    }

    fn draw_buy_price(&self, cycle_index: u64) -> u64 {
        let seed = self.world_seed ^ cycle_index.wrapping_mul(CYCLE_SEED_MIX);
        let mut rng = SmallRng::seed_from_u64(seed);
        let low = self.config.buy_price_min.min(self.config.buy_price_max);
        let high = self.config.buy_price_min.max(self.config.buy_price_max);
        rng.random_range(low..=high)
    }
}

/// `max(floor, 1 - k * volume)`, never above one.
fn saturation_factor(k: Decimal, volume: Decimal, floor: Decimal) -> Result<Decimal, WorldError> {
    let raw = k
        .checked_mul(volume)
        .and_then(|impact| Decimal::ONE.checked_sub(impact))
        .ok_or_else(|| WorldError::overflow("saturation factor"))?;
    Ok(raw.max(floor).min(Decimal::ONE))
}

/// `floor(base * factor)` in whole bells.
fn discount(base: u64, factor: Decimal) -> Result<u64, WorldError> {
    Decimal::from(base)
        .checked_mul(factor)
        .and_then(|p| p.floor().to_u64())
        .ok_or_else(|| WorldError::overflow("discounted price"))
}

fn decay(volume: Decimal, factor: Decimal) -> Result<Decimal, WorldError> {
    volume
        .checked_mul(factor)
        .map(|v| v.round_dp(VOLUME_SCALE))
        .ok_or_else(|| WorldError::overflow("volume decay"))
}

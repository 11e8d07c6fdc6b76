//! Shared type definitions for the island simulation.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: identifiers, catalog records, daily activity records, the
//! action/receipt vocabulary spoken between the engine and its decision
//! collaborator, and the serializable world snapshot.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe name wrappers for agents, items and task templates
//! - [`enums`] -- Item categories, plot states and gift preferences
//! - [`records`] -- Static catalog rows (items, fish, crops, villagers, tasks)
//! - [`activity`] -- Per-day activity log entries
//! - [`actions`] -- Action requests and receipts
//! - [`snapshot`] -- Read-only world snapshot for the decision collaborator

pub mod actions;
pub mod activity;
pub mod enums;
pub mod ids;
pub mod records;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use actions::{
    ActionReceipt, AgentAction, FishingReceipt, HarvestReceipt, InteractionReceipt, PlantReceipt,
    TaskProgressReceipt, TradeReceipt,
};
pub use activity::{Activity, bells_earned, units_sold_in_category};
pub use enums::{GiftPreference, ItemCategory, PlotState};
pub use ids::{AgentName, ItemId, TemplateId};
pub use records::{
    CropRecord, DEFAULT_CROP_FRIENDSHIP, FishRecord, ItemRecord, TaskTemplate, VillagerRecord,
};
pub use snapshot::{AgentView, MarketView, PlotView, TaskView, WorldSnapshot};

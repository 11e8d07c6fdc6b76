//! Catalog, market, task board, and farm plots for the island simulation.
//!
//! This crate models the island's shared world state, everything that is not
//! owned by a single villager. Each component is a self-contained state
//! machine that the engine drives once per day and mutates through checked
//! operations.
//!
//! # Modules
//!
//! - [`catalog`] -- Static reference tables (items, fish, crops, villagers,
//!   task templates), loaded from YAML or the built-in default island.
//! - [`error`] -- Error types for world operations.
//! - [`farming`] -- Fixed-capacity farm plots with deterministic maturation.
//! - [`fishing`] -- Catch odds that fall with each attempt, on a seeded stream.
//! - [`market`] -- Weekly commodity cycle and saturation-discounted quotes.
//! - [`tasks`] -- Daily-rotating task board with progress tracking.

pub mod catalog;
pub mod error;
pub mod farming;
pub mod fishing;
pub mod market;
pub mod tasks;

// Re-export primary types at crate root.
pub use catalog::{CatalogDocument, CatalogError, StaticCatalog, default_catalog};
pub use error::WorldError;
pub use farming::{CropGrowth, FarmPlots};
pub use fishing::{Cast, FishingConfig, FishingGround, catch_chance};
pub use market::{CYCLE_LENGTH, MarketConfig, MarketModel};
pub use tasks::{TaskBoard, TaskInstance};

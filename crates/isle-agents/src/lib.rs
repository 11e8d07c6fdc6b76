//! Villager state, inventory, and relationships for the island simulation.
//!
//! This crate contains the logic layer for agents: everything that operates
//! on a villager's own state without knowing about the market, the task
//! board, or the farm. It sits between `isle-types` (which defines the data
//! structures) and `isle-core` (which orchestrates a whole world).
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] record and the [`AgentRoster`] that owns every resident
//! - [`config`] -- Tunable starting balances and relationship limits ([`AgentConfig`])
//! - [`error`] -- Error types for all agent operations ([`AgentError`])
//! - [`inventory`] -- Checked inventory arithmetic on item-keyed maps

pub mod agent;
pub mod config;
pub mod error;
pub mod inventory;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentRoster};
pub use config::AgentConfig;
pub use error::AgentError;

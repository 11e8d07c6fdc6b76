//! Configuration loading and typed config structures for the island simulation.
//!
//! The canonical configuration lives in `isle-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Sections owned by other crates (`agents`, `market`, `fishing`) reuse the
//! config types of those crates directly.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use isle_agents::AgentConfig;
use isle_world::{CYCLE_LENGTH, FishingConfig, MarketConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable that overrides `world.seed`.
pub const SEED_ENV_VAR: &str = "ISLE_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of range or inconsistent with another value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `isle-config.yaml`. Every section may be
/// omitted and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, population bounds, run length).
    #[serde(default)]
    pub world: WorldConfig,

    /// Starting balances and relationship tunables.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Commodity market parameters.
    #[serde(default)]
    pub market: MarketConfig,

    /// Task board parameters.
    #[serde(default)]
    pub tasks: TaskConfig,

    /// Farm parameters.
    #[serde(default)]
    pub farm: FarmConfig,

    /// Fishing odds.
    #[serde(default)]
    pub fishing: FishingConfig,

    /// Scheduled arrival of new villagers.
    #[serde(default)]
    pub immigration: ImmigrationConfig,

    /// Where the static catalog comes from.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `ISLE_SEED` overrides `world.seed` when set to a valid integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            self.world.apply_seed_override(&val);
        }
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.agent_count > self.world.max_agents {
            return Err(invalid(format!(
                "world.agent_count ({}) exceeds world.max_agents ({})",
                self.world.agent_count, self.world.max_agents
            )));
        }
        self.validate_market()?;
        if self.tasks.slots == 0 {
            return Err(invalid(String::from("tasks.slots must be at least 1")));
        }
        check_unit("fishing.base_chance", self.fishing.base_chance)?;
        check_unit("fishing.decrement", self.fishing.decrement)?;
        check_unit("fishing.min_chance", self.fishing.min_chance)?;
        if self.immigration.percent > 100 {
            return Err(invalid(format!(
                "immigration.percent ({}) must be at most 100",
                self.immigration.percent
            )));
        }
        Ok(())
    }

    fn validate_market(&self) -> Result<(), ConfigError> {
        let market = &self.market;
        if market.buy_price_min > market.buy_price_max {
            return Err(invalid(format!(
                "market.buy_price_min ({}) exceeds market.buy_price_max ({})",
                market.buy_price_min, market.buy_price_max
            )));
        }
        if market.acquisition_day >= CYCLE_LENGTH {
            return Err(invalid(format!(
                "market.acquisition_day ({}) must be below {CYCLE_LENGTH}",
                market.acquisition_day
            )));
        }
        let expected = usize::try_from(CYCLE_LENGTH).unwrap_or(usize::MAX);
        if market.sell_multipliers.len() != expected {
            return Err(invalid(format!(
                "market.sell_multipliers needs {expected} entries, found {}",
                market.sell_multipliers.len()
            )));
        }
        if market.sell_multipliers.iter().any(Decimal::is_sign_negative) {
            return Err(invalid(String::from(
                "market.sell_multipliers must not be negative",
            )));
        }
        if market.saturation_k.is_sign_negative() || market.secondary_k.is_sign_negative() {
            return Err(invalid(String::from(
                "market saturation coefficients must not be negative",
            )));
        }
        check_unit("market.saturation_floor", market.saturation_floor)?;
        check_unit("market.volume_decay", market.volume_decay)?;
        check_unit("market.secondary_floor", market.secondary_floor)?;
        check_unit("market.secondary_decay", market.secondary_decay)?;
        Ok(())
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// Fail unless `value` lies in `[0, 1]`.
fn check_unit(field: &str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(invalid(format!("{field} ({value}) must lie in [0, 1]")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Human-readable island name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Villagers present on day 0.
    #[serde(default = "default_agent_count")]
    pub agent_count: usize,

    /// Hard cap on the population.
    #[serde(default = "default_max_agents")]
    pub max_agents: usize,

    /// Days the binary runs before stopping.
    #[serde(default = "default_days")]
    pub days: u64,

    /// Calendar date of day 0.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
}

impl WorldConfig {
    /// Replace the seed with `raw` if it parses as an integer.
    pub fn apply_seed_override(&mut self, raw: &str) {
        match raw.trim().parse::<u64>() {
            Ok(seed) => self.seed = seed,
            Err(err) => warn!(
                %err,
                value = raw,
                var = SEED_ENV_VAR,
                "ignoring unparsable seed override"
            ),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            agent_count: default_agent_count(),
            max_agents: default_max_agents(),
            days: default_days(),
            start_date: default_start_date(),
        }
    }
}

/// Task board configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Number of simultaneously active tasks.
    #[serde(default = "default_task_slots")]
    pub slots: usize,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            slots: default_task_slots(),
        }
    }
}

/// Farm configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Number of farm plots on the island.
    #[serde(default = "default_farm_plots")]
    pub plots: usize,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            plots: default_farm_plots(),
        }
    }
}

/// Immigration schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImmigrationConfig {
    /// Days between arrivals; 0 disables immigration.
    #[serde(default = "default_immigration_interval")]
    pub interval_days: u64,

    /// Arrivals as a percentage of the current population (at least one).
    #[serde(default = "default_immigration_percent")]
    pub percent: u64,
}

impl Default for ImmigrationConfig {
    fn default() -> Self {
        Self {
            interval_days: default_immigration_interval(),
            percent: default_immigration_percent(),
        }
    }
}

/// Catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// YAML catalog document; the built-in catalog is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Isle")
}

const fn default_seed() -> u64 {
    42
}

const fn default_agent_count() -> usize {
    4
}

const fn default_max_agents() -> usize {
    10
}

const fn default_days() -> u64 {
    30
}

/// 2025-04-06, a Sunday, so cycle day 0 falls on Sundays.
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 6).unwrap_or(NaiveDate::MIN)
}

const fn default_task_slots() -> usize {
    3
}

const fn default_farm_plots() -> usize {
    10
}

const fn default_immigration_interval() -> u64 {
    3
}

const fn default_immigration_percent() -> u64 {
    20
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.agent_count, 4);
        assert_eq!(config.tasks.slots, 3);
        assert_eq!(config.farm.plots, 10);
        assert_eq!(config.immigration.interval_days, 3);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(
            config.world.start_date,
            NaiveDate::from_ymd_opt(2025, 4, 6).unwrap()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r#"
world:
  name: "Test Isle"
  agent_count: 6
  start_date: "2025-05-04"

agents:
  starting_bells: 2500
  starting_inventory:
    turnip: 10

market:
  buy_price_min: 100
  buy_price_max: 100
  acquisition_day: 0

tasks:
  slots: 5

logging:
  level: "debug"
  format: json
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "Test Isle");
        assert_eq!(config.world.agent_count, 6);
        assert_eq!(config.agents.starting_bells, 2500);
        assert_eq!(config.agents.starting_miles, 500);
        assert_eq!(
            config.agents.starting_inventory.get("turnip").copied(),
            Some(10)
        );
        assert_eq!(config.market.buy_price_max, 100);
        assert_eq!(config.market.sell_multipliers.len(), 7);
        assert_eq!(config.tasks.slots, 5);
        assert_eq!(config.farm.plots, 10);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config.market, MarketConfig::default());
        assert_eq!(config.fishing, FishingConfig::default());
        assert_eq!(config.catalog.path, None);
    }

    #[test]
    fn invalid_yaml_is_a_yaml_error() {
        let result = SimulationConfig::parse("world: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn validate_rejects_population_above_cap() {
        let mut config = SimulationConfig::default();
        config.world.agent_count = 11;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn validate_rejects_bad_market() {
        let mut config = SimulationConfig::default();
        config.market.buy_price_min = 200;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.market.sell_multipliers.pop();
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.market.acquisition_day = 7;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.market.volume_decay = dec!(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_odds_and_slots() {
        let mut config = SimulationConfig::default();
        config.fishing.base_chance = dec!(-0.1);
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.tasks.slots = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn seed_override() {
        let mut world = WorldConfig::default();
        world.apply_seed_override(" 777 ");
        assert_eq!(world.seed, 777);
        world.apply_seed_override("not-a-number");
        assert_eq!(world.seed, 777);
    }
}

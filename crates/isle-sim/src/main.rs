//! Command-line runner for the island simulation.
//!
//! Loads configuration and the static catalog, builds a world, and runs it
//! for the configured number of days with an idle decision source. The
//! final world snapshot is written to stdout as JSON; logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ISLE_CONFIG` (default `isle-config.yaml`),
//!    falling back to defaults when the file is absent
//! 2. Initialize structured logging (tracing)
//! 3. Load the catalog from `catalog.path`, or use the built-in island
//! 4. Initialize the world engine
//! 5. Run the day loop
//! 6. Log the result and print the final snapshot

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use isle_core::{IdleDecisionSource, LogFormat, SimulationConfig, WorldEngine, run_days};
use isle_world::{StaticCatalog, default_catalog};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the configuration file.
const CONFIG_ENV_VAR: &str = "ISLE_CONFIG";

/// Configuration file used when `ISLE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "isle-config.yaml";

fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = std::env::var(CONFIG_ENV_VAR)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config);
    info!("isle-sim starting");
    if from_file {
        info!(path = %config_path.display(), "configuration loaded");
    } else {
        info!(path = %config_path.display(), "config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        agent_count = config.world.agent_count,
        days = config.world.days,
        "world settings"
    );

    // 3. Load the catalog.
    let catalog = Arc::new(load_catalog(&config)?);

    // 4. Build the world.
    let agent_count = config.world.agent_count;
    let days = config.world.days;
    let mut engine = WorldEngine::initialize(agent_count, catalog, config)
        .context("failed to initialize the world")?;

    // 5. Run.
    let mut source = IdleDecisionSource::new();
    let summary = run_days(&mut engine, days, &mut source).context("simulation run failed")?;

    // 6. Report.
    info!(
        final_day = summary.final_day,
        population = summary.population,
        "isle-sim shutdown complete"
    );
    let snapshot = serde_json::to_string_pretty(&engine.snapshot())
        .context("failed to serialize the final snapshot")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{snapshot}").context("failed to write the final snapshot")?;
    Ok(())
}

/// Load the simulation configuration, or defaults when the file is absent.
///
/// Returns the config and whether it came from the file.
fn load_config(path: &Path) -> anyhow::Result<(SimulationConfig, bool)> {
    if path.exists() {
        let config = SimulationConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        Ok((config, true))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(config: &SimulationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Read the catalog file named in the config, or build the default island.
fn load_catalog(config: &SimulationConfig) -> anyhow::Result<StaticCatalog> {
    match &config.catalog.path {
        Some(path) => {
            let catalog = StaticCatalog::from_file(path)
                .with_context(|| format!("failed to load catalog {}", path.display()))?;
            info!(path = %path.display(), "catalog loaded");
            Ok(catalog)
        }
        None => {
            info!("using the built-in catalog");
            Ok(default_catalog())
        }
    }
}

//! End-to-end tests for the island world engine.
//!
//! Each test builds a world from the built-in catalog, drives it through
//! day rollovers and agent actions, and checks the observable state.

#![allow(
    clippy::arithmetic_side_effects,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use std::sync::Arc;

use isle_agents::AgentError;
use isle_core::{
    ActionError, EngineError, IdleDecisionSource, ScriptedDecisionSource, SimulationConfig,
    WorldEngine, run_days,
};
use isle_types::{
    AgentAction, AgentName, ItemId, PlotState, TaskTemplate, TemplateId, WorldSnapshot,
};
use isle_world::{CYCLE_LENGTH, StaticCatalog, TaskBoard, WorldError, default_catalog};
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn catalog() -> Arc<StaticCatalog> {
    Arc::new(default_catalog())
}

fn world(config: SimulationConfig) -> WorldEngine {
    WorldEngine::initialize(4, catalog(), config).expect("world should initialize")
}

fn name(s: &str) -> AgentName {
    AgentName::from(s)
}

fn item(s: &str) -> ItemId {
    ItemId::from(s)
}

/// Commodity fixed at 100 bells, selling at 1.2x on cycle day 1.
fn fixed_market_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.market.buy_price_min = 100;
    config.market.buy_price_max = 100;
    config.market.sell_multipliers = vec![
        dec!(1.0),
        dec!(1.2),
        dec!(1.1),
        dec!(0.9),
        dec!(0.8),
        dec!(0.7),
        dec!(0.6),
    ];
    config
}

fn template(id: &str, duration_days: u64) -> TaskTemplate {
    TaskTemplate {
        id: TemplateId::from(id),
        description: format!("do {id}"),
        target_quantity: 2,
        miles_reward: 100,
        duration_days,
    }
}

// ---------------------------------------------------------------------------
// Calendar and market cycle
// ---------------------------------------------------------------------------

#[test]
fn cycle_day_and_buy_price_follow_the_week() {
    let mut world = world(SimulationConfig::default());
    let mut price = world.market().buy_price();
    assert!(price.is_some());

    for _ in 0..(CYCLE_LENGTH * 3) {
        let summary = world.advance_day().unwrap();
        assert_eq!(summary.cycle_day, summary.day % CYCLE_LENGTH);
        assert_eq!(world.cycle_day(), summary.cycle_day);
        if summary.cycle_day != 0 {
            assert_eq!(summary.buy_price, price, "price changed on day {}", summary.day);
            assert!(summary.daily_sell_price.is_some());
        } else {
            assert!(summary.daily_sell_price.is_none());
        }
        price = summary.buy_price;
    }
    assert_eq!(world.day(), 21);
    assert_eq!(world.date(), chrono::NaiveDate::from_ymd_opt(2025, 4, 27).unwrap());
}

#[test]
fn commodity_sells_only_on_vending_days() {
    let mut config = fixed_market_config();
    config.agents.starting_inventory.insert(item("turnip"), 5);
    let mut world = world(config);

    assert_eq!(
        world.sell(&name("Audie"), &item("turnip"), 1),
        Err(WorldError::MarketNotReady { day: 0 }.into())
    );
    let bought = world.buy(&name("Audie"), &item("turnip"), 2).unwrap();
    assert_eq!(bought.unit_price, 100);
    assert_eq!(bought.held_after, 7);

    world.advance_day().unwrap();
    assert!(matches!(
        world.buy(&name("Audie"), &item("turnip"), 1),
        Err(ActionError::World {
            source: WorldError::MarketClosed { cycle_day: 1, .. }
        })
    ));
}

#[test]
fn selling_ten_turnips_at_one_point_two() {
    let mut config = fixed_market_config();
    config.agents.starting_inventory.insert(item("turnip"), 10);
    let mut world = world(config);
    assert_eq!(world.population(), 4);
    world.advance_day().unwrap();

    let receipt = world.sell(&name("Audie"), &item("turnip"), 10).unwrap();
    assert_eq!(receipt.unit_price, 120);
    assert_eq!(receipt.total, 1200);
    assert_eq!(receipt.bells_after, 2200);
    assert_eq!(receipt.held_after, 0);
    assert_eq!(world.market().recent_sale_volume(), dec!(10));

    let audie = world.agent("Audie").unwrap();
    assert!(!audie.inventory().contains_key("turnip"));
    assert_eq!(audie.daily_log().len(), 1);
}

#[test]
fn second_sale_never_quotes_higher() {
    let mut config = fixed_market_config();
    config.agents.starting_inventory.insert(item("turnip"), 400);
    config.agents.starting_inventory.insert(item("Sea Bass"), 10);
    let mut world = world(config);
    world.advance_day().unwrap();

    let first = world.sell(&name("Audie"), &item("turnip"), 200).unwrap();
    let second = world.sell(&name("Raymond"), &item("turnip"), 200).unwrap();
    assert!(second.unit_price <= first.unit_price);
    assert!(second.unit_price < 120);

    let first = world.sell(&name("Audie"), &item("Sea Bass"), 5).unwrap();
    let second = world.sell(&name("Audie"), &item("Sea Bass"), 5).unwrap();
    assert_eq!(first.unit_price, 400);
    assert!(second.unit_price < first.unit_price);
}

#[test]
fn buy_then_sell_never_profits() {
    let mut config = SimulationConfig::default();
    config.agents.starting_bells = 10_000;
    let mut world = world(config);
    world.advance_day().unwrap();

    let audie = name("Audie");
    let for_sale: Vec<ItemId> = world
        .catalog()
        .to_document()
        .items
        .unwrap_or_default()
        .into_iter()
        .filter(|i| i.buy_price.is_some())
        .map(|i| i.id)
        .collect();
    assert!(!for_sale.is_empty());

    for id in for_sale {
        let before = world.agent("Audie").unwrap().bells();
        world.buy(&audie, &id, 1).unwrap();
        world.sell(&audie, &id, 1).unwrap();
        assert!(world.agent("Audie").unwrap().bells() <= before, "profit on {id}");
    }
}

#[test]
fn rejected_sale_changes_nothing() {
    let mut world = world(fixed_market_config());
    world.advance_day().unwrap();
    let before = world.snapshot();
    assert!(matches!(
        world.sell(&name("Audie"), &item("turnip"), 1),
        Err(ActionError::Agent {
            source: AgentError::InsufficientInventory { .. }
        })
    ));
    assert_eq!(
        world.sell(&name("Audie"), &item("Moon Rock"), 1),
        Err(WorldError::UnknownItem(item("Moon Rock")).into())
    );
    assert_eq!(world.snapshot(), before);
}

// ---------------------------------------------------------------------------
// Gifts and conversations
// ---------------------------------------------------------------------------

#[test]
fn one_gift_per_recipient_per_day() {
    let mut config = SimulationConfig::default();
    config.agents.starting_inventory.insert(item("Apple"), 3);
    let mut world = world(config);

    let first = world.gift(&name("Audie"), &name("Raymond"), &item("Apple")).unwrap();
    assert_eq!(first.friendship_gained, 2);

    let before = world.snapshot();
    let second = world.gift(&name("Marshal"), &name("Raymond"), &item("Apple"));
    assert_eq!(
        second,
        Err(AgentError::AlreadyInteractedToday {
            agent: name("Raymond"),
            day: 0,
        }
        .into())
    );
    assert_eq!(world.snapshot(), before);
    assert_eq!(world.agent("Raymond").unwrap().relationship_score(), 2);

    world.advance_day().unwrap();
    world.talk(&name("Marshal"), &name("Raymond")).unwrap();
    assert_eq!(world.agent("Raymond").unwrap().relationship_score(), 7);
}

#[test]
fn self_gift_rejected() {
    let mut config = SimulationConfig::default();
    config.agents.starting_inventory.insert(item("Apple"), 1);
    let mut world = world(config);
    assert_eq!(
        world.gift(&name("Audie"), &name("Audie"), &item("Apple")),
        Err(AgentError::SelfInteraction(name("Audie")).into())
    );
}

#[test]
fn disliked_gift_earns_nothing() {
    let mut config = SimulationConfig::default();
    config.agents.starting_inventory.insert(item("Squid"), 1);
    let mut world = world(config);
    let receipt = world.gift(&name("Audie"), &name("Raymond"), &item("Squid")).unwrap();
    assert_eq!(receipt.friendship_gained, 0);
    assert_eq!(world.agent("Raymond").unwrap().last_interaction_day(), Some(0));
}

// ---------------------------------------------------------------------------
// Farming
// ---------------------------------------------------------------------------

#[test]
fn crops_ripen_exactly_on_ready_day() {
    let mut world = world(SimulationConfig::default());
    let planted = world.plant(&name("Judy"), 4, &item("Tomato")).unwrap();
    assert_eq!(planted.ready_day, 4);
    assert_eq!(planted.bells_after, 980);

    for _ in 0..3 {
        world.advance_day().unwrap();
    }
    assert_eq!(world.plots().state(4), Ok(PlotState::Growing));
    let before = world.snapshot();
    assert_eq!(
        world.harvest(&name("Judy"), 4),
        Err(WorldError::NotReady(4).into())
    );
    assert_eq!(world.snapshot(), before);

    let summary = world.advance_day().unwrap();
    assert_eq!(summary.ripened, vec![4]);
    assert_eq!(world.plots().state(4), Ok(PlotState::Ready));

    let harvest = world.harvest(&name("Judy"), 4).unwrap();
    assert_eq!(harvest.crop, item("Tomato"));
    assert_eq!(harvest.quantity, 3);
    assert_eq!(world.plots().state(4), Ok(PlotState::Empty));
}

#[test]
fn planting_requires_seed_money() {
    let mut config = SimulationConfig::default();
    config.agents.starting_bells = 30;
    let mut world = world(config);
    assert!(matches!(
        world.plant(&name("Audie"), 0, &item("Pumpkin")),
        Err(ActionError::Agent {
            source: AgentError::InsufficientFunds { .. }
        })
    ));
    assert_eq!(world.plots().state(0), Ok(PlotState::Empty));
}

// ---------------------------------------------------------------------------
// Task board
// ---------------------------------------------------------------------------

#[test]
fn completed_slot_replaced_alone_with_multi_day_templates() {
    let templates: Vec<TaskTemplate> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| template(id, 3))
        .collect();
    let mut board = TaskBoard::new(3);
    assert_eq!(board.refresh(5, &templates), vec![0, 1, 2]);
    for task in board.slots() {
        assert_eq!(task.progress(), 0);
        assert_eq!(task.assigned_day(), 5);
    }

    assert_eq!(board.record_progress(1, 2), Ok(true));
    assert_eq!(board.refresh(6, &templates), vec![1]);
    assert_eq!(board.slots()[1].assigned_day(), 6);
    assert_eq!(board.slots()[1].template().as_str(), "d");
    assert_eq!(board.slots()[0].assigned_day(), 5);
}

#[test]
fn every_slot_replaced_with_one_day_templates() {
    let templates: Vec<TaskTemplate> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| template(id, 1))
        .collect();
    let mut board = TaskBoard::new(3);
    board.refresh(5, &templates);
    board.record_progress(0, 2).unwrap();
    assert_eq!(board.refresh(6, &templates), vec![0, 1, 2]);
    assert!(board.slots().iter().all(|t| t.assigned_day() == 6));
}

#[test]
fn engine_task_progress_pays_miles_on_completion() {
    let mut world = world(SimulationConfig::default());
    let audie = name("Audie");
    let target = world.tasks().get(2).unwrap().target_quantity();
    let partial = world.record_task_progress(&audie, 2, 1).unwrap();
    assert!(!partial.completed_now);
    assert_eq!(partial.miles_after, 500);

    let done = world.record_task_progress(&audie, 2, target).unwrap();
    assert!(done.completed_now);
    assert_eq!(done.progress, target);
    assert_eq!(done.miles_after, 500_u64.saturating_add(done.miles_awarded));

    let summary = world.advance_day().unwrap();
    assert!(summary.tasks_replaced.contains(&2));
    assert_eq!(world.tasks().get(2).unwrap().progress(), 0);
}

// ---------------------------------------------------------------------------
// Fishing
// ---------------------------------------------------------------------------

#[test]
fn fishing_odds_fall_within_a_day_and_reset() {
    let mut world = world(SimulationConfig::default());
    let audie = name("Audie");
    let first = world.fish(&audie).unwrap();
    let second = world.fish(&audie).unwrap();
    assert_eq!(first.catch_chance, dec!(0.6));
    assert_eq!(second.catch_chance, dec!(0.55));
    assert_eq!(second.attempts_today, 2);

    world.advance_day().unwrap();
    assert_eq!(world.fish(&audie).unwrap().attempts_today, 1);
}

#[test]
fn same_seed_same_world() {
    let script = || {
        let mut source = ScriptedDecisionSource::new();
        for day in 1..=6 {
            for who in ["Audie", "Raymond"] {
                source = source.on_day(day, AgentAction::Fish { agent: name(who) });
            }
        }
        source
    };
    let mut a = world(SimulationConfig::default());
    let mut b = world(SimulationConfig::default());
    run_days(&mut a, 6, &mut script()).unwrap();
    run_days(&mut b, 6, &mut script()).unwrap();
    assert_eq!(a.snapshot(), b.snapshot());
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

#[test]
fn immigration_brings_next_villager_every_third_day() {
    let mut world = world(SimulationConfig::default());
    assert!(world.advance_day().unwrap().immigrants.is_empty());
    assert!(world.advance_day().unwrap().immigrants.is_empty());
    let day_three = world.advance_day().unwrap();
    assert_eq!(day_three.immigrants, vec![name("Sherb")]);
    assert_eq!(day_three.population, 5);
    assert_eq!(world.agent("Sherb").unwrap().joined_day(), 3);
}

#[test]
fn immigration_respects_population_cap() {
    let mut config = SimulationConfig::default();
    config.world.max_agents = 5;
    let mut world = world(config);
    let summary = run_days(&mut world, 9, &mut IdleDecisionSource::new()).unwrap();
    assert_eq!(summary.population, 5);
}

#[test]
fn immigration_disabled_with_zero_interval() {
    let mut config = SimulationConfig::default();
    config.immigration.interval_days = 0;
    let mut world = world(config);
    let summary = run_days(&mut world, 9, &mut IdleDecisionSource::new()).unwrap();
    assert_eq!(summary.population, 4);
}

#[test]
fn immigration_disabled_with_zero_percent() {
    let mut config = SimulationConfig::default();
    config.immigration.percent = 0;
    let mut world = world(config);
    let summary = run_days(&mut world, 9, &mut IdleDecisionSource::new()).unwrap();
    assert_eq!(summary.population, 4);
}

#[test]
fn initialize_rejects_more_agents_than_names() {
    let mut config = SimulationConfig::default();
    config.world.max_agents = 50;
    let result = WorldEngine::initialize(11, catalog(), config);
    assert!(matches!(result, Err(EngineError::Configuration { .. })));
}

// ---------------------------------------------------------------------------
// Reset, snapshots, shared catalog
// ---------------------------------------------------------------------------

#[test]
fn reset_returns_to_a_fresh_day_zero() {
    let mut config = fixed_market_config();
    config.agents.starting_inventory.insert(item("turnip"), 10);
    let fresh = world(config.clone()).snapshot();
    let mut world = world(config);

    world.plant(&name("Audie"), 0, &item("Wheat")).unwrap();
    run_days(&mut world, 4, &mut IdleDecisionSource::new()).unwrap();
    world.sell(&name("Audie"), &item("turnip"), 3).unwrap();
    assert_ne!(world.snapshot(), fresh);

    world.reset().unwrap();
    assert_eq!(world.day(), 0);
    assert_eq!(world.population(), 4);
    assert_eq!(world.snapshot(), fresh);
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut config = SimulationConfig::default();
    config.agents.starting_inventory.insert(item("Pear"), 1);
    let mut world = world(config);
    world.gift(&name("Audie"), &name("Raymond"), &item("Pear")).unwrap();

    let snapshot = world.snapshot();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["day"], 0);
    assert_eq!(json["agents"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["agents"][0]["daily_log"][0]["kind"], "gave_gift");
    assert_eq!(json["plots"].as_array().map(Vec::len), Some(10));

    let back: WorldSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn catalog_is_shared_between_worlds() {
    let shared = catalog();
    let a = WorldEngine::initialize(2, Arc::clone(&shared), SimulationConfig::default()).unwrap();
    let b = WorldEngine::initialize(3, Arc::clone(&shared), SimulationConfig::default()).unwrap();
    assert_eq!(Arc::strong_count(&shared), 3);
    assert_eq!(a.population(), 2);
    assert_eq!(b.population(), 3);
}

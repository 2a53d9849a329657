//! Integration tests for the simulator driven through its public controls.
//!
//! Exercises: ScenarioStore → SimulationEngine (play / update / step) →
//! ResultsStore (save / compare) → batch runner.

use std::time::Duration;

use hoopsim_core::batch::run_batch;
use hoopsim_core::engine::{SimulationEngine, TickOutcome};
use hoopsim_core::error::SimError;
use hoopsim_core::scenarios::{ScenarioStore, ScenarioUpdate};
use hoopsim_logic::{ClockEvent, GameRules, RulesUpdate, Side};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

fn engine_for(scenario: &str, seed: u64) -> SimulationEngine {
    let mut engine = SimulationEngine::with_seed(seed);
    engine.select_scenario(scenario).unwrap();
    engine
}

/// Drive the engine with fixed real-time steps until it stops.
fn run_realtime(engine: &mut SimulationEngine) -> Vec<TickOutcome> {
    engine.play().unwrap();
    let mut outcomes = Vec::new();
    for _ in 0..100_000 {
        if !engine.is_simulating() {
            break;
        }
        let before = (engine.state.home_score, engine.state.away_score);
        let fired = engine.update(Duration::from_millis(250));
        assert!(engine.state.home_score >= before.0);
        assert!(engine.state.away_score >= before.1);
        outcomes.extend(fired);
    }
    outcomes
}

// ── Game loop ──────────────────────────────────────────────────────────

#[test]
fn timer_driven_game_runs_to_the_buzzer() {
    let mut engine = engine_for("pace-impact", 3);
    engine.set_speed(5).unwrap();
    let outcomes = run_realtime(&mut engine);

    assert!(engine.state.is_over());
    assert!(!engine.is_simulating());
    // the final buzzer stops the run on the tick that sounds it
    assert!(matches!(
        outcomes.last(),
        Some(TickOutcome::Possession {
            event: ClockEvent::GameEnded { .. },
            ..
        }) | Some(TickOutcome::Finished { winner: Some(_) })
    ));

    let quarter_breaks = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o,
                TickOutcome::Possession {
                    event: ClockEvent::QuarterEnded { .. },
                    ..
                }
            )
        })
        .count();
    // breaks can also land on a dead-ball advance
    assert!(quarter_breaks <= 3);

    let current = engine.results.current().unwrap();
    assert_eq!(current.game_stats.home.points, engine.state.home_score);
    assert_eq!(current.game_stats.away.points, engine.state.away_score);
    assert_eq!(current.runs_completed, 1);
    assert_eq!(
        current.shot_chart.len(),
        current.possessions.iter().map(|p| p.attempts().count()).sum::<usize>()
    );
}

#[test]
fn same_seed_same_game_log() {
    let mut a = engine_for("three-point-revolution", 77);
    let mut b = engine_for("three-point-revolution", 77);
    a.run_to_completion(10_000).unwrap();
    b.run_to_completion(10_000).unwrap();
    assert_eq!(
        a.results.current().unwrap().possessions,
        b.results.current().unwrap().possessions
    );
    assert_eq!(a.state, b.state);
}

#[test]
fn efficiency_stays_in_range() {
    for seed in 0..10 {
        let mut engine = engine_for("pace-impact", seed);
        engine.run_to_completion(10_000).unwrap();
        let stats = &engine.results.current().unwrap().game_stats;
        for side in [Side::Home, Side::Away] {
            let s = stats.get(side);
            assert!((0.0..=1.0).contains(&s.effective_field_goal_percentage));
            assert!((0.0..=1.0).contains(&s.true_shooting_percentage));
            assert!(s.pace > 0.0);
        }
    }
}

#[test]
fn pace_counts_only_time_played() {
    // late-game starts with 24 seconds left, so pace is scaled from a few
    // seconds of play rather than a full game.
    let mut engine = engine_for("late-game", 5);
    engine.run_to_completion(10_000).unwrap();
    let current = engine.results.current().unwrap();
    assert!(current.game_seconds_elapsed > 0);
    let minutes = current.game_seconds_elapsed as f64 / 60.0;
    let expected = current.game_stats.total_possessions() as f64 * 48.0 / minutes;
    assert!((current.game_stats.home.pace - expected).abs() < 1e-9);
}

#[test]
fn stepping_through_a_paused_game() {
    let mut engine = engine_for("foul-strategy", 9);
    let first = engine.step().unwrap();
    match first {
        TickOutcome::Possession { possession, .. } => assert_eq!(possession.team, Side::Away),
        other => panic!("expected a possession, got {:?}", other),
    }
    engine.play().unwrap();
    assert!(matches!(engine.step(), Err(SimError::Running)));
}

// ── Results ────────────────────────────────────────────────────────────

#[test]
fn save_and_compare_two_rule_sets() {
    let mut engine = engine_for("pace-impact", 21);
    engine.run_to_completion(10_000).unwrap();
    let baseline = engine.save().unwrap();

    engine.select_scenario("pace-impact").unwrap();
    engine
        .update_rules(&RulesUpdate {
            shot_clock_duration: Some(14),
            ..RulesUpdate::default()
        })
        .unwrap();
    engine.run_to_completion(10_000).unwrap();
    assert_eq!(engine.results.current().unwrap().parameters.shot_clock, 14);

    engine.results.set_comparison(baseline).unwrap();
    let diff = engine.results.compare().unwrap();
    let base = &engine.results.saved()[baseline].game_stats.home;
    let now = &engine.results.current().unwrap().game_stats.home;
    assert_eq!(diff.home.points, now.points as i64 - base.points as i64);
    assert!((diff.home.pace - (now.pace - base.pace)).abs() < 1e-9);

    engine.results.delete_saved(baseline).unwrap();
    assert!(engine.results.saved().is_empty());
}

#[test]
fn reset_drops_current_results_but_keeps_saved() {
    let mut engine = engine_for("pace-impact", 4);
    engine.step().unwrap();
    engine.save().unwrap();
    engine.reset();
    assert!(engine.results.current().is_none());
    assert_eq!(engine.results.saved().len(), 1);
    assert_eq!(engine.state.time_remaining, GameRules::default().quarter_seconds());
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn custom_catalog_from_file() {
    let mut store = ScenarioStore::new();
    store
        .update(
            "late-game",
            ScenarioUpdate {
                name: Some("Final Possession".into()),
                ..ScenarioUpdate::default()
            },
        )
        .unwrap();
    store.delete("foul-strategy").unwrap();

    let path = std::env::temp_dir().join(format!("hoopsim-catalog-{}.json", std::process::id()));
    std::fs::write(&path, store.to_json_string().unwrap()).unwrap();
    let loaded = ScenarioStore::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.get("late-game").unwrap().name, "Final Possession");

    let mut engine = SimulationEngine::with_seed(1).with_scenarios(loaded);
    assert!(matches!(
        engine.select_scenario("foul-strategy"),
        Err(SimError::UnknownScenario(_))
    ));
    engine.select_scenario("late-game").unwrap();
}

#[test]
fn missing_catalog_file_is_an_io_error() {
    let result = ScenarioStore::load("/nonexistent/hoopsim/catalog.json");
    assert!(matches!(result, Err(SimError::Io(_))));
}

// ── Batch ──────────────────────────────────────────────────────────────

#[test]
fn batch_games_all_finish() {
    let summary = run_batch(&ScenarioStore::new(), "late-game", 16, 500).unwrap();
    assert_eq!(summary.games.len(), 16);
    assert_eq!(summary.home_wins + summary.away_wins, 16);
    for game in &summary.games {
        assert_ne!(game.home_score, game.away_score);
        assert!(game.home_score >= 98);
        assert!(game.away_score >= 100);
    }
}

// ── Properties ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_any_seed_finishes_late_game(seed in any::<u64>()) {
        let mut engine = engine_for("late-game", seed);
        engine.run_to_completion(10_000).unwrap();
        prop_assert!(engine.state.is_over());
        prop_assert!(engine.state.home_score >= 98);
        prop_assert!(engine.state.away_score >= 100);
        prop_assert_eq!(engine.results.current().unwrap().runs_completed, 1);
    }

    #[test]
    fn prop_ticks_follow_speed(speed in 1u8..=5, millis in 0u64..5_000) {
        let mut engine = engine_for("pace-impact", 1);
        engine.set_speed(speed).unwrap();
        engine.play().unwrap();
        let fired = engine.update(Duration::from_millis(millis)).len() as u64;
        prop_assert_eq!(fired, millis / (1000 / speed as u64));
    }
}

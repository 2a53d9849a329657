//! Hoopsim Headless Simulation Harness
//!
//! Validates the possession logic and the simulator in-process, and plays
//! or batches scenarios from the command line. No rendering, no network.
//!
//! Usage:
//!   cargo run -p hoopsim-simtest
//!   cargo run -p hoopsim-simtest -- validate --verbose
//!   cargo run -p hoopsim-simtest -- play --scenario late-game --realtime --speed 5
//!   cargo run -p hoopsim-simtest -- batch --scenario pace-impact --runs 500
//!   RUST_LOG=debug cargo run -p hoopsim-simtest -- play --scenario foul-strategy

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use hoopsim_core::batch::{self, BatchSummary};
use hoopsim_core::engine::{SimulationEngine, TickOutcome};
use hoopsim_core::error::SimError;
use hoopsim_core::scenarios::ScenarioStore;
use hoopsim_logic::constants::{outcome_weights, timing};
use hoopsim_logic::resolver::{adjusted_shot_percentage, possession_duration};
use hoopsim_logic::{
    apply_outcome, resolve_possession, ClockEvent, GameRules, GameState, Possession,
    PossessionResult, ShotLocation, Side, Team, TeamStats,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ── CLI ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "hoopsim-simtest")]
#[command(about = "Headless basketball possession simulator and validation harness")]
struct Cli {
    /// JSON scenario catalog to use instead of the built-in presets
    #[arg(long, global = true)]
    scenarios: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the invariant harness (default); exits 1 on any failure
    Validate {
        #[arg(long)]
        verbose: bool,
    },
    /// Play one game of a scenario and print the box score
    Play {
        #[arg(long)]
        scenario: String,
        #[arg(long)]
        seed: Option<u64>,
        /// Pace ticks in real time at the chosen speed
        #[arg(long)]
        realtime: bool,
        #[arg(long, default_value_t = 3)]
        speed: u8,
        #[arg(long)]
        json: bool,
    },
    /// Play many seeded games of a scenario in parallel
    Batch {
        #[arg(long)]
        scenario: String,
        #[arg(long, default_value_t = 100)]
        runs: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        json: bool,
    },
    /// List the scenario catalog
    Scenarios,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = match &cli.scenarios {
        Some(path) => {
            let store = ScenarioStore::load(path)
                .with_context(|| format!("loading scenarios from {}", path.display()))?;
            tracing::info!("Loaded {} scenarios from {}", store.len(), path.display());
            store
        }
        None => ScenarioStore::new(),
    };

    match cli.command.unwrap_or(Command::Validate { verbose: false }) {
        Command::Validate { verbose } => {
            if !run_validation(&store, verbose) {
                std::process::exit(1);
            }
        }
        Command::Play {
            scenario,
            seed,
            realtime,
            speed,
            json,
        } => play(store, &scenario, seed, realtime, speed, json)?,
        Command::Batch {
            scenario,
            runs,
            seed,
            json,
        } => {
            if runs == 0 {
                bail!("--runs must be at least 1");
            }
            let summary = batch::run_batch(&store, &scenario, runs, seed)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_batch(&summary);
            }
        }
        Command::Scenarios => {
            for s in store.list() {
                println!(
                    "{:24} {:28} {} vs {}, Q{} {}",
                    s.id,
                    s.name,
                    s.home_team.name,
                    s.away_team.name,
                    s.game_state.quarter,
                    s.game_state.clock_display()
                );
                println!("{:24} {}", "", s.description);
            }
        }
    }
    Ok(())
}

// ── Play ────────────────────────────────────────────────────────────────

fn play(
    store: ScenarioStore,
    scenario: &str,
    seed: Option<u64>,
    realtime: bool,
    speed: u8,
    json: bool,
) -> anyhow::Result<()> {
    let mut engine = match seed {
        Some(seed) => SimulationEngine::with_seed(seed),
        None => SimulationEngine::new(),
    }
    .with_scenarios(store);
    engine.select_scenario(scenario)?;
    engine.set_speed(speed)?;

    if realtime {
        engine.play()?;
        while engine.is_simulating() {
            let interval = engine.tick_interval();
            std::thread::sleep(interval);
            for outcome in engine.update(interval) {
                if let TickOutcome::Possession { possession, .. } = outcome {
                    if !json {
                        println!("{}", describe(&engine, &possession));
                    }
                }
            }
        }
    } else {
        engine.run_to_completion(batch::MAX_TICKS_PER_GAME)?;
    }

    let results = engine
        .results
        .current()
        .context("simulation produced no results")?;
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!();
    println!(
        "=== FINAL: {} {} - {} {} ({} possessions) ===",
        engine.home_team.name,
        engine.state.home_score,
        engine.state.away_score,
        engine.away_team.name,
        results.possessions.len()
    );
    if engine.state.quarter > timing::REGULATION_QUARTERS {
        println!(
            "  after {} overtime period(s)",
            engine.state.quarter - timing::REGULATION_QUARTERS
        );
    }
    println!();
    print_box_header();
    print_box_line(&engine.home_team.name, &results.game_stats.home);
    print_box_line(&engine.away_team.name, &results.game_stats.away);
    Ok(())
}

fn describe(engine: &SimulationEngine, p: &Possession) -> String {
    let team = match p.team {
        Side::Home => &engine.home_team.name,
        Side::Away => &engine.away_team.name,
    };
    let what = match (&p.result, &p.shot) {
        (PossessionResult::Shot, Some(shot)) => {
            let kind = match shot.location {
                ShotLocation::ThreePoint => "three",
                ShotLocation::MidRange => "mid-range jumper",
                ShotLocation::Inside => "shot inside",
                ShotLocation::FreeThrow => "free throw",
            };
            format!("{} {}", if shot.made { "makes" } else { "misses" }, kind)
        }
        (PossessionResult::Turnover, _) => "turns it over".to_string(),
        (PossessionResult::Foul, _) if p.is_bonus_foul() => {
            let made = p.free_throws.iter().filter(|ft| ft.made).count();
            format!("fouled in the bonus, {}/{} FT", made, p.free_throws.len())
        }
        (PossessionResult::Foul, _) => "fouled, keeps the ball".to_string(),
        (PossessionResult::Shot, None) => "shot".to_string(),
    };
    format!(
        "Q{} {:>5}  {:20} {:34} {:>3}-{:<3}",
        p.quarter,
        hoopsim_logic::state::format_clock(p.time_remaining),
        team,
        what,
        engine.state.home_score,
        engine.state.away_score
    )
}

fn print_box_header() {
    println!(
        "  {:20} {:>4} {:>7} {:>7} {:>7} {:>3} {:>3} {:>6} {:>5} {:>5} {:>6}",
        "TEAM", "PTS", "FG", "3P", "FT", "TO", "PF", "ORtg", "eFG", "TS", "Pace"
    );
}

fn print_box_line(name: &str, s: &TeamStats) {
    println!(
        "  {:20} {:>4} {:>7} {:>7} {:>7} {:>3} {:>3} {:>6.1} {:>5.3} {:>5.3} {:>6.1}",
        name,
        s.points,
        format!("{}/{}", s.field_goals_made, s.field_goals_attempted),
        format!("{}/{}", s.three_pointers_made, s.three_pointers_attempted),
        format!("{}/{}", s.free_throws_made, s.free_throws_attempted),
        s.turnovers,
        s.fouls,
        s.offensive_rating,
        s.effective_field_goal_percentage,
        s.true_shooting_percentage,
        s.pace
    );
}

fn print_batch(summary: &BatchSummary) {
    println!(
        "=== BATCH: {} x{} (seeds {}..{}) ===",
        summary.scenario_id,
        summary.runs,
        summary.base_seed,
        summary.base_seed.wrapping_add(summary.runs as u64)
    );
    let pct = |n: usize| n as f64 / summary.runs.max(1) as f64 * 100.0;
    println!(
        "  Home wins: {:5} ({:.1}%)",
        summary.home_wins,
        pct(summary.home_wins)
    );
    println!(
        "  Away wins: {:5} ({:.1}%)",
        summary.away_wins,
        pct(summary.away_wins)
    );
    println!(
        "  Overtime:  {:5} ({:.1}%)",
        summary.overtime_games,
        pct(summary.overtime_games)
    );
    println!();
    println!("  {:6} {:>7} {:>6} {:>6} {:>6}", "SIDE", "Score", "eFG", "TS", "Pace");
    for (label, avg) in [("home", &summary.home), ("away", &summary.away)] {
        println!(
            "  {:6} {:>7.1} {:>6.3} {:>6.3} {:>6.1}",
            label,
            avg.score,
            avg.effective_field_goal_percentage,
            avg.true_shooting_percentage,
            avg.pace
        );
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn run_validation(store: &ScenarioStore, verbose: bool) -> bool {
    println!("=== Hoopsim Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario catalog
    results.extend(validate_scenarios(store, verbose));

    // 2. Possession resolver sweep
    results.extend(validate_resolver(verbose));

    // 3. Clock and period transitions
    results.extend(validate_clock(verbose));

    // 4. Full games per scenario
    results.extend(validate_games(store, verbose));

    // 5. Simulator controls
    results.extend(validate_controls(store, verbose));

    // 6. Batch determinism
    results.extend(validate_batch(store, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    failed == 0
}

// ── 1. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(store: &ScenarioStore, verbose: bool) -> Vec<TestResult> {
    println!("--- Scenario Catalog ---");
    let mut results = Vec::new();

    results.push(check(
        "catalog_not_empty",
        !store.is_empty(),
        format!("{} scenarios", store.len()),
    ));

    let invalid: Vec<String> = store
        .list()
        .iter()
        .filter_map(|s| s.validate().err().map(|e| format!("{}: {}", s.id, e)))
        .collect();
    results.push(check(
        "scenarios_valid",
        invalid.is_empty(),
        if invalid.is_empty() {
            "all teams and rules valid".into()
        } else {
            invalid.join("; ")
        },
    ));

    let roundtrip = store
        .to_json_string()
        .and_then(|json| ScenarioStore::from_json_str(&json));
    results.push(check(
        "catalog_json_roundtrip",
        matches!(&roundtrip, Ok(loaded) if loaded.list() == store.list()),
        match &roundtrip {
            Ok(_) => "catalog survives JSON".into(),
            Err(e) => e.to_string(),
        },
    ));

    if verbose {
        for s in store.list() {
            println!(
                "  {:24} Q{} {} {}-{}",
                s.id,
                s.game_state.quarter,
                s.game_state.clock_display(),
                s.game_state.home_score,
                s.game_state.away_score
            );
        }
    }

    results
}

// ── 2. Resolver ─────────────────────────────────────────────────────────

fn validate_resolver(verbose: bool) -> Vec<TestResult> {
    println!("--- Possession Resolver ---");
    let mut results = Vec::new();

    let weight_sum = outcome_weights::SHOT + outcome_weights::TURNOVER + outcome_weights::FOUL;
    results.push(check(
        "outcome_weights_sum_to_one",
        (weight_sum - 1.0).abs() < 1e-9,
        format!("sum = {}", weight_sum),
    ));

    let home = Team::default_home();
    let away = Team::default_away();
    let rules = GameRules::default();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut state = GameState::new(&rules);
    let mut bad_points = 0;
    let mut bad_duration = 0;
    let mut counts = [0usize; 3];
    const SAMPLES: usize = 20_000;

    for i in 0..SAMPLES {
        // fresh period every so often so the clock never gates the sample
        if i % 100 == 0 {
            state = GameState::new(&rules);
            state.home_team_fouls = (i / 100 % 8) as u8;
            state.away_team_fouls = (i / 100 % 6) as u8;
        }
        let p = resolve_possession(&mut rng, &home, &away, &rules, &state);
        counts[match p.result {
            PossessionResult::Shot => 0,
            PossessionResult::Turnover => 1,
            PossessionResult::Foul => 2,
        }] += 1;
        for shot in p.attempts() {
            let expected = if shot.made { shot.location.value() } else { 0 };
            if shot.points != expected {
                bad_points += 1;
            }
        }
        if p.duration > state.time_remaining || p.duration > rules.shot_clock_duration {
            bad_duration += 1;
        }
        apply_outcome(&mut state, &rules, &p);
    }

    results.push(check(
        "shot_points_match_location",
        bad_points == 0,
        format!("{} inconsistent attempts in {} possessions", bad_points, SAMPLES),
    ));
    results.push(check(
        "duration_within_clock",
        bad_duration == 0,
        format!("{} possessions over the clock", bad_duration),
    ));

    let share = |n: usize| n as f64 / SAMPLES as f64;
    let within = |got: f64, want: f64| (got - want).abs() < 0.02;
    results.push(check(
        "outcome_mix_matches_weights",
        within(share(counts[0]), outcome_weights::SHOT)
            && within(share(counts[1]), outcome_weights::TURNOVER)
            && within(share(counts[2]), outcome_weights::FOUL),
        format!(
            "shot {:.3} / turnover {:.3} / foul {:.3}",
            share(counts[0]),
            share(counts[1]),
            share(counts[2])
        ),
    ));

    let floor_ok = (80..=140).all(|r| adjusted_shot_percentage(0.0, r as f64) >= 0.1);
    results.push(check(
        "adjusted_percentage_floor",
        floor_ok,
        "never below 0.1 for ratings 80-140".into(),
    ));

    let fast = possession_duration(10, &rules, 720, 0.99);
    let slow = possession_duration(1, &rules, 720, 0.99);
    results.push(check(
        "pace_shortens_possessions",
        fast == timing::MIN_POSSESSION_SECS && slow > fast,
        format!("pace 10 -> {}s, pace 1 -> {}s", fast, slow),
    ));

    if verbose {
        println!(
            "  Outcome mix over {} draws: {:?}",
            SAMPLES, counts
        );
    }

    results
}

// ── 3. Clock ────────────────────────────────────────────────────────────

fn validate_clock(_verbose: bool) -> Vec<TestResult> {
    println!("--- Clock & Periods ---");
    let mut results = Vec::new();
    let rules = GameRules::default();

    let mut state = GameState::new(&rules);
    state.time_remaining = 2;
    state.home_team_fouls = 4;
    let tick = state.advance_time(4, &rules);
    results.push(check(
        "quarter_transition",
        tick.event == ClockEvent::QuarterEnded { next_quarter: 2 }
            && state.home_team_fouls == 0
            && state.time_remaining == rules.quarter_seconds(),
        format!("Q{} {} fouls {}", state.quarter, state.clock_display(), state.home_team_fouls),
    ));

    let mut state = GameState::new(&rules);
    state.quarter = 4;
    state.time_remaining = 3;
    state.home_score = 100;
    state.away_score = 100;
    let tick = state.advance_time(4, &rules);
    results.push(check(
        "tied_fourth_goes_to_overtime",
        tick.event == ClockEvent::OvertimeStarted { quarter: 5 }
            && state.time_remaining == rules.overtime_seconds(),
        format!("Q{} {}", state.quarter, state.clock_display()),
    ));

    let mut state = GameState::new(&rules);
    state.quarter = 4;
    state.time_remaining = 3;
    state.home_score = 101;
    state.away_score = 100;
    let tick = state.advance_time(4, &rules);
    results.push(check(
        "untied_fourth_ends_game",
        tick.event == ClockEvent::GameEnded { winner: Side::Home }
            && state.time_remaining == 0
            && state.is_over(),
        format!("Q{} {} over={}", state.quarter, state.clock_display(), state.is_over()),
    ));

    results
}

// ── 4. Full games ───────────────────────────────────────────────────────

fn validate_games(store: &ScenarioStore, verbose: bool) -> Vec<TestResult> {
    println!("--- Full Games ---");
    let mut results = Vec::new();
    const SEEDS: u64 = 10;

    for scenario in store.list() {
        let mut problems = Vec::new();
        let mut finals = Vec::new();

        for seed in 0..SEEDS {
            let mut engine = SimulationEngine::with_seed(seed).with_scenarios(store.clone());
            if let Err(e) = engine.select_scenario(&scenario.id).and_then(|_| engine.play()) {
                problems.push(format!("seed {}: {}", seed, e));
                continue;
            }
            let start = (engine.state.home_score, engine.state.away_score);
            let mut last = start;
            let mut ticks = 0;
            while engine.is_simulating() && ticks < batch::MAX_TICKS_PER_GAME {
                engine.update(engine.tick_interval());
                let now = (engine.state.home_score, engine.state.away_score);
                if now.0 < last.0 || now.1 < last.1 {
                    problems.push(format!("seed {}: score went down", seed));
                }
                last = now;
                ticks += 1;
            }

            if !engine.state.is_over() {
                problems.push(format!("seed {}: no result after {} ticks", seed, ticks));
                continue;
            }
            let Some(run) = engine.results.current() else {
                problems.push(format!("seed {}: no results", seed));
                continue;
            };
            let stats = &run.game_stats;
            if stats.home.points + start.0 != engine.state.home_score
                || stats.away.points + start.1 != engine.state.away_score
            {
                problems.push(format!("seed {}: box score != scoreboard", seed));
            }
            for side in [Side::Home, Side::Away] {
                let s = stats.get(side);
                if s.field_goals_attempted > 0
                    && (!(0.0..=1.0).contains(&s.effective_field_goal_percentage)
                        || !(0.0..=1.0).contains(&s.true_shooting_percentage))
                {
                    problems.push(format!(
                        "seed {}: {} efficiency out of range",
                        seed,
                        side.label()
                    ));
                }
            }
            finals.push((engine.state.home_score, engine.state.away_score, engine.state.quarter));
        }

        results.push(check(
            &format!("games_{}", scenario.id),
            problems.is_empty(),
            if problems.is_empty() {
                format!("{} games finished cleanly", SEEDS)
            } else {
                problems.join("; ")
            },
        ));

        if verbose {
            println!("  {}:", scenario.id);
            for (home, away, quarter) in &finals {
                println!("    {:3}-{:<3} (Q{})", home, away, quarter);
            }
        }
    }

    results
}

// ── 5. Controls ─────────────────────────────────────────────────────────

fn validate_controls(store: &ScenarioStore, _verbose: bool) -> Vec<TestResult> {
    println!("--- Simulator Controls ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::with_seed(1).with_scenarios(store.clone());
    results.push(check(
        "play_needs_scenario",
        matches!(engine.play(), Err(SimError::NoActiveScenario)),
        "play without a scenario is rejected".into(),
    ));

    let Some(first) = store.list().first().map(|s| s.id.clone()) else {
        return results;
    };
    if let Err(e) = engine.select_scenario(&first) {
        results.push(check("select_scenario", false, e.to_string()));
        return results;
    }

    let speed_ok = engine.set_speed(0).is_err()
        && engine.set_speed(6).is_err()
        && engine.set_speed(4).is_ok()
        && engine.tick_interval().as_millis() == 250;
    results.push(check(
        "speed_bounds",
        speed_ok,
        format!("interval at speed 4: {:?}", engine.tick_interval()),
    ));

    let step_while_running =
        engine.play().is_ok() && matches!(engine.step(), Err(SimError::Running));
    engine.pause();
    let step_while_paused = engine.state.is_over() || engine.step().is_ok();
    results.push(check(
        "step_only_when_paused",
        step_while_running && step_while_paused,
        "step rejected while running, allowed while paused".into(),
    ));

    engine.reset();
    results.push(check(
        "reset_clears_run",
        engine.results.current().is_none() && !engine.is_simulating(),
        format!("Q{} {}", engine.state.quarter, engine.state.clock_display()),
    ));

    results
}

// ── 6. Batch ────────────────────────────────────────────────────────────

fn validate_batch(store: &ScenarioStore, _verbose: bool) -> Vec<TestResult> {
    println!("--- Batch Runner ---");
    let mut results = Vec::new();

    let Some(id) = store.list().first().map(|s| s.id.clone()) else {
        return results;
    };
    match (
        batch::run_batch(store, &id, 24, 99),
        batch::run_batch(store, &id, 24, 99),
    ) {
        (Ok(a), Ok(b)) => {
            results.push(check(
                "batch_deterministic",
                a == b,
                format!("{}: home {} / away {} wins", id, a.home_wins, a.away_wins),
            ));
            results.push(check(
                "batch_every_game_decided",
                a.home_wins + a.away_wins == a.runs,
                format!("{} overtime games", a.overtime_games),
            ));
        }
        (Err(e), _) | (_, Err(e)) => {
            results.push(check("batch_runs", false, e.to_string()));
        }
    }

    results
}

//! Simulation engine - simulator state, controls and the timer-driven loop.
//!
//! The host calls [`SimulationEngine::update`] with real elapsed time. While
//! the simulator is running, one tick fires per elapsed tick interval
//! (`1000 ms / speed`). A tick:
//!
//! 1. stops the run if the game is already over;
//! 2. runs 4 dead-ball seconds off the clock;
//! 3. resolves and applies one possession.

use std::time::Duration;

use hoopsim_logic::constants::{speed, timing};
use hoopsim_logic::{
    apply_outcome, resolve_possession, ClockEvent, ClockTick, GameRules, GameState,
    GameStateUpdate, Possession, RulesUpdate, Side, Team, TeamUpdate,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, SimError};
use crate::results::{ResultsStore, RunParameters};
use crate::scenarios::{Scenario, ScenarioStore};

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A possession was played; `event` is the clock transition it caused.
    /// On `GameEnded` the run is already complete and the simulator stopped.
    Possession {
        possession: Possession,
        event: ClockEvent,
    },
    /// The game was already over (or ended on the dead-ball clock); the run
    /// was marked complete and the simulator stopped.
    Finished { winner: Option<Side> },
}

/// Main simulation engine
pub struct SimulationEngine {
    pub home_team: Team,
    pub away_team: Team,
    pub rules: GameRules,
    pub state: GameState,
    /// Preset and user scenarios
    pub scenarios: ScenarioStore,
    /// Current, saved and comparison results
    pub results: ResultsStore,

    is_simulating: bool,
    speed: u8,
    rng: ChaCha8Rng,
    // Real time carried over between updates
    pending: Duration,
}

impl SimulationEngine {
    /// Engine with the built-in presets and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Engine whose games are fully reproducible from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        let rules = GameRules::default();
        Self {
            home_team: Team::default_home(),
            away_team: Team::default_away(),
            state: GameState::new(&rules),
            rules,
            scenarios: ScenarioStore::new(),
            results: ResultsStore::new(),
            is_simulating: false,
            speed: speed::DEFAULT,
            rng,
            pending: Duration::ZERO,
        }
    }

    /// Replace the scenario catalog.
    pub fn with_scenarios(mut self, scenarios: ScenarioStore) -> Self {
        self.scenarios = scenarios;
        self
    }

    pub fn is_simulating(&self) -> bool {
        self.is_simulating
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn active_scenario(&self) -> Option<&Scenario> {
        self.scenarios.active()
    }

    // ========================================================================
    // CONTROLS
    // ========================================================================

    /// Activate a scenario and load its teams, rules and state.
    ///
    /// Stops the simulator and drops the current run.
    pub fn select_scenario(&mut self, id: &str) -> Result<()> {
        let scenario = self.scenarios.set_active(id)?.clone();
        self.home_team = scenario.home_team;
        self.away_team = scenario.away_team;
        self.rules = scenario.game_rules;
        self.state = scenario.game_state;
        self.is_simulating = false;
        self.pending = Duration::ZERO;
        self.results.clear_current();
        log::info!("Scenario '{}' selected", id);
        Ok(())
    }

    pub fn update_home_team(&mut self, update: &TeamUpdate) -> Result<()> {
        let team = self.home_team.merged(update);
        team.validate()?;
        self.home_team = team;
        Ok(())
    }

    pub fn update_away_team(&mut self, update: &TeamUpdate) -> Result<()> {
        let team = self.away_team.merged(update);
        team.validate()?;
        self.away_team = team;
        Ok(())
    }

    /// Apply a rules edit. The period clock restarts at a full quarter.
    pub fn update_rules(&mut self, update: &RulesUpdate) -> Result<()> {
        let rules = self.rules.merged(update);
        rules.validate()?;
        self.rules = rules;
        self.state.time_remaining = self.rules.quarter_seconds();
        Ok(())
    }

    pub fn update_game_state(&mut self, update: &GameStateUpdate) {
        self.state = self.state.merged(update);
    }

    /// Start the simulator. A fresh run is opened only if none exists.
    pub fn play(&mut self) -> Result<()> {
        self.require_active()?;
        if self.state.is_over() {
            return Err(SimError::GameOver);
        }
        if self.results.current().is_none() {
            self.results.initialize(RunParameters::from(&self.rules));
        }
        self.is_simulating = true;
        Ok(())
    }

    pub fn pause(&mut self) {
        self.is_simulating = false;
        self.pending = Duration::ZERO;
    }

    pub fn toggle(&mut self) -> Result<()> {
        if self.is_simulating {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Play exactly one tick while paused.
    pub fn step(&mut self) -> Result<TickOutcome> {
        self.require_active()?;
        if self.is_simulating {
            return Err(SimError::Running);
        }
        if self.state.is_over() {
            return Err(SimError::GameOver);
        }
        if self.results.current().is_none() {
            self.results.initialize(RunParameters::from(&self.rules));
        }
        Ok(self.tick())
    }

    pub fn set_speed(&mut self, value: u8) -> Result<()> {
        if !(speed::MIN..=speed::MAX).contains(&value) {
            return Err(SimError::InvalidSpeed {
                got: value,
                min: speed::MIN,
                max: speed::MAX,
            });
        }
        self.speed = value;
        Ok(())
    }

    /// Real time between ticks at the current speed.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(speed::BASE_INTERVAL_MS / self.speed as u64)
    }

    /// Stop, restore tip-off state for the current rules and drop the run.
    pub fn reset(&mut self) {
        self.pause();
        self.state = GameState::new(&self.rules);
        self.results.clear_current();
    }

    /// Snapshot the current run; returns its index in the saved list.
    pub fn save(&mut self) -> Result<usize> {
        let index = self.results.save()?;
        log::info!("Saved results #{}", index);
        Ok(index)
    }

    /// Spend one of `side`'s timeouts; returns how many are left.
    pub fn call_timeout(&mut self, side: Side) -> Result<u8> {
        if !self.state.call_timeout(side) {
            return Err(SimError::NoTimeoutsLeft(side));
        }
        let left = self.state.timeouts.get(side);
        log::info!("Timeout {} ({} left)", side.label(), left);
        Ok(left)
    }

    fn require_active(&self) -> Result<()> {
        if self.scenarios.active().is_none() {
            return Err(SimError::NoActiveScenario);
        }
        Ok(())
    }

    // ========================================================================
    // LOOP
    // ========================================================================

    /// Advance real time by `delta`, firing every tick that came due.
    pub fn update(&mut self, delta: Duration) -> Vec<TickOutcome> {
        let mut fired = Vec::new();
        if !self.is_simulating {
            return fired;
        }

        let interval = self.tick_interval();
        self.pending += delta;
        while self.is_simulating && self.pending >= interval {
            self.pending -= interval;
            fired.push(self.tick());
        }
        if !self.is_simulating {
            self.pending = Duration::ZERO;
        }
        fired
    }

    /// Run ticks until the game ends or `max_ticks` have fired.
    ///
    /// Returns the number of ticks played.
    pub fn run_to_completion(&mut self, max_ticks: u32) -> Result<u32> {
        self.play()?;
        let mut ticks = 0;
        while self.is_simulating && ticks < max_ticks {
            self.tick();
            ticks += 1;
        }
        Ok(ticks)
    }

    fn tick(&mut self) -> TickOutcome {
        if self.state.is_over() {
            return self.finish();
        }

        let dead_ball = self.state.advance_time(timing::DEAD_BALL_SECS, &self.rules);
        self.results.add_clock_time(dead_ball.elapsed);
        self.log_clock(&dead_ball);
        if self.state.is_over() {
            return self.finish();
        }

        let possession = resolve_possession(
            &mut self.rng,
            &self.home_team,
            &self.away_team,
            &self.rules,
            &self.state,
        );
        let tick = apply_outcome(&mut self.state, &self.rules, &possession);
        log::debug!(
            "{} {:?} {}s, {} pts -> {}-{} Q{} {}",
            possession.team.label(),
            possession.result,
            possession.duration,
            possession.points(),
            self.state.home_score,
            self.state.away_score,
            self.state.quarter,
            self.state.clock_display(),
        );
        self.log_clock(&tick);
        self.results.add_possession(possession.clone(), tick.elapsed);
        if matches!(tick.event, ClockEvent::GameEnded { .. }) {
            self.stop_run();
        }

        TickOutcome::Possession {
            possession,
            event: tick.event,
        }
    }

    fn finish(&mut self) -> TickOutcome {
        self.stop_run();
        TickOutcome::Finished {
            winner: self.state.leader(),
        }
    }

    /// Mark the run complete and stop the simulator.
    fn stop_run(&mut self) {
        self.results.complete_run();
        self.is_simulating = false;
        self.pending = Duration::ZERO;
    }

    fn log_clock(&self, tick: &ClockTick) {
        match tick.event {
            ClockEvent::Running => {}
            ClockEvent::QuarterEnded { next_quarter } => {
                log::info!(
                    "End of Q{}: {}-{}",
                    next_quarter - 1,
                    self.state.home_score,
                    self.state.away_score
                );
            }
            ClockEvent::OvertimeStarted { quarter } => {
                log::info!(
                    "Tied {}-{}, overtime period {}",
                    self.state.home_score,
                    self.state.away_score,
                    quarter - timing::REGULATION_QUARTERS
                );
            }
            ClockEvent::GameEnded { winner } => {
                log::info!(
                    "Final: {}-{}, {} wins",
                    self.state.home_score,
                    self.state.away_score,
                    winner.label()
                );
            }
        }
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(scenario: &str) -> SimulationEngine {
        let mut engine = SimulationEngine::with_seed(11);
        engine.select_scenario(scenario).unwrap();
        engine
    }

    #[test]
    fn test_controls_need_active_scenario() {
        let mut engine = SimulationEngine::with_seed(1);
        assert!(matches!(engine.play(), Err(SimError::NoActiveScenario)));
        assert!(matches!(engine.step(), Err(SimError::NoActiveScenario)));
        assert!(!engine.is_simulating());
    }

    #[test]
    fn test_select_scenario_loads_state() {
        let engine = engine("late-game");
        assert_eq!(engine.state.time_remaining, 24);
        assert_eq!(engine.state.quarter, 4);
        assert_eq!(engine.state.home_score, 98);
        assert_eq!(engine.home_team.name, "Home Team");
        assert_eq!(engine.active_scenario().unwrap().id, "late-game");
    }

    #[test]
    fn test_play_keeps_existing_results() {
        let mut engine = engine("pace-impact");
        engine.play().unwrap();
        engine.update(Duration::from_secs(2));
        let played = engine.results.current().unwrap().possessions.len();
        assert!(played > 0);

        engine.pause();
        engine.play().unwrap();
        assert_eq!(engine.results.current().unwrap().possessions.len(), played);
    }

    #[test]
    fn test_step_requires_pause() {
        let mut engine = engine("pace-impact");
        engine.play().unwrap();
        assert!(matches!(engine.step(), Err(SimError::Running)));
        engine.pause();
        let outcome = engine.step().unwrap();
        assert!(matches!(outcome, TickOutcome::Possession { .. }));
        assert_eq!(engine.results.current().unwrap().possessions.len(), 1);
    }

    #[test]
    fn test_update_fires_one_tick_per_interval() {
        let mut engine = engine("pace-impact");
        engine.set_speed(2).unwrap();
        assert_eq!(engine.tick_interval(), Duration::from_millis(500));

        // paused: nothing happens
        assert!(engine.update(Duration::from_secs(5)).is_empty());

        engine.play().unwrap();
        assert_eq!(engine.update(Duration::from_millis(400)).len(), 0);
        assert_eq!(engine.update(Duration::from_millis(100)).len(), 1);
        assert_eq!(engine.update(Duration::from_millis(1600)).len(), 3);
    }

    #[test]
    fn test_speed_bounds() {
        let mut engine = SimulationEngine::with_seed(1);
        assert!(matches!(
            engine.set_speed(0),
            Err(SimError::InvalidSpeed { got: 0, .. })
        ));
        assert!(engine.set_speed(6).is_err());
        engine.set_speed(5).unwrap();
        assert_eq!(engine.tick_interval(), Duration::from_millis(200));
        assert_eq!(engine.speed(), 5);
    }

    #[test]
    fn test_late_game_runs_to_a_result() {
        let mut engine = engine("late-game");
        let ticks = engine.run_to_completion(10_000).unwrap();
        assert!(ticks > 0);
        assert!(engine.state.is_over());
        assert!(!engine.is_simulating());
        let current = engine.results.current().unwrap();
        assert_eq!(current.runs_completed, 1);
        assert_eq!(current.game_stats.home.points + 98, engine.state.home_score);
        assert_eq!(current.game_stats.away.points + 100, engine.state.away_score);
        assert!(matches!(engine.play(), Err(SimError::GameOver)));
        assert!(matches!(engine.step(), Err(SimError::GameOver)));
    }

    #[test]
    fn test_final_buzzer_stops_simulation() {
        let mut checked = 0;
        for seed in 0..20 {
            let mut engine = SimulationEngine::with_seed(seed);
            engine.select_scenario("late-game").unwrap();
            engine.play().unwrap();

            let mut ended = false;
            for _ in 0..10_000 {
                let interval = engine.tick_interval();
                let fired = engine.update(interval);
                if let Some(TickOutcome::Possession {
                    event: ClockEvent::GameEnded { .. },
                    ..
                }) = fired.last()
                {
                    ended = true;
                    break;
                }
                if !engine.is_simulating() {
                    break;
                }
            }
            if !ended {
                // game ended on the dead-ball clock instead
                continue;
            }

            assert!(!engine.is_simulating(), "seed {} still running", seed);
            assert_eq!(engine.state.time_remaining, 0);
            assert_eq!(engine.results.current().unwrap().runs_completed, 1);
            assert!(engine.update(Duration::from_secs(10)).is_empty());
            assert_eq!(engine.save().unwrap(), 0);
            assert_eq!(engine.results.saved()[0].runs_completed, 1);
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_reset_restores_tip_off() {
        let mut engine = engine("late-game");
        engine.run_to_completion(10_000).unwrap();
        engine.reset();
        assert_eq!(engine.state, GameState::new(&engine.rules));
        assert!(engine.results.current().is_none());
        assert!(!engine.is_simulating());
    }

    #[test]
    fn test_update_rules_resets_clock() {
        let mut engine = engine("late-game");
        engine
            .update_rules(&RulesUpdate {
                quarter_length: Some(10),
                ..RulesUpdate::default()
            })
            .unwrap();
        assert_eq!(engine.state.time_remaining, 600);
        assert_eq!(engine.state.home_score, 98);

        let bad = RulesUpdate {
            shot_clock_duration: Some(2),
            ..RulesUpdate::default()
        };
        assert!(matches!(engine.update_rules(&bad), Err(SimError::Validation(_))));
        assert_eq!(engine.rules.shot_clock_duration, 24);
    }

    #[test]
    fn test_update_team_validates() {
        let mut engine = engine("pace-impact");
        engine
            .update_home_team(&TeamUpdate {
                pace_preference: Some(10),
                ..TeamUpdate::default()
            })
            .unwrap();
        assert_eq!(engine.home_team.pace_preference, 10);

        let bad = TeamUpdate {
            three_point_percentage: Some(1.4),
            ..TeamUpdate::default()
        };
        assert!(engine.update_away_team(&bad).is_err());
        assert_eq!(engine.away_team.three_point_percentage, 0.36);
    }

    #[test]
    fn test_update_game_state_merges() {
        let mut engine = engine("pace-impact");
        engine.update_game_state(&GameStateUpdate {
            home_score: Some(50),
            possession: Some(Side::Away),
            ..GameStateUpdate::default()
        });
        assert_eq!(engine.state.home_score, 50);
        assert_eq!(engine.state.possession, Side::Away);
        assert_eq!(engine.state.quarter, 1);
    }

    #[test]
    fn test_timeouts() {
        let mut engine = engine("late-game");
        assert_eq!(engine.call_timeout(Side::Away).unwrap(), 0);
        assert!(matches!(
            engine.call_timeout(Side::Away),
            Err(SimError::NoTimeoutsLeft(Side::Away))
        ));
        assert_eq!(engine.call_timeout(Side::Home).unwrap(), 1);
    }

    #[test]
    fn test_save_requires_run() {
        let mut engine = engine("pace-impact");
        assert!(matches!(engine.save(), Err(SimError::NoResults)));
        engine.step().unwrap();
        assert_eq!(engine.save().unwrap(), 0);
    }

    #[test]
    fn test_select_scenario_stops_and_clears() {
        let mut engine = engine("pace-impact");
        engine.play().unwrap();
        engine.update(Duration::from_secs(1));
        engine.select_scenario("foul-strategy").unwrap();
        assert!(!engine.is_simulating());
        assert!(engine.results.current().is_none());
        assert_eq!(engine.state.possession, Side::Away);
        assert!(engine.select_scenario("missing").is_err());
    }

    #[test]
    fn test_toggle() {
        let mut engine = engine("pace-impact");
        engine.toggle().unwrap();
        assert!(engine.is_simulating());
        engine.toggle().unwrap();
        assert!(!engine.is_simulating());
    }
}

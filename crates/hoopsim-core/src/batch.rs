//! Batch runner - many independent games of one scenario.
//!
//! Game `i` is played from seed `base_seed + i` on its own engine, so a
//! batch is reproducible for a given base seed regardless of how rayon
//! schedules the games.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use hoopsim_logic::constants::timing;
use hoopsim_logic::{Side, TeamStats};

use crate::engine::SimulationEngine;
use crate::error::Result;
use crate::scenarios::ScenarioStore;

/// Upper bound on ticks for a single batch game.
pub const MAX_TICKS_PER_GAME: u32 = 10_000;

/// Outcome of one game in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub seed: u64,
    pub home_score: u32,
    pub away_score: u32,
    pub winner: Option<Side>,
    pub overtime_periods: u8,
    pub home: TeamStats,
    pub away: TeamStats,
}

impl GameSummary {
    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    pub fn stats(&self, side: Side) -> &TeamStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

/// Per-side means across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideAverages {
    pub score: f64,
    pub effective_field_goal_percentage: f64,
    pub true_shooting_percentage: f64,
    pub pace: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub scenario_id: String,
    pub base_seed: u64,
    pub runs: usize,
    pub home_wins: usize,
    pub away_wins: usize,
    pub overtime_games: usize,
    pub home: SideAverages,
    pub away: SideAverages,
    pub games: Vec<GameSummary>,
}

/// Play one full game of `scenario_id` from `seed`.
pub fn play_game(scenarios: &ScenarioStore, scenario_id: &str, seed: u64) -> Result<GameSummary> {
    let mut engine = SimulationEngine::with_seed(seed).with_scenarios(scenarios.clone());
    engine.select_scenario(scenario_id)?;
    engine.run_to_completion(MAX_TICKS_PER_GAME)?;

    let (home, away) = engine
        .results
        .current()
        .map(|r| (r.game_stats.home.clone(), r.game_stats.away.clone()))
        .unwrap_or_default();

    Ok(GameSummary {
        seed,
        home_score: engine.state.home_score,
        away_score: engine.state.away_score,
        winner: engine.state.leader(),
        overtime_periods: engine.state.quarter.saturating_sub(timing::REGULATION_QUARTERS),
        home,
        away,
    })
}

/// Play `runs` games in parallel and summarise them.
pub fn run_batch(
    scenarios: &ScenarioStore,
    scenario_id: &str,
    runs: usize,
    base_seed: u64,
) -> Result<BatchSummary> {
    let games = (0..runs)
        .into_par_iter()
        .map(|i| play_game(scenarios, scenario_id, base_seed.wrapping_add(i as u64)))
        .collect::<Result<Vec<_>>>()?;

    let count = |side: Side| games.iter().filter(|g| g.winner == Some(side)).count();

    let summary = BatchSummary {
        scenario_id: scenario_id.to_string(),
        base_seed,
        runs,
        home_wins: count(Side::Home),
        away_wins: count(Side::Away),
        overtime_games: games.iter().filter(|g| g.overtime_periods > 0).count(),
        home: side_averages(&games, Side::Home),
        away: side_averages(&games, Side::Away),
        games,
    };
    log::info!(
        "Batch '{}': {} runs, home {} / away {} wins",
        scenario_id,
        runs,
        summary.home_wins,
        summary.away_wins
    );
    Ok(summary)
}

fn side_averages(games: &[GameSummary], side: Side) -> SideAverages {
    if games.is_empty() {
        return SideAverages::default();
    }
    let n = games.len() as f64;
    let mean = |f: &dyn Fn(&TeamStats) -> f64| {
        games.iter().map(|g| f(g.stats(side))).sum::<f64>() / n
    };
    SideAverages {
        score: games.iter().map(|g| g.score(side) as f64).sum::<f64>() / n,
        effective_field_goal_percentage: mean(&|s: &TeamStats| s.effective_field_goal_percentage),
        true_shooting_percentage: mean(&|s: &TeamStats| s.true_shooting_percentage),
        pace: mean(&|s: &TeamStats| s.pace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_batch_is_reproducible() {
        let store = ScenarioStore::new();
        let a = run_batch(&store, "pace-impact", 8, 100).unwrap();
        let b = run_batch(&store, "pace-impact", 8, 100).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.games.len(), 8);
        assert_eq!(a.games[3].seed, 103);
    }

    #[test]
    fn test_every_game_has_a_winner() {
        let store = ScenarioStore::new();
        let summary = run_batch(&store, "three-point-revolution", 6, 7).unwrap();
        assert_eq!(summary.home_wins + summary.away_wins, 6);
        assert!(summary.home.score > 0.0);
        assert!(summary.away.pace > 0.0);
        assert!(summary.overtime_games <= 6);
    }

    #[test]
    fn test_game_matches_seeded_engine() {
        let store = ScenarioStore::new();
        let game = play_game(&store, "late-game", 42).unwrap();

        let mut engine = SimulationEngine::with_seed(42);
        engine.select_scenario("late-game").unwrap();
        engine.run_to_completion(MAX_TICKS_PER_GAME).unwrap();
        assert_eq!(game.home_score, engine.state.home_score);
        assert_eq!(game.away_score, engine.state.away_score);
    }

    #[test]
    fn test_unknown_scenario() {
        let store = ScenarioStore::new();
        assert!(matches!(
            run_batch(&store, "nope", 2, 0),
            Err(SimError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_empty_batch() {
        let store = ScenarioStore::new();
        let summary = run_batch(&store, "pace-impact", 0, 0).unwrap();
        assert_eq!(summary.runs, 0);
        assert_eq!(summary.home, SideAverages::default());
    }
}

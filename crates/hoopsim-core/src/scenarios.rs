//! Scenario store - preset matchups and the active selection.
//!
//! A scenario bundles both team profiles, the rules, and the game state the
//! simulation starts from. The store ships with four presets and can be
//! replaced by a JSON catalog:
//!
//! ```json
//! { "scenarios": [ { "id": "...", "name": "...", "description": "...",
//!     "home_team": { ... }, "away_team": { ... },
//!     "game_rules": { ... }, "game_state": { ... } } ] }
//! ```

use std::path::Path;

use hoopsim_logic::state::Timeouts;
use hoopsim_logic::{GameRules, GameState, ShotSelectionBias, Side, Team};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub home_team: Team,
    pub away_team: Team,
    pub game_rules: GameRules,
    pub game_state: GameState,
}

impl Scenario {
    pub fn validate(&self) -> Result<()> {
        self.home_team.validate()?;
        self.away_team.validate()?;
        self.game_rules.validate()?;
        Ok(())
    }
}

/// Partial scenario edit - `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub home_team: Option<Team>,
    pub away_team: Option<Team>,
    pub game_rules: Option<GameRules>,
    pub game_state: Option<GameState>,
}

/// On-disk catalog format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCatalog {
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStore {
    scenarios: Vec<Scenario>,
    active_scenario_id: Option<String>,
}

impl ScenarioStore {
    /// Store holding the built-in presets, none active.
    pub fn new() -> Self {
        Self {
            scenarios: presets(),
            active_scenario_id: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            scenarios: Vec::new(),
            active_scenario_id: None,
        }
    }

    /// Build a store from a JSON catalog string, validating every scenario.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: ScenarioCatalog = serde_json::from_str(json)?;
        let mut store = Self::empty();
        for scenario in catalog.scenarios {
            store.add(scenario)?;
        }
        Ok(store)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        let catalog = ScenarioCatalog {
            scenarios: self.scenarios.clone(),
        };
        Ok(serde_json::to_string_pretty(&catalog)?)
    }

    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn add(&mut self, scenario: Scenario) -> Result<()> {
        if self.get(&scenario.id).is_some() {
            return Err(SimError::DuplicateScenario(scenario.id));
        }
        scenario.validate()?;
        self.scenarios.push(scenario);
        Ok(())
    }

    /// Merge `update` into the scenario with `id`.
    pub fn update(&mut self, id: &str, update: ScenarioUpdate) -> Result<()> {
        let scenario = self
            .scenarios
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SimError::UnknownScenario(id.to_string()))?;

        let merged = Scenario {
            id: scenario.id.clone(),
            name: update.name.unwrap_or_else(|| scenario.name.clone()),
            description: update
                .description
                .unwrap_or_else(|| scenario.description.clone()),
            home_team: update.home_team.unwrap_or_else(|| scenario.home_team.clone()),
            away_team: update.away_team.unwrap_or_else(|| scenario.away_team.clone()),
            game_rules: update
                .game_rules
                .unwrap_or_else(|| scenario.game_rules.clone()),
            game_state: update
                .game_state
                .unwrap_or_else(|| scenario.game_state.clone()),
        };
        merged.validate()?;
        *scenario = merged;
        Ok(())
    }

    /// Remove a scenario; clears the active selection if it pointed there.
    pub fn delete(&mut self, id: &str) -> Result<Scenario> {
        let index = self
            .scenarios
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SimError::UnknownScenario(id.to_string()))?;
        if self.active_scenario_id.as_deref() == Some(id) {
            self.active_scenario_id = None;
        }
        Ok(self.scenarios.remove(index))
    }

    pub fn set_active(&mut self, id: &str) -> Result<&Scenario> {
        let index = self
            .scenarios
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SimError::UnknownScenario(id.to_string()))?;
        self.active_scenario_id = Some(id.to_string());
        Ok(&self.scenarios[index])
    }

    pub fn clear_active(&mut self) {
        self.active_scenario_id = None;
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_scenario_id.as_deref()
    }

    pub fn active(&self) -> Option<&Scenario> {
        self.active_scenario_id
            .as_deref()
            .and_then(|id| self.get(id))
    }
}

impl Default for ScenarioStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PRESETS
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn team(
    name: &str,
    offensive_rating: f64,
    defensive_rating: f64,
    three: f64,
    mid: f64,
    inside: f64,
    free_throw: f64,
    pace_preference: u8,
    bias: (f64, f64, f64),
) -> Team {
    Team {
        name: name.to_string(),
        offensive_rating,
        defensive_rating,
        three_point_percentage: three,
        mid_range_percentage: mid,
        inside_percentage: inside,
        free_throw_percentage: free_throw,
        pace_preference,
        shot_selection_bias: ShotSelectionBias {
            three_point: bias.0,
            mid_range: bias.1,
            inside: bias.2,
        },
    }
}

/// Mid-game state: score, clock, quarter, team fouls, ball, timeouts.
#[allow(clippy::too_many_arguments)]
fn game_state(
    home_score: u32,
    away_score: u32,
    time_remaining: u32,
    quarter: u8,
    home_team_fouls: u8,
    away_team_fouls: u8,
    possession: Side,
    timeouts: (u8, u8),
) -> GameState {
    GameState {
        home_score,
        away_score,
        time_remaining,
        quarter,
        home_team_fouls,
        away_team_fouls,
        possession,
        timeouts: Timeouts {
            home: timeouts.0,
            away: timeouts.1,
        },
    }
}

/// The four built-in scenarios.
pub fn presets() -> Vec<Scenario> {
    let rules = GameRules::default();
    let tip_off = GameState::new(&rules);

    vec![
        Scenario {
            id: "late-game".into(),
            name: "Late Game Situation".into(),
            description: "Test end-of-game strategies with 24 seconds left and down by 2".into(),
            home_team: team(
                "Home Team",
                112.0,
                110.0,
                0.37,
                0.44,
                0.65,
                0.80,
                7,
                (0.38, 0.22, 0.40),
            ),
            away_team: team(
                "Away Team",
                108.0,
                105.0,
                0.33,
                0.41,
                0.60,
                0.75,
                4,
                (0.30, 0.28, 0.42),
            ),
            game_rules: rules.clone(),
            game_state: game_state(98, 100, 24, 4, 3, 4, Side::Home, (2, 1)),
        },
        Scenario {
            id: "pace-impact".into(),
            name: "Pace Impact Analysis".into(),
            description: "See how changing the shot clock affects scoring and efficiency".into(),
            home_team: team(
                "Fast-Paced Team",
                115.0,
                112.0,
                0.38,
                0.42,
                0.62,
                0.78,
                9,
                (0.40, 0.15, 0.45),
            ),
            away_team: team(
                "Slow-Paced Team",
                108.0,
                104.0,
                0.36,
                0.44,
                0.58,
                0.80,
                3,
                (0.30, 0.35, 0.35),
            ),
            game_rules: rules.clone(),
            game_state: tip_off.clone(),
        },
        Scenario {
            id: "three-point-revolution".into(),
            name: "Three-Point Revolution".into(),
            description: "Adjust three-point line distance to see impact on shot selection".into(),
            home_team: team(
                "Three-Point Team",
                114.0,
                110.0,
                0.40,
                0.41,
                0.60,
                0.82,
                7,
                (0.45, 0.20, 0.35),
            ),
            away_team: team(
                "Inside Team",
                110.0,
                108.0,
                0.33,
                0.42,
                0.65,
                0.75,
                5,
                (0.25, 0.30, 0.45),
            ),
            game_rules: rules.clone(),
            game_state: tip_off,
        },
        Scenario {
            id: "foul-strategy".into(),
            name: "Foul Strategy Optimizer".into(),
            description: "Determine optimal fouling strategies in end-game situations".into(),
            home_team: team(
                "Trailing Team",
                112.0,
                109.0,
                0.38,
                0.43,
                0.62,
                0.78,
                8,
                (0.40, 0.22, 0.38),
            ),
            // Poor free-throw shooting is the point of this one.
            away_team: team(
                "Leading Team",
                110.0,
                107.0,
                0.36,
                0.42,
                0.60,
                0.70,
                4,
                (0.32, 0.28, 0.40),
            ),
            game_rules: rules,
            game_state: game_state(95, 98, 45, 4, 3, 3, Side::Away, (2, 2)),
        },
    ]
}

//! Results store - the current run, saved snapshots, and comparison.
//!
//! The current run accumulates the possession log, the box score and the
//! shot chart. Saving snapshots it; saved results persist only for the
//! life of the process.

use chrono::{DateTime, Utc};
use hoopsim_logic::{GameRules, GameStats, Possession, ShotAttempt, Side};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Rule parameters a run was played under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub shot_clock: u32,
    pub three_point_distance: f64,
    pub quarter_length: u32,
}

impl From<&GameRules> for RunParameters {
    fn from(rules: &GameRules) -> Self {
        Self {
            shot_clock: rules.shot_clock_duration,
            three_point_distance: rules.three_point_distance,
            quarter_length: rules.quarter_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub possessions: Vec<Possession>,
    pub game_stats: GameStats,
    /// Every attempt in order, free throws included.
    pub shot_chart: Vec<ShotAttempt>,
    pub runs_completed: u32,
    pub simulation_date_time: DateTime<Utc>,
    pub parameters: RunParameters,
    /// Game-clock seconds consumed since the run started.
    pub game_seconds_elapsed: u64,
}

impl SimulationResults {
    pub fn new(parameters: RunParameters) -> Self {
        Self {
            possessions: Vec::new(),
            game_stats: GameStats::default(),
            shot_chart: Vec::new(),
            runs_completed: 0,
            simulation_date_time: Utc::now(),
            parameters,
            game_seconds_elapsed: 0,
        }
    }

    /// Count dead-ball time that ran off outside any possession.
    pub fn add_clock_time(&mut self, seconds: u32) {
        self.game_seconds_elapsed += seconds as u64;
        self.game_stats.update_pace(self.game_seconds_elapsed);
    }

    /// Append a possession that used `seconds` of game clock.
    pub fn add_possession(&mut self, possession: Possession, seconds: u32) {
        self.game_seconds_elapsed += seconds as u64;
        self.game_stats.record(&possession, self.game_seconds_elapsed);
        self.shot_chart.extend(possession.attempts().cloned());
        self.possessions.push(possession);
    }
}

/// Per-team difference between two results (`other - base`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamDelta {
    pub points: i64,
    pub effective_field_goal_percentage: f64,
    pub true_shooting_percentage: f64,
    pub offensive_rating: f64,
    pub pace: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsComparison {
    pub home: TeamDelta,
    pub away: TeamDelta,
}

impl ResultsComparison {
    pub fn between(base: &SimulationResults, other: &SimulationResults) -> Self {
        let delta = |side: Side| {
            let a = base.game_stats.get(side);
            let b = other.game_stats.get(side);
            TeamDelta {
                points: b.points as i64 - a.points as i64,
                effective_field_goal_percentage: b.effective_field_goal_percentage
                    - a.effective_field_goal_percentage,
                true_shooting_percentage: b.true_shooting_percentage - a.true_shooting_percentage,
                offensive_rating: b.offensive_rating - a.offensive_rating,
                pace: b.pace - a.pace,
            }
        };
        Self {
            home: delta(Side::Home),
            away: delta(Side::Away),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsStore {
    current: Option<SimulationResults>,
    saved: Vec<SimulationResults>,
    comparison: Option<SimulationResults>,
    is_comparing: bool,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&SimulationResults> {
        self.current.as_ref()
    }

    pub fn saved(&self) -> &[SimulationResults] {
        &self.saved
    }

    pub fn comparison(&self) -> Option<&SimulationResults> {
        self.comparison.as_ref()
    }

    pub fn is_comparing(&self) -> bool {
        self.is_comparing
    }

    /// Start a fresh current run, replacing any existing one.
    pub fn initialize(&mut self, parameters: RunParameters) {
        self.current = Some(SimulationResults::new(parameters));
    }

    /// Ignored when no run is active.
    pub fn add_possession(&mut self, possession: Possession, seconds: u32) {
        if let Some(current) = self.current.as_mut() {
            current.add_possession(possession, seconds);
        }
    }

    pub fn add_clock_time(&mut self, seconds: u32) {
        if let Some(current) = self.current.as_mut() {
            current.add_clock_time(seconds);
        }
    }

    pub fn complete_run(&mut self) {
        if let Some(current) = self.current.as_mut() {
            current.runs_completed += 1;
        }
    }

    /// Snapshot the current run into the saved list; returns its index.
    pub fn save(&mut self) -> Result<usize> {
        let current = self.current.as_ref().ok_or(SimError::NoResults)?;
        self.saved.push(current.clone());
        Ok(self.saved.len() - 1)
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn set_comparison(&mut self, index: usize) -> Result<()> {
        let saved = self.saved.get(index).ok_or(SimError::SavedIndexOutOfRange {
            index,
            len: self.saved.len(),
        })?;
        self.comparison = Some(saved.clone());
        self.is_comparing = true;
        Ok(())
    }

    pub fn clear_comparison(&mut self) {
        self.comparison = None;
        self.is_comparing = false;
    }

    pub fn delete_saved(&mut self, index: usize) -> Result<SimulationResults> {
        if index >= self.saved.len() {
            return Err(SimError::SavedIndexOutOfRange {
                index,
                len: self.saved.len(),
            });
        }
        Ok(self.saved.remove(index))
    }

    /// Current run measured against the comparison baseline.
    pub fn compare(&self) -> Option<ResultsComparison> {
        match (&self.comparison, &self.current) {
            (Some(base), Some(current)) if self.is_comparing => {
                Some(ResultsComparison::between(base, current))
            }
            _ => None,
        }
    }
}

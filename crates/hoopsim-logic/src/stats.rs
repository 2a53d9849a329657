//! Running box-score totals and derived efficiency metrics.
//!
//! Counts are cumulative; every derived rate is recomputed from the counts
//! after each possession, so no error builds up beyond float rounding.
//! A rate whose denominator is zero stays at 0.

use serde::{Deserialize, Serialize};

use crate::constants::{shooting, timing};
use crate::resolver::{Possession, PossessionResult, ShotLocation};
use crate::state::Side;

/// eFG% = (FGM + 0.5 * 3PM) / FGA
pub fn effective_field_goal_percentage(fgm: u32, three_pm: u32, fga: u32) -> f64 {
    if fga == 0 {
        return 0.0;
    }
    (fgm as f64 + 0.5 * three_pm as f64) / fga as f64
}

/// TS% = PTS / (2 * (FGA + 0.44 * FTA))
pub fn true_shooting_percentage(points: u32, fga: u32, fta: u32) -> f64 {
    let attempts = fga as f64 + shooting::TS_FREE_THROW_WEIGHT * fta as f64;
    if attempts <= 0.0 {
        return 0.0;
    }
    points as f64 / (2.0 * attempts)
}

/// Points per 100 possessions.
pub fn offensive_rating(points: u32, possessions: u32) -> f64 {
    if possessions == 0 {
        return 0.0;
    }
    points as f64 / possessions as f64 * 100.0
}

/// Possessions scaled to a 48-minute game.
pub fn pace(total_possessions: u32, elapsed_seconds: u64) -> f64 {
    if elapsed_seconds == 0 {
        return 0.0;
    }
    let minutes = elapsed_seconds as f64 / 60.0;
    total_possessions as f64 * (timing::PACE_REFERENCE_MINUTES / minutes)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub points: u32,
    pub possessions: u32,
    pub field_goals_attempted: u32,
    pub field_goals_made: u32,
    pub three_pointers_attempted: u32,
    pub three_pointers_made: u32,
    pub free_throws_attempted: u32,
    pub free_throws_made: u32,
    pub turnovers: u32,
    /// Fouls committed by this team.
    pub fouls: u32,

    // Derived
    pub offensive_rating: f64,
    pub effective_field_goal_percentage: f64,
    pub true_shooting_percentage: f64,
    pub pace: f64,
}

impl TeamStats {
    pub fn field_goal_percentage(&self) -> f64 {
        if self.field_goals_attempted == 0 {
            0.0
        } else {
            self.field_goals_made as f64 / self.field_goals_attempted as f64
        }
    }

    pub fn three_point_percentage(&self) -> f64 {
        if self.three_pointers_attempted == 0 {
            0.0
        } else {
            self.three_pointers_made as f64 / self.three_pointers_attempted as f64
        }
    }

    pub fn free_throw_percentage(&self) -> f64 {
        if self.free_throws_attempted == 0 {
            0.0
        } else {
            self.free_throws_made as f64 / self.free_throws_attempted as f64
        }
    }

    /// Count one offensive possession for this team.
    fn record_offense(&mut self, possession: &Possession) {
        self.possessions += 1;
        if possession.result == PossessionResult::Turnover {
            self.turnovers += 1;
        }

        for shot in possession.attempts() {
            self.points += shot.points;
            match shot.location {
                ShotLocation::FreeThrow => {
                    self.free_throws_attempted += 1;
                    self.free_throws_made += shot.made as u32;
                }
                ShotLocation::ThreePoint => {
                    self.three_pointers_attempted += 1;
                    self.three_pointers_made += shot.made as u32;
                    self.field_goals_attempted += 1;
                    self.field_goals_made += shot.made as u32;
                }
                ShotLocation::Inside | ShotLocation::MidRange => {
                    self.field_goals_attempted += 1;
                    self.field_goals_made += shot.made as u32;
                }
            }
        }
    }

    fn recompute_rates(&mut self) {
        self.offensive_rating = offensive_rating(self.points, self.possessions);
        self.effective_field_goal_percentage = effective_field_goal_percentage(
            self.field_goals_made,
            self.three_pointers_made,
            self.field_goals_attempted,
        );
        self.true_shooting_percentage = true_shooting_percentage(
            self.points,
            self.field_goals_attempted,
            self.free_throws_attempted,
        );
    }
}

/// Box score for both teams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub home: TeamStats,
    pub away: TeamStats,
}

impl GameStats {
    pub fn get(&self, side: Side) -> &TeamStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    fn get_mut(&mut self, side: Side) -> &mut TeamStats {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    pub fn total_possessions(&self) -> u32 {
        self.home.possessions + self.away.possessions
    }

    /// Fold one possession into the totals and refresh every rate.
    ///
    /// `elapsed_seconds` is the game clock consumed so far in the run and
    /// drives pace for both teams.
    pub fn record(&mut self, possession: &Possession, elapsed_seconds: u64) {
        self.get_mut(possession.team).record_offense(possession);
        if possession.result == PossessionResult::Foul {
            self.get_mut(possession.team.opponent()).fouls += 1;
        }

        self.home.recompute_rates();
        self.away.recompute_rates();
        self.update_pace(elapsed_seconds);
    }

    pub fn update_pace(&mut self, elapsed_seconds: u64) {
        let game_pace = pace(self.total_possessions(), elapsed_seconds);
        self.home.pace = game_pace;
        self.away.pace = game_pace;
    }
}

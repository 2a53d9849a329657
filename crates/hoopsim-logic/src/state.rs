//! Game state and the clock / period state machine.
//!
//! # Periods
//!
//! A game moves through `Q1..Q4`, then zero or more overtime periods, then
//! `Ended`. The only way to move between periods is [`GameState::advance_time`]:
//!
//! - running out the clock before Q4 starts the next quarter, resets team
//!   fouls, and flips possession;
//! - running out the clock in Q4 or overtime with a tied score starts
//!   another overtime period and resets team fouls;
//! - running out the clock in Q4 or overtime with a leader ends the game
//!   with the clock pinned at zero.
//!
//! ```
//! use hoopsim_logic::rules::GameRules;
//! use hoopsim_logic::state::{ClockEvent, GameState};
//!
//! let rules = GameRules::default();
//! let mut state = GameState::new(&rules);
//! state.time_remaining = 2;
//! let tick = state.advance_time(4, &rules);
//! assert_eq!(tick.event, ClockEvent::QuarterEnded { next_quarter: 2 });
//! assert_eq!(state.time_remaining, 720);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, timing};
use crate::rules::GameRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub home: u8,
    pub away: u8,
}

impl Timeouts {
    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    fn get_mut(&mut self, side: Side) -> &mut u8 {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            home: defaults::TIMEOUTS_PER_TEAM,
            away: defaults::TIMEOUTS_PER_TEAM,
        }
    }
}

/// Where the game is in its period sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Regulation quarter 1-4.
    Quarter(u8),
    /// Overtime period, 1-based.
    Overtime(u8),
    Ended,
}

/// Transition reported by [`GameState::advance_time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockEvent {
    /// Time ran off; still in the same period.
    Running,
    /// Regulation quarter ended; play continues in `next_quarter`.
    QuarterEnded { next_quarter: u8 },
    /// Score was tied when the period expired; `quarter` is the new period.
    OvertimeStarted { quarter: u8 },
    /// The period expired with a leader.
    GameEnded { winner: Side },
}

/// Result of one clock advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub event: ClockEvent,
    /// Game-clock seconds actually consumed (never more than was left).
    pub elapsed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub home_score: u32,
    pub away_score: u32,
    /// Seconds left in the current period.
    pub time_remaining: u32,
    /// 1-4 regulation, 5+ overtime.
    pub quarter: u8,
    pub home_team_fouls: u8,
    pub away_team_fouls: u8,
    /// The one team with the ball.
    pub possession: Side,
    pub timeouts: Timeouts,
}

impl GameState {
    /// Fresh tip-off state derived from the rules.
    pub fn new(rules: &GameRules) -> Self {
        Self {
            home_score: 0,
            away_score: 0,
            time_remaining: rules.quarter_seconds(),
            quarter: 1,
            home_team_fouls: 0,
            away_team_fouls: 0,
            possession: Side::Home,
            timeouts: Timeouts::default(),
        }
    }

    pub fn home_possession(&self) -> bool {
        self.possession == Side::Home
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    pub fn fouls(&self, side: Side) -> u8 {
        match side {
            Side::Home => self.home_team_fouls,
            Side::Away => self.away_team_fouls,
        }
    }

    pub fn is_tied(&self) -> bool {
        self.home_score == self.away_score
    }

    pub fn leader(&self) -> Option<Side> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_over() {
            GamePhase::Ended
        } else if self.quarter > timing::REGULATION_QUARTERS {
            GamePhase::Overtime(self.quarter - timing::REGULATION_QUARTERS)
        } else {
            GamePhase::Quarter(self.quarter)
        }
    }

    /// The game is over once the final period has expired with a leader.
    pub fn is_over(&self) -> bool {
        self.quarter >= timing::REGULATION_QUARTERS && self.time_remaining == 0 && !self.is_tied()
    }

    /// Add points without touching possession. Scores only go up.
    pub fn add_points(&mut self, side: Side, points: u32) {
        match side {
            Side::Home => self.home_score += points,
            Side::Away => self.away_score += points,
        }
    }

    /// Charge a team foul; returns the team's new foul count for the period.
    pub fn add_foul(&mut self, side: Side) -> u8 {
        let fouls = match side {
            Side::Home => &mut self.home_team_fouls,
            Side::Away => &mut self.away_team_fouls,
        };
        *fouls = fouls.saturating_add(1);
        *fouls
    }

    /// Spend a timeout. Returns `false` when the team has none left.
    pub fn call_timeout(&mut self, side: Side) -> bool {
        let remaining = self.timeouts.get_mut(side);
        if *remaining == 0 {
            return false;
        }
        *remaining -= 1;
        true
    }

    fn reset_fouls(&mut self) {
        self.home_team_fouls = 0;
        self.away_team_fouls = 0;
    }

    /// Run `seconds` off the game clock, crossing into the next period if
    /// the current one expires.
    pub fn advance_time(&mut self, seconds: u32, rules: &GameRules) -> ClockTick {
        if self.time_remaining > seconds {
            self.time_remaining -= seconds;
            return ClockTick {
                event: ClockEvent::Running,
                elapsed: seconds,
            };
        }

        let elapsed = self.time_remaining;

        let event = if self.quarter < timing::REGULATION_QUARTERS {
            self.quarter += 1;
            self.time_remaining = rules.quarter_seconds();
            self.reset_fouls();
            self.possession = self.possession.opponent();
            ClockEvent::QuarterEnded {
                next_quarter: self.quarter,
            }
        } else {
            match self.leader() {
                None => {
                    self.quarter += 1;
                    self.time_remaining = rules.overtime_seconds();
                    self.reset_fouls();
                    ClockEvent::OvertimeStarted {
                        quarter: self.quarter,
                    }
                }
                Some(winner) => {
                    self.time_remaining = 0;
                    ClockEvent::GameEnded { winner }
                }
            }
        };

        ClockTick { event, elapsed }
    }

    /// `M:SS` for the current period clock.
    pub fn clock_display(&self) -> String {
        format_clock(self.time_remaining)
    }
}

/// `M:SS` formatting for a seconds count.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// `Q<n> M:SS` stamp used on shot attempts.
pub fn game_timestamp(quarter: u8, seconds: u32) -> String {
    format!("Q{} {}", quarter, format_clock(seconds))
}

/// Partial state edit - `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateUpdate {
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub time_remaining: Option<u32>,
    pub quarter: Option<u8>,
    pub home_team_fouls: Option<u8>,
    pub away_team_fouls: Option<u8>,
    pub possession: Option<Side>,
    pub timeouts: Option<Timeouts>,
}

impl GameState {
    pub fn merged(&self, update: &GameStateUpdate) -> Self {
        Self {
            home_score: update.home_score.unwrap_or(self.home_score),
            away_score: update.away_score.unwrap_or(self.away_score),
            time_remaining: update.time_remaining.unwrap_or(self.time_remaining),
            quarter: update.quarter.unwrap_or(self.quarter).max(1),
            home_team_fouls: update.home_team_fouls.unwrap_or(self.home_team_fouls),
            away_team_fouls: update.away_team_fouls.unwrap_or(self.away_team_fouls),
            possession: update.possession.unwrap_or(self.possession),
            timeouts: update.timeouts.unwrap_or(self.timeouts),
        }
    }
}

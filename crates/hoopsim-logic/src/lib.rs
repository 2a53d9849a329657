//! Pure basketball simulation logic for hoopsim.
//!
//! This crate contains all game logic that is independent of any timer,
//! front end, or runtime. Functions take plain data and an RNG and return
//! results, making them unit-testable and reproducible with a seeded RNG.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Outcome weights, possession timing, default values |
//! | [`error`] | Validation errors for teams and rules |
//! | [`team`] | Team profiles: ratings, shooting, pace, shot selection |
//! | [`rules`] | Game rules: shot clock, bonus threshold, period lengths |
//! | [`state`] | Game state and the clock / period state machine |
//! | [`resolver`] | Weighted-random possession resolution |
//! | [`stats`] | Running box-score totals and derived efficiency metrics |

pub mod constants;
pub mod error;
pub mod resolver;
pub mod rules;
pub mod state;
pub mod stats;
pub mod team;

pub use error::ValidationError;
pub use resolver::{
    apply_outcome, resolve_possession, Possession, PossessionResult, ShotAttempt, ShotLocation,
};
pub use rules::{GameRules, RulesUpdate};
pub use state::{ClockEvent, ClockTick, GamePhase, GameState, GameStateUpdate, Side, Timeouts};
pub use stats::{GameStats, TeamStats};
pub use team::{ShotSelectionBias, Team, TeamUpdate};

//! Game constants - outcome weights, possession timing, default values.
//!
//! Plain constants with no runtime dependency. The engine crate and the
//! headless harness both read these.

/// Possession outcome weights. Must sum to 1.0.
pub mod outcome_weights {
    pub const SHOT: f64 = 0.8;
    pub const TURNOVER: f64 = 0.12;
    pub const FOUL: f64 = 0.08;
}

pub mod timing {
    /// Shortest possession in seconds.
    pub const MIN_POSSESSION_SECS: u32 = 4;
    /// Dead-ball time run off the clock before each simulated possession.
    pub const DEAD_BALL_SECS: u32 = 4;
    /// Regulation periods before overtime.
    pub const REGULATION_QUARTERS: u8 = 4;
    /// Reference game length for pace.
    pub const PACE_REFERENCE_MINUTES: f64 = 48.0;
}

pub mod shooting {
    /// Shot probability lost per 100 points of defensive rating above 100.
    pub const DEFENSE_PENALTY_SCALE: f64 = 0.1;
    /// Floor for any adjusted field-goal percentage.
    pub const MIN_SHOT_PERCENTAGE: f64 = 0.1;
    /// Free throws awarded on a foul in the bonus.
    pub const BONUS_FREE_THROWS: usize = 2;
    /// FTA weight in the true-shooting denominator.
    pub const TS_FREE_THROW_WEIGHT: f64 = 0.44;
}

pub mod defaults {
    pub const TIMEOUTS_PER_TEAM: u8 = 7;
    pub const SHOT_CLOCK_SECS: u32 = 24;
    pub const THREE_POINT_DISTANCE_FT: f64 = 23.75;
    pub const BONUS_THRESHOLD: u8 = 5;
    pub const QUARTER_MINUTES: u32 = 12;
    pub const OVERTIME_MINUTES: u32 = 5;
    /// Longest accepted quarter or overtime period, in minutes.
    pub const MAX_PERIOD_MINUTES: u32 = 60;
}

pub mod speed {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: u8 = 3;
    /// Tick interval at speed 1, in milliseconds.
    pub const BASE_INTERVAL_MS: u64 = 1000;
}

pub mod pace {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
}

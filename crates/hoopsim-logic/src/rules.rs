//! Game rules - configuration, not runtime state.

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, timing};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    /// Shot clock in seconds; also the longest possible possession.
    pub shot_clock_duration: u32,
    /// Three-point line distance in feet. Informational only.
    pub three_point_distance: f64,
    /// Team fouls in a period before the opponent shoots free throws.
    pub bonus_threshold: u8,
    /// Regulation period length in minutes.
    pub quarter_length: u32,
    /// Overtime period length in minutes.
    pub overtime_length: u32,
}

impl GameRules {
    pub fn quarter_seconds(&self) -> u32 {
        self.quarter_length.saturating_mul(60)
    }

    pub fn overtime_seconds(&self) -> u32 {
        self.overtime_length.saturating_mul(60)
    }

    /// Clock length of the given period (1-based; 5+ is overtime).
    pub fn period_seconds(&self, quarter: u8) -> u32 {
        if quarter > timing::REGULATION_QUARTERS {
            self.overtime_seconds()
        } else {
            self.quarter_seconds()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quarter_length == 0 {
            return Err(ValidationError::NonPositiveRule {
                field: "quarter_length",
            });
        }
        if self.overtime_length == 0 {
            return Err(ValidationError::NonPositiveRule {
                field: "overtime_length",
            });
        }
        for (field, value) in [
            ("quarter_length", self.quarter_length),
            ("overtime_length", self.overtime_length),
        ] {
            if value > defaults::MAX_PERIOD_MINUTES {
                return Err(ValidationError::RuleTooLarge {
                    field,
                    value,
                    max: defaults::MAX_PERIOD_MINUTES,
                });
            }
        }
        if self.bonus_threshold == 0 {
            return Err(ValidationError::NonPositiveRule {
                field: "bonus_threshold",
            });
        }
        if self.three_point_distance <= 0.0 {
            return Err(ValidationError::NonPositiveRule {
                field: "three_point_distance",
            });
        }
        if self.shot_clock_duration < timing::MIN_POSSESSION_SECS {
            return Err(ValidationError::ShotClockTooShort {
                shot_clock: self.shot_clock_duration,
                min: timing::MIN_POSSESSION_SECS,
            });
        }
        Ok(())
    }

    pub fn merged(&self, update: &RulesUpdate) -> Self {
        Self {
            shot_clock_duration: update
                .shot_clock_duration
                .unwrap_or(self.shot_clock_duration),
            three_point_distance: update
                .three_point_distance
                .unwrap_or(self.three_point_distance),
            bonus_threshold: update.bonus_threshold.unwrap_or(self.bonus_threshold),
            quarter_length: update.quarter_length.unwrap_or(self.quarter_length),
            overtime_length: update.overtime_length.unwrap_or(self.overtime_length),
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            shot_clock_duration: defaults::SHOT_CLOCK_SECS,
            three_point_distance: defaults::THREE_POINT_DISTANCE_FT,
            bonus_threshold: defaults::BONUS_THRESHOLD,
            quarter_length: defaults::QUARTER_MINUTES,
            overtime_length: defaults::OVERTIME_MINUTES,
        }
    }
}

/// Partial rules edit - `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesUpdate {
    pub shot_clock_duration: Option<u32>,
    pub three_point_distance: Option<f64>,
    pub bonus_threshold: Option<u8>,
    pub quarter_length: Option<u32>,
    pub overtime_length: Option<u32>,
}

//! Validation errors for user-editable teams and rules.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{team}: {field} must be within [0, 1], got {value}")]
    PercentageOutOfRange {
        team: String,
        field: &'static str,
        value: f64,
    },

    #[error("{team}: pace preference must be within 1-10, got {value}")]
    PaceOutOfRange { team: String, value: u8 },

    #[error("{team}: shot selection bias must sum to 1.0, got {sum:.3}")]
    BiasNotNormalized { team: String, sum: f64 },

    #[error("{team}: shot selection weight {field} is negative")]
    NegativeBias { team: String, field: &'static str },

    #[error("rules: {field} must be positive")]
    NonPositiveRule { field: &'static str },

    #[error("rules: {field} must be at most {max}, got {value}")]
    RuleTooLarge {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("rules: shot clock {shot_clock}s is shorter than the {min}s minimum possession")]
    ShotClockTooShort { shot_clock: u32, min: u32 },
}

//! Errors for disallowed simulator actions and scenario loading.

use hoopsim_logic::{Side, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("no scenario is active")]
    NoActiveScenario,

    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("scenario '{0}' already exists")]
    DuplicateScenario(String),

    #[error("simulation is running; pause it first")]
    Running,

    #[error("game is over")]
    GameOver,

    #[error("speed must be within {min}-{max}, got {got}")]
    InvalidSpeed { got: u8, min: u8, max: u8 },

    #[error("no results to save")]
    NoResults,

    #[error("no saved result at index {index} ({len} saved)")]
    SavedIndexOutOfRange { index: usize, len: usize },

    #[error("{} team has no timeouts left", .0.label())]
    NoTimeoutsLeft(Side),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to read scenario catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario catalog: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

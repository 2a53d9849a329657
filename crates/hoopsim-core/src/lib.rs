//! Hoopsim Core - Basketball Possession Simulator
//!
//! Drives the pure possession logic in `hoopsim_logic` through a
//! timer-driven simulator with scenario presets, a results store and a
//! parallel batch runner.
//!
//! # Architecture
//!
//! - **Scenarios**: preset matchups plus an optional JSON catalog
//! - **Engine**: simulator state, controls, and the tick loop
//! - **Results**: current run, saved snapshots, comparison
//! - **Batch**: many seeded games of one scenario, in parallel
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use hoopsim_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new();
//! engine.select_scenario("late-game").unwrap();
//! engine.play().unwrap();
//!
//! while engine.is_simulating() {
//!     let interval = engine.tick_interval();
//!     std::thread::sleep(interval);
//!     engine.update(interval);
//! }
//! ```

pub mod batch;
pub mod engine;
pub mod error;
pub mod results;
pub mod scenarios;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::batch::{run_batch, BatchSummary};
    pub use crate::engine::{SimulationEngine, TickOutcome};
    pub use crate::error::SimError;
    pub use crate::results::{ResultsStore, SimulationResults};
    pub use crate::scenarios::{Scenario, ScenarioStore};
    pub use hoopsim_logic::{GameRules, GameState, Side, Team};
}

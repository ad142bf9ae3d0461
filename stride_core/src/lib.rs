#![forbid(unsafe_code)]

//! Core domain model and business logic for the Stride sprint training system.
//!
//! This crate provides:
//! - Domain types (check-ins, workout plans, distances, drills, results)
//! - Readiness scoring and break-day decisions
//! - CNS load aggregation for workout templates
//! - Sprint prescription rules (volume, barefoot gating)
//! - The guided session state machine
//! - Personal-best detection
//! - Persistence (WAL, CSV, athlete state)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod readiness;
pub mod cns_load;
pub mod prescription;
pub mod pb;
pub mod session;
pub mod recorder;
pub mod state;
pub mod history;
pub mod csv_rollup;
pub mod stopwatch;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use readiness::score_readiness;
pub use cns_load::{exercise_load, block_load, workout_load, fascia_bias, tier_of, LoadTier, Severity};
pub use prescription::{barefoot_allowed, break_day, sprint_reps};
pub use pb::{detect_new_bests, sanitize_time};
pub use session::{CompletionSummary, SaveOutcome, SessionEvent, SessionFlow, Step};
pub use recorder::{read_results, JsonlRecorder, SessionRecorder};
pub use history::load_recent_results;
pub use stopwatch::Stopwatch;

#![forbid(unsafe_code)]

//! Core domain model and progression logic for the gymlog workout tracker.
//!
//! This crate provides:
//! - Domain types (exercises, program rows, workouts, sets)
//! - History summarizer, double-progression engine and PR detection
//! - The `WorkoutStore` persistence gateway (in-memory and file-backed)
//! - The default 12-week program
//! - Session orchestration and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod history;
pub mod progression;
pub mod records;
pub mod program;
pub mod store;
pub mod wal;
pub mod state;
pub mod file_store;
pub mod session;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, ProgressionConfig};
pub use history::summarize;
pub use progression::{suggest, Suggestion, SuggestionReason};
pub use records::is_pr;
pub use program::{build_default_program, get_default_program, Program};
pub use store::{MemoryStore, WorkoutStore};
pub use file_store::FileStore;
pub use session::{DayPlanItem, SaveReport, Tracker};
pub use export::export_sets_csv;

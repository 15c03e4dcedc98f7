//! Error taxonomy and run statistics.
//!
//! This module provides:
//! - The geocoding error taxonomy and its retriability policy
//! - Ambient initialization and database error types
//! - Per-outcome counters for bulk resolution runs

mod stats;
mod types;

// Re-export public API
pub use stats::{print_outcome_statistics, OutcomeStats};
pub use types::{DatabaseError, GeocodeError, InitializationError, Outcome};

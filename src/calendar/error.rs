//! Error types for the event store.

use chrono::NaiveDate;
use thiserror::Error;

use super::event::Event;

/// Errors raised by store operations.
///
/// `Conflict` is the only expected failure in normal use; callers branch on
/// it to keep the form open for correction. The other variants surface
/// backing-medium trouble and are reported, not retried.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("conflicts with \"{name}\" on {date} ({start}-{end})")]
    Conflict {
        name: String,
        date: NaiveDate,
        /// `HH:MM`, pre-formatted for display.
        start: String,
        end: String,
    },

    #[error("stored events are not readable JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Build a `Conflict` naming the already-stored event.
    pub fn conflict_with(existing: &Event) -> Self {
        StoreError::Conflict {
            name: existing.name.clone(),
            date: existing.date,
            start: existing.start_time.format("%H:%M").to_string(),
            end: existing.end_time.format("%H:%M").to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

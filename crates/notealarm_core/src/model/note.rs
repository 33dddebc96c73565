//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record persisted by storage.
//! - Provide the immutable snapshot view consumed by the alert scheduler.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `title` is trimmed and holds between 3 and 50 characters.
//! - `deadline`, `created_at` and `updated_at` are Unix epoch milliseconds.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier for every note.
pub type NoteId = Uuid;

/// Minimum accepted title length, in characters.
pub const TITLE_MIN_CHARS: usize = 3;
/// Maximum accepted title length, in characters.
pub const TITLE_MAX_CHARS: usize = 50;

/// Validation failures for note fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteValidationError {
    #[error("note title cannot be empty")]
    EmptyTitle,
    #[error("note title must be {min}..={max} characters, got {actual}")]
    TitleLength {
        min: usize,
        max: usize,
        actual: usize,
    },
}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Unique, user-facing title. Also used in alert messages.
    pub title: String,
    pub description: String,
    /// Point in time the note is due, epoch milliseconds.
    pub deadline: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    /// Creates a note with a generated stable ID.
    ///
    /// `created_at` and `updated_at` both start at `now_ms`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: i64,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            deadline,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Validates fields that storage relies on.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_title(&self.title)
    }

    /// Returns the tick-local view used by deadline alerting.
    pub fn snapshot(&self) -> NoteSnapshot {
        NoteSnapshot {
            id: self.id,
            title: self.title.clone(),
            deadline: self.deadline,
        }
    }
}

/// Immutable view of one note, pulled once per alert tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSnapshot {
    pub id: NoteId,
    pub title: String,
    /// Epoch milliseconds.
    pub deadline: i64,
}

/// Checks a title against the accepted length window.
///
/// The caller is expected to pass an already trimmed value.
pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    let actual = title.chars().count();
    if actual == 0 {
        return Err(NoteValidationError::EmptyTitle);
    }
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&actual) {
        return Err(NoteValidationError::TitleLength {
            min: TITLE_MIN_CHARS,
            max: TITLE_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_title, Note, NoteValidationError};

    #[test]
    fn title_length_window_is_inclusive() {
        assert!(validate_title("abc").is_ok());
        assert!(validate_title(&"x".repeat(50)).is_ok());
        assert_eq!(
            validate_title("ab"),
            Err(NoteValidationError::TitleLength {
                min: 3,
                max: 50,
                actual: 2
            })
        );
        assert!(validate_title(&"x".repeat(51)).is_err());
    }

    #[test]
    fn empty_title_is_reported_separately() {
        assert_eq!(validate_title(""), Err(NoteValidationError::EmptyTitle));
    }

    #[test]
    fn snapshot_copies_identity_title_and_deadline() {
        let note = Note::new("Pay rent", "before the 5th", 42_000, 1_000);
        let snapshot = note.snapshot();
        assert_eq!(snapshot.id, note.id);
        assert_eq!(snapshot.title, "Pay rent");
        assert_eq!(snapshot.deadline, 42_000);
    }
}

//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/update/delete/get/list/search entry points.
//! - Normalize and validate user input before it reaches storage.
//!
//! # Invariants
//! - Titles are trimmed, 3..=50 chars, and unique across notes.
//! - `update_note` only touches fields present in the request.
//! - The service never touches alert dedup state; an updated deadline does
//!   not re-arm a note that already alerted.

use crate::clock::{Clock, SystemClock};
use crate::model::note::{validate_title, Note, NoteId, NoteValidationError};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use log::info;
use std::sync::Arc;
use thiserror::Error;

/// Service error for note use-cases.
#[derive(Debug, Error)]
pub enum NoteServiceError {
    #[error(transparent)]
    Validation(#[from] NoteValidationError),
    #[error("duplicate title `{0}`, please choose a different title")]
    DuplicateTitle(String),
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),
    #[error("search query cannot be empty")]
    EmptyQuery,
    #[error(transparent)]
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    #[error("inconsistent note state: {0}")]
    InconsistentState(&'static str),
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::DuplicateTitle(title) => Self::DuplicateTitle(title),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Request model for creating a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub description: String,
    /// Epoch milliseconds.
    pub deadline: i64,
}

/// Partial update request. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<i64>,
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service stamping timestamps from the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Creates one note after title normalization and duplicate checks.
    pub fn create_note(&self, request: NewNote) -> Result<Note, NoteServiceError> {
        let title = normalize_title(&request.title)?;
        if self.repo.get_note_by_title(&title)?.is_some() {
            return Err(NoteServiceError::DuplicateTitle(title));
        }

        let note = Note::new(
            title,
            request.description.trim(),
            request.deadline,
            self.clock.now_ms(),
        );
        let id = self.repo.create_note(&note)?;
        info!(
            "event=note_create module=service status=ok note_id={} deadline_ms={}",
            id, note.deadline
        );

        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))
    }

    /// Applies a partial update to an existing note.
    pub fn update_note(
        &self,
        id: NoteId,
        update: NoteUpdate,
    ) -> Result<Note, NoteServiceError> {
        let mut note = self
            .repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;

        if let Some(title) = update.title {
            let title = normalize_title(&title)?;
            if let Some(existing) = self.repo.get_note_by_title(&title)? {
                if existing.id != id {
                    return Err(NoteServiceError::DuplicateTitle(title));
                }
            }
            note.title = title;
        }
        if let Some(description) = update.description {
            note.description = description.trim().to_string();
        }
        if let Some(deadline) = update.deadline {
            note.deadline = deadline;
        }
        note.updated_at = self.clock.now_ms();

        self.repo.update_note(&note)?;
        info!(
            "event=note_update module=service status=ok note_id={} deadline_ms={}",
            id, note.deadline
        );

        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "updated note not found in read-back",
            ))
    }

    pub fn delete_note(&self, id: NoteId) -> Result<(), NoteServiceError> {
        self.repo.delete_note(id)?;
        info!("event=note_delete module=service status=ok note_id={id}");
        Ok(())
    }

    pub fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.repo.get_note(id)
    }

    /// Lists every note, earliest deadline first.
    pub fn list_notes(&self) -> RepoResult<Vec<Note>> {
        self.repo.list_notes()
    }

    /// Searches title and description for a non-empty substring.
    pub fn search_notes(&self, query: &str) -> Result<Vec<Note>, NoteServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NoteServiceError::EmptyQuery);
        }
        Ok(self.repo.search_notes(query)?)
    }
}

fn normalize_title(title: &str) -> Result<String, NoteValidationError> {
    let trimmed = title.trim();
    validate_title(trimmed)?;
    Ok(trimmed.to_string())
}

//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and search APIs over the `notes` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Note::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Titles are unique; a violating write surfaces as `DuplicateTitle`.
//! - `list_notes` is sorted by `deadline ASC, uuid ASC`.

use crate::db::DbError;
use crate::model::note::{Note, NoteId, NoteSnapshot, NoteValidationError};
use rusqlite::{ffi, params, Connection, ErrorCode, Row};
use thiserror::Error;
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    deadline,
    created_at,
    updated_at
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] NoteValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("note not found: {0}")]
    NotFound(NoteId),
    #[error("note title already exists: `{0}`")]
    DuplicateTitle(String),
    #[error("invalid persisted note data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for note CRUD operations.
pub trait NoteRepository {
    /// Inserts one note and returns its stable id.
    fn create_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces title, description, deadline and `updated_at` of one note.
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    /// Removes one note permanently.
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Exact, case-sensitive title lookup.
    fn get_note_by_title(&self, title: &str) -> RepoResult<Option<Note>>;
    /// Returns every stored note.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    /// Case-insensitive substring match on title or description.
    fn search_notes(&self, query: &str) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        self.conn
            .execute(
                "INSERT INTO notes (
                    uuid,
                    title,
                    description,
                    deadline,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    note.id.to_string(),
                    note.title.as_str(),
                    note.description.as_str(),
                    note.deadline,
                    note.created_at,
                    note.updated_at,
                ],
            )
            .map_err(|err| map_write_error(err, &note.title))?;

        Ok(note.id)
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE notes
                 SET
                    title = ?2,
                    description = ?3,
                    deadline = ?4,
                    updated_at = ?5
                 WHERE uuid = ?1;",
                params![
                    note.id.to_string(),
                    note.title.as_str(),
                    note.description.as_str(),
                    note.deadline,
                    note.updated_at,
                ],
            )
            .map_err(|err| map_write_error(err, &note.title))?;

        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }

        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.query_one(
            &format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"),
            id.to_string().as_str(),
        )
    }

    fn get_note_by_title(&self, title: &str) -> RepoResult<Option<Note>> {
        self.query_one(&format!("{NOTE_SELECT_SQL} WHERE title = ?1;"), title)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY deadline ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn search_notes(&self, query: &str) -> RepoResult<Vec<Note>> {
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE title LIKE ?1 ESCAPE '\\'
                OR description LIKE ?1 ESCAPE '\\'
             ORDER BY deadline ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([pattern.as_str()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

impl SqliteNoteRepository<'_> {
    /// Reads the alert-facing projection of every note, one result per row.
    ///
    /// Title rules are not enforced here; alerting only needs a parseable id
    /// and deadline. A row that cannot be read yields an `Err` entry without
    /// failing the rest.
    ///
    /// # Errors
    /// - The outer error means the query itself could not run.
    pub fn list_snapshots(&self) -> RepoResult<Vec<RepoResult<NoteSnapshot>>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, title, deadline FROM notes ORDER BY deadline ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next()? {
            snapshots.push(parse_snapshot_row(row));
        }
        Ok(snapshots)
    }

    fn query_one(&self, sql: &str, key: &str) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }
}

fn parse_snapshot_row(row: &Row<'_>) -> RepoResult<NoteSnapshot> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text)?;
    Ok(NoteSnapshot {
        id,
        title: row.get("title")?,
        deadline: row.get("deadline")?,
    })
}

fn parse_uuid(uuid_text: &str) -> RepoResult<NoteId> {
    Uuid::parse_str(uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in notes.uuid"))
    })
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text)?;

    let note = Note {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        deadline: row.get("deadline")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    note.validate().map_err(|err| {
        RepoError::InvalidData(format!("note {id} failed validation: {err}"))
    })?;
    Ok(note)
}

/// Maps only UNIQUE violations to `DuplicateTitle`; `title` is the sole
/// UNIQUE column. Other constraint failures stay transport errors.
fn map_write_error(err: rusqlite::Error, title: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateTitle(title.to_string())
        }
        _ => err.into(),
    }
}

/// Escapes LIKE wildcards so user queries match literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

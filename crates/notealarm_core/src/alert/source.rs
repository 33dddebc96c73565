//! Snapshot sources feeding the alert scheduler.

use crate::db::open_db;
use crate::model::note::NoteSnapshot;
use crate::repo::note_repo::{RepoError, SqliteNoteRepository};
use log::warn;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read notes: {0}")]
    Repo(#[from] RepoError),
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the full list of current notes on demand.
///
/// Called once per tick from a blocking-pool thread.
pub trait SnapshotSource: Send + Sync {
    fn fetch_all_notes(&self) -> Result<Vec<NoteSnapshot>, SnapshotError>;
}

/// Reads snapshots from a SQLite database file.
///
/// A fresh connection is opened per fetch, so the source can be shared
/// across threads and sees writes made by other processes.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotSource {
    db_path: PathBuf,
}

impl SqliteSnapshotSource {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

impl SnapshotSource for SqliteSnapshotSource {
    /// Unreadable rows are logged and skipped; the remaining notes still
    /// reach the scheduler.
    fn fetch_all_notes(&self) -> Result<Vec<NoteSnapshot>, SnapshotError> {
        let conn = open_db(&self.db_path).map_err(RepoError::from)?;
        let repo = SqliteNoteRepository::new(&conn);
        let rows = repo.list_snapshots()?;

        let mut snapshots = Vec::with_capacity(rows.len());
        for row in rows {
            match row {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => warn!(
                    "event=alert_snapshot module=alert status=error error_code=invalid_row error={err}"
                ),
            }
        }
        Ok(snapshots)
    }
}

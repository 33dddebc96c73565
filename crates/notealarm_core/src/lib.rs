//! Core domain logic for notealarm.
//! Notes with deadlines, their SQLite storage, and the background
//! subsystem that alerts each note at most once as its deadline nears.

pub mod alert;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use alert::{
    classify, AlertScheduler, AlertStateStore, AlertTier, DeliveryError, Notifier,
    SchedulerHandle, SchedulerOptions, SnapshotError, SnapshotSource, SqliteSnapshotSource,
    TickReport,
};
pub use clock::{Clock, SystemClock};
pub use config::{Config, ConfigError};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::note::{Note, NoteId, NoteSnapshot, NoteValidationError};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::note_service::{NewNote, NoteService, NoteServiceError, NoteUpdate};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

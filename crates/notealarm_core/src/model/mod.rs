//! Domain model for notes and their alert-facing projection.
//!
//! # Responsibility
//! - Define canonical data structures used by storage and alerting.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.

pub mod note;

//! Per-note "already alerted" flags shared by concurrent evaluations.
//!
//! # Invariants
//! - `check_and_mark_fired` returns `false` at most once per identity until
//!   an explicit `clear`/`clear_all`.
//! - The mutex guards only the map mutation; callers never hold it while
//!   classifying or delivering.
//! - One boolean per identity, no tier granularity: a note alerts at most
//!   once, ever.

use crate::model::note::NoteId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrency-safe dedup map, owned by whoever constructs it and shared
/// with schedulers through `Arc`.
#[derive(Debug, Default)]
pub struct AlertStateStore {
    fired: Mutex<HashMap<NoteId, bool>>,
}

impl AlertStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically tests and sets the fired flag for `note_id`.
    ///
    /// Returns `false` when the caller may alert (the flag was unset and is
    /// now set) and `true` when the alert must be suppressed.
    pub fn check_and_mark_fired(&self, note_id: NoteId) -> bool {
        let mut fired = self.lock();
        let flag = fired.entry(note_id).or_insert(false);
        if *flag {
            return true;
        }
        *flag = true;
        false
    }

    /// Returns whether `note_id` has already alerted.
    pub fn is_fired(&self, note_id: NoteId) -> bool {
        self.lock().get(&note_id).copied().unwrap_or(false)
    }

    /// Forgets the record for one note so it can alert again.
    ///
    /// Returns whether a record existed. Never called by the scheduler.
    pub fn clear(&self, note_id: NoteId) -> bool {
        self.lock().remove(&note_id).is_some()
    }

    pub fn clear_all(&self) {
        self.lock().clear();
    }

    /// Number of identities with a record.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic elsewhere cannot leave the map half-written: every critical
    // section is a single insert/remove, so a poisoned guard is still sound.
    fn lock(&self) -> MutexGuard<'_, HashMap<NoteId, bool>> {
        self.fired.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

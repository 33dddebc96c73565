//! Deadline urgency tiers and their classification.
//!
//! # Invariants
//! - `classify` is pure: same inputs, same tier, no shared state.
//! - Remaining time is compared in whole seconds; sub-second clock jitter
//!   never moves a note across a boundary.
//! - Boundaries are closed on the near side (`<=`), scanned most urgent
//!   first.

use serde::{Deserialize, Serialize};

const MINUTE_SECS: i64 = 60;
const HOUR_SECS: i64 = 60 * MINUTE_SECS;

pub const THIRTY_MINUTES_SECS: i64 = 30 * MINUTE_SECS;
pub const ONE_HOUR_SECS: i64 = HOUR_SECS;
pub const SIX_HOURS_SECS: i64 = 6 * HOUR_SECS;
pub const ONE_DAY_SECS: i64 = 24 * HOUR_SECS;

/// Urgency bucket derived from time remaining until a deadline.
///
/// Variants are declared most urgent first, so the derived ordering sorts
/// `Overdue` lowest and `None` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    Overdue,
    ThirtyMinutes,
    OneHour,
    SixHours,
    OneDay,
    None,
}

/// Upper bounds (inclusive, seconds) for the windowed tiers, most urgent
/// first. `Overdue` and `None` are handled outside the table.
const WINDOWS: &[(i64, AlertTier)] = &[
    (THIRTY_MINUTES_SECS, AlertTier::ThirtyMinutes),
    (ONE_HOUR_SECS, AlertTier::OneHour),
    (SIX_HOURS_SECS, AlertTier::SixHours),
    (ONE_DAY_SECS, AlertTier::OneDay),
];

impl AlertTier {
    /// Short label for CLI output and log lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::OneDay => "1d",
            Self::None => "none",
        }
    }

    /// Renders the user-facing alert text for a note title.
    ///
    /// Returns `None` for `AlertTier::None`, which never alerts.
    pub fn message(self, title: &str) -> Option<String> {
        let message = match self {
            Self::Overdue => format!("ALERT: Note '{title}' is overdue!"),
            Self::ThirtyMinutes => format!("ALERT: Note '{title}' has 30 minutes remaining."),
            Self::OneHour => format!("ALERT: Note '{title}' has 1 hour remaining."),
            Self::SixHours => format!("ALERT: Note '{title}' has 6 hours remaining."),
            Self::OneDay => format!("ALERT: Note '{title}' has 1 day remaining."),
            Self::None => return None,
        };
        Some(message)
    }
}

/// Classifies the time left until `deadline_ms` as seen at `now_ms`.
///
/// Both instants are epoch milliseconds and are truncated to whole seconds
/// before subtracting.
pub fn classify(deadline_ms: i64, now_ms: i64) -> AlertTier {
    let remaining = remaining_secs(deadline_ms, now_ms);
    if remaining <= 0 {
        return AlertTier::Overdue;
    }
    WINDOWS
        .iter()
        .find(|(upper, _)| remaining <= *upper)
        .map_or(AlertTier::None, |(_, tier)| *tier)
}

/// Whole seconds between `now_ms` and `deadline_ms`, negative once overdue.
pub fn remaining_secs(deadline_ms: i64, now_ms: i64) -> i64 {
    deadline_ms
        .div_euclid(1_000)
        .saturating_sub(now_ms.div_euclid(1_000))
}

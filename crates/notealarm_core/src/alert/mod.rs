//! Deadline alerting subsystem.
//!
//! # Responsibility
//! - Classify time remaining until a note's deadline into urgency tiers.
//! - Poll note snapshots periodically and fire at most one alert per note.
//!
//! # Invariants
//! - A note alerts at most once for the lifetime of its `AlertStateStore`,
//!   not once per tier crossed.
//! - Updating or re-snapshotting a note never clears its fired flag; only
//!   an explicit `AlertStateStore::clear` does.
//! - Delivery failures are logged and swallowed; there is no re-alert.
//!
//! # Layout
//! - `tier`: pure classification and message templates.
//! - `state`: dedup flags with atomic check-and-set.
//! - `notifier`: delivery sinks.
//! - `source`: snapshot collaborators.
//! - `scheduler`: tick loop, fan-out and shutdown.

pub mod notifier;
pub mod scheduler;
pub mod source;
pub mod state;
pub mod tier;

pub use notifier::{notifier_from_config, DeliveryError, DesktopNotifier, LogNotifier, Notifier};
pub use scheduler::{AlertScheduler, SchedulerHandle, SchedulerOptions, TickReport};
pub use source::{SnapshotError, SnapshotSource, SqliteSnapshotSource};
pub use state::AlertStateStore;
pub use tier::{classify, AlertTier};

//! Periodic deadline polling and concurrent alert dispatch.
//!
//! # Responsibility
//! - Drive `Idle -> FetchingSnapshot -> Dispatching -> Idle` on a fixed
//!   interval until cancelled.
//! - Fan out one blocking-pool task per note and join the batch before the
//!   next tick starts.
//!
//! # Invariants
//! - A failed snapshot fetch skips the tick; the next tick is the retry.
//! - The dedup flag is set before delivery, so a failed delivery is never
//!   retried (at-most-once).
//! - `now` is sampled once per dispatch and shared by every evaluation.
//! - No tick failure ends the loop; only cancellation does.

use crate::alert::notifier::Notifier;
use crate::alert::source::{SnapshotError, SnapshotSource};
use crate::alert::state::AlertStateStore;
use crate::alert::tier::{classify, AlertTier};
use crate::clock::{Clock, SystemClock};
use crate::config::AlertsConfig;
use crate::model::note::NoteSnapshot;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Timing knobs for the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Delay between tick starts.
    pub tick_interval: Duration,
    /// Upper bound on one tick's evaluation batch.
    pub dispatch_timeout: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }
}

impl From<&AlertsConfig> for SchedulerOptions {
    fn from(config: &AlertsConfig) -> Self {
        Self {
            tick_interval: Duration::from_secs(config.tick_interval_secs),
            dispatch_timeout: Duration::from_secs(config.dispatch_timeout_secs),
        }
    }
}

/// Result of evaluating one note within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    OutsideWindow,
    Suppressed,
    Delivered,
    DeliveryFailed,
}

/// Per-tick counters, mainly for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub notes_seen: usize,
    /// Notes whose tier was `None`.
    pub outside_window: usize,
    /// Notes in a window that had already alerted.
    pub suppressed: usize,
    /// Notes that claimed the dedup flag and were handed to the notifier.
    pub alerts_fired: usize,
    /// Subset of `alerts_fired` whose delivery reported an error.
    pub delivery_failures: usize,
    /// Evaluation tasks that panicked or were cancelled.
    pub task_failures: usize,
    /// Evaluation tasks still running when the dispatch timeout hit.
    pub unfinished: usize,
}

impl TickReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::OutsideWindow => self.outside_window += 1,
            Outcome::Suppressed => self.suppressed += 1,
            Outcome::Delivered => self.alerts_fired += 1,
            Outcome::DeliveryFailed => {
                self.alerts_fired += 1;
                self.delivery_failures += 1;
            }
        }
    }
}

/// Watches note deadlines and fires at-most-once alerts.
pub struct AlertScheduler {
    source: Arc<dyn SnapshotSource>,
    notifier: Arc<dyn Notifier>,
    state: Arc<AlertStateStore>,
    clock: Arc<dyn Clock>,
    options: SchedulerOptions,
}

impl AlertScheduler {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        notifier: Arc<dyn Notifier>,
        state: Arc<AlertStateStore>,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            source,
            notifier,
            state,
            clock: Arc::new(SystemClock),
            options,
        }
    }

    /// Replaces the system clock, e.g. with a fixed clock in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Shared dedup state, for callers that need an explicit reset.
    pub fn state(&self) -> &Arc<AlertStateStore> {
        &self.state
    }

    pub fn options(&self) -> SchedulerOptions {
        self.options
    }

    /// Runs the scheduler on the current runtime until the returned handle
    /// is shut down.
    pub fn spawn(self) -> SchedulerHandle {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let task = tokio::spawn(async move { self.run_until_cancelled(token).await });
        SchedulerHandle { shutdown, task }
    }

    /// Tick loop. The first tick fires immediately.
    pub async fn run_until_cancelled(&self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.options.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "event=alert_scheduler module=alert status=start tick_interval_secs={} dispatch_timeout_secs={}",
            self.options.tick_interval.as_secs(),
            self.options.dispatch_timeout.as_secs()
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let started_at = Instant::now();
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                result = self.tick() => match result {
                    Ok(report) => info!(
                        "event=alert_tick module=alert status=ok duration_ms={} notes={} fired={} suppressed={} outside_window={} delivery_failures={} task_failures={} unfinished={}",
                        started_at.elapsed().as_millis(),
                        report.notes_seen,
                        report.alerts_fired,
                        report.suppressed,
                        report.outside_window,
                        report.delivery_failures,
                        report.task_failures,
                        report.unfinished
                    ),
                    Err(err) => warn!(
                        "event=alert_tick module=alert status=error duration_ms={} error_code=snapshot_fetch_failed error={}",
                        started_at.elapsed().as_millis(),
                        err
                    ),
                },
            }
        }

        info!("event=alert_scheduler module=alert status=stop");
    }

    /// Fetches a fresh snapshot and dispatches it.
    ///
    /// # Errors
    /// - Returns the fetch error without dispatching anything.
    pub async fn tick(&self) -> Result<TickReport, SnapshotError> {
        let source = Arc::clone(&self.source);
        let snapshot = tokio::task::spawn_blocking(move || source.fetch_all_notes())
            .await
            .map_err(|err| SnapshotError::Unavailable(format!("snapshot task failed: {err}")))??;
        Ok(self.dispatch(snapshot).await)
    }

    /// Evaluates an already fetched snapshot concurrently, one task per
    /// note, and waits for the batch or the dispatch timeout.
    pub async fn dispatch(&self, snapshot: Vec<NoteSnapshot>) -> TickReport {
        let now_ms = self.clock.now_ms();
        let mut report = TickReport {
            notes_seen: snapshot.len(),
            ..TickReport::default()
        };

        let mut batch = JoinSet::new();
        for note in snapshot {
            let state = Arc::clone(&self.state);
            let notifier = Arc::clone(&self.notifier);
            batch.spawn_blocking(move || evaluate_note(&note, now_ms, &state, notifier.as_ref()));
        }

        let joined = tokio::time::timeout(self.options.dispatch_timeout, async {
            while let Some(result) = batch.join_next().await {
                match result {
                    Ok(outcome) => report.record(outcome),
                    Err(err) => {
                        report.task_failures += 1;
                        error!(
                            "event=alert_evaluate module=alert status=error error_code=task_failed error={err}"
                        );
                    }
                }
            }
        })
        .await;

        if joined.is_err() {
            report.unfinished = batch.len();
            warn!(
                "event=alert_dispatch module=alert status=timeout unfinished={} timeout_secs={}",
                report.unfinished,
                self.options.dispatch_timeout.as_secs()
            );
            // Blocking tasks cannot be aborted; let them finish on their own.
            batch.detach_all();
        }

        report
    }
}

/// Owns a spawned scheduler loop.
pub struct SchedulerHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the loop and waits for it to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(err) = self.task.await {
            error!("event=alert_scheduler module=alert status=error error_code=join_failed error={err}");
        }
    }
}

fn evaluate_note(
    note: &NoteSnapshot,
    now_ms: i64,
    state: &AlertStateStore,
    notifier: &dyn Notifier,
) -> Outcome {
    let tier = classify(note.deadline, now_ms);
    let Some(message) = tier.message(&note.title) else {
        return Outcome::OutsideWindow;
    };

    if state.check_and_mark_fired(note.id) {
        debug!(
            "event=alert_evaluate module=alert status=suppressed note_id={} tier={}",
            note.id,
            tier.label()
        );
        return Outcome::Suppressed;
    }

    deliver(note, tier, &message, notifier)
}

fn deliver(note: &NoteSnapshot, tier: AlertTier, message: &str, notifier: &dyn Notifier) -> Outcome {
    match notifier.deliver(message) {
        Ok(()) => {
            info!(
                "event=alert_fire module=alert status=ok note_id={} tier={}",
                note.id,
                tier.label()
            );
            Outcome::Delivered
        }
        Err(err) => {
            warn!(
                "event=alert_fire module=alert status=error note_id={} tier={} error_code=delivery_failed error={}",
                note.id,
                tier.label(),
                err
            );
            Outcome::DeliveryFailed
        }
    }
}

//! Alert delivery sinks.
//!
//! # Invariants
//! - Delivery is fire-and-forget from the scheduler's point of view: errors
//!   are reported to the caller for logging, never retried.
//! - Notifiers hold no per-note state.

use crate::config::{NotifierConfig, NotifierKind};
use log::warn;
use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use thiserror::Error;

/// Summary line shown above every desktop alert body.
const DESKTOP_SUMMARY: &str = "Notification";
const NOTIFY_SEND_PROGRAM: &str = "notify-send";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with {status}")]
    Exit { program: String, status: ExitStatus },
    #[error("notification sink rejected message: {0}")]
    Rejected(String),
}

/// Delivers one human-readable alert message to an external sink.
pub trait Notifier: Send + Sync {
    fn deliver(&self, message: &str) -> Result<(), DeliveryError>;
}

/// Desktop notifications through the freedesktop `notify-send` tool.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
    program: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            program: NOTIFY_SEND_PROGRAM.to_string(),
        }
    }

    /// Overrides the executable, e.g. a wrapper script on non-freedesktop
    /// hosts. It receives the same arguments as `notify-send`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Notifier for DesktopNotifier {
    fn deliver(&self, message: &str) -> Result<(), DeliveryError> {
        let status = Command::new(&self.program)
            .args([
                "--urgency",
                "normal",
                "--app-name",
                self.app_name.as_str(),
                DESKTOP_SUMMARY,
                message,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| DeliveryError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(DeliveryError::Exit {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// Writes alerts to the process log. Useful on headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, message: &str) -> Result<(), DeliveryError> {
        warn!("event=alert_delivered module=alert sink=log message=\"{message}\"");
        Ok(())
    }
}

/// Builds the notifier selected by configuration.
pub fn notifier_from_config(config: &NotifierConfig) -> Arc<dyn Notifier> {
    match config.kind {
        NotifierKind::Desktop => Arc::new(DesktopNotifier::new(config.app_name.clone())),
        NotifierKind::Log => Arc::new(LogNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::{DeliveryError, DesktopNotifier, LogNotifier, Notifier};

    #[test]
    fn log_notifier_always_succeeds() {
        assert!(LogNotifier.deliver("ALERT: Note 'x' is overdue!").is_ok());
    }

    #[test]
    fn missing_desktop_program_reports_launch_error() {
        let notifier =
            DesktopNotifier::new("notealarm").with_program("notealarm-definitely-missing-binary");
        let err = notifier
            .deliver("ALERT: Note 'x' is overdue!")
            .expect_err("missing program must fail");
        assert!(matches!(err, DeliveryError::Launch { .. }));
    }
}

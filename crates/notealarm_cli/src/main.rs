//! Command-line front end for notealarm.
//!
//! # Responsibility
//! - Map note CRUD/search commands onto `notealarm_core::NoteService`.
//! - Run the deadline alert scheduler (`watch`) until Ctrl-C.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use log::info;
use notealarm_core::alert::notifier_from_config;
use notealarm_core::config::{self, Config};
use notealarm_core::db::open_db;
use notealarm_core::{
    classify, init_logging, init_stderr_logging, AlertScheduler, AlertStateStore, NewNote, Note,
    NoteId, NoteService, NoteUpdate, SchedulerOptions, SqliteNoteRepository,
    SqliteSnapshotSource, SystemClock,
};
use notealarm_core::Clock;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "notealarm", version, about = "Notes with deadline alerts")]
struct Args {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, short = 'c', value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a note.
    Add {
        #[arg(long)]
        title: String,
        /// RFC 3339 timestamp, or `YYYY-MM-DD HH:MM` in local time.
        #[arg(long)]
        deadline: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change fields of an existing note.
    Update {
        id: NoteId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: NoteId,
    },
    Get {
        id: NoteId,
    },
    /// List every note, earliest deadline first.
    List,
    /// Match a substring in titles and descriptions.
    Search {
        query: String,
    },
    /// Poll deadlines and deliver alerts until interrupted.
    Watch,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };
    init_cli_logging(&config)?;

    if let Command::Watch = args.command {
        return watch(&config);
    }
    run_note_command(&config, args.command)
}

fn init_cli_logging(config: &Config) -> Result<()> {
    let result = match config.logging.dir.as_ref() {
        Some(dir) => {
            let dir = dir.to_str().context("logging.dir must be valid UTF-8")?;
            init_logging(&config.logging.level, dir)
        }
        None => init_stderr_logging(&config.logging.level),
    };
    result.map_err(anyhow::Error::msg)
}

fn run_note_command(config: &Config, command: Command) -> Result<()> {
    let conn = open_db(&config.storage.db_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.storage.db_path.display()
        )
    })?;
    let service = NoteService::new(SqliteNoteRepository::new(&conn));
    let now_ms = SystemClock.now_ms();

    match command {
        Command::Add {
            title,
            deadline,
            description,
        } => {
            let note = service.create_note(NewNote {
                title,
                description,
                deadline: parse_deadline(&deadline)?,
            })?;
            println!("created {}", render(&note, now_ms));
        }
        Command::Update {
            id,
            title,
            deadline,
            description,
        } => {
            let deadline = deadline.as_deref().map(parse_deadline).transpose()?;
            let note = service.update_note(
                id,
                NoteUpdate {
                    title,
                    description,
                    deadline,
                },
            )?;
            println!("updated {}", render(&note, now_ms));
        }
        Command::Delete { id } => {
            service.delete_note(id)?;
            println!("deleted {id}");
        }
        Command::Get { id } => match service.get_note(id)? {
            Some(note) => {
                println!("{}", render(&note, now_ms));
                if !note.description.is_empty() {
                    println!("  {}", note.description);
                }
            }
            None => bail!("note not found: {id}"),
        },
        Command::List => print_notes(&service.list_notes()?, now_ms),
        Command::Search { query } => print_notes(&service.search_notes(&query)?, now_ms),
        Command::Watch => return watch(config),
    }

    Ok(())
}

fn watch(config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        let scheduler = AlertScheduler::new(
            Arc::new(SqliteSnapshotSource::new(config.storage.db_path.clone())),
            notifier_from_config(&config.notifier),
            Arc::new(AlertStateStore::new()),
            SchedulerOptions::from(&config.alerts),
        );
        let handle = scheduler.spawn();
        println!(
            "watching `{}` every {}s, press Ctrl-C to stop",
            config.storage.db_path.display(),
            config.alerts.tick_interval_secs
        );

        let signal = tokio::signal::ctrl_c().await;
        info!("event=watch_stop module=cli status=ok reason=interrupt");
        handle.shutdown().await;
        signal.context("failed to listen for Ctrl-C")
    })
}

fn print_notes(notes: &[Note], now_ms: i64) {
    if notes.is_empty() {
        println!("no notes");
        return;
    }
    for note in notes {
        println!("{}", render(note, now_ms));
    }
}

fn render(note: &Note, now_ms: i64) -> String {
    format!(
        "{}  {}  due={}  tier={}",
        note.id,
        note.title,
        format_deadline(note.deadline),
        classify(note.deadline, now_ms).label()
    )
}

fn parse_deadline(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.timestamp_millis());
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .with_context(|| {
            format!("invalid deadline `{raw}`; expected RFC 3339 or `YYYY-MM-DD HH:MM`")
        })?;
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => Ok(local.timestamp_millis()),
        None => bail!("deadline `{raw}` does not exist in the local time zone"),
    }
}

fn format_deadline(deadline_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(deadline_ms)
        .map(|utc| utc.with_timezone(&Local).to_rfc3339())
        .unwrap_or_else(|| deadline_ms.to_string())
}

#[cfg(test)]
mod tests {
    use super::parse_deadline;

    #[test]
    fn parse_deadline_accepts_rfc3339_with_offset() {
        let parsed = parse_deadline("2024-01-01T10:00:00+05:30").unwrap();
        assert_eq!(parsed, 1_704_083_400_000);
    }

    #[test]
    fn parse_deadline_accepts_local_minutes_form() {
        assert!(parse_deadline("2024-01-01 10:00").is_ok());
    }

    #[test]
    fn parse_deadline_rejects_garbage() {
        let err = parse_deadline("next tuesday").unwrap_err();
        assert!(err.to_string().contains("invalid deadline"));
    }
}

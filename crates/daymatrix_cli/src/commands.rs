//! Command definitions and their execution against a matrix store.
//!
//! # Responsibility
//! - Declare the `daymatrix` argument surface.
//! - Translate each subcommand into store calls and a printable report.
//!
//! # Invariants
//! - Validation errors surface as `Err` messages; the store is untouched.
//! - Auto-copy outcomes and degraded saves are reported, never fatal.

use clap::{Parser, Subcommand};
use daymatrix_core::{
    export_file_name, Clock, DateKey, DayMatrix, FlushReport, MatrixStore, Quadrant,
    ValidationError,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "daymatrix")]
#[command(about = "Per-day four-quadrant task organizer")]
#[command(version)]
pub struct Cli {
    /// Directory holding the local cache and logs.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON file that receives every save in addition to the local cache.
    #[arg(long, global = true, value_name = "FILE")]
    pub json_file: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Day to operate on (YYYY-MM-DD); defaults to today.
    #[arg(long, global = true, value_parser = parse_date)]
    pub date: Option<DateKey>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the four quadrants of the day.
    Show,
    /// Append a task to a quadrant.
    Add {
        #[arg(value_parser = parse_quadrant)]
        quadrant: Quadrant,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Remove the first matching task from a quadrant.
    Delete {
        #[arg(value_parser = parse_quadrant)]
        quadrant: Quadrant,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Move a task between quadrants.
    Move {
        #[arg(value_parser = parse_quadrant)]
        from: Quadrant,
        #[arg(value_parser = parse_quadrant)]
        to: Quadrant,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Mark a task done and log it for this month.
    Complete {
        #[arg(value_parser = parse_quadrant)]
        quadrant: Quadrant,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Copy the whole day onto another day, replacing it.
    Copy {
        #[arg(long, value_parser = parse_date)]
        to: DateKey,
    },
    /// Fill an empty day from the most recent non-empty previous day.
    AutoCopy {
        /// Days to look back; defaults to the configured window.
        #[arg(long)]
        lookback: Option<u32>,
    },
    /// List tasks completed this month.
    Completed,
    /// Write the full document as JSON.
    Export {
        /// Output file; `-` prints to stdout. Defaults to a dated file name.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the full document with a previously exported file.
    Import { path: PathBuf },
}

fn parse_quadrant(value: &str) -> Result<Quadrant, ValidationError> {
    Quadrant::parse(value)
}

fn parse_date(value: &str) -> Result<DateKey, ValidationError> {
    DateKey::parse(value)
}

/// Per-invocation settings resolved before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// Day the command applies to.
    pub date: DateKey,
    /// Auto-copy window when `--lookback` is not given.
    pub lookback_days: u32,
}

/// Runs `command` and returns the text to print.
pub fn execute<C: Clock>(
    store: &mut MatrixStore<C>,
    context: RunContext,
    command: Command,
) -> Result<String, String> {
    let date = context.date;
    match command {
        Command::Show => Ok(render_day(date, &store.copy_snapshot(date))),
        Command::Add { quadrant, text } => {
            let report = store
                .add_task(date, quadrant, &text.join(" "))
                .map_err(|err| err.to_string())?;
            Ok(with_status(format!("Added to {quadrant} on {date}."), &report))
        }
        Command::Delete { quadrant, text } => {
            let report = store.delete_task(date, quadrant, &text.join(" "));
            if !report.is_flushed() {
                return Ok(format!("No matching task in {quadrant} on {date}."));
            }
            Ok(with_status(format!("Deleted from {quadrant} on {date}."), &report))
        }
        Command::Move { from, to, text } => {
            if from == to {
                return Ok(format!("Task is already in {to}."));
            }
            let report = store.move_task(date, from, to, &text.join(" "));
            Ok(with_status(format!("Moved to {to} on {date}."), &report))
        }
        Command::Complete { quadrant, text } => {
            let completion = store.complete_task(date, quadrant, &text.join(" "));
            let headline = if completion.removed {
                format!("Completed task from {quadrant} on {date}.")
            } else {
                format!("Logged completion; no matching task in {quadrant} on {date}.")
            };
            Ok(with_status(headline, &completion.flush))
        }
        Command::Copy { to } => {
            store.copy_to_clipboard(date);
            let report = store
                .paste_clipboard(to)
                .ok_or_else(|| "nothing copied".to_string())?;
            Ok(with_status(format!("Copied {date} onto {to}."), &report))
        }
        Command::AutoCopy { lookback } => {
            let lookback = lookback.unwrap_or(context.lookback_days);
            match store.auto_copy_from_recent(date, lookback) {
                Ok(report) => Ok(with_status(
                    format!("Tasks auto-copied from {} onto {date}.", report.source),
                    &report.flush,
                )),
                Err(outcome) => Ok(outcome.to_string()),
            }
        }
        Command::Completed => Ok(render_completed(store)),
        Command::Export { output } => {
            let body = store.export_document();
            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(store.today())));
            if path.as_os_str() == "-" {
                return Ok(body);
            }
            std::fs::write(&path, body)
                .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?;
            Ok(format!("Data exported to {}.", path.display()))
        }
        Command::Import { path } => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            let report = store
                .import_document(&raw)
                .map_err(|err| format!("Invalid JSON data: {err}"))?;
            Ok(with_status("Data imported.".to_string(), &report))
        }
    }
}

fn with_status(headline: String, report: &FlushReport) -> String {
    format!("{headline}\n{}", report.status_message())
}

fn render_day(date: DateKey, matrix: &DayMatrix) -> String {
    let mut out = format!("{date}\n");
    for quadrant in Quadrant::ALL {
        out.push_str(&format!("[{quadrant}]\n"));
        for task in matrix.tasks(quadrant) {
            out.push_str(&format!("  - {task}\n"));
        }
    }
    out
}

fn render_completed<C: Clock>(store: &MatrixStore<C>) -> String {
    let entries = store.completed_this_month();
    if entries.is_empty() {
        return "No tasks completed this month.".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let local = entry.completed_at.with_timezone(&store.now().timezone());
            format!("{}  {}", local.format("%b %-d, %Y"), entry.task)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

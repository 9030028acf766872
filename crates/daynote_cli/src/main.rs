//! daynote command-line entry point.
//!
//! # Responsibility
//! - Map commands onto core note and calendar services.
//! - Own configuration, logging bootstrap and text output.

mod config;
mod render;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use config::Config;
use daynote_core::db::open_db;
use daynote_core::{
    advance_month, describe_day, CalendarService, NoteId, NoteService, ReferenceDate,
    SqliteNoteRepository,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "daynote", version, about = "Month calendar with day-pinned notes")]
struct Cli {
    /// SQLite database file (overrides DAYNOTE_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a month grid with note markers.
    Show {
        /// Month to display as YYYY-MM; defaults to the current month.
        #[arg(long, value_parser = parse_month)]
        month: Option<ReferenceDate>,
        /// Months to move from the selected month, e.g. 1 or -1.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },
    /// Pin a note to a day.
    Add {
        #[arg(value_parser = parse_day)]
        date: NaiveDate,
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// List notes pinned to a day.
    List {
        #[arg(value_parser = parse_day)]
        date: NaiveDate,
    },
    /// Delete a note by id.
    Delete { id: i64 },
    /// Move a note to another day.
    Move {
        id: i64,
        #[arg(value_parser = parse_day)]
        date: NaiveDate,
    },
    /// Write all notes as JSON to a file or stdout.
    Export { file: Option<PathBuf> },
    /// Load notes from a JSON export, keeping their ids.
    Import { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env(cli.db.clone())?;

    match &config.log_dir {
        Some(log_dir) => {
            if let Err(err) = daynote_core::init_logging(&config.log_level, log_dir) {
                eprintln!("warning: logging disabled: {err}");
            }
        }
        None => eprintln!(
            "warning: logging disabled: no log directory; set {}",
            config::LOG_DIR_ENV_VAR
        ),
    }

    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let repo = SqliteNoteRepository::try_new(&mut conn)?;
    let mut service = NoteService::new(repo);

    match cli.command {
        Command::Show { month, offset } => {
            let selected = month.unwrap_or_else(ReferenceDate::today);
            let reference = advance_month(selected, offset)?;
            let view = CalendarService::new(service.repo()).month_view(reference)?;
            print!("{}", render::render_month(&view));
        }
        Command::Add { date, description } => {
            let note = service.add_note(date, &description.join(" "))?;
            println!("Added note #{} to {}.", note.id, describe_day(date));
        }
        Command::List { date } => {
            let notes = service.list_notes_for_day(date)?;
            if notes.is_empty() {
                println!("No notes on {}.", describe_day(date));
            }
            for note in &notes {
                println!("{}", render::note_line(note));
            }
        }
        Command::Delete { id } => {
            if service.delete_note(NoteId(id))? {
                println!("Deleted note #{id}.");
            } else {
                println!("No note #{id}; nothing deleted.");
            }
        }
        Command::Move { id, date } => {
            let note = service.relocate_note(NoteId(id), date)?;
            println!("Moved note #{} to {}.", note.id, describe_day(date));
        }
        Command::Export { file } => {
            let json = service.export_json()?;
            match file {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let count = service.import_json(&json)?;
            println!("Imported {count} note(s).");
        }
    }

    Ok(())
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got `{value}`: {err}"))
}

fn parse_month(value: &str) -> Result<ReferenceDate, String> {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map(ReferenceDate::from)
        .map_err(|err| format!("expected YYYY-MM, got `{value}`: {err}"))
}

//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the note store used by calendar views: add, list-by-day, delete.
//! - Own multi-step write paths (relocation, bulk import) with atomic semantics.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations and store the
//!   trimmed description.
//! - Day queries match on the stored `anchor_day` (`YYYY-MM-DD`) only.
//! - Listings are deterministic: `anchor_day ASC, id ASC`.
//! - Relocation is delete-then-reinsert under the same id in one transaction.
//! - Import inserts keyed notes before fresh ones, so generated ids never
//!   take an id the same batch asks for.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::note::{
    normalize_description, ImportedNote, Note, NoteDraft, NoteId, NoteValidationError,
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DAY_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    anchor_at,
    description
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Note content failed validation before write.
    Validation(NoteValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target note does not exist.
    NotFound(NoteId),
    /// A note with this id already exists.
    Conflict(NoteId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid note.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Conflict(id) => write!(f, "note id already in use: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Note store contract consumed by calendar services.
pub trait NoteRepository {
    /// Persists a draft and returns it with its generated id.
    fn add_note(&self, draft: &NoteDraft) -> RepoResult<Note>;
    /// Persists a note under its caller-provided id.
    fn insert_note(&self, note: &Note) -> RepoResult<()>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes anchored on `day`, ordered by id.
    fn list_notes_for_day(&self, day: NaiveDate) -> RepoResult<Vec<Note>>;
    /// Lists every note ordered by anchor day, then id.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    /// Deletes by id. Returns `false` when no such note existed.
    fn delete_note(&self, id: NoteId) -> RepoResult<bool>;
    /// Moves a note to another anchor date, keeping id and description.
    fn relocate_note(&mut self, id: NoteId, date: NaiveDateTime) -> RepoResult<Note>;
    /// Inserts all records in one transaction. Keyed records keep their
    /// ids, fresh ones get generated ids.
    fn import_notes(&mut self, notes: &[ImportedNote]) -> RepoResult<usize>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn add_note(&self, draft: &NoteDraft) -> RepoResult<Note> {
        insert_draft(self.conn, draft)
    }

    fn insert_note(&self, note: &Note) -> RepoResult<()> {
        insert_with_id(self.conn, note).map(|_| ())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        load_note(self.conn, id)
    }

    fn list_notes_for_day(&self, day: NaiveDate) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} WHERE anchor_day = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([format_day(day)])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} ORDER BY anchor_day ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.0])?;
        Ok(changed > 0)
    }

    fn relocate_note(&mut self, id: NoteId, date: NaiveDateTime) -> RepoResult<Note> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = load_note(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        let created_at: i64 =
            tx.query_row("SELECT created_at FROM notes WHERE id = ?1;", [id.0], |row| {
                row.get(0)
            })?;

        tx.execute("DELETE FROM notes WHERE id = ?1;", [id.0])?;
        let moved = insert_with_id(&tx, &Note { date, ..existing })?;
        tx.execute(
            "UPDATE notes SET created_at = ?2 WHERE id = ?1;",
            params![id.0, created_at],
        )?;

        tx.commit()?;
        Ok(moved)
    }

    fn import_notes(&mut self, notes: &[ImportedNote]) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for record in notes {
            if let ImportedNote::Keyed(note) = record {
                insert_with_id(&tx, note)?;
            }
        }
        for record in notes {
            if let ImportedNote::Fresh(draft) = record {
                insert_draft(&tx, draft)?;
            }
        }
        tx.commit()?;
        Ok(notes.len())
    }
}

fn insert_draft(conn: &Connection, draft: &NoteDraft) -> RepoResult<Note> {
    draft.validate()?;
    let description = normalize_description(&draft.description);

    conn.execute(
        "INSERT INTO notes (anchor_day, anchor_at, description) VALUES (?1, ?2, ?3);",
        params![
            format_day(draft.date.date()),
            format_date_time(draft.date),
            description.as_str(),
        ],
    )?;

    Ok(Note {
        id: NoteId(conn.last_insert_rowid()),
        date: draft.date,
        description,
    })
}

fn insert_with_id(conn: &Connection, note: &Note) -> RepoResult<Note> {
    note.validate()?;
    if note_exists(conn, note.id)? {
        return Err(RepoError::Conflict(note.id));
    }
    let description = normalize_description(&note.description);

    conn.execute(
        "INSERT INTO notes (id, anchor_day, anchor_at, description) VALUES (?1, ?2, ?3, ?4);",
        params![
            note.id.0,
            format_day(note.anchor_day()),
            format_date_time(note.date),
            description.as_str(),
        ],
    )?;
    Ok(Note {
        description,
        ..note.clone()
    })
}

fn load_note(conn: &Connection, id: NoteId) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.0])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_note_row(row)?)),
        None => Ok(None),
    }
}

fn note_exists(conn: &Connection, id: NoteId) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM notes WHERE id = ?1;", [id.0], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let anchor_at: String = row.get("anchor_at")?;
    let date = NaiveDateTime::parse_from_str(&anchor_at, DATE_TIME_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid anchor date `{anchor_at}` in notes.anchor_at"))
    })?;

    Ok(Note {
        id: NoteId(row.get("id")?),
        date,
        description: row.get("description")?,
    })
}

fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn format_date_time(value: NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

fn ensure_note_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }

    for column in ["id", "anchor_day", "anchor_at", "description", "created_at"] {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

//! Note use-case service.
//!
//! # Responsibility
//! - Provide note add/list/delete/relocate APIs keyed by calendar day.
//! - Export and import the flat JSON note document.
//! - Derive short single-line previews for grid cells.
//!
//! # Invariants
//! - Descriptions are trimmed before validation and persistence.
//! - Notes are always anchored at local midnight of their day.
//! - Import is all-or-nothing; existing ids are never overwritten.
//! - Log events carry ids and days only, never description text.

use crate::model::note::{
    normalize_description, ImportedNote, Note, NoteDraft, NoteId, NoteValidationError,
};
use crate::repo::note_repo::{NoteRepository, RepoError};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Description failed validation.
    InvalidDescription(NoteValidationError),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Target id is already taken.
    NoteConflict(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Note document could not be encoded or decoded.
    Serialization(serde_json::Error),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDescription(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::NoteConflict(id) => write!(f, "note id already in use: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid note document: {err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDescription(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Conflict(id) => Self::NoteConflict(id),
            RepoError::Validation(err) => Self::InvalidDescription(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidDescription(value)
    }
}

impl From<serde_json::Error> for NoteServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Flat, ordered note list used for export and import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesDocument {
    pub notes: Vec<Note>,
}

/// Import-side view of `NotesDocument`.
///
/// Also accepts records without an `id` and RFC 3339 instants such as
/// `2024-06-01T00:00:00.000Z`, as written by older exports.
#[derive(Debug, Deserialize)]
struct ImportDocument {
    notes: Vec<ImportRecord>,
}

#[derive(Debug, Deserialize)]
struct ImportRecord {
    #[serde(default)]
    id: Option<NoteId>,
    #[serde(deserialize_with = "deserialize_anchor")]
    date: NaiveDateTime,
    description: String,
}

impl ImportRecord {
    fn into_imported(self) -> ImportedNote {
        let date = self.date.date().and_time(NaiveTime::MIN);
        let description = normalize_description(&self.description);
        match self.id {
            Some(id) => ImportedNote::Keyed(Note {
                id,
                date,
                description,
            }),
            None => ImportedNote::Fresh(NoteDraft { date, description }),
        }
    }
}

fn deserialize_anchor<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_anchor(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("`{raw}` is not a date-time or RFC 3339 instant"))
    })
}

// Instants with an offset are read as local wall-clock time.
fn parse_anchor(raw: &str) -> Option<NaiveDateTime> {
    raw.parse::<NaiveDateTime>().ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|instant| instant.with_timezone(&Local).naive_local())
    })
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Read access to the underlying store, e.g. for month views.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Pins a new note to `day`.
    pub fn add_note(&self, day: NaiveDate, description: &str) -> Result<Note, NoteServiceError> {
        let draft = NoteDraft::new(day, normalize_description(description));
        draft.validate()?;
        let note = self.repo.add_note(&draft)?;
        info!(
            "event=note_add module=service status=ok note_id={} day={}",
            note.id, day
        );
        Ok(note)
    }

    /// Lists notes pinned to `day`, ordered by id.
    pub fn list_notes_for_day(&self, day: NaiveDate) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes_for_day(day)?)
    }

    /// Lists every stored note.
    pub fn list_notes(&self) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes()?)
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> Result<Option<Note>, NoteServiceError> {
        Ok(self.repo.get_note(id)?)
    }

    /// Deletes a note. Deleting an absent id is a no-op returning `false`.
    pub fn delete_note(&self, id: NoteId) -> Result<bool, NoteServiceError> {
        let deleted = self.repo.delete_note(id)?;
        if deleted {
            info!("event=note_delete module=service status=ok note_id={id}");
        } else {
            info!("event=note_delete module=service status=noop note_id={id}");
        }
        Ok(deleted)
    }

    /// Moves a note to another day, keeping its id and description.
    pub fn relocate_note(&mut self, id: NoteId, day: NaiveDate) -> Result<Note, NoteServiceError> {
        let moved = self.repo.relocate_note(id, day.and_time(NaiveTime::MIN))?;
        info!("event=note_relocate module=service status=ok note_id={id} day={day}");
        Ok(moved)
    }

    /// Serializes every note as a pretty-printed `NotesDocument`.
    pub fn export_json(&self) -> Result<String, NoteServiceError> {
        let document = NotesDocument {
            notes: self.repo.list_notes()?,
        };
        let json = serde_json::to_string_pretty(&document)?;
        info!(
            "event=notes_export module=service status=ok count={}",
            document.notes.len()
        );
        Ok(json)
    }

    /// Imports a `NotesDocument`, keeping ids where records carry one.
    ///
    /// Records without an id get fresh ids. Fails as a whole on any conflict.
    pub fn import_json(&mut self, json: &str) -> Result<usize, NoteServiceError> {
        let document: ImportDocument = serde_json::from_str(json)?;
        let notes: Vec<ImportedNote> = document
            .notes
            .into_iter()
            .map(ImportRecord::into_imported)
            .collect();

        match self.repo.import_notes(&notes) {
            Ok(count) => {
                info!("event=notes_import module=service status=ok count={count}");
                Ok(count)
            }
            Err(err) => {
                warn!("event=notes_import module=service status=error error={err}");
                Err(err.into())
            }
        }
    }
}

/// Collapses whitespace and truncates a description for one-line display.
pub fn note_preview(description: &str, max_chars: usize) -> String {
    let collapsed = WHITESPACE_RE.replace_all(description.trim(), " ");
    if collapsed.chars().count() <= max_chars {
        return collapsed.into_owned();
    }
    let mut truncated: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

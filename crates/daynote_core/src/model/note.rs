//! Calendar note domain model.
//!
//! # Responsibility
//! - Define the note record pinned to one calendar day.
//! - Own description validation rules shared by repository and service.
//!
//! # Invariants
//! - `id` is unique and never reused for another note.
//! - `date` is the anchor day at local midnight; only its calendar day matters.
//! - `description` is trimmed, non-empty and at most `MAX_DESCRIPTION_CHARS`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for note description length, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Stable integer identifier of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text note anchored to a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Anchor date-time, local midnight of the anchor day.
    pub date: NaiveDateTime,
    pub description: String,
}

impl Note {
    /// Calendar day this note is pinned to.
    pub fn anchor_day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Returns whether this note belongs on `day`.
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.anchor_day() == day
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_description(&self.description)
    }
}

/// Input for creating a note before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub date: NaiveDateTime,
    pub description: String,
}

impl NoteDraft {
    /// Creates a draft anchored at local midnight of `day`.
    pub fn new(day: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            date: day.and_time(NaiveTime::MIN),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_description(&self.description)
    }

    /// Attaches an id, turning the draft into a stored note shape.
    pub fn with_id(self, id: NoteId) -> Note {
        Note {
            id,
            date: self.date,
            description: self.description,
        }
    }
}

/// One record of an imported note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedNote {
    /// Record carried its own id; storage keeps it.
    Keyed(Note),
    /// Record had no id; storage assigns a fresh one.
    Fresh(NoteDraft),
}

/// Description-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Description is empty after trimming.
    EmptyDescription,
    /// Description exceeds `MAX_DESCRIPTION_CHARS`.
    DescriptionTooLong { max: usize, actual: usize },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "note description cannot be empty"),
            Self::DescriptionTooLong { max, actual } => write!(
                f,
                "note description has {actual} characters, maximum is {max}"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Trims surrounding whitespace from a description.
pub fn normalize_description(value: &str) -> String {
    value.trim().to_string()
}

fn validate_description(value: &str) -> Result<(), NoteValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NoteValidationError::EmptyDescription);
    }
    let actual = trimmed.chars().count();
    if actual > MAX_DESCRIPTION_CHARS {
        return Err(NoteValidationError::DescriptionTooLong {
            max: MAX_DESCRIPTION_CHARS,
            actual,
        });
    }
    Ok(())
}

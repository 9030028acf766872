//! Core domain logic for daynote.
//! Month layout, day-pinned notes and their SQLite store.

pub mod db;
pub mod layout;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use layout::{
    advance_month, build_grid, compute_month_meta, compute_month_meta_ymd, describe_day,
    resolve_slot_date, DaySlot, Grid, LayoutError, LayoutResult, MonthMeta, ReferenceDate,
    WeekRow,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{
    ImportedNote, Note, NoteDraft, NoteId, NoteValidationError, MAX_DESCRIPTION_CHARS,
};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::calendar_service::{AnnotatedSlot, CalendarService, MonthView};
pub use service::note_service::{note_preview, NoteService, NoteServiceError, NotesDocument};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

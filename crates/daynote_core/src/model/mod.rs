//! Domain model for day-pinned notes.
//!
//! # Responsibility
//! - Define canonical note data structures used by core business logic.
//!
//! # Invariants
//! - Every note is identified by a stable integer `NoteId`.
//! - Deletion is a hard delete; ids are not recycled by storage.

pub mod note;

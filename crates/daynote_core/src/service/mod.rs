//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep rendering layers decoupled from storage and layout details.

pub mod calendar_service;
pub mod note_service;

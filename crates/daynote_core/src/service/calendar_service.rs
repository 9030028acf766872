//! Month view use-case service.
//!
//! # Responsibility
//! - Combine month layout with per-day note annotations.
//!
//! # Invariants
//! - Only active slots are resolved to dates and annotated.
//! - Storage failures never fail a month view; the slot gets no notes.

use crate::layout::{
    build_grid, compute_month_meta, resolve_slot_date, DaySlot, LayoutError, LayoutResult,
    MonthMeta, ReferenceDate, DAYS_PER_WEEK,
};
use crate::model::note::Note;
use crate::repo::note_repo::NoteRepository;
use chrono::NaiveDate;
use log::warn;

/// One grid cell plus the notes pinned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSlot {
    pub slot: DaySlot,
    /// Resolved day for active slots, `None` for filler.
    pub date: Option<NaiveDate>,
    pub notes: Vec<Note>,
}

/// Fully laid-out and annotated month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub meta: MonthMeta,
    pub title: String,
    pub rows: Vec<[AnnotatedSlot; DAYS_PER_WEEK]>,
}

impl MonthView {
    /// Active slots carrying at least one note, in grid order.
    pub fn annotated_days(&self) -> impl Iterator<Item = &AnnotatedSlot> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| !cell.notes.is_empty())
    }
}

/// Read-only calendar facade over a note store.
pub struct CalendarService<'r, R: NoteRepository> {
    repo: &'r R,
}

impl<'r, R: NoteRepository> CalendarService<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Builds the annotated view of the month containing `reference`.
    pub fn month_view(&self, reference: ReferenceDate) -> LayoutResult<MonthView> {
        let meta = compute_month_meta(reference)?;
        let grid = build_grid(&meta)?;

        let mut rows = Vec::with_capacity(grid.row_count());
        for week in grid.rows() {
            let mut cells = Vec::with_capacity(DAYS_PER_WEEK);
            for slot in week {
                cells.push(self.annotate(&meta, *slot)?);
            }
            let row: [AnnotatedSlot; DAYS_PER_WEEK] = cells.try_into().map_err(|_| {
                LayoutError::GridInvariantViolation("week row does not hold 7 slots".to_string())
            })?;
            rows.push(row);
        }

        Ok(MonthView {
            title: meta.title(),
            meta,
            rows,
        })
    }

    fn annotate(&self, meta: &MonthMeta, slot: DaySlot) -> LayoutResult<AnnotatedSlot> {
        if !slot.is_active {
            return Ok(AnnotatedSlot {
                slot,
                date: None,
                notes: Vec::new(),
            });
        }

        let day = resolve_slot_date(meta, slot.display_number)?.date();
        let notes = self.repo.list_notes_for_day(day).unwrap_or_else(|err| {
            warn!(
                "event=month_view_notes module=service status=degraded day={day} error={err}"
            );
            Vec::new()
        });

        Ok(AnnotatedSlot {
            slot,
            date: Some(day),
            notes,
        })
    }
}

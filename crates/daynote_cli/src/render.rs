//! Plain-text rendering of month views.

use daynote_core::{note_preview, AnnotatedSlot, MonthView, Note};
use std::fmt::Write;

const CELL_WIDTH: usize = 6;
const PREVIEW_CHARS: usize = 60;
const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Renders the grid followed by the notes of each annotated day.
///
/// Filler days are shown in parentheses, days with notes carry a `*`.
pub fn render_month(view: &MonthView) -> String {
    let width = CELL_WIDTH * WEEKDAY_LABELS.len();
    let mut out = String::new();

    let _ = writeln!(out, "{:^width$}", view.title);
    for label in WEEKDAY_LABELS {
        let _ = write!(out, "{label:>CELL_WIDTH$}");
    }
    out.push('\n');

    for row in &view.rows {
        for cell in row {
            let _ = write!(out, "{:>CELL_WIDTH$}", cell_label(cell));
        }
        out.push('\n');
    }

    let mut annotated = view.annotated_days().peekable();
    if annotated.peek().is_some() {
        out.push('\n');
    }
    for cell in annotated {
        for note in &cell.notes {
            out.push_str(&note_line(note));
            out.push('\n');
        }
    }

    out
}

/// One-line listing form of a note.
pub fn note_line(note: &Note) -> String {
    format!(
        "{}  #{:<4} {}",
        note.anchor_day().format("%Y-%m-%d"),
        note.id.0,
        note_preview(&note.description, PREVIEW_CHARS)
    )
}

fn cell_label(cell: &AnnotatedSlot) -> String {
    let number = cell.slot.display_number;
    if !cell.slot.is_active {
        format!("({number})")
    } else if cell.notes.is_empty() {
        number.to_string()
    } else {
        format!("{number}*")
    }
}

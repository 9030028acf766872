//! Month layout engine.
//!
//! # Responsibility
//! - Derive month metadata (start weekday, month lengths) from a reference date.
//! - Lay a month out as Sunday-first week rows of exactly 7 day slots.
//! - Provide month navigation and slot-to-date resolution helpers.
//!
//! # Invariants
//! - Every operation is pure; inputs are never mutated.
//! - Row count is derived: `ceil((first_weekday + days_in_month) / 7)`.
//! - Active slot numbers read row-major are exactly `1..=days_in_month`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod grid;
pub mod meta;

pub use grid::{build_grid, DaySlot, Grid, WeekRow, DAYS_PER_WEEK};
pub use meta::{
    advance_month, compute_month_meta, compute_month_meta_ymd, describe_day, resolve_slot_date,
    MonthMeta, ReferenceDate,
};

pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors raised by layout computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Non-date or out-of-range value passed to a layout operation.
    InvalidDateInput(String),
    /// A produced grid breaks a structural invariant. Always a defect.
    GridInvariantViolation(String),
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDateInput(details) => write!(f, "invalid date input: {details}"),
            Self::GridInvariantViolation(details) => {
                write!(f, "grid invariant violated: {details}")
            }
        }
    }
}

impl Error for LayoutError {}

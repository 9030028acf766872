//! Reference dates, month metadata and navigation.
//!
//! # Responsibility
//! - Validate caller-provided dates before any layout work starts.
//! - Compute `MonthMeta` for the month containing a reference date.
//! - Shift reference dates by whole months without day-overflow drift.
//!
//! # Invariants
//! - `ReferenceDate` is immutable; navigation returns a new value.
//! - Navigation always lands on day 1 of the target month.

use super::{LayoutError, LayoutResult};
use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The date whose month is currently displayed.
///
/// Owned by the caller and replaced wholesale on navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceDate(NaiveDate);

impl ReferenceDate {
    /// Builds a reference date from a year, 1-based month and day.
    ///
    /// # Errors
    /// - `InvalidDateInput` when the triple is not a real calendar date.
    pub fn new(year: i32, month: u32, day: u32) -> LayoutResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                LayoutError::InvalidDateInput(format!(
                    "{year:04}-{month:02}-{day:02} is not a calendar date"
                ))
            })
    }

    /// Reference date for today's local calendar day.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for ReferenceDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Display for ReferenceDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Derived description of one displayed month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthMeta {
    pub year: i32,
    /// 1-based month number.
    pub month: u32,
    /// Weekday of day 1, `0 = Sunday .. 6 = Saturday`.
    pub first_weekday: u32,
    pub days_in_month: u32,
    pub days_in_previous_month: u32,
}

impl MonthMeta {
    /// First calendar day of this month.
    pub fn first_day(&self) -> NaiveDate {
        // Fields come from a validated date, day 1 always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Header label such as `June 2024`.
    pub fn title(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    /// Checks that every field agrees with the calendar for `year`/`month`.
    ///
    /// # Errors
    /// - `InvalidDateInput` when the month does not exist or any derived
    ///   field differs from the computed value.
    pub fn validate(&self) -> LayoutResult<()> {
        let expected = compute_month_meta_ymd(self.year, self.month, 1)?;
        if *self != expected {
            return Err(LayoutError::InvalidDateInput(format!(
                "month metadata {self:?} does not match calendar {expected:?}"
            )));
        }
        Ok(())
    }

    /// Number of week rows the month occupies.
    pub fn row_count(&self) -> usize {
        let cells = (self.first_weekday + self.days_in_month) as usize;
        cells.div_ceil(super::DAYS_PER_WEEK)
    }
}

/// Computes month metadata for the month containing `reference`.
///
/// # Errors
/// - `InvalidDateInput` when the previous or next month is outside the
///   representable date range.
pub fn compute_month_meta(reference: ReferenceDate) -> LayoutResult<MonthMeta> {
    let year = reference.year();
    let month = reference.month();
    let first = first_of_month(year, month)?;
    let previous = first.checked_sub_months(Months::new(1)).ok_or_else(|| {
        LayoutError::InvalidDateInput(format!("month before {year:04}-{month:02} is out of range"))
    })?;

    Ok(MonthMeta {
        year,
        month,
        first_weekday: first.weekday().num_days_from_sunday(),
        days_in_month: days_in_month(year, month)?,
        days_in_previous_month: days_in_month(previous.year(), previous.month())?,
    })
}

/// Validating variant of [`compute_month_meta`] for raw integer input.
pub fn compute_month_meta_ymd(year: i32, month: u32, day: u32) -> LayoutResult<MonthMeta> {
    compute_month_meta(ReferenceDate::new(year, month, day)?)
}

/// Shifts `reference` by `delta` months, landing on day 1 of the target month.
///
/// # Errors
/// - `InvalidDateInput` when the target month is outside the representable range.
pub fn advance_month(reference: ReferenceDate, delta: i32) -> LayoutResult<ReferenceDate> {
    let first = first_of_month(reference.year(), reference.month())?;
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        first.checked_add_months(months)
    } else {
        first.checked_sub_months(months)
    };

    shifted.map(ReferenceDate).ok_or_else(|| {
        LayoutError::InvalidDateInput(format!(
            "moving {delta} month(s) from {reference} leaves the supported range"
        ))
    })
}

/// Maps an active slot number back to its date at local midnight.
///
/// # Errors
/// - `InvalidDateInput` when `day_number` is not in `1..=days_in_month`.
pub fn resolve_slot_date(meta: &MonthMeta, day_number: u32) -> LayoutResult<NaiveDateTime> {
    if day_number == 0 || day_number > meta.days_in_month {
        return Err(LayoutError::InvalidDateInput(format!(
            "day {day_number} is outside {:04}-{:02} (1..={})",
            meta.year, meta.month, meta.days_in_month
        )));
    }

    NaiveDate::from_ymd_opt(meta.year, meta.month, day_number)
        .map(|date| date.and_time(NaiveTime::MIN))
        .ok_or_else(|| {
            LayoutError::InvalidDateInput(format!(
                "{:04}-{:02}-{day_number:02} is not a calendar date",
                meta.year, meta.month
            ))
        })
}

/// Long human label for a day, e.g. `Saturday, June 1, 2024`.
pub fn describe_day(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn first_of_month(year: i32, month: u32) -> LayoutResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        LayoutError::InvalidDateInput(format!("{year:04}-{month:02} is not a calendar month"))
    })
}

// Day count of a month is the day number of "day 0" of the following month.
fn days_in_month(year: i32, month: u32) -> LayoutResult<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|next_first| next_first.pred_opt())
        .map(|last| last.day())
        .ok_or_else(|| {
            LayoutError::InvalidDateInput(format!(
                "month after {year:04}-{month:02} is out of range"
            ))
        })
}

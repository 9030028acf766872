//! Week-row grid construction.
//!
//! # Responsibility
//! - Lay out one month as Sunday-first rows of 7 `DaySlot`s.
//! - Verify the structural invariants of a produced grid.
//!
//! # Invariants
//! - Leading filler counts down to `days_in_previous_month` just before day 1.
//! - Trailing filler counts up from 1 right after the last day.
//! - Filler slots are never active.

use super::meta::MonthMeta;
use super::{LayoutError, LayoutResult};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: usize = 7;

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DaySlot {
    /// Day-of-month shown in the cell, `1..=31`.
    pub display_number: u32,
    /// `false` for filler cells borrowed from adjacent months.
    pub is_active: bool,
}

impl DaySlot {
    pub fn active(display_number: u32) -> Self {
        Self {
            display_number,
            is_active: true,
        }
    }

    pub fn filler(display_number: u32) -> Self {
        Self {
            display_number,
            is_active: false,
        }
    }
}

/// Sunday-first week of exactly 7 slots.
pub type WeekRow = [DaySlot; DAYS_PER_WEEK];

/// Laid-out month: whole weeks covering day 1 through the last day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<WeekRow>,
}

impl Grid {
    pub fn rows(&self) -> &[WeekRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All slots in row-major order.
    pub fn slots(&self) -> impl Iterator<Item = &DaySlot> + '_ {
        self.rows.iter().flat_map(|row| row.iter())
    }

    /// Day numbers of active slots in row-major order.
    pub fn active_days(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots()
            .filter(|slot| slot.is_active)
            .map(|slot| slot.display_number)
    }

    /// Checks the grid against the month it was built for.
    ///
    /// # Errors
    /// - `InvalidDateInput` when `meta` itself is malformed.
    /// - `GridInvariantViolation` describing the first broken property.
    pub fn check_invariants(&self, meta: &MonthMeta) -> LayoutResult<()> {
        meta.validate()?;

        let expected_rows = meta.row_count();
        if self.rows.len() != expected_rows {
            return Err(violation(format!(
                "expected {expected_rows} rows, found {}",
                self.rows.len()
            )));
        }

        if !self.rows[0].iter().any(|slot| slot.is_active) {
            return Err(violation(
                "first row does not contain the first day of the month".to_string(),
            ));
        }

        let slots: Vec<&DaySlot> = self.slots().collect();
        let lead = meta.first_weekday as usize;
        let days = meta.days_in_month as usize;

        for (offset, slot) in slots.iter().take(lead).enumerate() {
            let expected = meta.days_in_previous_month as usize - lead + offset + 1;
            if slot.is_active || slot.display_number as usize != expected {
                return Err(violation(format!(
                    "leading slot {offset} should be filler {expected}, found {slot:?}"
                )));
            }
        }

        for (offset, slot) in slots.iter().skip(lead).take(days).enumerate() {
            if !slot.is_active || slot.display_number as usize != offset + 1 {
                return Err(violation(format!(
                    "slot {} should be active day {}, found {slot:?}",
                    lead + offset,
                    offset + 1
                )));
            }
        }

        for (offset, slot) in slots.iter().skip(lead + days).enumerate() {
            if slot.is_active || slot.display_number as usize != offset + 1 {
                return Err(violation(format!(
                    "trailing slot {offset} should be filler {}, found {slot:?}",
                    offset + 1
                )));
            }
        }

        Ok(())
    }
}

/// Lays out `meta` as week rows.
///
/// # Errors
/// - `InvalidDateInput` when `meta` does not describe a real calendar month.
pub fn build_grid(meta: &MonthMeta) -> LayoutResult<Grid> {
    meta.validate()?;

    let lead = meta.first_weekday;
    let leading =
        (0..lead).map(|offset| DaySlot::filler(meta.days_in_previous_month - lead + offset + 1));
    let active = (1..=meta.days_in_month).map(DaySlot::active);
    let trailing = (1..).map(DaySlot::filler);

    let mut slots = leading.chain(active).chain(trailing);
    let rows = (0..meta.row_count())
        .map(|_| std::array::from_fn(|_| slots.next().unwrap_or(DaySlot::filler(0))))
        .collect();

    let grid = Grid { rows };
    debug_assert_eq!(grid.check_invariants(meta), Ok(()));
    Ok(grid)
}

fn violation(details: String) -> LayoutError {
    LayoutError::GridInvariantViolation(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::meta::compute_month_meta_ymd;

    fn grid_for(year: i32, month: u32) -> (MonthMeta, Grid) {
        let meta = compute_month_meta_ymd(year, month, 1).unwrap();
        (meta, build_grid(&meta).unwrap())
    }

    fn numbers(row: &WeekRow) -> Vec<(u32, bool)> {
        row.iter()
            .map(|slot| (slot.display_number, slot.is_active))
            .collect()
    }

    #[test]
    fn june_2024_starts_on_saturday() {
        let (meta, grid) = grid_for(2024, 6);
        assert_eq!(meta.first_weekday, 6);
        assert_eq!(meta.days_in_month, 30);
        assert_eq!(grid.row_count(), 5);
        assert_eq!(
            numbers(&grid.rows()[0]),
            vec![
                (26, false),
                (27, false),
                (28, false),
                (29, false),
                (30, false),
                (31, false),
                (1, true),
            ]
        );
    }

    #[test]
    fn february_2023_ends_on_march_fourth() {
        let (meta, grid) = grid_for(2023, 2);
        assert_eq!(meta.first_weekday, 3);
        assert_eq!(grid.row_count(), 5);
        let last_row = grid.rows().last().unwrap();
        assert_eq!(last_row[6], DaySlot::filler(4));
        assert_eq!(last_row[2], DaySlot::active(28));
    }

    #[test]
    fn sunday_start_has_no_leading_filler() {
        // September 2024 begins on a Sunday.
        let (meta, grid) = grid_for(2024, 9);
        assert_eq!(meta.first_weekday, 0);
        assert!(grid.rows()[0].iter().all(|slot| slot.is_active));
        assert_eq!(grid.rows()[0][0], DaySlot::active(1));
    }

    #[test]
    fn four_row_february_has_no_filler_at_all() {
        // February 2015: 28 days starting Sunday.
        let (_, grid) = grid_for(2015, 2);
        assert_eq!(grid.row_count(), 4);
        assert!(grid.slots().all(|slot| slot.is_active));
    }

    #[test]
    fn thirty_one_days_from_saturday_needs_six_rows() {
        // March 2025 starts on a Saturday.
        let (meta, grid) = grid_for(2025, 3);
        assert_eq!(meta.first_weekday, 6);
        assert_eq!(grid.row_count(), 6);
        assert_eq!(
            numbers(&grid.rows()[5]),
            vec![
                (30, true),
                (31, true),
                (1, false),
                (2, false),
                (3, false),
                (4, false),
                (5, false),
            ]
        );
    }

    #[test]
    fn exact_multiple_of_seven_has_no_trailing_filler() {
        // November 2024: starts Friday (5), 30 days, 35 cells.
        let (meta, grid) = grid_for(2024, 11);
        assert_eq!(meta.first_weekday + meta.days_in_month, 35);
        assert_eq!(grid.rows().last().unwrap()[6], DaySlot::active(30));
    }

    #[test]
    fn build_grid_rejects_hand_built_meta() {
        let june = compute_month_meta_ymd(2024, 6, 1).unwrap();
        let bad_metas = [
            MonthMeta {
                first_weekday: 9,
                ..june
            },
            MonthMeta {
                first_weekday: 5,
                days_in_previous_month: 2,
                ..june
            },
            MonthMeta {
                days_in_month: 31,
                ..june
            },
            MonthMeta { month: 13, ..june },
        ];

        for meta in bad_metas {
            assert!(
                matches!(build_grid(&meta), Err(LayoutError::InvalidDateInput(_))),
                "{meta:?} should be rejected"
            );
        }
    }

    #[test]
    fn check_invariants_requires_day_one_in_first_row() {
        let (meta, grid) = grid_for(2024, 6);
        let mut rows = grid.rows().to_vec();
        rows[0] = [DaySlot::filler(1); DAYS_PER_WEEK];
        let shifted = Grid { rows };
        assert!(matches!(
            shifted.check_invariants(&meta),
            Err(LayoutError::GridInvariantViolation(_))
        ));
    }

    #[test]
    fn check_invariants_flags_tampered_grid() {
        let (meta, grid) = grid_for(2024, 6);
        let mut rows = grid.rows().to_vec();
        rows[2][3] = DaySlot::filler(17);
        let tampered = Grid { rows };
        assert!(matches!(
            tampered.check_invariants(&meta),
            Err(LayoutError::GridInvariantViolation(_))
        ));

        let short = Grid {
            rows: grid.rows()[..4].to_vec(),
        };
        assert!(short.check_invariants(&meta).is_err());
    }
}

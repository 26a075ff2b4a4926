//! The weekly grid and its coordinates.
//!
//! A timetable is a fixed 5-day × 7-teaching-period grid whose cells hold a
//! subject name or nothing. Days and periods are 1-based throughout; break
//! slots are not part of the grid (see [`BreakSchedule`](super::BreakSchedule)
//! for the widened display layout).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Day index, 1 (Monday) through [`NUM_DAYS`].
pub type Day = u8;
/// Teaching period index, 1 through [`NUM_PERIODS`].
pub type Period = u8;

/// Teaching days per week.
pub const NUM_DAYS: Day = 5;
/// Teaching periods per day (breaks excluded).
pub const NUM_PERIODS: Period = 7;
/// Day names for presentation; index 0 = day 1.
pub const DAY_NAMES: [&str; NUM_DAYS as usize] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// A (day, period) grid coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Slot {
    /// Day of the week, 1-based.
    pub day: Day,
    /// Teaching period, 1-based.
    pub period: Period,
}

impl Slot {
    /// Creates a slot.
    pub fn new(day: Day, period: Period) -> Self {
        Self { day, period }
    }

    /// Whether this slot lies on the grid.
    #[inline]
    pub fn in_range(&self) -> bool {
        (1..=NUM_DAYS).contains(&self.day) && (1..=NUM_PERIODS).contains(&self.period)
    }

    /// Iterates every grid slot in day-major, period-minor order.
    pub fn all() -> impl Iterator<Item = Slot> {
        (1..=NUM_DAYS)
            .flat_map(|day| (1..=NUM_PERIODS).map(move |period| Slot { day, period }))
    }
}

/// A section's weekly timetable: exactly 35 cells, each holding a subject
/// name or empty.
///
/// Cells are mutated only through [`set`](Timetable::set); all queries are
/// read-only. Row-major storage, day-major iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    cells: Vec<Option<String>>,
}

impl Timetable {
    /// Creates an all-empty timetable.
    pub fn empty() -> Self {
        Self {
            cells: vec![None; NUM_DAYS as usize * NUM_PERIODS as usize],
        }
    }

    #[inline]
    fn index(day: Day, period: Period) -> usize {
        debug_assert!(Slot::new(day, period).in_range());
        (day as usize - 1) * NUM_PERIODS as usize + (period as usize - 1)
    }

    /// The subject at a cell, if any.
    #[inline]
    pub fn get(&self, day: Day, period: Period) -> Option<&str> {
        self.cells
            .get(Self::index(day, period))
            .and_then(|c| c.as_deref())
    }

    /// Writes a cell.
    pub fn set(&mut self, day: Day, period: Period, subject: Option<String>) {
        if let Some(cell) = self.cells.get_mut(Self::index(day, period)) {
            *cell = subject;
        }
    }

    /// Whether a cell is empty.
    #[inline]
    pub fn is_free(&self, day: Day, period: Period) -> bool {
        self.get(day, period).is_none()
    }

    /// Iterates occupied cells as (slot, subject).
    pub fn occupied(&self) -> impl Iterator<Item = (Slot, &str)> + '_ {
        Slot::all().filter_map(|slot| self.get(slot.day, slot.period).map(|s| (slot, s)))
    }

    /// Number of empty cells.
    pub fn empty_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Occurrence count of one subject across the grid.
    pub fn count_of(&self, subject: &str) -> u32 {
        self.cells
            .iter()
            .filter(|c| c.as_deref() == Some(subject))
            .count() as u32
    }

    /// Occurrence counts for each named subject (absent subjects count 0).
    pub fn counts_for<'a>(
        &self,
        subjects: impl IntoIterator<Item = &'a str>,
    ) -> BTreeMap<String, u32> {
        subjects
            .into_iter()
            .map(|s| (s.to_string(), self.count_of(s)))
            .collect()
    }

    /// Whether the subject appears anywhere on the given day.
    pub fn has_on_day(&self, subject: &str, day: Day) -> bool {
        (1..=NUM_PERIODS).any(|p| self.get(day, p) == Some(subject))
    }

    /// Periods on the given day holding the subject, in order.
    pub fn periods_on_day(&self, subject: &str, day: Day) -> Vec<Period> {
        (1..=NUM_PERIODS)
            .filter(|&p| self.get(day, p) == Some(subject))
            .collect()
    }

    /// Content hash of the full grid, used for stall detection in repair.
    ///
    /// Stable within a process run; not a persistence format.
    pub fn state_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.cells.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for Timetable {
    fn default() -> Self {
        Self::empty()
    }
}

//! Cross-section faculty occupancy index.
//!
//! Derived, never persisted: always rebuilt by scanning the current grids so
//! it cannot go stale. Keyed by (day, period) because faculty exclusivity is
//! institution-wide — which section a faculty member teaches in at a given
//! slot is irrelevant to the conflict rule.

use std::collections::HashMap;

use crate::models::{Day, Period, ResolvedFaculty, Timetable, TimetableRequest, NUM_PERIODS};

/// (day, period) → faculty currently teaching somewhere at that slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct FacultyIndex {
    busy: HashMap<(Day, Period), Vec<String>>,
}

impl FacultyIndex {
    /// Builds the index from the given (section, grid) pairs.
    pub fn build<'a, I>(grids: I, req: &TimetableRequest, resolved: &ResolvedFaculty) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Timetable)>,
    {
        let mut index = Self::default();
        for (section, grid) in grids {
            for (slot, subject) in grid.occupied() {
                if let Some(faculty) = resolved.get(section, subject) {
                    index.record(slot.day, slot.period, faculty);
                }
            }
        }
        index
    }

    /// Records an additional assignment (incremental bookkeeping during
    /// insertion).
    pub fn record(&mut self, day: Day, period: Period, faculty: &str) {
        self.busy
            .entry((day, period))
            .or_default()
            .push(faculty.to_string());
    }

    /// Whether the faculty member teaches anywhere at (day, period).
    pub fn is_busy(&self, faculty: &str, day: Day, period: Period) -> bool {
        self.busy
            .get(&(day, period))
            .is_some_and(|fs| fs.iter().any(|f| f == faculty))
    }

    /// Whether placing this faculty member at (day, period) would collide:
    /// already teaching at the same period anywhere, or at an adjacent
    /// period — the mandatory cool-down between classes.
    pub fn conflicts(&self, faculty: &str, day: Day, period: Period) -> bool {
        if self.is_busy(faculty, day, period) {
            return true;
        }
        if period > 1 && self.is_busy(faculty, day, period - 1) {
            return true;
        }
        period < NUM_PERIODS && self.is_busy(faculty, day, period + 1)
    }
}

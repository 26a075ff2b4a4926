//! Break layout and the placement rules derived from it.
//!
//! Two breaks split the teaching day; each is described by the period it
//! follows. The layout reshapes two rule sets: which periods may start a
//! 2-period lab (a lab must not straddle a break), and which adjacent period
//! pairs count as break-separated for the repeat rule.

use serde::{Deserialize, Serialize};

use super::grid::{Period, NUM_PERIODS};

/// Positions of the two daily breaks.
///
/// `after_first` and `after_lunch` name the teaching period each break
/// follows; with the defaults (2, 4) the day reads
/// P1 P2 | break | P3 P4 | break | P5 P6 P7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSchedule {
    /// Teaching period the morning break follows.
    pub after_first: Period,
    /// Teaching period the lunch break follows.
    pub after_lunch: Period,
}

impl BreakSchedule {
    /// Creates a break schedule.
    pub fn new(after_first: Period, after_lunch: Period) -> Self {
        Self {
            after_first,
            after_lunch,
        }
    }

    /// Whether a break falls immediately after the given period, i.e.
    /// between `period` and `period + 1`.
    #[inline]
    pub fn splits_pair(&self, period: Period) -> bool {
        period == self.after_first || period == self.after_lunch
    }

    /// Whether a 2-period block may start at `period` without straddling a
    /// break or running off the day.
    #[inline]
    pub fn valid_lab_start(&self, period: Period) -> bool {
        period >= 1 && period < NUM_PERIODS && !self.splits_pair(period)
    }

    /// Lab starting periods in preference order.
    ///
    /// All valid starts, with the earliest start demoted to the end: labs
    /// prefer to land mid-block, keeping the first block of the day open for
    /// singly-placed subjects. With breaks (2, 4) this yields `[3, 5, 6, 1]`.
    pub fn lab_starts(&self) -> Vec<Period> {
        let valid: Vec<Period> = (1..NUM_PERIODS)
            .filter(|&p| self.valid_lab_start(p))
            .collect();
        match valid.split_first() {
            Some((&fallback, preferred)) => {
                let mut order = preferred.to_vec();
                order.push(fallback);
                order
            }
            None => valid,
        }
    }

    /// Display slots per day: teaching periods plus one column per break.
    #[inline]
    pub fn display_slot_count(&self) -> u8 {
        NUM_PERIODS + 2
    }

    /// Maps a teaching period to its display slot in the widened layout.
    pub fn display_slot(&self, period: Period) -> u8 {
        let mut slot = period;
        if period > self.after_first {
            slot += 1;
        }
        if period > self.after_lunch {
            slot += 1;
        }
        slot
    }

    /// Whether a display slot is a break column.
    pub fn is_break_slot(&self, slot: u8) -> bool {
        slot == self.after_first + 1 || slot == self.after_lunch + 2
    }

    /// Maps a display slot back to its teaching period; `None` for break
    /// columns.
    pub fn period_for_slot(&self, slot: u8) -> Option<Period> {
        if self.is_break_slot(slot) {
            return None;
        }
        let mut period = slot;
        if slot > self.after_first + 1 {
            period -= 1;
        }
        if slot > self.after_lunch + 2 {
            period -= 1;
        }
        (1..=NUM_PERIODS).contains(&period).then_some(period)
    }
}

impl Default for BreakSchedule {
    fn default() -> Self {
        Self {
            after_first: 2,
            after_lunch: 4,
        }
    }
}

//! Derived views and plain-text rendering.
//!
//! Per-faculty weekly views are reconstructed by re-scanning the output
//! grids against the roster — nothing here is tracked during solving. The
//! renderers produce fixed-width tables with the break columns widened back
//! in, for logs and terminal inspection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::models::{
    BreakSchedule, Day, Period, Timetable, TimetableRequest, TimetableSolution, DAY_NAMES,
    NUM_DAYS, NUM_PERIODS,
};

const CELL_WIDTH: usize = 14;

/// One taught slot in a faculty member's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyCell {
    /// Subject taught.
    pub subject: String,
    /// Section taught in.
    pub section: String,
}

/// A faculty member's combined weekly grid across all sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacultyView {
    cells: Vec<Option<FacultyCell>>,
}

impl FacultyView {
    fn empty() -> Self {
        Self {
            cells: vec![None; NUM_DAYS as usize * NUM_PERIODS as usize],
        }
    }

    #[inline]
    fn index(day: Day, period: Period) -> usize {
        (day as usize - 1) * NUM_PERIODS as usize + (period as usize - 1)
    }

    /// The cell taught at (day, period), if any.
    pub fn get(&self, day: Day, period: Period) -> Option<&FacultyCell> {
        self.cells.get(Self::index(day, period))?.as_ref()
    }

    fn set(&mut self, day: Day, period: Period, cell: FacultyCell) {
        if let Some(c) = self.cells.get_mut(Self::index(day, period)) {
            *c = Some(cell);
        }
    }

    /// Total taught periods in the week.
    pub fn taught_periods(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Derives every faculty member's weekly view from a solution.
///
/// Every identifier in the roster gets a view, including faculty with no
/// assigned cells.
pub fn faculty_views(
    solution: &TimetableSolution,
    req: &TimetableRequest,
) -> BTreeMap<String, FacultyView> {
    let resolved = req.faculty.resolve(&req.sections, &req.subjects);
    let mut views: BTreeMap<String, FacultyView> = req
        .faculty
        .all_faculty()
        .into_iter()
        .map(|f| (f, FacultyView::empty()))
        .collect();

    for (section, outcome) in &solution.sections {
        for (slot, subject) in outcome.grid.occupied() {
            if let Some(faculty) = resolved.get(section, subject) {
                if let Some(view) = views.get_mut(faculty) {
                    view.set(
                        slot.day,
                        slot.period,
                        FacultyCell {
                            subject: subject.to_string(),
                            section: section.clone(),
                        },
                    );
                }
            }
        }
    }
    views
}

fn render_table(
    breaks: &BreakSchedule,
    cell_text: impl Fn(Day, Period) -> String,
) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<CELL_WIDTH$}", "Day");
    for slot in 1..=breaks.display_slot_count() {
        match breaks.period_for_slot(slot) {
            None => {
                let _ = write!(out, "{:<CELL_WIDTH$}", "BREAK");
            }
            Some(period) => {
                let _ = write!(out, "{:<CELL_WIDTH$}", format!("P{period}"));
            }
        }
    }
    out.push('\n');

    for day in 1..=NUM_DAYS {
        let _ = write!(out, "{:<CELL_WIDTH$}", DAY_NAMES[day as usize - 1]);
        for slot in 1..=breaks.display_slot_count() {
            let text = match breaks.period_for_slot(slot) {
                None => "BREAK".to_string(),
                Some(period) => cell_text(day, period),
            };
            let _ = write!(out, "{text:<CELL_WIDTH$}");
        }
        out.push('\n');
    }
    out
}

/// Renders a section grid as a fixed-width table with break columns.
pub fn render_section(grid: &Timetable, breaks: &BreakSchedule) -> String {
    render_table(breaks, |day, period| {
        grid.get(day, period).unwrap_or("---").to_string()
    })
}

/// Renders a faculty view as a fixed-width table; cells show
/// `SUBJECT(section)`.
pub fn render_faculty(view: &FacultyView, breaks: &BreakSchedule) -> String {
    render_table(breaks, |day, period| match view.get(day, period) {
        Some(cell) => format!("{}({})", cell.subject, cell.section),
        None => "---".to_string(),
    })
}

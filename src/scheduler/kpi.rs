//! Solution quality metrics.
//!
//! Computed from a finished solution and its request; purely derived, so
//! they can be recalculated at any time.

use std::collections::HashMap;

use crate::models::{TimetableRequest, TimetableSolution, NUM_DAYS, NUM_PERIODS};

/// Timetable quality indicators.
#[derive(Debug, Clone)]
pub struct SolutionKpi {
    /// Occupied cells over total cells across all sections (0.0..1.0).
    pub fill_rate: f64,
    /// Cells holding the filler subject.
    pub filler_cells: usize,
    /// Sections whose every subject reached its exact hour target.
    pub complete_sections: usize,
    /// Total sections in the solution.
    pub section_count: usize,
    /// Assigned teaching hours per faculty member.
    pub hours_by_faculty: HashMap<String, u32>,
}

impl SolutionKpi {
    /// Computes KPIs from a solution.
    pub fn calculate(solution: &TimetableSolution, req: &TimetableRequest) -> Self {
        let resolved = req.faculty.resolve(&req.sections, &req.subjects);
        let cells_per_section = NUM_DAYS as usize * NUM_PERIODS as usize;

        let mut filled = 0usize;
        let mut filler_cells = 0usize;
        let mut hours_by_faculty: HashMap<String, u32> = HashMap::new();

        for (section, outcome) in &solution.sections {
            for (_, subject) in outcome.grid.occupied() {
                filled += 1;
                if subject == req.filler_subject {
                    filler_cells += 1;
                }
                if let Some(faculty) = resolved.get(section, subject) {
                    *hours_by_faculty.entry(faculty.to_string()).or_insert(0) += 1;
                }
            }
        }

        let total = solution.sections.len() * cells_per_section;
        let fill_rate = if total == 0 {
            0.0
        } else {
            filled as f64 / total as f64
        };
        let complete_sections = solution.sections.values().filter(|s| s.complete).count();

        Self {
            fill_rate,
            filler_cells,
            complete_sections,
            section_count: solution.sections.len(),
            hours_by_faculty,
        }
    }

    /// Whether the solution clears the given thresholds.
    pub fn meets_thresholds(&self, min_fill_rate: f64, max_filler_cells: usize) -> bool {
        self.fill_rate >= min_fill_rate && self.filler_cells <= max_filler_cells
    }
}

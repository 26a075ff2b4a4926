//! Generation results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::grid::Timetable;

/// One section's generated timetable with its achieved hour counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionOutcome {
    /// The generated grid.
    pub grid: Timetable,
    /// Subject → placed hours (declared subjects only; the filler is not
    /// counted here).
    pub achieved: BTreeMap<String, u32>,
    /// Whether every subject reached its exact required hours.
    pub complete: bool,
}

/// The result of a full generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableSolution {
    /// Section → outcome.
    pub sections: BTreeMap<String, SectionOutcome>,
    /// Whether every section validated: exact hours, zero empty cells,
    /// intact lab pairing. When false, grids are best-effort and empty cells
    /// have been backfilled with the filler subject.
    pub success: bool,
    /// Global attempts consumed.
    pub attempts: usize,
}

impl TimetableSolution {
    /// A section's outcome.
    pub fn section(&self, name: &str) -> Option<&SectionOutcome> {
        self.sections.get(name)
    }

    /// Whether every section is complete.
    pub fn all_complete(&self) -> bool {
        self.sections.values().all(|s| s.complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_queries() {
        let mut sections = BTreeMap::new();
        sections.insert(
            "A".to_string(),
            SectionOutcome {
                grid: Timetable::empty(),
                achieved: BTreeMap::new(),
                complete: true,
            },
        );
        sections.insert(
            "B".to_string(),
            SectionOutcome {
                grid: Timetable::empty(),
                achieved: BTreeMap::new(),
                complete: false,
            },
        );
        let solution = TimetableSolution {
            sections,
            success: false,
            attempts: 3,
        };

        assert!(solution.section("A").unwrap().complete);
        assert!(!solution.all_complete());
        assert!(solution.section("C").is_none());
    }
}

//! Input container for a generation run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::breaks::BreakSchedule;
use super::constraint::SectionConstraints;
use super::faculty::FacultyRoster;
use super::grid::Slot;
use super::subject::SubjectSpec;

fn default_filler() -> String {
    "REMEDIAL".to_string()
}

/// A complete scheduling problem: sections, subject tables, faculty roster,
/// placement constraints, and break layout.
///
/// Immutable for the duration of a run; every engine component receives it
/// by reference. The filler subject identifier is reserved for backfilling
/// unavoidable empty cells and must not be declared as a real subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableRequest {
    /// Section identifiers in scheduling order.
    pub sections: Vec<String>,
    /// Section → subject name → requirements.
    pub subjects: BTreeMap<String, BTreeMap<String, SubjectSpec>>,
    /// Subject → faculty assignment, shared across sections.
    #[serde(default)]
    pub faculty: FacultyRoster,
    /// Section → strict/forbidden placements.
    #[serde(default)]
    pub constraints: BTreeMap<String, SectionConstraints>,
    /// Break layout.
    #[serde(default)]
    pub breaks: BreakSchedule,
    /// Reserved placeholder used to backfill empty cells.
    #[serde(default = "default_filler")]
    pub filler_subject: String,
}

impl TimetableRequest {
    /// Creates a request for the given sections with empty tables.
    pub fn new(sections: Vec<String>) -> Self {
        Self {
            sections,
            subjects: BTreeMap::new(),
            faculty: FacultyRoster::new(),
            constraints: BTreeMap::new(),
            breaks: BreakSchedule::default(),
            filler_subject: default_filler(),
        }
    }

    /// Adds a subject to a section's table.
    pub fn with_subject(
        mut self,
        section: impl Into<String>,
        name: impl Into<String>,
        spec: SubjectSpec,
    ) -> Self {
        self.subjects
            .entry(section.into())
            .or_default()
            .insert(name.into(), spec);
        self
    }

    /// Sets the faculty roster.
    pub fn with_faculty(mut self, roster: FacultyRoster) -> Self {
        self.faculty = roster;
        self
    }

    /// Sets the placement constraints for a section.
    pub fn with_constraints(
        mut self,
        section: impl Into<String>,
        constraints: SectionConstraints,
    ) -> Self {
        self.constraints.insert(section.into(), constraints);
        self
    }

    /// Sets the break layout.
    pub fn with_breaks(mut self, breaks: BreakSchedule) -> Self {
        self.breaks = breaks;
        self
    }

    /// Overrides the reserved filler identifier.
    pub fn with_filler(mut self, filler: impl Into<String>) -> Self {
        self.filler_subject = filler.into();
        self
    }

    /// A section's subject table.
    pub fn section_subjects(&self, section: &str) -> Option<&BTreeMap<String, SubjectSpec>> {
        self.subjects.get(section)
    }

    /// One subject's requirements within a section.
    pub fn subject_spec(&self, section: &str, subject: &str) -> Option<&SubjectSpec> {
        self.subjects.get(section)?.get(subject)
    }

    /// Whether a cell is strict-claimed or forbidden for the given subject.
    pub fn is_blocked_cell(&self, section: &str, subject: Option<&str>, slot: Slot) -> bool {
        self.constraints
            .get(section)
            .is_some_and(|c| c.is_blocked(subject, slot))
    }

    /// All strict-claimed cells of a section.
    pub fn strict_cells(&self, section: &str) -> BTreeSet<Slot> {
        self.constraints
            .get(section)
            .map(SectionConstraints::strict_cells)
            .unwrap_or_default()
    }
}

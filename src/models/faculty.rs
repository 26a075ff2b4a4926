//! Faculty assignment and per-run resolution.
//!
//! Each subject maps to one faculty identifier or an ordered candidate list.
//! Faculty identifiers are shared across sections and are the binding scarce
//! resource: a faculty member cannot be double-booked anywhere in the
//! institution, including adjacent periods.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::subject::SubjectSpec;

/// Who teaches a subject: a single identifier or an ordered candidate list.
///
/// Serializes untagged, so a roster reads naturally as either a string or a
/// list per subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacultyAssignment {
    /// One fixed faculty member.
    Single(String),
    /// Ordered candidates; the first is pinned for the lifetime of a run.
    Candidates(Vec<String>),
}

/// Subject → faculty assignment table, shared by all sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacultyRoster {
    assignments: BTreeMap<String, FacultyAssignment>,
}

impl FacultyRoster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a single faculty member to a subject.
    pub fn with_assignment(
        mut self,
        subject: impl Into<String>,
        faculty: impl Into<String>,
    ) -> Self {
        self.assignments
            .insert(subject.into(), FacultyAssignment::Single(faculty.into()));
        self
    }

    /// Assigns an ordered candidate list to a subject.
    pub fn with_candidates(mut self, subject: impl Into<String>, candidates: Vec<String>) -> Self {
        self.assignments
            .insert(subject.into(), FacultyAssignment::Candidates(candidates));
        self
    }

    /// The raw assignment for a subject.
    pub fn get(&self, subject: &str) -> Option<&FacultyAssignment> {
        self.assignments.get(subject)
    }

    /// Every faculty identifier mentioned anywhere in the roster.
    pub fn all_faculty(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for assignment in self.assignments.values() {
            match assignment {
                FacultyAssignment::Single(f) => {
                    out.insert(f.clone());
                }
                FacultyAssignment::Candidates(cs) => out.extend(cs.iter().cloned()),
            }
        }
        out
    }

    /// Number of subjects with an assignment.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Pins one faculty member per (section, subject) for a generation run.
    ///
    /// Candidate lists resolve to their first entry; the result is cached in
    /// the returned table so repeated lookups are stable for the whole run.
    /// Subjects without a roster entry stay unresolved (no conflicts are
    /// tracked for them).
    pub fn resolve(
        &self,
        sections: &[String],
        subjects: &BTreeMap<String, BTreeMap<String, SubjectSpec>>,
    ) -> ResolvedFaculty {
        let mut by_section: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for section in sections {
            let Some(table) = subjects.get(section) else {
                continue;
            };
            let entry = by_section.entry(section.clone()).or_default();
            for subject in table.keys() {
                let pinned = match self.assignments.get(subject) {
                    Some(FacultyAssignment::Single(f)) => Some(f.clone()),
                    Some(FacultyAssignment::Candidates(cs)) => cs.first().cloned(),
                    None => None,
                };
                if let Some(faculty) = pinned {
                    entry.insert(subject.clone(), faculty);
                }
            }
        }
        ResolvedFaculty { by_section }
    }
}

/// Per-run pinned faculty lookup: (section, subject) → faculty.
///
/// Built once at the start of a generation run and never mutated afterwards,
/// so every component observes the same pinning.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFaculty {
    by_section: BTreeMap<String, BTreeMap<String, String>>,
}

impl ResolvedFaculty {
    /// The pinned faculty for a (section, subject), if any.
    pub fn get(&self, section: &str, subject: &str) -> Option<&str> {
        self.by_section
            .get(section)?
            .get(subject)
            .map(String::as_str)
    }
}

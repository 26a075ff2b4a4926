//! Fixed and forbidden placements.
//!
//! Per section, a strict map pins (subject, slot) pairs before scheduling
//! begins, and a forbidden map lists slots a subject must never occupy. A
//! cell claimed by any strict placement is locked against every other
//! subject and against swaps; forbidden entries block only the named
//! subject.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::grid::Slot;

/// Subject → pinned or blocked slots.
pub type PlacementMap = BTreeMap<String, Vec<Slot>>;

/// One section's strict and forbidden placement sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConstraints {
    /// Subject → slots that must hold that subject.
    #[serde(default)]
    pub strict: PlacementMap,
    /// Subject → slots that subject must never occupy.
    #[serde(default)]
    pub forbidden: PlacementMap,
}

impl SectionConstraints {
    /// Creates an empty constraint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins a subject to the given slots.
    pub fn with_strict(mut self, subject: impl Into<String>, slots: Vec<Slot>) -> Self {
        self.strict.entry(subject.into()).or_default().extend(slots);
        self
    }

    /// Forbids a subject from the given slots.
    pub fn with_forbidden(mut self, subject: impl Into<String>, slots: Vec<Slot>) -> Self {
        self.forbidden
            .entry(subject.into())
            .or_default()
            .extend(slots);
        self
    }

    /// Whether any strict placement claims this cell.
    pub fn is_strict_cell(&self, slot: Slot) -> bool {
        self.strict.values().any(|slots| slots.contains(&slot))
    }

    /// All cells claimed by strict placements.
    pub fn strict_cells(&self) -> BTreeSet<Slot> {
        self.strict.values().flatten().copied().collect()
    }

    /// Whether the subject is forbidden at this cell.
    pub fn is_forbidden(&self, subject: &str, slot: Slot) -> bool {
        self.forbidden
            .get(subject)
            .is_some_and(|slots| slots.contains(&slot))
    }

    /// Whether a cell is unavailable: strict-claimed by anyone, or (when a
    /// subject is given) forbidden for that subject.
    pub fn is_blocked(&self, subject: Option<&str>, slot: Slot) -> bool {
        if self.is_strict_cell(slot) {
            return true;
        }
        subject.is_some_and(|s| self.is_forbidden(s, slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SectionConstraints {
        SectionConstraints::new()
            .with_strict("MATH", vec![Slot::new(1, 1), Slot::new(3, 2)])
            .with_forbidden("TG", vec![Slot::new(1, 1), Slot::new(2, 1)])
    }

    #[test]
    fn test_strict_cell_lookup() {
        let c = sample();
        assert!(c.is_strict_cell(Slot::new(1, 1)));
        assert!(c.is_strict_cell(Slot::new(3, 2)));
        assert!(!c.is_strict_cell(Slot::new(2, 2)));
        assert_eq!(c.strict_cells().len(), 2);
    }

    #[test]
    fn test_forbidden_is_per_subject() {
        let c = sample();
        assert!(c.is_forbidden("TG", Slot::new(2, 1)));
        assert!(!c.is_forbidden("MATH", Slot::new(2, 1)));
    }

    #[test]
    fn test_blocked_combines_both() {
        let c = sample();
        // Strict cell blocks everyone, with or without a subject.
        assert!(c.is_blocked(None, Slot::new(1, 1)));
        assert!(c.is_blocked(Some("ENGLISH"), Slot::new(1, 1)));
        // Forbidden cell blocks only the named subject.
        assert!(c.is_blocked(Some("TG"), Slot::new(2, 1)));
        assert!(!c.is_blocked(Some("ENGLISH"), Slot::new(2, 1)));
        assert!(!c.is_blocked(None, Slot::new(2, 1)));
    }
}

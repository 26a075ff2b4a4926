//! Subject descriptor.

use serde::{Deserialize, Serialize};

/// Per-section requirements for one subject.
///
/// `hours` is the exact weekly cell count the subject must reach. Labs are
/// placed only as contiguous same-day period pairs, so their hours must be
/// even. `last` subjects occupy the day's final two periods. `exclusive`
/// marks institution-wide common slots (assemblies, club periods) that must
/// never occupy the same day and period in two sections at once, regardless
/// of faculty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSpec {
    /// Required weekly teaching hours (= occupied cells).
    pub hours: u32,
    /// Whether this is a lab taught in 2-period blocks.
    #[serde(default)]
    pub lab: bool,
    /// Whether this subject must sit in the final two periods of a day.
    #[serde(default)]
    pub last: bool,
    /// Whether this subject is mutually exclusive with other exclusive
    /// subjects across all sections (slot exclusivity, not faculty).
    #[serde(default)]
    pub exclusive: bool,
}

impl SubjectSpec {
    /// Creates a plain theory subject.
    pub fn new(hours: u32) -> Self {
        Self {
            hours,
            lab: false,
            last: false,
            exclusive: false,
        }
    }

    /// Creates a lab subject (hours must be even; enforced at validation).
    pub fn lab(hours: u32) -> Self {
        Self {
            hours,
            lab: true,
            last: false,
            exclusive: false,
        }
    }

    /// Pins the subject to the final two periods of a day.
    pub fn with_last(mut self) -> Self {
        self.last = true;
        self
    }

    /// Marks the subject mutually exclusive across sections.
    ///
    /// Exclusive subjects live in the final double period, so this also
    /// sets `last`.
    pub fn with_exclusive(mut self) -> Self {
        self.exclusive = true;
        self.last = true;
        self
    }

    /// Cells one placement occupies: 2 for labs, 1 otherwise.
    #[inline]
    pub fn placement_span(&self) -> u32 {
        if self.lab {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theory_defaults() {
        let s = SubjectSpec::new(4);
        assert_eq!(s.hours, 4);
        assert!(!s.lab);
        assert!(!s.last);
        assert!(!s.exclusive);
        assert_eq!(s.placement_span(), 1);
    }

    #[test]
    fn test_lab_span() {
        let s = SubjectSpec::lab(4);
        assert!(s.lab);
        assert_eq!(s.placement_span(), 2);
    }

    #[test]
    fn test_exclusive_implies_last() {
        let s = SubjectSpec::lab(2).with_exclusive();
        assert!(s.exclusive);
        assert!(s.last);
    }

    #[test]
    fn test_serde_defaults() {
        // Flags may be omitted in serialized form
        let s: SubjectSpec = serde_json::from_str(r#"{"hours": 3}"#).unwrap();
        assert_eq!(s.hours, 3);
        assert!(!s.lab && !s.last && !s.exclusive);
    }
}

//! Input validation for timetable requests.
//!
//! Checks the structural integrity of a request before scheduling. A
//! failing check means the caller violated the input contract; scheduling
//! never starts on such input. Satisfiability is not checked here — an
//! over-constrained but well-formed request degrades gracefully inside the
//! engine instead.
//!
//! Detects:
//! - Empty or duplicate section lists
//! - Subject tables or constraints referencing unknown sections
//! - Sections without subjects
//! - Zero-hour subjects and labs with odd hours
//! - The reserved filler identifier declared as a real subject
//! - Empty faculty candidate lists
//! - Constraint slots off the grid
//! - Inconsistent break positions

use std::collections::BTreeSet;

use crate::models::{FacultyAssignment, TimetableRequest, NUM_PERIODS};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The section list is empty.
    NoSections,
    /// The same section appears twice.
    DuplicateSection,
    /// A section has no subject table (or an empty one).
    MissingSubjects,
    /// A subject table or constraint set names a section not in the list.
    UnknownSection,
    /// A subject requires zero hours.
    ZeroHours,
    /// A lab subject has an odd hour count.
    OddLabHours,
    /// The filler identifier is declared as a real subject, or is empty.
    ReservedFiller,
    /// A faculty candidate list is empty.
    EmptyCandidates,
    /// A strict or forbidden slot lies off the grid.
    SlotOutOfRange,
    /// Break positions do not split the day into three blocks.
    InvalidBreaks,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a timetable request.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with every detected issue.
pub fn validate_request(req: &TimetableRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if req.sections.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoSections,
            "request has no sections",
        ));
    }

    let mut seen = BTreeSet::new();
    for section in &req.sections {
        if !seen.insert(section.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSection,
                format!("duplicate section '{section}'"),
            ));
        }
    }

    for section in &req.sections {
        match req.section_subjects(section) {
            Some(table) if !table.is_empty() => {}
            _ => errors.push(ValidationError::new(
                ValidationErrorKind::MissingSubjects,
                format!("section '{section}' has no subjects"),
            )),
        }
    }

    for section in req.subjects.keys() {
        if !seen.contains(section.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownSection,
                format!("subject table references unknown section '{section}'"),
            ));
        }
    }
    for section in req.constraints.keys() {
        if !seen.contains(section.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownSection,
                format!("constraints reference unknown section '{section}'"),
            ));
        }
    }

    if req.filler_subject.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::ReservedFiller,
            "filler subject identifier is empty",
        ));
    }

    for (section, table) in &req.subjects {
        for (subject, spec) in table {
            if spec.hours == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ZeroHours,
                    format!("subject '{subject}' in section '{section}' requires zero hours"),
                ));
            }
            if spec.lab && spec.hours % 2 != 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OddLabHours,
                    format!(
                        "lab '{subject}' in section '{section}' has odd hours ({}); \
                         labs are placed in 2-period blocks",
                        spec.hours
                    ),
                ));
            }
            if *subject == req.filler_subject {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ReservedFiller,
                    format!(
                        "'{subject}' in section '{section}' collides with the reserved filler"
                    ),
                ));
            }
        }
    }

    for table in req.subjects.values() {
        for subject in table.keys() {
            if let Some(FacultyAssignment::Candidates(cs)) = req.faculty.get(subject) {
                if cs.is_empty() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::EmptyCandidates,
                        format!("subject '{subject}' has an empty faculty candidate list"),
                    ));
                }
            }
        }
    }

    for (section, constraints) in &req.constraints {
        let maps = [("strict", &constraints.strict), ("forbidden", &constraints.forbidden)];
        for (label, map) in maps {
            for (subject, slots) in map {
                for slot in slots {
                    if !slot.in_range() {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::SlotOutOfRange,
                            format!(
                                "{label} placement of '{subject}' in section '{section}' \
                                 at day {} period {} is off the grid",
                                slot.day, slot.period
                            ),
                        ));
                    }
                }
            }
        }
    }

    let breaks = &req.breaks;
    if breaks.after_first == 0
        || breaks.after_first >= breaks.after_lunch
        || breaks.after_lunch >= NUM_PERIODS
    {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidBreaks,
            format!(
                "breaks after periods {} and {} do not split the day",
                breaks.after_first, breaks.after_lunch
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

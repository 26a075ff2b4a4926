//! Timetabling domain models.
//!
//! Provides the core data types for describing a weekly scheduling problem
//! and its solution: the fixed day/period grid, subject descriptors, faculty
//! assignments, fixed/forbidden placement constraints, and the break layout
//! that reshapes placement legality.

mod breaks;
mod constraint;
mod faculty;
mod grid;
mod outcome;
mod request;
mod subject;

pub use breaks::BreakSchedule;
pub use constraint::{PlacementMap, SectionConstraints};
pub use faculty::{FacultyAssignment, FacultyRoster, ResolvedFaculty};
pub use grid::{Day, Period, Slot, Timetable, DAY_NAMES, NUM_DAYS, NUM_PERIODS};
pub use outcome::{SectionOutcome, TimetableSolution};
pub use request::TimetableRequest;
pub use subject::SubjectSpec;

//! Output audits.
//!
//! Pure re-validation of generated grids, used by the swap's tentative-state
//! check, the driver's final validation, and callers that want to confirm an
//! output independently. Running these against a successful solution always
//! passes.

use log::debug;
use std::collections::BTreeMap;

use crate::models::{
    BreakSchedule, Day, Period, ResolvedFaculty, SubjectSpec, Timetable, TimetableRequest,
    NUM_DAYS, NUM_PERIODS,
};

use super::RepeatRule;

/// Whether every lab's occupied cells partition into same-day adjacent
/// pairs, none straddling a break.
///
/// Structural only — hour completeness is not required, so this also holds
/// for half-finished grids mid-search.
pub fn lab_pairing_ok(
    grid: &Timetable,
    subjects: &BTreeMap<String, SubjectSpec>,
    breaks: &BreakSchedule,
) -> bool {
    for (subject, spec) in subjects {
        if !spec.lab {
            continue;
        }
        let positions: Vec<(Day, Period)> = grid
            .occupied()
            .filter(|(_, s)| s == subject)
            .map(|(slot, _)| (slot.day, slot.period))
            .collect();
        if positions.len() % 2 != 0 {
            debug!("lab {subject}: odd cell count {}", positions.len());
            return false;
        }
        for pair in positions.chunks(2) {
            let [(d1, p1), (d2, p2)] = pair else {
                return false;
            };
            if d1 != d2 || *p2 != p1 + 1 {
                debug!("lab {subject}: cells day {d1} P{p1} / day {d2} P{p2} not paired");
                return false;
            }
            if breaks.splits_pair(*p1) {
                debug!("lab {subject}: pair at day {d1} P{p1} straddles a break");
                return false;
            }
        }
    }
    true
}

/// Full lab integrity: even declared hours, exact cell count, and legal
/// pairing for every lab subject.
pub fn lab_integrity_ok(
    grid: &Timetable,
    subjects: &BTreeMap<String, SubjectSpec>,
    breaks: &BreakSchedule,
) -> bool {
    for (subject, spec) in subjects {
        if !spec.lab {
            continue;
        }
        if spec.hours % 2 != 0 {
            debug!("lab {subject}: odd hour requirement {}", spec.hours);
            return false;
        }
        let count = grid.count_of(subject);
        if count != spec.hours {
            debug!("lab {subject}: {count} cells placed, {} required", spec.hours);
            return false;
        }
    }
    lab_pairing_ok(grid, subjects, breaks)
}

/// Whether every non-lab subject respects the active repeat rule: at most
/// one cell per day, or exactly one break-straddling adjacent pair under
/// [`RepeatRule::PairAcrossBreak`]. The filler subject is exempt.
pub fn repeat_rule_ok(
    grid: &Timetable,
    subjects: &BTreeMap<String, SubjectSpec>,
    breaks: &BreakSchedule,
    rule: RepeatRule,
) -> bool {
    for (subject, spec) in subjects {
        if spec.lab {
            continue;
        }
        for day in 1..=NUM_DAYS {
            let periods = grid.periods_on_day(subject, day);
            let legal = match periods.as_slice() {
                [] | [_] => true,
                [a, b] => {
                    rule == RepeatRule::PairAcrossBreak && *b == a + 1 && breaks.splits_pair(*a)
                }
                _ => false,
            };
            if !legal {
                debug!("{subject}: illegal repeat on day {day} at {periods:?}");
                return false;
            }
        }
    }
    true
}

/// A faculty double-booking: two distinct teaching blocks of one faculty
/// member in the same or adjacent periods of one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacultyClash {
    /// The double-booked faculty member.
    pub faculty: String,
    /// Day of the clash.
    pub day: Day,
    /// First block's section and starting period.
    pub section_a: String,
    /// First block's starting period.
    pub period_a: Period,
    /// Second block's section.
    pub section_b: String,
    /// Second block's starting period.
    pub period_b: Period,
}

/// Scans all sections for faculty double-bookings.
///
/// Works at placement-unit granularity: a contiguous same-subject run in one
/// section (a lab pair, or a break-straddling theory pair) is a single
/// teaching block. Two distinct blocks of one faculty member clash when they
/// share a period (necessarily across sections) or touch in adjacent
/// periods anywhere.
pub fn faculty_clashes(
    grids: &BTreeMap<String, Timetable>,
    req: &TimetableRequest,
) -> Vec<FacultyClash> {
    let resolved = req.faculty.resolve(&req.sections, &req.subjects);
    faculty_clashes_with(grids, &resolved)
}

pub(crate) fn faculty_clashes_with(
    grids: &BTreeMap<String, Timetable>,
    resolved: &ResolvedFaculty,
) -> Vec<FacultyClash> {
    struct Unit<'a> {
        section: &'a str,
        day: Day,
        start: Period,
        end: Period,
        faculty: &'a str,
    }

    let mut units: Vec<Unit> = Vec::new();
    for (section, grid) in grids {
        for day in 1..=NUM_DAYS {
            let mut period = 1;
            while period <= NUM_PERIODS {
                let Some(subject) = grid.get(day, period) else {
                    period += 1;
                    continue;
                };
                let start = period;
                while period < NUM_PERIODS && grid.get(day, period + 1) == Some(subject) {
                    period += 1;
                }
                let end = period;
                period += 1;
                if let Some(faculty) = resolved.get(section, subject) {
                    units.push(Unit {
                        section: section.as_str(),
                        day,
                        start,
                        end,
                        faculty,
                    });
                }
            }
        }
    }

    let mut clashes = Vec::new();
    for i in 0..units.len() {
        for j in (i + 1)..units.len() {
            let (a, b) = (&units[i], &units[j]);
            if a.day != b.day || a.faculty != b.faculty {
                continue;
            }
            // Overlapping or back-to-back blocks.
            if a.start <= b.end + 1 && b.start <= a.end + 1 {
                clashes.push(FacultyClash {
                    faculty: a.faculty.to_string(),
                    day: a.day,
                    section_a: a.section.to_string(),
                    period_a: a.start,
                    section_b: b.section.to_string(),
                    period_b: b.start,
                });
            }
        }
    }
    clashes
}

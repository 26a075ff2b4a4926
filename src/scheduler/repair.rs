//! Iterative repair.
//!
//! Re-scans for subjects short of their hour targets and places them into
//! any legal free cell, skipping cells the loop has given up on. Progress is
//! tracked by hashing the grid; when the state is unchanged for
//! `stall_threshold` consecutive iterations the loop escalates: one forced
//! placement of the most-deficient subject, then a randomized unit swap,
//! then permanently marking one more cell as stuck — which guarantees the
//! loop runs out of cells to try and terminates well before the iteration
//! ceiling on unsatisfiable sections.

use log::{debug, trace};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::iter;

use crate::models::{
    ResolvedFaculty, Slot, SubjectSpec, Timetable, TimetableRequest, NUM_DAYS, NUM_PERIODS,
};

use super::index::FacultyIndex;
use super::predicates::{lab_start_ok, last_subject_blocked, nonlab_day_ok, nonlab_faculty_ok};
use super::swap::attempt_swap;
use super::EngineConfig;

fn incomplete_subjects<'a>(
    subjects: &'a BTreeMap<String, SubjectSpec>,
    grid: &Timetable,
) -> Vec<(&'a str, u32)> {
    subjects
        .iter()
        .filter_map(|(name, spec)| {
            let have = grid.count_of(name);
            (have < spec.hours).then(|| (name.as_str(), spec.hours - have))
        })
        .collect()
}

/// Drives a section's grid toward exact hour completion.
///
/// `others` holds the other sections' grids; the section's own grid is
/// always part of the faculty picture so in-section cool-down violations
/// cannot slip in during repair. Returns the final counters and whether
/// every subject reached its target.
pub(crate) fn optimize_section<R: Rng>(
    req: &TimetableRequest,
    cfg: &EngineConfig,
    resolved: &ResolvedFaculty,
    section: &str,
    grid: &mut Timetable,
    others: &BTreeMap<String, Timetable>,
    rng: &mut R,
) -> (BTreeMap<String, u32>, bool) {
    let Some(subjects) = req.section_subjects(section) else {
        return (BTreeMap::new(), false);
    };

    let mut stuck: BTreeSet<Slot> = BTreeSet::new();
    let mut stall = 0u32;
    let mut last_key = None;

    for iteration in 1..=cfg.max_iterations {
        if subjects
            .iter()
            .all(|(name, spec)| grid.count_of(name) == spec.hours)
        {
            debug!("section {section}: complete after {iteration} iterations");
            return (
                grid.counts_for(subjects.keys().map(String::as_str)),
                true,
            );
        }
        if iteration % 100 == 0 {
            trace!("section {section}: repair iteration {iteration}/{}", cfg.max_iterations);
        }

        for (subject, deficit) in incomplete_subjects(subjects, grid) {
            for _ in 0..deficit {
                if !place_avoiding_stuck(req, cfg, resolved, section, grid, others, subject, &stuck)
                {
                    break;
                }
            }
        }

        let key = grid.state_key();
        if last_key == Some(key) {
            stall += 1;
        } else {
            stall = 0;
            last_key = Some(key);
        }

        if stall >= cfg.stall_threshold {
            debug!("section {section}: no progress for {stall} iterations, escalating");
            let incomplete = incomplete_subjects(subjects, grid);
            let forced = incomplete
                .iter()
                .max_by_key(|(_, deficit)| *deficit)
                .is_some_and(|&(subject, _)| {
                    place_avoiding_stuck(
                        req, cfg, resolved, section, grid, others, subject, &stuck,
                    )
                });
            if forced {
                stall = 0;
                continue;
            }
            if attempt_swap(req, cfg, resolved, section, grid, others, rng) {
                stall = 0;
                continue;
            }
            if let Some(slot) = Slot::all().find(|s| !stuck.contains(s)) {
                debug!(
                    "section {section}: marking stuck cell day {} P{}",
                    slot.day, slot.period
                );
                stuck.insert(slot);
            }
            stall = 0;
        }
    }

    debug!("section {section}: repair ceiling reached");
    (
        grid.counts_for(subjects.keys().map(String::as_str)),
        false,
    )
}

/// One placement attempt for a single subject, skipping stuck and locked
/// cells. Labs walk the preferred start order; everything else scans the
/// grid in day/period order.
#[allow(clippy::too_many_arguments)]
fn place_avoiding_stuck(
    req: &TimetableRequest,
    cfg: &EngineConfig,
    resolved: &ResolvedFaculty,
    section: &str,
    grid: &mut Timetable,
    others: &BTreeMap<String, Timetable>,
    subject: &str,
    stuck: &BTreeSet<Slot>,
) -> bool {
    let Some(spec) = req.subject_spec(section, subject) else {
        return false;
    };
    let faculty = resolved.get(section, subject);
    let index = FacultyIndex::build(
        others
            .iter()
            .map(|(s, g)| (s.as_str(), g))
            .chain(iter::once((section, &*grid))),
        req,
        resolved,
    );

    if spec.lab {
        if spec.hours.saturating_sub(grid.count_of(subject)) < 2 {
            return false;
        }
        for day in 1..=NUM_DAYS {
            for &period in &req.breaks.lab_starts() {
                let start = Slot::new(day, period);
                let next = Slot::new(day, period + 1);
                if stuck.contains(&start) {
                    continue;
                }
                if req.is_blocked_cell(section, Some(subject), start)
                    || req.is_blocked_cell(section, Some(subject), next)
                {
                    continue;
                }
                if !lab_start_ok(grid, spec, day, period, &req.breaks) {
                    continue;
                }
                if (spec.last || spec.exclusive)
                    && last_subject_blocked(
                        req,
                        resolved,
                        others
                            .iter()
                            .map(|(s, g)| (s.as_str(), g))
                            .chain(iter::once((section, &*grid))),
                        section,
                        subject,
                        day,
                    )
                {
                    continue;
                }
                if let Some(f) = faculty {
                    if index.conflicts(f, day, period) || index.conflicts(f, day, period + 1) {
                        continue;
                    }
                }
                grid.set(day, period, Some(subject.to_string()));
                grid.set(day, period + 1, Some(subject.to_string()));
                return true;
            }
        }
    } else {
        for day in 1..=NUM_DAYS {
            for period in 1..=NUM_PERIODS {
                let slot = Slot::new(day, period);
                if stuck.contains(&slot) {
                    continue;
                }
                if !grid.is_free(day, period) {
                    continue;
                }
                if req.is_blocked_cell(section, Some(subject), slot) {
                    continue;
                }
                if spec.last && period < NUM_PERIODS - 1 {
                    continue;
                }
                if !nonlab_day_ok(grid, subject, day, period, &req.breaks, cfg.repeat_rule) {
                    continue;
                }
                if spec.last
                    && last_subject_blocked(
                        req,
                        resolved,
                        others
                            .iter()
                            .map(|(s, g)| (s.as_str(), g))
                            .chain(iter::once((section, &*grid))),
                        section,
                        subject,
                        day,
                    )
                {
                    continue;
                }
                if let Some(f) = faculty {
                    if !nonlab_faculty_ok(
                        &index,
                        f,
                        grid,
                        subject,
                        day,
                        period,
                        &req.breaks,
                        cfg.repeat_rule,
                    ) {
                        continue;
                    }
                }
                grid.set(day, period, Some(subject.to_string()));
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FacultyRoster;
    use crate::scheduler::RepeatRule;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn run(
        req: &TimetableRequest,
        section: &str,
        grid: &mut Timetable,
        seed: u64,
    ) -> (BTreeMap<String, u32>, bool) {
        let cfg = EngineConfig::default();
        let resolved = req.faculty.resolve(&req.sections, &req.subjects);
        let mut rng = SmallRng::seed_from_u64(seed);
        optimize_section(req, &cfg, &resolved, section, grid, &BTreeMap::new(), &mut rng)
    }

    #[test]
    fn test_completes_partial_grid() {
        let req = TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "MATH", SubjectSpec::new(4))
            .with_subject("A", "ENGLISH", SubjectSpec::new(3))
            .with_faculty(
                FacultyRoster::new()
                    .with_assignment("MATH", "Dr. Rao")
                    .with_assignment("ENGLISH", "Dr. Das"),
            );
        let mut grid = Timetable::empty();
        grid.set(1, 1, Some("MATH".into()));
        grid.set(2, 2, Some("ENGLISH".into()));

        let (counters, ok) = run(&req, "A", &mut grid, 42);
        assert!(ok);
        assert_eq!(counters["MATH"], 4);
        assert_eq!(counters["ENGLISH"], 3);
    }

    #[test]
    fn test_completes_lab_pairs() {
        let req = TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "CS_LAB", SubjectSpec::lab(4))
            .with_faculty(FacultyRoster::new().with_assignment("CS_LAB", "Dr. Iyer"));
        let mut grid = Timetable::empty();

        let (counters, ok) = run(&req, "A", &mut grid, 42);
        assert!(ok);
        assert_eq!(counters["CS_LAB"], 4);
        let subjects = req.section_subjects("A").unwrap();
        assert!(crate::scheduler::integrity::lab_pairing_ok(
            &grid,
            subjects,
            &req.breaks
        ));
    }

    #[test]
    fn test_unsatisfiable_terminates_with_failure() {
        // Six theory hours cannot fit under the strict once-per-day rule.
        let req = TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "MATH", SubjectSpec::new(6))
            .with_faculty(FacultyRoster::new().with_assignment("MATH", "Dr. Rao"));
        let cfg = EngineConfig::default().with_repeat_rule(RepeatRule::SingleDaily);
        let resolved = req.faculty.resolve(&req.sections, &req.subjects);
        let mut grid = Timetable::empty();
        let mut rng = SmallRng::seed_from_u64(42);

        let (counters, ok) =
            optimize_section(&req, &cfg, &resolved, "A", &mut grid, &BTreeMap::new(), &mut rng);
        assert!(!ok);
        assert_eq!(counters["MATH"], 5);
    }

    #[test]
    fn test_respects_cross_section_faculty() {
        // Dr. Shared already teaches B at (1,1) and (1,3); repair for A must
        // route MATH around those periods.
        let req = TimetableRequest::new(vec!["A".into(), "B".into()])
            .with_subject("A", "MATH", SubjectSpec::new(5))
            .with_subject("B", "STATS", SubjectSpec::new(2))
            .with_faculty(
                FacultyRoster::new()
                    .with_assignment("MATH", "Dr. Shared")
                    .with_assignment("STATS", "Dr. Shared"),
            );
        let cfg = EngineConfig::default();
        let resolved = req.faculty.resolve(&req.sections, &req.subjects);

        let mut b = Timetable::empty();
        b.set(1, 1, Some("STATS".into()));
        b.set(1, 3, Some("STATS".into()));
        let mut others = BTreeMap::new();
        others.insert("B".to_string(), b);

        let mut grid = Timetable::empty();
        let mut rng = SmallRng::seed_from_u64(42);
        let (counters, ok) =
            optimize_section(&req, &cfg, &resolved, "A", &mut grid, &others, &mut rng);
        assert!(ok);
        assert_eq!(counters["MATH"], 5);
        // Day 1 periods 1-4 are blocked by same/adjacent conflicts.
        assert_eq!(grid.periods_on_day("MATH", 1), vec![5]);
    }

    #[test]
    fn test_stuck_cells_do_not_hang() {
        // Everything forbidden: the loop must give up quickly, not spin.
        let forbidden: Vec<Slot> = Slot::all().collect();
        let req = TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "MATH", SubjectSpec::new(3))
            .with_constraints(
                "A",
                crate::models::SectionConstraints::new().with_forbidden("MATH", forbidden),
            );
        let mut grid = Timetable::empty();
        let (counters, ok) = run(&req, "A", &mut grid, 42);
        assert!(!ok);
        assert_eq!(counters["MATH"], 0);
    }
}

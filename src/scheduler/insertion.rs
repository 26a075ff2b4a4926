//! Initial greedy fill.
//!
//! Runs once per section in increasing day, then period order. Strict
//! placements go first and are validated immediately before commit; a strict
//! placement that cannot be honored is skipped with a warning and surfaces
//! later as an incomplete subject. The remaining cells are filled by one
//! left-to-right pass that re-shuffles the candidate subjects at every cell,
//! so ties break randomly — diversifying the search across global attempts
//! instead of reproducing the same stuck configuration.

use log::{trace, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::models::{
    ResolvedFaculty, Slot, Timetable, TimetableRequest, NUM_DAYS, NUM_PERIODS,
};

use super::index::FacultyIndex;
use super::predicates::{
    adjacency_ok, lab_start_ok, last_subject_blocked, nonlab_day_ok, nonlab_faculty_ok,
};
use super::EngineConfig;

/// Builds a section's initial grid against the already-placed sections.
pub(crate) fn insert_section<R: Rng>(
    req: &TimetableRequest,
    cfg: &EngineConfig,
    resolved: &ResolvedFaculty,
    section: &str,
    others: &BTreeMap<String, Timetable>,
    rng: &mut R,
) -> Timetable {
    let mut grid = Timetable::empty();
    let Some(subjects) = req.section_subjects(section) else {
        return grid;
    };
    let mut counters: BTreeMap<String, u32> =
        subjects.keys().map(|s| (s.clone(), 0)).collect();
    let mut index = FacultyIndex::build(
        others.iter().map(|(s, g)| (s.as_str(), g)),
        req,
        resolved,
    );

    // Phase 1: strict placements.
    if let Some(constraints) = req.constraints.get(section) {
        for (subject, slots) in &constraints.strict {
            let Some(spec) = subjects.get(subject) else {
                warn!("section {section}: strict placement names unknown subject {subject}");
                continue;
            };
            let faculty = resolved.get(section, subject);
            let span = spec.placement_span() as u8;
            for &Slot { day, period } in slots {
                if let Some(f) = faculty {
                    let clash = if spec.lab {
                        (0..span).any(|i| index.conflicts(f, day, period + i))
                    } else {
                        !nonlab_faculty_ok(
                            &index,
                            f,
                            &grid,
                            subject,
                            day,
                            period,
                            &req.breaks,
                            cfg.repeat_rule,
                        )
                    };
                    if clash {
                        warn!(
                            "section {section}: strict {subject} at day {day} P{period} \
                             skipped, faculty conflict"
                        );
                        continue;
                    }
                }
                if spec.lab {
                    if !lab_start_ok(&grid, spec, day, period, &req.breaks) {
                        warn!(
                            "section {section}: strict lab {subject} at day {day} P{period} \
                             skipped, illegal lab start"
                        );
                        continue;
                    }
                } else if !grid.is_free(day, period) {
                    warn!(
                        "section {section}: strict {subject} at day {day} P{period} \
                         skipped, cell occupied"
                    );
                    continue;
                }
                if (spec.last || spec.exclusive)
                    && last_subject_blocked(
                        req,
                        resolved,
                        others.iter().map(|(s, g)| (s.as_str(), g)),
                        section,
                        subject,
                        day,
                    )
                {
                    warn!(
                        "section {section}: strict {subject} at day {day} P{period} \
                         skipped, final-period overlap"
                    );
                    continue;
                }
                if !spec.lab
                    && !adjacency_ok(
                        &grid,
                        subject,
                        day,
                        period,
                        false,
                        &req.breaks,
                        cfg.repeat_rule,
                    )
                {
                    warn!(
                        "section {section}: strict {subject} at day {day} P{period} \
                         skipped, repeat rule"
                    );
                    continue;
                }

                for i in 0..span {
                    grid.set(day, period + i, Some(subject.clone()));
                    if let Some(f) = faculty {
                        index.record(day, period + i, f);
                    }
                }
                if let Some(c) = counters.get_mut(subject) {
                    *c += span as u32;
                }
                trace!("section {section}: strict {subject} placed at day {day} P{period}");
            }
        }
    }

    // Phase 2: greedy randomized fill of the remaining cells.
    let mut pool: Vec<&str> = subjects.keys().map(String::as_str).collect();
    for day in 1..=NUM_DAYS {
        for period in 1..=NUM_PERIODS {
            if !grid.is_free(day, period) {
                continue;
            }
            if req.is_blocked_cell(section, None, Slot::new(day, period)) {
                continue;
            }

            pool.shuffle(rng);
            for &subject in &pool {
                let spec = &subjects[subject];
                let have = counters[subject];
                if have >= spec.hours {
                    continue;
                }
                if req.is_blocked_cell(section, Some(subject), Slot::new(day, period)) {
                    continue;
                }
                let faculty = resolved.get(section, subject);

                if spec.lab {
                    if spec.hours - have < 2 {
                        continue;
                    }
                    if !lab_start_ok(&grid, spec, day, period, &req.breaks) {
                        continue;
                    }
                    if (spec.last || spec.exclusive)
                        && last_subject_blocked(
                            req,
                            resolved,
                            others.iter().map(|(s, g)| (s.as_str(), g)),
                            section,
                            subject,
                            day,
                        )
                    {
                        continue;
                    }
                    if let Some(f) = faculty {
                        if index.conflicts(f, day, period) || index.conflicts(f, day, period + 1)
                        {
                            continue;
                        }
                    }
                    grid.set(day, period, Some(subject.to_string()));
                    grid.set(day, period + 1, Some(subject.to_string()));
                    if let Some(f) = faculty {
                        index.record(day, period, f);
                        index.record(day, period + 1, f);
                    }
                    if let Some(c) = counters.get_mut(subject) {
                        *c += 2;
                    }
                    break;
                } else {
                    if spec.last && period < NUM_PERIODS - 1 {
                        continue;
                    }
                    if !nonlab_day_ok(&grid, subject, day, period, &req.breaks, cfg.repeat_rule)
                    {
                        continue;
                    }
                    if spec.last
                        && last_subject_blocked(
                            req,
                            resolved,
                            others.iter().map(|(s, g)| (s.as_str(), g)),
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
                            &grid,
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
                    if let Some(f) = faculty {
                        index.record(day, period, f);
                    }
                    if let Some(c) = counters.get_mut(subject) {
                        *c += 1;
                    }
                    break;
                }
            }
        }
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FacultyRoster, SectionConstraints, SubjectSpec};
    use crate::scheduler::RepeatRule;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn run(req: &TimetableRequest, section: &str, others: &BTreeMap<String, Timetable>) -> Timetable {
        let cfg = EngineConfig::default();
        let resolved = req.faculty.resolve(&req.sections, &req.subjects);
        let mut rng = SmallRng::seed_from_u64(42);
        insert_section(req, &cfg, &resolved, section, others, &mut rng)
    }

    #[test]
    fn test_single_subject_fills_once_per_day() {
        let req = TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "MATH", SubjectSpec::new(4))
            .with_faculty(FacultyRoster::new().with_assignment("MATH", "Dr. Rao"));
        let grid = run(&req, "A", &BTreeMap::new());

        assert_eq!(grid.count_of("MATH"), 4);
        for day in 1..=NUM_DAYS {
            assert!(grid.periods_on_day("MATH", day).len() <= 1);
        }
    }

    #[test]
    fn test_strict_placement_honored() {
        let req = TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "MATH", SubjectSpec::new(4))
            .with_subject("A", "ENGLISH", SubjectSpec::new(4))
            .with_constraints(
                "A",
                SectionConstraints::new().with_strict("MATH", vec![Slot::new(1, 1)]),
            );
        let grid = run(&req, "A", &BTreeMap::new());
        assert_eq!(grid.get(1, 1), Some("MATH"));
    }

    #[test]
    fn test_forbidden_cells_respected() {
        let forbidden: Vec<Slot> = (1..=NUM_DAYS).map(|d| Slot::new(d, 1)).collect();
        let req = TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "TG", SubjectSpec::new(5))
            .with_constraints(
                "A",
                SectionConstraints::new().with_forbidden("TG", forbidden),
            );
        let grid = run(&req, "A", &BTreeMap::new());
        for day in 1..=NUM_DAYS {
            assert_ne!(grid.get(day, 1), Some("TG"));
        }
    }

    #[test]
    fn test_labs_placed_in_pairs() {
        let req = TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "CS_LAB", SubjectSpec::lab(4))
            .with_faculty(FacultyRoster::new().with_assignment("CS_LAB", "Dr. Iyer"));
        let grid = run(&req, "A", &BTreeMap::new());

        assert_eq!(grid.count_of("CS_LAB"), 4);
        let subjects = req.section_subjects("A").unwrap();
        assert!(crate::scheduler::integrity::lab_pairing_ok(
            &grid,
            subjects,
            &req.breaks
        ));
    }

    #[test]
    fn test_conflicting_strict_cross_section_is_skipped() {
        let req = TimetableRequest::new(vec!["A".into(), "B".into()])
            .with_subject("A", "MATH_A", SubjectSpec::new(4))
            .with_subject("B", "MATH_B", SubjectSpec::new(4))
            .with_faculty(
                FacultyRoster::new()
                    .with_assignment("MATH_A", "Dr. Shared")
                    .with_assignment("MATH_B", "Dr. Shared"),
            )
            .with_constraints(
                "A",
                SectionConstraints::new().with_strict("MATH_A", vec![Slot::new(1, 1)]),
            )
            .with_constraints(
                "B",
                SectionConstraints::new().with_strict("MATH_B", vec![Slot::new(1, 1)]),
            );

        let a_grid = run(&req, "A", &BTreeMap::new());
        assert_eq!(a_grid.get(1, 1), Some("MATH_A"));

        let mut others = BTreeMap::new();
        others.insert("A".to_string(), a_grid);
        let b_grid = run(&req, "B", &others);
        // B's strict cell stays locked but unfilled once the placement fails.
        assert_eq!(b_grid.get(1, 1), None);
    }

    #[test]
    fn test_exclusive_subjects_never_share_a_day_slot() {
        let req = TimetableRequest::new(vec!["A".into(), "B".into()])
            .with_subject("A", "MC1", SubjectSpec::lab(2).with_exclusive())
            .with_subject("B", "MC2", SubjectSpec::lab(2).with_exclusive());

        let a_grid = run(&req, "A", &BTreeMap::new());
        let mut others = BTreeMap::new();
        others.insert("A".to_string(), a_grid.clone());
        let b_grid = run(&req, "B", &others);

        for day in 1..=NUM_DAYS {
            let a_has = a_grid.get(day, 6) == Some("MC1");
            let b_has = b_grid.get(day, 6) == Some("MC2");
            assert!(!(a_has && b_has), "exclusive overlap on day {day}");
        }
    }

    #[test]
    fn test_high_hours_need_break_pairs() {
        // 6 theory hours only fit by doubling up across breaks.
        let req = TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "MATH", SubjectSpec::new(6))
            .with_faculty(FacultyRoster::new().with_assignment("MATH", "Dr. Rao"));
        let cfg = EngineConfig::default(); // PairAcrossBreak
        let resolved = req.faculty.resolve(&req.sections, &req.subjects);
        let mut rng = SmallRng::seed_from_u64(7);
        let grid = insert_section(&req, &cfg, &resolved, "A", &BTreeMap::new(), &mut rng);

        for day in 1..=NUM_DAYS {
            let periods = grid.periods_on_day("MATH", day);
            assert!(periods.len() <= 2);
            if let [a, b] = periods.as_slice() {
                assert_eq!(*b, *a + 1);
                assert!(req.breaks.splits_pair(*a));
            }
        }

        // Under the strict rule the same request caps at one per day.
        let cfg = EngineConfig::default().with_repeat_rule(RepeatRule::SingleDaily);
        let mut rng = SmallRng::seed_from_u64(7);
        let grid = insert_section(&req, &cfg, &resolved, "A", &BTreeMap::new(), &mut rng);
        assert_eq!(grid.count_of("MATH"), 5);
    }
}

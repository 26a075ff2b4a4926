//! Pure placement predicates.
//!
//! Every check here is side-effect-free; grids change only at the explicit
//! commit points in insertion, repair, and swap. A placement is legal when
//! it clears the whole chain: cell lock, day quota/adjacency, lab start
//! rules, faculty conflict, and last-subject overlap.

use crate::models::{
    BreakSchedule, Day, Period, ResolvedFaculty, SubjectSpec, Timetable, TimetableRequest,
    NUM_PERIODS,
};

use super::index::FacultyIndex;
use super::RepeatRule;

/// Whether placing a subject at (day, period) respects the adjacency part
/// of the repeat rule.
///
/// Labs always pass — their 2-period block is the designed shape. A non-lab
/// may not sit next to itself unless the policy is
/// [`RepeatRule::PairAcrossBreak`] and a break separates the pair.
pub(crate) fn adjacency_ok(
    grid: &Timetable,
    subject: &str,
    day: Day,
    period: Period,
    is_lab: bool,
    breaks: &BreakSchedule,
    rule: RepeatRule,
) -> bool {
    if is_lab {
        return true;
    }
    if period > 1
        && grid.get(day, period - 1) == Some(subject)
        && !(rule == RepeatRule::PairAcrossBreak && breaks.splits_pair(period - 1))
    {
        return false;
    }
    if period < NUM_PERIODS
        && grid.get(day, period + 1) == Some(subject)
        && !(rule == RepeatRule::PairAcrossBreak && breaks.splits_pair(period))
    {
        return false;
    }
    true
}

/// Whether a non-lab subject may take another cell on this day.
///
/// First occurrence is always fine. Under [`RepeatRule::PairAcrossBreak`] a
/// second occurrence is allowed only when it completes an adjacent pair
/// straddling a break; a third never is.
pub(crate) fn nonlab_day_ok(
    grid: &Timetable,
    subject: &str,
    day: Day,
    period: Period,
    breaks: &BreakSchedule,
    rule: RepeatRule,
) -> bool {
    let existing = grid.periods_on_day(subject, day);
    match existing.as_slice() {
        [] => true,
        [p0] if rule == RepeatRule::PairAcrossBreak => {
            let (lo, hi) = if *p0 < period {
                (*p0, period)
            } else {
                (period, *p0)
            };
            hi == lo + 1 && breaks.splits_pair(lo)
        }
        _ => false,
    }
}

/// Whether a 2-period lab may start at (day, period): room for both cells,
/// no break between them, `last` labs pinned to the pre-final start, both
/// target cells free.
pub(crate) fn lab_start_ok(
    grid: &Timetable,
    spec: &SubjectSpec,
    day: Day,
    period: Period,
    breaks: &BreakSchedule,
) -> bool {
    if period >= NUM_PERIODS {
        return false;
    }
    if spec.last && period != NUM_PERIODS - 1 {
        return false;
    }
    if !breaks.valid_lab_start(period) {
        return false;
    }
    grid.is_free(day, period) && grid.is_free(day, period + 1)
}

/// Whether a faculty member is free to take (day, period) for the given
/// non-lab placement.
///
/// Busy at the same period anywhere is always a conflict. Busy at an
/// adjacent period is a conflict unless that neighbor is this section's own
/// cell holding the same subject across a break — completing a legal break
/// pair extends the existing teaching block rather than scheduling a second
/// one, exactly as a lab's two periods count as one block.
pub(crate) fn nonlab_faculty_ok(
    index: &FacultyIndex,
    faculty: &str,
    grid: &Timetable,
    subject: &str,
    day: Day,
    period: Period,
    breaks: &BreakSchedule,
    rule: RepeatRule,
) -> bool {
    if index.is_busy(faculty, day, period) {
        return false;
    }
    let own_pair = |neighbor: Period, pair_lo: Period| {
        rule == RepeatRule::PairAcrossBreak
            && grid.get(day, neighbor) == Some(subject)
            && breaks.splits_pair(pair_lo)
    };
    if period > 1 && index.is_busy(faculty, day, period - 1) && !own_pair(period - 1, period - 1)
    {
        return false;
    }
    if period < NUM_PERIODS
        && index.is_busy(faculty, day, period + 1)
        && !own_pair(period + 1, period)
    {
        return false;
    }
    true
}

/// Whether a `last` subject is blocked from this day's final double period
/// by another section.
///
/// Exclusive subjects block on *any* exclusive subject occupying the final
/// two periods of that day in any section, faculty ignored — the rule is
/// slot exclusivity. Plain `last` subjects block only on a same-faculty
/// `last` occupant.
pub(crate) fn last_subject_blocked<'a, I>(
    req: &TimetableRequest,
    resolved: &ResolvedFaculty,
    grids: I,
    section: &str,
    subject: &str,
    day: Day,
) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a Timetable)>,
{
    let Some(spec) = req.subject_spec(section, subject) else {
        return false;
    };
    if !spec.last && !spec.exclusive {
        return false;
    }
    let final_periods = [NUM_PERIODS - 1, NUM_PERIODS];

    if spec.exclusive {
        for (other_section, grid) in grids {
            for p in final_periods {
                if let Some(other) = grid.get(day, p) {
                    if req
                        .subject_spec(other_section, other)
                        .is_some_and(|s| s.exclusive)
                    {
                        return true;
                    }
                }
            }
        }
        return false;
    }

    let Some(faculty) = resolved.get(section, subject) else {
        return false;
    };
    for (other_section, grid) in grids {
        for p in final_periods {
            if let Some(other) = grid.get(day, p) {
                if req
                    .subject_spec(other_section, other)
                    .is_some_and(|s| s.last)
                    && resolved.get(other_section, other) == Some(faculty)
                {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FacultyRoster, SubjectSpec};

    fn breaks() -> BreakSchedule {
        BreakSchedule::default() // after P2 and P4
    }

    #[test]
    fn test_adjacency_strict_rule() {
        let mut grid = Timetable::empty();
        grid.set(1, 2, Some("MATH".into()));

        // SingleDaily: adjacent repeat blocked on both sides, even across a break.
        let rule = RepeatRule::SingleDaily;
        assert!(!adjacency_ok(&grid, "MATH", 1, 1, false, &breaks(), rule));
        assert!(!adjacency_ok(&grid, "MATH", 1, 3, false, &breaks(), rule));
        assert!(adjacency_ok(&grid, "MATH", 1, 4, false, &breaks(), rule));
        // A different subject next door is irrelevant.
        assert!(adjacency_ok(&grid, "ENGLISH", 1, 3, false, &breaks(), rule));
    }

    #[test]
    fn test_adjacency_break_pair_rule() {
        let mut grid = Timetable::empty();
        grid.set(1, 2, Some("MATH".into()));

        let rule = RepeatRule::PairAcrossBreak;
        // P2-P3 straddles the first break: allowed. P1-P2 does not.
        assert!(adjacency_ok(&grid, "MATH", 1, 3, false, &breaks(), rule));
        assert!(!adjacency_ok(&grid, "MATH", 1, 1, false, &breaks(), rule));
    }

    #[test]
    fn test_adjacency_labs_exempt() {
        let mut grid = Timetable::empty();
        grid.set(1, 3, Some("CS_LAB".into()));
        assert!(adjacency_ok(
            &grid,
            "CS_LAB",
            1,
            4,
            true,
            &breaks(),
            RepeatRule::SingleDaily
        ));
    }

    #[test]
    fn test_day_quota_single() {
        let mut grid = Timetable::empty();
        assert!(nonlab_day_ok(&grid, "MATH", 1, 5, &breaks(), RepeatRule::SingleDaily));
        grid.set(1, 1, Some("MATH".into()));
        // Any second occurrence blocked under SingleDaily.
        assert!(!nonlab_day_ok(&grid, "MATH", 1, 5, &breaks(), RepeatRule::SingleDaily));
    }

    #[test]
    fn test_day_quota_break_pair() {
        let rule = RepeatRule::PairAcrossBreak;
        let mut grid = Timetable::empty();
        grid.set(1, 4, Some("MATH".into()));

        // Completing the P4-P5 pair across lunch is the only legal repeat.
        assert!(nonlab_day_ok(&grid, "MATH", 1, 5, &breaks(), rule));
        assert!(!nonlab_day_ok(&grid, "MATH", 1, 3, &breaks(), rule));
        assert!(!nonlab_day_ok(&grid, "MATH", 1, 7, &breaks(), rule));

        // Never a third occurrence.
        grid.set(1, 5, Some("MATH".into()));
        assert!(!nonlab_day_ok(&grid, "MATH", 1, 2, &breaks(), rule));
    }

    #[test]
    fn test_lab_start_rules() {
        let grid = Timetable::empty();
        let lab = SubjectSpec::lab(4);

        assert!(lab_start_ok(&grid, &lab, 1, 1, &breaks()));
        assert!(lab_start_ok(&grid, &lab, 1, 3, &breaks()));
        // Break boundaries and the final period are out.
        assert!(!lab_start_ok(&grid, &lab, 1, 2, &breaks()));
        assert!(!lab_start_ok(&grid, &lab, 1, 4, &breaks()));
        assert!(!lab_start_ok(&grid, &lab, 1, 7, &breaks()));
    }

    #[test]
    fn test_lab_start_occupancy() {
        let mut grid = Timetable::empty();
        grid.set(1, 6, Some("MATH".into()));
        let lab = SubjectSpec::lab(2);
        // Second cell occupied.
        assert!(!lab_start_ok(&grid, &lab, 1, 5, &breaks()));
        assert!(lab_start_ok(&grid, &lab, 2, 5, &breaks()));
    }

    #[test]
    fn test_last_lab_pinned_to_prefinal() {
        let grid = Timetable::empty();
        let last_lab = SubjectSpec::lab(2).with_last();
        assert!(lab_start_ok(&grid, &last_lab, 1, 6, &breaks()));
        assert!(!lab_start_ok(&grid, &last_lab, 1, 3, &breaks()));
    }

    #[test]
    fn test_faculty_cooldown_blocks_adjacent() {
        let mut index = FacultyIndex::default();
        index.record(1, 3, "Dr. Rao");
        let grid = Timetable::empty();

        let rule = RepeatRule::PairAcrossBreak;
        assert!(!nonlab_faculty_ok(&index, "Dr. Rao", &grid, "MATH", 1, 3, &breaks(), rule));
        assert!(!nonlab_faculty_ok(&index, "Dr. Rao", &grid, "MATH", 1, 2, &breaks(), rule));
        assert!(!nonlab_faculty_ok(&index, "Dr. Rao", &grid, "MATH", 1, 4, &breaks(), rule));
        assert!(nonlab_faculty_ok(&index, "Dr. Rao", &grid, "MATH", 1, 5, &breaks(), rule));
        assert!(nonlab_faculty_ok(&index, "Dr. Iyer", &grid, "MATH", 1, 3, &breaks(), rule));
    }

    #[test]
    fn test_faculty_cooldown_exempts_own_break_pair() {
        // MATH (Dr. Rao) sits at P2; completing the P2-P3 pair across the
        // break is one teaching block, not a double booking.
        let mut index = FacultyIndex::default();
        index.record(1, 2, "Dr. Rao");
        let mut grid = Timetable::empty();
        grid.set(1, 2, Some("MATH".into()));

        assert!(nonlab_faculty_ok(
            &index,
            "Dr. Rao",
            &grid,
            "MATH",
            1,
            3,
            &breaks(),
            RepeatRule::PairAcrossBreak
        ));
        // A different subject of the same faculty is still a conflict.
        assert!(!nonlab_faculty_ok(
            &index,
            "Dr. Rao",
            &grid,
            "STATS",
            1,
            3,
            &breaks(),
            RepeatRule::PairAcrossBreak
        ));
        // Under the strict rule there is no pair to complete.
        assert!(!nonlab_faculty_ok(
            &index,
            "Dr. Rao",
            &grid,
            "MATH",
            1,
            3,
            &breaks(),
            RepeatRule::SingleDaily
        ));
        // No exemption off the break boundary.
        let mut index = FacultyIndex::default();
        index.record(1, 5, "Dr. Rao");
        let mut grid = Timetable::empty();
        grid.set(1, 5, Some("MATH".into()));
        assert!(!nonlab_faculty_ok(
            &index,
            "Dr. Rao",
            &grid,
            "MATH",
            1,
            6,
            &breaks(),
            RepeatRule::PairAcrossBreak
        ));
    }

    fn two_section_request() -> (TimetableRequest, ResolvedFaculty) {
        let req = TimetableRequest::new(vec!["A".into(), "B".into()])
            .with_subject("A", "MC1", SubjectSpec::lab(2).with_exclusive())
            .with_subject("A", "SPORTS", SubjectSpec::lab(2).with_last())
            .with_subject("B", "MC2", SubjectSpec::lab(2).with_exclusive())
            .with_subject("B", "CLUB", SubjectSpec::lab(2).with_last())
            .with_faculty(
                FacultyRoster::new()
                    .with_assignment("SPORTS", "Coach")
                    .with_assignment("CLUB", "Coach")
                    .with_assignment("MC1", "Dr. A")
                    .with_assignment("MC2", "Dr. B"),
            );
        let resolved = req.faculty.resolve(&req.sections, &req.subjects);
        (req, resolved)
    }

    #[test]
    fn test_exclusive_blocks_regardless_of_faculty() {
        let (req, resolved) = two_section_request();
        let mut b_grid = Timetable::empty();
        b_grid.set(1, 6, Some("MC2".into()));
        b_grid.set(1, 7, Some("MC2".into()));

        // MC1 and MC2 have different faculty, but exclusivity is about the slot.
        assert!(last_subject_blocked(
            &req,
            &resolved,
            [("B", &b_grid)],
            "A",
            "MC1",
            1
        ));
        assert!(!last_subject_blocked(
            &req,
            &resolved,
            [("B", &b_grid)],
            "A",
            "MC1",
            2
        ));
    }

    #[test]
    fn test_plain_last_blocks_on_shared_faculty_only() {
        let (req, resolved) = two_section_request();
        let mut b_grid = Timetable::empty();
        b_grid.set(3, 6, Some("CLUB".into()));
        b_grid.set(3, 7, Some("CLUB".into()));

        // SPORTS shares "Coach" with CLUB: blocked that day.
        assert!(last_subject_blocked(
            &req,
            &resolved,
            [("B", &b_grid)],
            "A",
            "SPORTS",
            3
        ));
        // MC1 checks the exclusive set only, and CLUB is not in it.
        assert!(!last_subject_blocked(
            &req,
            &resolved,
            [("B", &b_grid)],
            "A",
            "MC1",
            3
        ));
    }
}

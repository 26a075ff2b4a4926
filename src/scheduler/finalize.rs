//! Final per-day cleanup: duplicate removal and filler backfill.
//!
//! Runs after a section's search settles. Pass 1 removes repeat occurrences
//! of non-lab subjects that the active repeat rule does not legitimize
//! (labs and the filler are exempt, locked cells are never touched). Pass 2
//! fills empty cells in the day's final three periods with the filler
//! subject, up to a per-day cap counting filler already present. Callers
//! recount hours afterwards; cells the cap leaves empty surface as a
//! validation failure.

use log::debug;
use std::collections::BTreeMap;

use crate::models::{Period, Slot, Timetable, TimetableRequest, NUM_DAYS, NUM_PERIODS};

use super::{EngineConfig, RepeatRule};

/// Applies both cleanup passes to a section's grid.
pub(crate) fn finalize_section(
    req: &TimetableRequest,
    cfg: &EngineConfig,
    section: &str,
    grid: &mut Timetable,
) {
    let Some(subjects) = req.section_subjects(section) else {
        return;
    };
    let locked = req.strict_cells(section);

    for day in 1..=NUM_DAYS {
        // Pass 1: drop illegal repeats, keeping the earliest occurrences.
        let cells: Vec<Option<String>> = (1..=NUM_PERIODS)
            .map(|p| grid.get(day, p).map(String::from))
            .collect();
        let mut kept: BTreeMap<&str, Vec<Period>> = BTreeMap::new();
        for (i, cell) in cells.iter().enumerate() {
            let period = i as Period + 1;
            let Some(subject) = cell.as_deref() else {
                continue;
            };
            if subject == req.filler_subject {
                continue;
            }
            let Some(spec) = subjects.get(subject) else {
                continue;
            };
            if spec.lab {
                continue;
            }
            let occurrences = kept.entry(subject).or_default();
            if locked.contains(&Slot::new(day, period)) {
                occurrences.push(period);
                continue;
            }
            let keep = match occurrences.as_slice() {
                [] => true,
                [p0] => {
                    cfg.repeat_rule == RepeatRule::PairAcrossBreak
                        && period == p0 + 1
                        && req.breaks.splits_pair(*p0)
                }
                _ => false,
            };
            if keep {
                occurrences.push(period);
            } else {
                debug!("section {section}: dropping duplicate {subject} at day {day} P{period}");
                grid.set(day, period, None);
            }
        }

        // Pass 2: capped filler backfill in the trailing window.
        let window_start = NUM_PERIODS - 2;
        let mut filler_count = (window_start..=NUM_PERIODS)
            .filter(|&p| grid.get(day, p) == Some(req.filler_subject.as_str()))
            .count();
        for period in window_start..=NUM_PERIODS {
            if filler_count >= cfg.max_filler_per_day {
                break;
            }
            if grid.is_free(day, period) && !locked.contains(&Slot::new(day, period)) {
                grid.set(day, period, Some(req.filler_subject.clone()));
                filler_count += 1;
            }
        }
    }
}

/// Fills every remaining empty cell with the filler subject, cap ignored.
/// The driver's last resort once the attempt ceiling is exhausted.
pub(crate) fn force_fill(grid: &mut Timetable, filler: &str) {
    for slot in Slot::all() {
        if grid.is_free(slot.day, slot.period) {
            grid.set(slot.day, slot.period, Some(filler.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SectionConstraints, SubjectSpec};

    fn sample_request() -> TimetableRequest {
        TimetableRequest::new(vec!["A".into()])
            .with_subject("A", "OS", SubjectSpec::new(4))
            .with_subject("A", "MATH", SubjectSpec::new(4))
            .with_subject("A", "JAVA", SubjectSpec::new(4))
            .with_subject("A", "CS_LAB", SubjectSpec::lab(4))
    }

    #[test]
    fn test_scattered_duplicates_removed() {
        let req = sample_request();
        let cfg = EngineConfig::default();
        let mut grid = Timetable::empty();
        // OS scattered at P2 and P5 (not a break pair), MATH once.
        grid.set(1, 1, Some("MATH".into()));
        grid.set(1, 2, Some("OS".into()));
        grid.set(1, 5, Some("OS".into()));

        finalize_section(&req, &cfg, "A", &mut grid);

        assert_eq!(grid.get(1, 2), Some("OS"));
        // Second occurrence removed, vacated cell backfilled by pass 2.
        assert_eq!(grid.get(1, 5), Some("REMEDIAL"));
        assert_eq!(grid.count_of("OS"), 1);
    }

    #[test]
    fn test_break_pair_survives_under_pair_rule() {
        let req = sample_request();
        let cfg = EngineConfig::default(); // PairAcrossBreak
        let mut grid = Timetable::empty();
        grid.set(1, 4, Some("MATH".into()));
        grid.set(1, 5, Some("MATH".into()));

        finalize_section(&req, &cfg, "A", &mut grid);
        assert_eq!(grid.count_of("MATH"), 2);

        // The strict rule removes the same pair.
        let cfg = EngineConfig::default().with_repeat_rule(RepeatRule::SingleDaily);
        let mut grid = Timetable::empty();
        grid.set(1, 4, Some("MATH".into()));
        grid.set(1, 5, Some("MATH".into()));
        finalize_section(&req, &cfg, "A", &mut grid);
        assert_eq!(grid.count_of("MATH"), 1);
        assert_eq!(grid.get(1, 4), Some("MATH"));
    }

    #[test]
    fn test_labs_exempt_from_dedup() {
        let req = sample_request();
        let cfg = EngineConfig::default();
        let mut grid = Timetable::empty();
        grid.set(2, 5, Some("CS_LAB".into()));
        grid.set(2, 6, Some("CS_LAB".into()));

        finalize_section(&req, &cfg, "A", &mut grid);
        assert_eq!(grid.count_of("CS_LAB"), 2);
    }

    #[test]
    fn test_backfill_caps_per_day() {
        let req = sample_request();
        let cfg = EngineConfig::default();
        let mut grid = Timetable::empty();
        // Whole grid empty: only P5-P7 get filler, exactly 3 per day.
        finalize_section(&req, &cfg, "A", &mut grid);

        for day in 1..=NUM_DAYS {
            for period in 1..=4 {
                assert!(grid.is_free(day, period));
            }
            for period in 5..=7 {
                assert_eq!(grid.get(day, period), Some("REMEDIAL"));
            }
        }
    }

    #[test]
    fn test_existing_filler_counts_toward_cap() {
        let req = sample_request();
        let cfg = EngineConfig {
            max_filler_per_day: 2,
            ..EngineConfig::default()
        };
        let mut grid = Timetable::empty();
        grid.set(1, 7, Some("REMEDIAL".into()));

        finalize_section(&req, &cfg, "A", &mut grid);
        // One pre-existing + one backfilled = cap of two; P6 stays empty.
        assert_eq!(grid.get(1, 5), Some("REMEDIAL"));
        assert!(grid.is_free(1, 6));
    }

    #[test]
    fn test_locked_cells_untouched() {
        let req = sample_request().with_constraints(
            "A",
            SectionConstraints::new().with_strict("OS", vec![Slot::new(1, 6)]),
        );
        let cfg = EngineConfig::default();
        let mut grid = Timetable::empty();
        grid.set(1, 2, Some("OS".into()));
        grid.set(1, 6, Some("OS".into()));

        finalize_section(&req, &cfg, "A", &mut grid);
        // The locked occurrence survives; the unlocked earlier one came
        // first in scan order and is kept as the day's occurrence, making
        // the locked cell the tracked duplicate — which is never removed.
        assert_eq!(grid.get(1, 6), Some("OS"));
    }

    #[test]
    fn test_force_fill_leaves_nothing_empty() {
        let mut grid = Timetable::empty();
        grid.set(3, 3, Some("MATH".into()));
        force_fill(&mut grid, "REMEDIAL");
        assert_eq!(grid.empty_cells(), 0);
        assert_eq!(grid.get(3, 3), Some("MATH"));
        assert_eq!(grid.count_of("REMEDIAL"), 34);
    }
}

//! Multi-section driver.
//!
//! Sections are processed in request order: insert, then optimize. A later
//! section's placements can claim faculty an earlier section was counting
//! on, so after each section every earlier one is recounted and, if broken,
//! re-optimized in place against the current cross-section state. Once all
//! sections are placed they are finalized (duplicate removal + capped
//! filler backfill) and validated: exact hour completion, zero empty cells,
//! intact lab pairing. The first fully valid attempt wins; otherwise the
//! whole pass restarts from scratch up to the attempt ceiling, after which
//! the least-deficient attempt is returned best-effort with its empty cells
//! force-filled and `success = false`.

use log::{debug, info, warn};
use rand::Rng;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{
    SectionOutcome, Timetable, TimetableRequest, TimetableSolution, NUM_DAYS, NUM_PERIODS,
};
use crate::validation::{validate_request, ValidationError};

use super::finalize::{finalize_section, force_fill};
use super::insertion::insert_section;
use super::integrity::lab_integrity_ok;
use super::repair::optimize_section;
use super::EngineConfig;

/// Caller contract violations. Anything else — an unsatisfiable but
/// well-formed problem — degrades to a best-effort solution instead of
/// erroring.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The request failed structural validation.
    #[error("invalid scheduling input: {0:?}")]
    InvalidInput(Vec<ValidationError>),
    /// A section name is not part of the request.
    #[error("unknown section: {0}")]
    UnknownSection(String),
}

/// Generates timetables for every section in the request.
///
/// All randomness comes from `rng`; a seeded generator reproduces the run
/// exactly. Returns a best-effort solution with `success = false` when the
/// attempt ceiling is exhausted, and an error only on invalid input.
pub fn generate_timetables<R: Rng>(
    req: &TimetableRequest,
    cfg: &EngineConfig,
    rng: &mut R,
) -> Result<TimetableSolution, ScheduleError> {
    validate_request(req).map_err(ScheduleError::InvalidInput)?;
    let resolved = req.faculty.resolve(&req.sections, &req.subjects);

    let capacity = NUM_DAYS as u32 * NUM_PERIODS as u32;
    for (section, table) in &req.subjects {
        let total: u32 = table.values().map(|s| s.hours).sum();
        if total > capacity {
            warn!("section {section}: {total} required hours exceed the {capacity}-cell grid");
        }
    }

    let attempts = cfg.max_attempts.max(1);
    let mut best: Option<(u64, BTreeMap<String, Timetable>)> = None;

    for attempt in 1..=attempts {
        debug!("global attempt {attempt}/{attempts}");
        let mut grids: BTreeMap<String, Timetable> = BTreeMap::new();

        for (pos, section) in req.sections.iter().enumerate() {
            let mut grid = insert_section(req, cfg, &resolved, section, &grids, rng);
            let (_, ok) = optimize_section(req, cfg, &resolved, section, &mut grid, &grids, rng);
            if !ok {
                debug!("section {section}: incomplete after optimization");
            }
            grids.insert(section.clone(), grid);

            for prev in &req.sections[..pos] {
                let intact = grids
                    .get(prev)
                    .is_some_and(|g| section_complete(req, prev, g));
                if intact {
                    continue;
                }
                debug!("section {prev}: invalidated by {section}, re-optimizing");
                if let Some(mut prev_grid) = grids.remove(prev) {
                    optimize_section(req, cfg, &resolved, prev, &mut prev_grid, &grids, rng);
                    grids.insert(prev.clone(), prev_grid);
                }
            }
        }

        for (section, grid) in grids.iter_mut() {
            finalize_section(req, cfg, section, grid);
        }

        if validates(req, &grids) {
            info!("all sections valid on attempt {attempt}");
            return Ok(build_solution(req, grids, true, attempt));
        }
        // Retain the least-deficient attempt; ties go to the newer one.
        let score = deficiency(req, &grids);
        if best.as_ref().map_or(true, |(s, _)| score <= *s) {
            best = Some((score, grids));
        }
    }

    warn!("attempt ceiling reached, returning best effort");
    let mut grids = best.map(|(_, g)| g).unwrap_or_default();
    for grid in grids.values_mut() {
        force_fill(grid, &req.filler_subject);
    }
    Ok(build_solution(req, grids, false, attempts))
}

/// Generates a single section's timetable against optional pre-existing
/// grids of other sections.
///
/// Returns the first complete outcome, or the last attempt finalized
/// best-effort with `complete = false`.
pub fn solve_section<R: Rng>(
    req: &TimetableRequest,
    cfg: &EngineConfig,
    section: &str,
    others: &BTreeMap<String, Timetable>,
    rng: &mut R,
) -> Result<SectionOutcome, ScheduleError> {
    if !req.sections.iter().any(|s| s == section) {
        return Err(ScheduleError::UnknownSection(section.to_string()));
    }
    validate_request(req).map_err(ScheduleError::InvalidInput)?;
    let resolved = req.faculty.resolve(&req.sections, &req.subjects);

    let mut best = None;
    for _ in 0..cfg.max_attempts.max(1) {
        let mut grid = insert_section(req, cfg, &resolved, section, others, rng);
        let (achieved, ok) =
            optimize_section(req, cfg, &resolved, section, &mut grid, others, rng);
        if ok {
            return Ok(SectionOutcome {
                grid,
                achieved,
                complete: true,
            });
        }
        best = Some(grid);
    }

    let mut grid = best.unwrap_or_default();
    finalize_section(req, cfg, section, &mut grid);
    let achieved = achieved_counts(req, section, &grid);
    Ok(SectionOutcome {
        grid,
        achieved,
        complete: false,
    })
}

fn achieved_counts(
    req: &TimetableRequest,
    section: &str,
    grid: &Timetable,
) -> BTreeMap<String, u32> {
    req.section_subjects(section)
        .map(|subjects| grid.counts_for(subjects.keys().map(String::as_str)))
        .unwrap_or_default()
}

/// Missing hours plus empty cells across all sections; 0 would validate.
fn deficiency(req: &TimetableRequest, grids: &BTreeMap<String, Timetable>) -> u64 {
    let mut score = 0u64;
    for section in &req.sections {
        let (Some(grid), Some(subjects)) = (grids.get(section), req.section_subjects(section))
        else {
            continue;
        };
        for (name, spec) in subjects {
            score += u64::from(spec.hours.saturating_sub(grid.count_of(name)));
        }
        score += grid.empty_cells() as u64;
    }
    score
}

fn section_complete(req: &TimetableRequest, section: &str, grid: &Timetable) -> bool {
    req.section_subjects(section).is_some_and(|subjects| {
        subjects
            .iter()
            .all(|(name, spec)| grid.count_of(name) == spec.hours)
    })
}

fn validates(req: &TimetableRequest, grids: &BTreeMap<String, Timetable>) -> bool {
    req.sections.iter().all(|section| {
        let (Some(grid), Some(subjects)) =
            (grids.get(section), req.section_subjects(section))
        else {
            return false;
        };
        section_complete(req, section, grid)
            && grid.empty_cells() == 0
            && lab_integrity_ok(grid, subjects, &req.breaks)
    })
}

fn build_solution(
    req: &TimetableRequest,
    grids: BTreeMap<String, Timetable>,
    success: bool,
    attempts: usize,
) -> TimetableSolution {
    let sections = grids
        .into_iter()
        .map(|(name, grid)| {
            let achieved = achieved_counts(req, &name, &grid);
            let complete = req.section_subjects(&name).is_some_and(|subjects| {
                subjects
                    .iter()
                    .all(|(s, spec)| achieved.get(s) == Some(&spec.hours))
            });
            (
                name,
                SectionOutcome {
                    grid,
                    achieved,
                    complete,
                },
            )
        })
        .collect();
    TimetableSolution {
        sections,
        success,
        attempts,
    }
}

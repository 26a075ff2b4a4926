//! Randomized unit swap.
//!
//! Escapes local optima where two cells' contents are individually valid but
//! jointly block progress (a lab squatting on the only slot another subject
//! can take). Cells are swapped as placement units — a lab's contiguous pair
//! moves as one — and the tentative grid is fully re-validated before
//! commit: lab pairing, the repeat rule including day quotas, and faculty
//! clashes against the rebuilt cross-section state.

use log::trace;
use rand::Rng;
use std::collections::BTreeMap;

use crate::models::{ResolvedFaculty, Slot, Timetable, TimetableRequest, NUM_PERIODS};

use super::integrity::{faculty_clashes_with, lab_pairing_ok, repeat_rule_ok};
use super::EngineConfig;

/// Expands a cell to its placement unit: the adjacent same-subject pair it
/// belongs to (a lab block or a break-straddling repeat), or the cell alone.
fn expand_unit(grid: &Timetable, slot: Slot) -> Vec<Slot> {
    let Slot { day, period } = slot;
    let Some(subject) = grid.get(day, period) else {
        return vec![slot];
    };
    if period < NUM_PERIODS && grid.get(day, period + 1) == Some(subject) {
        return vec![slot, Slot::new(day, period + 1)];
    }
    if period > 1 && grid.get(day, period - 1) == Some(subject) {
        return vec![Slot::new(day, period - 1), slot];
    }
    vec![slot]
}

/// Attempts one validated random swap on the section's grid.
///
/// Tries up to `cfg.swap_attempts` random cell pairs; returns whether a swap
/// was committed. Locked cells are never touched, and a swap that would put
/// a subject onto one of its forbidden cells is rejected before validation.
pub(crate) fn attempt_swap<R: Rng>(
    req: &TimetableRequest,
    cfg: &EngineConfig,
    resolved: &ResolvedFaculty,
    section: &str,
    grid: &mut Timetable,
    others: &BTreeMap<String, Timetable>,
    rng: &mut R,
) -> bool {
    let Some(subjects) = req.section_subjects(section) else {
        return false;
    };
    let locked = req.strict_cells(section);
    let positions: Vec<Slot> = Slot::all().filter(|s| !locked.contains(s)).collect();
    if positions.len() < 2 {
        return false;
    }

    for _ in 0..cfg.swap_attempts {
        let a = positions[rng.random_range(0..positions.len())];
        let b = positions[rng.random_range(0..positions.len())];
        if a == b {
            continue;
        }

        let unit_a = expand_unit(grid, a);
        let unit_b = expand_unit(grid, b);
        if unit_a.len() != unit_b.len() {
            continue;
        }
        if unit_a.iter().any(|s| unit_b.contains(s)) {
            continue;
        }
        if unit_a.iter().chain(&unit_b).any(|s| locked.contains(s)) {
            continue;
        }

        let vals_a: Vec<Option<String>> = unit_a
            .iter()
            .map(|s| grid.get(s.day, s.period).map(String::from))
            .collect();
        let vals_b: Vec<Option<String>> = unit_b
            .iter()
            .map(|s| grid.get(s.day, s.period).map(String::from))
            .collect();

        let subj_a = vals_a.first().and_then(|v| v.as_deref());
        let subj_b = vals_b.first().and_then(|v| v.as_deref());
        let forbidden = unit_b
            .iter()
            .any(|&s| subj_a.is_some_and(|x| req.is_blocked_cell(section, Some(x), s)))
            || unit_a
                .iter()
                .any(|&s| subj_b.is_some_and(|x| req.is_blocked_cell(section, Some(x), s)));
        if forbidden {
            continue;
        }

        let mut candidate = grid.clone();
        for (slot, val) in unit_a.iter().zip(&vals_b) {
            candidate.set(slot.day, slot.period, val.clone());
        }
        for (slot, val) in unit_b.iter().zip(&vals_a) {
            candidate.set(slot.day, slot.period, val.clone());
        }

        if !lab_pairing_ok(&candidate, subjects, &req.breaks) {
            continue;
        }
        if !repeat_rule_ok(&candidate, subjects, &req.breaks, cfg.repeat_rule) {
            continue;
        }

        let mut tentative = others.clone();
        tentative.insert(section.to_string(), candidate.clone());
        if !faculty_clashes_with(&tentative, resolved).is_empty() {
            continue;
        }

        trace!(
            "section {section}: swapped day {} P{} with day {} P{}",
            a.day,
            a.period,
            b.day,
            b.period
        );
        *grid = candidate;
        return true;
    }
    false
}

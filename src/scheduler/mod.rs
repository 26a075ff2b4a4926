//! The scheduling engine.
//!
//! Generation is a two-phase local search per section, coordinated across
//! sections by a driver:
//!
//! 1. **Insertion** — strict placements first, then one greedy randomized
//!    pass over empty cells in day/period order.
//! 2. **Repair** — iterative completion of short subjects, with stall
//!    detection via grid-state hashing and an escalation ladder: forced
//!    placement of the most-deficient subject, a randomized unit swap, and
//!    finally marking a cell as stuck so the loop always terminates.
//! 3. **Finalize** — duplicate removal and capped filler backfill.
//! 4. **Driver** — sections in fixed order; earlier sections whose faculty
//!    was claimed by later placements are re-optimized in place; the whole
//!    pass retries from scratch up to a global attempt ceiling.
//!
//! All randomness flows through a caller-supplied [`rand::Rng`], so seeded
//! runs are fully reproducible.

mod driver;
mod finalize;
mod index;
mod insertion;
pub mod integrity;
mod kpi;
mod predicates;
mod repair;
mod swap;

pub use driver::{generate_timetables, solve_section, ScheduleError};
pub use kpi::SolutionKpi;

use serde::{Deserialize, Serialize};

/// How often a non-lab subject may appear on one day.
///
/// Two released revisions of the underlying rule disagreed; both are kept as
/// explicit policies rather than guessing which was intended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatRule {
    /// At most once per day, never in adjacent periods.
    SingleDaily,
    /// At most twice per day, and only when the two occurrences form an
    /// adjacent pair separated by a configured break — the break supplies
    /// the spacing the adjacency ban exists to guarantee.
    PairAcrossBreak,
}

impl Default for RepeatRule {
    fn default() -> Self {
        RepeatRule::PairAcrossBreak
    }
}

/// Engine tuning knobs.
///
/// The defaults mirror the behavior of the production deployment; the
/// ceilings double as a deterministic timeout surrogate for the otherwise
/// unbounded local search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Full multi-section passes before giving up.
    pub max_attempts: usize,
    /// Repair iterations per section per pass.
    pub max_iterations: usize,
    /// Unchanged-state iterations before the repair loop escalates.
    pub stall_threshold: u32,
    /// Random cell pairs tried per swap call.
    pub swap_attempts: usize,
    /// Filler cells allowed per day during capped backfill.
    pub max_filler_per_day: usize,
    /// Non-lab same-day repeat policy.
    pub repeat_rule: RepeatRule,
}

impl EngineConfig {
    /// Sets the global attempt ceiling.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the repeat policy.
    pub fn with_repeat_rule(mut self, rule: RepeatRule) -> Self {
        self.repeat_rule = rule;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            max_iterations: 1000,
            stall_threshold: 10,
            swap_attempts: 200,
            max_filler_per_day: 3,
            repeat_rule: RepeatRule::default(),
        }
    }
}

//! Constraint-guided placement of lesson occurrences.
//!
//! The solver expands every lesson into its weekly occurrences, orders
//! them most-constrained first, and commits each to the best feasible
//! (day, start period, classroom) candidate. An occurrence with no
//! feasible candidate gets one bounded repair attempt (relocating a
//! single less-constrained occurrence) before it is demoted to a pending
//! entry with a diagnostic reason.

mod solver;
mod state;

use serde::{Deserialize, Serialize};

use crate::constraints::ReasonCode;

pub use solver::solve;
pub use state::{Assignment, ScheduleState};

/// A lesson occurrence that received no assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEntry {
    /// The lesson the occurrence belongs to.
    pub lesson_id: u32,
    /// Course title.
    pub course: String,
    /// Class display name.
    pub class: String,
    /// Primary faculty full name.
    pub faculty: String,
    /// Most specific rejection observed while searching.
    pub reason: ReasonCode,
}

//! Engine-level error taxonomy.
//!
//! Only two things abort a generation run: a structurally invalid input
//! snapshot, and a committed schedule that fails the final consistency
//! pass. Per-occurrence placement failures are *not* errors; they are
//! recorded as pending entries in the result (see
//! [`PendingEntry`](crate::scheduler::PendingEntry)).

use thiserror::Error;

use crate::validation::ValidationError;

/// A fatal error aborting a generation run. No partial timetable is
/// produced when one of these is returned.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The input snapshot violates structural invariants (unresolved
    /// references, impossible demand, zero load ceilings, ...).
    #[error("input snapshot failed validation with {} error(s)", .0.len())]
    Configuration(Vec<ValidationError>),

    /// A committed assignment violated a schedule invariant during the
    /// final consistency pass. Indicates a defect in the solver; the run
    /// aborts rather than emitting an inconsistent timetable.
    #[error("schedule invariant violated: {detail}")]
    Invariant { detail: String },
}

impl GenerateError {
    /// The validation errors behind a configuration abort, if any.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Configuration(errors) => errors,
            Self::Invariant { .. } => &[],
        }
    }
}

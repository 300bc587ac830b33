//! School timetable generation engine.
//!
//! Takes an immutable snapshot of courses, classes, faculty, classrooms,
//! and lesson requirements and produces a weekly per-class timetable in
//! one deterministic pass. Placement is constraint-guided greedy search
//! with a bounded repair step; occurrences that cannot be placed are
//! reported as pending entries with a diagnostic reason instead of
//! failing the run.
//!
//! # Modules
//!
//! - **`models`**: Domain types (`Course`, `Class`, `Faculty`,
//!   `Classroom`, `Lesson`, `Snapshot`, `TimeGrid`)
//! - **`validation`**: Input integrity checks (duplicate IDs, unresolved
//!   references, impossible demand)
//! - **`availability`**: Per-entity availability bitsets over the grid
//! - **`constraints`**: Feasibility checking and rejection reasons
//! - **`scheduler`**: Occurrence ordering, placement, and repair
//! - **`assembler`**: Final verification and grid-shaped output
//!
//! # Example
//!
//! ```
//! use timetable_engine::models::{Class, Classroom, Course, Faculty, Lesson, Snapshot, TimeGrid};
//!
//! let snapshot = Snapshot::new()
//!     .with_course(Course::new(1, "Mathematics", "MATH"))
//!     .with_class(Class::new(10, "Grade 7").with_division("A"))
//!     .with_faculty(Faculty::new(20, "Jane", "Doe", "JDO"))
//!     .with_classroom(Classroom::new(30, "Room 101", "R101"))
//!     .with_lesson(Lesson::new(100, 1, 10, 20).with_periods_per_week(4));
//!
//! let result = timetable_engine::generate(&snapshot, &TimeGrid::standard()).unwrap();
//! assert_eq!(result.stats.total_lessons_placed, 4);
//! assert!(result.pending.is_empty());
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod assembler;
pub mod availability;
pub mod constraints;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use assembler::{SlotPayload, Stats, TimetableResult};
pub use constraints::ReasonCode;
pub use error::GenerateError;
pub use models::{Snapshot, TimeGrid};
pub use scheduler::PendingEntry;

use availability::AvailabilityIndex;

/// Generates a timetable for one snapshot.
///
/// Stateless: everything derived from the snapshot lives only for the
/// duration of the call, and equal inputs give byte-equal results.
///
/// # Errors
///
/// [`GenerateError::Configuration`] if the snapshot fails validation,
/// [`GenerateError::Invariant`] if the committed schedule fails the
/// final consistency pass. Unplaceable occurrences are not errors; they
/// come back in [`TimetableResult::pending`].
pub fn generate(snapshot: &Snapshot, grid: &TimeGrid) -> Result<TimetableResult, GenerateError> {
    validation::validate_snapshot(snapshot, grid).map_err(GenerateError::Configuration)?;

    let availability = AvailabilityIndex::build(snapshot, grid);
    let (state, pending) = scheduler::solve(snapshot, grid, &availability)?;
    assembler::assemble(snapshot, grid, &availability, &state, pending)
}

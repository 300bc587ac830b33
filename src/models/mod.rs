//! Timetabling domain models.
//!
//! Typed representations of the academic entities consumed by the
//! engine, the weekly [`TimeGrid`] coordinate space, and the [`Snapshot`]
//! input contract. Models carry data and invariant helpers only; all
//! scheduling behavior lives in the solver layers.

mod class;
mod classroom;
mod course;
mod faculty;
mod grid;
mod lesson;
mod snapshot;

pub use class::Class;
pub use classroom::Classroom;
pub use course::Course;
pub use faculty::{Faculty, FacultyConstraints};
pub use grid::{Slot, TimeGrid};
pub use lesson::{Lesson, LessonConstraints};
pub use snapshot::{Snapshot, SnapshotIndex};

//! Structural validation of the input snapshot.
//!
//! Runs before solving and collects every problem found rather than
//! stopping at the first. Detects:
//! - Duplicate entity ids and duplicate class display names (the
//!   timetable output is keyed by display name)
//! - Unresolved foreign keys (course/class/faculty/classroom references)
//! - Field invariant violations (empty course abbreviation, zero batch
//!   count, zero occurrence count or duration)
//! - Demand that can never fit the grid
//! - Zero load ceilings on faculty with lesson demand
//! - Slot references outside the grid
//!
//! Any error aborts the run as a configuration failure; no partial
//! timetable is produced.

use std::collections::{HashMap, HashSet};

use crate::models::{Slot, Snapshot, TimeGrid};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an id.
    DuplicateId,
    /// A reference to an entity that doesn't exist.
    UnknownReference,
    /// A course abbreviation is empty.
    EmptyAbbreviation,
    /// A class batch count of zero.
    InvalidBatchCount,
    /// A lesson with zero occurrences or zero duration.
    InvalidDemand,
    /// A lesson that can never fit the grid.
    DemandExceedsCapacity,
    /// A faculty load ceiling of zero with nonzero lesson demand.
    ZeroLoadCeiling,
    /// A slot reference outside the grid.
    SlotOutOfGrid,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a snapshot against a grid.
///
/// Returns `Ok(())` if all checks pass, `Err(errors)` with every
/// detected issue otherwise.
pub fn validate_snapshot(snapshot: &Snapshot, grid: &TimeGrid) -> ValidationResult {
    let mut errors = Vec::new();

    let course_ids = collect_ids(snapshot.courses.iter().map(|c| c.id), "course", &mut errors);
    let class_ids = collect_ids(snapshot.classes.iter().map(|c| c.id), "class", &mut errors);
    let faculty_ids = collect_ids(snapshot.faculties.iter().map(|f| f.id), "faculty", &mut errors);
    collect_ids(snapshot.classrooms.iter().map(|r| r.id), "classroom", &mut errors);
    collect_ids(snapshot.lessons.iter().map(|l| l.id), "lesson", &mut errors);

    for course in &snapshot.courses {
        if course.abbreviation.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyAbbreviation,
                format!("course {} has an empty abbreviation", course.id),
            ));
        }
        if let Some(allowed) = &course.allowed_slots {
            check_slots(allowed, grid, &format!("course {}", course.id), &mut errors);
        }
    }

    // Timetable rows are keyed by display name, so two classes sharing
    // one would silently merge in the output.
    let mut display_names: HashMap<String, u32> = HashMap::new();
    for class in &snapshot.classes {
        if let Some(&first) = display_names.get(&class.display_name()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!(
                    "classes {} and {} share display name {:?}",
                    first,
                    class.id,
                    class.display_name()
                ),
            ));
        } else {
            display_names.insert(class.display_name(), class.id);
        }
        if class.batch_count == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidBatchCount,
                format!("class {} has a batch count of zero", class.id),
            ));
        }
        check_slots(&class.blocked_slots, grid, &format!("class {}", class.id), &mut errors);
        if let Some(allowed) = &class.allowed_slots {
            check_slots(allowed, grid, &format!("class {}", class.id), &mut errors);
        }
    }

    for faculty in &snapshot.faculties {
        check_slots(
            &faculty.time_off,
            grid,
            &format!("faculty {}", faculty.id),
            &mut errors,
        );
    }

    for room in &snapshot.classrooms {
        check_slots(
            &room.blocked_slots,
            grid,
            &format!("classroom {}", room.id),
            &mut errors,
        );
        if let Some(home) = room.home_class_id {
            if !class_ids.contains(&home) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("classroom {} is homeroom of unknown class {}", room.id, home),
                ));
            }
        }
    }

    // Weekly demand per faculty id, for the zero-ceiling check.
    let mut faculty_demand: HashMap<u32, u64> = HashMap::new();

    for lesson in &snapshot.lessons {
        if !course_ids.contains(&lesson.course_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("lesson {} references unknown course {}", lesson.id, lesson.course_id),
            ));
        }
        if !class_ids.contains(&lesson.class_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("lesson {} references unknown class {}", lesson.id, lesson.class_id),
            ));
        }
        for id in lesson.faculty_ids() {
            if !faculty_ids.contains(&id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("lesson {} references unknown faculty {}", lesson.id, id),
                ));
            }
            *faculty_demand.entry(id).or_insert(0) += lesson.demand();
        }

        if lesson.periods_per_week == 0 || lesson.duration == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDemand,
                format!(
                    "lesson {} has zero periods_per_week or duration",
                    lesson.id
                ),
            ));
            continue;
        }
        if lesson.duration as usize > grid.periods_per_day() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DemandExceedsCapacity,
                format!(
                    "lesson {} duration {} exceeds the {}-period day",
                    lesson.id,
                    lesson.duration,
                    grid.periods_per_day()
                ),
            ));
        }
        if lesson.demand() > grid.slot_count() as u64 {
            errors.push(ValidationError::new(
                ValidationErrorKind::DemandExceedsCapacity,
                format!(
                    "lesson {} demands {} periods on a {}-slot grid",
                    lesson.id,
                    lesson.demand(),
                    grid.slot_count()
                ),
            ));
        }
        if let Some(allowed) = &lesson.constraints.allowed_slots {
            check_slots(allowed, grid, &format!("lesson {}", lesson.id), &mut errors);
        }
        check_slots(
            &lesson.constraints.preferred_slots,
            grid,
            &format!("lesson {}", lesson.id),
            &mut errors,
        );
    }

    for faculty in &snapshot.faculties {
        let demand = faculty_demand.get(&faculty.id).copied().unwrap_or(0);
        if demand == 0 {
            continue;
        }
        let zero_day = faculty.constraints.max_periods_per_day == Some(0);
        let zero_week = faculty.constraints.max_periods_per_week == Some(0);
        if zero_day || zero_week {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroLoadCeiling,
                format!(
                    "faculty {} has a zero load ceiling but {} periods of demand",
                    faculty.id, demand
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn collect_ids(
    ids: impl Iterator<Item = u32>,
    kind: &str,
    errors: &mut Vec<ValidationError>,
) -> HashSet<u32> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("duplicate {kind} id: {id}"),
            ));
        }
    }
    seen
}

fn check_slots(slots: &[Slot], grid: &TimeGrid, owner: &str, errors: &mut Vec<ValidationError>) {
    for slot in slots {
        if !grid.contains(*slot) {
            errors.push(ValidationError::new(
                ValidationErrorKind::SlotOutOfGrid,
                format!(
                    "{owner} references slot (day {}, period {}) outside the grid",
                    slot.day, slot.period
                ),
            ));
        }
    }
}

//! Final schedule verification and output shaping.
//!
//! Before any output is built, [`assemble`] re-derives occupancy from
//! scratch out of the committed assignments and checks every hard
//! guarantee independently of the solver: no double-booking, runs
//! contained in one day, declared availability respected, faculty load
//! ceilings honored. A violation here means the engine itself is broken,
//! so it aborts the run instead of returning a plausible-looking
//! schedule.
//!
//! The output is grid-shaped for direct rendering: one row of
//! `periods_per_day` cells per day per class, every period present, with
//! `null` for free periods.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::info;
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityIndex;
use crate::error::GenerateError;
use crate::models::{Lesson, Snapshot, SnapshotIndex, TimeGrid};
use crate::scheduler::{Assignment, PendingEntry, ScheduleState};

/// One occupied period cell of the timetable grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPayload {
    /// The lesson occupying the period.
    pub lesson_id: u32,
    /// Course title.
    pub course_name: String,
    /// Course abbreviation.
    pub course_abbr: String,
    /// Primary faculty full name.
    pub faculty_name: String,
    /// Primary faculty abbreviation.
    pub faculty_abbr: String,
    /// Hosting classroom name.
    pub classroom: String,
    /// Display color inherited from the course.
    pub color: String,
}

/// Run-level counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Classes that received at least one assignment.
    pub total_classes: usize,
    /// Placed lesson occurrences.
    pub total_lessons_placed: usize,
    /// Occurrences demoted to pending.
    pub total_pending: usize,
}

/// A complete generation result.
///
/// `timetable` maps class display name → day name → period cells.
/// `BTreeMap` keys keep serialization order stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableResult {
    pub timetable: BTreeMap<String, BTreeMap<String, Vec<Option<SlotPayload>>>>,
    pub pending: Vec<PendingEntry>,
    pub stats: Stats,
}

/// Verifies the solved state and shapes it into a [`TimetableResult`].
pub fn assemble(
    snapshot: &Snapshot,
    grid: &TimeGrid,
    availability: &AvailabilityIndex,
    state: &ScheduleState,
    pending: Vec<PendingEntry>,
) -> Result<TimetableResult, GenerateError> {
    verify(snapshot, grid, availability, state)?;

    let index = snapshot.index();
    let lessons: HashMap<u32, &Lesson> =
        snapshot.lessons.iter().map(|l| (l.id, l)).collect();
    let periods = grid.periods_per_day();

    // Every class appears in the output, fully gridded, even with no
    // assignments at all.
    let mut timetable: BTreeMap<String, BTreeMap<String, Vec<Option<SlotPayload>>>> = snapshot
        .classes
        .iter()
        .map(|class| {
            let days = grid
                .day_names()
                .iter()
                .map(|day| (day.clone(), vec![None; periods]))
                .collect();
            (class.display_name(), days)
        })
        .collect();

    for (_, assignment) in state.assignments() {
        let payload = payload_for(&index, &lessons, assignment)?;
        let class = index
            .class(assignment.class_id)
            .ok_or_else(|| dangling("class", assignment.class_id))?;
        // verify() already rejected out-of-grid runs.
        let day_name = grid.day_name(assignment.slot.day);
        let row = timetable
            .get_mut(&class.display_name())
            .and_then(|days| days.get_mut(day_name))
            .ok_or_else(|| dangling("class", assignment.class_id))?;
        for offset in 0..assignment.duration as usize {
            row[assignment.slot.period + offset] = Some(payload.clone());
        }
    }

    let placed_classes: HashSet<u32> = state.assignments().map(|(_, a)| a.class_id).collect();
    let stats = Stats {
        total_classes: placed_classes.len(),
        total_lessons_placed: state.assignment_count(),
        total_pending: pending.len(),
    };
    info!(
        "assembled timetable: {} occurrences placed across {} classes, {} pending",
        stats.total_lessons_placed, stats.total_classes, stats.total_pending
    );

    Ok(TimetableResult {
        timetable,
        pending,
        stats,
    })
}

fn payload_for(
    index: &SnapshotIndex<'_>,
    lessons: &HashMap<u32, &Lesson>,
    assignment: &Assignment,
) -> Result<SlotPayload, GenerateError> {
    let lesson = lessons
        .get(&assignment.lesson_id)
        .ok_or_else(|| dangling("lesson", assignment.lesson_id))?;
    let course = index
        .course(lesson.course_id)
        .ok_or_else(|| dangling("course", lesson.course_id))?;
    let faculty_id = assignment
        .faculty_ids
        .first()
        .copied()
        .ok_or_else(|| GenerateError::Invariant {
            detail: format!("assignment for lesson {} has no faculty", assignment.lesson_id),
        })?;
    let faculty = index
        .faculty(faculty_id)
        .ok_or_else(|| dangling("faculty", faculty_id))?;
    let classroom = index
        .classroom(assignment.classroom_id)
        .ok_or_else(|| dangling("classroom", assignment.classroom_id))?;

    Ok(SlotPayload {
        lesson_id: assignment.lesson_id,
        course_name: course.title.clone(),
        course_abbr: course.abbreviation.clone(),
        faculty_name: faculty.full_name(),
        faculty_abbr: faculty.abbreviation.clone(),
        classroom: classroom.name.clone(),
        color: course.color.clone(),
    })
}

fn dangling(kind: &str, id: u32) -> GenerateError {
    GenerateError::Invariant {
        detail: format!("assignment references unknown {kind} {id}"),
    }
}

/// Re-derives occupancy and loads from the committed assignments and
/// checks every hard guarantee. Independent of the solver's own tables.
fn verify(
    snapshot: &Snapshot,
    grid: &TimeGrid,
    availability: &AvailabilityIndex,
    state: &ScheduleState,
) -> Result<(), GenerateError> {
    let periods = grid.periods_per_day();
    let mut class_busy: HashMap<(u32, usize), u32> = HashMap::new();
    let mut faculty_busy: HashMap<(u32, usize), u32> = HashMap::new();
    let mut room_busy: HashMap<(u32, usize), u32> = HashMap::new();
    let mut day_load: HashMap<(u32, usize), u32> = HashMap::new();
    let mut week_load: HashMap<u32, u32> = HashMap::new();

    for (_, a) in state.assignments() {
        if !grid.contains(a.slot) || a.slot.period + a.duration as usize > periods {
            return Err(GenerateError::Invariant {
                detail: format!(
                    "lesson {} run at day {} period {} (duration {}) leaves the day",
                    a.lesson_id, a.slot.day, a.slot.period, a.duration
                ),
            });
        }
        let start = grid.slot_index(a.slot);
        for offset in 0..a.duration as usize {
            let idx = start + offset;
            occupy(&mut class_busy, (a.class_id, idx), "class", a.class_id, a.lesson_id)?;
            for &f in &a.faculty_ids {
                occupy(&mut faculty_busy, (f, idx), "faculty", f, a.lesson_id)?;
            }
            occupy(&mut room_busy, (a.classroom_id, idx), "classroom", a.classroom_id, a.lesson_id)?;

            if !availability.classroom(a.classroom_id).contains(idx) {
                return Err(GenerateError::Invariant {
                    detail: format!(
                        "lesson {} placed in classroom {} outside its availability",
                        a.lesson_id, a.classroom_id
                    ),
                });
            }
            for &f in &a.faculty_ids {
                if !availability.faculty(f).contains(idx) {
                    return Err(GenerateError::Invariant {
                        detail: format!(
                            "lesson {} assigned to faculty {} during declared time off",
                            a.lesson_id, f
                        ),
                    });
                }
            }
            if !availability.class(a.class_id).contains(idx) {
                return Err(GenerateError::Invariant {
                    detail: format!(
                        "lesson {} placed during a blocked slot of class {}",
                        a.lesson_id, a.class_id
                    ),
                });
            }
        }
        for &f in &a.faculty_ids {
            *day_load.entry((f, a.slot.day)).or_insert(0) += a.duration;
            *week_load.entry(f).or_insert(0) += a.duration;
        }
    }

    // Ceilings are rechecked against the accumulated totals so an
    // incremental bookkeeping bug in the solver cannot slip through.
    for faculty in &snapshot.faculties {
        if let Some(ceiling) = faculty.constraints.max_periods_per_day {
            for day in 0..grid.days() {
                let load = day_load.get(&(faculty.id, day)).copied().unwrap_or(0);
                if load > ceiling {
                    return Err(GenerateError::Invariant {
                        detail: format!(
                            "faculty {} teaches {load} periods on day {day}, ceiling {ceiling}",
                            faculty.id
                        ),
                    });
                }
            }
        }
        if let Some(ceiling) = faculty.constraints.max_periods_per_week {
            let load = week_load.get(&faculty.id).copied().unwrap_or(0);
            if load > ceiling {
                return Err(GenerateError::Invariant {
                    detail: format!(
                        "faculty {} teaches {load} periods this week, ceiling {ceiling}",
                        faculty.id
                    ),
                });
            }
        }
    }

    Ok(())
}

fn occupy(
    busy: &mut HashMap<(u32, usize), u32>,
    key: (u32, usize),
    kind: &str,
    id: u32,
    lesson_id: u32,
) -> Result<(), GenerateError> {
    if let Some(prior) = busy.insert(key, lesson_id) {
        return Err(GenerateError::Invariant {
            detail: format!(
                "{kind} {id} double-booked: lessons {prior} and {lesson_id} share a period"
            ),
        });
    }
    Ok(())
}

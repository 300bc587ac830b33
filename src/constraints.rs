//! Placement feasibility checking.
//!
//! [`check_placement`] is a pure function over a candidate placement and
//! the current schedule state. Checks run cheapest and most
//! discriminating first and short-circuit on the first failure:
//!
//! 1. Grid bounds (the run must fit within one day)
//! 2. Declared availability of class, course, lesson whitelist, every
//!    teaching faculty member, and the room, across the whole run
//! 3. Occupancy conflicts against committed assignments, including the
//!    one-occurrence-per-day rule for single-period lessons
//! 4. Room type compatibility and exclusive-room binding
//! 5. Faculty day/week load ceilings
//!
//! A feasible placement also gets a [`SoftCost`]: a preference score used
//! only to rank equally-feasible candidates, never to reject. Lower is
//! better; a class's own homeroom is free, another class's homeroom is
//! the most expensive room, and distance from a lesson's preferred slots
//! adds one per slot.

use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityIndex, SlotBitset};
use crate::models::{Classroom, Faculty, Lesson, Slot, TimeGrid};
use crate::scheduler::ScheduleState;

/// Preference score for a feasible candidate. Lower ranks first.
pub type SoftCost = u32;

/// Why a placement (or a whole occurrence) was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// A participant's declared availability excludes the run, or the
    /// faculty set is already teaching elsewhere in it.
    AvailabilityConflict,
    /// A faculty day or week period ceiling would be exceeded.
    FacultyLoadExceeded,
    /// The room is occupied, or exclusively bound to another class.
    ClassroomConflict,
    /// The class already has a lesson in the run.
    ClassConflict,
    /// No classroom of the required type exists at all.
    NoCompatibleClassroom,
}

impl ReasonCode {
    /// Diagnostic priority: lower = more specific, reported first when a
    /// candidate scan produced several rejection kinds.
    pub(crate) fn priority(self) -> u8 {
        match self {
            Self::AvailabilityConflict => 0,
            Self::FacultyLoadExceeded => 1,
            Self::ClassroomConflict => 2,
            Self::ClassConflict => 3,
            Self::NoCompatibleClassroom => 4,
        }
    }
}

/// One candidate placement to check.
#[derive(Debug)]
pub struct PlacementQuery<'a> {
    /// The lesson whose occurrence is being placed.
    pub lesson: &'a Lesson,
    /// Precomputed class ∩ course ∩ lesson-whitelist availability.
    pub scope: &'a SlotBitset,
    /// Teaching faculty, primary first.
    pub faculties: &'a [&'a Faculty],
    /// Candidate room.
    pub classroom: &'a Classroom,
    /// Candidate start slot.
    pub slot: Slot,
}

/// Decides feasibility of a candidate placement against the current
/// schedule state. Pure: no side effects, near-constant time.
pub fn check_placement(
    grid: &TimeGrid,
    availability: &AvailabilityIndex,
    state: &ScheduleState,
    query: &PlacementQuery<'_>,
) -> Result<SoftCost, ReasonCode> {
    let lesson = query.lesson;
    let duration = lesson.duration;
    let slot = query.slot;

    // 1. Bounds: the run must stay within the slot's day.
    if !grid.fits(slot, duration as usize) {
        return Err(ReasonCode::AvailabilityConflict);
    }
    let start = grid.slot_index(slot);
    let run = duration as usize;

    // 2. Declared availability across the whole run.
    if !query.scope.contains_run(start, run) {
        return Err(ReasonCode::AvailabilityConflict);
    }
    for faculty in query.faculties {
        if !availability.faculty(faculty.id).contains_run(start, run) {
            return Err(ReasonCode::AvailabilityConflict);
        }
    }
    if !availability.classroom(query.classroom.id).contains_run(start, run) {
        return Err(ReasonCode::AvailabilityConflict);
    }

    // 3. Occupancy conflicts. A busy faculty member is reported as an
    // availability conflict: the closed reason set has no faculty
    // double-booking code and "not available then" is the accurate
    // diagnosis for the caller.
    if !state.class_free(lesson.class_id, slot, duration) {
        return Err(ReasonCode::ClassConflict);
    }
    // A single-period lesson is scheduled at most once per day, spreading
    // its occurrences across the week. Multi-period blocks are exempt.
    if duration == 1 && state.lesson_on_day(lesson.id, slot.day) {
        return Err(ReasonCode::ClassConflict);
    }
    for faculty in query.faculties {
        if !state.faculty_free(faculty.id, slot, duration) {
            return Err(ReasonCode::AvailabilityConflict);
        }
    }
    if !state.classroom_free(query.classroom.id, slot, duration) {
        return Err(ReasonCode::ClassroomConflict);
    }

    // 4. Room compatibility. The solver pre-filters pools by type, so the
    // type check only fires for direct callers.
    if query.classroom.room_type != lesson.classroom_type {
        return Err(ReasonCode::NoCompatibleClassroom);
    }
    if !query.classroom.is_shared {
        if let Some(holder) = state.room_bound_class(query.classroom.id) {
            if holder != lesson.class_id {
                return Err(ReasonCode::ClassroomConflict);
            }
        }
    }

    // 5. Faculty load ceilings, incremental over committed load.
    for faculty in query.faculties {
        if let Some(ceiling) = faculty.constraints.max_periods_per_day {
            if state.faculty_day_load(faculty.id, slot.day) + duration > ceiling {
                return Err(ReasonCode::FacultyLoadExceeded);
            }
        }
        if let Some(ceiling) = faculty.constraints.max_periods_per_week {
            if state.faculty_week_load(faculty.id) + duration > ceiling {
                return Err(ReasonCode::FacultyLoadExceeded);
            }
        }
    }

    Ok(soft_cost(grid, lesson, query.classroom, slot))
}

fn soft_cost(grid: &TimeGrid, lesson: &Lesson, classroom: &Classroom, slot: Slot) -> SoftCost {
    let mut cost = if classroom.is_homeroom_of(lesson.class_id) {
        0
    } else if classroom.is_homeroom {
        4
    } else {
        2
    };

    let preferred = &lesson.constraints.preferred_slots;
    if !preferred.is_empty() {
        let here = grid.slot_index(slot) as i64;
        let distance = preferred
            .iter()
            .filter(|s| grid.contains(**s))
            .map(|&s| (grid.slot_index(s) as i64 - here).unsigned_abs() as u32)
            .min()
            .unwrap_or(0);
        cost += distance;
    }

    cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Class, Faculty, Snapshot};

    fn fixture() -> (TimeGrid, Snapshot) {
        let grid = TimeGrid::standard();
        let snapshot = Snapshot::new()
            .with_class(Class::new(10, "Grade 7"))
            .with_faculty(
                Faculty::new(20, "Jane", "Doe", "JDO")
                    .with_max_periods_per_day(3)
                    .with_time_off(vec![Slot::new(0, 0)]),
            )
            .with_classroom(Classroom::new(30, "Room 101", "R101"));
        (grid, snapshot)
    }

    fn query<'a>(
        lesson: &'a Lesson,
        scope: &'a SlotBitset,
        faculties: &'a [&'a Faculty],
        classroom: &'a Classroom,
        slot: Slot,
    ) -> PlacementQuery<'a> {
        PlacementQuery {
            lesson,
            scope,
            faculties,
            classroom,
            slot,
        }
    }

    #[test]
    fn test_bounds_rejected() {
        let (grid, snapshot) = fixture();
        let avail = AvailabilityIndex::build(&snapshot, &grid);
        let state = ScheduleState::new(&grid);
        let lesson = Lesson::new(1, 1, 10, 20).with_duration(3);
        let scope = SlotBitset::full(grid.slot_count());
        let room = Classroom::new(30, "Room 101", "R101");
        let faculties = [&snapshot.faculties[0]];

        let q = query(&lesson, &scope, &faculties, &room, Slot::new(0, 6));
        assert_eq!(
            check_placement(&grid, &avail, &state, &q),
            Err(ReasonCode::AvailabilityConflict)
        );
    }

    #[test]
    fn test_faculty_time_off_rejected() {
        let (grid, snapshot) = fixture();
        let avail = AvailabilityIndex::build(&snapshot, &grid);
        let state = ScheduleState::new(&grid);
        let lesson = Lesson::new(1, 1, 10, 20);
        let scope = SlotBitset::full(grid.slot_count());
        let room = Classroom::new(30, "Room 101", "R101");
        let faculties = [&snapshot.faculties[0]];

        let q = query(&lesson, &scope, &faculties, &room, Slot::new(0, 0));
        assert_eq!(
            check_placement(&grid, &avail, &state, &q),
            Err(ReasonCode::AvailabilityConflict)
        );
    }

    #[test]
    fn test_class_conflict() {
        let (grid, snapshot) = fixture();
        let avail = AvailabilityIndex::build(&snapshot, &grid);
        let mut state = ScheduleState::new(&grid);
        state.commit(
            crate::scheduler::Assignment {
                lesson_id: 9,
                class_id: 10,
                faculty_ids: vec![99],
                classroom_id: 31,
                slot: Slot::new(1, 2),
                duration: 1,
            },
            false,
        );

        let lesson = Lesson::new(1, 1, 10, 20);
        let scope = SlotBitset::full(grid.slot_count());
        let room = Classroom::new(30, "Room 101", "R101");
        let faculties = [&snapshot.faculties[0]];
        let q = query(&lesson, &scope, &faculties, &room, Slot::new(1, 2));
        assert_eq!(
            check_placement(&grid, &avail, &state, &q),
            Err(ReasonCode::ClassConflict)
        );
    }

    #[test]
    fn test_same_lesson_twice_a_day_rejected() {
        let (grid, snapshot) = fixture();
        let avail = AvailabilityIndex::build(&snapshot, &grid);
        let mut state = ScheduleState::new(&grid);
        state.commit(
            crate::scheduler::Assignment {
                lesson_id: 1,
                class_id: 10,
                faculty_ids: vec![20],
                classroom_id: 30,
                slot: Slot::new(2, 0),
                duration: 1,
            },
            false,
        );

        let lesson = Lesson::new(1, 1, 10, 20);
        let scope = SlotBitset::full(grid.slot_count());
        let room = Classroom::new(30, "Room 101", "R101");
        let faculties = [&snapshot.faculties[0]];

        // Later the same day: rejected even though every slot is free.
        let q = query(&lesson, &scope, &faculties, &room, Slot::new(2, 5));
        assert_eq!(
            check_placement(&grid, &avail, &state, &q),
            Err(ReasonCode::ClassConflict)
        );
        // Another day is fine.
        let q = query(&lesson, &scope, &faculties, &room, Slot::new(3, 5));
        assert!(check_placement(&grid, &avail, &state, &q).is_ok());
    }

    #[test]
    fn test_multi_period_block_exempt_from_day_rule() {
        let (grid, snapshot) = fixture();
        let avail = AvailabilityIndex::build(&snapshot, &grid);
        let mut state = ScheduleState::new(&grid);
        // A double block of lesson 2 already sits on day 1 (other class,
        // other faculty, other room, so only the day rule could object).
        state.commit(
            crate::scheduler::Assignment {
                lesson_id: 2,
                class_id: 11,
                faculty_ids: vec![99],
                classroom_id: 31,
                slot: Slot::new(1, 0),
                duration: 2,
            },
            false,
        );

        let lesson = Lesson::new(2, 1, 10, 20).with_duration(2);
        let scope = SlotBitset::full(grid.slot_count());
        let room = Classroom::new(30, "Room 101", "R101");
        let faculties = [&snapshot.faculties[0]];

        let q = query(&lesson, &scope, &faculties, &room, Slot::new(1, 4));
        assert!(check_placement(&grid, &avail, &state, &q).is_ok());
    }

    #[test]
    fn test_day_ceiling_rejected() {
        let (grid, snapshot) = fixture();
        let avail = AvailabilityIndex::build(&snapshot, &grid);
        let mut state = ScheduleState::new(&grid);
        // Faculty 20 already teaches 3 periods on day 1 (its ceiling).
        state.commit(
            crate::scheduler::Assignment {
                lesson_id: 9,
                class_id: 11,
                faculty_ids: vec![20],
                classroom_id: 31,
                slot: Slot::new(1, 0),
                duration: 3,
            },
            false,
        );

        let lesson = Lesson::new(1, 1, 10, 20);
        let scope = SlotBitset::full(grid.slot_count());
        let room = Classroom::new(30, "Room 101", "R101");
        let faculties = [&snapshot.faculties[0]];
        let q = query(&lesson, &scope, &faculties, &room, Slot::new(1, 5));
        assert_eq!(
            check_placement(&grid, &avail, &state, &q),
            Err(ReasonCode::FacultyLoadExceeded)
        );

        // Another day is still fine.
        let q = query(&lesson, &scope, &faculties, &room, Slot::new(2, 5));
        assert!(check_placement(&grid, &avail, &state, &q).is_ok());
    }

    #[test]
    fn test_room_type_mismatch() {
        let (grid, snapshot) = fixture();
        let avail = AvailabilityIndex::build(&snapshot, &grid);
        let state = ScheduleState::new(&grid);
        let lesson = Lesson::new(1, 1, 10, 20).with_classroom_type("lab");
        let scope = SlotBitset::full(grid.slot_count());
        let room = Classroom::new(30, "Room 101", "R101");
        let faculties = [&snapshot.faculties[0]];

        let q = query(&lesson, &scope, &faculties, &room, Slot::new(1, 1));
        assert_eq!(
            check_placement(&grid, &avail, &state, &q),
            Err(ReasonCode::NoCompatibleClassroom)
        );
    }

    #[test]
    fn test_exclusive_room_bound_to_other_class() {
        let (grid, snapshot) = fixture();
        let avail = AvailabilityIndex::build(&snapshot, &grid);
        let mut state = ScheduleState::new(&grid);
        state.commit(
            crate::scheduler::Assignment {
                lesson_id: 9,
                class_id: 11,
                faculty_ids: vec![99],
                classroom_id: 30,
                slot: Slot::new(0, 1),
                duration: 1,
            },
            true,
        );

        let lesson = Lesson::new(1, 1, 10, 20);
        let scope = SlotBitset::full(grid.slot_count());
        let room = Classroom::new(30, "Room 101", "R101").with_shared(false);
        let faculties = [&snapshot.faculties[0]];
        // Different time, but the room belongs to class 11 now.
        let q = query(&lesson, &scope, &faculties, &room, Slot::new(3, 3));
        assert_eq!(
            check_placement(&grid, &avail, &state, &q),
            Err(ReasonCode::ClassroomConflict)
        );
    }

    #[test]
    fn test_soft_cost_prefers_own_homeroom() {
        let grid = TimeGrid::standard();
        let lesson = Lesson::new(1, 1, 10, 20);
        let own = Classroom::new(30, "Room 101", "R101").as_homeroom_of(10);
        let other = Classroom::new(31, "Room 102", "R102").as_homeroom_of(11);
        let shared = Classroom::new(32, "Room 103", "R103");

        let slot = Slot::new(0, 0);
        assert_eq!(soft_cost(&grid, &lesson, &own, slot), 0);
        assert_eq!(soft_cost(&grid, &lesson, &shared, slot), 2);
        assert_eq!(soft_cost(&grid, &lesson, &other, slot), 4);
    }

    #[test]
    fn test_soft_cost_preferred_slot_distance() {
        let grid = TimeGrid::standard();
        let lesson = Lesson::new(1, 1, 10, 20).with_preferred_slot(Slot::new(0, 0));
        let room = Classroom::new(32, "Room 103", "R103");

        assert_eq!(soft_cost(&grid, &lesson, &room, Slot::new(0, 0)), 2);
        assert_eq!(soft_cost(&grid, &lesson, &room, Slot::new(0, 3)), 5);
    }

    #[test]
    fn test_reason_priority_order() {
        assert!(
            ReasonCode::AvailabilityConflict.priority()
                < ReasonCode::FacultyLoadExceeded.priority()
        );
        assert!(ReasonCode::FacultyLoadExceeded.priority() < ReasonCode::ClassroomConflict.priority());
        assert!(ReasonCode::ClassroomConflict.priority() < ReasonCode::ClassConflict.priority());
        assert!(ReasonCode::ClassConflict.priority() < ReasonCode::NoCompatibleClassroom.priority());
    }

    #[test]
    fn test_reason_code_serialization() {
        let json = serde_json::to_string(&ReasonCode::FacultyLoadExceeded).unwrap();
        assert_eq!(json, r#""FACULTY_LOAD_EXCEEDED""#);
    }
}

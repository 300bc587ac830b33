//! Mutable schedule state for one generation run.
//!
//! [`ScheduleState`] owns the only mutable shared state of a run: the
//! occupancy tables per class, faculty member, and classroom, plus
//! faculty load counters and exclusive-room bindings. It is an explicit
//! value threaded through the commit loop, never ambient, so concurrent
//! runs (and tests) cannot interfere.
//!
//! `commit` and `retract` are exact inverses; the bounded repair step in
//! the solver relies on retract restoring every table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::availability::SlotBitset;
use crate::models::{Slot, TimeGrid};

/// A committed binding of one lesson occurrence to a slot run and a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// The lesson this occurrence belongs to.
    pub lesson_id: u32,
    /// The class receiving the occurrence.
    pub class_id: u32,
    /// Teaching faculty, primary first.
    pub faculty_ids: Vec<u32>,
    /// The room hosting the occurrence.
    pub classroom_id: u32,
    /// Start slot; the occurrence occupies `duration` periods from here.
    pub slot: Slot,
    /// Number of consecutive periods occupied.
    pub duration: u32,
}

#[derive(Debug, Clone)]
struct Committed {
    assignment: Assignment,
    exclusive_room: bool,
}

/// Occupancy tables and load counters for a run in progress.
#[derive(Debug)]
pub struct ScheduleState {
    days: usize,
    periods_per_day: usize,
    class_busy: HashMap<u32, SlotBitset>,
    faculty_busy: HashMap<u32, SlotBitset>,
    classroom_busy: HashMap<u32, SlotBitset>,
    /// Periods taught per (faculty, day).
    faculty_day_load: HashMap<u32, Vec<u32>>,
    faculty_week_load: HashMap<u32, u32>,
    /// Non-shared room → (claiming class, live assignment count).
    room_bindings: HashMap<u32, (u32, u32)>,
    /// Live occurrences per (lesson, day).
    lesson_day_count: HashMap<(u32, usize), u32>,
    /// Slot is `None` after a retract; ids stay stable.
    committed: Vec<Option<Committed>>,
}

impl ScheduleState {
    /// Creates an empty state for the given grid.
    pub fn new(grid: &TimeGrid) -> Self {
        Self {
            days: grid.days(),
            periods_per_day: grid.periods_per_day(),
            class_busy: HashMap::new(),
            faculty_busy: HashMap::new(),
            classroom_busy: HashMap::new(),
            faculty_day_load: HashMap::new(),
            faculty_week_load: HashMap::new(),
            room_bindings: HashMap::new(),
            lesson_day_count: HashMap::new(),
            committed: Vec::new(),
        }
    }

    fn slot_count(&self) -> usize {
        self.days * self.periods_per_day
    }

    fn index_of(&self, slot: Slot) -> usize {
        slot.day * self.periods_per_day + slot.period
    }

    /// Whether the class is free across `[slot, slot + duration)`.
    pub fn class_free(&self, class_id: u32, slot: Slot, duration: u32) -> bool {
        free_run(&self.class_busy, class_id, self.index_of(slot), duration)
    }

    /// Whether the faculty member is free across the run.
    pub fn faculty_free(&self, faculty_id: u32, slot: Slot, duration: u32) -> bool {
        free_run(&self.faculty_busy, faculty_id, self.index_of(slot), duration)
    }

    /// Whether the classroom is free across the run.
    pub fn classroom_free(&self, classroom_id: u32, slot: Slot, duration: u32) -> bool {
        free_run(&self.classroom_busy, classroom_id, self.index_of(slot), duration)
    }

    /// Committed periods for a faculty member on one day.
    pub fn faculty_day_load(&self, faculty_id: u32, day: usize) -> u32 {
        self.faculty_day_load
            .get(&faculty_id)
            .map_or(0, |days| days[day])
    }

    /// Committed periods for a faculty member across the week.
    pub fn faculty_week_load(&self, faculty_id: u32) -> u32 {
        self.faculty_week_load.get(&faculty_id).copied().unwrap_or(0)
    }

    /// The class currently holding a non-shared room, if any.
    pub fn room_bound_class(&self, classroom_id: u32) -> Option<u32> {
        self.room_bindings.get(&classroom_id).map(|&(class, _)| class)
    }

    /// Whether the lesson already has a committed occurrence on the day.
    pub fn lesson_on_day(&self, lesson_id: u32, day: usize) -> bool {
        self.lesson_day_count
            .get(&(lesson_id, day))
            .is_some_and(|&n| n > 0)
    }

    /// Commits an assignment, updating every occupancy table.
    ///
    /// `exclusive_room` marks the room as non-shared: the committing
    /// class claims it for the whole week while any of its assignments
    /// remain. Returns a stable assignment id usable with [`retract`].
    ///
    /// [`retract`]: Self::retract
    pub fn commit(&mut self, assignment: Assignment, exclusive_room: bool) -> usize {
        let start = self.index_of(assignment.slot);
        let duration = assignment.duration as usize;
        let slot_count = self.slot_count();

        mark_run(&mut self.class_busy, assignment.class_id, start, duration, slot_count, true);
        for &f in &assignment.faculty_ids {
            mark_run(&mut self.faculty_busy, f, start, duration, slot_count, true);
            let days = self
                .faculty_day_load
                .entry(f)
                .or_insert_with(|| vec![0; self.days]);
            days[assignment.slot.day] += assignment.duration;
            *self.faculty_week_load.entry(f).or_insert(0) += assignment.duration;
        }
        mark_run(
            &mut self.classroom_busy,
            assignment.classroom_id,
            start,
            duration,
            slot_count,
            true,
        );
        if exclusive_room {
            let binding = self
                .room_bindings
                .entry(assignment.classroom_id)
                .or_insert((assignment.class_id, 0));
            binding.1 += 1;
        }
        *self
            .lesson_day_count
            .entry((assignment.lesson_id, assignment.slot.day))
            .or_insert(0) += 1;

        self.committed.push(Some(Committed {
            assignment,
            exclusive_room,
        }));
        self.committed.len() - 1
    }

    /// Retracts a committed assignment, reversing every table update.
    ///
    /// Returns `None` if the id was never committed or already retracted.
    pub fn retract(&mut self, id: usize) -> Option<Assignment> {
        let Committed {
            assignment,
            exclusive_room,
        } = self.committed.get_mut(id)?.take()?;

        let start = self.index_of(assignment.slot);
        let duration = assignment.duration as usize;
        let slot_count = self.slot_count();

        mark_run(&mut self.class_busy, assignment.class_id, start, duration, slot_count, false);
        for &f in &assignment.faculty_ids {
            mark_run(&mut self.faculty_busy, f, start, duration, slot_count, false);
            if let Some(days) = self.faculty_day_load.get_mut(&f) {
                days[assignment.slot.day] -= assignment.duration;
            }
            if let Some(week) = self.faculty_week_load.get_mut(&f) {
                *week -= assignment.duration;
            }
        }
        mark_run(
            &mut self.classroom_busy,
            assignment.classroom_id,
            start,
            duration,
            slot_count,
            false,
        );
        if exclusive_room {
            if let Some(binding) = self.room_bindings.get_mut(&assignment.classroom_id) {
                binding.1 -= 1;
                if binding.1 == 0 {
                    self.room_bindings.remove(&assignment.classroom_id);
                }
            }
        }
        let day_key = (assignment.lesson_id, assignment.slot.day);
        if let Some(count) = self.lesson_day_count.get_mut(&day_key) {
            *count -= 1;
            if *count == 0 {
                self.lesson_day_count.remove(&day_key);
            }
        }

        Some(assignment)
    }

    /// Live assignments with their stable ids, in commit order.
    pub fn assignments(&self) -> impl Iterator<Item = (usize, &Assignment)> {
        self.committed
            .iter()
            .enumerate()
            .filter_map(|(id, c)| c.as_ref().map(|c| (id, &c.assignment)))
    }

    /// A live assignment by id.
    pub fn assignment(&self, id: usize) -> Option<&Assignment> {
        self.committed.get(id)?.as_ref().map(|c| &c.assignment)
    }

    /// Number of live assignments.
    pub fn assignment_count(&self) -> usize {
        self.committed.iter().filter(|c| c.is_some()).count()
    }

    /// Ids of live assignments overlapping the run and sharing the class,
    /// any of the faculty, or the classroom. Used by the repair step to
    /// identify what blocks a candidate placement.
    pub fn blocking_assignments(
        &self,
        slot: Slot,
        duration: u32,
        class_id: u32,
        faculty_ids: &[u32],
        classroom_id: u32,
    ) -> Vec<usize> {
        let start = self.index_of(slot);
        let end = start + duration as usize;
        self.assignments()
            .filter(|(_, a)| {
                let a_start = self.index_of(a.slot);
                let a_end = a_start + a.duration as usize;
                a_start < end && start < a_end
            })
            .filter(|(_, a)| {
                a.class_id == class_id
                    || a.classroom_id == classroom_id
                    || a.faculty_ids.iter().any(|f| faculty_ids.contains(f))
            })
            .map(|(id, _)| id)
            .collect()
    }
}

fn free_run(map: &HashMap<u32, SlotBitset>, id: u32, start: usize, duration: u32) -> bool {
    match map.get(&id) {
        Some(busy) => !(start..start + duration as usize).any(|i| busy.contains(i)),
        None => true,
    }
}

fn mark_run(
    map: &mut HashMap<u32, SlotBitset>,
    id: u32,
    start: usize,
    duration: usize,
    slot_count: usize,
    busy: bool,
) {
    let bits = map.entry(id).or_insert_with(|| SlotBitset::empty(slot_count));
    for i in start..start + duration {
        if busy {
            bits.set(i);
        } else {
            bits.clear(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(lesson: u32, class: u32, faculty: u32, room: u32, slot: Slot, dur: u32) -> Assignment {
        Assignment {
            lesson_id: lesson,
            class_id: class,
            faculty_ids: vec![faculty],
            classroom_id: room,
            slot,
            duration: dur,
        }
    }

    #[test]
    fn test_commit_updates_tables() {
        let grid = TimeGrid::standard();
        let mut state = ScheduleState::new(&grid);
        state.commit(assignment(1, 10, 20, 30, Slot::new(0, 2), 2), false);

        assert!(!state.class_free(10, Slot::new(0, 2), 1));
        assert!(!state.class_free(10, Slot::new(0, 3), 1));
        assert!(state.class_free(10, Slot::new(0, 4), 1));
        assert!(!state.faculty_free(20, Slot::new(0, 1), 2)); // run overlaps period 2
        assert!(!state.classroom_free(30, Slot::new(0, 3), 1));
        assert_eq!(state.faculty_day_load(20, 0), 2);
        assert_eq!(state.faculty_week_load(20), 2);
    }

    #[test]
    fn test_retract_restores_tables() {
        let grid = TimeGrid::standard();
        let mut state = ScheduleState::new(&grid);
        let id = state.commit(assignment(1, 10, 20, 30, Slot::new(1, 0), 3), true);
        assert_eq!(state.room_bound_class(30), Some(10));

        let retracted = state.retract(id).unwrap();
        assert_eq!(retracted.slot, Slot::new(1, 0));
        assert!(state.class_free(10, Slot::new(1, 0), 3));
        assert!(state.faculty_free(20, Slot::new(1, 0), 3));
        assert!(state.classroom_free(30, Slot::new(1, 0), 3));
        assert_eq!(state.faculty_day_load(20, 1), 0);
        assert_eq!(state.faculty_week_load(20), 0);
        assert_eq!(state.room_bound_class(30), None);
        assert_eq!(state.assignment_count(), 0);

        // Double retract is a no-op.
        assert!(state.retract(id).is_none());
    }

    #[test]
    fn test_room_binding_refcount() {
        let grid = TimeGrid::standard();
        let mut state = ScheduleState::new(&grid);
        let a = state.commit(assignment(1, 10, 20, 30, Slot::new(0, 0), 1), true);
        let _b = state.commit(assignment(2, 10, 21, 30, Slot::new(0, 1), 1), true);

        state.retract(a);
        // Still bound while one assignment remains.
        assert_eq!(state.room_bound_class(30), Some(10));
    }

    #[test]
    fn test_blocking_assignments() {
        let grid = TimeGrid::standard();
        let mut state = ScheduleState::new(&grid);
        let a = state.commit(assignment(1, 10, 20, 30, Slot::new(0, 2), 2), false);
        let _far = state.commit(assignment(2, 10, 20, 30, Slot::new(3, 0), 1), false);

        // Overlapping run, same faculty but different class/room.
        let blockers = state.blocking_assignments(Slot::new(0, 3), 1, 11, &[20], 31);
        assert_eq!(blockers, vec![a]);

        // Overlapping run, no shared participant.
        let none = state.blocking_assignments(Slot::new(0, 3), 1, 11, &[99], 31);
        assert!(none.is_empty());

        // Non-overlapping run, shared everything.
        let none = state.blocking_assignments(Slot::new(0, 5), 1, 10, &[20], 30);
        assert!(none.is_empty());
    }

    #[test]
    fn test_lesson_day_tracking() {
        let grid = TimeGrid::standard();
        let mut state = ScheduleState::new(&grid);
        let id = state.commit(assignment(1, 10, 20, 30, Slot::new(2, 0), 1), false);

        assert!(state.lesson_on_day(1, 2));
        assert!(!state.lesson_on_day(1, 3));
        assert!(!state.lesson_on_day(2, 2));

        state.retract(id);
        assert!(!state.lesson_on_day(1, 2));
    }

    #[test]
    fn test_co_teacher_loads() {
        let grid = TimeGrid::standard();
        let mut state = ScheduleState::new(&grid);
        let mut a = assignment(1, 10, 20, 30, Slot::new(2, 0), 2);
        a.faculty_ids = vec![20, 21];
        state.commit(a, false);

        assert_eq!(state.faculty_week_load(20), 2);
        assert_eq!(state.faculty_week_load(21), 2);
        assert!(!state.faculty_free(21, Slot::new(2, 1), 1));
    }
}

//! Occurrence ordering, greedy placement, and bounded repair.
//!
//! # Algorithm
//!
//! 1. Expand every lesson into `periods_per_week` occurrences.
//! 2. Sort occurrences most-constrained first: fewest open slots for the
//!    least-available participant, then longest duration, then input
//!    order (stable, so identical inputs give identical output).
//! 3. For each occurrence, scan all (day, start period, classroom)
//!    candidates, keep the lowest-soft-cost feasible one, and commit it.
//! 4. If nothing is feasible, make one repair attempt: retract a single
//!    blocking occurrence that is strictly less constrained, commit the
//!    stuck occurrence in its place, and re-place the evicted one. If
//!    any step fails everything is restored and the occurrence is
//!    demoted to a pending entry with the most specific rejection seen.
//!
//! The repair never retracts more than one assignment per stuck
//! occurrence, so total work stays O(occurrences × candidates).

use std::cmp::Reverse;
use std::collections::HashMap;

use log::{debug, warn};

use crate::availability::{AvailabilityIndex, SlotBitset};
use crate::constraints::{check_placement, PlacementQuery, ReasonCode, SoftCost};
use crate::error::GenerateError;
use crate::models::{Class, Classroom, Course, Faculty, Lesson, Slot, Snapshot, TimeGrid};
use crate::validation::{ValidationError, ValidationErrorKind};

use super::state::{Assignment, ScheduleState};
use super::PendingEntry;

/// Constrainedness of a lesson's occurrences.
///
/// `open` is the open-slot count of the least-available participant
/// (class∩course∩whitelist scope, each faculty member, or the best room
/// of the compatible pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Constrainedness {
    open: u32,
    duration: u32,
}

impl Constrainedness {
    /// Sort key: fewest open slots first, longer runs first on ties.
    fn order_key(self) -> (u32, Reverse<u32>) {
        (self.open, Reverse(self.duration))
    }

    /// Strictly less constrained than `other`: more open slots per
    /// occupied period. Compared as a ratio (cross-multiplied to stay in
    /// integers) because a long run with many open slots can still be
    /// harder to place than a short run with few.
    fn less_constrained_than(self, other: Self) -> bool {
        u64::from(self.open) * u64::from(other.duration)
            > u64::from(other.open) * u64::from(self.duration)
    }
}

struct LessonCtx<'a> {
    lesson: &'a Lesson,
    course: &'a Course,
    class: &'a Class,
    /// Teaching faculty, primary first.
    faculties: Vec<&'a Faculty>,
    /// Type-compatible rooms, in input order.
    pool: Vec<&'a Classroom>,
    /// class ∩ course ∩ lesson-whitelist availability.
    scope: SlotBitset,
    score: Constrainedness,
}

struct Planner<'a> {
    grid: &'a TimeGrid,
    availability: &'a AvailabilityIndex,
    lessons: Vec<LessonCtx<'a>>,
    /// lesson id → position in `lessons`.
    lesson_pos: HashMap<u32, usize>,
    /// classroom id → is_shared, for restoring retracted assignments.
    room_shared: HashMap<u32, bool>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    slot: Slot,
    pool_idx: usize,
    cost: SoftCost,
}

/// Places every lesson occurrence, returning the final schedule state
/// and the occurrences that could not be placed.
///
/// Assumes a validated snapshot; unresolved references are still caught
/// defensively and reported as a configuration error.
pub fn solve(
    snapshot: &Snapshot,
    grid: &TimeGrid,
    availability: &AvailabilityIndex,
) -> Result<(ScheduleState, Vec<PendingEntry>), GenerateError> {
    let planner = Planner::prepare(snapshot, grid, availability)?;
    Ok(planner.run())
}

impl<'a> Planner<'a> {
    fn prepare(
        snapshot: &'a Snapshot,
        grid: &'a TimeGrid,
        availability: &'a AvailabilityIndex,
    ) -> Result<Self, GenerateError> {
        let index = snapshot.index();
        let mut lessons = Vec::with_capacity(snapshot.lessons.len());
        let mut lesson_pos = HashMap::new();

        for lesson in &snapshot.lessons {
            let course = index
                .course(lesson.course_id)
                .ok_or_else(|| unresolved(lesson.id, "course", lesson.course_id))?;
            let class = index
                .class(lesson.class_id)
                .ok_or_else(|| unresolved(lesson.id, "class", lesson.class_id))?;
            let mut faculties = Vec::new();
            for id in lesson.faculty_ids() {
                faculties.push(
                    index
                        .faculty(id)
                        .ok_or_else(|| unresolved(lesson.id, "faculty", id))?,
                );
            }

            let pool: Vec<&Classroom> = snapshot
                .classrooms
                .iter()
                .filter(|r| r.room_type == lesson.classroom_type)
                .collect();

            let mut scope = availability.class(lesson.class_id).clone();
            scope.intersect_with(availability.course(lesson.course_id));
            if let Some(allowed) = &lesson.constraints.allowed_slots {
                let mut whitelist = SlotBitset::empty(grid.slot_count());
                for &slot in allowed {
                    if grid.contains(slot) {
                        whitelist.set(grid.slot_index(slot));
                    }
                }
                scope.intersect_with(&whitelist);
            }

            let faculty_open = faculties
                .iter()
                .map(|f| availability.faculty(f.id).count_ones())
                .min()
                .unwrap_or(0);
            let pool_open = pool
                .iter()
                .map(|r| availability.classroom(r.id).count_ones())
                .max()
                .unwrap_or(0);
            let open = scope.count_ones().min(faculty_open).min(pool_open);

            lesson_pos.insert(lesson.id, lessons.len());
            lessons.push(LessonCtx {
                lesson,
                course,
                class,
                faculties,
                pool,
                scope,
                score: Constrainedness {
                    open,
                    duration: lesson.duration,
                },
            });
        }

        let room_shared = snapshot
            .classrooms
            .iter()
            .map(|r| (r.id, r.is_shared))
            .collect();

        Ok(Self {
            grid,
            availability,
            lessons,
            lesson_pos,
            room_shared,
        })
    }

    fn run(&self) -> (ScheduleState, Vec<PendingEntry>) {
        // Expand lessons into occurrences, then order most-constrained
        // first. The sort is stable, so input order breaks ties.
        let mut order: Vec<usize> = self
            .lessons
            .iter()
            .enumerate()
            .flat_map(|(idx, ctx)| std::iter::repeat(idx).take(ctx.lesson.periods_per_week as usize))
            .collect();
        order.sort_by_key(|&idx| self.lessons[idx].score.order_key());

        let mut state = ScheduleState::new(self.grid);
        let mut pending = Vec::new();

        for &idx in &order {
            let ctx = &self.lessons[idx];
            if ctx.pool.is_empty() {
                warn!(
                    "lesson {}: no classroom of type {:?} exists",
                    ctx.lesson.id, ctx.lesson.classroom_type
                );
                pending.push(self.pending_entry(idx, ReasonCode::NoCompatibleClassroom));
                continue;
            }

            match self.try_place(&mut state, idx) {
                Ok(()) => {}
                Err(reason) => {
                    if self.attempt_repair(&mut state, idx) {
                        continue;
                    }
                    warn!("lesson {}: occurrence pending, {:?}", ctx.lesson.id, reason);
                    pending.push(self.pending_entry(idx, reason));
                }
            }
        }

        (state, pending)
    }

    /// Scans all candidates for one occurrence and commits the best.
    /// On failure, returns the most specific rejection observed.
    fn try_place(&self, state: &mut ScheduleState, idx: usize) -> Result<(), ReasonCode> {
        let candidate = self.best_candidate(state, idx)?;
        self.commit(state, idx, candidate);
        Ok(())
    }

    fn best_candidate(&self, state: &ScheduleState, idx: usize) -> Result<Candidate, ReasonCode> {
        let ctx = &self.lessons[idx];
        let duration = ctx.lesson.duration as usize;
        let periods = self.grid.periods_per_day();
        if duration > periods {
            return Err(ReasonCode::AvailabilityConflict);
        }

        let mut best: Option<Candidate> = None;
        let mut reason: Option<ReasonCode> = None;

        for day in 0..self.grid.days() {
            for start in 0..=periods - duration {
                let slot = Slot::new(day, start);
                for (pool_idx, room) in ctx.pool.iter().enumerate() {
                    let query = PlacementQuery {
                        lesson: ctx.lesson,
                        scope: &ctx.scope,
                        faculties: &ctx.faculties,
                        classroom: room,
                        slot,
                    };
                    match check_placement(self.grid, self.availability, state, &query) {
                        Ok(cost) => {
                            // Strict `<` keeps the earliest candidate on
                            // cost ties, making results deterministic.
                            if best.map_or(true, |b| cost < b.cost) {
                                best = Some(Candidate {
                                    slot,
                                    pool_idx,
                                    cost,
                                });
                            }
                        }
                        Err(r) => {
                            reason = Some(match reason {
                                Some(prev) if prev.priority() <= r.priority() => prev,
                                _ => r,
                            });
                        }
                    }
                }
            }
        }

        best.ok_or(reason.unwrap_or(ReasonCode::AvailabilityConflict))
    }

    fn commit(&self, state: &mut ScheduleState, idx: usize, candidate: Candidate) -> usize {
        let ctx = &self.lessons[idx];
        let room = ctx.pool[candidate.pool_idx];
        debug!(
            "lesson {}: placed at day {} period {} in room {} (cost {})",
            ctx.lesson.id, candidate.slot.day, candidate.slot.period, room.id, candidate.cost
        );
        state.commit(
            Assignment {
                lesson_id: ctx.lesson.id,
                class_id: ctx.lesson.class_id,
                faculty_ids: ctx.faculties.iter().map(|f| f.id).collect(),
                classroom_id: room.id,
                slot: candidate.slot,
                duration: ctx.lesson.duration,
            },
            !room.is_shared,
        )
    }

    /// Single-level backtracking: finds the first candidate blocked by
    /// exactly one strictly-less-constrained assignment, retracts it,
    /// commits the stuck occurrence, and re-places the evicted one.
    ///
    /// At most one retraction happens per stuck occurrence; as soon as
    /// one victim is retracted, the attempt either fully succeeds or
    /// everything is restored and the occurrence stays stuck.
    fn attempt_repair(&self, state: &mut ScheduleState, idx: usize) -> bool {
        let ctx = &self.lessons[idx];
        let duration = ctx.lesson.duration as usize;
        let periods = self.grid.periods_per_day();
        if duration > periods {
            return false;
        }
        let faculty_ids: Vec<u32> = ctx.faculties.iter().map(|f| f.id).collect();

        for day in 0..self.grid.days() {
            for start in 0..=periods - duration {
                let slot = Slot::new(day, start);
                let run_start = self.grid.slot_index(slot);
                if !ctx.scope.contains_run(run_start, duration) {
                    continue;
                }
                for (pool_idx, room) in ctx.pool.iter().enumerate() {
                    // State-independent feasibility first; eviction can't
                    // fix declared availability.
                    if !ctx
                        .faculties
                        .iter()
                        .all(|f| self.availability.faculty(f.id).contains_run(run_start, duration))
                    {
                        break; // same for every room at this slot
                    }
                    if !self
                        .availability
                        .classroom(room.id)
                        .contains_run(run_start, duration)
                    {
                        continue;
                    }

                    let blockers = state.blocking_assignments(
                        slot,
                        ctx.lesson.duration,
                        ctx.lesson.class_id,
                        &faculty_ids,
                        room.id,
                    );
                    if blockers.len() != 1 {
                        continue;
                    }
                    let victim_id = blockers[0];
                    let Some(victim) = state.assignment(victim_id) else {
                        continue;
                    };
                    let Some(&victim_pos) = self.lesson_pos.get(&victim.lesson_id) else {
                        continue;
                    };
                    if !self.lessons[victim_pos].score.less_constrained_than(ctx.score) {
                        continue;
                    }

                    // The one relocation attempt: from here on we either
                    // succeed or restore and give up.
                    let Some(evicted) = state.retract(victim_id) else {
                        return false;
                    };
                    let query = PlacementQuery {
                        lesson: ctx.lesson,
                        scope: &ctx.scope,
                        faculties: &ctx.faculties,
                        classroom: room,
                        slot,
                    };
                    if let Ok(cost) = check_placement(self.grid, self.availability, state, &query) {
                        let stuck_id = self.commit(state, idx, Candidate { slot, pool_idx, cost });
                        if self.try_place(state, victim_pos).is_ok() {
                            debug!(
                                "lesson {}: repaired by relocating an occurrence of lesson {}",
                                ctx.lesson.id, evicted.lesson_id
                            );
                            return true;
                        }
                        state.retract(stuck_id);
                    }
                    let exclusive = !self
                        .room_shared
                        .get(&evicted.classroom_id)
                        .copied()
                        .unwrap_or(true);
                    state.commit(evicted, exclusive);
                    return false;
                }
            }
        }
        false
    }

    fn pending_entry(&self, idx: usize, reason: ReasonCode) -> PendingEntry {
        let ctx = &self.lessons[idx];
        PendingEntry {
            lesson_id: ctx.lesson.id,
            course: ctx.course.title.clone(),
            class: ctx.class.display_name(),
            faculty: ctx.faculties[0].full_name(),
            reason,
        }
    }
}

fn unresolved(lesson_id: u32, kind: &str, id: u32) -> GenerateError {
    GenerateError::Configuration(vec![ValidationError::new(
        ValidationErrorKind::UnknownReference,
        format!("lesson {lesson_id} references unknown {kind} {id}"),
    )])
}

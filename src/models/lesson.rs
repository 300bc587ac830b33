//! Lesson model: the demand unit of a generation run.
//!
//! One lesson asks for `periods_per_week` weekly occurrences of
//! `duration` consecutive periods each, taught by one primary faculty
//! member (plus optional co-teachers) in a room of `classroom_type`.
//! The solver expands each lesson into `periods_per_week` independent
//! occurrences.

use serde::{Deserialize, Serialize};

use super::Slot;

fn default_one() -> u32 {
    1
}

fn default_room_type() -> String {
    "regular".to_string()
}

/// Per-lesson constraint overrides.
///
/// A small closed set of typed fields; the engine rejects nothing here
/// silently because there is nothing open-ended to ignore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonConstraints {
    /// Whitelist of slots this lesson may start in. `None` = no restriction.
    #[serde(default)]
    pub allowed_slots: Option<Vec<Slot>>,
    /// Preferred start slots. Soft: ranks candidates, never rejects.
    #[serde(default)]
    pub preferred_slots: Vec<Slot>,
}

/// A lesson requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: u32,
    /// Course being taught.
    pub course_id: u32,
    /// Class receiving the lesson.
    pub class_id: u32,
    /// Primary faculty member.
    pub faculty_id: u32,
    /// Co-teaching faculty members.
    #[serde(default)]
    pub shared_faculty_ids: Vec<u32>,
    /// Batch-group label. Display only.
    #[serde(default)]
    pub group: Option<String>,
    /// Required weekly occurrences.
    #[serde(default = "default_one")]
    pub periods_per_week: u32,
    /// Consecutive periods per occurrence.
    #[serde(default = "default_one")]
    pub duration: u32,
    /// Required room category.
    #[serde(default = "default_room_type")]
    pub classroom_type: String,
    /// Per-lesson constraint overrides.
    #[serde(default)]
    pub constraints: LessonConstraints,
}

impl Lesson {
    /// Creates a new single-period weekly lesson.
    pub fn new(id: u32, course_id: u32, class_id: u32, faculty_id: u32) -> Self {
        Self {
            id,
            course_id,
            class_id,
            faculty_id,
            shared_faculty_ids: Vec::new(),
            group: None,
            periods_per_week: 1,
            duration: 1,
            classroom_type: default_room_type(),
            constraints: LessonConstraints::default(),
        }
    }

    /// Sets the required weekly occurrence count.
    pub fn with_periods_per_week(mut self, periods_per_week: u32) -> Self {
        self.periods_per_week = periods_per_week;
        self
    }

    /// Sets the occurrence duration in consecutive periods.
    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    /// Adds a co-teaching faculty member.
    pub fn with_co_teacher(mut self, faculty_id: u32) -> Self {
        self.shared_faculty_ids.push(faculty_id);
        self
    }

    /// Sets the required room category.
    pub fn with_classroom_type(mut self, classroom_type: impl Into<String>) -> Self {
        self.classroom_type = classroom_type.into();
        self
    }

    /// Restricts this lesson to the given start slots.
    pub fn with_allowed_slots(mut self, slots: Vec<Slot>) -> Self {
        self.constraints.allowed_slots = Some(slots);
        self
    }

    /// Adds a preferred start slot.
    pub fn with_preferred_slot(mut self, slot: Slot) -> Self {
        self.constraints.preferred_slots.push(slot);
        self
    }

    /// All teaching faculty ids, primary first, de-duplicated.
    pub fn faculty_ids(&self) -> Vec<u32> {
        let mut ids = Vec::with_capacity(1 + self.shared_faculty_ids.len());
        ids.push(self.faculty_id);
        for &id in &self.shared_faculty_ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Total weekly periods demanded: `periods_per_week × duration`.
    /// Computed in `u64` so absurd inputs compare against grid capacity
    /// instead of wrapping.
    pub fn demand(&self) -> u64 {
        u64::from(self.periods_per_week) * u64::from(self.duration)
    }
}

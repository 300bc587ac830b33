//! Input snapshot: the atomic entity handoff for one generation run.
//!
//! The caller assembles a consistent snapshot of all entities and hands
//! it over immutably; the engine never mutates it and nothing persists
//! inside the engine across runs. Foreign keys are assumed well-formed
//! after validation, but lookups stay fallible so the solver can fail
//! defensively instead of panicking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Class, Classroom, Course, Faculty, Lesson};

/// All input entities for one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// All courses.
    #[serde(default)]
    pub courses: Vec<Course>,
    /// All classes.
    #[serde(default)]
    pub classes: Vec<Class>,
    /// All faculty members.
    #[serde(default)]
    pub faculties: Vec<Faculty>,
    /// All classrooms.
    #[serde(default)]
    pub classrooms: Vec<Classroom>,
    /// All lesson requirements.
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course.
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds a class.
    pub fn with_class(mut self, class: Class) -> Self {
        self.classes.push(class);
        self
    }

    /// Adds a faculty member.
    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculties.push(faculty);
        self
    }

    /// Adds a classroom.
    pub fn with_classroom(mut self, classroom: Classroom) -> Self {
        self.classrooms.push(classroom);
        self
    }

    /// Adds a lesson.
    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.lessons.push(lesson);
        self
    }

    /// Builds id → entity lookup maps over this snapshot.
    pub fn index(&self) -> SnapshotIndex<'_> {
        SnapshotIndex {
            courses: self.courses.iter().map(|c| (c.id, c)).collect(),
            classes: self.classes.iter().map(|c| (c.id, c)).collect(),
            faculties: self.faculties.iter().map(|f| (f.id, f)).collect(),
            classrooms: self.classrooms.iter().map(|r| (r.id, r)).collect(),
        }
    }
}

/// Id → entity lookup maps for one snapshot.
#[derive(Debug)]
pub struct SnapshotIndex<'a> {
    courses: HashMap<u32, &'a Course>,
    classes: HashMap<u32, &'a Class>,
    faculties: HashMap<u32, &'a Faculty>,
    classrooms: HashMap<u32, &'a Classroom>,
}

impl<'a> SnapshotIndex<'a> {
    /// Looks up a course by id.
    pub fn course(&self, id: u32) -> Option<&'a Course> {
        self.courses.get(&id).copied()
    }

    /// Looks up a class by id.
    pub fn class(&self, id: u32) -> Option<&'a Class> {
        self.classes.get(&id).copied()
    }

    /// Looks up a faculty member by id.
    pub fn faculty(&self, id: u32) -> Option<&'a Faculty> {
        self.faculties.get(&id).copied()
    }

    /// Looks up a classroom by id.
    pub fn classroom(&self, id: u32) -> Option<&'a Classroom> {
        self.classrooms.get(&id).copied()
    }
}

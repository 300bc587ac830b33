//! Course model.
//!
//! A course is the subject being taught (e.g., Mathematics). Lessons
//! reference courses; the course itself carries only display data and an
//! optional global slot whitelist applying to every lesson of the course.

use serde::{Deserialize, Serialize};

use super::Slot;

fn default_color() -> String {
    "#3B82F6".to_string()
}

/// A course (subject).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: u32,
    /// Display title (e.g., "Mathematics").
    pub title: String,
    /// Short display form (e.g., "MATH"). Must be non-empty.
    pub abbreviation: String,
    /// Display color (hex).
    #[serde(default = "default_color")]
    pub color: String,
    /// Slots any lesson of this course may occupy. `None` = no restriction.
    #[serde(default)]
    pub allowed_slots: Option<Vec<Slot>>,
}

impl Course {
    /// Creates a new course.
    pub fn new(id: u32, title: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            abbreviation: abbreviation.into(),
            color: default_color(),
            allowed_slots: None,
        }
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Restricts every lesson of this course to the given slots.
    pub fn with_allowed_slots(mut self, slots: Vec<Slot>) -> Self {
        self.allowed_slots = Some(slots);
        self
    }
}

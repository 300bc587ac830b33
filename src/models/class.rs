//! Class (student group) model.
//!
//! A class is the group of students receiving lessons. Each class owns
//! one weekly grid in the generated timetable. Slot restrictions come in
//! two forms: a blocklist (`blocked_slots`) and an optional whitelist
//! (`allowed_slots`); when a whitelist is present only listed slots are
//! open, minus any that are also blocked.

use serde::{Deserialize, Serialize};

use super::Slot;

fn default_batch_count() -> u32 {
    1
}

/// A class (student group).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    /// Unique class identifier.
    pub id: u32,
    /// Class name (e.g., "Grade 7").
    pub name: String,
    /// Division label within the grade (e.g., "A"). Part of the display name.
    #[serde(default)]
    pub division: Option<String>,
    /// Number of student batches. Display/capacity data only; the engine
    /// schedules the class as a single unit.
    #[serde(default = "default_batch_count")]
    pub batch_count: u32,
    /// Slots this class can never occupy.
    #[serde(default)]
    pub blocked_slots: Vec<Slot>,
    /// Whitelist of open slots. `None` = every slot is open.
    #[serde(default)]
    pub allowed_slots: Option<Vec<Slot>>,
}

impl Class {
    /// Creates a new class.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            division: None,
            batch_count: 1,
            blocked_slots: Vec::new(),
            allowed_slots: None,
        }
    }

    /// Sets the division label.
    pub fn with_division(mut self, division: impl Into<String>) -> Self {
        self.division = Some(division.into());
        self
    }

    /// Sets the batch count.
    pub fn with_batch_count(mut self, batch_count: u32) -> Self {
        self.batch_count = batch_count;
        self
    }

    /// Blocks the given slots for this class.
    pub fn with_blocked_slots(mut self, slots: Vec<Slot>) -> Self {
        self.blocked_slots = slots;
        self
    }

    /// Restricts this class to the given slots.
    pub fn with_allowed_slots(mut self, slots: Vec<Slot>) -> Self {
        self.allowed_slots = Some(slots);
        self
    }

    /// Display name: `"{name} {division}"` when a division is set.
    pub fn display_name(&self) -> String {
        match &self.division {
            Some(division) => format!("{} {}", self.name, division),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_with_division() {
        let c = Class::new(1, "Grade 7").with_division("A");
        assert_eq!(c.display_name(), "Grade 7 A");
    }

    #[test]
    fn test_display_name_without_division() {
        let c = Class::new(1, "Grade 7");
        assert_eq!(c.display_name(), "Grade 7");
    }

    #[test]
    fn test_class_defaults() {
        let c: Class = serde_json::from_str(r#"{"id":1,"name":"Grade 8"}"#).unwrap();
        assert_eq!(c.batch_count, 1);
        assert!(c.blocked_slots.is_empty());
        assert!(c.allowed_slots.is_none());
    }
}

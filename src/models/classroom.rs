//! Classroom model.
//!
//! Rooms are matched to lessons by `room_type` (e.g., "regular", "lab",
//! "sports"). A homeroom is the default home of one class: lessons of
//! that class prefer it (soft cost), other classes may still use it when
//! it is free. A room with `is_shared == false` hosts exactly one class
//! for the whole week; the first class committed to it claims it.

use serde::{Deserialize, Serialize};

use super::Slot;

fn default_color() -> String {
    "#10B981".to_string()
}

fn default_room_type() -> String {
    "regular".to_string()
}

fn default_shared() -> bool {
    true
}

/// A classroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique classroom identifier.
    pub id: u32,
    /// Room name (e.g., "Room 101").
    pub name: String,
    /// Short display form (e.g., "R101").
    pub abbreviation: String,
    /// Display color (hex).
    #[serde(default = "default_color")]
    pub color: String,
    /// Room category matched against `Lesson::classroom_type`.
    #[serde(default = "default_room_type")]
    pub room_type: String,
    /// Whether this room is a class's homeroom.
    #[serde(default)]
    pub is_homeroom: bool,
    /// The class this homeroom belongs to.
    #[serde(default)]
    pub home_class_id: Option<u32>,
    /// Whether multiple classes may use this room (at different times).
    #[serde(default = "default_shared")]
    pub is_shared: bool,
    /// Whether use of this room requires supervision. Display only.
    #[serde(default)]
    pub requires_supervision: bool,
    /// Slots this room is unavailable.
    #[serde(default)]
    pub blocked_slots: Vec<Slot>,
}

impl Classroom {
    /// Creates a new shared regular classroom.
    pub fn new(id: u32, name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            abbreviation: abbreviation.into(),
            color: default_color(),
            room_type: default_room_type(),
            is_homeroom: false,
            home_class_id: None,
            is_shared: true,
            requires_supervision: false,
            blocked_slots: Vec::new(),
        }
    }

    /// Sets the room type tag.
    pub fn with_room_type(mut self, room_type: impl Into<String>) -> Self {
        self.room_type = room_type.into();
        self
    }

    /// Marks this room as the homeroom of a class.
    pub fn as_homeroom_of(mut self, class_id: u32) -> Self {
        self.is_homeroom = true;
        self.home_class_id = Some(class_id);
        self
    }

    /// Sets whether the room may host multiple classes.
    pub fn with_shared(mut self, is_shared: bool) -> Self {
        self.is_shared = is_shared;
        self
    }

    /// Blocks the given slots for this room.
    pub fn with_blocked_slots(mut self, slots: Vec<Slot>) -> Self {
        self.blocked_slots = slots;
        self
    }

    /// Whether this room is the homeroom of the given class.
    pub fn is_homeroom_of(&self, class_id: u32) -> bool {
        self.is_homeroom && self.home_class_id == Some(class_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classroom_defaults() {
        let r: Classroom =
            serde_json::from_str(r#"{"id":1,"name":"Room 101","abbreviation":"R101"}"#).unwrap();
        assert_eq!(r.room_type, "regular");
        assert!(r.is_shared);
        assert!(!r.is_homeroom);
        assert_eq!(r.color, "#10B981");
    }

    #[test]
    fn test_homeroom_of() {
        let r = Classroom::new(1, "Room 101", "R101").as_homeroom_of(7);
        assert!(r.is_homeroom);
        assert!(r.is_homeroom_of(7));
        assert!(!r.is_homeroom_of(8));
    }

    #[test]
    fn test_room_type_builder() {
        let r = Classroom::new(2, "Chemistry Lab", "CLAB").with_room_type("lab");
        assert_eq!(r.room_type, "lab");
    }
}

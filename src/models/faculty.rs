//! Faculty (teacher) model.
//!
//! Faculty availability is the intersection of the grid minus `time_off`
//! slots; workload is bounded by the optional per-day and per-week period
//! ceilings in [`FacultyConstraints`]. Contact and title fields are
//! carried for the presentation layer and have no scheduling effect.

use serde::{Deserialize, Serialize};

use super::Slot;

fn default_color() -> String {
    "#8B5CF6".to_string()
}

/// Workload ceilings for a faculty member.
///
/// `None` means unbounded. A ceiling of zero is a configuration error
/// when the faculty member has any lesson demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyConstraints {
    /// Maximum periods taught on any single day.
    #[serde(default)]
    pub max_periods_per_day: Option<u32>,
    /// Maximum periods taught across the whole week.
    #[serde(default)]
    pub max_periods_per_week: Option<u32>,
}

/// A faculty member (teacher).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faculty {
    /// Unique faculty identifier.
    pub id: u32,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Short display form (e.g., "JDO").
    pub abbreviation: String,
    /// Display color (hex).
    #[serde(default = "default_color")]
    pub color: String,
    /// Honorific (e.g., "Mr.", "Dr."). Display only.
    #[serde(default)]
    pub title: Option<String>,
    /// Contact email. Display only.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone. Display only.
    #[serde(default)]
    pub phone: Option<String>,
    /// Whether this member is a class teacher. Display only.
    #[serde(default)]
    pub is_class_teacher: bool,
    /// Workload ceilings.
    #[serde(default)]
    pub constraints: FacultyConstraints,
    /// Slots this member is explicitly unavailable.
    #[serde(default)]
    pub time_off: Vec<Slot>,
}

impl Faculty {
    /// Creates a new faculty member.
    pub fn new(
        id: u32,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        abbreviation: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            abbreviation: abbreviation.into(),
            color: default_color(),
            title: None,
            email: None,
            phone: None,
            is_class_teacher: false,
            constraints: FacultyConstraints::default(),
            time_off: Vec::new(),
        }
    }

    /// Sets the per-day period ceiling.
    pub fn with_max_periods_per_day(mut self, max: u32) -> Self {
        self.constraints.max_periods_per_day = Some(max);
        self
    }

    /// Sets the per-week period ceiling.
    pub fn with_max_periods_per_week(mut self, max: u32) -> Self {
        self.constraints.max_periods_per_week = Some(max);
        self
    }

    /// Marks the given slots as time off.
    pub fn with_time_off(mut self, slots: Vec<Slot>) -> Self {
        self.time_off = slots;
        self
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Full display name: `"{first} {last}"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

//! Weekly time grid and slot coordinates.
//!
//! A week is a fixed `days × periods_per_day` grid. A [`Slot`] is one
//! (day, period) coordinate; a lesson occurrence with `duration > 1`
//! occupies a contiguous run of periods within a single day and never
//! crosses a day boundary.
//!
//! Grid dimensions are configuration, not constants: a deployment with a
//! six-day week or ten-period days passes a different [`TimeGrid`].

use serde::{Deserialize, Serialize};

/// A (day, period) coordinate in the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    /// Day index (0 = first day of the week).
    pub day: usize,
    /// Period index within the day (0 = first period).
    pub period: usize,
}

impl Slot {
    /// Creates a slot coordinate.
    pub fn new(day: usize, period: usize) -> Self {
        Self { day, period }
    }
}

/// The weekly scheduling grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrid {
    day_names: Vec<String>,
    periods_per_day: usize,
}

impl TimeGrid {
    /// Creates a grid with the given day names and periods per day.
    pub fn new(day_names: Vec<String>, periods_per_day: usize) -> Self {
        Self {
            day_names,
            periods_per_day,
        }
    }

    /// Monday through Friday, eight periods per day.
    pub fn standard() -> Self {
        Self::new(
            ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            8,
        )
    }

    /// Number of days in the week.
    pub fn days(&self) -> usize {
        self.day_names.len()
    }

    /// Number of periods in each day.
    pub fn periods_per_day(&self) -> usize {
        self.periods_per_day
    }

    /// Total number of slots in the week.
    pub fn slot_count(&self) -> usize {
        self.days() * self.periods_per_day
    }

    /// Display name of a day.
    pub fn day_name(&self, day: usize) -> &str {
        &self.day_names[day]
    }

    /// All day names, in week order.
    pub fn day_names(&self) -> &[String] {
        &self.day_names
    }

    /// Whether a slot lies within the grid.
    pub fn contains(&self, slot: Slot) -> bool {
        slot.day < self.days() && slot.period < self.periods_per_day
    }

    /// Linear index of a slot (row-major: day, then period).
    pub fn slot_index(&self, slot: Slot) -> usize {
        slot.day * self.periods_per_day + slot.period
    }

    /// Whether a run of `duration` periods starting at `slot` stays
    /// within the slot's day.
    pub fn fits(&self, slot: Slot, duration: usize) -> bool {
        self.contains(slot) && duration >= 1 && slot.period + duration <= self.periods_per_day
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::standard()
    }
}

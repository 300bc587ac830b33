//! Per-entity availability bitsets.
//!
//! Converts each entity's declared availability data (time off, blocked
//! slots, whitelists) into a dense weekly bitset, giving the solver O(1)
//! "is this slot open" queries and O(duration) contiguous-run queries.
//! Built once per generation run and read-only afterward.
//!
//! An entity with no declared restriction is open on every slot; lookups
//! for ids without an explicit bitset fall back to a full grid.

use std::collections::HashMap;

use crate::models::{Slot, Snapshot, TimeGrid};

/// A fixed-size bitset over the weekly slot grid.
///
/// Bit i corresponds to the slot with linear index i
/// (see [`TimeGrid::slot_index`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBitset {
    words: Vec<u64>,
    len: usize,
}

impl SlotBitset {
    /// Creates a bitset with every slot open.
    pub fn full(len: usize) -> Self {
        let word_count = len.div_ceil(64);
        let mut words = vec![u64::MAX; word_count];
        // Mask off bits past the end so count_ones stays exact.
        if len % 64 != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << (len % 64)) - 1;
            }
        }
        Self { words, len }
    }

    /// Creates a bitset with every slot closed.
    pub fn empty(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Number of slots covered by this bitset.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the bitset covers zero slots.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Opens a slot.
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / 64] |= 1 << (index % 64);
    }

    /// Closes a slot.
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / 64] &= !(1 << (index % 64));
    }

    /// Whether a slot is open.
    pub fn contains(&self, index: usize) -> bool {
        index < self.len && self.words[index / 64] & (1 << (index % 64)) != 0
    }

    /// Whether all of `[start, start + duration)` is open.
    pub fn contains_run(&self, start: usize, duration: usize) -> bool {
        (start..start + duration).all(|i| self.contains(i))
    }

    /// Number of open slots.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Intersects this bitset with another of the same length.
    pub fn intersect_with(&mut self, other: &Self) {
        debug_assert_eq!(self.len, other.len);
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w &= o;
        }
    }
}

/// Read-only availability lookup for one generation run.
#[derive(Debug)]
pub struct AvailabilityIndex {
    grid: TimeGrid,
    full: SlotBitset,
    classes: HashMap<u32, SlotBitset>,
    faculties: HashMap<u32, SlotBitset>,
    classrooms: HashMap<u32, SlotBitset>,
    courses: HashMap<u32, SlotBitset>,
}

impl AvailabilityIndex {
    /// Builds the index from a snapshot.
    ///
    /// Out-of-grid slot references are assumed to have been rejected by
    /// validation and are skipped here.
    pub fn build(snapshot: &Snapshot, grid: &TimeGrid) -> Self {
        let len = grid.slot_count();

        let mut classes = HashMap::new();
        for class in &snapshot.classes {
            let mut bits = match &class.allowed_slots {
                Some(allowed) => whitelist(allowed, grid),
                None => SlotBitset::full(len),
            };
            close_all(&mut bits, &class.blocked_slots, grid);
            classes.insert(class.id, bits);
        }

        let mut faculties = HashMap::new();
        for faculty in &snapshot.faculties {
            let mut bits = SlotBitset::full(len);
            close_all(&mut bits, &faculty.time_off, grid);
            faculties.insert(faculty.id, bits);
        }

        let mut classrooms = HashMap::new();
        for room in &snapshot.classrooms {
            let mut bits = SlotBitset::full(len);
            close_all(&mut bits, &room.blocked_slots, grid);
            classrooms.insert(room.id, bits);
        }

        let mut courses = HashMap::new();
        for course in &snapshot.courses {
            let bits = match &course.allowed_slots {
                Some(allowed) => whitelist(allowed, grid),
                None => SlotBitset::full(len),
            };
            courses.insert(course.id, bits);
        }

        Self {
            grid: grid.clone(),
            full: SlotBitset::full(len),
            classes,
            faculties,
            classrooms,
            courses,
        }
    }

    /// The grid this index was built for.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Open slots for a class.
    pub fn class(&self, id: u32) -> &SlotBitset {
        self.classes.get(&id).unwrap_or(&self.full)
    }

    /// Open slots for a faculty member.
    pub fn faculty(&self, id: u32) -> &SlotBitset {
        self.faculties.get(&id).unwrap_or(&self.full)
    }

    /// Open slots for a classroom.
    pub fn classroom(&self, id: u32) -> &SlotBitset {
        self.classrooms.get(&id).unwrap_or(&self.full)
    }

    /// Open slots for a course.
    pub fn course(&self, id: u32) -> &SlotBitset {
        self.courses.get(&id).unwrap_or(&self.full)
    }
}

fn whitelist(allowed: &[Slot], grid: &TimeGrid) -> SlotBitset {
    let mut bits = SlotBitset::empty(grid.slot_count());
    for &slot in allowed {
        if grid.contains(slot) {
            bits.set(grid.slot_index(slot));
        }
    }
    bits
}

fn close_all(bits: &mut SlotBitset, blocked: &[Slot], grid: &TimeGrid) {
    for &slot in blocked {
        if grid.contains(slot) {
            bits.clear(grid.slot_index(slot));
        }
    }
}

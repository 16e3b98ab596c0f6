//! Static weekly time grids, one per grade level.
//!
//! Every grid lists its slots in day order. A slot's canonical key is its
//! Monday–Thursday display time; the shorter Friday periods map onto the same
//! key so a weekly assignment occupies one key regardless of the day.

use crate::data::{GradeLevel, SlotKey};
use crate::error::SchedulerError;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKind {
    Teaching,
    Recess,
    /// Homeroom guidance period, reserved for the section's adviser.
    Hgp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDef {
    pub display_mon_thu: &'static str,
    pub display_fri: &'static str,
    pub key: &'static str,
    pub kind: SlotKind,
}

const fn slot(mon_thu: &'static str, fri: &'static str, kind: SlotKind) -> SlotDef {
    SlotDef {
        display_mon_thu: mon_thu,
        display_fri: fri,
        key: mon_thu,
        kind,
    }
}

#[derive(Debug)]
pub struct TimeGrid {
    pub name: &'static str,
    pub slots: &'static [SlotDef],
}

pub static MORNING_GRID: TimeGrid = TimeGrid {
    name: "morning",
    slots: &[
        slot("06:00-06:45", "06:00-06:40", SlotKind::Teaching),
        slot("06:45-07:30", "06:40-07:20", SlotKind::Teaching),
        slot("07:30-08:15", "07:20-08:00", SlotKind::Teaching),
        slot("08:15-08:30", "08:00-08:15", SlotKind::Recess),
        slot("08:30-09:15", "08:15-08:55", SlotKind::Teaching),
        slot("09:15-10:00", "08:55-09:35", SlotKind::Teaching),
        slot("10:00-10:45", "09:35-10:15", SlotKind::Teaching),
        slot("10:45-11:30", "10:15-10:55", SlotKind::Teaching),
        slot("11:30-12:15", "10:55-11:40", SlotKind::Hgp),
    ],
};

pub static AFTERNOON_GRID: TimeGrid = TimeGrid {
    name: "afternoon",
    slots: &[
        slot("12:30-13:15", "12:30-13:10", SlotKind::Teaching),
        slot("13:15-14:00", "13:10-13:50", SlotKind::Teaching),
        slot("14:00-14:45", "13:50-14:30", SlotKind::Teaching),
        slot("14:45-15:00", "14:30-14:45", SlotKind::Recess),
        slot("15:00-15:45", "14:45-15:25", SlotKind::Teaching),
        slot("15:45-16:30", "15:25-16:05", SlotKind::Teaching),
        slot("16:30-17:15", "16:05-16:45", SlotKind::Teaching),
        slot("17:15-18:00", "16:45-17:25", SlotKind::Teaching),
        slot("18:00-18:45", "17:25-18:10", SlotKind::Hgp),
    ],
};

impl TimeGrid {
    fn key_of(&self, kind: SlotKind) -> Option<&'static str> {
        self.slots.iter().find(|s| s.kind == kind).map(|s| s.key)
    }

    pub fn recess_key(&self) -> Option<&'static str> {
        self.key_of(SlotKind::Recess)
    }

    pub fn hgp_key(&self) -> Option<&'static str> {
        self.key_of(SlotKind::Hgp)
    }

    /// Keys available for general subject placement, in day order.
    pub fn teaching_slots(&self) -> Vec<SlotKey> {
        self.slots
            .iter()
            .filter(|s| s.kind == SlotKind::Teaching)
            .map(|s| s.key.to_string())
            .collect()
    }

    /// Every key in the grid, recess and HGP included.
    pub fn all_keys(&self) -> Vec<SlotKey> {
        self.slots.iter().map(|s| s.key.to_string()).collect()
    }

    pub fn slot(&self, key: &str) -> Option<&'static SlotDef> {
        self.slots.iter().find(|s| s.key == key)
    }

    /// Maps either a Mon–Thu or a Friday display time to the canonical key.
    pub fn canonical_key(&self, display: &str) -> Option<&'static str> {
        let display = display.trim();
        self.slots
            .iter()
            .find(|s| s.display_mon_thu == display || s.display_fri == display)
            .map(|s| s.key)
    }
}

/// Grade level to grid lookup.
#[derive(Debug)]
pub struct TimeGridRegistry {
    grids: HashMap<GradeLevel, &'static TimeGrid>,
}

impl Default for TimeGridRegistry {
    fn default() -> Self {
        Self::new([
            (7, &MORNING_GRID),
            (8, &AFTERNOON_GRID),
            (9, &MORNING_GRID),
            (10, &AFTERNOON_GRID),
        ])
    }
}

impl TimeGridRegistry {
    pub fn new(grids: impl IntoIterator<Item = (GradeLevel, &'static TimeGrid)>) -> Self {
        Self {
            grids: grids.into_iter().collect(),
        }
    }

    pub fn get_grid(&self, grade_level: GradeLevel) -> Result<&'static TimeGrid, SchedulerError> {
        self.grids
            .get(&grade_level)
            .copied()
            .ok_or(SchedulerError::UnknownGradeLevel(grade_level))
    }

    pub fn teaching_slots(&self, grade_level: GradeLevel) -> Result<Vec<SlotKey>, SchedulerError> {
        Ok(self.get_grid(grade_level)?.teaching_slots())
    }

    pub fn canonical_key(
        &self,
        grade_level: GradeLevel,
        display: &str,
    ) -> Result<Option<&'static str>, SchedulerError> {
        Ok(self.get_grid(grade_level)?.canonical_key(display))
    }

    /// Looks a key up in every configured grid. Used when rendering a
    /// teacher's timetable, which may span grades.
    pub fn find_slot(&self, key: &str) -> Option<&'static SlotDef> {
        self.grids.values().find_map(|grid| grid.slot(key))
    }
}

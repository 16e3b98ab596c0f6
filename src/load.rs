use crate::data::{TeacherId, TeacherLoadRow};
use crate::store::{mutations, queries};
use log::{debug, info};
use rusqlite::Connection;
use std::collections::BTreeMap;

/// Ceiling used when a teacher has no load row for the school year.
pub const DEFAULT_MAX_LOAD: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Load {
    pub current: u32,
    pub max: u32,
}

impl Load {
    pub fn has_room(&self) -> bool {
        self.current < self.max
    }
}

/// In-memory view of teacher loads for one school year.
///
/// Changes stay in memory until [`LoadTracker::commit`].
#[derive(Debug, Clone)]
pub struct LoadTracker {
    default_max: u32,
    loads: BTreeMap<TeacherId, Load>,
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOAD)
    }
}

impl LoadTracker {
    pub fn new(default_max: u32) -> Self {
        Self {
            default_max,
            loads: BTreeMap::new(),
        }
    }

    pub fn from_rows(default_max: u32, rows: &[TeacherLoadRow]) -> Self {
        let mut tracker = Self::new(default_max);
        for row in rows {
            tracker.loads.insert(
                row.teacher_id,
                Load {
                    current: row.current_load,
                    max: row.max_load,
                },
            );
        }
        tracker
    }

    /// Reads the persisted rows for `school_year`.
    pub fn load(conn: &Connection, school_year: &str, default_max: u32) -> rusqlite::Result<Self> {
        let rows = queries::load_rows(conn, school_year)?;
        debug!("Loaded {} teacher load rows for {}", rows.len(), school_year);
        Ok(Self::from_rows(default_max, &rows))
    }

    pub fn load_of(&self, teacher_id: TeacherId) -> Load {
        self.loads.get(&teacher_id).copied().unwrap_or(Load {
            current: 0,
            max: self.default_max,
        })
    }

    /// Returns the teacher's new current load.
    pub fn increment(&mut self, teacher_id: TeacherId) -> u32 {
        let mut load = self.load_of(teacher_id);
        load.current += 1;
        self.loads.insert(teacher_id, load);
        load.current
    }

    /// Gives back a period taken by [`increment`](Self::increment).
    pub fn release(&mut self, teacher_id: TeacherId) {
        let mut load = self.load_of(teacher_id);
        load.current = load.current.saturating_sub(1);
        self.loads.insert(teacher_id, load);
    }

    pub fn rows(&self, school_year: &str) -> Vec<TeacherLoadRow> {
        self.loads
            .iter()
            .map(|(teacher_id, load)| TeacherLoadRow {
                teacher_id: *teacher_id,
                school_year: school_year.to_string(),
                current_load: load.current,
                max_load: load.max,
            })
            .collect()
    }

    /// Upserts every tracked teacher keyed by (teacher, school year).
    pub fn commit(&self, conn: &Connection, school_year: &str) -> rusqlite::Result<()> {
        for row in self.rows(school_year) {
            mutations::upsert_load(conn, &row)?;
        }
        debug!("Committed {} teacher loads for {}", self.loads.len(), school_year);
        Ok(())
    }

    /// Recounts every teacher's load from persisted slots and writes it back.
    /// Teachers without slots get an explicit zero.
    pub fn recompute_from_actual_slots(
        conn: &Connection,
        school_year: &str,
        default_max: u32,
    ) -> rusqlite::Result<Self> {
        let mut tracker = Self::load(conn, school_year, default_max)?;
        let counts = queries::slot_counts(conn, school_year)?;
        for teacher_id in queries::teacher_ids(conn)? {
            let mut load = tracker.load_of(teacher_id);
            load.current = counts.get(&teacher_id).copied().unwrap_or(0);
            tracker.loads.insert(teacher_id, load);
        }
        tracker.commit(conn, school_year)?;
        info!(
            "Recalculated loads for {} teachers in {} ({} with slots)",
            tracker.loads.len(),
            school_year,
            counts.len()
        );
        Ok(tracker)
    }
}

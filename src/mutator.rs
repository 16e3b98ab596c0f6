//! Ordered multi-table writes for persisting and clearing a schedule.
//!
//! Callers pass a transaction; nothing here commits.

use crate::data::{ClearReport, PlacedAssignment, Section, SectionId, TeacherId, TeacherLoadRow};
use crate::error::SchedulerError;
use crate::load::LoadTracker;
use crate::store::mutations::{self, NewSlot};
use crate::store::queries;
use crate::time_grid::TimeGridRegistry;
use itertools::Itertools;
use log::{debug, info};
use rusqlite::Connection;
use std::collections::HashMap;

/// Deletes grades, then slots, then assignments for every section in scope.
///
/// After the linked slots go, a sweep removes legacy slots that only carry
/// the section's name, restricted to the teachers assigned to the section
/// and the grade's teaching-slot keys.
pub fn clear_scope(
    conn: &Connection,
    registry: &TimeGridRegistry,
    sections: &[Section],
    school_year: &str,
) -> Result<ClearReport, SchedulerError> {
    let mut report = ClearReport::default();

    for section in sections {
        let teaching_keys = registry.teaching_slots(section.grade_level)?;
        let teacher_ids: Vec<TeacherId> =
            queries::assignments_for_sections(conn, &[section.id], school_year)?
                .into_iter()
                .map(|a| a.teacher_id)
                .unique()
                .collect();

        let grades = mutations::delete_grades_for_section(conn, section.id, school_year)?;
        let linked = mutations::delete_slots_for_section(conn, section.id, school_year)?;
        let swept = mutations::delete_unlinked_slots(
            conn,
            &section.name,
            &teacher_ids,
            &teaching_keys,
            school_year,
        )?;
        let assignments =
            mutations::delete_assignments_for_section(conn, section.id, school_year)?;

        debug!(
            "Cleared section {}: {} grades, {} slots ({} swept), {} assignments",
            section.name,
            grades,
            linked + swept,
            swept,
            assignments
        );
        report.deleted_grades += grades;
        report.deleted_slots += linked + swept;
        report.deleted_assignments += assignments;
    }

    info!(
        "Cleared {} sections for {}: {} assignments, {} slots, {} grades",
        sections.len(),
        school_year,
        report.deleted_assignments,
        report.deleted_slots,
        report.deleted_grades
    );
    Ok(report)
}

/// Inserts each assignment and then its slot, linked by the new row id.
/// Returns the number of slots written.
pub fn persist(
    conn: &Connection,
    sections: &[Section],
    placed: &[PlacedAssignment],
    school_year: &str,
) -> Result<usize, SchedulerError> {
    let names: HashMap<SectionId, &str> =
        sections.iter().map(|s| (s.id, s.name.as_str())).collect();

    for assignment in placed {
        let assignment_id = mutations::insert_assignment(
            conn,
            assignment.teacher_id,
            assignment.subject_id,
            assignment.section_id,
            school_year,
        )?;
        mutations::insert_slot(
            conn,
            &NewSlot {
                teacher_id: assignment.teacher_id,
                assignment_id: Some(assignment_id),
                section_id: assignment.section_id,
                section_name: names.get(&assignment.section_id).copied().unwrap_or_default(),
                slot_key: &assignment.slot_key,
                school_year,
            },
        )?;
    }
    Ok(placed.len())
}

/// Recounts loads from the slots now persisted; teachers without slots are
/// written back as zero.
pub fn reconcile_loads(
    conn: &Connection,
    school_year: &str,
    default_max: u32,
) -> Result<Vec<TeacherLoadRow>, SchedulerError> {
    let tracker = LoadTracker::recompute_from_actual_slots(conn, school_year, default_max)?;
    Ok(tracker.rows(school_year))
}

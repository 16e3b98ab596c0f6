//! Operator actions: auto-schedule, clear, and load recalculation.
//!
//! Each action runs inside a single SQLite transaction. Any error rolls back
//! every write the action made, so a failed run never leaves half a schedule
//! behind.

use crate::context::PlanningContext;
use crate::data::{
    AutoScheduleReport, ClearReport, ScheduleRequest, SectionId, TeacherId, TeacherLoadRow,
    TimetableEntry,
};
use crate::error::SchedulerError;
use crate::load::LoadTracker;
use crate::mutator;
use crate::planner::{Planner, PlannerSettings};
use crate::store::queries::{self, TimetableRow};
use crate::time_grid::TimeGridRegistry;
use log::info;
use rusqlite::Connection;
use std::time::Instant;

pub fn auto_schedule(
    conn: &mut Connection,
    registry: &TimeGridRegistry,
    settings: &PlannerSettings,
    request: &ScheduleRequest,
) -> Result<AutoScheduleReport, SchedulerError> {
    let start_time = Instant::now();
    let school_year = request.school_year.as_str();
    let tx = conn.transaction()?;

    let sections = queries::sections_in_scope(&tx, &request.scope)?;
    for section in &sections {
        registry.get_grid(section.grade_level)?;
    }
    let section_ids: Vec<SectionId> = sections.iter().map(|s| s.id).collect();

    let teachers = queries::active_teachers(&tx)?;
    let subjects = queries::subjects(&tx)?;
    let existing = queries::assignments_for_sections(&tx, &section_ids, school_year)?;
    let slots = queries::slots_for_year(&tx, school_year)?;
    let loads = LoadTracker::load(&tx, school_year, settings.default_max_load)?;

    let mut ctx = PlanningContext::new(loads);
    ctx.seed_assignments(&existing);
    ctx.seed_slots(&slots, &sections);

    let planner = Planner::new(*settings, registry, &teachers, &subjects);
    planner.plan(&sections, &mut ctx)?;

    let sections_missing_teachers = ctx.sections_missing_teachers();
    let (placed, gaps) = ctx.into_parts();

    let created_slots = mutator::persist(&tx, &sections, &placed, school_year)?;
    // persisted loads are recounted from the slots, not taken from the tracker
    mutator::reconcile_loads(&tx, school_year, settings.default_max_load)?;
    tx.commit()?;

    let message = format!(
        "Auto-schedule complete: created {} assignments",
        placed.len()
    );
    info!(
        "{} for {} sections in {:.2?} ({} gaps)",
        message,
        sections.len(),
        start_time.elapsed(),
        gaps.len()
    );

    Ok(AutoScheduleReport {
        created_assignments: placed.len(),
        created_slots,
        assignments: placed,
        gaps,
        sections_missing_teachers,
        message,
    })
}

pub fn clear(
    conn: &mut Connection,
    registry: &TimeGridRegistry,
    settings: &PlannerSettings,
    request: &ScheduleRequest,
) -> Result<ClearReport, SchedulerError> {
    let school_year = request.school_year.as_str();
    let tx = conn.transaction()?;

    let sections = queries::sections_in_scope(&tx, &request.scope)?;
    for section in &sections {
        registry.get_grid(section.grade_level)?;
    }

    let mut report = mutator::clear_scope(&tx, registry, &sections, school_year)?;
    mutator::reconcile_loads(&tx, school_year, settings.default_max_load)?;
    tx.commit()?;

    report.message = format!(
        "Removed {} assignments from {} sections",
        report.deleted_assignments,
        sections.len()
    );
    Ok(report)
}

pub fn recalculate_loads(
    conn: &mut Connection,
    settings: &PlannerSettings,
    school_year: &str,
) -> Result<Vec<TeacherLoadRow>, SchedulerError> {
    let tx = conn.transaction()?;
    let rows = mutator::reconcile_loads(&tx, school_year, settings.default_max_load)?;
    tx.commit()?;
    Ok(rows)
}

pub fn teacher_loads(
    conn: &Connection,
    school_year: &str,
) -> Result<Vec<TeacherLoadRow>, SchedulerError> {
    Ok(queries::load_rows(conn, school_year)?)
}

fn to_entry(registry: &TimeGridRegistry, row: TimetableRow) -> TimetableEntry {
    let (display_mon_thu, display_fri) = registry
        .find_slot(&row.slot_key)
        .map(|s| (s.display_mon_thu.to_string(), s.display_fri.to_string()))
        .unwrap_or_else(|| (row.slot_key.clone(), row.slot_key.clone()));
    TimetableEntry {
        slot_key: row.slot_key,
        display_mon_thu,
        display_fri,
        teacher_id: row.teacher_id,
        section_id: row.section_id,
        section_name: row.section_name,
        subject_id: row.subject_id,
        subject_name: row.subject_name,
    }
}

pub fn section_schedule(
    conn: &Connection,
    registry: &TimeGridRegistry,
    section_id: SectionId,
    school_year: &str,
) -> Result<Vec<TimetableEntry>, SchedulerError> {
    let section =
        queries::section(conn, section_id)?.ok_or(SchedulerError::SectionNotFound(section_id))?;
    registry.get_grid(section.grade_level)?;
    Ok(queries::section_timetable(conn, section_id, school_year)?
        .into_iter()
        .map(|row| to_entry(registry, row))
        .collect())
}

pub fn teacher_schedule(
    conn: &Connection,
    registry: &TimeGridRegistry,
    teacher_id: TeacherId,
    school_year: &str,
) -> Result<Vec<TimetableEntry>, SchedulerError> {
    queries::teacher(conn, teacher_id)?.ok_or(SchedulerError::TeacherNotFound(teacher_id))?;
    Ok(queries::teacher_timetable(conn, teacher_id, school_year)?
        .into_iter()
        .map(|row| to_entry(registry, row))
        .collect())
}

use super::placeholders;
use crate::data::{
    Assignment, GradeLevel, ScheduledSlot, Scope, Section, SectionId, Subject, SubjectId, Teacher,
    TeacherId, TeacherLoadRow,
};
use crate::error::SchedulerError;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::HashMap;

const TEACHER_COLUMNS: &str = "id, first_name, last_name, employee_number, position,
     department_id, is_active, advisory_section_id";

fn teacher_from_row(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        employee_number: row.get(3)?,
        position: row.get(4)?,
        department_id: row.get(5)?,
        is_active: row.get(6)?,
        advisory_section_id: row.get(7)?,
    })
}

fn section_from_row(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        id: row.get(0)?,
        name: row.get(1)?,
        grade_level: row.get(2)?,
        adviser_id: row.get(3)?,
    })
}

pub fn active_teachers(conn: &Connection) -> rusqlite::Result<Vec<Teacher>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEACHER_COLUMNS} FROM teachers WHERE is_active = 1 ORDER BY id"
    ))?;
    stmt.query_map([], teacher_from_row)?.collect()
}

pub fn teacher(conn: &Connection, teacher_id: TeacherId) -> rusqlite::Result<Option<Teacher>> {
    conn.query_row(
        &format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = ?"),
        [teacher_id],
        teacher_from_row,
    )
    .optional()
}

pub fn teacher_ids(conn: &Connection) -> rusqlite::Result<Vec<TeacherId>> {
    let mut stmt = conn.prepare("SELECT id FROM teachers ORDER BY id")?;
    stmt.query_map([], |row| row.get(0))?.collect()
}

pub fn section(conn: &Connection, section_id: SectionId) -> rusqlite::Result<Option<Section>> {
    conn.query_row(
        "SELECT id, name, grade_level, adviser_id FROM sections WHERE id = ?",
        [section_id],
        section_from_row,
    )
    .optional()
}

pub fn sections_by_grade(
    conn: &Connection,
    grade_level: GradeLevel,
) -> rusqlite::Result<Vec<Section>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, grade_level, adviser_id FROM sections
         WHERE grade_level = ?
         ORDER BY name, id",
    )?;
    stmt.query_map([grade_level], section_from_row)?.collect()
}

pub fn all_sections(conn: &Connection) -> rusqlite::Result<Vec<Section>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, grade_level, adviser_id FROM sections
         ORDER BY grade_level, name, id",
    )?;
    stmt.query_map([], section_from_row)?.collect()
}

/// Resolves an operator scope to its sections, ordered by grade then name.
pub fn sections_in_scope(conn: &Connection, scope: &Scope) -> Result<Vec<Section>, SchedulerError> {
    match scope {
        Scope::AllGrades => Ok(all_sections(conn)?),
        Scope::Grade { grade_level } => Ok(sections_by_grade(conn, *grade_level)?),
        Scope::Section { section_id } => section(conn, *section_id)?
            .map(|s| vec![s])
            .ok_or(SchedulerError::SectionNotFound(*section_id)),
    }
}

pub fn subjects(conn: &Connection) -> rusqlite::Result<Vec<Subject>> {
    let mut stmt = conn.prepare(
        "SELECT id, code, name, department_id, is_advisory FROM subjects ORDER BY id",
    )?;
    stmt.query_map([], |row| {
        Ok(Subject {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            department_id: row.get(3)?,
            is_advisory: row.get(4)?,
        })
    })?
    .collect()
}

pub fn load_rows(conn: &Connection, school_year: &str) -> rusqlite::Result<Vec<TeacherLoadRow>> {
    let mut stmt = conn.prepare(
        "SELECT teacher_id, school_year, current_load, max_load
         FROM teacher_loads
         WHERE school_year = ?
         ORDER BY teacher_id",
    )?;
    stmt.query_map([school_year], |row| {
        Ok(TeacherLoadRow {
            teacher_id: row.get(0)?,
            school_year: row.get(1)?,
            current_load: row.get(2)?,
            max_load: row.get(3)?,
        })
    })?
    .collect()
}

pub fn assignments_for_sections(
    conn: &Connection,
    section_ids: &[SectionId],
    school_year: &str,
) -> rusqlite::Result<Vec<Assignment>> {
    if section_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, teacher_id, subject_id, section_id
         FROM teacher_subjects
         WHERE school_year = ? AND section_id IN ({})
         ORDER BY id",
        placeholders(section_ids.len())
    );
    let mut values: Vec<rusqlite::types::Value> = vec![school_year.to_string().into()];
    values.extend(section_ids.iter().map(|id| (*id).into()));

    let mut stmt = conn.prepare(&sql)?;
    stmt.query_map(params_from_iter(values), |row| {
        Ok(Assignment {
            id: row.get(0)?,
            teacher_id: row.get(1)?,
            subject_id: row.get(2)?,
            section_id: row.get(3)?,
        })
    })?
    .collect()
}

pub fn slots_for_year(conn: &Connection, school_year: &str) -> rusqlite::Result<Vec<ScheduledSlot>> {
    let mut stmt = conn.prepare(
        "SELECT teacher_id, section_id, section_name, slot_key
         FROM teacher_schedules
         WHERE school_year = ?
         ORDER BY id",
    )?;
    stmt.query_map([school_year], |row| {
        Ok(ScheduledSlot {
            teacher_id: row.get(0)?,
            section_id: row.get(1)?,
            section_name: row.get(2)?,
            slot_key: row.get(3)?,
        })
    })?
    .collect()
}

/// Number of scheduled slots each teacher holds in the school year.
pub fn slot_counts(
    conn: &Connection,
    school_year: &str,
) -> rusqlite::Result<HashMap<TeacherId, u32>> {
    let mut stmt = conn.prepare(
        "SELECT teacher_id, COUNT(*)
         FROM teacher_schedules
         WHERE school_year = ?
         GROUP BY teacher_id",
    )?;
    stmt.query_map([school_year], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect()
}

/// A timetable row joined with its section and subject names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableRow {
    pub teacher_id: TeacherId,
    pub section_id: Option<SectionId>,
    pub section_name: Option<String>,
    pub subject_id: Option<SubjectId>,
    pub subject_name: Option<String>,
    pub slot_key: String,
}

const TIMETABLE_SELECT: &str = "SELECT ts.teacher_id,
            ts.section_id,
            COALESCE(s.name, ts.section_name),
            tsub.subject_id,
            sub.name,
            ts.slot_key
     FROM teacher_schedules ts
     LEFT JOIN sections s ON s.id = ts.section_id
     LEFT JOIN teacher_subjects tsub ON tsub.id = ts.teacher_subject_id
     LEFT JOIN subjects sub ON sub.id = tsub.subject_id";

fn timetable_from_row(row: &Row<'_>) -> rusqlite::Result<TimetableRow> {
    Ok(TimetableRow {
        teacher_id: row.get(0)?,
        section_id: row.get(1)?,
        section_name: row.get(2)?,
        subject_id: row.get(3)?,
        subject_name: row.get(4)?,
        slot_key: row.get(5)?,
    })
}

pub fn section_timetable(
    conn: &Connection,
    section_id: SectionId,
    school_year: &str,
) -> rusqlite::Result<Vec<TimetableRow>> {
    let mut stmt = conn.prepare(&format!(
        "{TIMETABLE_SELECT}
         WHERE ts.section_id = ?1 AND ts.school_year = ?2
         ORDER BY ts.slot_key"
    ))?;
    stmt.query_map(params![section_id, school_year], timetable_from_row)?
        .collect()
}

pub fn teacher_timetable(
    conn: &Connection,
    teacher_id: TeacherId,
    school_year: &str,
) -> rusqlite::Result<Vec<TimetableRow>> {
    let mut stmt = conn.prepare(&format!(
        "{TIMETABLE_SELECT}
         WHERE ts.teacher_id = ?1 AND ts.school_year = ?2
         ORDER BY ts.slot_key"
    ))?;
    stmt.query_map(params![teacher_id, school_year], timetable_from_row)?
        .collect()
}

use super::placeholders;
use crate::data::{
    AssignmentId, RosterSnapshot, SectionId, SubjectId, TeacherId, TeacherLoadRow,
};
use rusqlite::{Connection, params, params_from_iter, types::Value};

/// Upserts every row of the snapshot by primary key.
pub fn import_roster(conn: &Connection, snapshot: &RosterSnapshot) -> rusqlite::Result<()> {
    for department in &snapshot.departments {
        conn.execute(
            "INSERT INTO departments(id, name) VALUES(?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![department.id, department.name],
        )?;
    }
    for teacher in &snapshot.teachers {
        conn.execute(
            "INSERT INTO teachers(id, first_name, last_name, employee_number, position,
                                  department_id, is_active, advisory_section_id)
             VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
               first_name = excluded.first_name,
               last_name = excluded.last_name,
               employee_number = excluded.employee_number,
               position = excluded.position,
               department_id = excluded.department_id,
               is_active = excluded.is_active,
               advisory_section_id = excluded.advisory_section_id",
            params![
                teacher.id,
                teacher.first_name,
                teacher.last_name,
                teacher.employee_number,
                teacher.position,
                teacher.department_id,
                teacher.is_active,
                teacher.advisory_section_id
            ],
        )?;
    }
    for section in &snapshot.sections {
        conn.execute(
            "INSERT INTO sections(id, name, grade_level, adviser_id) VALUES(?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
               name = excluded.name,
               grade_level = excluded.grade_level,
               adviser_id = excluded.adviser_id",
            params![section.id, section.name, section.grade_level, section.adviser_id],
        )?;
    }
    for subject in &snapshot.subjects {
        conn.execute(
            "INSERT INTO subjects(id, code, name, department_id, is_advisory)
             VALUES(?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
               code = excluded.code,
               name = excluded.name,
               department_id = excluded.department_id,
               is_advisory = excluded.is_advisory",
            params![
                subject.id,
                subject.code,
                subject.name,
                subject.department_id,
                subject.is_advisory
            ],
        )?;
    }
    Ok(())
}

/// Keyed by (teacher, school year). Only `current_load` is overwritten when
/// the row already exists, so an edited ceiling survives a recount.
pub fn upsert_load(conn: &Connection, row: &TeacherLoadRow) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO teacher_loads(teacher_id, school_year, current_load, max_load)
         VALUES(?1, ?2, ?3, ?4)
         ON CONFLICT(teacher_id, school_year) DO UPDATE SET
           current_load = excluded.current_load",
        params![row.teacher_id, row.school_year, row.current_load, row.max_load],
    )?;
    Ok(())
}

pub fn insert_assignment(
    conn: &Connection,
    teacher_id: TeacherId,
    subject_id: SubjectId,
    section_id: SectionId,
    school_year: &str,
) -> rusqlite::Result<AssignmentId> {
    conn.execute(
        "INSERT INTO teacher_subjects(teacher_id, subject_id, section_id, school_year)
         VALUES(?1, ?2, ?3, ?4)",
        params![teacher_id, subject_id, section_id, school_year],
    )?;
    Ok(conn.last_insert_rowid())
}

pub struct NewSlot<'a> {
    pub teacher_id: TeacherId,
    pub assignment_id: Option<AssignmentId>,
    pub section_id: SectionId,
    pub section_name: &'a str,
    pub slot_key: &'a str,
    pub school_year: &'a str,
}

pub fn insert_slot(conn: &Connection, slot: &NewSlot<'_>) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO teacher_schedules(teacher_id, teacher_subject_id, section_id,
                                       section_name, slot_key, school_year)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            slot.teacher_id,
            slot.assignment_id,
            slot.section_id,
            slot.section_name,
            slot.slot_key,
            slot.school_year
        ],
    )?;
    Ok(())
}

pub fn delete_grades_for_section(
    conn: &Connection,
    section_id: SectionId,
    school_year: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM grades
         WHERE teacher_subject_id IN (
           SELECT id FROM teacher_subjects WHERE section_id = ?1 AND school_year = ?2
         )",
        params![section_id, school_year],
    )
}

/// Slots linked to the section directly or through one of its assignments.
pub fn delete_slots_for_section(
    conn: &Connection,
    section_id: SectionId,
    school_year: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM teacher_schedules
         WHERE school_year = ?2
           AND (section_id = ?1
                OR teacher_subject_id IN (
                  SELECT id FROM teacher_subjects WHERE section_id = ?1 AND school_year = ?2
                ))",
        params![section_id, school_year],
    )
}

/// Sweeps legacy rows that lack a section link but name the section, limited
/// to the given teachers and slot keys.
pub fn delete_unlinked_slots(
    conn: &Connection,
    section_name: &str,
    teacher_ids: &[TeacherId],
    slot_keys: &[String],
    school_year: &str,
) -> rusqlite::Result<usize> {
    if teacher_ids.is_empty() || slot_keys.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "DELETE FROM teacher_schedules
         WHERE section_id IS NULL
           AND section_name = ?
           AND school_year = ?
           AND teacher_id IN ({})
           AND slot_key IN ({})",
        placeholders(teacher_ids.len()),
        placeholders(slot_keys.len())
    );
    let mut values: Vec<Value> = vec![
        section_name.to_string().into(),
        school_year.to_string().into(),
    ];
    values.extend(teacher_ids.iter().map(|id| Value::from(*id)));
    values.extend(slot_keys.iter().map(|key| Value::from(key.clone())));
    conn.execute(&sql, params_from_iter(values))
}

pub fn delete_assignments_for_section(
    conn: &Connection,
    section_id: SectionId,
    school_year: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM teacher_subjects WHERE section_id = ?1 AND school_year = ?2",
        params![section_id, school_year],
    )
}

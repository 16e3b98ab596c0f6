#![allow(dead_code)]

use class_scheduler::data::{
    Department, GradeLevel, RosterSnapshot, ScheduleRequest, Scope, Section, SectionId, Subject,
    Teacher, TeacherId, TeacherLoadRow,
};
use class_scheduler::store::{self, mutations};
use rusqlite::{Connection, params};
use std::collections::HashSet;

pub const YEAR: &str = "2025-2026";

/// Builds a roster and loads it into a fresh in-memory store.
#[derive(Default)]
pub struct RosterBuilder {
    snapshot: RosterSnapshot,
    loads: Vec<TeacherLoadRow>,
}

impl RosterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(mut self, id: i64) -> Self {
        self.snapshot.departments.push(Department {
            id,
            name: format!("Department {id}"),
        });
        self
    }

    pub fn subject(mut self, id: i64, department_id: i64) -> Self {
        self.snapshot.subjects.push(Subject {
            id,
            code: format!("SUB{id}"),
            name: format!("Subject {id}"),
            department_id,
            is_advisory: false,
        });
        self
    }

    pub fn advisory_subject(mut self, id: i64, department_id: i64) -> Self {
        self.snapshot.subjects.push(Subject {
            id,
            code: format!("HGP{id}"),
            name: format!("Homeroom {id}"),
            department_id,
            is_advisory: true,
        });
        self
    }

    pub fn teacher(mut self, id: TeacherId, department_id: i64) -> Self {
        self.snapshot.teachers.push(Teacher {
            id,
            first_name: format!("Teacher{id}"),
            last_name: "Santos".into(),
            employee_number: Some(format!("EMP-{id}")),
            position: Some("Teacher I".into()),
            department_id: Some(department_id),
            is_active: true,
            advisory_section_id: None,
        });
        self
    }

    pub fn inactive_teacher(mut self, id: TeacherId, department_id: i64) -> Self {
        self = self.teacher(id, department_id);
        if let Some(t) = self.snapshot.teachers.last_mut() {
            t.is_active = false;
        }
        self
    }

    pub fn section(mut self, id: SectionId, grade_level: GradeLevel) -> Self {
        self.snapshot.sections.push(Section {
            id,
            name: format!("{grade_level}-{id}"),
            grade_level,
            adviser_id: None,
        });
        self
    }

    pub fn advised_section(
        mut self,
        id: SectionId,
        grade_level: GradeLevel,
        adviser_id: TeacherId,
    ) -> Self {
        self = self.section(id, grade_level);
        if let Some(s) = self.snapshot.sections.last_mut() {
            s.adviser_id = Some(adviser_id);
        }
        if let Some(t) = self
            .snapshot
            .teachers
            .iter_mut()
            .find(|t| t.id == adviser_id)
        {
            t.advisory_section_id = Some(id);
        }
        self
    }

    pub fn load(mut self, teacher_id: TeacherId, current: u32, max: u32) -> Self {
        self.loads.push(TeacherLoadRow {
            teacher_id,
            school_year: YEAR.into(),
            current_load: current,
            max_load: max,
        });
        self
    }

    pub fn build(self) -> Connection {
        let conn = store::open_in_memory().expect("open store");
        mutations::import_roster(&conn, &self.snapshot).expect("import roster");
        for row in &self.loads {
            mutations::upsert_load(&conn, row).expect("seed load");
        }
        conn
    }
}

/// Eight departments, each with `teachers_per_department` teachers and one
/// subject. Teacher ids are `100 * department + n`, subject ids `10 + dept`.
pub fn full_faculty(teachers_per_department: i64) -> RosterBuilder {
    let mut builder = RosterBuilder::new();
    for dept in 1..=8 {
        builder = builder.department(dept).subject(10 + dept, dept);
        for n in 1..=teachers_per_department {
            builder = builder.teacher(100 * dept + n, dept);
        }
    }
    builder
}

pub fn request(scope: Scope) -> ScheduleRequest {
    ScheduleRequest {
        school_year: YEAR.into(),
        scope,
    }
}

pub fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).expect("count query")
}

/// Grades recorded against the section's assignments for the year.
pub fn grades_for_section(conn: &Connection, section_id: SectionId) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM grades g
         JOIN teacher_subjects ts ON ts.id = g.teacher_subject_id
         WHERE ts.section_id = ?1 AND ts.school_year = ?2",
        params![section_id, YEAR],
        |row| row.get(0),
    )
    .expect("count grades")
}

/// (teacher, section, slot key, subject department, teacher department)
/// for every persisted slot of the year. Unlinked rows resolve their
/// section by name.
pub fn slot_rows(conn: &Connection) -> Vec<(i64, Option<i64>, String, Option<i64>, Option<i64>)> {
    let mut stmt = conn
        .prepare(
            "SELECT ts.teacher_id,
                    COALESCE(ts.section_id,
                             (SELECT s.id FROM sections s WHERE s.name = ts.section_name)),
                    ts.slot_key, sub.department_id, t.department_id
             FROM teacher_schedules ts
             JOIN teachers t ON t.id = ts.teacher_id
             LEFT JOIN teacher_subjects tsub ON tsub.id = ts.teacher_subject_id
             LEFT JOIN subjects sub ON sub.id = tsub.subject_id
             WHERE ts.school_year = ?",
        )
        .expect("prepare slot rows");
    let rows = stmt
        .query_map(params![YEAR], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })
        .expect("query slot rows")
        .collect::<Result<Vec<_>, _>>()
        .expect("read slot rows");
    rows
}

/// Panics if any teacher or section holds the same slot key twice.
pub fn assert_no_double_booking(conn: &Connection) {
    let mut teacher_keys = HashSet::new();
    let mut section_keys = HashSet::new();
    for (teacher_id, section_id, key, _, _) in slot_rows(conn) {
        assert!(
            teacher_keys.insert((teacher_id, key.clone())),
            "teacher {teacher_id} double-booked at {key}"
        );
        if let Some(section_id) = section_id {
            assert!(
                section_keys.insert((section_id, key.clone())),
                "section {section_id} double-booked at {key}"
            );
        }
    }
}

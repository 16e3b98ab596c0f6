use rusqlite::Connection;

/// Creates the roster and schedule tables if they do not exist yet.
///
/// `sections.adviser_id` and `teachers.advisory_section_id` point at each
/// other, so neither carries a foreign key; every other link does.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS departments(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers(
            id INTEGER PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            employee_number TEXT,
            position TEXT,
            department_id INTEGER,
            is_active INTEGER NOT NULL DEFAULT 1,
            advisory_section_id INTEGER,
            FOREIGN KEY(department_id) REFERENCES departments(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_teachers_department ON teachers(department_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sections(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            grade_level INTEGER NOT NULL,
            adviser_id INTEGER
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sections_grade ON sections(grade_level)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects(
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            department_id INTEGER NOT NULL,
            is_advisory INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(department_id) REFERENCES departments(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teacher_loads(
            teacher_id INTEGER NOT NULL,
            school_year TEXT NOT NULL,
            current_load INTEGER NOT NULL DEFAULT 0,
            max_load INTEGER NOT NULL,
            PRIMARY KEY(teacher_id, school_year),
            FOREIGN KEY(teacher_id) REFERENCES teachers(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teacher_subjects(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            teacher_id INTEGER NOT NULL,
            subject_id INTEGER NOT NULL,
            section_id INTEGER NOT NULL,
            school_year TEXT NOT NULL,
            FOREIGN KEY(teacher_id) REFERENCES teachers(id),
            FOREIGN KEY(subject_id) REFERENCES subjects(id),
            FOREIGN KEY(section_id) REFERENCES sections(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_teacher_subjects_section
         ON teacher_subjects(section_id, school_year)",
        [],
    )?;

    // section_id is nullable: legacy rows only recorded the section name.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS teacher_schedules(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            teacher_id INTEGER NOT NULL,
            teacher_subject_id INTEGER,
            section_id INTEGER,
            section_name TEXT,
            slot_key TEXT NOT NULL,
            school_year TEXT NOT NULL,
            FOREIGN KEY(teacher_id) REFERENCES teachers(id),
            FOREIGN KEY(teacher_subject_id) REFERENCES teacher_subjects(id),
            FOREIGN KEY(section_id) REFERENCES sections(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_teacher_schedules_teacher
         ON teacher_schedules(teacher_id, school_year)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_teacher_schedules_section
         ON teacher_schedules(section_id, school_year)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            teacher_subject_id INTEGER NOT NULL,
            student_id TEXT NOT NULL,
            quarter INTEGER NOT NULL,
            grade REAL,
            FOREIGN KEY(teacher_subject_id) REFERENCES teacher_subjects(id)
        )",
        [],
    )?;

    Ok(())
}

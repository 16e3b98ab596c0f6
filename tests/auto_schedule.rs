mod test_support;

use class_scheduler::data::{GapKind, Scope};
use class_scheduler::engine;
use class_scheduler::error::SchedulerError;
use class_scheduler::planner::PlannerSettings;
use class_scheduler::store::queries;
use class_scheduler::time_grid::TimeGridRegistry;
use rusqlite::params;
use std::collections::{HashMap, HashSet};
use test_support::{
    RosterBuilder, YEAR, assert_no_double_booking, count, full_faculty, request, slot_rows,
};

#[test]
fn single_section_fills_every_teaching_slot_once() {
    let mut conn = full_faculty(1).section(1, 7).build();
    let registry = TimeGridRegistry::default();

    let report = engine::auto_schedule(
        &mut conn,
        &registry,
        &PlannerSettings::default(),
        &request(Scope::Section { section_id: 1 }),
    )
    .unwrap();

    // eight desired subjects, seven teaching slots in the morning grid
    assert_eq!(report.created_assignments, 7);
    assert_eq!(report.created_slots, 7);
    assert_eq!(report.gaps.len(), 1);
    assert_eq!(report.gaps[0].kind, GapKind::NoFreeSlot);
    assert_eq!(report.gaps[0].subject_id, 18);
    assert_eq!(report.sections_missing_teachers, 1);
    assert_eq!(report.message, "Auto-schedule complete: created 7 assignments");

    let keys: HashSet<String> = report.assignments.iter().map(|a| a.slot_key.clone()).collect();
    let teaching: HashSet<String> = registry.teaching_slots(7).unwrap().into_iter().collect();
    assert_eq!(keys, teaching);

    let subjects: HashSet<i64> = report.assignments.iter().map(|a| a.subject_id).collect();
    assert_eq!(subjects, (11..=17).collect());

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM teacher_subjects"), 7);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM teacher_schedules"), 7);
    // the unplaced teacher's tentative period was released
    let loads: HashMap<i64, u32> = queries::load_rows(&conn, YEAR)
        .unwrap()
        .into_iter()
        .map(|r| (r.teacher_id, r.current_load))
        .collect();
    assert_eq!(loads.get(&801), Some(&0));
    assert_eq!(loads.get(&101), Some(&1));
}

#[test]
fn exhausted_teacher_leaves_every_section_short() {
    let mut conn = RosterBuilder::new()
        .department(1)
        .subject(11, 1)
        .teacher(101, 1)
        .load(101, 6, 6)
        .section(1, 7)
        .section(2, 7)
        .section(3, 7)
        .build();

    let report = engine::auto_schedule(
        &mut conn,
        &TimeGridRegistry::default(),
        &PlannerSettings::default(),
        &request(Scope::Grade { grade_level: 7 }),
    )
    .unwrap();

    assert_eq!(report.created_assignments, 0);
    assert_eq!(report.gaps.len(), 3);
    assert!(report.gaps.iter().all(|g| g.kind == GapKind::NoEligibleTeacher));
    assert_eq!(report.sections_missing_teachers, 3);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM teacher_subjects"), 0);
}

#[test]
fn load_ceiling_is_never_exceeded() {
    let mut conn = RosterBuilder::new()
        .department(1)
        .subject(11, 1)
        .teacher(101, 1)
        .teacher(102, 1)
        .load(101, 1, 2)
        .load(102, 0, 2)
        .section(1, 7)
        .section(2, 7)
        .section(3, 7)
        .section(4, 7)
        .build();

    let report = engine::auto_schedule(
        &mut conn,
        &TimeGridRegistry::default(),
        &PlannerSettings::default(),
        &request(Scope::Grade { grade_level: 7 }),
    )
    .unwrap();

    let mut created: HashMap<i64, u32> = HashMap::new();
    for a in &report.assignments {
        *created.entry(a.teacher_id).or_default() += 1;
    }
    assert_eq!(created.get(&101), Some(&1));
    assert_eq!(created.get(&102), Some(&2));
    assert_eq!(report.gaps.len(), 1);
    assert_eq!(report.gaps[0].section_id, 4);
}

#[test]
fn all_grades_run_keeps_teachers_and_sections_single_booked() {
    let mut conn = full_faculty(2)
        .section(1, 7)
        .section(2, 7)
        .section(3, 7)
        .section(4, 8)
        .section(5, 8)
        .section(6, 8)
        .build();

    let report = engine::auto_schedule(
        &mut conn,
        &TimeGridRegistry::default(),
        &PlannerSettings::default(),
        &request(Scope::AllGrades),
    )
    .unwrap();

    assert_eq!(report.created_assignments, 42);
    assert_no_double_booking(&conn);

    for (_, _, _, subject_department, teacher_department) in slot_rows(&conn) {
        assert_eq!(subject_department, teacher_department);
    }

    let per_teacher = slot_rows(&conn).into_iter().fold(HashMap::new(), |mut acc, row| {
        *acc.entry(row.0).or_insert(0u32) += 1;
        acc
    });
    assert!(per_teacher.values().all(|n| *n <= 6));
}

#[test]
fn rotation_spreads_one_teacher_across_the_day() {
    let mut conn = RosterBuilder::new()
        .department(1)
        .subject(11, 1)
        .teacher(101, 1)
        .section(1, 7)
        .section(2, 7)
        .section(3, 7)
        .build();
    let registry = TimeGridRegistry::default();

    let report = engine::auto_schedule(
        &mut conn,
        &registry,
        &PlannerSettings::default(),
        &request(Scope::Grade { grade_level: 7 }),
    )
    .unwrap();

    let keys: Vec<String> = report.assignments.iter().map(|a| a.slot_key.clone()).collect();
    assert_eq!(keys, registry.teaching_slots(7).unwrap()[..3].to_vec());
}

#[test]
fn existing_teacher_slots_are_avoided() {
    let mut conn = RosterBuilder::new()
        .department(1)
        .subject(11, 1)
        .teacher(101, 1)
        .section(1, 7)
        .build();
    let registry = TimeGridRegistry::default();
    let teaching = registry.teaching_slots(7).unwrap();
    conn.execute(
        "INSERT INTO teacher_schedules(teacher_id, section_id, section_name, slot_key, school_year)
         VALUES(101, NULL, 'Old Section', ?1, ?2)",
        params![teaching[0], YEAR],
    )
    .unwrap();

    let report = engine::auto_schedule(
        &mut conn,
        &registry,
        &PlannerSettings::default(),
        &request(Scope::Section { section_id: 1 }),
    )
    .unwrap();

    assert_eq!(report.assignments.len(), 1);
    assert_eq!(report.assignments[0].slot_key, teaching[1]);
    assert_no_double_booking(&conn);
}

#[test]
fn unlinked_row_naming_the_section_blocks_its_slot() {
    let mut conn = RosterBuilder::new()
        .department(1)
        .subject(11, 1)
        .teacher(101, 1)
        .teacher(102, 1)
        .section(1, 7)
        .build();
    let registry = TimeGridRegistry::default();
    let teaching = registry.teaching_slots(7).unwrap();
    conn.execute(
        "INSERT INTO teacher_schedules(teacher_id, section_id, section_name, slot_key, school_year)
         VALUES(102, NULL, '7-1', ?1, ?2)",
        params![teaching[0], YEAR],
    )
    .unwrap();

    let report = engine::auto_schedule(
        &mut conn,
        &registry,
        &PlannerSettings::default(),
        &request(Scope::Section { section_id: 1 }),
    )
    .unwrap();

    assert_eq!(report.assignments.len(), 1);
    assert_eq!(report.assignments[0].teacher_id, 101);
    assert_eq!(report.assignments[0].slot_key, teaching[1]);
    assert_no_double_booking(&conn);
}

#[test]
fn adviser_takes_advisory_subject_in_hgp() {
    let mut conn = RosterBuilder::new()
        .department(1)
        .department(2)
        .subject(11, 1)
        .advisory_subject(19, 1)
        .subject(21, 2)
        .teacher(101, 1)
        .teacher(201, 2)
        .advised_section(1, 8, 101)
        .build();
    let registry = TimeGridRegistry::default();

    let report = engine::auto_schedule(
        &mut conn,
        &registry,
        &PlannerSettings::default(),
        &request(Scope::Section { section_id: 1 }),
    )
    .unwrap();

    assert_eq!(report.created_assignments, 3);
    let advisory = report
        .assignments
        .iter()
        .find(|a| a.subject_id == 19)
        .unwrap();
    assert_eq!(advisory.teacher_id, 101);
    assert_eq!(
        Some(advisory.slot_key.as_str()),
        registry.get_grid(8).unwrap().hgp_key()
    );
    assert_no_double_booking(&conn);
}

#[test]
fn inactive_teachers_are_never_assigned() {
    let mut conn = RosterBuilder::new()
        .department(1)
        .subject(11, 1)
        .inactive_teacher(101, 1)
        .section(1, 7)
        .build();

    let report = engine::auto_schedule(
        &mut conn,
        &TimeGridRegistry::default(),
        &PlannerSettings::default(),
        &request(Scope::Section { section_id: 1 }),
    )
    .unwrap();

    assert_eq!(report.created_assignments, 0);
    assert_eq!(report.gaps[0].kind, GapKind::NoEligibleTeacher);
}

#[test]
fn second_run_over_full_scope_adds_nothing() {
    let mut conn = full_faculty(2).section(1, 7).section(2, 8).build();
    let registry = TimeGridRegistry::default();
    let settings = PlannerSettings::default();
    let req = request(Scope::AllGrades);

    let first = engine::auto_schedule(&mut conn, &registry, &settings, &req).unwrap();
    let second = engine::auto_schedule(&mut conn, &registry, &settings, &req).unwrap();

    assert_eq!(first.created_assignments, 14);
    assert_eq!(second.created_assignments, 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM teacher_subjects"), 14);
    assert_no_double_booking(&conn);
}

#[test]
fn loads_match_persisted_slots_after_a_run() {
    let mut conn = full_faculty(1).section(1, 7).section(2, 9).build();
    engine::auto_schedule(
        &mut conn,
        &TimeGridRegistry::default(),
        &PlannerSettings::default(),
        &request(Scope::AllGrades),
    )
    .unwrap();

    for row in queries::load_rows(&conn, YEAR).unwrap() {
        let slots = count(
            &conn,
            &format!(
                "SELECT COUNT(*) FROM teacher_schedules WHERE teacher_id = {}",
                row.teacher_id
            ),
        );
        assert_eq!(i64::from(row.current_load), slots);
    }
}

#[test]
fn stale_load_rows_are_replaced_by_slot_counts() {
    let mut conn = RosterBuilder::new()
        .department(1)
        .subject(11, 1)
        .teacher(101, 1)
        .load(101, 3, 6)
        .section(1, 7)
        .build();

    engine::auto_schedule(
        &mut conn,
        &TimeGridRegistry::default(),
        &PlannerSettings::default(),
        &request(Scope::Section { section_id: 1 }),
    )
    .unwrap();

    let rows = queries::load_rows(&conn, YEAR).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].current_load, 1);
    assert_eq!(rows[0].max_load, 6);
}

#[test]
fn unknown_grade_aborts_before_any_write() {
    let mut conn = full_faculty(1).section(1, 7).section(2, 11).build();

    let result = engine::auto_schedule(
        &mut conn,
        &TimeGridRegistry::default(),
        &PlannerSettings::default(),
        &request(Scope::AllGrades),
    );

    assert!(matches!(result, Err(SchedulerError::UnknownGradeLevel(11))));
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM teacher_subjects"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM teacher_loads"), 0);
}

#[test]
fn missing_section_is_reported() {
    let mut conn = full_faculty(1).build();
    let result = engine::auto_schedule(
        &mut conn,
        &TimeGridRegistry::default(),
        &PlannerSettings::default(),
        &request(Scope::Section { section_id: 99 }),
    );
    assert!(matches!(result, Err(SchedulerError::SectionNotFound(99))));
}

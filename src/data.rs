use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type TeacherId = i64;
pub type SectionId = i64;
pub type SubjectId = i64;
pub type DepartmentId = i64;
pub type AssignmentId = i64;
pub type GradeLevel = u8;
pub type SlotKey = String;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

/// A member of the teaching staff as the scheduler sees them.
///
/// `employee_number` and `position` are carried through for the UI and
/// never influence planning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub is_active: bool,
    #[serde(default)]
    pub advisory_section_id: Option<SectionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub grade_level: GradeLevel,
    #[serde(default)]
    pub adviser_id: Option<TeacherId>,
}

/// A subject offered by a department. Advisory subjects are only ever taught
/// by a section's own adviser, in the grid's HGP slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
    pub department_id: DepartmentId,
    #[serde(default)]
    pub is_advisory: bool,
}

/// Persisted load for one teacher in one school year.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherLoadRow {
    pub teacher_id: TeacherId,
    pub school_year: String,
    pub current_load: u32,
    pub max_load: u32,
}

/// A persisted teacher/subject/section link for a school year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub teacher_id: TeacherId,
    pub subject_id: SubjectId,
    pub section_id: SectionId,
}

/// A persisted weekly slot. Legacy rows may lack a section link and only
/// carry the section's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSlot {
    pub teacher_id: TeacherId,
    pub section_id: Option<SectionId>,
    pub section_name: Option<String>,
    pub slot_key: SlotKey,
}

/// A triple produced by the planner and placed on a concrete slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct PlacedAssignment {
    pub section_id: SectionId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub slot_key: SlotKey,
}

/// Which sections an operator action applies to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Scope {
    AllGrades,
    Grade {
        #[serde(rename = "gradeLevel")]
        grade_level: GradeLevel,
    },
    Section {
        #[serde(rename = "sectionId")]
        section_id: SectionId,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub school_year: String,
    pub scope: Scope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GapKind {
    /// No active teacher of the subject's department had load room.
    NoEligibleTeacher,
    /// A teacher was found but every candidate slot was taken.
    NoFreeSlot,
}

/// A desired subject the run could not staff or place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningGap {
    pub section_id: SectionId,
    pub subject_id: SubjectId,
    pub kind: GapKind,
}

impl fmt::Display for PlanningGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            GapKind::NoEligibleTeacher => write!(
                f,
                "[No Eligible Teacher] Section {} has no teacher for subject {}",
                self.section_id, self.subject_id
            ),
            GapKind::NoFreeSlot => write!(
                f,
                "[No Free Slot] Subject {} for section {} could not be placed without a collision",
                self.subject_id, self.section_id
            ),
        }
    }
}

/// Outcome of one auto-schedule run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScheduleReport {
    pub created_assignments: usize,
    pub created_slots: usize,
    pub assignments: Vec<PlacedAssignment>,
    pub gaps: Vec<PlanningGap>,
    pub sections_missing_teachers: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub deleted_grades: usize,
    pub deleted_slots: usize,
    pub deleted_assignments: usize,
    pub message: String,
}

/// One row of a rendered section or teacher timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub slot_key: SlotKey,
    pub display_mon_thu: String,
    pub display_fri: String,
    pub teacher_id: TeacherId,
    pub section_id: Option<SectionId>,
    pub section_name: Option<String>,
    pub subject_id: Option<SubjectId>,
    pub subject_name: Option<String>,
}

/// Everything needed to seed or refresh the roster tables.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

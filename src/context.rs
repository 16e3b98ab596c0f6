use crate::data::{
    Assignment, GapKind, PlacedAssignment, PlanningGap, ScheduledSlot, Section, SectionId,
    SlotKey, SubjectId, TeacherId,
};
use crate::load::LoadTracker;
use log::warn;
use std::collections::{HashMap, HashSet};

/// Mutable state of one auto-schedule run.
///
/// Built fresh from the store at the start of a run and dropped once the run
/// is persisted; nothing in here outlives a single operator action.
#[derive(Debug)]
pub struct PlanningContext {
    pub loads: LoadTracker,
    teacher_slot_taken: HashSet<(TeacherId, SlotKey)>,
    section_slot_taken: HashSet<(SectionId, SlotKey)>,
    section_teachers: HashMap<SectionId, HashSet<TeacherId>>,
    section_subjects: HashMap<SectionId, HashSet<SubjectId>>,
    placed: Vec<PlacedAssignment>,
    gaps: Vec<PlanningGap>,
}

impl PlanningContext {
    pub fn new(loads: LoadTracker) -> Self {
        Self {
            loads,
            teacher_slot_taken: HashSet::new(),
            section_slot_taken: HashSet::new(),
            section_teachers: HashMap::new(),
            section_subjects: HashMap::new(),
            placed: Vec::new(),
            gaps: Vec::new(),
        }
    }

    /// Locks every slot already persisted. Rows without a section link lock
    /// the section in `sections` whose name they carry.
    pub fn seed_slots(&mut self, slots: &[ScheduledSlot], sections: &[Section]) {
        let by_name: HashMap<&str, SectionId> =
            sections.iter().map(|s| (s.name.as_str(), s.id)).collect();
        for slot in slots {
            self.teacher_slot_taken
                .insert((slot.teacher_id, slot.slot_key.clone()));
            let section_id = slot.section_id.or_else(|| {
                slot.section_name
                    .as_deref()
                    .and_then(|name| by_name.get(name).copied())
            });
            if let Some(section_id) = section_id {
                self.section_slot_taken
                    .insert((section_id, slot.slot_key.clone()));
            }
        }
    }

    /// Existing assignments count toward their section's target and bar their
    /// teacher from a second subject in the same section.
    pub fn seed_assignments(&mut self, assignments: &[Assignment]) {
        for assignment in assignments {
            self.section_teachers
                .entry(assignment.section_id)
                .or_default()
                .insert(assignment.teacher_id);
            self.section_subjects
                .entry(assignment.section_id)
                .or_default()
                .insert(assignment.subject_id);
        }
    }

    pub fn is_free(&self, teacher_id: TeacherId, section_id: SectionId, slot_key: &str) -> bool {
        let key = slot_key.to_string();
        !self.teacher_slot_taken.contains(&(teacher_id, key.clone()))
            && !self.section_slot_taken.contains(&(section_id, key))
    }

    pub fn lock(&mut self, teacher_id: TeacherId, section_id: SectionId, slot_key: &str) {
        self.teacher_slot_taken
            .insert((teacher_id, slot_key.to_string()));
        self.section_slot_taken
            .insert((section_id, slot_key.to_string()));
    }

    pub fn teaches_section(&self, teacher_id: TeacherId, section_id: SectionId) -> bool {
        self.section_teachers
            .get(&section_id)
            .is_some_and(|teachers| teachers.contains(&teacher_id))
    }

    pub fn section_has_subject(&self, section_id: SectionId, subject_id: SubjectId) -> bool {
        self.section_subjects
            .get(&section_id)
            .is_some_and(|subjects| subjects.contains(&subject_id))
    }

    pub fn subject_count(&self, section_id: SectionId) -> usize {
        self.section_subjects.get(&section_id).map_or(0, HashSet::len)
    }

    pub fn record(&mut self, placed: PlacedAssignment) {
        self.section_teachers
            .entry(placed.section_id)
            .or_default()
            .insert(placed.teacher_id);
        self.section_subjects
            .entry(placed.section_id)
            .or_default()
            .insert(placed.subject_id);
        self.placed.push(placed);
    }

    pub fn record_gap(&mut self, section_id: SectionId, subject_id: SubjectId, kind: GapKind) {
        let gap = PlanningGap {
            section_id,
            subject_id,
            kind,
        };
        warn!("{gap}");
        self.gaps.push(gap);
    }

    pub fn placed(&self) -> &[PlacedAssignment] {
        &self.placed
    }

    pub fn gaps(&self) -> &[PlanningGap] {
        &self.gaps
    }

    /// Sections with at least one gap.
    pub fn sections_missing_teachers(&self) -> usize {
        self.gaps
            .iter()
            .map(|g| g.section_id)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn into_parts(self) -> (Vec<PlacedAssignment>, Vec<PlanningGap>) {
        (self.placed, self.gaps)
    }
}

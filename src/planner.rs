//! Greedy teacher/subject/section assignment.
//!
//! Every ordering the planner relies on is materialised as an explicit sort
//! before use, so two runs over the same roster produce the same plan:
//! departments by ascending active-teacher count then id, subjects by id,
//! candidate teachers by (at or above the minimum-period threshold, current
//! load, id).

use crate::context::PlanningContext;
use crate::data::{
    DepartmentId, GapKind, PlacedAssignment, Section, Subject, SubjectId, Teacher, TeacherId,
};
use crate::error::SchedulerError;
use crate::load::{DEFAULT_MAX_LOAD, LoadTracker};
use crate::placer;
use crate::time_grid::TimeGridRegistry;
use itertools::Itertools;
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};

pub const SUBJECTS_PER_SECTION: usize = 8;
pub const MIN_PERIODS_PER_DAY: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerSettings {
    /// Planning target only; sections may end up with fewer subjects.
    pub subjects_per_section: usize,
    /// Teachers below this load are preferred over those at or above it.
    pub min_periods_per_day: u32,
    pub default_max_load: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            subjects_per_section: SUBJECTS_PER_SECTION,
            min_periods_per_day: MIN_PERIODS_PER_DAY,
            default_max_load: DEFAULT_MAX_LOAD,
        }
    }
}

pub struct Planner<'a> {
    settings: PlannerSettings,
    registry: &'a TimeGridRegistry,
    teachers: HashMap<TeacherId, &'a Teacher>,
    teachers_by_department: HashMap<DepartmentId, Vec<&'a Teacher>>,
    subjects_by_department: HashMap<DepartmentId, Vec<&'a Subject>>,
    department_order: Vec<DepartmentId>,
}

impl<'a> Planner<'a> {
    /// `teachers` should already be limited to active staff; inactive ones
    /// are filtered again here regardless.
    pub fn new(
        settings: PlannerSettings,
        registry: &'a TimeGridRegistry,
        teachers: &'a [Teacher],
        subjects: &'a [Subject],
    ) -> Self {
        let active = teachers.iter().filter(|t| t.is_active);

        let teachers_by_department: HashMap<DepartmentId, Vec<&Teacher>> = active
            .clone()
            .filter_map(|t| t.department_id.map(|d| (d, t)))
            .into_group_map();
        let subjects_by_department: HashMap<DepartmentId, Vec<&Subject>> = subjects
            .iter()
            .sorted_by_key(|s| s.id)
            .map(|s| (s.department_id, s))
            .into_group_map();

        let pool_size = |d: &DepartmentId| teachers_by_department.get(d).map_or(0, Vec::len);
        let department_order: Vec<DepartmentId> = subjects_by_department
            .keys()
            .copied()
            .sorted_by_key(|d| (pool_size(d), *d))
            .collect();
        debug!("Department order by pool size: {department_order:?}");

        Self {
            settings,
            registry,
            teachers: active.map(|t| (t.id, t)).collect(),
            teachers_by_department,
            subjects_by_department,
            department_order,
        }
    }

    pub fn department_order(&self) -> &[DepartmentId] {
        &self.department_order
    }

    fn subjects_of(&self, department_id: DepartmentId) -> &[&'a Subject] {
        self.subjects_by_department
            .get(&department_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Subjects the section still needs, in the order they will be staffed.
    ///
    /// One non-advisory subject per department, scarcest departments first;
    /// then the adviser's advisory subject; then any remaining subjects until
    /// the target is met. Subjects the section already has count toward the
    /// target and are never desired twice.
    pub fn desired_subjects(&self, section: &Section, ctx: &PlanningContext) -> Vec<&'a Subject> {
        let target = self.settings.subjects_per_section;
        let existing = ctx.subject_count(section.id);
        let mut desired: Vec<&'a Subject> = Vec::new();
        let mut chosen: BTreeSet<SubjectId> = BTreeSet::new();

        let available = |s: &Subject, chosen: &BTreeSet<SubjectId>| {
            !chosen.contains(&s.id) && !ctx.section_has_subject(section.id, s.id)
        };

        for department_id in &self.department_order {
            if existing + desired.len() >= target {
                break;
            }
            if let Some(subject) = self
                .subjects_of(*department_id)
                .iter()
                .find(|s| !s.is_advisory && available(s, &chosen))
            {
                chosen.insert(subject.id);
                desired.push(*subject);
            }
        }

        if existing + desired.len() < target {
            let advisory = section
                .adviser_id
                .and_then(|id| self.teachers.get(&id))
                .and_then(|adviser| adviser.department_id)
                .and_then(|department_id| {
                    self.subjects_of(department_id)
                        .iter()
                        .find(|s| s.is_advisory && available(s, &chosen))
                });
            if let Some(subject) = advisory {
                chosen.insert(subject.id);
                desired.push(*subject);
            }
        }

        for department_id in &self.department_order {
            for subject in self.subjects_of(*department_id) {
                if existing + desired.len() >= target {
                    return desired;
                }
                if !subject.is_advisory && available(subject, &chosen) {
                    chosen.insert(subject.id);
                    desired.push(*subject);
                }
            }
        }

        desired
    }

    /// Load-balanced pick among candidates with room: teachers below the
    /// minimum-period threshold first, then lowest current load, then id.
    pub fn pick_teacher<'t>(
        &self,
        candidates: impl IntoIterator<Item = &'t Teacher>,
        loads: &LoadTracker,
    ) -> Option<TeacherId> {
        candidates
            .into_iter()
            .filter(|t| loads.load_of(t.id).has_room())
            .min_by_key(|t| {
                let load = loads.load_of(t.id);
                (
                    load.current >= self.settings.min_periods_per_day,
                    load.current,
                    t.id,
                )
            })
            .map(|t| t.id)
    }

    fn teacher_for(&self, section: &Section, subject: &Subject, ctx: &PlanningContext) -> Option<TeacherId> {
        if subject.is_advisory {
            // only the section's own adviser takes its advisory subject, even
            // when they already teach the section another subject
            return section
                .adviser_id
                .and_then(|id| self.teachers.get(&id))
                .filter(|adviser| adviser.department_id == Some(subject.department_id))
                .filter(|adviser| ctx.loads.load_of(adviser.id).has_room())
                .map(|adviser| adviser.id);
        }

        let candidates = self
            .teachers_by_department
            .get(&subject.department_id)
            .into_iter()
            .flatten()
            .copied()
            .filter(|t| !ctx.teaches_section(t.id, section.id));
        self.pick_teacher(candidates, &ctx.loads)
    }

    /// Staffs and places every desired subject of one section.
    pub fn plan_section(&self, section: &Section, ctx: &mut PlanningContext) -> Result<(), SchedulerError> {
        let grid = self.registry.get_grid(section.grade_level)?;
        let teaching_slots = grid.teaching_slots();

        for subject in self.desired_subjects(section, ctx) {
            let Some(teacher_id) = self.teacher_for(section, subject, ctx) else {
                ctx.record_gap(section.id, subject.id, GapKind::NoEligibleTeacher);
                continue;
            };

            let new_load = ctx.loads.increment(teacher_id);
            let slot = if subject.is_advisory {
                grid.hgp_key()
                    .and_then(|key| placer::place_fixed(ctx, key, teacher_id, section.id))
            } else {
                placer::place_teaching(ctx, &teaching_slots, teacher_id, section.id, new_load)
            };

            match slot {
                Some(slot_key) => {
                    debug!(
                        "Section {} subject {} -> teacher {} at {} (load {})",
                        section.name, subject.code, teacher_id, slot_key, new_load
                    );
                    ctx.record(PlacedAssignment {
                        section_id: section.id,
                        subject_id: subject.id,
                        teacher_id,
                        slot_key,
                    });
                }
                None => {
                    ctx.loads.release(teacher_id);
                    ctx.record_gap(section.id, subject.id, GapKind::NoFreeSlot);
                }
            }
        }
        Ok(())
    }

    /// Plans every section in order. All grade levels are checked before the
    /// first section is touched.
    pub fn plan(&self, sections: &[Section], ctx: &mut PlanningContext) -> Result<(), SchedulerError> {
        for section in sections {
            self.registry.get_grid(section.grade_level)?;
        }
        info!(
            "Planning {} sections against {} active teachers in {} departments",
            sections.len(),
            self.teachers.len(),
            self.department_order.len()
        );
        for section in sections {
            self.plan_section(section, ctx)?;
        }
        Ok(())
    }
}

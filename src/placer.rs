use crate::context::PlanningContext;
use crate::data::{SectionId, SlotKey, TeacherId};
use log::trace;

/// Index the search starts from: a teacher's Nth period of the run begins
/// probing at the Nth teaching slot, spreading their periods across the day.
pub fn rotation_start(teacher_new_load: u32, slot_count: usize) -> usize {
    if slot_count == 0 {
        return 0;
    }
    (teacher_new_load.saturating_sub(1) as usize) % slot_count
}

/// Chooses a teaching slot free for both the teacher and the section and
/// locks it. Scans linearly from the rotation start, wrapping once around
/// the grid.
///
/// Returns `None` when every slot collides; the caller treats that as a gap
/// rather than double-booking.
pub fn place_teaching(
    ctx: &mut PlanningContext,
    teaching_slots: &[SlotKey],
    teacher_id: TeacherId,
    section_id: SectionId,
    teacher_new_load: u32,
) -> Option<SlotKey> {
    let count = teaching_slots.len();
    let start = rotation_start(teacher_new_load, count);

    let chosen = (0..count)
        .map(|offset| &teaching_slots[(start + offset) % count])
        .find(|key| {
            let free = ctx.is_free(teacher_id, section_id, key);
            if !free {
                trace!("Slot {key} taken for teacher {teacher_id} or section {section_id}");
            }
            free
        })?
        .clone();

    ctx.lock(teacher_id, section_id, &chosen);
    Some(chosen)
}

/// Places on one fixed key (the HGP slot) or not at all.
pub fn place_fixed(
    ctx: &mut PlanningContext,
    slot_key: &str,
    teacher_id: TeacherId,
    section_id: SectionId,
) -> Option<SlotKey> {
    if !ctx.is_free(teacher_id, section_id, slot_key) {
        return None;
    }
    ctx.lock(teacher_id, section_id, slot_key);
    Some(slot_key.to_string())
}

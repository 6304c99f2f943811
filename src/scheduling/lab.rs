use tracing::debug;

use super::{Draft, SchedulingContext};
use crate::config::LabFeasibility;
use crate::conflict::{is_class_slot_free, is_room_free, is_teacher_free};
use crate::diagnostics::{MissingResource, ScheduleWarning, SessionKind};
use crate::model::{Class, Day, LabRoom, NewEntry, Subject, Teacher, TimeSlot, TimetableEntry};

/// Schedules one lab session per batch of `class`, all batches in the same
/// (day, lab slot), each with its own teacher and lab room.
///
/// The slot is chosen first, for the whole class, without reserving anything.
/// Batches are then served in order against the live draft, so an earlier
/// batch can take the last free teacher or room; a batch left without one is
/// reported and skipped.
pub fn schedule_labs(
    ctx: &SchedulingContext<'_>,
    draft: &mut Draft,
    class: &Class,
    subject: &Subject,
) {
    let qualified = ctx.qualified_teachers(&subject.id);
    if qualified.is_empty() {
        draft.warn(ScheduleWarning::NoEligibleTeacher {
            class_id: class.id.clone(),
            subject_id: subject.id.clone(),
            session: SessionKind::Lab,
        });
        return;
    }
    if ctx.lab_slots.is_empty() {
        draft.warn(ScheduleWarning::NoLabSlots {
            class_id: class.id.clone(),
            subject_id: subject.id.clone(),
        });
        return;
    }

    let Some((day, slot)) = find_joint_slot(ctx, &draft.entries, class, &qualified) else {
        draft.warn(ScheduleWarning::NoFeasibleLabSlot {
            class_id: class.id.clone(),
            subject_id: subject.id.clone(),
            batches: class.batches,
        });
        return;
    };

    for batch_number in 1..=class.batches {
        let teachers = free_teachers(&draft.entries, &qualified, day, &slot.id);
        let rooms = free_rooms(ctx, &draft.entries, day, &slot.id);
        let teacher = ctx.picker.pick_teacher(subject, &teachers);
        let room = ctx.picker.pick_room(class, batch_number, &rooms);

        let (teacher, room) = match (teacher, room) {
            (Some(teacher), Some(room)) => (teacher, room),
            (teacher, room) => {
                let missing = match (teacher, room) {
                    (None, None) => MissingResource::TeacherAndRoom,
                    (None, Some(_)) => MissingResource::Teacher,
                    _ => MissingResource::Room,
                };
                draft.warn(ScheduleWarning::BatchUnassigned {
                    class_id: class.id.clone(),
                    subject_id: subject.id.clone(),
                    batch_number,
                    day,
                    time_slot_id: slot.id.clone(),
                    missing,
                });
                continue;
            }
        };

        debug!(
            class_id = %class.id,
            subject_id = %subject.id,
            batch_number,
            teacher_id = %teacher.id,
            lab_room_id = %room.id,
            %day,
            time_slot_id = %slot.id,
            "placed lab batch"
        );
        draft.push(
            NewEntry::lab(
                day,
                &slot.id,
                &subject.id,
                &teacher.id,
                &class.id,
                batch_number,
                &room.id,
            )
            .with_fresh_id(),
        );
    }
}

/// First (day, lab slot) in week/slot order that passes the feasibility check
/// for every batch of the class.
fn find_joint_slot<'a>(
    ctx: &SchedulingContext<'a>,
    entries: &[TimetableEntry],
    class: &Class,
    qualified: &[&'a Teacher],
) -> Option<(Day, &'a TimeSlot)> {
    for &day in &ctx.days {
        for &slot in &ctx.lab_slots {
            if is_feasible(ctx, entries, class, qualified, day, slot) {
                return Some((day, slot));
            }
        }
    }
    None
}

fn is_feasible(
    ctx: &SchedulingContext<'_>,
    entries: &[TimetableEntry],
    class: &Class,
    qualified: &[&Teacher],
    day: Day,
    slot: &TimeSlot,
) -> bool {
    let teachers = free_teachers(entries, qualified, day, &slot.id).len();
    let rooms = free_rooms(ctx, entries, day, &slot.id).len();
    let batches_free = (1..=class.batches)
        .all(|batch| is_class_slot_free(entries, &class.id, day, &slot.id, Some(batch)));
    if !batches_free {
        return false;
    }

    match ctx.config.lab_feasibility {
        // Every batch is checked against the same state, so the per-batch test
        // reduces to "some teacher and some room are free".
        LabFeasibility::PerBatch => teachers > 0 && rooms > 0,
        LabFeasibility::Distinct => {
            let needed = class.batches as usize;
            teachers >= needed && rooms >= needed
        }
    }
}

fn free_teachers<'a>(
    entries: &[TimetableEntry],
    qualified: &[&'a Teacher],
    day: Day,
    time_slot_id: &str,
) -> Vec<&'a Teacher> {
    qualified
        .iter()
        .copied()
        .filter(|teacher| is_teacher_free(entries, &teacher.id, day, time_slot_id))
        .collect()
}

fn free_rooms<'a>(
    ctx: &SchedulingContext<'a>,
    entries: &[TimetableEntry],
    day: Day,
    time_slot_id: &str,
) -> Vec<&'a LabRoom> {
    ctx.snapshot
        .lab_rooms
        .iter()
        .filter(|room| is_room_free(entries, &room.id, day, time_slot_id))
        .collect()
}

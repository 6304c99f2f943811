use tracing::debug;

use super::{Draft, SchedulingContext};
use crate::conflict::{has_lecture_today, is_class_slot_free, is_teacher_free};
use crate::diagnostics::{ScheduleWarning, SessionKind};
use crate::model::{Class, Day, NewEntry, Subject, Teacher, TimeSlot};

/// Places up to `target` lectures of `subject` for `class`, at most one per day.
///
/// Each lecture takes the first (day, slot) in week/slot order where the class
/// is free and some qualified teacher is free. Lectures that find no place are
/// reported as a shortfall; nothing is retried.
pub fn schedule_lectures(
    ctx: &SchedulingContext<'_>,
    draft: &mut Draft,
    class: &Class,
    subject: &Subject,
    target: u32,
) {
    let qualified = ctx.qualified_teachers(&subject.id);
    if qualified.is_empty() {
        draft.warn(ScheduleWarning::NoEligibleTeacher {
            class_id: class.id.clone(),
            subject_id: subject.id.clone(),
            session: SessionKind::Lecture,
        });
        return;
    }

    let mut used_days: Vec<Day> = Vec::new();
    let mut placed = 0;
    while placed < target {
        let Some((day, slot, teacher)) =
            next_placement(ctx, draft, class, subject, &qualified, &used_days)
        else {
            break;
        };
        debug!(
            class_id = %class.id,
            subject_id = %subject.id,
            teacher_id = %teacher.id,
            %day,
            time_slot_id = %slot.id,
            "placed lecture"
        );
        draft.push(
            NewEntry::lecture(day, &slot.id, &subject.id, &teacher.id, &class.id).with_fresh_id(),
        );
        used_days.push(day);
        placed += 1;
    }

    if placed < target {
        draft.warn(ScheduleWarning::LectureShortfall {
            class_id: class.id.clone(),
            subject_id: subject.id.clone(),
            requested: target,
            placed,
        });
    }
}

fn next_placement<'a>(
    ctx: &SchedulingContext<'a>,
    draft: &Draft,
    class: &Class,
    subject: &Subject,
    qualified: &[&'a Teacher],
    used_days: &[Day],
) -> Option<(Day, &'a TimeSlot, &'a Teacher)> {
    for &day in &ctx.days {
        if used_days.contains(&day)
            || has_lecture_today(&draft.entries, &class.id, &subject.id, day)
        {
            continue;
        }
        for &slot in &ctx.lecture_slots {
            if !is_class_slot_free(&draft.entries, &class.id, day, &slot.id, None) {
                continue;
            }
            let free: Vec<&'a Teacher> = qualified
                .iter()
                .copied()
                .filter(|teacher| is_teacher_free(&draft.entries, &teacher.id, day, &slot.id))
                .collect();
            if let Some(teacher) = ctx.picker.pick_teacher(subject, &free) {
                return Some((day, slot, teacher));
            }
        }
    }
    None
}

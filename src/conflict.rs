//! Booking checks against an entry collection.
//!
//! Every check is a linear scan with no side effects. The engine calls these
//! against its draft while generating, and [`crate::Timetable`] calls
//! [`find_conflict`] before accepting a hand-made entry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Day, TimetableEntry};

pub fn is_teacher_free(
    entries: &[TimetableEntry],
    teacher_id: &str,
    day: Day,
    time_slot_id: &str,
) -> bool {
    !entries
        .iter()
        .any(|entry| entry.occupies(day, time_slot_id) && entry.teacher_id == teacher_id)
}

pub fn is_room_free(
    entries: &[TimetableEntry],
    room_id: &str,
    day: Day,
    time_slot_id: &str,
) -> bool {
    !entries.iter().any(|entry| {
        entry.occupies(day, time_slot_id) && entry.lab_room_id.as_deref() == Some(room_id)
    })
}

/// `batch_number = None` asks about the whole class, which is busy if any
/// batch is booked. A batch is busy if it or the whole class is booked.
pub fn is_class_slot_free(
    entries: &[TimetableEntry],
    class_id: &str,
    day: Day,
    time_slot_id: &str,
    batch_number: Option<u32>,
) -> bool {
    !entries.iter().any(|entry| {
        entry.occupies(day, time_slot_id)
            && entry.class_id == class_id
            && batches_overlap(entry.batch_number, batch_number)
    })
}

pub fn has_lecture_today(
    entries: &[TimetableEntry],
    class_id: &str,
    subject_id: &str,
    day: Day,
) -> bool {
    entries.iter().any(|entry| {
        !entry.is_lab
            && entry.day == day
            && entry.class_id == class_id
            && entry.subject_id == subject_id
    })
}

fn batches_overlap(a: Option<u32>, b: Option<u32>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    TeacherBusy {
        teacher_id: String,
        day: Day,
        time_slot_id: String,
        existing_entry_id: String,
    },
    RoomBusy {
        lab_room_id: String,
        day: Day,
        time_slot_id: String,
        existing_entry_id: String,
    },
    ClassBusy {
        class_id: String,
        batch_number: Option<u32>,
        day: Day,
        time_slot_id: String,
        existing_entry_id: String,
    },
    DuplicateLecture {
        class_id: String,
        subject_id: String,
        day: Day,
        existing_entry_id: String,
    },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::TeacherBusy {
                teacher_id,
                day,
                time_slot_id,
                existing_entry_id,
            } => write!(
                f,
                "teacher {teacher_id} is already booked on {day} in slot {time_slot_id} (entry {existing_entry_id})"
            ),
            Conflict::RoomBusy {
                lab_room_id,
                day,
                time_slot_id,
                existing_entry_id,
            } => write!(
                f,
                "lab room {lab_room_id} is already booked on {day} in slot {time_slot_id} (entry {existing_entry_id})"
            ),
            Conflict::ClassBusy {
                class_id,
                batch_number,
                day,
                time_slot_id,
                existing_entry_id,
            } => match batch_number {
                Some(batch) => write!(
                    f,
                    "class {class_id} batch {batch} is already booked on {day} in slot {time_slot_id} (entry {existing_entry_id})"
                ),
                None => write!(
                    f,
                    "class {class_id} is already booked on {day} in slot {time_slot_id} (entry {existing_entry_id})"
                ),
            },
            Conflict::DuplicateLecture {
                class_id,
                subject_id,
                day,
                existing_entry_id,
            } => write!(
                f,
                "class {class_id} already has a {subject_id} lecture on {day} (entry {existing_entry_id})"
            ),
        }
    }
}

/// The first rule `candidate` breaks against `existing`, if any.
fn pair_conflict(existing: &TimetableEntry, candidate: &TimetableEntry) -> Option<Conflict> {
    let same_slot = existing.occupies(candidate.day, &candidate.time_slot_id);

    if same_slot && existing.teacher_id == candidate.teacher_id {
        return Some(Conflict::TeacherBusy {
            teacher_id: candidate.teacher_id.clone(),
            day: candidate.day,
            time_slot_id: candidate.time_slot_id.clone(),
            existing_entry_id: existing.id.clone(),
        });
    }

    if let (true, Some(room)) = (same_slot, candidate.lab_room_id.as_deref()) {
        if existing.lab_room_id.as_deref() == Some(room) {
            return Some(Conflict::RoomBusy {
                lab_room_id: room.to_string(),
                day: candidate.day,
                time_slot_id: candidate.time_slot_id.clone(),
                existing_entry_id: existing.id.clone(),
            });
        }
    }

    if same_slot
        && existing.class_id == candidate.class_id
        && batches_overlap(existing.batch_number, candidate.batch_number)
    {
        return Some(Conflict::ClassBusy {
            class_id: candidate.class_id.clone(),
            batch_number: candidate.batch_number,
            day: candidate.day,
            time_slot_id: candidate.time_slot_id.clone(),
            existing_entry_id: existing.id.clone(),
        });
    }

    if !candidate.is_lab
        && !existing.is_lab
        && existing.day == candidate.day
        && existing.class_id == candidate.class_id
        && existing.subject_id == candidate.subject_id
    {
        return Some(Conflict::DuplicateLecture {
            class_id: candidate.class_id.clone(),
            subject_id: candidate.subject_id.clone(),
            day: candidate.day,
            existing_entry_id: existing.id.clone(),
        });
    }

    None
}

/// Checks `candidate` against every other entry. An entry with the same id as
/// the candidate is skipped so updates do not collide with themselves.
pub fn find_conflict(entries: &[TimetableEntry], candidate: &TimetableEntry) -> Option<Conflict> {
    entries
        .iter()
        .filter(|existing| existing.id != candidate.id)
        .find_map(|existing| pair_conflict(existing, candidate))
}

/// Every pairwise violation in a collection, in entry order.
pub fn audit(entries: &[TimetableEntry]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (idx, candidate) in entries.iter().enumerate() {
        for existing in &entries[..idx] {
            if let Some(conflict) = pair_conflict(existing, candidate) {
                conflicts.push(conflict);
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEntry;

    fn lecture(id: &str, day: Day, slot: &str, subject: &str, teacher: &str, class: &str) -> TimetableEntry {
        NewEntry::lecture(day, slot, subject, teacher, class).with_id(id)
    }

    fn lab(id: &str, slot: &str, teacher: &str, class: &str, batch: u32, room: &str) -> TimetableEntry {
        NewEntry::lab(Day::Monday, slot, "phys", teacher, class, batch, room).with_id(id)
    }

    #[test]
    fn teacher_is_busy_only_in_the_booked_slot() {
        let entries = vec![lecture("e1", Day::Monday, "ts1", "math", "t1", "c1")];
        assert!(!is_teacher_free(&entries, "t1", Day::Monday, "ts1"));
        assert!(is_teacher_free(&entries, "t1", Day::Monday, "ts2"));
        assert!(is_teacher_free(&entries, "t1", Day::Tuesday, "ts1"));
        assert!(is_teacher_free(&entries, "t2", Day::Monday, "ts1"));
    }

    #[test]
    fn room_checks_ignore_lectures_without_rooms() {
        let entries = vec![
            lecture("e1", Day::Monday, "lab", "math", "t1", "c1"),
            lab("e2", "lab", "t2", "c2", 1, "r1"),
        ];
        assert!(!is_room_free(&entries, "r1", Day::Monday, "lab"));
        assert!(is_room_free(&entries, "r2", Day::Monday, "lab"));
    }

    #[test]
    fn whole_class_and_batches_block_each_other() {
        let entries = vec![lab("e1", "lab", "t1", "c1", 1, "r1")];
        assert!(!is_class_slot_free(&entries, "c1", Day::Monday, "lab", None));
        assert!(!is_class_slot_free(&entries, "c1", Day::Monday, "lab", Some(1)));
        assert!(is_class_slot_free(&entries, "c1", Day::Monday, "lab", Some(2)));

        let whole = vec![lecture("e2", Day::Monday, "ts1", "math", "t1", "c1")];
        assert!(!is_class_slot_free(&whole, "c1", Day::Monday, "ts1", Some(3)));
    }

    #[test]
    fn labs_do_not_count_as_lectures() {
        let entries = vec![lab("e1", "lab", "t1", "c1", 1, "r1")];
        assert!(!has_lecture_today(&entries, "c1", "phys", Day::Monday));
    }

    #[test]
    fn find_conflict_reports_duplicate_lecture_in_another_slot() {
        let entries = vec![lecture("e1", Day::Monday, "ts1", "math", "t1", "c1")];
        let candidate = lecture("e2", Day::Monday, "ts2", "math", "t2", "c1");
        assert!(matches!(
            find_conflict(&entries, &candidate),
            Some(Conflict::DuplicateLecture { .. })
        ));
    }

    #[test]
    fn find_conflict_skips_the_entry_being_updated() {
        let entries = vec![lecture("e1", Day::Monday, "ts1", "math", "t1", "c1")];
        let moved = lecture("e1", Day::Monday, "ts2", "math", "t1", "c1");
        assert_eq!(find_conflict(&entries, &moved), None);
    }

    #[test]
    fn audit_accepts_parallel_batches() {
        let entries = vec![
            lab("e1", "lab", "t1", "c1", 1, "r1"),
            lab("e2", "lab", "t2", "c1", 2, "r2"),
        ];
        assert!(audit(&entries).is_empty());

        let clashing = vec![
            lab("e1", "lab", "t1", "c1", 1, "r1"),
            lab("e2", "lab", "t2", "c1", 2, "r1"),
        ];
        assert!(matches!(
            audit(&clashing).as_slice(),
            [Conflict::RoomBusy { .. }]
        ));
    }
}

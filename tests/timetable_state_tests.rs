use timetable_engine::{
    Class, Conflict, Day, LabRoom, NewEntry, Subject, Timetable, TimetableEngine, TimetableError,
    ViewFilter,
};

fn sample_with_lecture() -> (Timetable, String) {
    let mut timetable = Timetable::sample();
    let entry = timetable
        .add_entry(NewEntry::lecture(Day::Monday, "ts1", "sub1", "t1", "c1"))
        .expect("first lecture");
    (timetable, entry.id)
}

#[test]
fn second_lecture_of_same_subject_on_same_day_is_rejected() {
    let (mut timetable, first_id) = sample_with_lecture();

    let err = timetable
        .add_entry(NewEntry::lecture(Day::Monday, "ts2", "sub1", "t1", "c1"))
        .unwrap_err();

    assert_eq!(
        err,
        TimetableError::Conflict(Conflict::DuplicateLecture {
            class_id: "c1".into(),
            subject_id: "sub1".into(),
            day: Day::Monday,
            existing_entry_id: first_id,
        })
    );
    assert_eq!(timetable.entries().len(), 1);
}

#[test]
fn busy_teacher_is_rejected() {
    let (mut timetable, _) = sample_with_lecture();
    let err = timetable
        .add_entry(NewEntry::lecture(Day::Monday, "ts1", "sub2", "t1", "c2"))
        .unwrap_err();
    assert!(matches!(
        err,
        TimetableError::Conflict(Conflict::TeacherBusy { .. })
    ));
}

#[test]
fn lab_entries_need_room_and_batch() {
    let mut timetable = Timetable::sample();

    let mut no_room = NewEntry::lab(Day::Monday, "ts9", "sub2", "t1", "c1", 1, "lab1");
    no_room.lab_room_id = None;
    assert_eq!(
        timetable.add_entry(no_room).unwrap_err(),
        TimetableError::LabRoomRequired
    );

    let mut no_batch = NewEntry::lab(Day::Monday, "ts9", "sub2", "t1", "c1", 1, "lab1");
    no_batch.batch_number = None;
    assert_eq!(
        timetable.add_entry(no_batch).unwrap_err(),
        TimetableError::BatchRequired {
            class_id: "c1".into()
        }
    );

    let err = timetable
        .add_entry(NewEntry::lab(Day::Monday, "ts9", "sub2", "t1", "c1", 9, "lab1"))
        .unwrap_err();
    assert!(matches!(err, TimetableError::InvalidBatch { batch_number: 9, .. }));

    let err = timetable
        .add_entry(NewEntry::lab(Day::Monday, "ts9", "sub2", "t1", "c1", 1, "nowhere"))
        .unwrap_err();
    assert!(matches!(
        err,
        TimetableError::UnknownReference { kind: "lab room", .. }
    ));
}

#[test]
fn two_batches_cannot_share_a_lab_room() {
    let mut timetable = Timetable::sample();
    timetable
        .add_entry(NewEntry::lab(Day::Monday, "ts9", "sub2", "t1", "c1", 1, "lab1"))
        .unwrap();
    let err = timetable
        .add_entry(NewEntry::lab(Day::Monday, "ts9", "sub4", "t3", "c1", 2, "lab1"))
        .unwrap_err();
    assert!(matches!(
        err,
        TimetableError::Conflict(Conflict::RoomBusy { .. })
    ));

    timetable
        .add_entry(NewEntry::lab(Day::Monday, "ts9", "sub4", "t3", "c1", 2, "lab2"))
        .unwrap();
    assert!(timetable.audit().is_empty());
}

#[test]
fn unknown_references_are_rejected() {
    let mut timetable = Timetable::sample();
    let err = timetable
        .add_entry(NewEntry::lecture(Day::Monday, "ts1", "sub1", "ghost", "c1"))
        .unwrap_err();
    assert_eq!(
        err,
        TimetableError::UnknownReference {
            kind: "teacher",
            id: "ghost".into()
        }
    );
}

#[test]
fn update_entry_rechecks_against_other_entries() {
    let (mut timetable, first_id) = sample_with_lecture();
    let second = timetable
        .add_entry(NewEntry::lecture(Day::Monday, "ts2", "sub3", "t2", "c1"))
        .unwrap();

    let mut moved = second.clone();
    moved.time_slot_id = "ts1".into();
    let err = timetable.update_entry(moved).unwrap_err();
    assert!(matches!(
        err,
        TimetableError::Conflict(Conflict::ClassBusy { ref existing_entry_id, .. })
            if *existing_entry_id == first_id
    ));

    let mut moved = second.clone();
    moved.time_slot_id = "ts4".into();
    timetable.update_entry(moved).unwrap();
    assert_eq!(
        timetable.find_entry(&second.id).unwrap().time_slot_id,
        "ts4"
    );

    let missing = NewEntry::lecture(Day::Friday, "ts1", "sub1", "t1", "c1").with_id("missing");
    assert!(matches!(
        timetable.update_entry(missing).unwrap_err(),
        TimetableError::NotFound { kind: "entry", .. }
    ));
}

#[test]
fn removing_a_subject_drops_entries_and_qualifications() {
    let mut timetable = Timetable::sample();
    timetable.generate(&TimetableEngine::default()).unwrap();
    assert!(timetable.entries().iter().any(|e| e.subject_id == "sub2"));

    assert!(timetable.remove_subject("sub2"));
    assert!(timetable.entries().iter().all(|e| e.subject_id != "sub2"));
    let t1 = timetable.resources().teacher("t1").unwrap();
    assert_eq!(t1.subjects, vec!["sub1".to_string()]);

    let before = timetable.clone();
    assert!(!timetable.remove_subject("sub2"));
    assert_eq!(timetable, before);
}

#[test]
fn removing_a_teacher_or_class_drops_their_entries() {
    let mut timetable = Timetable::sample();
    timetable.generate(&TimetableEngine::default()).unwrap();

    assert!(timetable.remove_teacher("t4"));
    assert!(timetable.entries().iter().all(|e| e.teacher_id != "t4"));

    assert!(timetable.remove_class("c2"));
    assert!(timetable.entries().iter().all(|e| e.class_id != "c2"));
    assert!(timetable.view(&ViewFilter::Class("c2".into())).is_empty());
    assert!(!timetable.remove_class("c2"));
}

#[test]
fn removing_a_time_slot_drops_entries_in_it() {
    let mut timetable = Timetable::sample();
    timetable.generate(&TimetableEngine::default()).unwrap();
    assert!(timetable.entries().iter().any(|e| e.time_slot_id == "ts9"));

    assert!(timetable.remove_time_slot("ts9"));
    assert!(timetable.entries().iter().all(|e| e.time_slot_id != "ts9"));
    assert_eq!(timetable.stats().lab_slots, 0);
}

#[test]
fn removing_a_lab_room_keeps_entries_without_room() {
    let mut timetable = Timetable::sample();
    let entry = timetable
        .add_entry(NewEntry::lab(Day::Monday, "ts9", "sub2", "t1", "c1", 1, "lab1"))
        .unwrap();

    assert!(timetable.remove_lab_room("lab1"));
    let kept = timetable.find_entry(&entry.id).unwrap();
    assert_eq!(kept.lab_room_id, None);
    assert!(timetable.resources().lab_room("lab1").is_none());
}

#[test]
fn generate_replaces_previous_entries() {
    let mut timetable = Timetable::sample();
    let manual = timetable
        .add_entry(NewEntry::lecture(Day::Saturday, "ts8", "sub6", "t4", "c4"))
        .unwrap();

    let summary = timetable.generate(&TimetableEngine::default()).unwrap();
    assert!(timetable.find_entry(&manual.id).is_none());
    assert_eq!(summary.entry_count, timetable.entries().len());
    assert_eq!(summary.warning_count, timetable.warnings().len());

    let first: Vec<_> = timetable.entries().iter().map(|e| e.without_id()).collect();
    timetable.generate(&TimetableEngine::default()).unwrap();
    let second: Vec<_> = timetable.entries().iter().map(|e| e.without_id()).collect();
    assert_eq!(first, second);
}

#[test]
fn teacher_view_is_sorted_by_day_and_time() {
    let mut timetable = Timetable::sample();
    timetable.generate(&TimetableEngine::default()).unwrap();

    let view = timetable.view(&ViewFilter::Teacher("t2".into()));
    assert!(!view.is_empty());
    assert!(view.iter().all(|e| e.teacher_id == "t2"));
    let keys: Vec<_> = view
        .iter()
        .map(|e| {
            let slot = timetable.resources().time_slot(&e.time_slot_id).unwrap();
            (e.day, slot.start_time)
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn resources_are_validated_on_add() {
    let mut timetable = Timetable::new();
    timetable
        .add_subject(Subject::new("s1", "Maths", "M1"))
        .unwrap();
    assert!(matches!(
        timetable.add_subject(Subject::new("s2", "", "M2")),
        Err(TimetableError::Validation(_))
    ));
    assert!(matches!(
        timetable.add_lab_room(LabRoom::new("r1", "", 10)),
        Err(TimetableError::Validation(_))
    ));
    assert!(matches!(
        timetable.update_subject(Subject::new("zz", "Art", "A1")),
        Err(TimetableError::NotFound { kind: "subject", .. })
    ));
}

#[test]
fn reset_restores_sample_data() {
    let mut timetable = Timetable::sample();
    timetable.remove_class("c1");
    timetable.generate(&TimetableEngine::default()).unwrap();

    timetable.reset_to_sample();
    assert_eq!(timetable, Timetable::sample());
    assert!(timetable.entries().is_empty());
    assert!(timetable.warnings().is_empty());
}

#[test]
fn turning_a_slot_into_a_break_drops_its_entries() {
    let (mut timetable, first_id) = sample_with_lecture();
    let slot = timetable.resources().time_slot("ts1").unwrap().clone().as_break();

    timetable.update_time_slot(slot).unwrap();
    assert!(timetable.find_entry(&first_id).is_none());
    assert_eq!(timetable.stats().breaks, 3);
}

#[test]
fn shrinking_a_class_drops_lab_entries_for_missing_batches() {
    let mut timetable = Timetable::sample();
    timetable
        .add_entry(NewEntry::lab(Day::Monday, "ts9", "sub2", "t1", "c1", 1, "lab1"))
        .unwrap();
    let batch_four = timetable
        .add_entry(NewEntry::lab(Day::Monday, "ts9", "sub4", "t3", "c1", 4, "lab2"))
        .unwrap();

    let class = timetable.resources().class("c1").unwrap().clone().with_batches(2);
    timetable.update_class(class).unwrap();

    assert_eq!(timetable.entries().len(), 1);
    assert!(timetable.find_entry(&batch_four.id).is_none());
}

#[test]
fn splitting_a_class_into_batches_drops_its_unbatched_labs() {
    let mut timetable = Timetable::sample();
    timetable.add_class(Class::new("c9", "Biology", 1)).unwrap();
    let lecture = timetable
        .add_entry(NewEntry::lecture(Day::Monday, "ts1", "sub1", "t1", "c9"))
        .unwrap();
    let mut whole_class_lab = NewEntry::lab(Day::Monday, "ts9", "sub2", "t1", "c9", 1, "lab1");
    whole_class_lab.batch_number = None;
    let lab = timetable.add_entry(whole_class_lab).unwrap();

    let class = timetable.resources().class("c9").unwrap().clone().with_batches(2);
    timetable.update_class(class).unwrap();

    assert!(timetable.find_entry(&lab.id).is_none());
    assert!(timetable.find_entry(&lecture.id).is_some());
    let reloaded = Timetable::from_data(timetable.to_data()).unwrap();
    assert_eq!(reloaded, timetable);
}

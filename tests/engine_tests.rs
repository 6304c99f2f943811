use std::collections::{HashMap, HashSet};

use chrono::NaiveTime;
use timetable_engine::diagnostics::{MissingResource, SessionKind};
use timetable_engine::sample::sample_snapshot;
use timetable_engine::{
    CapacityFit, Class, Day, EngineConfig, FixedLectureCount, LabFeasibility, LabRoom,
    ResourceSnapshot, ScheduleWarning, SlotOrder, Subject, Teacher, TimeSlot, TimetableEngine,
    conflict,
};

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// One lab subject, one class, `teachers` qualified teachers and `rooms` lab rooms.
fn lab_snapshot(teachers: usize, rooms: usize, batches: u32) -> ResourceSnapshot {
    ResourceSnapshot {
        time_slots: vec![
            TimeSlot::new("s1", hm(9, 0), hm(10, 0)),
            TimeSlot::new("lab", hm(14, 0), hm(16, 0)).as_lab(),
        ],
        subjects: vec![Subject::new("phy", "Physics", "PHY1").with_lab()],
        teachers: (1..=teachers)
            .map(|n| {
                Teacher::new(format!("t{n}"), format!("Teacher {n}"), format!("t{n}@uni.edu"))
                    .teaching(["phy"])
            })
            .collect(),
        classes: vec![Class::new("c1", "Physics", 1).with_batches(batches)],
        lab_rooms: (1..=rooms)
            .map(|n| LabRoom::new(format!("r{n}"), format!("Room {n}"), 20))
            .collect(),
    }
}

fn one_lecture_engine(config: EngineConfig) -> TimetableEngine {
    TimetableEngine::new(config)
        .unwrap()
        .with_lecture_counts(FixedLectureCount(1))
}

#[test]
fn single_teacher_and_room_strands_second_batch() {
    let engine = one_lecture_engine(EngineConfig::default());
    let report = engine.generate(&lab_snapshot(1, 1, 2)).unwrap();

    let labs: Vec<_> = report.entries.iter().filter(|e| e.is_lab).collect();
    assert_eq!(labs.len(), 1);
    assert_eq!(labs[0].batch_number, Some(1));
    assert_eq!(labs[0].teacher_id, "t1");
    assert_eq!(labs[0].lab_room_id.as_deref(), Some("r1"));

    assert!(report.warnings.contains(&ScheduleWarning::BatchUnassigned {
        class_id: "c1".into(),
        subject_id: "phy".into(),
        batch_number: 2,
        day: Day::Monday,
        time_slot_id: "lab".into(),
        missing: MissingResource::TeacherAndRoom,
    }));
}

#[test]
fn two_teachers_and_rooms_serve_both_batches_together() {
    let engine = one_lecture_engine(EngineConfig::default());
    let report = engine.generate(&lab_snapshot(2, 2, 2)).unwrap();

    let labs: Vec<_> = report.entries.iter().filter(|e| e.is_lab).collect();
    assert_eq!(labs.len(), 2);
    assert_eq!(labs[0].day, labs[1].day);
    assert_eq!(labs[0].time_slot_id, labs[1].time_slot_id);
    assert_ne!(labs[0].teacher_id, labs[1].teacher_id);
    assert_ne!(labs[0].lab_room_id, labs[1].lab_room_id);

    let batches: HashSet<_> = labs.iter().map(|e| e.batch_number).collect();
    assert_eq!(batches, HashSet::from([Some(1), Some(2)]));
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn distinct_feasibility_refuses_partial_lab_sessions() {
    let config = EngineConfig {
        lab_feasibility: LabFeasibility::Distinct,
        ..EngineConfig::default()
    };
    let report = one_lecture_engine(config)
        .generate(&lab_snapshot(1, 1, 2))
        .unwrap();

    assert_eq!(report.lab_count(), 0);
    assert!(report.warnings.contains(&ScheduleWarning::NoFeasibleLabSlot {
        class_id: "c1".into(),
        subject_id: "phy".into(),
        batches: 2,
    }));
}

#[test]
fn sample_timetable_has_no_double_booking() {
    let snapshot = sample_snapshot();
    let report = TimetableEngine::default().generate(&snapshot).unwrap();
    assert!(!report.entries.is_empty());
    assert!(conflict::audit(&report.entries).is_empty());

    for entry in &report.entries {
        let slot = snapshot.time_slot(&entry.time_slot_id).unwrap();
        assert!(!slot.is_break);
        assert_eq!(slot.is_lab, entry.is_lab, "entry {entry:?} in wrong slot kind");
        let teacher = snapshot.teacher(&entry.teacher_id).unwrap();
        assert!(teacher.can_teach(&entry.subject_id));
    }
}

#[test]
fn sample_timetable_has_at_most_one_lecture_per_subject_per_day() {
    let report = TimetableEngine::default()
        .generate(&sample_snapshot())
        .unwrap();
    let mut counts: HashMap<(&str, &str, Day), usize> = HashMap::new();
    for entry in report.entries.iter().filter(|e| !e.is_lab) {
        *counts
            .entry((entry.class_id.as_str(), entry.subject_id.as_str(), entry.day))
            .or_default() += 1;
    }
    assert!(counts.values().all(|&count| count == 1));
}

#[test]
fn sample_lab_batches_share_one_session() {
    let report = TimetableEngine::default()
        .generate(&sample_snapshot())
        .unwrap();
    let mut sessions: HashMap<(&str, &str), Vec<_>> = HashMap::new();
    for entry in report.entries.iter().filter(|e| e.is_lab) {
        sessions
            .entry((entry.class_id.as_str(), entry.subject_id.as_str()))
            .or_default()
            .push(entry);
    }
    assert!(!sessions.is_empty());
    for entries in sessions.values() {
        let slots: HashSet<_> = entries.iter().map(|e| (e.day, &e.time_slot_id)).collect();
        assert_eq!(slots.len(), 1);
        let batches: HashSet<_> = entries.iter().map(|e| e.batch_number).collect();
        assert_eq!(batches.len(), entries.len());
        assert!(entries.iter().all(|e| e.lab_room_id.is_some()));
    }
}

#[test]
fn generation_is_deterministic_apart_from_ids() {
    let snapshot = sample_snapshot();
    let engine = TimetableEngine::default();
    let first = engine.generate(&snapshot).unwrap();
    let second = engine.generate(&snapshot).unwrap();

    let strip = |report: &timetable_engine::GenerationReport| {
        report
            .entries
            .iter()
            .map(|e| e.without_id())
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&first), strip(&second));
    assert_eq!(first.warnings, second.warnings);
    assert_ne!(first.entries[0].id, second.entries[0].id);
}

#[test]
fn teacher_shared_by_two_classes_is_not_double_booked() {
    let snapshot = ResourceSnapshot {
        time_slots: vec![TimeSlot::new("s1", hm(9, 0), hm(10, 0))],
        subjects: vec![Subject::new("m", "Maths", "M1")],
        teachers: vec![Teacher::new("t1", "Only Teacher", "t1@uni.edu").teaching(["m"])],
        classes: vec![Class::new("c1", "A", 1), Class::new("c2", "B", 1)],
        lab_rooms: Vec::new(),
    };
    let config = EngineConfig {
        working_days: vec![Day::Monday],
        ..EngineConfig::default()
    };
    let report = one_lecture_engine(config).generate(&snapshot).unwrap();

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].class_id, "c1");
    assert_eq!(
        report.warnings,
        vec![ScheduleWarning::LectureShortfall {
            class_id: "c2".into(),
            subject_id: "m".into(),
            requested: 1,
            placed: 0,
        }]
    );
}

#[test]
fn lectures_spread_over_distinct_days() {
    let snapshot = ResourceSnapshot {
        time_slots: vec![
            TimeSlot::new("s1", hm(9, 0), hm(10, 0)),
            TimeSlot::new("s2", hm(10, 0), hm(11, 0)),
        ],
        subjects: vec![Subject::new("m", "Maths", "M1")],
        teachers: vec![Teacher::new("t1", "Teacher", "t1@uni.edu").teaching(["m"])],
        classes: vec![Class::new("c1", "A", 1)],
        lab_rooms: Vec::new(),
    };
    let report = TimetableEngine::default()
        .with_lecture_counts(FixedLectureCount(3))
        .generate(&snapshot)
        .unwrap();

    let days: Vec<Day> = report.entries.iter().map(|e| e.day).collect();
    assert_eq!(days, vec![Day::Monday, Day::Tuesday, Day::Wednesday]);
    assert!(report.entries.iter().all(|e| e.time_slot_id == "s1"));
}

#[test]
fn too_few_days_reports_shortfall() {
    let snapshot = lab_snapshot(1, 1, 1);
    let config = EngineConfig {
        working_days: vec![Day::Monday],
        ..EngineConfig::default()
    };
    let report = TimetableEngine::new(config)
        .unwrap()
        .with_lecture_counts(FixedLectureCount(3))
        .generate(&snapshot)
        .unwrap();

    assert_eq!(report.lecture_count(), 1);
    assert!(report.warnings.contains(&ScheduleWarning::LectureShortfall {
        class_id: "c1".into(),
        subject_id: "phy".into(),
        requested: 3,
        placed: 1,
    }));
}

#[test]
fn slot_order_controls_first_choice() {
    let snapshot = ResourceSnapshot {
        time_slots: vec![
            TimeSlot::new("late", hm(11, 0), hm(12, 0)),
            TimeSlot::new("early", hm(9, 0), hm(10, 0)),
        ],
        subjects: vec![Subject::new("m", "Maths", "M1")],
        teachers: vec![Teacher::new("t1", "Teacher", "t1@uni.edu").teaching(["m"])],
        classes: vec![Class::new("c1", "A", 1)],
        lab_rooms: Vec::new(),
    };

    let chronological = one_lecture_engine(EngineConfig::default())
        .generate(&snapshot)
        .unwrap();
    assert_eq!(chronological.entries[0].time_slot_id, "early");

    let listed = one_lecture_engine(EngineConfig {
        slot_order: SlotOrder::List,
        ..EngineConfig::default()
    })
    .generate(&snapshot)
    .unwrap();
    assert_eq!(listed.entries[0].time_slot_id, "late");
}

#[test]
fn missing_teachers_and_lab_slots_become_warnings() {
    let mut snapshot = lab_snapshot(1, 1, 1);
    snapshot.subjects.push(Subject::new("bio", "Biology", "BIO1").with_lab());
    snapshot.time_slots.retain(|slot| !slot.is_lab);

    let report = one_lecture_engine(EngineConfig::default())
        .generate(&snapshot)
        .unwrap();

    assert!(report.warnings.contains(&ScheduleWarning::NoLabSlots {
        class_id: "c1".into(),
        subject_id: "phy".into(),
    }));
    assert!(report.warnings.contains(&ScheduleWarning::NoEligibleTeacher {
        class_id: "c1".into(),
        subject_id: "bio".into(),
        session: SessionKind::Lecture,
    }));
    assert!(report.warnings.contains(&ScheduleWarning::NoEligibleTeacher {
        class_id: "c1".into(),
        subject_id: "bio".into(),
        session: SessionKind::Lab,
    }));
    assert_eq!(report.lecture_count(), 1);
}

#[test]
fn capacity_fit_prefers_a_room_that_seats_the_batch() {
    let mut snapshot = lab_snapshot(1, 0, 1);
    snapshot.classes[0].batch_capacity = Some(15);
    snapshot.lab_rooms = vec![
        LabRoom::new("small", "Small Lab", 10),
        LabRoom::new("big", "Big Lab", 30),
    ];

    let first_fit = one_lecture_engine(EngineConfig::default())
        .generate(&snapshot)
        .unwrap();
    let lab = first_fit.entries.iter().find(|e| e.is_lab).unwrap();
    assert_eq!(lab.lab_room_id.as_deref(), Some("small"));

    let capacity_fit = one_lecture_engine(EngineConfig::default())
        .with_picker(CapacityFit)
        .generate(&snapshot)
        .unwrap();
    let lab = capacity_fit.entries.iter().find(|e| e.is_lab).unwrap();
    assert_eq!(lab.lab_room_id.as_deref(), Some("big"));
}

#[test]
fn malformed_snapshot_is_rejected() {
    let mut snapshot = lab_snapshot(1, 1, 1);
    snapshot.classes[0].batches = 0;
    let err = TimetableEngine::default().generate(&snapshot).unwrap_err();
    assert!(err.message().contains("at least one batch"));

    let mut snapshot = lab_snapshot(1, 1, 1);
    snapshot.teachers.push(snapshot.teachers[0].clone());
    assert!(TimetableEngine::default().generate(&snapshot).is_err());
}

#[test]
fn invalid_config_is_rejected() {
    let config = EngineConfig {
        working_days: Vec::new(),
        ..EngineConfig::default()
    };
    assert!(TimetableEngine::new(config).is_err());
}

fn lab_days<'a>(
    report: &'a timetable_engine::GenerationReport,
    subject_id: &str,
) -> Vec<(&'a str, Day)> {
    report
        .entries
        .iter()
        .filter(|e| e.is_lab && e.subject_id == subject_id)
        .map(|e| (e.class_id.as_str(), e.day))
        .collect()
}

#[test]
fn lab_moves_to_next_day_when_teacher_and_room_are_taken() {
    let mut snapshot = lab_snapshot(1, 1, 1);
    snapshot.classes.push(Class::new("c2", "Chemistry", 1));

    let report = one_lecture_engine(EngineConfig::default())
        .generate(&snapshot)
        .unwrap();

    assert_eq!(
        lab_days(&report, "phy"),
        vec![("c1", Day::Monday), ("c2", Day::Tuesday)]
    );
    assert!(conflict::audit(&report.entries).is_empty());
}

#[test]
fn lab_moves_to_next_day_when_a_batch_is_already_booked() {
    let mut snapshot = lab_snapshot(1, 2, 2);
    snapshot
        .subjects
        .push(Subject::new("chem", "Chemistry", "CHE1").with_lab());
    snapshot.teachers.extend([
        Teacher::new("t2", "Teacher 2", "t2@uni.edu").teaching(["chem"]),
        Teacher::new("t3", "Teacher 3", "t3@uni.edu").teaching(["chem"]),
    ]);

    let report = one_lecture_engine(EngineConfig::default())
        .generate(&snapshot)
        .unwrap();

    // Physics has one teacher, so only batch 1 sits in the Monday lab slot.
    assert_eq!(lab_days(&report, "phy"), vec![("c1", Day::Monday)]);
    assert_eq!(
        lab_days(&report, "chem"),
        vec![("c1", Day::Tuesday), ("c1", Day::Tuesday)]
    );
    assert!(conflict::audit(&report.entries).is_empty());
}

//! Demo dataset: a small college week with four classes and two lab subjects.

use crate::model::{Class, LabRoom, ResourceSnapshot, Subject, Teacher, TimeSlot};
use chrono::NaiveTime;

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("sample slot times are valid clock times")
}

fn subject(id: &str, name: &str, code: &str, color: &str) -> Subject {
    let mut subject = Subject::new(id, name, code);
    subject.color = Some(color.to_string());
    subject
}

fn class(id: &str, name: &str, year: u32, section: &str) -> Class {
    let mut class = Class::new(id, name, year)
        .with_section(section)
        .with_batches(4);
    class.batch_capacity = Some(15);
    class
}

pub fn sample_snapshot() -> ResourceSnapshot {
    let time_slots = vec![
        TimeSlot::new("ts1", hm(9, 0), hm(10, 0)),
        TimeSlot::new("ts2", hm(10, 0), hm(11, 0)),
        TimeSlot::new("ts3", hm(11, 0), hm(11, 30)).as_break(),
        TimeSlot::new("ts4", hm(11, 30), hm(12, 30)),
        TimeSlot::new("ts5", hm(12, 30), hm(13, 30)),
        TimeSlot::new("ts6", hm(13, 30), hm(14, 30)).as_break(),
        TimeSlot::new("ts7", hm(14, 30), hm(15, 30)),
        TimeSlot::new("ts8", hm(15, 30), hm(16, 30)),
        TimeSlot::new("ts9", hm(16, 30), hm(18, 30)).as_lab(),
    ];

    let subjects = vec![
        subject("sub1", "Mathematics", "MATH101", "#4361EE"),
        subject("sub2", "Physics", "PHYS101", "#3A0CA3").with_lab(),
        subject("sub3", "Chemistry", "CHEM101", "#7209B7"),
        subject("sub4", "Computer Science", "CS101", "#F72585").with_lab(),
        subject("sub5", "English", "ENG101", "#4CC9F0"),
        subject("sub6", "History", "HIST101", "#4D908E"),
    ];

    let teachers = vec![
        Teacher::new("t1", "Dr. John Smith", "john.smith@acadsync.edu")
            .teaching(["sub1", "sub2"]),
        Teacher::new("t2", "Prof. Jane Doe", "jane.doe@acadsync.edu").teaching(["sub3"]),
        Teacher::new("t3", "Dr. Robert Johnson", "robert.johnson@acadsync.edu")
            .teaching(["sub4"]),
        Teacher::new("t4", "Prof. Emily Williams", "emily.williams@acadsync.edu")
            .teaching(["sub5", "sub6"]),
    ];

    let classes = vec![
        class("c1", "Computer Science", 1, "A"),
        class("c2", "Computer Science", 1, "B"),
        class("c3", "Electrical Engineering", 2, "A"),
        class("c4", "Mechanical Engineering", 2, "B"),
    ];

    let lab_rooms = vec![
        LabRoom::new("lab1", "Physics Lab", 20),
        LabRoom::new("lab2", "Computer Lab", 30),
    ];

    ResourceSnapshot {
        time_slots,
        subjects,
        teachers,
        classes,
        lab_rooms,
    }
}

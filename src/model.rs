use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::validation::ModelValidationError;

/// Teaching day of the week. Sunday is never scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// All teaching days in week order.
    pub const WEEK: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = ModelValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Day::WEEK
            .iter()
            .copied()
            .find(|day| {
                let name = day.as_str().to_ascii_lowercase();
                name == lowered || name[..3] == lowered
            })
            .ok_or_else(|| ModelValidationError::new(format!("unknown day '{s}'")))
    }
}

/// Serde adapter for zero-padded "HH:MM" times of day.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub is_break: bool,
    /// Marks a slot long enough to host a lab session.
    #[serde(default)]
    pub is_lab: bool,
}

impl TimeSlot {
    pub fn new(id: impl Into<String>, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time,
            is_break: false,
            is_lab: false,
        }
    }

    /// Builds a slot from "HH:MM" strings.
    pub fn parse(
        id: impl Into<String>,
        start: &str,
        end: &str,
    ) -> Result<Self, ModelValidationError> {
        let id = id.into();
        let start_time = hhmm::parse(start).map_err(|err| {
            ModelValidationError::new(format!("time slot {id} has invalid start '{start}': {err}"))
        })?;
        let end_time = hhmm::parse(end).map_err(|err| {
            ModelValidationError::new(format!("time slot {id} has invalid end '{end}': {err}"))
        })?;
        Ok(Self::new(id, start_time, end_time))
    }

    pub fn as_break(mut self) -> Self {
        self.is_break = true;
        self
    }

    pub fn as_lab(mut self) -> Self {
        self.is_lab = true;
        self
    }

    /// Ordinary teaching slot: neither a break nor a lab slot.
    pub fn is_lecture_slot(&self) -> bool {
        !self.is_break && !self.is_lab
    }

    pub fn time_range(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format(hhmm::FORMAT),
            self.end_time.format(hhmm::FORMAT)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub code: String,
    /// Display colour, ignored by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub has_lab: bool,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: code.into(),
            color: None,
            has_lab: false,
        }
    }

    pub fn with_lab(mut self) -> Self {
        self.has_lab = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Ids of the subjects this teacher is qualified to teach.
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl Teacher {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            department: None,
            subjects: Vec::new(),
        }
    }

    pub fn teaching<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    pub fn can_teach(&self, subject_id: &str) -> bool {
        self.subjects.iter().any(|id| id == subject_id)
    }
}

fn default_batches() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Number of lab sub-groups. Must be at least 1.
    #[serde(default = "default_batches")]
    pub batches: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_capacity: Option<u32>,
}

impl Class {
    pub fn new(id: impl Into<String>, name: impl Into<String>, year: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            year,
            section: None,
            batches: 1,
            batch_capacity: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_batches(mut self, batches: u32) -> Self {
        self.batches = batches;
        self
    }

    pub fn label(&self) -> String {
        match &self.section {
            Some(section) => format!("{} Year {}-{}", self.name, self.year, section),
            None => format!("{} Year {}", self.name, self.year),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabRoom {
    pub id: String,
    pub name: String,
    pub capacity: u32,
}

impl LabRoom {
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
        }
    }
}

/// An entry before it has been given an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub day: Day,
    pub time_slot_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub class_id: String,
    #[serde(default)]
    pub is_lab: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_room_id: Option<String>,
}

impl NewEntry {
    pub fn lecture(
        day: Day,
        time_slot_id: impl Into<String>,
        subject_id: impl Into<String>,
        teacher_id: impl Into<String>,
        class_id: impl Into<String>,
    ) -> Self {
        Self {
            day,
            time_slot_id: time_slot_id.into(),
            subject_id: subject_id.into(),
            teacher_id: teacher_id.into(),
            class_id: class_id.into(),
            is_lab: false,
            batch_number: None,
            lab_room_id: None,
        }
    }

    pub fn lab(
        day: Day,
        time_slot_id: impl Into<String>,
        subject_id: impl Into<String>,
        teacher_id: impl Into<String>,
        class_id: impl Into<String>,
        batch_number: u32,
        lab_room_id: impl Into<String>,
    ) -> Self {
        Self {
            is_lab: true,
            batch_number: Some(batch_number),
            lab_room_id: Some(lab_room_id.into()),
            ..Self::lecture(day, time_slot_id, subject_id, teacher_id, class_id)
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> TimetableEntry {
        TimetableEntry {
            id: id.into(),
            day: self.day,
            time_slot_id: self.time_slot_id,
            subject_id: self.subject_id,
            teacher_id: self.teacher_id,
            class_id: self.class_id,
            is_lab: self.is_lab,
            batch_number: self.batch_number,
            lab_room_id: self.lab_room_id,
        }
    }

    pub fn with_fresh_id(self) -> TimetableEntry {
        self.with_id(new_entry_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: String,
    pub day: Day,
    pub time_slot_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub class_id: String,
    #[serde(default)]
    pub is_lab: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_room_id: Option<String>,
}

impl TimetableEntry {
    /// The assignment without its id, for structural comparison.
    pub fn without_id(&self) -> NewEntry {
        NewEntry {
            day: self.day,
            time_slot_id: self.time_slot_id.clone(),
            subject_id: self.subject_id.clone(),
            teacher_id: self.teacher_id.clone(),
            class_id: self.class_id.clone(),
            is_lab: self.is_lab,
            batch_number: self.batch_number,
            lab_room_id: self.lab_room_id.clone(),
        }
    }

    pub fn occupies(&self, day: Day, time_slot_id: &str) -> bool {
        self.day == day && self.time_slot_id == time_slot_id
    }
}

pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Ordered resource lists consumed by the engine. List order is significant:
/// earlier classes and subjects get first pick of scarce teachers and rooms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSnapshot {
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub classes: Vec<Class>,
    #[serde(default)]
    pub lab_rooms: Vec<LabRoom>,
}

impl ResourceSnapshot {
    pub fn time_slot(&self, id: &str) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|slot| slot.id == id)
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.id == id)
    }

    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|teacher| teacher.id == id)
    }

    pub fn class(&self, id: &str) -> Option<&Class> {
        self.classes.iter().find(|class| class.id == id)
    }

    pub fn lab_room(&self, id: &str) -> Option<&LabRoom> {
        self.lab_rooms.iter().find(|room| room.id == id)
    }

    pub fn qualified_teachers(&self, subject_id: &str) -> Vec<&Teacher> {
        self.teachers
            .iter()
            .filter(|teacher| teacher.can_teach(subject_id))
            .collect()
    }
}

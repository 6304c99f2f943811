use serde::{Deserialize, Serialize};

use crate::model::{ResourceSnapshot, TimetableEntry};

/// Which slice of the timetable to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ViewFilter {
    Master,
    Class(String),
    Teacher(String),
}

impl ViewFilter {
    pub fn matches(&self, entry: &TimetableEntry) -> bool {
        match self {
            ViewFilter::Master => true,
            ViewFilter::Class(class_id) => &entry.class_id == class_id,
            ViewFilter::Teacher(teacher_id) => &entry.teacher_id == teacher_id,
        }
    }
}

/// Entries matching `filter`, ordered by day and then slot start time.
pub fn select<'a>(
    resources: &ResourceSnapshot,
    entries: &'a [TimetableEntry],
    filter: &ViewFilter,
) -> Vec<&'a TimetableEntry> {
    let mut selected: Vec<&TimetableEntry> =
        entries.iter().filter(|entry| filter.matches(entry)).collect();
    selected.sort_by_key(|entry| {
        (
            entry.day,
            resources
                .time_slot(&entry.time_slot_id)
                .map(|slot| slot.start_time),
            entry.batch_number,
        )
    });
    selected
}

/// Human-readable rendering of one entry, resolved against the resource lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRow {
    pub day: String,
    pub start: String,
    pub end: String,
    pub subject: String,
    pub subject_code: String,
    pub teacher: String,
    pub class: String,
    pub batch: String,
    pub lab_room: String,
    pub is_lab: bool,
}

impl EntryRow {
    pub fn from_entry(resources: &ResourceSnapshot, entry: &TimetableEntry) -> Self {
        let slot = resources.time_slot(&entry.time_slot_id);
        let subject = resources.subject(&entry.subject_id);
        Self {
            day: entry.day.to_string(),
            start: slot
                .map(|s| s.start_time.format("%H:%M").to_string())
                .unwrap_or_default(),
            end: slot
                .map(|s| s.end_time.format("%H:%M").to_string())
                .unwrap_or_default(),
            subject: subject
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Unknown Subject".to_string()),
            subject_code: subject.map(|s| s.code.clone()).unwrap_or_default(),
            teacher: resources
                .teacher(&entry.teacher_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "Unknown Teacher".to_string()),
            class: resources
                .class(&entry.class_id)
                .map(|c| c.label())
                .unwrap_or_else(|| "Unknown Class".to_string()),
            batch: entry
                .batch_number
                .map(|b| b.to_string())
                .unwrap_or_default(),
            lab_room: entry
                .lab_room_id
                .as_deref()
                .and_then(|id| resources.lab_room(id))
                .map(|r| r.name.clone())
                .unwrap_or_default(),
            is_lab: entry.is_lab,
        }
    }
}

pub fn rows(
    resources: &ResourceSnapshot,
    entries: &[TimetableEntry],
    filter: &ViewFilter,
) -> Vec<EntryRow> {
    select(resources, entries, filter)
        .into_iter()
        .map(|entry| EntryRow::from_entry(resources, entry))
        .collect()
}

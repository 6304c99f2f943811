use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::conflict::{self, Conflict};
use crate::diagnostics::{GenerationSummary, ScheduleWarning};
use crate::engine::TimetableEngine;
use crate::model::{
    Class, LabRoom, NewEntry, ResourceSnapshot, Subject, Teacher, TimeSlot, TimetableEntry,
};
use crate::sample::sample_snapshot;
use crate::validation::{self, ModelValidationError};
use crate::view::{self, EntryRow, ViewFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimetableError {
    Validation(ModelValidationError),
    DuplicateId { kind: &'static str, id: String },
    NotFound { kind: &'static str, id: String },
    UnknownReference { kind: &'static str, id: String },
    BreakSlot { time_slot_id: String },
    LabRoomRequired,
    BatchRequired { class_id: String },
    InvalidBatch {
        class_id: String,
        batch_number: u32,
        batches: u32,
    },
    Conflict(Conflict),
}

impl fmt::Display for TimetableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimetableError::Validation(err) => write!(f, "{err}"),
            TimetableError::DuplicateId { kind, id } => write!(f, "{kind} {id} already exists"),
            TimetableError::NotFound { kind, id } => write!(f, "{kind} {id} not found"),
            TimetableError::UnknownReference { kind, id } => {
                write!(f, "entry references unknown {kind} {id}")
            }
            TimetableError::BreakSlot { time_slot_id } => {
                write!(f, "time slot {time_slot_id} is a break")
            }
            TimetableError::LabRoomRequired => write!(f, "a lab session requires a lab room"),
            TimetableError::BatchRequired { class_id } => write!(
                f,
                "class {class_id} has several batches; a lab session must name one"
            ),
            TimetableError::InvalidBatch {
                class_id,
                batch_number,
                batches,
            } => write!(
                f,
                "class {class_id} has {batches} batches; batch {batch_number} does not exist"
            ),
            TimetableError::Conflict(conflict) => write!(f, "{conflict}"),
        }
    }
}

impl std::error::Error for TimetableError {}

impl From<ModelValidationError> for TimetableError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<Conflict> for TimetableError {
    fn from(value: Conflict) -> Self {
        Self::Conflict(value)
    }
}

pub type TimetableResult<T> = Result<T, TimetableError>;

/// Serialisable form of a whole timetable, keyed the way callers persist it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableData {
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
    #[serde(default)]
    pub entries: Vec<TimetableEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableStats {
    pub time_slots: usize,
    pub breaks: usize,
    pub lab_slots: usize,
    pub subjects: usize,
    pub lab_subjects: usize,
    pub teachers: usize,
    pub classes: usize,
    pub lab_rooms: usize,
    pub entries: usize,
    pub lab_entries: usize,
}

/// Resource lists plus the entries placed on them.
///
/// Every mutation is validated and returns a result; nothing is persisted
/// implicitly. Callers save through [`crate::persistence`] when they choose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timetable {
    resources: ResourceSnapshot,
    entries: Vec<TimetableEntry>,
    warnings: Vec<ScheduleWarning>,
}

/// Stored lab entries may have lost their room when the room was removed.
/// New and edited entries must name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabDetails {
    Required,
    RoomMayBeCleared,
}

fn ensure_absent<T>(
    items: &[T],
    kind: &'static str,
    id: &str,
    id_of: impl Fn(&T) -> &str,
) -> TimetableResult<()> {
    if items.iter().any(|item| id_of(item) == id) {
        return Err(TimetableError::DuplicateId {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn replace_by_id<T>(
    items: &mut [T],
    kind: &'static str,
    item: T,
    id_of: impl Fn(&T) -> &str,
) -> TimetableResult<()> {
    let id = id_of(&item).to_string();
    match items.iter_mut().find(|existing| id_of(existing) == id) {
        Some(slot) => {
            *slot = item;
            Ok(())
        }
        None => Err(TimetableError::NotFound { kind, id }),
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, id_of: impl Fn(&T) -> &str) -> bool {
    let before = items.len();
    items.retain(|item| id_of(item) != id);
    items.len() != before
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(resources: ResourceSnapshot) -> TimetableResult<Self> {
        validation::validate_snapshot(&resources)?;
        Ok(Self {
            resources,
            entries: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Rebuilds a timetable from stored parts. Entries are re-checked one by
    /// one, so a stored collection with a clash is rejected.
    pub fn from_parts(
        resources: ResourceSnapshot,
        entries: Vec<TimetableEntry>,
    ) -> TimetableResult<Self> {
        let mut timetable = Self::with_resources(resources)?;
        for entry in entries {
            timetable.check_entry(&entry, LabDetails::RoomMayBeCleared)?;
            if timetable.entries.iter().any(|existing| existing.id == entry.id) {
                return Err(TimetableError::DuplicateId {
                    kind: "entry",
                    id: entry.id,
                });
            }
            timetable.entries.push(entry);
        }
        Ok(timetable)
    }

    pub fn sample() -> Self {
        Self {
            resources: sample_snapshot(),
            entries: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Drops everything and loads the demo dataset.
    pub fn reset_to_sample(&mut self) {
        *self = Self::sample();
    }

    pub fn resources(&self) -> &ResourceSnapshot {
        &self.resources
    }

    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }

    /// Warnings from the last generation run.
    pub fn warnings(&self) -> &[ScheduleWarning] {
        &self.warnings
    }

    pub fn find_entry(&self, id: &str) -> Option<&TimetableEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn to_data(&self) -> TimetableData {
        TimetableData {
            time_slots: self.resources.time_slots.clone(),
            subjects: self.resources.subjects.clone(),
            teachers: self.resources.teachers.clone(),
            classes: self.resources.classes.clone(),
            lab_rooms: self.resources.lab_rooms.clone(),
            entries: self.entries.clone(),
        }
    }

    pub fn from_data(data: TimetableData) -> TimetableResult<Self> {
        let resources = ResourceSnapshot {
            time_slots: data.time_slots,
            subjects: data.subjects,
            teachers: data.teachers,
            classes: data.classes,
            lab_rooms: data.lab_rooms,
        };
        Self::from_parts(resources, data.entries)
    }

    /// Regenerates every entry from scratch. The old entries are replaced only
    /// once the engine has finished.
    pub fn generate(
        &mut self,
        engine: &TimetableEngine,
    ) -> Result<GenerationSummary, ModelValidationError> {
        let report = engine.generate(&self.resources)?;
        let summary = report.summary();
        self.entries = report.entries;
        self.warnings = report.warnings;
        Ok(summary)
    }

    // Time slots

    pub fn add_time_slot(&mut self, slot: TimeSlot) -> TimetableResult<()> {
        validation::validate_time_slot(&slot)?;
        ensure_absent(&self.resources.time_slots, "time slot", &slot.id, |s| &s.id)?;
        self.resources.time_slots.push(slot);
        Ok(())
    }

    /// Replaces a slot. Turning it into a break drops the entries placed in it.
    pub fn update_time_slot(&mut self, slot: TimeSlot) -> TimetableResult<()> {
        validation::validate_time_slot(&slot)?;
        let id = slot.id.clone();
        let is_break = slot.is_break;
        replace_by_id(&mut self.resources.time_slots, "time slot", slot, |s| &s.id)?;
        if is_break {
            self.drop_entries_where(|entry| entry.time_slot_id == id, "time slot", &id);
        }
        Ok(())
    }

    /// Removes the slot and every entry placed in it.
    pub fn remove_time_slot(&mut self, id: &str) -> bool {
        if !remove_by_id(&mut self.resources.time_slots, id, |s| &s.id) {
            return false;
        }
        self.drop_entries_where(|entry| entry.time_slot_id == id, "time slot", id);
        true
    }

    // Subjects

    pub fn add_subject(&mut self, subject: Subject) -> TimetableResult<()> {
        validation::validate_subject(&subject)?;
        ensure_absent(&self.resources.subjects, "subject", &subject.id, |s| &s.id)?;
        self.resources.subjects.push(subject);
        Ok(())
    }

    pub fn update_subject(&mut self, subject: Subject) -> TimetableResult<()> {
        validation::validate_subject(&subject)?;
        replace_by_id(&mut self.resources.subjects, "subject", subject, |s| &s.id)
    }

    /// Removes the subject, its entries, and the subject from every teacher's
    /// qualifications.
    pub fn remove_subject(&mut self, id: &str) -> bool {
        if !remove_by_id(&mut self.resources.subjects, id, |s| &s.id) {
            return false;
        }
        for teacher in &mut self.resources.teachers {
            teacher.subjects.retain(|subject_id| subject_id != id);
        }
        self.drop_entries_where(|entry| entry.subject_id == id, "subject", id);
        true
    }

    // Teachers

    pub fn add_teacher(&mut self, teacher: Teacher) -> TimetableResult<()> {
        validation::validate_teacher(&teacher)?;
        ensure_absent(&self.resources.teachers, "teacher", &teacher.id, |t| &t.id)?;
        self.resources.teachers.push(teacher);
        Ok(())
    }

    pub fn update_teacher(&mut self, teacher: Teacher) -> TimetableResult<()> {
        validation::validate_teacher(&teacher)?;
        replace_by_id(&mut self.resources.teachers, "teacher", teacher, |t| &t.id)
    }

    pub fn remove_teacher(&mut self, id: &str) -> bool {
        if !remove_by_id(&mut self.resources.teachers, id, |t| &t.id) {
            return false;
        }
        self.drop_entries_where(|entry| entry.teacher_id == id, "teacher", id);
        true
    }

    // Classes

    pub fn add_class(&mut self, class: Class) -> TimetableResult<()> {
        validation::validate_class(&class)?;
        ensure_absent(&self.resources.classes, "class", &class.id, |c| &c.id)?;
        self.resources.classes.push(class);
        Ok(())
    }

    /// Replaces a class. Entries for batches it no longer has are dropped, as
    /// are unbatched lab entries once the class is split into batches.
    pub fn update_class(&mut self, class: Class) -> TimetableResult<()> {
        validation::validate_class(&class)?;
        let id = class.id.clone();
        let batches = class.batches;
        replace_by_id(&mut self.resources.classes, "class", class, |c| &c.id)?;
        self.drop_entries_where(
            |entry| {
                entry.class_id == id
                    && match entry.batch_number {
                        Some(batch_number) => batch_number > batches,
                        None => entry.is_lab && batches > 1,
                    }
            },
            "class batches",
            &id,
        );
        Ok(())
    }

    pub fn remove_class(&mut self, id: &str) -> bool {
        if !remove_by_id(&mut self.resources.classes, id, |c| &c.id) {
            return false;
        }
        self.drop_entries_where(|entry| entry.class_id == id, "class", id);
        true
    }

    // Lab rooms

    pub fn add_lab_room(&mut self, room: LabRoom) -> TimetableResult<()> {
        validation::validate_lab_room(&room)?;
        ensure_absent(&self.resources.lab_rooms, "lab room", &room.id, |r| &r.id)?;
        self.resources.lab_rooms.push(room);
        Ok(())
    }

    pub fn update_lab_room(&mut self, room: LabRoom) -> TimetableResult<()> {
        validation::validate_lab_room(&room)?;
        replace_by_id(&mut self.resources.lab_rooms, "lab room", room, |r| &r.id)
    }

    /// Removes the room. Entries that used it stay, with the room cleared.
    pub fn remove_lab_room(&mut self, id: &str) -> bool {
        if !remove_by_id(&mut self.resources.lab_rooms, id, |r| &r.id) {
            return false;
        }
        let mut cleared = 0;
        for entry in &mut self.entries {
            if entry.lab_room_id.as_deref() == Some(id) {
                entry.lab_room_id = None;
                cleared += 1;
            }
        }
        info!(lab_room_id = id, cleared, "lab room removed");
        true
    }

    fn drop_entries_where<F>(&mut self, predicate: F, kind: &str, id: &str)
    where
        F: Fn(&TimetableEntry) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(entry));
        info!(
            kind,
            id,
            removed_entries = before - self.entries.len(),
            "dependent entries dropped"
        );
    }

    // Entries

    /// Rejects entries that reference unknown resources, sit in a break, lack
    /// the lab details their class needs, or clash with an existing entry.
    fn check_entry(&self, entry: &TimetableEntry, lab_details: LabDetails) -> TimetableResult<()> {
        let resources = &self.resources;
        let slot = resources.time_slot(&entry.time_slot_id).ok_or_else(|| {
            TimetableError::UnknownReference {
                kind: "time slot",
                id: entry.time_slot_id.clone(),
            }
        })?;
        if resources.subject(&entry.subject_id).is_none() {
            return Err(TimetableError::UnknownReference {
                kind: "subject",
                id: entry.subject_id.clone(),
            });
        }
        if resources.teacher(&entry.teacher_id).is_none() {
            return Err(TimetableError::UnknownReference {
                kind: "teacher",
                id: entry.teacher_id.clone(),
            });
        }
        let class = resources.class(&entry.class_id).ok_or_else(|| {
            TimetableError::UnknownReference {
                kind: "class",
                id: entry.class_id.clone(),
            }
        })?;
        if slot.is_break {
            return Err(TimetableError::BreakSlot {
                time_slot_id: slot.id.clone(),
            });
        }

        if let Some(room_id) = entry.lab_room_id.as_deref() {
            if resources.lab_room(room_id).is_none() {
                return Err(TimetableError::UnknownReference {
                    kind: "lab room",
                    id: room_id.to_string(),
                });
            }
        }
        if let Some(batch_number) = entry.batch_number {
            if batch_number == 0 || batch_number > class.batches {
                return Err(TimetableError::InvalidBatch {
                    class_id: class.id.clone(),
                    batch_number,
                    batches: class.batches,
                });
            }
        }
        if entry.is_lab {
            if entry.lab_room_id.is_none() && lab_details == LabDetails::Required {
                return Err(TimetableError::LabRoomRequired);
            }
            if class.batches > 1 && entry.batch_number.is_none() {
                return Err(TimetableError::BatchRequired {
                    class_id: class.id.clone(),
                });
            }
        }

        match conflict::find_conflict(&self.entries, entry) {
            Some(conflict) => Err(conflict.into()),
            None => Ok(()),
        }
    }

    pub fn add_entry(&mut self, entry: NewEntry) -> TimetableResult<TimetableEntry> {
        let entry = entry.with_fresh_id();
        self.check_entry(&entry, LabDetails::Required)?;
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn update_entry(&mut self, entry: TimetableEntry) -> TimetableResult<()> {
        let Some(idx) = self.entries.iter().position(|e| e.id == entry.id) else {
            return Err(TimetableError::NotFound {
                kind: "entry",
                id: entry.id,
            });
        };
        self.check_entry(&entry, LabDetails::Required)?;
        self.entries[idx] = entry;
        Ok(())
    }

    pub fn remove_entry(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.entries, id, |e| &e.id)
    }

    pub fn clear_entries(&mut self) {
        self.entries.clear();
        self.warnings.clear();
    }

    // Views

    pub fn view(&self, filter: &ViewFilter) -> Vec<&TimetableEntry> {
        view::select(&self.resources, &self.entries, filter)
    }

    pub fn rows(&self, filter: &ViewFilter) -> Vec<EntryRow> {
        view::rows(&self.resources, &self.entries, filter)
    }

    /// Every clash currently present among the entries.
    pub fn audit(&self) -> Vec<Conflict> {
        conflict::audit(&self.entries)
    }

    pub fn stats(&self) -> TimetableStats {
        let resources = &self.resources;
        TimetableStats {
            time_slots: resources.time_slots.len(),
            breaks: resources.time_slots.iter().filter(|s| s.is_break).count(),
            lab_slots: resources.time_slots.iter().filter(|s| s.is_lab).count(),
            subjects: resources.subjects.len(),
            lab_subjects: resources.subjects.iter().filter(|s| s.has_lab).count(),
            teachers: resources.teachers.len(),
            classes: resources.classes.len(),
            lab_rooms: resources.lab_rooms.len(),
            entries: self.entries.len(),
            lab_entries: self.entries.iter().filter(|e| e.is_lab).count(),
        }
    }
}

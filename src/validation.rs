use crate::model::{Class, LabRoom, ResourceSnapshot, Subject, Teacher, TimeSlot};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelValidationError {
    message: String,
}

impl ModelValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ModelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ModelValidationError {}

fn require_id(kind: &str, id: &str) -> Result<(), ModelValidationError> {
    if id.trim().is_empty() {
        return Err(ModelValidationError::new(format!(
            "{kind} requires a non-empty id"
        )));
    }
    Ok(())
}

pub fn validate_time_slot(slot: &TimeSlot) -> Result<(), ModelValidationError> {
    require_id("time slot", &slot.id)?;
    if slot.is_break && slot.is_lab {
        return Err(ModelValidationError::new(format!(
            "time slot {} cannot be both a break and a lab session",
            slot.id
        )));
    }
    if slot.start_time >= slot.end_time {
        return Err(ModelValidationError::new(format!(
            "time slot {} must start before it ends ({})",
            slot.id,
            slot.time_range()
        )));
    }
    Ok(())
}

pub fn validate_subject(subject: &Subject) -> Result<(), ModelValidationError> {
    require_id("subject", &subject.id)?;
    if subject.name.trim().is_empty() || subject.code.trim().is_empty() {
        return Err(ModelValidationError::new(format!(
            "subject {} requires a name and a code",
            subject.id
        )));
    }
    Ok(())
}

pub fn validate_teacher(teacher: &Teacher) -> Result<(), ModelValidationError> {
    require_id("teacher", &teacher.id)?;
    if teacher.name.trim().is_empty() || teacher.email.trim().is_empty() {
        return Err(ModelValidationError::new(format!(
            "teacher {} requires a name and an email",
            teacher.id
        )));
    }
    Ok(())
}

pub fn validate_class(class: &Class) -> Result<(), ModelValidationError> {
    require_id("class", &class.id)?;
    if class.name.trim().is_empty() {
        return Err(ModelValidationError::new(format!(
            "class {} requires a name",
            class.id
        )));
    }
    if class.batches == 0 {
        return Err(ModelValidationError::new(format!(
            "class {} must have at least one batch",
            class.id
        )));
    }
    Ok(())
}

pub fn validate_lab_room(room: &LabRoom) -> Result<(), ModelValidationError> {
    require_id("lab room", &room.id)?;
    if room.name.trim().is_empty() {
        return Err(ModelValidationError::new(format!(
            "lab room {} requires a name",
            room.id
        )));
    }
    Ok(())
}

fn ensure_unique_ids<'a, I>(kind: &str, ids: I) -> Result<(), ModelValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ModelValidationError::new(format!("duplicate {kind} id {id}")));
        }
    }
    Ok(())
}

/// Checks every resource and rejects duplicate ids within each collection.
pub fn validate_snapshot(snapshot: &ResourceSnapshot) -> Result<(), ModelValidationError> {
    ensure_unique_ids("time slot", snapshot.time_slots.iter().map(|s| s.id.as_str()))?;
    ensure_unique_ids("subject", snapshot.subjects.iter().map(|s| s.id.as_str()))?;
    ensure_unique_ids("teacher", snapshot.teachers.iter().map(|t| t.id.as_str()))?;
    ensure_unique_ids("class", snapshot.classes.iter().map(|c| c.id.as_str()))?;
    ensure_unique_ids("lab room", snapshot.lab_rooms.iter().map(|r| r.id.as_str()))?;

    for slot in &snapshot.time_slots {
        validate_time_slot(slot)?;
    }
    for subject in &snapshot.subjects {
        validate_subject(subject)?;
    }
    for teacher in &snapshot.teachers {
        validate_teacher(teacher)?;
    }
    for class in &snapshot.classes {
        validate_class(class)?;
    }
    for room in &snapshot.lab_rooms {
        validate_lab_room(room)?;
    }
    Ok(())
}

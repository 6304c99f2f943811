use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Day, TimetableEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Lecture,
    Lab,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Lecture => f.write_str("lecture"),
            SessionKind::Lab => f.write_str("lab"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingResource {
    Teacher,
    Room,
    TeacherAndRoom,
}

impl fmt::Display for MissingResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingResource::Teacher => f.write_str("no free teacher"),
            MissingResource::Room => f.write_str("no free lab room"),
            MissingResource::TeacherAndRoom => f.write_str("no free teacher or lab room"),
        }
    }
}

/// A placement the engine could not make. Warnings are data: the run
/// continues and returns whatever could be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    NoEligibleTeacher {
        class_id: String,
        subject_id: String,
        session: SessionKind,
    },
    NoLabSlots {
        class_id: String,
        subject_id: String,
    },
    NoFeasibleLabSlot {
        class_id: String,
        subject_id: String,
        batches: u32,
    },
    BatchUnassigned {
        class_id: String,
        subject_id: String,
        batch_number: u32,
        day: Day,
        time_slot_id: String,
        missing: MissingResource,
    },
    LectureShortfall {
        class_id: String,
        subject_id: String,
        requested: u32,
        placed: u32,
    },
}

impl ScheduleWarning {
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleWarning::NoEligibleTeacher { .. } => "no_eligible_teacher",
            ScheduleWarning::NoLabSlots { .. } => "no_lab_slots",
            ScheduleWarning::NoFeasibleLabSlot { .. } => "no_feasible_lab_slot",
            ScheduleWarning::BatchUnassigned { .. } => "batch_unassigned",
            ScheduleWarning::LectureShortfall { .. } => "lecture_shortfall",
        }
    }

    pub fn class_id(&self) -> &str {
        match self {
            ScheduleWarning::NoEligibleTeacher { class_id, .. }
            | ScheduleWarning::NoLabSlots { class_id, .. }
            | ScheduleWarning::NoFeasibleLabSlot { class_id, .. }
            | ScheduleWarning::BatchUnassigned { class_id, .. }
            | ScheduleWarning::LectureShortfall { class_id, .. } => class_id,
        }
    }

    pub fn subject_id(&self) -> &str {
        match self {
            ScheduleWarning::NoEligibleTeacher { subject_id, .. }
            | ScheduleWarning::NoLabSlots { subject_id, .. }
            | ScheduleWarning::NoFeasibleLabSlot { subject_id, .. }
            | ScheduleWarning::BatchUnassigned { subject_id, .. }
            | ScheduleWarning::LectureShortfall { subject_id, .. } => subject_id,
        }
    }
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleWarning::NoEligibleTeacher {
                class_id,
                subject_id,
                session,
            } => write!(
                f,
                "no eligible teacher for subject {subject_id} ({session}, class {class_id})"
            ),
            ScheduleWarning::NoLabSlots {
                class_id,
                subject_id,
            } => write!(
                f,
                "no lab time slots defined for subject {subject_id} (class {class_id})"
            ),
            ScheduleWarning::NoFeasibleLabSlot {
                class_id,
                subject_id,
                batches,
            } => write!(
                f,
                "no feasible day/slot for all {batches} batches of class {class_id} in subject {subject_id}"
            ),
            ScheduleWarning::BatchUnassigned {
                class_id,
                subject_id,
                batch_number,
                day,
                time_slot_id,
                missing,
            } => write!(
                f,
                "class {class_id} batch {batch_number} left without a {subject_id} lab on {day} slot {time_slot_id}: {missing}"
            ),
            ScheduleWarning::LectureShortfall {
                class_id,
                subject_id,
                requested,
                placed,
            } => write!(
                f,
                "placed {placed} of {requested} weekly lectures of subject {subject_id} for class {class_id}"
            ),
        }
    }
}

/// Output of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub entries: Vec<TimetableEntry>,
    pub warnings: Vec<ScheduleWarning>,
}

impl GenerationReport {
    pub fn lecture_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_lab).count()
    }

    pub fn lab_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_lab).count()
    }

    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary {
            entry_count: self.entries.len(),
            lecture_count: self.lecture_count(),
            lab_count: self.lab_count(),
            warning_count: self.warnings.len(),
            warnings: self.warnings.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub entry_count: usize,
    pub lecture_count: usize,
    pub lab_count: usize,
    pub warning_count: usize,
    pub warnings: Vec<ScheduleWarning>,
}

impl GenerationSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("entries={}", self.entry_count));
        parts.push(format!("lectures={}", self.lecture_count));
        parts.push(format!("labs={}", self.lab_count));
        if self.warning_count > 0 {
            parts.push(format!("warnings={}", self.warning_count));
        }
        parts.join(", ")
    }
}

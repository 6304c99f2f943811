pub mod lab;
pub mod lecture;

use tracing::warn;

use crate::config::{EngineConfig, SlotOrder};
use crate::diagnostics::{GenerationReport, ScheduleWarning};
use crate::model::{Day, ResourceSnapshot, Teacher, TimeSlot, TimetableEntry};
use crate::policy::ResourcePicker;

/// Read-only inputs shared by the schedulers during one run.
pub struct SchedulingContext<'a> {
    pub snapshot: &'a ResourceSnapshot,
    pub config: &'a EngineConfig,
    pub picker: &'a dyn ResourcePicker,
    pub days: Vec<Day>,
    pub lecture_slots: Vec<&'a TimeSlot>,
    pub lab_slots: Vec<&'a TimeSlot>,
}

impl<'a> SchedulingContext<'a> {
    pub fn new(
        snapshot: &'a ResourceSnapshot,
        config: &'a EngineConfig,
        picker: &'a dyn ResourcePicker,
    ) -> Self {
        let mut slots: Vec<&TimeSlot> = snapshot.time_slots.iter().collect();
        if config.slot_order == SlotOrder::Chronological {
            slots.sort_by_key(|slot| slot.start_time);
        }
        let lecture_slots = slots
            .iter()
            .copied()
            .filter(|slot| slot.is_lecture_slot())
            .collect();
        let lab_slots = slots.iter().copied().filter(|slot| slot.is_lab).collect();

        Self {
            snapshot,
            config,
            picker,
            days: config.days(),
            lecture_slots,
            lab_slots,
        }
    }

    pub fn qualified_teachers(&self, subject_id: &str) -> Vec<&'a Teacher> {
        self.snapshot.qualified_teachers(subject_id)
    }
}

/// Private working set of a run. Nothing is visible to callers until the
/// draft is turned into a report.
#[derive(Debug, Default)]
pub struct Draft {
    pub entries: Vec<TimetableEntry>,
    pub warnings: Vec<ScheduleWarning>,
}

impl Draft {
    pub fn push(&mut self, entry: TimetableEntry) {
        self.entries.push(entry);
    }

    pub fn warn(&mut self, warning: ScheduleWarning) {
        warn!(
            kind = warning.kind(),
            class_id = warning.class_id(),
            subject_id = warning.subject_id(),
            "{warning}"
        );
        self.warnings.push(warning);
    }

    pub fn into_report(self) -> GenerationReport {
        GenerationReport {
            entries: self.entries,
            warnings: self.warnings,
        }
    }
}

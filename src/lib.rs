pub mod config;
pub mod conflict;
pub mod diagnostics;
pub mod engine;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod policy;
pub mod sample;
pub mod scheduling;
pub mod timetable;
pub mod validation;
pub mod view;

pub use config::{ConfigError, EngineConfig, LabFeasibility, LectureRange, SlotOrder};
pub use conflict::Conflict;
pub use diagnostics::{GenerationReport, GenerationSummary, ScheduleWarning};
pub use engine::TimetableEngine;
pub use model::{
    Class, Day, LabRoom, NewEntry, ResourceSnapshot, Subject, Teacher, TimeSlot, TimetableEntry,
};
pub use policy::{
    CapacityFit, FirstFit, FixedLectureCount, LectureCountPolicy, ResourcePicker,
    SeededLectureCount,
};
pub use timetable::{Timetable, TimetableError, TimetableResult, TimetableStats};
pub use validation::ModelValidationError;
pub use view::ViewFilter;

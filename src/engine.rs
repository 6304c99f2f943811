use tracing::info;

use crate::config::{ConfigError, EngineConfig};
use crate::diagnostics::GenerationReport;
use crate::model::ResourceSnapshot;
use crate::policy::{FirstFit, LectureCountPolicy, ResourcePicker, SeededLectureCount};
use crate::scheduling::{Draft, SchedulingContext, lab, lecture};
use crate::validation::{self, ModelValidationError};

/// Builds a weekly timetable from a resource snapshot.
///
/// Classes are processed in list order and, within a class, subjects in list
/// order: lectures first, then labs for lab subjects. Earlier classes and
/// subjects therefore get first pick of scarce teachers and rooms.
///
/// # Example
/// ```
/// use timetable_engine::{TimetableEngine, sample::sample_snapshot};
///
/// let engine = TimetableEngine::default();
/// let report = engine.generate(&sample_snapshot()).unwrap();
/// assert!(!report.entries.is_empty());
/// ```
pub struct TimetableEngine {
    config: EngineConfig,
    lecture_counts: Box<dyn LectureCountPolicy + Send + Sync>,
    picker: Box<dyn ResourcePicker + Send + Sync>,
}

impl Default for TimetableEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            lecture_counts: Box::new(SeededLectureCount::from_config(&config)),
            picker: Box::new(FirstFit),
            config,
        }
    }
}

impl TimetableEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            lecture_counts: Box::new(SeededLectureCount::from_config(&config)),
            picker: Box::new(FirstFit),
            config,
        })
    }

    pub fn with_picker<P>(mut self, picker: P) -> Self
    where
        P: ResourcePicker + Send + Sync + 'static,
    {
        self.picker = Box::new(picker);
        self
    }

    pub fn with_lecture_counts<L>(mut self, policy: L) -> Self
    where
        L: LectureCountPolicy + Send + Sync + 'static,
    {
        self.lecture_counts = Box::new(policy);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a fresh generation. The returned entries replace, never extend,
    /// any earlier timetable.
    ///
    /// Only malformed input (duplicate ids, a class without batches, an
    /// impossible time slot) is an error. Every placement that cannot be made
    /// is recorded as a warning in the report.
    pub fn generate(
        &self,
        snapshot: &ResourceSnapshot,
    ) -> Result<GenerationReport, ModelValidationError> {
        validation::validate_snapshot(snapshot)?;

        let ctx = SchedulingContext::new(snapshot, &self.config, self.picker.as_ref());
        let mut draft = Draft::default();

        for class in &snapshot.classes {
            for subject in &snapshot.subjects {
                let target = self.lecture_counts.lectures_per_week(class, subject);
                lecture::schedule_lectures(&ctx, &mut draft, class, subject, target);
                if subject.has_lab {
                    lab::schedule_labs(&ctx, &mut draft, class, subject);
                }
            }
        }

        let report = draft.into_report();
        info!(
            classes = snapshot.classes.len(),
            subjects = snapshot.subjects.len(),
            lectures = report.lecture_count(),
            labs = report.lab_count(),
            warnings = report.warnings.len(),
            "timetable generated"
        );
        Ok(report)
    }
}

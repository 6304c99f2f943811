use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::model::Day;

pub const DEFAULT_SEED: u64 = 0x5EED_2024;

/// Order in which candidate slots are tried for a given day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOrder {
    /// Sorted by start time; ties keep list order.
    #[default]
    Chronological,
    /// Exactly as the resource list provides them.
    List,
}

/// How a (day, lab slot) pair is judged usable for every batch of a class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabFeasibility {
    /// Each batch on its own must see a free teacher and a free room. Batches
    /// compete for the same pool, so later batches may still be stranded.
    #[default]
    PerBatch,
    /// At least as many free teachers and free rooms as there are batches.
    Distinct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureRange {
    pub min: u32,
    pub max: u32,
}

impl Default for LectureRange {
    fn default() -> Self {
        Self { min: 2, max: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lectures_per_week: LectureRange,
    pub seed: u64,
    pub slot_order: SlotOrder,
    pub lab_feasibility: LabFeasibility,
    pub working_days: Vec<Day>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lectures_per_week: LectureRange::default(),
            seed: DEFAULT_SEED,
            slot_order: SlotOrder::default(),
            lab_feasibility: LabFeasibility::default(),
            working_days: Day::WEEK.to_vec(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {err}"),
            ConfigError::Parse(err) => write!(f, "invalid config json: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let range = self.lectures_per_week;
        if range.min == 0 {
            return Err(ConfigError::Invalid(
                "lectures_per_week.min must be at least 1".into(),
            ));
        }
        if range.min > range.max {
            return Err(ConfigError::Invalid(format!(
                "lectures_per_week.min {} exceeds max {}",
                range.min, range.max
            )));
        }
        if self.working_days.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one working day is required".into(),
            ));
        }
        Ok(())
    }

    /// Working days deduplicated and in week order.
    pub fn days(&self) -> Vec<Day> {
        Day::WEEK
            .iter()
            .copied()
            .filter(|day| self.working_days.contains(day))
            .collect()
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: EngineConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

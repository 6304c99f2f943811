//! Replaceable decisions inside the schedulers.
//!
//! The schedulers decide *where* a session may go. These traits decide how
//! many lectures a subject gets and which of several free resources is used,
//! so a different allocator can be dropped in without touching the search.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{EngineConfig, LectureRange};
use crate::model::{Class, LabRoom, Subject, Teacher};

pub trait LectureCountPolicy {
    /// Weekly lecture target for one (class, subject) pair.
    fn lectures_per_week(&self, class: &Class, subject: &Subject) -> u32;
}

/// Draws a count from a range using an RNG seeded per (class, subject), so the
/// result does not depend on iteration order or on earlier draws.
#[derive(Debug, Clone)]
pub struct SeededLectureCount {
    range: LectureRange,
    seed: u64,
}

impl SeededLectureCount {
    pub fn new(range: LectureRange, seed: u64) -> Self {
        Self { range, seed }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.lectures_per_week, config.seed)
    }

    fn pair_seed(&self, class_id: &str, subject_id: &str) -> u64 {
        // FNV-1a, stable across builds unlike the std hasher.
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;
        let mut hash = OFFSET ^ self.seed;
        let bytes = class_id
            .bytes()
            .chain(std::iter::once(0xff))
            .chain(subject_id.bytes());
        for byte in bytes {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(PRIME);
        }
        hash
    }
}

impl LectureCountPolicy for SeededLectureCount {
    fn lectures_per_week(&self, class: &Class, subject: &Subject) -> u32 {
        let LectureRange { min, max } = self.range;
        if min >= max {
            return min;
        }
        let mut rng = StdRng::seed_from_u64(self.pair_seed(&class.id, &subject.id));
        rng.random_range(min..=max)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedLectureCount(pub u32);

impl LectureCountPolicy for FixedLectureCount {
    fn lectures_per_week(&self, _class: &Class, _subject: &Subject) -> u32 {
        self.0
    }
}

/// Chooses one resource out of those already known to be free.
pub trait ResourcePicker {
    fn pick_teacher<'a>(&self, subject: &Subject, free: &[&'a Teacher]) -> Option<&'a Teacher>;

    fn pick_room<'a>(
        &self,
        class: &Class,
        batch_number: u32,
        free: &[&'a LabRoom],
    ) -> Option<&'a LabRoom>;
}

/// First free resource in list order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl ResourcePicker for FirstFit {
    fn pick_teacher<'a>(&self, _subject: &Subject, free: &[&'a Teacher]) -> Option<&'a Teacher> {
        free.first().copied()
    }

    fn pick_room<'a>(
        &self,
        _class: &Class,
        _batch_number: u32,
        free: &[&'a LabRoom],
    ) -> Option<&'a LabRoom> {
        free.first().copied()
    }
}

/// First-fit teachers; for rooms, the smallest one that seats a whole batch,
/// falling back to the largest room when none does.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityFit;

impl ResourcePicker for CapacityFit {
    fn pick_teacher<'a>(&self, _subject: &Subject, free: &[&'a Teacher]) -> Option<&'a Teacher> {
        free.first().copied()
    }

    fn pick_room<'a>(
        &self,
        class: &Class,
        _batch_number: u32,
        free: &[&'a LabRoom],
    ) -> Option<&'a LabRoom> {
        let Some(needed) = class.batch_capacity else {
            return free.first().copied();
        };
        free.iter()
            .copied()
            .filter(|room| room.capacity >= needed)
            .min_by_key(|room| room.capacity)
            .or_else(|| free.iter().copied().max_by_key(|room| room.capacity))
    }
}

use serde::{Deserialize, Serialize};

use crate::Difficulty;

/// Current schema generation marker written into every new beat map.
pub const BEAT_MAP_VERSION: u32 = 1;

/// Highest lane index the wire format accepts. The schema is
/// difficulty-agnostic on disk, so the full six-lane range is always legal
/// even for charts generated with four lanes.
pub const MAX_LANE: u8 = 5;

/// A single hit target: when it must be struck and in which lane.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BeatNote {
    /// Seconds from the start of the track.
    pub time: f64,
    /// Input lane, 0 = leftmost.
    pub lane: u8,
}

impl BeatNote {
    pub fn new(time: f64, lane: u8) -> Self {
        Self { time, lane }
    }
}

/// A full chart for one difficulty tier, sorted ascending by note time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BeatMap {
    pub version: u32,
    /// Calibration shift in seconds already applied to every note time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    pub notes: Vec<BeatNote>,
}

impl BeatMap {
    pub fn new(offset: f64, notes: Vec<BeatNote>) -> Self {
        Self {
            version: BEAT_MAP_VERSION,
            offset: Some(offset),
            notes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// The three difficulty variants generated from one shared detection pass.
/// Independent values after creation; no shared state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BeatMapVariations {
    pub easy: BeatMap,
    pub normal: BeatMap,
    pub hard: BeatMap,
}

impl BeatMapVariations {
    pub fn get(&self, difficulty: Difficulty) -> &BeatMap {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Build the degenerate variations record in which all three tiers share
    /// one chart. Used when upgrading legacy single-map records.
    pub fn uniform(map: BeatMap) -> Self {
        Self {
            easy: map.clone(),
            normal: map.clone(),
            hard: map,
        }
    }
}

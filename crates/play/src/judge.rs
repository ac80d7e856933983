use serde::{Deserialize, Serialize};
use tracing::trace;

use beatline_domain::BeatNote;

/// Maximum deviation between an input and a note's scheduled time for the
/// input to count as a hit. Strictly less-than.
pub const DEFAULT_HIT_WINDOW_SECS: f64 = 0.1;

/// Points awarded per successful hit.
pub const HIT_SCORE_AWARD: u32 = 100;

/// Score and combo for the current session. Score stays unset until the
/// first award; reset returns both to their initial state.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameProgress {
    pub score: Option<u32>,
    pub combo: u32,
}

impl GameProgress {
    fn award(&mut self, points: u32) {
        self.score = Some(self.score.unwrap_or(0) + points);
        self.combo += 1;
    }

    fn break_combo(&mut self) {
        self.combo = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Outcome of a single hit attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Judgment {
    /// The closest eligible note was consumed. `delta` is signed input time
    /// minus note time (negative = early).
    Hit { note: BeatNote, delta: f64 },
    Miss,
}

/// Judges player input against the set of spawned, unresolved notes.
///
/// The active set is small, bounded by the note density inside the lead-time
/// window, so eligibility checks are plain linear scans. All operations are
/// total; the per-frame path never needs an error branch.
#[derive(Debug)]
pub struct HitJudge {
    hit_window: f64,
    active: Vec<BeatNote>,
    progress: GameProgress,
}

impl HitJudge {
    pub fn new() -> Self {
        Self::with_hit_window(DEFAULT_HIT_WINDOW_SECS)
    }

    pub fn with_hit_window(hit_window: f64) -> Self {
        Self {
            hit_window,
            active: Vec::new(),
            progress: GameProgress::default(),
        }
    }

    pub fn progress(&self) -> GameProgress {
        self.progress
    }

    pub fn active_notes(&self) -> &[BeatNote] {
        &self.active
    }

    /// Add spawner output to the active set. Spawned notes arrive in
    /// ascending time order, so the set stays ordered.
    pub fn spawn(&mut self, notes: &[BeatNote]) {
        self.active.extend_from_slice(notes);
    }

    /// Judge a hit attempt for `lane` at an input timestamp already adjusted
    /// for latency compensation.
    ///
    /// Among active notes in the lane, a note is eligible when its absolute
    /// time difference is strictly inside the hit window; the closest one
    /// wins, ties resolving to the earliest scanned. A hit removes the note
    /// and advances score and combo; a miss resets the combo and leaves the
    /// score untouched.
    pub fn judge(&mut self, lane: u8, input_time: f64) -> Judgment {
        let mut best: Option<(usize, f64)> = None;
        for (index, note) in self.active.iter().enumerate() {
            if note.lane != lane {
                continue;
            }
            let distance = (note.time - input_time).abs();
            if distance >= self.hit_window {
                continue;
            }
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((index, distance)),
            }
        }
        match best {
            Some((index, _)) => {
                let note = self.active.remove(index);
                self.progress.award(HIT_SCORE_AWARD);
                trace!(lane, note_time = note.time, input_time, "hit");
                Judgment::Hit {
                    note,
                    delta: input_time - note.time,
                }
            }
            None => {
                self.progress.break_combo();
                trace!(lane, input_time, "miss");
                Judgment::Miss
            }
        }
    }

    /// Per-frame expiry sweep: remove active notes the player can no longer
    /// hit, i.e. those past their scheduled time by more than the hit
    /// window. Passive expiry breaks the combo exactly like an explicit
    /// miss; the score is unchanged. Returns the expired notes.
    pub fn sweep(&mut self, current_time: f64) -> Vec<BeatNote> {
        let hit_window = self.hit_window;
        let mut expired = Vec::new();
        self.active.retain(|note| {
            if current_time - note.time > hit_window {
                expired.push(*note);
                false
            } else {
                true
            }
        });
        if !expired.is_empty() {
            self.progress.break_combo();
        }
        expired
    }

    /// Clear all session state (track change or restart).
    pub fn reset(&mut self) {
        self.active.clear();
        self.progress.reset();
    }
}

impl Default for HitJudge {
    fn default() -> Self {
        Self::new()
    }
}

/// On-screen approach fraction of a note at the given playback time: 0 when
/// it spawns at the top of the lead-time window, 1 at its scheduled hit
/// time. Clamped to [0, 1]; this is what the expiry sweep's "fully elapsed"
/// reading maps to for rendering.
pub fn note_progress(note: &BeatNote, current_time: f64, lead_time: f64) -> f64 {
    if lead_time <= 0.0 {
        return 1.0;
    }
    ((current_time - (note.time - lead_time)) / lead_time).clamp(0.0, 1.0)
}

pub mod judge;
pub mod spawner;

pub use judge::{
    note_progress, GameProgress, HitJudge, Judgment, DEFAULT_HIT_WINDOW_SECS, HIT_SCORE_AWARD,
};
pub use spawner::{NoteSpawner, DEFAULT_LEAD_TIME_SECS};

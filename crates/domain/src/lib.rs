pub mod difficulty;
pub mod error;
pub mod schema;
pub mod validate;

pub use crate::difficulty::Difficulty;
pub use crate::error::DomainError;
pub use crate::schema::{BeatMap, BeatMapVariations, BeatNote, BEAT_MAP_VERSION, MAX_LANE};
pub use crate::validate::validate_beat_map;

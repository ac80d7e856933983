pub mod generator;
pub mod lanes;

pub use generator::{generate_beat_map, generate_beat_map_variations};
pub use lanes::{apply_offset, map_beats_to_lanes};

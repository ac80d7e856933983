use rand::Rng;

use beatline_domain::BeatNote;

/// Assign each beat timestamp a lane drawn uniformly at random.
///
/// Draws are independent across beats; there is no pattern memory and no
/// repeat avoidance. The generator is a first-class parameter so tests can
/// substitute a seeded one.
pub fn map_beats_to_lanes<R: Rng + ?Sized>(
    beats: &[f64],
    lane_count: u8,
    rng: &mut R,
) -> Vec<BeatNote> {
    beats
        .iter()
        .map(|&time| {
            let lane = (rng.gen::<f64>() * lane_count as f64) as u8;
            BeatNote::new(time, lane)
        })
        .collect()
}

/// Shift every note time by a uniform calibration offset in seconds.
pub fn apply_offset(notes: &[BeatNote], offset: f64) -> Vec<BeatNote> {
    notes
        .iter()
        .map(|note| BeatNote::new(note.time + offset, note.lane))
        .collect()
}

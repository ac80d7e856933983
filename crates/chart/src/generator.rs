use rand::Rng;
use tracing::debug;

use beatline_analysis::detect_beats;
use beatline_domain::{BeatMap, BeatMapVariations, Difficulty};

use crate::lanes::{apply_offset, map_beats_to_lanes};

/// Generate a single chart from raw PCM samples at the given difficulty.
pub fn generate_beat_map<R: Rng + ?Sized>(
    samples: &[f32],
    sample_rate: u32,
    difficulty: Difficulty,
    offset: f64,
    rng: &mut R,
) -> BeatMap {
    let beats = detect_beats(samples, sample_rate);
    let notes = apply_offset(
        &map_beats_to_lanes(&beats, difficulty.lane_count(), rng),
        offset,
    );
    BeatMap::new(offset, notes)
}

/// Generate the easy, normal and hard chart variants from one shared
/// detection pass.
///
/// The lane count is metadata of the *selected* difficulty (6 for hard, 4
/// otherwise) and applies to all three variants. Each variant is lane-mapped
/// independently with fresh draws, so lanes do not correlate across tiers.
///
/// - normal keeps every detected beat;
/// - easy keeps every other beat, a density-reduced subsequence of normal;
/// - hard adds a synthetic beat at the midpoint of each consecutive pair,
///   re-sorted, a density-increased superset of normal.
pub fn generate_beat_map_variations<R: Rng + ?Sized>(
    samples: &[f32],
    sample_rate: u32,
    difficulty: Difficulty,
    offset: f64,
    rng: &mut R,
) -> BeatMapVariations {
    let beats = detect_beats(samples, sample_rate);
    let lane_count = difficulty.lane_count();
    debug!(
        beat_count = beats.len(),
        lane_count, offset, "generating beat map variations"
    );

    let normal = apply_offset(&map_beats_to_lanes(&beats, lane_count, rng), offset);

    let easy_beats: Vec<f64> = beats.iter().copied().step_by(2).collect();
    let easy = apply_offset(&map_beats_to_lanes(&easy_beats, lane_count, rng), offset);

    let mut hard_beats = beats.clone();
    for pair in beats.windows(2) {
        hard_beats.push((pair[0] + pair[1]) / 2.0);
    }
    hard_beats.sort_by(|a, b| a.partial_cmp(b).expect("beat times are finite"));
    let hard = apply_offset(&map_beats_to_lanes(&hard_beats, lane_count, rng), offset);

    BeatMapVariations {
        easy: BeatMap::new(offset, easy),
        normal: BeatMap::new(offset, normal),
        hard: BeatMap::new(offset, hard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatline_domain::validate_beat_map;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Buffer with full-scale pulses every 300 ms at 44.1 kHz.
    fn pulse_buffer(beat_count: usize) -> Vec<f32> {
        let rate = 44_100usize;
        let spacing = (rate as f64 * 0.3) as usize;
        let mut samples = vec![0.0f32; spacing * beat_count + rate];
        for beat in 0..beat_count {
            let start = beat * spacing;
            for sample in samples.iter_mut().skip(start).take(8) {
                *sample = 0.9;
            }
        }
        samples
    }

    fn times(map: &BeatMap) -> Vec<f64> {
        map.notes.iter().map(|note| note.time).collect()
    }

    #[test]
    fn variant_densities_are_ordered() {
        let samples = pulse_buffer(9);
        let mut rng = Pcg32::seed_from_u64(3);
        let maps =
            generate_beat_map_variations(&samples, 44_100, Difficulty::Normal, 0.0, &mut rng);
        assert!(maps.easy.notes.len() <= maps.normal.notes.len());
        assert!(maps.normal.notes.len() <= maps.hard.notes.len());
        assert_eq!(maps.normal.notes.len(), 9);
        assert_eq!(maps.easy.notes.len(), 5);
        assert_eq!(maps.hard.notes.len(), 17);
    }

    #[test]
    fn easy_is_a_subsequence_of_normal() {
        let samples = pulse_buffer(8);
        let mut rng = Pcg32::seed_from_u64(11);
        let maps =
            generate_beat_map_variations(&samples, 44_100, Difficulty::Easy, 0.02, &mut rng);
        let normal_times = times(&maps.normal);
        for time in times(&maps.easy) {
            assert!(normal_times.iter().any(|&t| (t - time).abs() < 1e-9));
        }
    }

    #[test]
    fn hard_is_a_superset_of_normal() {
        let samples = pulse_buffer(8);
        let mut rng = Pcg32::seed_from_u64(11);
        let maps =
            generate_beat_map_variations(&samples, 44_100, Difficulty::Hard, 0.0, &mut rng);
        let hard_times = times(&maps.hard);
        for time in times(&maps.normal) {
            assert!(hard_times.iter().any(|&t| (t - time).abs() < 1e-9));
        }
        // Inserted midpoints sit halfway between consecutive normal beats.
        let normal_times = times(&maps.normal);
        let midpoint = (normal_times[0] + normal_times[1]) / 2.0;
        assert!(hard_times.iter().any(|&t| (t - midpoint).abs() < 1e-9));
    }

    #[test]
    fn hard_notes_are_sorted_ascending() {
        let samples = pulse_buffer(12);
        let mut rng = Pcg32::seed_from_u64(5);
        let maps =
            generate_beat_map_variations(&samples, 44_100, Difficulty::Hard, 0.0, &mut rng);
        for pair in maps.hard.notes.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
    }

    #[test]
    fn selected_difficulty_fixes_lane_count_for_all_variants() {
        let samples = pulse_buffer(40);
        let mut rng = Pcg32::seed_from_u64(9);
        let maps =
            generate_beat_map_variations(&samples, 44_100, Difficulty::Normal, 0.0, &mut rng);
        for map in [&maps.easy, &maps.normal, &maps.hard] {
            assert!(map.notes.iter().all(|note| note.lane < 4));
        }

        let mut rng = Pcg32::seed_from_u64(9);
        let maps = generate_beat_map_variations(&samples, 44_100, Difficulty::Hard, 0.0, &mut rng);
        let max_lane = maps
            .hard
            .notes
            .iter()
            .map(|note| note.lane)
            .max()
            .unwrap();
        assert!(max_lane < 6);
        assert!(max_lane >= 4, "six-lane charts should use the upper lanes");
    }

    #[test]
    fn offset_is_recorded_and_applied() {
        let samples = pulse_buffer(4);
        let mut rng = Pcg32::seed_from_u64(2);
        let map = generate_beat_map(&samples, 44_100, Difficulty::Normal, 0.5, &mut rng);
        assert_eq!(map.offset, Some(0.5));
        assert!((map.notes[0].time - 0.5).abs() < 1e-9);
        assert_eq!(map.version, 1);
    }

    #[test]
    fn silence_generates_empty_but_valid_maps() {
        let samples = vec![0.0f32; 44_100];
        let mut rng = Pcg32::seed_from_u64(1);
        let maps =
            generate_beat_map_variations(&samples, 44_100, Difficulty::Normal, 0.0, &mut rng);
        for map in [&maps.easy, &maps.normal, &maps.hard] {
            assert!(map.is_empty());
            assert!(validate_beat_map(map).is_ok());
        }
    }
}

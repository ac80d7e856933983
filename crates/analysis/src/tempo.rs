use crate::detector::ONSET_THRESHOLD;

/// Plausible musical tempo range; estimates outside it are discarded.
const MIN_BPM: f64 = 40.0;
const MAX_BPM: f64 = 400.0;

/// Estimate the tempo of a mono sample buffer in BPM.
///
/// Naive peak-interval estimation: every rising edge above the onset
/// threshold counts as a peak (no refractory constraint, unlike
/// [`crate::detect_beats`]), and the tempo is derived from the mean
/// inter-peak interval. Returns 0.0 when fewer than two peaks are found or
/// the estimate falls outside [`MIN_BPM`]..=[`MAX_BPM`].
///
/// Descriptive metric only; chart generation never consumes this.
pub fn estimate_tempo(samples: &[f32], sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    let mut peaks: Vec<usize> = Vec::new();
    let mut prev_above = false;
    for (index, sample) in samples.iter().enumerate() {
        let above = sample.abs() > ONSET_THRESHOLD;
        if above && !prev_above {
            peaks.push(index);
        }
        prev_above = above;
    }
    if peaks.len() < 2 {
        return 0.0;
    }
    let interval_sum: usize = peaks.windows(2).map(|pair| pair[1] - pair[0]).sum();
    let mean_interval = interval_sum as f64 / (peaks.len() - 1) as f64;
    let bpm = 60.0 * sample_rate as f64 / mean_interval;
    if (MIN_BPM..=MAX_BPM).contains(&bpm) {
        bpm
    } else {
        0.0
    }
}

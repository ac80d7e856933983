/// Amplitude above which a sample counts as part of a transient, as a
/// fraction of full scale.
pub const ONSET_THRESHOLD: f32 = 0.3;

/// Minimum spacing between emitted beats in seconds. Suppresses repeated
/// detections on a single sustained transient.
pub const MIN_BEAT_SPACING_SECS: f64 = 0.2;

/// Detect beat timestamps in a mono sample buffer.
///
/// Fixed-threshold rising-edge onset detection: the signal is rectified and
/// a beat is emitted whenever the amplitude crosses [`ONSET_THRESHOLD`] from
/// below, provided the crossing is at least [`MIN_BEAT_SPACING_SECS`] after
/// the previously emitted beat. Returned timestamps are seconds from the
/// start of the buffer and strictly increasing. Silence or an empty buffer
/// yields an empty vec.
pub fn detect_beats(samples: &[f32], sample_rate: u32) -> Vec<f64> {
    if sample_rate == 0 {
        return Vec::new();
    }
    let min_interval = MIN_BEAT_SPACING_SECS * sample_rate as f64;
    let mut beats = Vec::new();
    let mut prev_above = false;
    let mut last_beat_sample: Option<usize> = None;
    for (index, sample) in samples.iter().enumerate() {
        let above = sample.abs() > ONSET_THRESHOLD;
        if above && !prev_above {
            let spaced = match last_beat_sample {
                Some(last) => (index - last) as f64 >= min_interval,
                None => true,
            };
            if spaced {
                beats.push(index as f64 / sample_rate as f64);
                last_beat_sample = Some(index);
            }
        }
        prev_above = above;
    }
    beats
}

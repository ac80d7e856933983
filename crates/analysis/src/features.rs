use std::f64::consts::PI;

use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};

/// Frame length used for spectral analysis. Frames are non-overlapping.
const SPECTRAL_FRAME_SIZE: usize = 2048;

/// Fraction of total spectral energy below the rolloff frequency.
const ROLLOFF_ENERGY_FRACTION: f64 = 0.85;

/// Number of points in the display waveform.
pub const WAVEFORM_POINTS: usize = 1000;

/// Track-level spectral summary, averaged over analysis frames.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SpectralFeatures {
    /// Magnitude-weighted mean frequency in Hz.
    pub centroid: f64,
    /// Frequency in Hz below which 85% of the spectral energy lies.
    pub rolloff: f64,
}

/// Root-mean-square amplitude of the buffer. 0.0 for empty input.
pub fn compute_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&v| v as f64 * v as f64).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Reduce a buffer to `points` samples for waveform display by picking the
/// first sample of each equal-sized block. Positions past the end of the
/// input are zero-filled.
pub fn downsample(samples: &[f32], points: usize) -> Vec<f32> {
    let block_size = if points == 0 {
        0
    } else {
        samples.len() / points
    };
    (0..points)
        .map(|i| samples.get(i * block_size).copied().unwrap_or(0.0))
        .collect()
}

/// Compute the average spectral centroid and rolloff over non-overlapping
/// Hann-windowed frames. Returns zeroed features when the buffer is shorter
/// than one frame.
pub fn compute_spectral_features(samples: &[f32], sample_rate: u32) -> SpectralFeatures {
    if samples.len() < SPECTRAL_FRAME_SIZE || sample_rate == 0 {
        return SpectralFeatures::default();
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(SPECTRAL_FRAME_SIZE);
    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();
    let mut scratch = fft.make_scratch_vec();
    let bin_hz = sample_rate as f64 / SPECTRAL_FRAME_SIZE as f64;

    let mut centroid_sum = 0.0;
    let mut rolloff_sum = 0.0;
    let mut frames = 0usize;
    for frame in samples.chunks_exact(SPECTRAL_FRAME_SIZE) {
        for (index, (slot, &sample)) in input.iter_mut().zip(frame).enumerate() {
            *slot = sample as f64 * hann(index, SPECTRAL_FRAME_SIZE);
        }
        if fft
            .process_with_scratch(&mut input, &mut spectrum, &mut scratch)
            .is_err()
        {
            continue;
        }

        let magnitudes: Vec<f64> = spectrum.iter().map(|bin| bin.norm()).collect();
        let magnitude_sum: f64 = magnitudes.iter().sum();
        if magnitude_sum <= f64::EPSILON {
            frames += 1;
            continue;
        }

        let weighted: f64 = magnitudes
            .iter()
            .enumerate()
            .map(|(i, m)| m * i as f64 * bin_hz)
            .sum();
        centroid_sum += weighted / magnitude_sum;

        let energy_total: f64 = magnitudes.iter().map(|m| m * m).sum();
        let target = energy_total * ROLLOFF_ENERGY_FRACTION;
        let mut cumulative = 0.0;
        let mut rolloff_bin = magnitudes.len() - 1;
        for (i, m) in magnitudes.iter().enumerate() {
            cumulative += m * m;
            if cumulative >= target {
                rolloff_bin = i;
                break;
            }
        }
        rolloff_sum += rolloff_bin as f64 * bin_hz;
        frames += 1;
    }

    if frames == 0 {
        return SpectralFeatures::default();
    }
    SpectralFeatures {
        centroid: centroid_sum / frames as f64,
        rolloff: rolloff_sum / frames as f64,
    }
}

fn hann(index: usize, len: usize) -> f64 {
    0.5 * (1.0 - (2.0 * PI * index as f64 / len as f64).cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine(freq: f64, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / rate as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn rms_of_dc_signal() {
        let samples = vec![0.5f32; 1024];
        assert_relative_eq!(compute_rms(&samples), 0.5, epsilon = 1e-6);
        assert_eq!(compute_rms(&[]), 0.0);
    }

    #[test]
    fn rms_of_full_scale_sine() {
        let samples = sine(440.0, 44_100, 44_100);
        let rms = compute_rms(&samples);
        assert_relative_eq!(rms, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-3);
    }

    #[test]
    fn downsample_always_yields_requested_points() {
        let samples: Vec<f32> = (0..10_000).map(|i| i as f32).collect();
        let waveform = downsample(&samples, WAVEFORM_POINTS);
        assert_eq!(waveform.len(), WAVEFORM_POINTS);
        assert_eq!(waveform[0], 0.0);
        assert_eq!(waveform[1], 10.0);
    }

    #[test]
    fn downsample_zero_fills_short_input() {
        let waveform = downsample(&[1.0, 2.0], 8);
        assert_eq!(waveform.len(), 8);
        // Block size collapses to zero, so every in-range pick is sample 0.
        assert!(waveform.iter().all(|&v| v == 1.0));

        let waveform = downsample(&[], 4);
        assert!(waveform.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn centroid_tracks_dominant_frequency() {
        let rate = 44_100u32;
        let low = compute_spectral_features(&sine(220.0, rate, 8192), rate);
        let high = compute_spectral_features(&sine(4_400.0, rate, 8192), rate);
        assert!(low.centroid < high.centroid);
        assert!(high.rolloff >= high.centroid * 0.5);
    }

    #[test]
    fn short_buffer_yields_zeroed_features() {
        let features = compute_spectral_features(&[0.1; 512], 44_100);
        assert_eq!(features, SpectralFeatures::default());
    }
}

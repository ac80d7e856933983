use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// A decoded track, downmixed to a single mono channel.
///
/// Analysis and chart generation operate on one channel only, so the mix
/// happens at the decode boundary rather than in every consumer.
#[derive(Debug, Clone)]
pub struct TrackBuffer {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl TrackBuffer {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

pub struct TrackDecoder;

impl TrackDecoder {
    /// Decode an audio file into a mono [`TrackBuffer`].
    ///
    /// Interleaved frames are averaged across channels. Undecodable packets
    /// are skipped; end of stream terminates the loop.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<TrackBuffer> {
        let path_ref = path.as_ref();
        let file =
            File::open(path_ref).with_context(|| format!("open audio file {:?}", path_ref))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path_ref.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| anyhow::anyhow!("no default track found"))?;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(48_000);

        let mut samples = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(err) => {
                    use symphonia::core::errors::Error as SymphError;
                    match err {
                        SymphError::IoError(e)
                            if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                        {
                            break;
                        }
                        _ => return Err(err.into()),
                    }
                }
            };
            let buffer = match decoder.decode(&packet) {
                Ok(buffer) => buffer,
                Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
                Err(err) => return Err(err.into()),
            };
            let spec = *buffer.spec();
            let channels = spec.channels.count().max(1);
            let frames = buffer.frames() as u64;
            let mut out = SampleBuffer::<f32>::new(frames, spec);
            out.copy_interleaved_ref(buffer);
            for frame in out.samples().chunks_exact(channels) {
                let sum: f32 = frame.iter().sum();
                samples.push(sum / channels as f32);
            }
        }

        debug!(
            sample_rate,
            sample_count = samples.len(),
            "decoded track to mono"
        );
        Ok(TrackBuffer {
            sample_rate,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_reports_missing_file() {
        let result = TrackDecoder::open("does-not-exist.wav");
        assert!(result.is_err());
    }

    #[test]
    fn duration_from_sample_count() {
        let buffer = TrackBuffer {
            sample_rate: 44_100,
            samples: vec![0.0; 88_200],
        };
        assert!((buffer.duration_secs() - 2.0).abs() < 1e-9);
    }
}

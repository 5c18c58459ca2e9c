//! Amplitude extraction from audio files.
//!
//! The core only ever consumes a short sequence of normalized levels; how
//! those levels are obtained is a collaborator concern behind
//! [`AmplitudeDecoder`]. The bundled [`WavDecoder`] reads a WAV file,
//! mixes it down to mono, buckets it to a nominal level count, and
//! peak-normalizes the result.
//!
//! Decoding can be slow, so hosts are expected to run it off-thread and
//! marshal the result back with the engine generation they captured when
//! they started (see `WaveformEngine::complete_decode`).

use std::fmt;
use std::path::Path;

use crate::NOMINAL_LEVEL_COUNT;

#[derive(Debug)]
pub enum DecodeError {
    /// The container could not be opened or parsed.
    Wav(hound::Error),
    /// The file parsed but contained no audio frames.
    EmptyAudio,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Wav(err) => write!(f, "failed to read wav data: {err}"),
            DecodeError::EmptyAudio => write!(f, "audio file contains no frames"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Wav(err) => Some(err),
            DecodeError::EmptyAudio => None,
        }
    }
}

impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        DecodeError::Wav(err)
    }
}

/// Yields a normalized amplitude sequence for a resource.
pub trait AmplitudeDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<f32>, DecodeError>;
}

/// WAV-backed decoder producing `target` levels in `0.0..=1.0`.
#[derive(Debug, Clone)]
pub struct WavDecoder {
    target: usize,
}

impl WavDecoder {
    pub fn new() -> Self {
        Self {
            target: NOMINAL_LEVEL_COUNT,
        }
    }

    /// Override the number of levels produced.
    pub fn with_target(target: usize) -> Self {
        Self {
            target: target.max(1),
        }
    }
}

impl Default for WavDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AmplitudeDecoder for WavDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<f32>, DecodeError> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(DecodeError::from)?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<Result<_, _>>()
                    .map_err(DecodeError::from)?
            }
        };

        let mono = mix_down(&samples, spec.channels as usize);
        if mono.is_empty() {
            return Err(DecodeError::EmptyAudio);
        }

        Ok(meter_levels(&mono, self.target))
    }
}

/// Playback length of a WAV file in seconds, from its header.
pub fn wav_duration(path: &Path) -> Result<f64, DecodeError> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(DecodeError::EmptyAudio);
    }
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Average interleaved channels into one frame stream.
fn mix_down(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Bucket `frames` into `target` RMS levels, peak-normalized to 0..=1.
fn meter_levels(frames: &[f32], target: usize) -> Vec<f32> {
    let target = target.min(frames.len()).max(1);
    let bucket_size = frames.len() / target;

    let mut levels: Vec<f32> = (0..target)
        .map(|index| {
            let start = index * bucket_size;
            let end = if index + 1 == target {
                frames.len()
            } else {
                start + bucket_size
            };
            let bucket = &frames[start..end];
            let energy = bucket.iter().map(|s| s * s).sum::<f32>() / bucket.len() as f32;
            energy.sqrt()
        })
        .collect();

    let peak = levels.iter().fold(0.0f32, |acc, &l| acc.max(l));
    if peak > 0.0 {
        for level in &mut levels {
            *level /= peak;
        }
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_down_averages_stereo_frames() {
        let interleaved = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        assert_eq!(mix_down(&interleaved, 2), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn mix_down_passes_mono_through() {
        let mono = [0.1, 0.2];
        assert_eq!(mix_down(&mono, 1), vec![0.1, 0.2]);
    }

    #[test]
    fn meter_levels_normalizes_peak_to_one() {
        let frames: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0) * 0.25).collect();
        let levels = meter_levels(&frames, 100);

        assert_eq!(levels.len(), 100);
        let peak = levels.iter().cloned().fold(0.0f32, f32::max);
        assert!((peak - 1.0).abs() < 1e-6);
        assert!(levels.iter().all(|&l| (0.0..=1.0).contains(&l)));
    }

    #[test]
    fn meter_levels_never_exceeds_frame_count() {
        let frames = [0.5, 0.25];
        let levels = meter_levels(&frames, 100);
        assert_eq!(levels.len(), 2);
    }

    #[test]
    fn silence_stays_silent() {
        let frames = [0.0; 256];
        let levels = meter_levels(&frames, 10);
        assert!(levels.iter().all(|&l| l == 0.0));
    }
}

use crate::export::request::VolumeModifier;
use crate::foundation::error::{ReelError, ReelResult};

/// Mono floating-point PCM at a (possibly fractional) sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct MonoPcm {
    /// Samples per second.
    pub sample_rate: f64,
    /// Samples in [-1, 1].
    pub samples: Vec<f32>,
}

impl MonoPcm {
    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.samples.len() as f64 / self.sample_rate
        } else {
            0.0
        }
    }

    /// Little-endian `f32` bytes, the layout `ffmpeg -f f32le` reads.
    pub fn to_f32le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::<u8>::with_capacity(self.samples.len() * 4);
        for &sample in &self.samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }
}

/// Copy the raw samples into an owned buffer at `sample_rate`, applying `volume`.
///
/// Non-finite samples become silence. `AutoAdjusted` scales by the inverse of the absolute peak
/// (a silent signal stays silent); both modes clamp to [-1, 1].
pub fn build_source_buffer(
    samples: &[f32],
    sample_rate: f64,
    volume: VolumeModifier,
) -> ReelResult<MonoPcm> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(ReelError::audio_buffer(format!(
            "source sample rate must be positive, got {sample_rate}"
        )));
    }
    if samples.is_empty() {
        return Err(ReelError::audio_buffer("no samples to encode"));
    }

    let mut out = Vec::<f32>::new();
    out.try_reserve_exact(samples.len()).map_err(|e| {
        ReelError::audio_buffer(format!(
            "failed to allocate {} source frames: {e}",
            samples.len()
        ))
    })?;
    out.extend(
        samples
            .iter()
            .map(|&s| if s.is_finite() { s } else { 0.0 }),
    );

    if volume == VolumeModifier::AutoAdjusted {
        let peak = out.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        if peak > 0.0 {
            let gain = 1.0 / peak;
            for s in &mut out {
                *s *= gain;
            }
        }
    }
    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }

    Ok(MonoPcm {
        sample_rate,
        samples: out,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/pcm.rs"]
mod tests;

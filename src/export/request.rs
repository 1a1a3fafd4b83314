use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::foundation::error::{ReelError, ReelResult};

/// How many octaves the data signal is shifted up, expressed as the sample-rate multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OctavesHigher {
    /// x128
    Seven,
    /// x256
    Eight,
    /// x512
    Nine,
    /// x1024
    Ten,
    /// x2048
    Eleven,
    /// x4096
    Twelve,
    /// x8192
    Thirteen,
    /// x16384
    Fourteen,
}

impl OctavesHigher {
    /// Every supported shift, lowest first.
    pub const ALL: [Self; 8] = [
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Eleven,
        Self::Twelve,
        Self::Thirteen,
        Self::Fourteen,
    ];

    /// Sample-rate multiplier (`2^octaves`).
    pub fn multiplier(self) -> u32 {
        1 << self.octaves()
    }

    /// Number of octaves.
    pub fn octaves(self) -> u32 {
        match self {
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::Ten => 10,
            Self::Eleven => 11,
            Self::Twelve => 12,
            Self::Thirteen => 13,
            Self::Fourteen => 14,
        }
    }

    /// Look up the shift for an octave count in `7..=14`.
    pub fn from_octaves(octaves: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.octaves() == octaves)
    }
}

impl std::fmt::Display for OctavesHigher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\u{2669} {}", self.octaves())
    }
}

/// Volume normalization applied to the synthesized audio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeModifier {
    /// Samples are used as-is (clamped to [-1, 1]).
    #[default]
    Fixed,
    /// Samples are peak-normalized to full scale.
    AutoAdjusted,
}

impl std::fmt::Display for VolumeModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => f.write_str("Fixed"),
            Self::AutoAdjusted => f.write_str("Auto Adjusted"),
        }
    }
}

/// Everything the pipeline needs to export one movie.
///
/// Immutable once built; the pipeline shares it read-only across its worker threads.
#[derive(Clone, Debug)]
pub struct ExportRequest {
    /// Frame width in pixels (even).
    pub width: u32,
    /// Frame height in pixels (even).
    pub height: u32,
    /// Real-world instant of the first sample.
    pub start: DateTime<Utc>,
    /// Real-world span covered by the samples.
    pub duration: Duration,
    /// Movie length in playback seconds.
    pub playback_secs: f64,
    /// Recorded samples per second of the data signal.
    pub samples_per_second: u32,
    /// Pitch shift applied by playing the samples faster.
    pub octaves_higher: OctavesHigher,
    /// Volume normalization mode.
    pub volume: VolumeModifier,
    /// Raw samples, nominally in [-1, 1].
    pub samples: Arc<[f32]>,
}

impl ExportRequest {
    /// Build a request whose playback length is derived from the sample count and rate.
    #[allow(clippy::too_many_arguments)]
    pub fn from_samples(
        width: u32,
        height: u32,
        start: DateTime<Utc>,
        duration: Duration,
        samples_per_second: u32,
        octaves_higher: OctavesHigher,
        volume: VolumeModifier,
        samples: impl Into<Arc<[f32]>>,
    ) -> Self {
        let samples = samples.into();
        let rate = f64::from(samples_per_second) * f64::from(octaves_higher.multiplier());
        let playback_secs = if rate > 0.0 {
            samples.len() as f64 / rate
        } else {
            0.0
        };
        Self {
            width,
            height,
            start,
            duration,
            playback_secs,
            samples_per_second,
            octaves_higher,
            volume,
            samples,
        }
    }

    /// Nominal audio sample rate: `samples_per_second * multiplier`.
    pub fn nominal_sample_rate(&self) -> f64 {
        f64::from(self.samples_per_second) * f64::from(self.octaves_higher.multiplier())
    }

    /// Real-world instant displayed at `playback_secs` into the movie.
    pub fn wall_clock_at(&self, playback_secs: f64) -> DateTime<Utc> {
        if self.playback_secs <= 0.0 {
            return self.start;
        }
        let frac = (playback_secs / self.playback_secs).clamp(0.0, 1.0);
        let offset = self.duration.mul_f64(frac);
        match chrono::Duration::from_std(offset) {
            Ok(d) => self.start + d,
            Err(_) => self.start,
        }
    }

    /// Check the request before any work starts.
    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("export width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "export width/height must be even (required for yuv420p output)",
            ));
        }
        if !self.playback_secs.is_finite() || self.playback_secs <= 0.0 {
            return Err(ReelError::validation(format!(
                "export playback length must be positive, got {}",
                self.playback_secs
            )));
        }
        if self.samples_per_second == 0 {
            return Err(ReelError::validation("samples_per_second must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/request.rs"]
mod tests;

use crate::foundation::error::{ReelError, ReelResult};

/// Fixed output frame rate of exported movies.
pub const EXPORT_FPS: Fps = Fps { num: 24, den: 1 };

/// Fixed output sample rate of the exported audio track.
pub const OUTPUT_SAMPLE_RATE: u32 = 44_100;

/// 0-based frame index in movie timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Presentation time of `frame` in seconds.
    pub fn frame_to_secs(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) * self.frame_duration_secs()
    }

    /// Number of frames needed to cover `secs`, i.e. `ceil(secs * fps)`.
    ///
    /// Products within `1e-9` of an integer are snapped first so that exact durations such as
    /// `10.0` seconds at 24 fps yield 240 frames rather than 241. Any positive duration needs at
    /// least one frame.
    pub fn frames_to_cover(self, secs: f64) -> u64 {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        let exact = secs * self.as_f64();
        let snapped = exact.round();
        let frames = if (exact - snapped).abs() < 1e-9 {
            snapped as u64
        } else {
            exact.ceil() as u64
        };
        frames.max(1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

/// One rendered RGBA8 video frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub data: Vec<u8>,
    /// Whether `data` carries premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Solid-color opaque frame.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
            premultiplied: false,
        }
    }

    /// Expected byte length for the frame dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

impl From<image::RgbaImage> for FrameRGBA {
    fn from(img: image::RgbaImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.into_raw(),
            premultiplied: false,
        }
    }
}

/// Failure reported by a [`FrameRenderer`] for one timestamp.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("frame render failed at {playback_secs:.3}s: {reason}")]
pub struct RenderFailure {
    /// Playback time that failed.
    pub playback_secs: f64,
    /// Human-readable cause.
    pub reason: String,
}

impl RenderFailure {
    /// Build a failure for `playback_secs`.
    pub fn new(playback_secs: f64, reason: impl Into<String>) -> Self {
        Self {
            playback_secs,
            reason: reason.into(),
        }
    }
}

/// Per-timestamp frame producer driven by the video encoder.
///
/// Called synchronously on the video thread in strictly increasing playback-time order.
pub trait FrameRenderer: Send + Sync {
    /// Produce the frame shown at `playback_secs` into the movie.
    fn render(&self, playback_secs: f64) -> Result<FrameRGBA, RenderFailure>;
}

impl<F> FrameRenderer for F
where
    F: Fn(f64) -> Result<FrameRGBA, RenderFailure> + Send + Sync,
{
    fn render(&self, playback_secs: f64) -> Result<FrameRGBA, RenderFailure> {
        self(playback_secs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/rgba.rs"]
mod tests;

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::frame::rgba::{FrameRGBA, FrameRenderer, RenderFailure};

/// Colors used by [`WaveformRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WaveformStyle {
    /// Frame background.
    pub background: [u8; 4],
    /// Waveform stroke.
    pub wave: [u8; 4],
    /// Playback dial.
    pub dial: [u8; 4],
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            background: [18, 20, 28, 255],
            wave: [78, 42, 132, 255],
            dial: [230, 230, 230, 255],
        }
    }
}

/// Renders the whole signal as min/max columns along the bottom band, plus a dial that sweeps
/// left to right as playback advances.
///
/// The static part (background and waveform) is drawn once at construction; each frame clones it
/// and draws the dial.
pub struct WaveformRenderer {
    base: RgbaImage,
    band_height: u32,
    playback_secs: f64,
    style: WaveformStyle,
}

impl WaveformRenderer {
    /// Build a renderer for `samples` spread across `width`.
    pub fn new(
        width: u32,
        height: u32,
        samples: Arc<[f32]>,
        playback_secs: f64,
        style: WaveformStyle,
    ) -> Self {
        let band_height = band_height(width, height);
        let mut base = RgbaImage::from_pixel(width, height, Rgba(style.background));
        let top = height - band_height;
        if band_height > 0 {
            for (x, (lo, hi)) in column_extents(&samples, width).into_iter().enumerate() {
                let y_lo = amplitude_to_y(hi, band_height);
                let y_hi = amplitude_to_y(lo, band_height);
                for y in y_lo..=y_hi {
                    base.put_pixel(x as u32, top + y, Rgba(style.wave));
                }
            }
        }
        Self {
            base,
            band_height,
            playback_secs,
            style,
        }
    }

    /// Horizontal dial position for `playback_secs`.
    pub fn dial_x(&self, playback_secs: f64) -> u32 {
        let width = self.base.width();
        if self.playback_secs <= 0.0 || width == 0 {
            return 0;
        }
        let x = f64::from(width) * (playback_secs / self.playback_secs);
        (x.max(0.0) as u32).min(width - 1)
    }
}

impl FrameRenderer for WaveformRenderer {
    fn render(&self, playback_secs: f64) -> Result<FrameRGBA, RenderFailure> {
        if !playback_secs.is_finite() || playback_secs < 0.0 {
            return Err(RenderFailure::new(playback_secs, "invalid playback time"));
        }
        let mut img = self.base.clone();
        let (width, height) = img.dimensions();
        let dial = self.dial_x(playback_secs);
        for x in dial..(dial + 2).min(width) {
            for y in (height - self.band_height)..height {
                img.put_pixel(x, y, Rgba(self.style.dial));
            }
        }
        Ok(FrameRGBA::from(img))
    }
}

/// Height of the waveform band: `width * 150 / 640`, clamped to the frame.
fn band_height(width: u32, height: u32) -> u32 {
    let h = (u64::from(width) * 150 / 640) as u32;
    h.clamp(1.min(height), height)
}

/// Min/max sample per pixel column; empty input gives flat zero columns.
fn column_extents(samples: &[f32], width: u32) -> Vec<(f32, f32)> {
    let width = width as usize;
    if samples.is_empty() || width == 0 {
        return vec![(0.0, 0.0); width];
    }
    let step = samples.len() as f64 / width as f64;
    let mut out = Vec::with_capacity(width);
    for x in 0..width {
        let start = ((x as f64 * step) as usize).min(samples.len() - 1);
        let end = (((x + 1) as f64 * step) as usize).clamp(start + 1, samples.len());
        let (lo, hi) = samples[start..end]
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        out.push((lo.clamp(-1.0, 1.0), hi.clamp(-1.0, 1.0)));
    }
    out
}

/// Map an amplitude in [-1, 1] to a row inside a band of `band_height` rows (top = +1).
fn amplitude_to_y(v: f32, band_height: u32) -> u32 {
    let max_row = band_height.saturating_sub(1) as f32;
    let y = (0.5 - v / 2.0) * max_row;
    y.round().clamp(0.0, max_row) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/frame/waveform.rs"]
mod tests;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::rgba::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Target average video bitrate in bits per second.
    pub bitrate: u32,
}

/// Encoded container bytes, possibly delivered by the encoder in several segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedVideo {
    /// Segments in output order.
    pub segments: Vec<Vec<u8>>,
}

impl EncodedVideo {
    /// Total byte length across segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    /// `true` when the encoder produced no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate every segment into one contiguous buffer.
    pub fn concat(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for seg in &self.segments {
            out.extend_from_slice(seg);
        }
        out
    }
}

/// Backpressure-aware consumer of video frames.
///
/// Call order: `begin`, then per frame `wait_until_ready` + `push_frame` (strictly increasing
/// [`FrameIndex`]), then `mark_finished` + `finish`. `abort` may be called at any point after
/// `begin` and leaves the sink unusable.
pub trait FrameSink: Send {
    /// Configure the encoder input.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Block until the encoder can accept one more frame.
    fn wait_until_ready(&mut self) -> ReelResult<()>;
    /// Append one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Signal that no more frames follow.
    fn mark_finished(&mut self);
    /// Finalize the encoder and return its output.
    fn finish(&mut self) -> ReelResult<EncodedVideo>;
    /// Stop encoding without producing output.
    fn abort(&mut self) {
        self.mark_finished();
    }
}

/// In-memory sink for tests and debugging.
///
/// Every pushed frame contributes one small text segment naming its index, so the concatenated
/// output is empty exactly when no frame was pushed.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<FrameIndex>,
    ready_waits: u64,
    finished: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Indices of the frames pushed so far.
    pub fn frames(&self) -> &[FrameIndex] {
        &self.frames
    }

    /// How many times the encoder waited for readiness.
    pub fn ready_waits(&self) -> u64 {
        self.ready_waits
    }

    /// Whether `abort` was called.
    pub fn aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        self.aborted = false;
        Ok(())
    }

    fn wait_until_ready(&mut self) -> ReelResult<()> {
        self.ready_waits += 1;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::video_append("in-memory sink not started"))?;
        if self.finished {
            return Err(ReelError::video_append("in-memory sink is already finished"));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::video_append(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.frames.push(idx);
        Ok(())
    }

    fn mark_finished(&mut self) {
        self.finished = true;
    }

    fn finish(&mut self) -> ReelResult<EncodedVideo> {
        self.finished = true;
        Ok(EncodedVideo {
            segments: self
                .frames
                .iter()
                .map(|idx| format!("frame {}\n", idx.0).into_bytes())
                .collect(),
        })
    }

    fn abort(&mut self) {
        self.finished = true;
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

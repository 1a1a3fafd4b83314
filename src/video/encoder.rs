use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::encode::sink::{EncodedVideo, FrameSink, SinkConfig};
use crate::export::cancel::{CancelToken, StepStatus};
use crate::foundation::core::{EXPORT_FPS, FrameIndex};
use crate::foundation::error::{ErrorKind, ReelError, ReelResult};
use crate::frame::rgba::{FrameRGBA, FrameRenderer};

/// Parameters of one video encode.
#[derive(Clone, Debug)]
pub struct VideoJob<'a> {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Length to cover, in playback seconds.
    pub playback_secs: f64,
    /// Target bitrate in bits per second.
    pub bitrate: u32,
    /// Pause before finalization so trailing encoder output can flush.
    pub finalize_delay: Duration,
    /// Destination of the encoded file.
    pub out: &'a Path,
}

/// Lifecycle of a video encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoState {
    /// Sink not configured yet.
    Initializing,
    /// Appending frame `frame`.
    Writing {
        /// Next frame to append.
        frame: u64,
    },
    /// Input finished; waiting for encoder output.
    Finalizing,
    /// Output file written.
    Completed,
    /// Stopped with an error.
    Failed,
    /// Stopped on cancellation.
    Cancelled,
}

struct Machine {
    state: VideoState,
}

impl Machine {
    fn goto(&mut self, next: VideoState) {
        // Per-frame advances are not logged.
        if !matches!(
            (self.state, next),
            (VideoState::Writing { .. }, VideoState::Writing { .. })
        ) {
            debug!(from = ?self.state, to = ?next, "video state");
        }
        self.state = next;
    }
}

/// Deduplicating progress emitter; forwards a value only when it differs from the last one.
struct Progress<'a> {
    last: Option<f64>,
    sink: &'a mut dyn FnMut(f64),
}

impl Progress<'_> {
    fn emit(&mut self, value: f64) {
        let value = value.clamp(0.0, 1.0);
        if self.last.is_some_and(|last| last >= value) {
            return;
        }
        self.last = Some(value);
        (self.sink)(value);
    }
}

/// Render and encode `ceil(playback_secs * 24)` frames into `job.out`.
///
/// `renderer` is called synchronously with each frame's playback time. Progress values passed to
/// `on_progress` start at 0.0, strictly increase, and end at 1.0 unless the encode stops early.
/// Cancellation is polled before each frame; a cancelled or failed encode aborts `sink` and
/// writes nothing.
pub fn encode_video(
    job: &VideoJob<'_>,
    renderer: &dyn FrameRenderer,
    sink: &mut dyn FrameSink,
    cancel: &CancelToken,
    on_progress: &mut dyn FnMut(f64),
) -> ReelResult<StepStatus> {
    let mut machine = Machine {
        state: VideoState::Initializing,
    };
    let res = run(job, renderer, sink, cancel, on_progress, &mut machine);
    match &res {
        Ok(StepStatus::Completed) => machine.goto(VideoState::Completed),
        Ok(StepStatus::Cancelled) => {
            sink.abort();
            machine.goto(VideoState::Cancelled);
        }
        Err(e) => {
            sink.abort();
            machine.goto(VideoState::Failed);
            debug!(error = %e, "video encode failed");
        }
    }
    res
}

fn run(
    job: &VideoJob<'_>,
    renderer: &dyn FrameRenderer,
    sink: &mut dyn FrameSink,
    cancel: &CancelToken,
    on_progress: &mut dyn FnMut(f64),
    machine: &mut Machine,
) -> ReelResult<StepStatus> {
    let mut progress = Progress {
        last: None,
        sink: on_progress,
    };

    sink.begin(SinkConfig {
        width: job.width,
        height: job.height,
        fps: EXPORT_FPS,
        bitrate: job.bitrate,
    })
    .map_err(|e| reclassify(e, ErrorKind::VideoInputSetup))?;
    progress.emit(0.0);

    let total = EXPORT_FPS.frames_to_cover(job.playback_secs);
    debug!(total_frames = total, playback_secs = job.playback_secs, "video encode started");

    for i in 0..total {
        machine.goto(VideoState::Writing { frame: i });
        sink.wait_until_ready()
            .map_err(|e| reclassify(e, ErrorKind::VideoAppend))?;
        if cancel.is_cancelled() {
            debug!(frame = i, "video encode cancelled");
            return Ok(StepStatus::Cancelled);
        }

        let idx = FrameIndex(i);
        let t = EXPORT_FPS.frame_to_secs(idx);
        let frame: FrameRGBA = renderer
            .render(t)
            .map_err(|e| ReelError::video_frame_render(format!("frame {i}: {e}")))?;
        sink.push_frame(idx, &frame)
            .map_err(|e| reclassify(e, ErrorKind::VideoAppend))?;

        let current = EXPORT_FPS.frame_to_secs(FrameIndex(i + 1));
        progress.emit((current / job.playback_secs).min(1.0));
    }

    machine.goto(VideoState::Finalizing);
    progress.emit(1.0);
    sink.mark_finished();
    if !job.finalize_delay.is_zero() {
        std::thread::sleep(job.finalize_delay);
    }
    let encoded = sink
        .finish()
        .map_err(|e| reclassify(e, ErrorKind::VideoFinalizeWrite))?;

    write_output(&encoded, job.out)?;
    info!(out = %job.out.display(), frames = total, bytes = encoded.len(), "encoded video");
    Ok(StepStatus::Completed)
}

/// Concatenate the encoder segments into one file, via a partial file and a rename.
fn write_output(encoded: &EncodedVideo, out: &Path) -> ReelResult<()> {
    if encoded.is_empty() {
        warn!(out = %out.display(), "video encoder produced no output");
    }
    let partial = out.with_extension("partial.mp4");
    let res = std::fs::write(&partial, encoded.concat())
        .and_then(|()| std::fs::rename(&partial, out));
    res.map_err(|e| {
        let _ = std::fs::remove_file(&partial);
        ReelError::video_finalize_write(format!(
            "failed to write video to '{}': {e}",
            out.display()
        ))
    })
}

/// Keep classified sink errors of the expected kind; fold anything else into `kind`.
fn reclassify(err: ReelError, kind: ErrorKind) -> ReelError {
    if err.kind() == kind {
        return err;
    }
    let msg = err.to_string();
    match kind {
        ErrorKind::VideoInputSetup => ReelError::video_input_setup(msg),
        ErrorKind::VideoFinalizeWrite => ReelError::video_finalize_write(msg),
        _ => ReelError::video_append(msg),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/encoder.rs"]
mod tests;

use std::path::{Path, PathBuf};

use crate::audio::pcm::MonoPcm;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, encode_aac_mono, is_tool_on_path};
use crate::encode::sink::FrameSink;
use crate::export::cancel::StepStatus;
use crate::export::options::ExportOptions;
use crate::foundation::error::ReelResult;

/// Media operations the export pipeline delegates to an encoder toolchain.
///
/// The pipeline owns sequencing, cancellation and cleanup; a backend only turns buffers and
/// files into other files.
pub trait MediaBackend: Send + Sync {
    /// Encode 44.1 kHz mono PCM to a compressed audio file at `out`.
    fn encode_audio(&self, pcm: &MonoPcm, out: &Path) -> ReelResult<()>;

    /// A fresh, not yet started video sink.
    fn video_sink(&self) -> Box<dyn FrameSink>;

    /// Stream-copy `audio` and `video` into one movie at `out`.
    fn mux(&self, audio: &Path, video: &Path, out: &Path) -> ReelResult<StepStatus>;
}

/// [`MediaBackend`] backed by the system `ffmpeg` and `ffprobe`.
#[derive(Clone, Debug)]
pub struct FfmpegBackend {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    background_rgba: [u8; 4],
    frame_queue_depth: usize,
}

impl FfmpegBackend {
    /// Backend using the tool paths and frame settings of `opts`.
    pub fn new(opts: &ExportOptions) -> Self {
        Self {
            ffmpeg: opts.ffmpeg_path.clone(),
            ffprobe: opts.ffprobe_path.clone(),
            background_rgba: opts.background_rgba,
            frame_queue_depth: opts.frame_queue_depth.max(1),
        }
    }

    /// Whether both tools can be run.
    pub fn is_available(&self) -> bool {
        is_tool_on_path(&self.ffmpeg) && is_tool_on_path(&self.ffprobe)
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new(&ExportOptions::default())
    }
}

impl MediaBackend for FfmpegBackend {
    fn encode_audio(&self, pcm: &MonoPcm, out: &Path) -> ReelResult<()> {
        encode_aac_mono(&self.ffmpeg, pcm, out)
    }

    fn video_sink(&self) -> Box<dyn FrameSink> {
        Box::new(FfmpegSink::new(FfmpegSinkOpts {
            ffmpeg: self.ffmpeg.clone(),
            bg_rgba: self.background_rgba,
            queue_depth: self.frame_queue_depth,
        }))
    }

    fn mux(&self, audio: &Path, video: &Path, out: &Path) -> ReelResult<StepStatus> {
        crate::mux::muxer::mux_passthrough(&self.ffmpeg, &self.ffprobe, audio, video, out)
    }
}

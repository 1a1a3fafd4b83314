//! wavereel turns a sampled data signal into a shareable movie.
//!
//! The samples are played back as audio (pitched up by whole octaves) while a rendered frame
//! sequence shows the signal and a moving playhead. Both tracks are encoded concurrently and
//! stream-copied into one MP4.
//!
//! # Pipeline overview
//!
//! 1. **Workspace**: a uniquely named temporary folder per export
//! 2. **Audio**: samples -> PCM at the nominal rate -> 44.1 kHz -> AAC (`audio.m4a`)
//! 3. **Video**: `FrameRenderer` at 24 fps -> backpressured `FrameSink` -> H.264 (`video.mp4`)
//! 4. **Mux**: passthrough copy of both tracks into `movie.mp4`
//!
//! Steps 2 and 3 run in parallel and are joined before muxing. Encoding and muxing shell out to
//! the system `ffmpeg`/`ffprobe` binaries through [`FfmpegBackend`].
//!
//! Callers normally drive exports through [`ExportSession`], which holds at most one live export,
//! exposes its progress, and reports completion through a callback.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Audio synthesis, resampling and the audio step.
pub mod audio;
pub mod encode;
pub mod export;
/// Frame types and renderers.
pub mod frame;
pub mod mux;
pub mod video;

pub use crate::foundation::core::{EXPORT_FPS, Fps, FrameIndex, OUTPUT_SAMPLE_RATE};
pub use crate::foundation::error::{ErrorKind, ReelError, ReelResult};

pub use crate::audio::pcm::MonoPcm;
pub use crate::encode::ffmpeg::{
    FfmpegSink, FfmpegSinkOpts, encode_aac_mono, is_ffmpeg_on_path, is_ffprobe_on_path,
};
pub use crate::encode::sink::{EncodedVideo, FrameSink, InMemorySink, SinkConfig};
pub use crate::export::backend::{FfmpegBackend, MediaBackend};
pub use crate::export::cancel::{CancelToken, StepStatus};
pub use crate::export::options::ExportOptions;
pub use crate::export::orchestrator::{ExportEvent, ExportHandle, ExportOutcome, Exporter};
pub use crate::export::request::{ExportRequest, OctavesHigher, VolumeModifier};
pub use crate::export::session::ExportSession;
pub use crate::export::workspace::ExportWorkspace;
pub use crate::frame::rgba::{FrameRGBA, FrameRenderer, RenderFailure};
pub use crate::frame::waveform::{WaveformRenderer, WaveformStyle};

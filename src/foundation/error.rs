/// Convenience result type used across wavereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Classification of a [`ReelError`], stable across message changes.
///
/// One kind per failure point of the export pipeline; `Unknown` is the fallback for anything
/// not otherwise classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Invalid request or options.
    Validation,
    /// The temporary workspace could not be created.
    Workspace,
    /// The source PCM buffer could not be built.
    AudioBuffer,
    /// Resampling to the output rate failed.
    AudioResample,
    /// The audio encoder could not be started or failed while encoding.
    AudioEncode,
    /// The encoded audio could not be written to the workspace.
    AudioWrite,
    /// The video encoder input could not be set up.
    VideoInputSetup,
    /// The frame renderer failed to produce pixels.
    VideoFrameRender,
    /// The video encoder rejected a frame.
    VideoAppend,
    /// Finalizing the video encoder or writing its output failed.
    VideoFinalizeWrite,
    /// A source file for muxing has no track of the required type.
    MuxMissingTrack,
    /// A track could not be added to the output composition.
    MuxTrackSetup,
    /// A track's time range could not be inserted.
    MuxInsertRange,
    /// The passthrough export session could not be constructed.
    MuxSessionSetup,
    /// The passthrough export failed.
    MuxExport,
    /// An export is already running on the session.
    SessionBusy,
    /// Anything not otherwise classified.
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Workspace => "workspace",
            Self::AudioBuffer => "audio-buffer",
            Self::AudioResample => "audio-resample",
            Self::AudioEncode => "audio-encode",
            Self::AudioWrite => "audio-write",
            Self::VideoInputSetup => "video-input-setup",
            Self::VideoFrameRender => "video-frame-render",
            Self::VideoAppend => "video-append",
            Self::VideoFinalizeWrite => "video-finalize-write",
            Self::MuxMissingTrack => "mux-missing-track",
            Self::MuxTrackSetup => "mux-track-setup",
            Self::MuxInsertRange => "mux-insert-range",
            Self::MuxSessionSetup => "mux-session-setup",
            Self::MuxExport => "mux-export",
            Self::SessionBusy => "session-busy",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Top-level error taxonomy used by the export pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided request or options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Temporary workspace creation failed.
    #[error("workspace error: {0}")]
    Workspace(String),

    /// Source PCM buffer could not be built.
    #[error("audio buffer error: {0}")]
    AudioBuffer(String),

    /// Sample-rate conversion failed.
    #[error("audio resample error: {0}")]
    AudioResample(String),

    /// Compressed audio encoding failed.
    #[error("audio encode error: {0}")]
    AudioEncode(String),

    /// Writing the audio file failed.
    #[error("audio write error: {0}")]
    AudioWrite(String),

    /// Video encoder input could not be configured.
    #[error("video input setup error: {0}")]
    VideoInputSetup(String),

    /// Frame renderer failed for a timestamp.
    #[error("video frame render error: {0}")]
    VideoFrameRender(String),

    /// Video encoder refused a frame.
    #[error("video append error: {0}")]
    VideoAppend(String),

    /// Video finalize or output write failed.
    #[error("video finalize error: {0}")]
    VideoFinalizeWrite(String),

    /// A mux source lacks the expected track.
    #[error("mux missing track: {0}")]
    MuxMissingTrack(String),

    /// Adding a track to the output failed.
    #[error("mux track setup error: {0}")]
    MuxTrackSetup(String),

    /// Inserting a track time range failed.
    #[error("mux insert range error: {0}")]
    MuxInsertRange(String),

    /// The export session could not be built.
    #[error("mux session setup error: {0}")]
    MuxSessionSetup(String),

    /// Passthrough export failed.
    #[error("mux export error: {0}")]
    MuxExport(String),

    /// An export is already live on the session.
    #[error("an export is already running")]
    SessionBusy,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Workspace(_) => ErrorKind::Workspace,
            Self::AudioBuffer(_) => ErrorKind::AudioBuffer,
            Self::AudioResample(_) => ErrorKind::AudioResample,
            Self::AudioEncode(_) => ErrorKind::AudioEncode,
            Self::AudioWrite(_) => ErrorKind::AudioWrite,
            Self::VideoInputSetup(_) => ErrorKind::VideoInputSetup,
            Self::VideoFrameRender(_) => ErrorKind::VideoFrameRender,
            Self::VideoAppend(_) => ErrorKind::VideoAppend,
            Self::VideoFinalizeWrite(_) => ErrorKind::VideoFinalizeWrite,
            Self::MuxMissingTrack(_) => ErrorKind::MuxMissingTrack,
            Self::MuxTrackSetup(_) => ErrorKind::MuxTrackSetup,
            Self::MuxInsertRange(_) => ErrorKind::MuxInsertRange,
            Self::MuxSessionSetup(_) => ErrorKind::MuxSessionSetup,
            Self::MuxExport(_) => ErrorKind::MuxExport,
            Self::SessionBusy => ErrorKind::SessionBusy,
            Self::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Workspace`] value.
    pub fn workspace(msg: impl Into<String>) -> Self {
        Self::Workspace(msg.into())
    }

    /// Build a [`ReelError::AudioBuffer`] value.
    pub fn audio_buffer(msg: impl Into<String>) -> Self {
        Self::AudioBuffer(msg.into())
    }

    /// Build a [`ReelError::AudioResample`] value.
    pub fn audio_resample(msg: impl Into<String>) -> Self {
        Self::AudioResample(msg.into())
    }

    /// Build a [`ReelError::AudioEncode`] value.
    pub fn audio_encode(msg: impl Into<String>) -> Self {
        Self::AudioEncode(msg.into())
    }

    /// Build a [`ReelError::AudioWrite`] value.
    pub fn audio_write(msg: impl Into<String>) -> Self {
        Self::AudioWrite(msg.into())
    }

    /// Build a [`ReelError::VideoInputSetup`] value.
    pub fn video_input_setup(msg: impl Into<String>) -> Self {
        Self::VideoInputSetup(msg.into())
    }

    /// Build a [`ReelError::VideoFrameRender`] value.
    pub fn video_frame_render(msg: impl Into<String>) -> Self {
        Self::VideoFrameRender(msg.into())
    }

    /// Build a [`ReelError::VideoAppend`] value.
    pub fn video_append(msg: impl Into<String>) -> Self {
        Self::VideoAppend(msg.into())
    }

    /// Build a [`ReelError::VideoFinalizeWrite`] value.
    pub fn video_finalize_write(msg: impl Into<String>) -> Self {
        Self::VideoFinalizeWrite(msg.into())
    }

    /// Build a [`ReelError::MuxMissingTrack`] value.
    pub fn mux_missing_track(msg: impl Into<String>) -> Self {
        Self::MuxMissingTrack(msg.into())
    }

    /// Build a [`ReelError::MuxTrackSetup`] value.
    pub fn mux_track_setup(msg: impl Into<String>) -> Self {
        Self::MuxTrackSetup(msg.into())
    }

    /// Build a [`ReelError::MuxInsertRange`] value.
    pub fn mux_insert_range(msg: impl Into<String>) -> Self {
        Self::MuxInsertRange(msg.into())
    }

    /// Build a [`ReelError::MuxSessionSetup`] value.
    pub fn mux_session_setup(msg: impl Into<String>) -> Self {
        Self::MuxSessionSetup(msg.into())
    }

    /// Build a [`ReelError::MuxExport`] value.
    pub fn mux_export(msg: impl Into<String>) -> Self {
        Self::MuxExport(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

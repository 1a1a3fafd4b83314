use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::export::cancel::StepStatus;
use crate::foundation::error::{ReelError, ReelResult};
use crate::mux::probe::{ProbeReport, TrackKind, probe_file};

/// A source track selected for the output.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackRange {
    /// Codec copied into the output.
    pub codec: String,
    /// Full time range of the track, in seconds.
    pub duration_secs: f64,
}

/// Pick the first `kind` track of a probed source and its full time range.
pub fn plan_track(report: &ProbeReport, kind: TrackKind, source: &Path) -> ReelResult<TrackRange> {
    let track = report.first(kind).ok_or_else(|| {
        ReelError::mux_missing_track(format!(
            "no {kind} track in '{}'",
            source.display()
        ))
    })?;
    let codec = track.codec_name.clone().ok_or_else(|| {
        ReelError::mux_track_setup(format!(
            "{kind} track of '{}' has no codec to copy",
            source.display()
        ))
    })?;
    let duration_secs = report
        .track_duration(track)
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            ReelError::mux_insert_range(format!(
                "{kind} track of '{}' has no usable time range",
                source.display()
            ))
        })?;
    Ok(TrackRange {
        codec,
        duration_secs,
    })
}

/// `ffmpeg` arguments that stream-copy the first video track of `video` and the first audio
/// track of `audio` into an MP4 at `out`. No `-shortest`: each track keeps its own length.
pub fn mux_args(video: &Path, audio: &Path, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-v", "error", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(video.into());
    args.push("-i".into());
    args.push(audio.into());
    args.extend(
        [
            "-map", "0:v:0", "-map", "1:a:0", "-c", "copy", "-f", "mp4",
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(out.into());
    args
}

/// Combine `audio` and `video` into `out` without re-encoding.
///
/// Runs to completion once started. An `ffmpeg` killed by a signal is reported as
/// [`StepStatus::Cancelled`]; `out` is removed on every non-completed path.
pub fn mux_passthrough(
    ffmpeg: &Path,
    ffprobe: &Path,
    audio: &Path,
    video: &Path,
    out: &Path,
) -> ReelResult<StepStatus> {
    let video_report = probe_file(ffprobe, video)?;
    let audio_report = probe_file(ffprobe, audio)?;
    let video_track = plan_track(&video_report, TrackKind::Video, video)?;
    let audio_track = plan_track(&audio_report, TrackKind::Audio, audio)?;
    debug!(
        video_codec = %video_track.codec,
        video_secs = video_track.duration_secs,
        audio_codec = %audio_track.codec,
        audio_secs = audio_track.duration_secs,
        "muxing tracks"
    );

    let res = run_mux(ffmpeg, video, audio, out);
    if !matches!(res, Ok(StepStatus::Completed)) {
        let _ = std::fs::remove_file(out);
    }
    res
}

fn run_mux(ffmpeg: &Path, video: &Path, audio: &Path, out: &Path) -> ReelResult<StepStatus> {
    let output = Command::new(ffmpeg)
        .args(mux_args(video, audio, out))
        .output()
        .map_err(|e| {
            ReelError::mux_session_setup(format!(
                "failed to spawn '{}' for muxing: {e}",
                ffmpeg.display()
            ))
        })?;

    if output.status.success() {
        if !out.is_file() {
            return Err(ReelError::mux_export(format!(
                "ffmpeg reported success but '{}' was not written",
                out.display()
            )));
        }
        info!(out = %out.display(), "muxed movie");
        return Ok(StepStatus::Completed);
    }
    match output.status.code() {
        None => {
            warn!("ffmpeg mux was terminated by a signal");
            Ok(StepStatus::Cancelled)
        }
        Some(code) => Err(ReelError::mux_export(format!(
            "ffmpeg mux exited with code {code}: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mux/muxer.rs"]
mod tests;

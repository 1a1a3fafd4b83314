use std::path::Path;

use crate::foundation::error::{ReelError, ReelResult};

/// Track type as reported by `ffprobe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackKind {
    /// A video stream.
    Video,
    /// An audio stream.
    Audio,
}

impl TrackKind {
    fn codec_type(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.codec_type())
    }
}

/// One stream of a probed file.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbedTrack {
    /// `codec_type` string (`video`, `audio`, ...).
    pub codec_type: String,
    /// Codec name, when known.
    pub codec_name: Option<String>,
    /// Stream duration in seconds, when reported.
    pub duration_secs: Option<f64>,
}

/// Streams and container duration of a probed file.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ProbeReport {
    /// Streams in file order.
    pub tracks: Vec<ProbedTrack>,
    /// Container duration in seconds, when reported.
    pub format_duration_secs: Option<f64>,
}

impl ProbeReport {
    /// Parse `ffprobe -print_format json -show_streams -show_format` output.
    pub fn parse_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        #[derive(serde::Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            codec_name: Option<String>,
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            #[serde(default)]
            streams: Vec<ProbeStream>,
            format: Option<ProbeFormat>,
        }

        let parsed: ProbeOut = serde_json::from_slice(bytes)?;
        let tracks = parsed
            .streams
            .into_iter()
            .map(|s| ProbedTrack {
                codec_type: s.codec_type.unwrap_or_default(),
                codec_name: s.codec_name,
                duration_secs: s.duration.as_deref().and_then(parse_secs),
            })
            .collect();
        let format_duration_secs = parsed
            .format
            .and_then(|f| f.duration)
            .as_deref()
            .and_then(parse_secs);
        Ok(Self {
            tracks,
            format_duration_secs,
        })
    }

    /// First stream of `kind`.
    pub fn first(&self, kind: TrackKind) -> Option<&ProbedTrack> {
        self.tracks
            .iter()
            .find(|t| t.codec_type == kind.codec_type())
    }

    /// Time range of `track`: its own duration, else the container's.
    pub fn track_duration(&self, track: &ProbedTrack) -> Option<f64> {
        track.duration_secs.or(self.format_duration_secs)
    }
}

fn parse_secs(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Run `ffprobe` on `path`. A file that cannot be probed has no usable track.
pub fn probe_file(ffprobe: &Path, path: &Path) -> ReelResult<ProbeReport> {
    let out = std::process::Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| {
            ReelError::mux_missing_track(format!(
                "failed to run '{}' on '{}': {e}",
                ffprobe.display(),
                path.display()
            ))
        })?;
    if !out.status.success() {
        return Err(ReelError::mux_missing_track(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    ProbeReport::parse_json(&out.stdout).map_err(|e| {
        ReelError::mux_missing_track(format!(
            "ffprobe json parse failed for '{}': {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/mux/probe.rs"]
mod tests;

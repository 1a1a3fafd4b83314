use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Tunables for an export run.
///
/// Every field has a default, so a JSON document only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Directory that receives the per-export workspace folder.
    pub temp_root: PathBuf,
    /// Attempts at creating a uniquely named workspace folder.
    pub workspace_attempts: u32,
    /// Progress updates buffered between the pipeline and its consumer.
    pub progress_capacity: usize,
    /// Pause between the last appended frame and encoder finalization, in milliseconds.
    pub finalize_delay_ms: u64,
    /// Target H.264 bitrate in bits per second.
    pub video_bitrate: u32,
    /// Frames queued for the video encoder before the producer waits.
    pub frame_queue_depth: usize,
    /// Color used to flatten frames with alpha.
    pub background_rgba: [u8; 4],
    /// `ffmpeg` program.
    pub ffmpeg_path: PathBuf,
    /// `ffprobe` program.
    pub ffprobe_path: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            temp_root: std::env::temp_dir(),
            workspace_attempts: 3,
            progress_capacity: 64,
            finalize_delay_ms: 100,
            video_bitrate: 6_000_000,
            frame_queue_depth: 4,
            background_rgba: [0, 0, 0, 255],
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
        }
    }
}

impl ExportOptions {
    /// Parse options from a JSON document; absent keys keep their defaults.
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| ReelError::validation(format!("invalid export options: {e}")))?;
        opts.validate()?;
        Ok(opts.normalized())
    }

    /// Read and parse a JSON options file.
    pub fn from_json_path(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read options file '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Reject values no export can run with.
    pub fn validate(&self) -> ReelResult<()> {
        if self.video_bitrate == 0 {
            return Err(ReelError::validation("video_bitrate must be non-zero"));
        }
        if self.ffmpeg_path.as_os_str().is_empty() || self.ffprobe_path.as_os_str().is_empty() {
            return Err(ReelError::validation(
                "ffmpeg_path/ffprobe_path must not be empty",
            ));
        }
        Ok(())
    }

    /// Raise counts below 1 to 1.
    pub fn normalized(mut self) -> Self {
        self.workspace_attempts = self.workspace_attempts.max(1);
        self.progress_capacity = self.progress_capacity.max(1);
        self.frame_queue_depth = self.frame_queue_depth.max(1);
        self
    }

    /// Pre-finalize flush delay.
    pub fn finalize_delay(&self) -> Duration {
        Duration::from_millis(self.finalize_delay_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/options.rs"]
mod tests;

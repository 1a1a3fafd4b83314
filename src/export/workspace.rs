//! Per-export temporary folder.
//!
//! An [`ExportWorkspace`] owns a uniquely named directory holding the intermediate audio and
//! video files and the final movie. Dropping it removes the directory unless the movie was handed
//! off with [`ExportWorkspace::into_final`].

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::foundation::error::{ReelError, ReelResult};

const DIR_PREFIX: &str = "wavereel-";
const AUDIO_FILE: &str = "audio.m4a";
const VIDEO_FILE: &str = "video.mp4";
const MOVIE_FILE: &str = "movie.mp4";

/// Temporary folder of one export attempt.
#[derive(Debug)]
pub struct ExportWorkspace {
    temp_dir: TempDir,
}

impl ExportWorkspace {
    /// Create `root/wavereel-<random>`, retrying with a fresh name up to `attempts` times.
    pub fn create(root: &Path, attempts: u32) -> ReelResult<Self> {
        let attempts = attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match tempfile::Builder::new().prefix(DIR_PREFIX).tempdir_in(root) {
                Ok(temp_dir) => {
                    debug!(dir = %temp_dir.path().display(), attempt, "created export workspace");
                    return Ok(Self { temp_dir });
                }
                Err(e) => {
                    debug!(root = %root.display(), attempt, error = %e, "workspace attempt failed");
                    last_err = Some(e);
                }
            }
        }
        Err(ReelError::workspace(format!(
            "failed to create a workspace under '{}' after {attempts} attempts: {}",
            root.display(),
            last_err.map_or_else(|| "unknown error".to_owned(), |e| e.to_string())
        )))
    }

    /// The workspace directory.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Intermediate AAC audio file.
    pub fn audio_path(&self) -> PathBuf {
        self.dir().join(AUDIO_FILE)
    }

    /// Intermediate H.264 video file.
    pub fn video_path(&self) -> PathBuf {
        self.dir().join(VIDEO_FILE)
    }

    /// Final muxed movie.
    pub fn movie_path(&self) -> PathBuf {
        self.dir().join(MOVIE_FILE)
    }

    /// Delete the intermediate audio and video files, leaving the movie.
    pub fn remove_intermediates(&self) {
        for path in [self.audio_path(), self.video_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove intermediate"),
            }
        }
    }

    /// Hand the movie off to the caller; the directory outlives the workspace.
    pub fn into_final(self) -> PathBuf {
        self.temp_dir.keep().join(MOVIE_FILE)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/workspace.rs"]
mod tests;

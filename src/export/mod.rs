//! The export pipeline: request model, workspace, concurrent orchestration and the session
//! facade callers drive.

/// Media toolchain seam and the `ffmpeg` implementation.
pub mod backend;
/// Per-run cancellation token.
pub mod cancel;
/// Export tunables.
pub mod options;
/// Concurrent export run.
pub mod orchestrator;
/// Export request model.
pub mod request;
/// Single-export session facade.
pub mod session;
/// Temporary export folder.
pub mod workspace;

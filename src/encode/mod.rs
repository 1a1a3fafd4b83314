//! Encoder sinks and `ffmpeg` plumbing.
//!
//! The video step streams frames into a [`sink::FrameSink`]; the production sink and the audio
//! writer both drive the system `ffmpeg` binary.

/// `ffmpeg`-backed audio writer and frame sink.
pub mod ffmpeg;
/// Frame sink contract and the in-memory sink.
pub mod sink;

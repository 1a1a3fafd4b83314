//! Passthrough muxing of the intermediate audio and video files into the final movie.
//!
//! Both tracks are stream-copied; each keeps its own full time range, so the output may carry
//! tracks of slightly different lengths.

/// Track selection and the `ffmpeg` stream copy.
pub mod muxer;
/// `ffprobe` JSON parsing.
pub mod probe;

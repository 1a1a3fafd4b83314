use std::sync::Mutex;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::frame::rgba::RenderFailure;

fn job(out: &Path, playback_secs: f64) -> VideoJob<'_> {
    VideoJob {
        width: 8,
        height: 8,
        playback_secs,
        bitrate: 1_000,
        finalize_delay: Duration::ZERO,
        out,
    }
}

fn solid(_t: f64) -> Result<FrameRGBA, RenderFailure> {
    Ok(FrameRGBA::solid(8, 8, [0, 0, 0, 255]))
}

#[test]
fn ten_seconds_render_240_frames_with_strictly_increasing_progress() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video.mp4");
    let times = Mutex::new(Vec::new());
    let renderer = |t: f64| {
        times.lock().unwrap().push(t);
        solid(t)
    };
    let mut sink = InMemorySink::new();
    let mut progress = Vec::new();

    let status = encode_video(
        &job(&out, 10.0),
        &renderer,
        &mut sink,
        &CancelToken::new(),
        &mut |p| progress.push(p),
    )
    .unwrap();

    assert_eq!(status, StepStatus::Completed);
    let times = times.into_inner().unwrap();
    assert_eq!(times.len(), 240);
    assert_eq!(times[0], 0.0);
    assert!((times[1] - 1.0 / 24.0).abs() < 1e-12);
    assert!((times[239] - 239.0 / 24.0).abs() < 1e-9);

    assert_eq!(sink.frames().len(), 240);
    assert_eq!(sink.ready_waits(), 240);
    assert!(!sink.aborted());

    assert_eq!(progress.first(), Some(&0.0));
    assert_eq!(progress.last(), Some(&1.0));
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert!(out.is_file());
    assert!(!dir.path().join("video.partial.mp4").exists());
}

#[test]
fn fractional_length_rounds_frame_count_up() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video.mp4");
    let mut sink = InMemorySink::new();
    let mut progress = Vec::new();
    encode_video(
        &job(&out, 0.1),
        &solid,
        &mut sink,
        &CancelToken::new(),
        &mut |p| progress.push(p),
    )
    .unwrap();
    assert_eq!(sink.frames().len(), 3);
    assert_eq!(progress.last(), Some(&1.0));
    assert_eq!(progress.iter().filter(|p| **p == 1.0).count(), 1);
}

#[test]
fn cancel_before_first_frame_appends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video.mp4");
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut sink = InMemorySink::new();

    let status = encode_video(&job(&out, 1.0), &solid, &mut sink, &cancel, &mut |_| {}).unwrap();

    assert_eq!(status, StepStatus::Cancelled);
    assert!(sink.frames().is_empty());
    assert!(sink.aborted());
    assert!(!out.exists());
}

#[test]
fn cancel_mid_stream_stops_after_k_frames() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video.mp4");
    let cancel = CancelToken::new();
    let renderer = |t: f64| {
        if t >= 4.0 / 24.0 - 1e-9 {
            cancel.cancel();
        }
        solid(t)
    };
    let mut sink = InMemorySink::new();
    let mut progress = Vec::new();

    let status = encode_video(
        &job(&out, 1.0),
        &renderer,
        &mut sink,
        &cancel,
        &mut |p| progress.push(p),
    )
    .unwrap();

    assert_eq!(status, StepStatus::Cancelled);
    assert_eq!(sink.frames().len(), 5);
    assert!(progress.last().is_some_and(|p| *p < 1.0));
    assert!(!out.exists());
}

#[test]
fn render_failure_is_a_frame_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video.mp4");
    let renderer = |t: f64| {
        if t >= 3.0 / 24.0 - 1e-9 {
            Err(RenderFailure::new(t, "boom"))
        } else {
            solid(t)
        }
    };
    let mut sink = InMemorySink::new();
    let mut progress = Vec::new();

    let err = encode_video(
        &job(&out, 1.0),
        &renderer,
        &mut sink,
        &CancelToken::new(),
        &mut |p| progress.push(p),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::VideoFrameRender);
    assert_eq!(sink.frames().len(), 3);
    assert_eq!(progress.len(), 4);
    assert!(sink.aborted());
    assert!(!out.exists());
}

#[test]
fn wrong_frame_size_is_an_append_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video.mp4");
    let renderer =
        |_t: f64| -> Result<FrameRGBA, RenderFailure> { Ok(FrameRGBA::solid(4, 4, [0, 0, 0, 255])) };
    let mut sink = InMemorySink::new();

    let err = encode_video(
        &job(&out, 1.0),
        &renderer,
        &mut sink,
        &CancelToken::new(),
        &mut |_| {},
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VideoAppend);
}

#[test]
fn unwritable_output_is_a_finalize_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing").join("video.mp4");
    let mut sink = InMemorySink::new();

    let err = encode_video(
        &job(&out, 0.1),
        &solid,
        &mut sink,
        &CancelToken::new(),
        &mut |_| {},
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VideoFinalizeWrite);
}

#[test]
fn reclassify_keeps_matching_kinds() {
    let err = reclassify(ReelError::video_append("x"), ErrorKind::VideoAppend);
    assert_eq!(err.to_string(), "video append error: x");
    let err = reclassify(ReelError::validation("y"), ErrorKind::VideoInputSetup);
    assert_eq!(err.kind(), ErrorKind::VideoInputSetup);
}

/// Accepts every frame but produces no bytes on `finish`.
#[derive(Default)]
struct SilentSink {
    pushed: u64,
}

impl crate::encode::sink::FrameSink for SilentSink {
    fn begin(&mut self, _cfg: crate::encode::sink::SinkConfig) -> crate::ReelResult<()> {
        Ok(())
    }

    fn wait_until_ready(&mut self) -> crate::ReelResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: crate::FrameIndex, _frame: &FrameRGBA) -> crate::ReelResult<()> {
        self.pushed += 1;
        Ok(())
    }

    fn mark_finished(&mut self) {}

    fn finish(&mut self) -> crate::ReelResult<crate::encode::sink::EncodedVideo> {
        Ok(crate::encode::sink::EncodedVideo::default())
    }
}

#[test]
fn empty_encoder_output_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video.mp4");
    let mut sink = SilentSink::default();

    let status = encode_video(
        &job(&out, 0.5),
        &solid,
        &mut sink,
        &CancelToken::new(),
        &mut |_| {},
    );

    assert_eq!(status.unwrap(), StepStatus::Completed);
    assert_eq!(sink.pushed, 12);
    assert_eq!(std::fs::metadata(&out).unwrap().len(), 0);
}
